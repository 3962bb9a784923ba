//! # flexquote
//!
//! 軟包裝袋報價引擎
//!
//! - `quote-core`：資料模型、參考目錄、費率設定
//! - `quote-calc`：數碼 / 柯式 / 凹版成本計算、利潤率、重量估算
//! - `quote-history`：報價歷史記錄的背景寫入

pub use quote_calc::*;
pub use quote_core::*;

pub use quote_history::{
    DispatchReport, HistoryDispatcher, HistoryError, InMemoryHistorySink, QuotationHistorySink,
    RecordingQuoter, RetryPolicy,
};
