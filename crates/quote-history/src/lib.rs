//! # Quote History
//!
//! 報價歷史記錄的非同步寫入。寫入失敗只記錄日誌，不影響已返回的報價。

pub mod dispatcher;
pub mod quoter;
pub mod sink;

// Re-export 主要類型
pub use dispatcher::{DispatchReport, HistoryDispatcher, RetryPolicy};
pub use quoter::RecordingQuoter;
pub use sink::{InMemoryHistorySink, QuotationHistorySink};

/// 歷史記錄錯誤類型
#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    #[error("歷史記錄寫入失敗: {0}")]
    WriteFailed(String),

    #[error("歷史記錄儲存不可用: {0}")]
    Unavailable(String),
}

pub type Result<T> = std::result::Result<T, HistoryError>;

#[cfg(test)]
mod test_support;
