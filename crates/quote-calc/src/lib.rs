//! # Quote Calculation Engine
//!
//! 軟包裝報價計算引擎：數碼、膠印、凹印三種成本計算器，
//! 膠印模數匹配、重量估算與客戶利潤率調整。

pub mod calculator;
pub mod components;
pub mod digital;
pub mod gravure;
pub mod margin;
pub mod modulus;
pub mod offset;
pub mod selection;
pub mod weight;

// Re-export 主要類型
pub use calculator::QuotationCalculator;
pub use components::{CostComponents, PricingInputs};
pub use digital::DigitalCalculator;
pub use gravure::GravureCalculator;
pub use margin::ProfitMarginAdjuster;
pub use modulus::{printing_length_range, select_candidate, ModulusResolver, RollerCandidate, RollerTable};
pub use offset::OffsetCalculator;
pub use selection::{OptionSelection, ZipperClass};
pub use weight::WeightEstimator;
