//! # Quote Core
//!
//! 軟包裝報價核心資料模型與類型定義

pub mod case;
pub mod catalog;
pub mod config;
pub mod option;
pub mod quote;

// Re-export 主要類型
pub use case::{Case, ModulusMatch, Size};
pub use catalog::{
    BagShape, CatalogOption, CustomerTier, ExchangeRate, MaterialChoices, PrintingTechnology,
    PrintingType, ProductSubcategory, ReferenceCatalog,
};
pub use config::{
    BagMakingRates, CommonRates, DigitalRates, GravureRates, ImpressionSurcharge,
    LengthSurcharge, OffsetRates, PlateBracket, QuoteConfig, RateFloor, WeightRates,
};
pub use option::{
    LayerSlot, MaterialLayers, MaterialOption, MaterialSuboption, SelectableOption,
    StandardOption, Suboption, MAX_MATERIAL_LAYERS,
};
pub use quote::{
    CostBreakdown, DiscountStep, MarginApplied, OffsetGroup, OffsetGroupKind, PlateRecommendation,
    PlateWeb, PricingContext, QuotationRecord, QuoteOutcome, QuoteRequest, QuoteResponse, WebCost,
};

/// 非標準規格時給使用者的提示
pub const MANUAL_QUOTE_HINT: &str = "非標準規格，請聯繫業務人員確認報價";

/// 報價錯誤類型
#[derive(Debug, thiserror::Error)]
pub enum QuoteError {
    #[error("{reason}（{hint}）", hint = MANUAL_QUOTE_HINT)]
    UnsupportedConfiguration { reason: String },

    #[error("膠印報價缺少模數匹配結果（款數 {num_of_styles}）")]
    ModulusNotResolved { num_of_styles: u32 },

    #[error("找不到產品子類: {0}")]
    UnknownSubcategory(u64),

    #[error("找不到印刷方式: {0}")]
    UnknownPrintingType(u64),

    #[error("選項不在參考資料中: {0}")]
    UnknownSelection(String),

    #[error("材料層索引超出範圍: {index}（上限 {max}）")]
    LayerIndexOutOfRange { index: usize, max: usize },

    #[error("無效的匯率: {0}")]
    InvalidExchangeRate(rust_decimal::Decimal),

    #[error("無效的報價配置: {0}")]
    InvalidConfig(String),

    #[error("計算錯誤: {0}")]
    CalculationError(String),
}

impl QuoteError {
    /// 建立非標準規格錯誤
    pub fn unsupported(reason: impl Into<String>) -> Self {
        Self::UnsupportedConfiguration {
            reason: reason.into(),
        }
    }

    /// 是否需要轉人工報價
    pub fn requires_manual_quote(&self) -> bool {
        matches!(self, Self::UnsupportedConfiguration { .. })
    }
}

pub type Result<T> = std::result::Result<T, QuoteError>;
