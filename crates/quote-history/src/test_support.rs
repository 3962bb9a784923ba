//! 測試用的報價資料

use std::sync::Arc;

use quote_calc::QuotationCalculator;
use quote_core::{
    Case, ExchangeRate, PricingContext, PrintingTechnology, PrintingType, ProductSubcategory,
    QuoteConfig, QuoteOutcome, QuoteRequest, ReferenceCatalog, Size,
};
use rust_decimal::Decimal;

pub(crate) fn calculator() -> Arc<QuotationCalculator> {
    let catalog = ReferenceCatalog::new()
        .with_subcategory(ProductSubcategory::new(1, "3 Side Seal Bag"))
        .with_printing_type(PrintingType::new(1, PrintingTechnology::Digital));
    Arc::new(QuotationCalculator::new(Arc::new(catalog), QuoteConfig::default()))
}

pub(crate) fn request() -> QuoteRequest {
    QuoteRequest::new(1, 1, Size::new(Decimal::from(150), Decimal::from(200)))
        .with_case(Case::new(1, 100))
        .with_case(Case::new(2, 500))
}

pub(crate) fn context() -> PricingContext {
    PricingContext::new(ExchangeRate::new(Decimal::new(72, 1)))
}

pub(crate) fn sample_outcome() -> QuoteOutcome {
    calculator()
        .calculate(&request(), &context())
        .expect("樣本報價應可計算")
}
