//! 報價主計算器

use std::sync::Arc;

use chrono::Utc;
use quote_core::{
    Case, CostBreakdown, MarginApplied, PricingContext, PrintingTechnology, QuotationRecord,
    QuoteConfig, QuoteError, QuoteOutcome, QuoteRequest, QuoteResponse, ReferenceCatalog,
};
use rayon::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::components::PricingInputs;
use crate::digital::DigitalCalculator;
use crate::gravure::GravureCalculator;
use crate::margin::ProfitMarginAdjuster;
use crate::modulus::ModulusResolver;
use crate::offset::OffsetCalculator;
use crate::weight::WeightEstimator;

/// 報價計算器
pub struct QuotationCalculator {
    /// 參考資料快照（多個請求共用）
    catalog: Arc<ReferenceCatalog>,

    /// 報價配置
    config: QuoteConfig,

    /// 膠印模數解析器
    resolver: ModulusResolver,
}

impl QuotationCalculator {
    /// 創建新的報價計算器
    pub fn new(catalog: Arc<ReferenceCatalog>, config: QuoteConfig) -> Self {
        Self {
            catalog,
            config,
            resolver: ModulusResolver::new(),
        }
    }

    /// 建構器模式：設置模數解析器
    pub fn with_resolver(mut self, resolver: ModulusResolver) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn catalog(&self) -> &ReferenceCatalog {
        &self.catalog
    }

    pub fn config(&self) -> &QuoteConfig {
        &self.config
    }

    /// 主報價計算入口
    pub fn calculate(
        &self,
        request: &QuoteRequest,
        context: &PricingContext,
    ) -> quote_core::Result<QuoteOutcome> {
        tracing::info!(
            "開始報價計算：子類 {}，印刷方式 {}，批次 {} 筆",
            request.product_subcategory_id,
            request.printing_type_id,
            request.cases.len()
        );

        let start_time = std::time::Instant::now();

        // Step 1: 參考資料
        tracing::debug!("Step 1: 解析參考資料");
        let subcategory = self.catalog.subcategory(request.product_subcategory_id)?;
        let printing_type = self.catalog.printing_type(request.printing_type_id)?;
        let selected_options = self.catalog.resolve_selection(&request.selected_options)?;
        if context.exchange_rate.rate <= Decimal::ZERO {
            return Err(QuoteError::InvalidExchangeRate(context.exchange_rate.rate));
        }
        let technology = printing_type.technology;
        tracing::debug!("袋型: {}，印刷技術: {}", subcategory.name, technology);

        // Step 2: 尺寸檢查
        let Some(size) = request.size() else {
            tracing::info!("袋寬或袋高未填，返回空結果");
            return Ok(QuoteOutcome::empty());
        };

        // Step 3: 批次檢查
        tracing::debug!("Step 3: 批次檢查");
        Self::check_cases(&request.cases)?;

        let inputs = PricingInputs::new(size, subcategory, &selected_options, &self.config);

        // Step 4: 膠印模數匹配
        let cases: Vec<Case> = if technology == PrintingTechnology::Offset {
            tracing::debug!("Step 4: 膠印模數匹配");
            request
                .cases
                .iter()
                .map(|case| {
                    let matched = self
                        .resolver
                        .resolve(&size, case.num_of_styles, inputs.custom_shaped());
                    case.clone().with_matched(matched)
                })
                .collect()
        } else {
            request.cases.clone()
        };

        // Step 5: 逐批次計算成本（並行，保持批次順序）
        tracing::debug!("Step 5: 計算成本");
        let breakdowns = cases
            .par_iter()
            .enumerate()
            .map(|(index, case)| Self::price_case(technology, &inputs, index, case))
            .collect::<quote_core::Result<Vec<CostBreakdown>>>()?;

        // Step 6: 重量估算
        tracing::debug!("Step 6: 重量估算");
        let weights = WeightEstimator::estimate_all(
            &size,
            &inputs.shape,
            &cases,
            &inputs.selection,
            &self.config.weight,
        );

        // Step 7: 利潤率
        tracing::debug!("Step 7: 套用利潤率");
        let breakdowns = breakdowns
            .into_iter()
            .map(|mut breakdown| -> quote_core::Result<(CostBreakdown, MarginApplied)> {
                let applied = ProfitMarginAdjuster::apply(
                    breakdown.total_cost_cny,
                    technology,
                    context.tier.as_ref(),
                    &context.exchange_rate,
                )?;
                breakdown.margin = Some(applied);
                Ok((breakdown, applied))
            })
            .collect::<quote_core::Result<Vec<_>>>()?;

        // Step 8: 組裝回應與歷史記錄
        let created_at = Utc::now();
        let records = cases
            .iter()
            .zip(breakdowns.iter())
            .zip(weights.iter())
            .map(|((case, (breakdown, applied)), weight)| QuotationRecord {
                id: Uuid::new_v4(),
                created_at,
                customer_id: context.customer_id.clone(),
                customer_tier_id: context.tier.as_ref().map(|tier| tier.id),
                product_subcategory: subcategory.clone(),
                printing_type: printing_type.clone(),
                size,
                case: case.clone(),
                selected_options: selected_options.clone(),
                breakdown: breakdown.clone(),
                price_cny: applied.price_cny,
                price_usd: applied.price_usd,
                weight_kg: *weight,
                exchange_rate: context.exchange_rate,
            })
            .collect();

        let response = QuoteResponse {
            total_prices_cny: breakdowns.iter().map(|(_, applied)| applied.price_cny).collect(),
            total_prices_usd: breakdowns.iter().map(|(_, applied)| applied.price_usd).collect(),
            total_weights_kg: weights,
            per_case_breakdown: breakdowns.into_iter().map(|(breakdown, _)| breakdown).collect(),
        };

        let elapsed = start_time.elapsed().as_millis();
        tracing::info!(
            "報價計算完成：{} 筆批次，耗時 {} ms",
            response.per_case_breakdown.len(),
            elapsed
        );

        Ok(QuoteOutcome { response, records })
    }

    /// 依印刷技術分派
    fn price_case(
        technology: PrintingTechnology,
        inputs: &PricingInputs<'_>,
        index: usize,
        case: &Case,
    ) -> quote_core::Result<CostBreakdown> {
        match technology {
            PrintingTechnology::Digital => DigitalCalculator::calculate_case(inputs, index, case),
            PrintingTechnology::Offset => OffsetCalculator::calculate_case(inputs, index, case),
            PrintingTechnology::Gravure => GravureCalculator::calculate_case(inputs, index, case),
        }
    }

    fn check_cases(cases: &[Case]) -> quote_core::Result<()> {
        for (index, case) in cases.iter().enumerate() {
            if case.num_of_styles == 0 {
                return Err(QuoteError::CalculationError(format!("批次 {} 的款數為 0", index)));
            }
            if case.expected_total().is_none() {
                return Err(QuoteError::CalculationError(format!(
                    "批次 {} 的款數 {} × 每款數量 {} 超出範圍",
                    index, case.num_of_styles, case.quantity_per_style
                )));
            }
            if !case.is_consistent() {
                tracing::warn!(
                    "批次 {} 總數量 {} 與款數 {} × 每款數量 {} 不一致，以總數量計價",
                    index,
                    case.total_quantity,
                    case.num_of_styles,
                    case.quantity_per_style
                );
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quote_core::{
        CatalogOption, CustomerTier, DiscountStep, ExchangeRate, PrintingType, ProductSubcategory,
        Size, StandardOption, Suboption,
    };
    use rstest::rstest;

    fn production_process() -> StandardOption {
        StandardOption::new(10, "Production Process")
            .with_suboption(Suboption::new(11, "UV", Decimal::new(5, 2)))
            .with_suboption(Suboption::new(12, "Inner Printing", Decimal::ZERO))
            .with_suboption(Suboption::new(13, "Special Shape", Decimal::ZERO))
    }

    fn calculator() -> QuotationCalculator {
        let catalog = ReferenceCatalog::new()
            .with_subcategory(ProductSubcategory::new(1, "3 Side Seal Bag"))
            .with_subcategory(ProductSubcategory::new(2, "Flat Bottom Bag").with_gusset(true))
            .with_printing_type(PrintingType::new(1, PrintingTechnology::Digital))
            .with_printing_type(PrintingType::new(2, PrintingTechnology::Offset))
            .with_printing_type(PrintingType::new(3, PrintingTechnology::Gravure))
            .with_option(CatalogOption::Standard(production_process()));

        QuotationCalculator::new(Arc::new(catalog), QuoteConfig::default())
    }

    fn context() -> PricingContext {
        PricingContext::new(ExchangeRate::new(Decimal::new(72, 1)))
    }

    fn request(printing_type_id: u64) -> QuoteRequest {
        QuoteRequest::new(1, printing_type_id, Size::new(Decimal::from(150), Decimal::from(200)))
    }

    #[test]
    fn test_digital_quote() {
        let request = request(1).with_case(Case::new(1, 100));
        let outcome = calculator().calculate(&request, &context()).unwrap();

        assert_eq!(outcome.response.total_prices_cny.len(), 1);
        assert_eq!(
            outcome.response.total_prices_cny[0].round_dp(6),
            Decimal::new(407_187_231, 6)
        );
        assert_eq!(outcome.response.total_weights_kg, vec![Some(Decimal::new(13, 1))]);
        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.records[0].price_cny, outcome.response.total_prices_cny[0]);
    }

    #[test]
    fn test_missing_height_returns_empty_result() {
        let mut request = request(1).with_case(Case::new(1, 100));
        request.height = None;

        let outcome = calculator().calculate(&request, &context()).unwrap();
        assert!(outcome.response.is_empty());
        assert!(outcome.records.is_empty());
    }

    #[test]
    fn test_unknown_references() {
        let mut unknown_subcategory = request(1).with_case(Case::new(1, 100));
        unknown_subcategory.product_subcategory_id = 99;
        assert!(matches!(
            calculator().calculate(&unknown_subcategory, &context()),
            Err(QuoteError::UnknownSubcategory(99))
        ));

        let unknown_printing_type = request(42).with_case(Case::new(1, 100));
        assert!(matches!(
            calculator().calculate(&unknown_printing_type, &context()),
            Err(QuoteError::UnknownPrintingType(42))
        ));
    }

    #[test]
    fn test_unknown_option_rejected() {
        let request = request(1)
            .with_case(Case::new(1, 100))
            .with_option(StandardOption::new(99, "Window"));

        assert!(matches!(
            calculator().calculate(&request, &context()),
            Err(QuoteError::UnknownSelection(_))
        ));
    }

    #[test]
    fn test_offset_cases_get_modulus() {
        let request = QuoteRequest::new(1, 2, Size::new(Decimal::from(100), Decimal::from(120)))
            .with_case(Case::new(6, 1000))
            .with_case(Case::new(5, 1000));

        let outcome = calculator().calculate(&request, &context()).unwrap();
        let moduli: Vec<u32> = outcome
            .response
            .per_case_breakdown
            .iter()
            .filter_map(|b| b.modulus.map(|m| m.modulus))
            .collect();

        assert_eq!(moduli, vec![6, 5]);
        assert_eq!(outcome.records[1].case.matched.map(|m| m.modulus), Some(5));
    }

    #[test]
    fn test_case_order_is_preserved() {
        let request = (1..=20).fold(request(1), |request, qty| request.with_case(Case::new(1, qty * 500)));

        let outcome = calculator().calculate(&request, &context()).unwrap();
        let indices: Vec<usize> = outcome.response.per_case_breakdown.iter().map(|b| b.case_index).collect();

        assert_eq!(indices, (0..20).collect::<Vec<_>>());
        assert!(outcome
            .response
            .total_prices_cny
            .windows(2)
            .all(|pair| pair[0] <= pair[1]));
    }

    #[test]
    fn test_tier_margin_applied() {
        let tier = CustomerTier::new(7, "Silver")
            .with_margins(Decimal::from(30), Decimal::from(25), Decimal::from(20))
            .with_discounts(Decimal::from(1000), Decimal::from(5), Decimal::from(5000), Decimal::from(10));
        let context = context().with_customer("C-001", Some(tier));
        let request = request(1).with_case(Case::new(1, 100));

        let outcome = calculator().calculate(&request, &context).unwrap();
        let breakdown = &outcome.response.per_case_breakdown[0];
        let margin = breakdown.margin.unwrap();

        assert_eq!(margin.step, DiscountStep::Base);
        assert_eq!(margin.price_cny, breakdown.total_cost_cny * Decimal::new(13, 1));
        assert_eq!(outcome.records[0].customer_tier_id, Some(7));
        assert_eq!(outcome.records[0].customer_id.as_deref(), Some("C-001"));
    }

    #[test]
    fn test_zero_styles_rejected() {
        let mut case = Case::new(1, 100);
        case.num_of_styles = 0;
        let request = request(1).with_case(case);

        assert!(matches!(
            calculator().calculate(&request, &context()),
            Err(QuoteError::CalculationError(_))
        ));
    }

    #[test]
    fn test_invalid_exchange_rate_rejected() {
        let request = request(1).with_case(Case::new(1, 100));
        let context = PricingContext::new(ExchangeRate::new(Decimal::ZERO));

        assert!(matches!(
            calculator().calculate(&request, &context),
            Err(QuoteError::InvalidExchangeRate(_))
        ));
    }

    #[test]
    fn test_selection_is_priced_from_catalog() {
        let honest = request(3)
            .with_case(Case::new(1, 10_000))
            .with_option(StandardOption::new(10, "Production Process").with_suboption(Suboption::new(
                11,
                "UV",
                Decimal::new(5, 2),
            )));
        // 同樣的 id，改名為異形並把單價改成 0
        let spoofed = request(3)
            .with_case(Case::new(1, 10_000))
            .with_option(StandardOption::new(10, "Production Process").with_suboption(Suboption::new(
                11,
                "Special Shape",
                Decimal::ZERO,
            )));

        let honest = calculator().calculate(&honest, &context()).unwrap();
        let spoofed = calculator().calculate(&spoofed, &context()).unwrap();

        let breakdown = &spoofed.response.per_case_breakdown[0];
        assert!(!breakdown.custom_shaped);
        assert_eq!(breakdown.die_cutting_cost, Decimal::ZERO);
        assert_eq!(spoofed.response.total_prices_cny, honest.response.total_prices_cny);
        assert_eq!(
            spoofed.records[0].selected_options[0].as_standard().unwrap().suboptions[0].name,
            "UV"
        );
    }

    #[test]
    fn test_overflowing_case_rejected() {
        let case = Case {
            num_of_styles: 4,
            quantity_per_style: i64::MAX as u64,
            total_quantity: 1000,
            matched: None,
        };
        let request = request(1).with_case(case);

        assert!(matches!(
            calculator().calculate(&request, &context()),
            Err(QuoteError::CalculationError(_))
        ));
    }

    #[rstest]
    #[case(2, Size::new(Decimal::from(100), Decimal::from(120)), Case::new(2, 1000))]
    #[case(3, Size::new(Decimal::from(150), Decimal::from(200)), Case::new(1, 10_000))]
    #[case(1, Size::new(Decimal::from(150), Decimal::from(200)), Case::new(1, 100))]
    fn test_die_cutting_only_for_special_shape(
        #[case] printing_type_id: u64,
        #[case] size: Size,
        #[case] case: Case,
    ) {
        let plain = QuoteRequest::new(1, printing_type_id, size).with_case(case);
        let shaped = plain.clone().with_option(
            StandardOption::new(10, "Production Process")
                .with_suboption(Suboption::new(13, "Special Shape", Decimal::ZERO)),
        );

        let plain = calculator().calculate(&plain, &context()).unwrap();
        let shaped = calculator().calculate(&shaped, &context()).unwrap();

        assert_eq!(plain.response.per_case_breakdown[0].die_cutting_cost, Decimal::ZERO);
        assert_eq!(shaped.response.per_case_breakdown[0].die_cutting_cost, Decimal::from(600));
        assert!(shaped.response.per_case_breakdown[0].custom_shaped);
    }
}
