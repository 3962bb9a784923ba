//! 數碼印刷成本計算

use quote_core::{BagShape, Case, CostBreakdown, PrintingTechnology, QuoteError, WebCost};
use rust_decimal::Decimal;

use crate::components::{CostComponents, PricingInputs};

const MM_PER_M: i64 = 1000;

/// 數碼印刷計算器
pub struct DigitalCalculator;

impl DigitalCalculator {
    /// 計算所有批次
    pub fn calculate(inputs: &PricingInputs<'_>, cases: &[Case]) -> quote_core::Result<Vec<CostBreakdown>> {
        cases
            .iter()
            .enumerate()
            .map(|(index, case)| Self::calculate_case(inputs, index, case))
            .collect()
    }

    /// 計算單一批次
    pub fn calculate_case(
        inputs: &PricingInputs<'_>,
        case_index: usize,
        case: &Case,
    ) -> quote_core::Result<CostBreakdown> {
        let rates = &inputs.config.digital;
        let common = &inputs.config.common;
        let size = inputs.size;
        let quantity = case.total_quantity_decimal();
        let custom_shaped = inputs.custom_shaped();
        let mm_per_m = Decimal::from(MM_PER_M);

        // 排版
        let printing_width = (size.height + rates.height_allowance_mm) * Decimal::from(2) + size.gusset_or_zero();
        let layout_count = Self::fit_count(rates.sheet_width_mm, printing_width, "印刷寬度")?;
        let bag_pitch = size.width + rates.bag_spacing_mm;
        let bags_per_printing = Self::fit_count(rates.sheet_length_mm, bag_pitch, "袋寬")?;

        let impressions = quantity / layout_count / bags_per_printing;
        let mut printing_cost = impressions * rates.impression_cost;
        if inputs.selection.has_inner_printing() {
            printing_cost *= Decimal::from(2);
        }

        let style_factor = Self::style_factor(case.num_of_styles, inputs);
        let printing_length = quantity / layout_count * bag_pitch / mm_per_m * style_factor + rates.setup_length_m;
        let material_area = printing_length * rates.web_width_mm / mm_per_m;

        let mut breakdown = CostBreakdown::new(case_index, PrintingTechnology::Digital);
        breakdown.custom_shaped = custom_shaped;
        breakdown.printing_length = printing_length;
        breakdown.printing_width = printing_width;
        breakdown.material_width = rates.web_width_mm;
        breakdown.material_area = material_area;
        breakdown.printing_cost = printing_cost;
        breakdown.material_cost = CostComponents::material_cost(material_area, &inputs.selection);
        breakdown.lamination_cost = CostComponents::lamination_cost(material_area, &inputs.selection, common);

        if let Some(side) = Self::side_web(inputs, case)? {
            breakdown.material_cost += side.material_cost;
            breakdown.lamination_cost += side.lamination_cost;
            breakdown.second_web = Some(side);
        }

        breakdown.process_surcharge = Self::process_surcharge(inputs, impressions);
        breakdown.bag_making_cost = CostComponents::bag_making_cost(inputs, printing_length, case.total_quantity);
        breakdown.die_cutting_cost = CostComponents::die_cutting_cost(custom_shaped, common);
        breakdown.packaging_cost = CostComponents::packaging_cost(case.total_quantity, common);

        let subtotal = breakdown.component_sum();

        tracing::debug!(
            "數碼印刷批次 {}：排版 {} × {}，印次 {}，印刷長度 {}m，小計 {}",
            case_index,
            layout_count,
            bags_per_printing,
            impressions,
            printing_length,
            subtotal
        );

        Ok(breakdown.finish(subtotal, common.overhead_markup))
    }

    /// 可排入的數量（向下取整）；為 0 時無法用數碼機印刷
    fn fit_count(available: Decimal, unit: Decimal, what: &str) -> quote_core::Result<Decimal> {
        if unit <= Decimal::ZERO {
            return Err(QuoteError::CalculationError(format!("{}必須大於 0", what)));
        }
        let count = (available / unit).floor();
        if count.is_zero() {
            return Err(QuoteError::unsupported(format!(
                "{} {}mm 超出數碼印刷幅面 {}mm",
                what, unit, available
            )));
        }
        Ok(count)
    }

    /// 款數損耗係數 = 首款係數 + (款數 − 1) × 每款係數
    fn style_factor(num_of_styles: u32, inputs: &PricingInputs<'_>) -> Decimal {
        let rates = &inputs.config.digital;
        let extra_styles = Decimal::from(num_of_styles.saturating_sub(1));
        rates.first_style_factor + extra_styles * rates.extra_style_factor
    }

    /// UV、燙金附加費（按印次）
    fn process_surcharge(inputs: &PricingInputs<'_>, impressions: Decimal) -> Decimal {
        let rates = &inputs.config.digital;
        let seal = inputs.shape.is_seal_or_stand_up();
        let mut surcharge = Decimal::ZERO;

        for (selected, tier) in [
            (inputs.selection.has_uv(), rates.uv),
            (inputs.selection.has_gold_stamping(), rates.gold_stamping),
        ] {
            if selected {
                let per_impression = if seal {
                    tier.seal_per_impression
                } else {
                    tier.other_per_impression
                };
                surcharge += impressions * per_impression + tier.fixed;
            }
        }

        surcharge
    }

    /// 側面料：平底袋、三邊封、自立袋有插邊時另外排版
    fn side_web(inputs: &PricingInputs<'_>, case: &Case) -> quote_core::Result<Option<WebCost>> {
        let size = inputs.size;
        let gusset = match size.gusset {
            Some(g) if g > Decimal::ZERO => g,
            _ => return Ok(None),
        };
        if !matches!(
            inputs.shape,
            BagShape::FlatBottom | BagShape::ThreeSideSeal | BagShape::StandUp
        ) {
            return Ok(None);
        }

        let rates = &inputs.config.digital;
        let mm_per_m = Decimal::from(MM_PER_M);
        let quantity = case.total_quantity_decimal();

        let printing_width = (gusset + rates.height_allowance_mm) * Decimal::from(2);
        let layout_count = Self::fit_count(rates.sheet_width_mm, printing_width, "側面料寬度")?;
        let run = if inputs.shape == BagShape::FlatBottom {
            size.height
        } else {
            size.width
        };
        let printing_length = quantity / layout_count * (run + rates.bag_spacing_mm) / mm_per_m
            * Self::style_factor(case.num_of_styles, inputs)
            + rates.setup_length_m;
        let material_area = printing_length * rates.web_width_mm / mm_per_m;

        Ok(Some(WebCost {
            printing_length,
            printing_width,
            material_area,
            material_cost: CostComponents::material_cost(material_area, &inputs.selection),
            printing_cost: Decimal::ZERO,
            lamination_cost: CostComponents::lamination_cost(
                material_area,
                &inputs.selection,
                &inputs.config.common,
            ),
        }))
    }
}
