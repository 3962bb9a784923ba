//! 膠印成本計算

use quote_core::{
    Case, CostBreakdown, LengthSurcharge, OffsetGroup, OffsetGroupKind, PrintingTechnology,
    QuoteError,
};
use rust_decimal::Decimal;

use crate::components::{CostComponents, PricingInputs};

/// 膠印計算器
///
/// 每個批次必須先由 [`crate::ModulusResolver`] 填入模數。
pub struct OffsetCalculator;

impl OffsetCalculator {
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
        let matched = case.matched.ok_or(QuoteError::ModulusNotResolved {
            num_of_styles: case.num_of_styles,
        })?;
        let rates = &inputs.config.offset;
        let common = &inputs.config.common;
        let size = inputs.size;
        let custom_shaped = inputs.custom_shaped();

        let groups = Self::printing_groups(inputs, case, matched.modulus);
        let printing_length: Decimal = groups.iter().map(|g| g.printing_length).sum();
        let mut printing_cost: Decimal = groups.iter().map(|g| g.printing_cost).sum();
        if inputs.selection.has_inner_printing() {
            printing_cost *= Decimal::from(2);
        }

        let (height_allowance, edge_trim) = if custom_shaped {
            (rates.custom_height_allowance_mm, rates.custom_edge_trim_mm)
        } else {
            (rates.height_allowance_mm, rates.edge_trim_mm)
        };
        let printing_width = (size.height + height_allowance) * Decimal::from(2) + size.gusset_or_zero() + edge_trim;
        let material_width = Self::material_width(printing_width, &rates.material_width_brackets_mm)?;
        let material_area = material_width * printing_length / Decimal::from(1000);
        let quantity = case.total_quantity_decimal();

        let mut breakdown = CostBreakdown::new(case_index, PrintingTechnology::Offset);
        breakdown.custom_shaped = custom_shaped;
        breakdown.printing_length = printing_length;
        breakdown.printing_width = printing_width;
        breakdown.material_width = material_width;
        breakdown.material_area = material_area;
        breakdown.printing_cost = printing_cost;
        breakdown.material_cost = CostComponents::material_cost(material_area, &inputs.selection);
        breakdown.lamination_cost = CostComponents::lamination_cost(material_area, &inputs.selection, common);
        breakdown.process_surcharge = Self::process_surcharge(inputs, printing_length);
        breakdown.bag_making_cost = CostComponents::bag_making_cost(inputs, printing_length, case.total_quantity);
        breakdown.die_cutting_cost = CostComponents::die_cutting_cost(custom_shaped, common);
        breakdown.labor_cost = quantity * rates.labor_cost_per_piece;
        breakdown.file_processing_fee = Decimal::from(case.num_of_styles) * rates.file_processing_fee_per_style;
        breakdown.packaging_cost = CostComponents::packaging_cost(case.total_quantity, common);
        breakdown.offset_groups = groups;
        breakdown.modulus_unmatched = matched.unmatched;
        breakdown.modulus = Some(matched);

        let subtotal = breakdown.component_sum();

        tracing::debug!(
            "膠印批次 {}：模數 {}，分組 {} 組，印刷長度 {}m，材料寬 {}mm，小計 {}",
            case_index,
            matched.modulus,
            breakdown.offset_groups.len(),
            printing_length,
            material_width,
            subtotal
        );

        Ok(breakdown.finish(subtotal, common.overhead_markup))
    }

    /// 依模數把款數分組
    ///
    /// 款數不超過模數時一組印完；否則整倍數一組（重複 ⌊款數/模數⌋ 次），
    /// 餘下的款數另成一組。
    pub fn printing_groups(inputs: &PricingInputs<'_>, case: &Case, modulus: u32) -> Vec<OffsetGroup> {
        let modulus = modulus.max(1);
        let styles = case.num_of_styles;

        if styles <= modulus {
            return vec![Self::group(inputs, case, OffsetGroupKind::Single, styles, 1, modulus)];
        }

        let repeats = styles / modulus;
        let remainder = styles % modulus;
        let mut groups = vec![Self::group(
            inputs,
            case,
            OffsetGroupKind::Multiple,
            repeats * modulus,
            repeats,
            modulus,
        )];
        if remainder > 0 {
            groups.push(Self::group(inputs, case, OffsetGroupKind::Remainder, remainder, 1, modulus));
        }
        groups
    }

    fn group(
        inputs: &PricingInputs<'_>,
        case: &Case,
        kind: OffsetGroupKind,
        styles: u32,
        repeats: u32,
        modulus: u32,
    ) -> OffsetGroup {
        let rates = &inputs.config.offset;
        let printing_length = (inputs.size.width + rates.width_allowance_mm)
            * case.effective_quantity_per_style()
            * Decimal::from(repeats)
            * Decimal::from(modulus)
            / Decimal::from(1000)
            + rates.setup_waste_m;
        let overrun = (printing_length - rates.included_length_m).max(Decimal::ZERO);
        let printing_cost = rates.base_printing_fee + overrun * rates.overrun_rate_per_meter;

        OffsetGroup {
            kind,
            styles,
            repeats,
            printing_length,
            printing_cost,
        }
    }

    /// 印刷寬度向上取整後對應到材料寬度檔位
    pub fn material_width(printing_width: Decimal, brackets: &[Decimal]) -> quote_core::Result<Decimal> {
        let width = printing_width.ceil();
        brackets
            .iter()
            .copied()
            .find(|bracket| width <= *bracket)
            .ok_or_else(|| {
                let widest = brackets.last().copied().unwrap_or_default();
                QuoteError::unsupported(format!(
                    "膠印印刷寬度 {}mm 超出最大材料寬度 {}mm",
                    width, widest
                ))
            })
    }

    /// UV、燙金附加費（按印刷長度分段）
    fn process_surcharge(inputs: &PricingInputs<'_>, printing_length: Decimal) -> Decimal {
        let rates = &inputs.config.offset;
        let overrun = (printing_length - rates.included_length_m).max(Decimal::ZERO);
        let tiered = |tier: LengthSurcharge| tier.base + overrun * tier.per_meter;

        let mut surcharge = Decimal::ZERO;
        if inputs.selection.has_uv() {
            surcharge += tiered(rates.uv);
        }
        if inputs.selection.has_gold_stamping() {
            surcharge += tiered(rates.gold_stamping);
        }
        if !inputs.shape.is_seal_or_stand_up() {
            surcharge *= rates.non_seal_surcharge_multiplier;
        }
        surcharge
    }
}
