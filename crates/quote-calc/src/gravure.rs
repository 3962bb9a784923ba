//! 凹版印刷成本計算

use quote_core::{
    BagShape, Case, CostBreakdown, PlateBracket, PlateRecommendation, PlateWeb,
    PrintingTechnology, QuoteError, WebCost,
};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::components::{CostComponents, PricingInputs};

const MM2_PER_M2: i64 = 1_000_000;

/// 凹版印刷計算器
pub struct GravureCalculator;

impl GravureCalculator {
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
        let rates = &inputs.config.gravure;
        let common = &inputs.config.common;
        let size = inputs.size;
        let custom_shaped = inputs.custom_shaped();
        let quantity = case.total_quantity_decimal();

        let length_per_package = (size.width + rates.width_allowance_mm) * Decimal::from(2);
        let height_allowance = if custom_shaped {
            rates.custom_height_allowance_mm
        } else {
            rates.height_allowance_mm
        };
        let material_width = (size.height + height_allowance) * Decimal::from(2) + size.gusset_or_zero();
        let material_area = length_per_package * material_width * quantity / Decimal::from(MM2_PER_M2);

        let mut breakdown = CostBreakdown::new(case_index, PrintingTechnology::Gravure);
        breakdown.custom_shaped = custom_shaped;
        breakdown.printing_length = length_per_package;
        breakdown.printing_width = material_width;
        breakdown.material_width = material_width;
        breakdown.material_area = material_area;
        breakdown.printing_cost = Self::printing_cost(inputs, material_area);
        breakdown.material_cost = CostComponents::material_cost(material_area, &inputs.selection);
        breakdown.lamination_cost = CostComponents::lamination_cost(material_area, &inputs.selection, common);
        breakdown.plates.push(Self::plate_recommendation(
            PlateWeb::Primary,
            length_per_package,
            material_width,
            rates.primary_perimeter_cap_mm,
        ));

        if let Some((side, plate)) = Self::second_web(inputs, quantity) {
            breakdown.printing_cost += side.printing_cost;
            breakdown.material_cost += side.material_cost;
            breakdown.lamination_cost += side.lamination_cost;
            breakdown.plates.push(plate);
            breakdown.second_web = Some(side);
        }

        breakdown.plate_fee = Self::plate_fee(inputs)?;
        let run_length_m = length_per_package * quantity / Decimal::from(1000);
        breakdown.bag_making_cost = CostComponents::bag_making_cost(inputs, run_length_m, case.total_quantity);
        breakdown.die_cutting_cost = CostComponents::die_cutting_cost(custom_shaped, common);
        breakdown.packaging_cost = CostComponents::packaging_cost(case.total_quantity, common);

        let multiplier = Self::material_multiplier(inputs);
        let subtotal = breakdown.component_sum() + breakdown.material_cost * (multiplier - Decimal::ONE);

        tracing::debug!(
            "凹印批次 {}：單袋長 {}mm，材料寬 {}mm，面積 {}m²，版費 {}，小計 {}",
            case_index,
            length_per_package,
            material_width,
            material_area,
            breakdown.plate_fee,
            subtotal
        );

        Ok(breakdown.finish(subtotal, common.overhead_markup))
    }

    /// 印刷費 = 面積 × 顏色與工藝單價合計，不低於最低收費
    fn printing_cost(inputs: &PricingInputs<'_>, area: Decimal) -> Decimal {
        (area * inputs.selection.printing_item_unit_total()).max(inputs.config.gravure.printing_floor)
    }

    /// 材料損耗係數：平底、方底袋較高
    pub fn material_multiplier(inputs: &PricingInputs<'_>) -> Decimal {
        let rates = &inputs.config.gravure;
        if inputs.shape.is_box_bottom() {
            rates.box_bottom_material_multiplier
        } else {
            rates.default_material_multiplier
        }
    }

    /// 依袋高查每支版單價
    ///
    /// 每檔上限不含，最後一檔含上限；超過最後一檔時需人工報價。
    pub fn unit_plate_cost(height: Decimal, brackets: &[PlateBracket]) -> quote_core::Result<Decimal> {
        let last = brackets.len().saturating_sub(1);
        brackets
            .iter()
            .enumerate()
            .find(|(index, bracket)| {
                height < bracket.max_height_mm || (*index == last && height == bracket.max_height_mm)
            })
            .map(|(_, bracket)| bracket.unit_cost)
            .ok_or_else(|| {
                let highest = brackets.last().map(|b| b.max_height_mm).unwrap_or_default();
                QuoteError::unsupported(format!(
                    "袋高 {}mm 超出凹印版費檔位上限 {}mm",
                    height, highest
                ))
            })
    }

    /// 版費 = 版數 × 單價 + 底部補償 + 異形加收；平底袋加倍
    pub fn plate_fee(inputs: &PricingInputs<'_>) -> quote_core::Result<Decimal> {
        let rates = &inputs.config.gravure;
        let height = inputs.size.height;

        let unit_cost = Self::unit_plate_cost(height, &rates.plate_brackets)?;
        let plate_count = Decimal::from(inputs.selection.printing_item_count());
        let mut fee = plate_count * unit_cost;

        if height >= rates.bottom_compensation_from_mm {
            fee += rates.bottom_compensation_fee;
        }
        if inputs.custom_shaped() {
            fee += rates.custom_plate_surcharge;
        }
        if inputs.shape == BagShape::FlatBottom {
            fee *= rates.flat_bottom_plate_multiplier;
        }
        Ok(fee)
    }

    /// 版輥建議：在周長上限內盡量多排
    pub fn plate_recommendation(
        web: PlateWeb,
        length_per_package: Decimal,
        material_width: Decimal,
        perimeter_cap: Decimal,
    ) -> PlateRecommendation {
        let repeats = if length_per_package > Decimal::ZERO {
            (perimeter_cap / length_per_package)
                .floor()
                .to_u32()
                .unwrap_or(1)
                .max(1)
        } else {
            1
        };

        PlateRecommendation {
            web,
            plate_length_mm: material_width,
            perimeter_mm: Decimal::from(repeats) * length_per_package,
            repeats,
        }
    }

    /// 第二幅料：平底袋、四邊封有插邊時的側面料
    fn second_web(inputs: &PricingInputs<'_>, quantity: Decimal) -> Option<(WebCost, PlateRecommendation)> {
        if !matches!(inputs.shape, BagShape::FlatBottom | BagShape::FourSideSeal) {
            return None;
        }
        let gusset = inputs.size.gusset.filter(|g| *g > Decimal::ZERO)?;

        let rates = &inputs.config.gravure;
        let length_per_package = (inputs.size.height + rates.width_allowance_mm) * Decimal::from(2);
        let mut material_width = (gusset + rates.side_gusset_allowance_mm) * Decimal::from(2);
        if inputs.custom_shaped() {
            material_width += rates.custom_height_allowance_mm;
        }
        let material_area = length_per_package * material_width * quantity / Decimal::from(MM2_PER_M2);

        let side = WebCost {
            printing_length: length_per_package,
            printing_width: material_width,
            material_area,
            material_cost: CostComponents::material_cost(material_area, &inputs.selection),
            printing_cost: Self::printing_cost(inputs, material_area),
            lamination_cost: CostComponents::lamination_cost(
                material_area,
                &inputs.selection,
                &inputs.config.common,
            ),
        };
        let plate = Self::plate_recommendation(
            PlateWeb::SecondWeb,
            length_per_package,
            material_width,
            rates.second_web_perimeter_cap_mm,
        );
        Some((side, plate))
    }
}
