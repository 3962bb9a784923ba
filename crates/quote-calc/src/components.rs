//! 三種印刷方式共用的成本項目

use quote_core::{BagShape, CommonRates, ProductSubcategory, QuoteConfig, RateFloor, SelectableOption, Size};
use rust_decimal::Decimal;

use crate::selection::{OptionSelection, ZipperClass};

/// 單次報價的計算輸入
#[derive(Debug, Clone)]
pub struct PricingInputs<'a> {
    pub size: Size,
    pub subcategory: &'a ProductSubcategory,
    pub shape: BagShape,
    pub selection: OptionSelection<'a>,
    pub config: &'a QuoteConfig,
}

impl<'a> PricingInputs<'a> {
    pub fn new(
        size: Size,
        subcategory: &'a ProductSubcategory,
        options: &'a [SelectableOption],
        config: &'a QuoteConfig,
    ) -> Self {
        Self {
            size,
            subcategory,
            shape: subcategory.shape(),
            selection: OptionSelection::new(options),
            config,
        }
    }

    /// 是否為異形袋
    pub fn custom_shaped(&self) -> bool {
        self.selection.is_custom_shaped()
    }
}

/// 共用成本計算器
pub struct CostComponents;

impl CostComponents {
    /// 材料費 = 面積 × 已選材料單價合計
    pub fn material_cost(area: Decimal, selection: &OptionSelection<'_>) -> Decimal {
        area * selection.material_unit_price_total()
    }

    /// 複合費 = (基礎單價 + 每層單價 × 層數) × 面積
    pub fn lamination_cost(area: Decimal, selection: &OptionSelection<'_>, rates: &CommonRates) -> Decimal {
        let layers = Decimal::from(selection.lamination_layer_count());
        (rates.lamination_base_rate + rates.lamination_per_layer_rate * layers) * area
    }

    /// 刀模費：僅異形袋收取
    pub fn die_cutting_cost(custom_shaped: bool, rates: &CommonRates) -> Decimal {
        if custom_shaped {
            rates.die_cutting_fee
        } else {
            Decimal::ZERO
        }
    }

    /// 包裝費 = 箱數 × 每箱費用
    pub fn packaging_cost(total_quantity: u64, rates: &CommonRates) -> Decimal {
        let cartons = total_quantity.div_ceil(rates.packaging_units_per_carton.max(1));
        Decimal::from(cartons) * rates.packaging_cost_per_carton
    }

    /// 制袋費
    ///
    /// 依拉鏈類別與是否異形選擇單價及最低收費，再乘上袋型係數；
    /// 窄袋（寬度低於門檻）按最低數量計價。配件按個另計。
    pub fn bag_making_cost(inputs: &PricingInputs<'_>, run_length_m: Decimal, total_quantity: u64) -> Decimal {
        let rates = &inputs.config.bag_making;
        let rate = Self::bag_making_rate(inputs);

        let mut base = rate.charge(run_length_m) * Self::shape_multiplier(&inputs.shape, inputs.config);
        let mut billed_quantity = total_quantity;

        if inputs.size.width < rates.narrow_width_threshold_mm {
            billed_quantity = billed_quantity.max(rates.narrow_width_min_quantity);
            let narrow_floor = Decimal::from(rates.narrow_width_min_quantity) * rates.narrow_width_unit_rate;
            base = base.max(narrow_floor);
        }

        let accessories = inputs.selection.accessory_unit_total() * Decimal::from(billed_quantity);

        tracing::trace!(
            "制袋費：長度 {}m，基礎 {}，配件 {}（計價數量 {}）",
            run_length_m,
            base,
            accessories,
            billed_quantity
        );

        base + accessories
    }

    fn bag_making_rate(inputs: &PricingInputs<'_>) -> RateFloor {
        let rates = &inputs.config.bag_making;
        match (inputs.custom_shaped(), inputs.selection.zipper_class()) {
            (false, ZipperClass::Standard) => rates.standard_zipper,
            (false, ZipperClass::Special) => rates.special_zipper,
            (true, ZipperClass::Standard) => rates.custom_standard_zipper,
            (true, ZipperClass::Special) => rates.custom_special_zipper,
        }
    }

    /// 袋型制袋係數
    pub fn shape_multiplier(shape: &BagShape, config: &QuoteConfig) -> Decimal {
        let rates = &config.bag_making;
        match shape {
            BagShape::FlatBottom => rates.flat_bottom_multiplier,
            BagShape::SquareBottom => rates.square_bottom_multiplier,
            BagShape::Spout => rates.spout_multiplier,
            _ => Decimal::ONE,
        }
    }
}
