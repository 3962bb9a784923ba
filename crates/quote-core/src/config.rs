//! 報價配置模型
//!
//! 所有業務常數（加成係數、材料寬度檔位、版輥周長上限等）集中於此，
//! 可透過 JSON 局部覆寫。

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{QuoteError, Result};

/// 報價配置
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct QuoteConfig {
    /// 三種印刷共用的費率
    pub common: CommonRates,

    /// 制袋費率
    pub bag_making: BagMakingRates,

    /// 數碼印刷
    pub digital: DigitalRates,

    /// 膠印
    pub offset: OffsetRates,

    /// 凹版印刷
    pub gravure: GravureRates,

    /// 重量估算
    pub weight: WeightRates,
}

impl QuoteConfig {
    /// 從 JSON 讀取配置，未提供的欄位（含巢狀費率中的單一欄位）使用預設值
    ///
    /// # 範例
    /// ```
    /// # use quote_core::QuoteConfig;
    /// let config = QuoteConfig::from_json_str(r#"{"common": {"overheadMarkup": "1.10"}}"#).unwrap();
    /// assert_eq!(config.common.overhead_markup.to_string(), "1.10");
    /// ```
    pub fn from_json_str(json: &str) -> Result<Self> {
        let invalid = |e: serde_json::Error| QuoteError::InvalidConfig(e.to_string());

        let overrides: serde_json::Value = serde_json::from_str(json).map_err(invalid)?;
        let mut merged = serde_json::to_value(Self::default()).map_err(invalid)?;
        merge_json(&mut merged, overrides);

        let config: Self = serde_json::from_value(merged).map_err(invalid)?;
        config.validate()?;
        Ok(config)
    }

    /// 建構器模式：設置整體加成係數
    pub fn with_overhead_markup(mut self, markup: Decimal) -> Self {
        self.common.overhead_markup = markup;
        self
    }

    /// 建構器模式：設置膠印材料寬度檔位
    pub fn with_offset_material_widths(mut self, brackets: Vec<Decimal>) -> Self {
        self.offset.material_width_brackets_mm = brackets;
        self
    }

    /// 建構器模式：設置凹印版輥周長上限
    pub fn with_gravure_perimeter_caps(mut self, primary: Decimal, second_web: Decimal) -> Self {
        self.gravure.primary_perimeter_cap_mm = primary;
        self.gravure.second_web_perimeter_cap_mm = second_web;
        self
    }

    /// 建構器模式：設置凹印材料損耗係數
    pub fn with_gravure_material_multipliers(mut self, box_bottom: Decimal, default: Decimal) -> Self {
        self.gravure.box_bottom_material_multiplier = box_bottom;
        self.gravure.default_material_multiplier = default;
        self
    }

    /// 檢查配置是否可用
    pub fn validate(&self) -> Result<()> {
        fn positive(value: Decimal, field: &str) -> Result<()> {
            if value <= Decimal::ZERO {
                return Err(QuoteError::InvalidConfig(format!("{} 必須大於 0", field)));
            }
            Ok(())
        }

        positive(self.common.overhead_markup, "common.overheadMarkup")?;
        if self.common.packaging_units_per_carton == 0 {
            return Err(QuoteError::InvalidConfig(
                "common.packagingUnitsPerCarton 必須大於 0".to_string(),
            ));
        }
        positive(self.digital.sheet_width_mm, "digital.sheetWidthMm")?;
        positive(self.digital.sheet_length_mm, "digital.sheetLengthMm")?;
        positive(self.digital.web_width_mm, "digital.webWidthMm")?;

        let brackets = &self.offset.material_width_brackets_mm;
        if brackets.is_empty() || brackets.windows(2).any(|w| w[0] >= w[1]) {
            return Err(QuoteError::InvalidConfig(
                "offset.materialWidthBracketsMm 必須為非空的遞增序列".to_string(),
            ));
        }

        let plates = &self.gravure.plate_brackets;
        if plates.is_empty() || plates.windows(2).any(|w| w[0].max_height_mm >= w[1].max_height_mm) {
            return Err(QuoteError::InvalidConfig(
                "gravure.plateBrackets 必須為非空且按高度遞增".to_string(),
            ));
        }
        positive(self.gravure.primary_perimeter_cap_mm, "gravure.primaryPerimeterCapMm")?;
        positive(self.gravure.second_web_perimeter_cap_mm, "gravure.secondWebPerimeterCapMm")?;

        if self.weight.units_per_carton == 0 || self.weight.spout_units_per_carton == 0 {
            return Err(QuoteError::InvalidConfig(
                "weight 每箱數量必須大於 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// 共用費率
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CommonRates {
    /// 整體加成係數
    pub overhead_markup: Decimal,

    /// 複合費基礎單價（CNY/m²）
    pub lamination_base_rate: Decimal,

    /// 複合費每層單價（CNY/m²）
    pub lamination_per_layer_rate: Decimal,

    /// 異形刀模費
    pub die_cutting_fee: Decimal,

    /// 每箱裝袋數
    pub packaging_units_per_carton: u64,

    /// 每箱包裝費
    pub packaging_cost_per_carton: Decimal,
}

impl Default for CommonRates {
    fn default() -> Self {
        Self {
            overhead_markup: Decimal::new(108, 2),
            lamination_base_rate: Decimal::new(25, 2),
            lamination_per_layer_rate: Decimal::new(15, 2),
            die_cutting_fee: Decimal::from(600),
            packaging_units_per_carton: 2000,
            packaging_cost_per_carton: Decimal::from(10),
        }
    }
}

/// 把覆寫值逐層合併到預設值上；陣列與純量整個取代
fn merge_json(base: &mut serde_json::Value, overrides: serde_json::Value) {
    match (base, overrides) {
        (serde_json::Value::Object(base), serde_json::Value::Object(overrides)) => {
            for (key, value) in overrides {
                match base.get_mut(&key) {
                    Some(slot) => merge_json(slot, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, overrides) => *base = overrides,
    }
}

/// 單價與最低收費
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateFloor {
    /// 每米單價
    pub rate_per_meter: Decimal,

    /// 最低收費
    pub floor: Decimal,
}

impl RateFloor {
    pub fn new(rate_per_meter: Decimal, floor: Decimal) -> Self {
        Self {
            rate_per_meter,
            floor,
        }
    }

    /// 按長度計價，不低於最低收費
    pub fn charge(&self, length_m: Decimal) -> Decimal {
        (self.rate_per_meter * length_m).max(self.floor)
    }
}

/// 制袋費率
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BagMakingRates {
    /// 無拉鏈／普通拉鏈
    pub standard_zipper: RateFloor,

    /// 特殊拉鏈（兒童鎖、易撕、可降解等）
    pub special_zipper: RateFloor,

    /// 異形 + 無拉鏈／普通拉鏈
    pub custom_standard_zipper: RateFloor,

    /// 異形 + 特殊拉鏈
    pub custom_special_zipper: RateFloor,

    /// 平底袋係數
    pub flat_bottom_multiplier: Decimal,

    /// 方底袋係數
    pub square_bottom_multiplier: Decimal,

    /// 吸嘴袋係數
    pub spout_multiplier: Decimal,

    /// 窄袋寬度門檻（mm）
    pub narrow_width_threshold_mm: Decimal,

    /// 窄袋最低計價數量
    pub narrow_width_min_quantity: u64,

    /// 窄袋每個最低制袋費
    pub narrow_width_unit_rate: Decimal,
}

impl Default for BagMakingRates {
    fn default() -> Self {
        Self {
            standard_zipper: RateFloor::new(Decimal::new(30, 2), Decimal::from(300)),
            special_zipper: RateFloor::new(Decimal::new(45, 2), Decimal::from(450)),
            custom_standard_zipper: RateFloor::new(Decimal::new(45, 2), Decimal::from(450)),
            custom_special_zipper: RateFloor::new(Decimal::new(55, 2), Decimal::from(550)),
            flat_bottom_multiplier: Decimal::new(15, 1),
            square_bottom_multiplier: Decimal::new(13, 1),
            spout_multiplier: Decimal::new(12, 1),
            narrow_width_threshold_mm: Decimal::from(100),
            narrow_width_min_quantity: 5000,
            narrow_width_unit_rate: Decimal::new(8, 2),
        }
    }
}

/// 按印次計價的工藝附加費
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpressionSurcharge {
    /// 三邊封／自立袋每印次
    pub seal_per_impression: Decimal,

    /// 其他袋型每印次
    pub other_per_impression: Decimal,

    /// 固定費
    pub fixed: Decimal,
}

/// 數碼印刷費率
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DigitalRates {
    /// 印刷幅面寬（mm）
    pub sheet_width_mm: Decimal,

    /// 印刷幅面長（mm）
    pub sheet_length_mm: Decimal,

    /// 袋間距（mm）
    pub bag_spacing_mm: Decimal,

    /// 袋高放量（mm）
    pub height_allowance_mm: Decimal,

    /// 每印次單價
    pub impression_cost: Decimal,

    /// 材料幅寬（mm）
    pub web_width_mm: Decimal,

    /// 首款損耗係數
    pub first_style_factor: Decimal,

    /// 每增加一款的損耗係數
    pub extra_style_factor: Decimal,

    /// 開機放料長度（m）
    pub setup_length_m: Decimal,

    /// UV 工藝
    pub uv: ImpressionSurcharge,

    /// 燙金工藝
    pub gold_stamping: ImpressionSurcharge,
}

impl Default for DigitalRates {
    fn default() -> Self {
        Self {
            sheet_width_mm: Decimal::from(740),
            sheet_length_mm: Decimal::from(1120),
            bag_spacing_mm: Decimal::from(5),
            height_allowance_mm: Decimal::from(10),
            impression_cost: Decimal::new(38, 1),
            web_width_mm: Decimal::from(760),
            first_style_factor: Decimal::new(11, 1),
            extra_style_factor: Decimal::new(5, 1),
            setup_length_m: Decimal::from(50),
            uv: ImpressionSurcharge {
                seal_per_impression: Decimal::new(6, 1),
                other_per_impression: Decimal::new(8, 1),
                fixed: Decimal::from(210),
            },
            gold_stamping: ImpressionSurcharge {
                seal_per_impression: Decimal::new(8, 1),
                other_per_impression: Decimal::ONE,
                fixed: Decimal::from(230),
            },
        }
    }
}

/// 按長度分段計價的工藝附加費
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LengthSurcharge {
    /// 起步價（涵蓋包含長度）
    pub base: Decimal,

    /// 超出部分每米
    pub per_meter: Decimal,
}

/// 膠印費率
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OffsetRates {
    /// 袋寬放量（mm）
    pub width_allowance_mm: Decimal,

    /// 袋高放量（mm）
    pub height_allowance_mm: Decimal,

    /// 異形袋高放量（mm）
    pub custom_height_allowance_mm: Decimal,

    /// 印刷寬度修邊（mm）
    pub edge_trim_mm: Decimal,

    /// 異形印刷寬度修邊（mm）
    pub custom_edge_trim_mm: Decimal,

    /// 每組開機損耗（m）
    pub setup_waste_m: Decimal,

    /// 印刷起步價
    pub base_printing_fee: Decimal,

    /// 起步價包含長度（m）
    pub included_length_m: Decimal,

    /// 超長每米單價
    pub overrun_rate_per_meter: Decimal,

    /// 材料寬度檔位（mm，遞增）
    pub material_width_brackets_mm: Vec<Decimal>,

    /// 人工費（每個）
    pub labor_cost_per_piece: Decimal,

    /// 文件處理費（每款）
    pub file_processing_fee_per_style: Decimal,

    /// UV 工藝
    pub uv: LengthSurcharge,

    /// 燙金工藝
    pub gold_stamping: LengthSurcharge,

    /// 非三邊封／自立袋的附加費係數
    pub non_seal_surcharge_multiplier: Decimal,
}

impl Default for OffsetRates {
    fn default() -> Self {
        Self {
            width_allowance_mm: Decimal::from(10),
            height_allowance_mm: Decimal::from(6),
            custom_height_allowance_mm: Decimal::from(10),
            edge_trim_mm: Decimal::from(20),
            custom_edge_trim_mm: Decimal::from(24),
            setup_waste_m: Decimal::from(250),
            base_printing_fee: Decimal::from(1300),
            included_length_m: Decimal::from(1000),
            overrun_rate_per_meter: Decimal::new(2, 1),
            material_width_brackets_mm: [310, 360, 400, 460, 520]
                .into_iter()
                .map(Decimal::from)
                .collect(),
            labor_cost_per_piece: Decimal::new(2, 2),
            file_processing_fee_per_style: Decimal::from(50),
            uv: LengthSurcharge {
                base: Decimal::from(800),
                per_meter: Decimal::new(30, 2),
            },
            gold_stamping: LengthSurcharge {
                base: Decimal::from(1000),
                per_meter: Decimal::new(40, 2),
            },
            non_seal_surcharge_multiplier: Decimal::new(125, 2),
        }
    }
}

/// 凹印版費檔位
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlateBracket {
    /// 袋高上限（mm，不含；最後一檔含）
    pub max_height_mm: Decimal,

    /// 每支版單價
    pub unit_cost: Decimal,
}

/// 凹版印刷費率
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GravureRates {
    /// 印刷費最低收費
    pub printing_floor: Decimal,

    /// 袋寬放量（mm）
    pub width_allowance_mm: Decimal,

    /// 袋高放量（mm）
    pub height_allowance_mm: Decimal,

    /// 異形袋高放量（mm）
    pub custom_height_allowance_mm: Decimal,

    /// 側面料插邊放量（mm）
    pub side_gusset_allowance_mm: Decimal,

    /// 版費檔位
    pub plate_brackets: Vec<PlateBracket>,

    /// 底部補償費
    pub bottom_compensation_fee: Decimal,

    /// 收取底部補償費的最低袋高（mm）
    pub bottom_compensation_from_mm: Decimal,

    /// 異形加收版費
    pub custom_plate_surcharge: Decimal,

    /// 主料版輥周長上限（mm）
    pub primary_perimeter_cap_mm: Decimal,

    /// 側面料版輥周長上限（mm）
    pub second_web_perimeter_cap_mm: Decimal,

    /// 平底袋版費倍數
    pub flat_bottom_plate_multiplier: Decimal,

    /// 平底／方底材料損耗係數
    pub box_bottom_material_multiplier: Decimal,

    /// 其他袋型材料損耗係數
    pub default_material_multiplier: Decimal,
}

impl Default for GravureRates {
    fn default() -> Self {
        Self {
            printing_floor: Decimal::from(500),
            width_allowance_mm: Decimal::new(25, 1),
            height_allowance_mm: Decimal::from(10),
            custom_height_allowance_mm: Decimal::from(20),
            side_gusset_allowance_mm: Decimal::from(10),
            plate_brackets: [(200, 350), (250, 450), (350, 550), (400, 650), (500, 750)]
                .into_iter()
                .map(|(max_height, unit_cost)| PlateBracket {
                    max_height_mm: Decimal::from(max_height),
                    unit_cost: Decimal::from(unit_cost),
                })
                .collect(),
            bottom_compensation_fee: Decimal::from(200),
            bottom_compensation_from_mm: Decimal::from(200),
            custom_plate_surcharge: Decimal::from(1500),
            primary_perimeter_cap_mm: Decimal::from(800),
            second_web_perimeter_cap_mm: Decimal::from(400),
            flat_bottom_plate_multiplier: Decimal::from(2),
            box_bottom_material_multiplier: Decimal::new(155, 2),
            default_material_multiplier: Decimal::new(135, 2),
        }
    }
}

/// 重量估算參數
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WeightRates {
    /// 面密度換算除數
    pub density_divisor: Decimal,

    /// 立體袋型結構係數
    pub structural_multiplier: Decimal,

    /// 每個配件重量（kg）
    pub accessory_weight_per_piece: Decimal,

    /// 吸嘴袋每個配件重量（kg）
    pub spout_accessory_weight_per_piece: Decimal,

    /// 每箱裝袋數（每箱 1kg 包材）
    pub units_per_carton: u64,

    /// 吸嘴袋每箱裝袋數
    pub spout_units_per_carton: u64,
}

impl Default for WeightRates {
    fn default() -> Self {
        Self {
            density_divisor: Decimal::from(10000),
            structural_multiplier: Decimal::new(1212, 3),
            accessory_weight_per_piece: Decimal::new(3, 3),
            spout_accessory_weight_per_piece: Decimal::new(36, 4),
            units_per_carton: 2000,
            spout_units_per_carton: 500,
        }
    }
}
