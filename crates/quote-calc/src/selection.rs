//! 已選選項查詢

use quote_core::{MaterialSuboption, SelectableOption, StandardOption, Suboption};
use rust_decimal::Decimal;

/// 選項名稱（不分大小寫比對）
pub mod names {
    pub const PRODUCTION_PROCESS: &str = "production process";
    pub const ZIPPER_TYPE: &str = "zipper type";
    pub const LAYER_MATERIAL: &str = "layer material";
    pub const COLOR: &str = "color";

    pub const SPECIAL_SHAPE: &str = "special shape";
    pub const INNER_PRINTING: &str = "inner printing";
    pub const UV: &str = "uv";
    pub const GOLD_STAMPING: &str = "gold stamping";
    pub const NO_ZIPPER: &str = "no zipper";

    /// 按個計價的配件
    pub const ACCESSORIES: [&str; 3] = ["valve", "spout", "tin tie"];

    pub const STANDARD_ZIPPERS: [&str; 2] = ["no zipper", "normal zipper"];
}

/// 拉鏈類別
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZipperClass {
    /// 無拉鏈／普通拉鏈
    Standard,
    /// 兒童鎖、易撕、可降解、骨條、粉末、滑塊、魔術貼等
    Special,
}

impl ZipperClass {
    pub fn classify(zipper_name: &str) -> Self {
        if names::STANDARD_ZIPPERS
            .iter()
            .any(|name| zipper_name.eq_ignore_ascii_case(name))
        {
            Self::Standard
        } else {
            Self::Special
        }
    }
}

/// 已選選項的唯讀視圖
#[derive(Debug, Clone, Copy)]
pub struct OptionSelection<'a> {
    options: &'a [SelectableOption],
}

impl<'a> OptionSelection<'a> {
    pub fn new(options: &'a [SelectableOption]) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &'a [SelectableOption] {
        self.options
    }

    /// 依名稱查找一般選項
    pub fn standard(&self, name: &str) -> Option<&'a StandardOption> {
        self.options
            .iter()
            .filter_map(SelectableOption::as_standard)
            .find(|option| option.name.eq_ignore_ascii_case(name))
    }

    fn standard_suboptions(&self, name: &str) -> impl Iterator<Item = &'a Suboption> {
        self.standard(name)
            .into_iter()
            .flat_map(|option| option.suboptions.iter())
    }

    /// 所有材料選項中的已選材料
    pub fn materials(&self) -> impl Iterator<Item = &'a MaterialSuboption> {
        self.options
            .iter()
            .filter_map(SelectableOption::as_material)
            .flat_map(|option| option.layers.selected())
    }

    /// 是否選了某個生產工藝
    pub fn has_process(&self, suboption_name: &str) -> bool {
        self.standard(names::PRODUCTION_PROCESS)
            .and_then(|option| option.find_suboption(suboption_name))
            .is_some()
    }

    /// 是否為異形袋
    pub fn is_custom_shaped(&self) -> bool {
        self.has_process(names::SPECIAL_SHAPE)
    }

    /// 是否選了里印
    pub fn has_inner_printing(&self) -> bool {
        self.has_process(names::INNER_PRINTING)
    }

    pub fn has_uv(&self) -> bool {
        self.has_process(names::UV)
    }

    pub fn has_gold_stamping(&self) -> bool {
        self.has_process(names::GOLD_STAMPING)
    }

    /// 已選拉鏈名稱，未選時為 "No Zipper"
    pub fn zipper_name(&self) -> &'a str {
        self.standard_suboptions(names::ZIPPER_TYPE)
            .next()
            .map(|suboption| suboption.name.as_str())
            .unwrap_or("No Zipper")
    }

    pub fn zipper_class(&self) -> ZipperClass {
        ZipperClass::classify(self.zipper_name())
    }

    /// 已選材料單價合計（CNY/m²）
    pub fn material_unit_price_total(&self) -> Decimal {
        self.materials()
            .map(|material| material.unit_price_per_square_meter)
            .sum()
    }

    /// 面密度 = Σ 密度 × 厚度
    pub fn surface_density(&self) -> Decimal {
        self.materials().map(MaterialSuboption::surface_density).sum()
    }

    /// 複合層數：「Layer Material」中已選材料的層數
    pub fn lamination_layer_count(&self) -> usize {
        self.options
            .iter()
            .filter_map(SelectableOption::as_material)
            .find(|option| option.name.eq_ignore_ascii_case(names::LAYER_MATERIAL))
            .map(|option| option.layers.selected_count())
            .unwrap_or(0)
    }

    /// 配件（氣閥、吸嘴、鐵絲扎口）每個單價合計
    pub fn accessory_unit_total(&self) -> Decimal {
        self.standard_suboptions(names::PRODUCTION_PROCESS)
            .filter(|suboption| names::ACCESSORIES.iter().any(|name| suboption.name_is(name)))
            .map(|suboption| suboption.unit_price_per_square_meter)
            .sum()
    }

    /// 顏色與生產工藝的子選項（凹印印刷費與版數）
    fn printing_items(&self) -> impl Iterator<Item = &'a Suboption> {
        self.standard_suboptions(names::COLOR)
            .chain(self.standard_suboptions(names::PRODUCTION_PROCESS))
    }

    pub fn printing_item_unit_total(&self) -> Decimal {
        self.printing_items()
            .map(|suboption| suboption.unit_price_per_square_meter)
            .sum()
    }

    pub fn printing_item_count(&self) -> usize {
        self.printing_items().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quote_core::{MaterialLayers, MaterialOption};
    use rstest::rstest;

    fn options() -> Vec<SelectableOption> {
        let pet = MaterialSuboption::new(1, "PET", Decimal::new(14, 1), Decimal::from(12), Decimal::new(15, 1));
        let pe = MaterialSuboption::new(2, "PE", Decimal::new(92, 2), Decimal::from(80), Decimal::new(22, 1));
        vec![
            SelectableOption::Standard(
                StandardOption::new(1, "Production Process")
                    .with_suboption(Suboption::new(11, "Special Shape", Decimal::ZERO))
                    .with_suboption(Suboption::new(12, "Valve", Decimal::new(12, 2)))
                    .with_suboption(Suboption::new(13, "Tin Tie", Decimal::new(8, 2))),
            ),
            SelectableOption::Standard(
                StandardOption::new(2, "Color").with_suboption(Suboption::new(21, "CMYK", Decimal::new(3, 1))),
            ),
            SelectableOption::Standard(
                StandardOption::new(3, "Zipper Type").with_suboption(Suboption::new(31, "Slider Zipper", Decimal::ZERO)),
            ),
            SelectableOption::Material(
                MaterialOption::new(4, "Layer Material").with_layers(
                    MaterialLayers::from_selections(vec![Some(pet), None, Some(pe)]).unwrap(),
                ),
            ),
        ]
    }

    #[test]
    fn test_selection_queries() {
        let options = options();
        let selection = OptionSelection::new(&options);

        assert!(selection.is_custom_shaped());
        assert!(!selection.has_inner_printing());
        assert_eq!(selection.zipper_name(), "Slider Zipper");
        assert_eq!(selection.zipper_class(), ZipperClass::Special);
        assert_eq!(selection.lamination_layer_count(), 2);
        assert_eq!(selection.material_unit_price_total(), Decimal::new(37, 1));
        // 1.4 × 12 + 0.92 × 80
        assert_eq!(selection.surface_density(), Decimal::new(904, 1));
        assert_eq!(selection.accessory_unit_total(), Decimal::new(20, 2));
        assert_eq!(selection.printing_item_count(), 4);
        assert_eq!(selection.printing_item_unit_total(), Decimal::new(50, 2));
    }

    #[test]
    fn test_empty_selection() {
        let selection = OptionSelection::new(&[]);

        assert!(!selection.is_custom_shaped());
        assert_eq!(selection.zipper_name(), "No Zipper");
        assert_eq!(selection.zipper_class(), ZipperClass::Standard);
        assert_eq!(selection.lamination_layer_count(), 0);
        assert_eq!(selection.material_unit_price_total(), Decimal::ZERO);
    }

    #[rstest]
    #[case("No Zipper", ZipperClass::Standard)]
    #[case("normal zipper", ZipperClass::Standard)]
    #[case("CR Zipper", ZipperClass::Special)]
    #[case("Velcro Zipper", ZipperClass::Special)]
    #[case("Unlisted Zipper", ZipperClass::Special)]
    fn test_zipper_classification(#[case] name: &str, #[case] expected: ZipperClass) {
        assert_eq!(ZipperClass::classify(name), expected);
    }
}
