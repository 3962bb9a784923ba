//! 可選項目與材料層模型

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{QuoteError, Result};

/// 每個材料選項最多可疊加的材料層數
pub const MAX_MATERIAL_LAYERS: usize = 4;

/// 一般子選項（顏色、工藝、拉鏈等）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Suboption {
    pub id: u64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chinese_name: Option<String>,

    /// 單價（CNY/m²；配件類為 CNY/個）
    pub unit_price_per_square_meter: Decimal,
}

impl Suboption {
    pub fn new(id: u64, name: impl Into<String>, unit_price_per_square_meter: Decimal) -> Self {
        Self {
            id,
            name: name.into(),
            chinese_name: None,
            unit_price_per_square_meter,
        }
    }

    /// 名稱比對（不分大小寫）
    pub fn name_is(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}

/// 材料子選項
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialSuboption {
    pub id: u64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chinese_name: Option<String>,

    /// 密度（g/cm³）
    pub density: Decimal,

    /// 厚度（μm）
    pub thickness: Decimal,

    /// 單價（CNY/m²）
    pub unit_price_per_square_meter: Decimal,

    /// 單價（CNY/kg），僅供參考
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_price_per_kg: Option<Decimal>,

    /// 每平方厘米重量（g/cm²），僅供參考
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight_per_cm2: Option<Decimal>,
}

impl MaterialSuboption {
    pub fn new(
        id: u64,
        name: impl Into<String>,
        density: Decimal,
        thickness: Decimal,
        unit_price_per_square_meter: Decimal,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            chinese_name: None,
            density,
            thickness,
            unit_price_per_square_meter,
            unit_price_per_kg: None,
            weight_per_cm2: None,
        }
    }

    /// 面密度貢獻 = 密度 × 厚度
    pub fn surface_density(&self) -> Decimal {
        self.density * self.thickness
    }
}

/// 一般選項
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StandardOption {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub is_required: bool,
    #[serde(default)]
    pub suboptions: Vec<Suboption>,
}

impl StandardOption {
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            is_required: false,
            suboptions: Vec::new(),
        }
    }

    /// 建構器模式：設置為必選
    pub fn required(mut self) -> Self {
        self.is_required = true;
        self
    }

    /// 建構器模式：添加子選項
    pub fn with_suboption(mut self, suboption: Suboption) -> Self {
        self.suboptions.push(suboption);
        self
    }

    /// 依名稱查找子選項（不分大小寫）
    pub fn find_suboption(&self, name: &str) -> Option<&Suboption> {
        self.suboptions.iter().find(|s| s.name_is(name))
    }
}

/// 單一材料層槽位
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerSlot {
    pub visible: bool,
    pub selection: Option<MaterialSuboption>,
}

/// 材料層（固定槽位，索引定址）
///
/// 所有更新都返回新值，不會移動其他槽位。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialLayers {
    slots: [LayerSlot; MAX_MATERIAL_LAYERS],
}

impl Default for MaterialLayers {
    fn default() -> Self {
        Self::new()
    }
}

impl MaterialLayers {
    /// 創建空的材料層，第一層可見
    pub fn new() -> Self {
        let mut slots: [LayerSlot; MAX_MATERIAL_LAYERS] = Default::default();
        slots[0].visible = true;
        Self { slots }
    }

    /// 依序填入各層選擇
    pub fn from_selections<I>(selections: I) -> Result<Self>
    where
        I: IntoIterator<Item = Option<MaterialSuboption>>,
    {
        let mut layers = Self::new();
        for (index, selection) in selections.into_iter().enumerate() {
            layers = match selection {
                Some(material) => layers.with_selection(index, material)?,
                None => layers.cleared(index)?,
            };
        }
        Ok(layers)
    }

    fn check_index(index: usize) -> Result<()> {
        if index >= MAX_MATERIAL_LAYERS {
            return Err(QuoteError::LayerIndexOutOfRange {
                index,
                max: MAX_MATERIAL_LAYERS,
            });
        }
        Ok(())
    }

    pub fn slot(&self, index: usize) -> Option<&LayerSlot> {
        self.slots.get(index)
    }

    pub fn slots(&self) -> &[LayerSlot] {
        &self.slots
    }

    /// 所有已選材料
    pub fn selected(&self) -> impl Iterator<Item = &MaterialSuboption> {
        self.slots.iter().filter_map(|slot| slot.selection.as_ref())
    }

    /// 已選材料的層數
    pub fn selected_count(&self) -> usize {
        self.selected().count()
    }

    /// 在指定層選擇材料（同時設為可見）
    pub fn with_selection(&self, index: usize, material: MaterialSuboption) -> Result<Self> {
        Self::check_index(index)?;
        let mut next = self.clone();
        next.slots[index] = LayerSlot {
            visible: true,
            selection: Some(material),
        };
        Ok(next)
    }

    /// 清除指定層的選擇，保留可見狀態
    pub fn cleared(&self, index: usize) -> Result<Self> {
        Self::check_index(index)?;
        let mut next = self.clone();
        next.slots[index].selection = None;
        Ok(next)
    }

    /// 隱藏指定層並清除其選擇
    pub fn hidden(&self, index: usize) -> Result<Self> {
        Self::check_index(index)?;
        let mut next = self.clone();
        next.slots[index] = LayerSlot::default();
        Ok(next)
    }

    /// 顯示下一個隱藏的層；全部可見時不變
    pub fn show_next(&self) -> Self {
        let mut next = self.clone();
        if let Some(slot) = next.slots.iter_mut().find(|slot| !slot.visible) {
            slot.visible = true;
        }
        next
    }

    /// 有選擇的層全部設為可見
    pub fn reveal_selected(&self) -> Self {
        let mut next = self.clone();
        for slot in next.slots.iter_mut() {
            if slot.selection.is_some() {
                slot.visible = true;
            }
        }
        next
    }
}

/// 材料選項
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialOption {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub is_required: bool,
    #[serde(default)]
    pub layers: MaterialLayers,
}

impl MaterialOption {
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            is_required: false,
            layers: MaterialLayers::new(),
        }
    }

    /// 建構器模式：設置材料層
    pub fn with_layers(mut self, layers: MaterialLayers) -> Self {
        self.layers = layers;
        self
    }
}

/// 報價可選項目
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum SelectableOption {
    Standard(StandardOption),
    Material(MaterialOption),
}

impl SelectableOption {
    pub fn id(&self) -> u64 {
        match self {
            Self::Standard(option) => option.id,
            Self::Material(option) => option.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Standard(option) => &option.name,
            Self::Material(option) => &option.name,
        }
    }

    /// 名稱比對（不分大小寫）
    pub fn name_is(&self, name: &str) -> bool {
        self.name().eq_ignore_ascii_case(name)
    }

    pub fn as_standard(&self) -> Option<&StandardOption> {
        match self {
            Self::Standard(option) => Some(option),
            Self::Material(_) => None,
        }
    }

    pub fn as_material(&self) -> Option<&MaterialOption> {
        match self {
            Self::Material(option) => Some(option),
            Self::Standard(_) => None,
        }
    }
}

impl From<StandardOption> for SelectableOption {
    fn from(option: StandardOption) -> Self {
        Self::Standard(option)
    }
}

impl From<MaterialOption> for SelectableOption {
    fn from(option: MaterialOption) -> Self {
        Self::Material(option)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pet() -> MaterialSuboption {
        MaterialSuboption::new(1, "PET", Decimal::new(14, 1), Decimal::from(12), Decimal::new(15, 1))
    }

    fn pe() -> MaterialSuboption {
        MaterialSuboption::new(2, "PE", Decimal::new(92, 2), Decimal::from(80), Decimal::new(22, 1))
    }

    #[test]
    fn test_new_layers_first_visible() {
        let layers = MaterialLayers::new();

        assert!(layers.slot(0).unwrap().visible);
        assert!(layers.slots()[1..].iter().all(|slot| !slot.visible));
        assert_eq!(layers.selected_count(), 0);
    }

    #[test]
    fn test_with_selection_is_immutable() {
        let layers = MaterialLayers::new();
        let updated = layers.with_selection(2, pet()).unwrap();

        assert_eq!(layers.selected_count(), 0);
        assert_eq!(updated.selected_count(), 1);
        assert!(updated.slot(2).unwrap().visible);
        assert_eq!(updated.slot(2).unwrap().selection.as_ref().unwrap().name, "PET");
    }

    #[test]
    fn test_hide_does_not_shift_other_slots() {
        let layers = MaterialLayers::new()
            .with_selection(0, pet())
            .unwrap()
            .with_selection(1, pe())
            .unwrap();

        let hidden = layers.hidden(0).unwrap();

        assert!(hidden.slot(0).unwrap().selection.is_none());
        assert!(!hidden.slot(0).unwrap().visible);
        // 第二層仍在原索引
        assert_eq!(hidden.slot(1).unwrap().selection.as_ref().unwrap().name, "PE");
    }

    #[test]
    fn test_show_next_and_reveal() {
        let layers = MaterialLayers::new().show_next();
        assert!(layers.slot(1).unwrap().visible);
        assert!(!layers.slot(2).unwrap().visible);

        let revealed = MaterialLayers::new()
            .with_selection(3, pe())
            .unwrap()
            .hidden(1)
            .unwrap()
            .reveal_selected();
        assert!(revealed.slot(3).unwrap().visible);
        assert!(!revealed.slot(1).unwrap().visible);
    }

    #[test]
    fn test_layer_index_out_of_range() {
        let result = MaterialLayers::new().with_selection(MAX_MATERIAL_LAYERS, pet());

        assert!(matches!(
            result,
            Err(QuoteError::LayerIndexOutOfRange { index: 4, max: 4 })
        ));
    }

    #[test]
    fn test_from_selections() {
        let layers = MaterialLayers::from_selections(vec![Some(pet()), None, Some(pe())]).unwrap();

        assert_eq!(layers.selected_count(), 2);
        assert!(layers.slot(1).unwrap().selection.is_none());

        let too_many = MaterialLayers::from_selections(vec![None, None, None, None, Some(pe())]);
        assert!(too_many.is_err());
    }

    #[test]
    fn test_option_enum_accessors() {
        let option: SelectableOption = StandardOption::new(7, "Zipper Type")
            .with_suboption(Suboption::new(70, "CR Zipper", Decimal::new(5, 2)))
            .into();

        assert_eq!(option.id(), 7);
        assert!(option.name_is("zipper type"));
        assert!(option.as_material().is_none());
        assert!(option.as_standard().unwrap().find_suboption("cr zipper").is_some());
    }
}
