//! 參考資料模型（產品子類、印刷方式、客戶等級、匯率、選項目錄）

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::option::{
    MaterialLayers, MaterialOption, MaterialSuboption, SelectableOption, StandardOption,
};
use crate::{QuoteError, Result};

/// 產品子類
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSubcategory {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub has_gusset: bool,
}

impl ProductSubcategory {
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            has_gusset: false,
        }
    }

    /// 建構器模式：設置是否有插邊
    pub fn with_gusset(mut self, has_gusset: bool) -> Self {
        self.has_gusset = has_gusset;
        self
    }

    /// 解析袋型
    pub fn shape(&self) -> BagShape {
        BagShape::parse(&self.name)
    }
}

/// 袋型（決定公式分支）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BagShape {
    /// 三邊封
    ThreeSideSeal,
    /// 自立袋
    StandUp,
    /// 四邊封
    FourSideSeal,
    /// 八邊封（平底袋）
    FlatBottom,
    /// 方底袋
    SquareBottom,
    /// 吸嘴袋
    Spout,
    /// 背封袋
    FinSeal,
    /// 背封風琴袋
    FinSealGusset,
    /// 盒中袋
    BagInBox,
    /// 卷膜
    Film,
    /// 其他未知袋型
    Other(String),
}

impl BagShape {
    /// 依子類名稱解析（不分大小寫）
    pub fn parse(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "3 side seal bag" => Self::ThreeSideSeal,
            "stand-up bag" | "stand up bag" => Self::StandUp,
            "4 side seal bag" => Self::FourSideSeal,
            "flat bottom bag" => Self::FlatBottom,
            "square bottom bag" => Self::SquareBottom,
            "spout bag" => Self::Spout,
            "fin seal bag" => Self::FinSeal,
            "fin seal gusset bag" => Self::FinSealGusset,
            "bag in box" => Self::BagInBox,
            "film" => Self::Film,
            _ => Self::Other(name.to_string()),
        }
    }

    /// 三邊封或自立袋
    pub fn is_seal_or_stand_up(&self) -> bool {
        matches!(self, Self::ThreeSideSeal | Self::StandUp)
    }

    /// 平底或方底（廢料較多）
    pub fn is_box_bottom(&self) -> bool {
        matches!(self, Self::FlatBottom | Self::SquareBottom)
    }
}

/// 印刷技術
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrintingTechnology {
    /// 數碼印刷
    Digital,
    /// 膠印
    Offset,
    /// 凹版印刷
    Gravure,
}

impl PrintingTechnology {
    /// 依印刷方式名稱解析（不分大小寫）
    pub fn parse(name: &str) -> Option<Self> {
        let name = name.trim().to_lowercase();
        if name.starts_with("digital") {
            Some(Self::Digital)
        } else if name.starts_with("offset") {
            Some(Self::Offset)
        } else if name.starts_with("gravure") {
            Some(Self::Gravure)
        } else {
            None
        }
    }
}

impl std::fmt::Display for PrintingTechnology {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Digital => write!(f, "Digital Printing"),
            Self::Offset => write!(f, "Offset Printing"),
            Self::Gravure => write!(f, "Gravure Printing"),
        }
    }
}

/// 印刷方式
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrintingType {
    pub id: u64,
    pub name: String,
    pub technology: PrintingTechnology,
}

impl PrintingType {
    pub fn new(id: u64, technology: PrintingTechnology) -> Self {
        Self {
            id,
            name: technology.to_string(),
            technology,
        }
    }

    /// 由參考資料名稱建立
    pub fn from_name(id: u64, name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        let technology = PrintingTechnology::parse(&name)
            .ok_or_else(|| QuoteError::UnknownSelection(format!("印刷方式 {}", name)))?;
        Ok(Self {
            id,
            name,
            technology,
        })
    }
}

/// 客戶等級（利潤率與折扣門檻）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerTier {
    pub id: u64,
    pub name: String,

    /// 數碼印刷利潤率（%）
    pub digital_printing_profit_margin: Decimal,

    /// 膠印利潤率（%）
    pub offset_printing_profit_margin: Decimal,

    /// 凹印利潤率（%）
    pub gravure_printing_profit_margin: Decimal,

    /// 第一折扣門檻（CNY）
    pub minimum_discount_amount1: Decimal,

    /// 第一門檻以上的利潤率減免（%）
    pub preferential_profit_margin1: Decimal,

    /// 第二折扣門檻（CNY）
    pub minimum_discount_amount2: Decimal,

    /// 第二門檻以上的利潤率減免（%）
    pub preferential_profit_margin2: Decimal,

    #[serde(default)]
    pub is_archived: bool,
}

impl CustomerTier {
    /// 創建新的客戶等級（利潤率與門檻皆為 0）
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            digital_printing_profit_margin: Decimal::ZERO,
            offset_printing_profit_margin: Decimal::ZERO,
            gravure_printing_profit_margin: Decimal::ZERO,
            minimum_discount_amount1: Decimal::ZERO,
            preferential_profit_margin1: Decimal::ZERO,
            minimum_discount_amount2: Decimal::ZERO,
            preferential_profit_margin2: Decimal::ZERO,
            is_archived: false,
        }
    }

    /// 建構器模式：設置三種印刷的利潤率（%）
    pub fn with_margins(mut self, digital: Decimal, offset: Decimal, gravure: Decimal) -> Self {
        self.digital_printing_profit_margin = digital;
        self.offset_printing_profit_margin = offset;
        self.gravure_printing_profit_margin = gravure;
        self
    }

    /// 建構器模式：設置兩段折扣門檻與對應的利潤率減免
    pub fn with_discounts(
        mut self,
        threshold1: Decimal,
        preferential1: Decimal,
        threshold2: Decimal,
        preferential2: Decimal,
    ) -> Self {
        self.minimum_discount_amount1 = threshold1;
        self.preferential_profit_margin1 = preferential1;
        self.minimum_discount_amount2 = threshold2;
        self.preferential_profit_margin2 = preferential2;
        self
    }

    /// 建構器模式：設置封存狀態
    pub fn archived(mut self) -> Self {
        self.is_archived = true;
        self
    }

    /// 取得指定印刷技術的利潤率
    pub fn profit_margin(&self, technology: PrintingTechnology) -> Decimal {
        match technology {
            PrintingTechnology::Digital => self.digital_printing_profit_margin,
            PrintingTechnology::Offset => self.offset_printing_profit_margin,
            PrintingTechnology::Gravure => self.gravure_printing_profit_margin,
        }
    }
}

/// 匯率（每美元兌人民幣）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeRate {
    pub rate: Decimal,
}

impl ExchangeRate {
    pub fn new(rate: Decimal) -> Self {
        Self { rate }
    }

    /// 人民幣換算美元
    pub fn cny_to_usd(&self, amount_cny: Decimal) -> Result<Decimal> {
        if self.rate <= Decimal::ZERO {
            return Err(QuoteError::InvalidExchangeRate(self.rate));
        }
        Ok(amount_cny / self.rate)
    }
}

/// 目錄中的材料選項：每層可選的材料清單
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialChoices {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub is_required: bool,
    pub layers: Vec<Vec<MaterialSuboption>>,
}

impl MaterialChoices {
    /// 初始材料層：只有第一層（且有可選材料時）可見
    pub fn initial_layers(&self) -> MaterialLayers {
        let first_has_choices = self.layers.first().is_some_and(|choices| !choices.is_empty());
        if first_has_choices {
            MaterialLayers::new()
        } else {
            MaterialLayers::new().hidden(0).unwrap_or_default()
        }
    }
}

/// 目錄選項
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum CatalogOption {
    Standard(StandardOption),
    Material(MaterialChoices),
}

impl CatalogOption {
    pub fn id(&self) -> u64 {
        match self {
            Self::Standard(option) => option.id,
            Self::Material(option) => option.id,
        }
    }
}

/// 參考資料快照（請求期間唯讀）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceCatalog {
    pub product_subcategories: Vec<ProductSubcategory>,
    pub printing_types: Vec<PrintingType>,
    pub options: Vec<CatalogOption>,
}

impl ReferenceCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// 建構器模式：添加產品子類
    pub fn with_subcategory(mut self, subcategory: ProductSubcategory) -> Self {
        self.product_subcategories.push(subcategory);
        self
    }

    /// 建構器模式：添加印刷方式
    pub fn with_printing_type(mut self, printing_type: PrintingType) -> Self {
        self.printing_types.push(printing_type);
        self
    }

    /// 建構器模式：添加選項
    pub fn with_option(mut self, option: CatalogOption) -> Self {
        self.options.push(option);
        self
    }

    pub fn subcategory(&self, id: u64) -> Result<&ProductSubcategory> {
        self.product_subcategories
            .iter()
            .find(|s| s.id == id)
            .ok_or(QuoteError::UnknownSubcategory(id))
    }

    pub fn printing_type(&self, id: u64) -> Result<&PrintingType> {
        self.printing_types
            .iter()
            .find(|p| p.id == id)
            .ok_or(QuoteError::UnknownPrintingType(id))
    }

    pub fn option(&self, id: u64) -> Option<&CatalogOption> {
        self.options.iter().find(|o| o.id() == id)
    }

    /// 檢查所選選項都屬於目錄
    pub fn validate_selection(&self, selected: &[SelectableOption]) -> Result<()> {
        self.resolve_selection(selected).map(|_| ())
    }

    /// 以目錄內容重建所選選項
    ///
    /// 請求只決定選了哪些 id（與材料所在的層）；名稱、單價、密度一律取自目錄。
    pub fn resolve_selection(&self, selected: &[SelectableOption]) -> Result<Vec<SelectableOption>> {
        selected
            .iter()
            .map(|option| match (option, self.option(option.id())) {
                (SelectableOption::Standard(chosen), Some(CatalogOption::Standard(known))) => {
                    Self::resolve_standard(chosen, known).map(SelectableOption::Standard)
                }
                (SelectableOption::Material(chosen), Some(CatalogOption::Material(known))) => {
                    Self::resolve_material(chosen, known).map(SelectableOption::Material)
                }
                _ => Err(QuoteError::UnknownSelection(option.name().to_string())),
            })
            .collect()
    }

    fn resolve_standard(chosen: &StandardOption, known: &StandardOption) -> Result<StandardOption> {
        let suboptions = chosen
            .suboptions
            .iter()
            .map(|suboption| {
                known
                    .suboptions
                    .iter()
                    .find(|s| s.id == suboption.id)
                    .cloned()
                    .ok_or_else(|| {
                        QuoteError::UnknownSelection(format!("{} / {}", known.name, suboption.name))
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(StandardOption {
            id: known.id,
            name: known.name.clone(),
            is_required: known.is_required,
            suboptions,
        })
    }

    fn resolve_material(chosen: &MaterialOption, known: &MaterialChoices) -> Result<MaterialOption> {
        let mut layers = chosen.layers.clone();
        for (index, slot) in chosen.layers.slots().iter().enumerate() {
            let Some(material) = &slot.selection else {
                continue;
            };
            let catalog_material = known
                .layers
                .get(index)
                .and_then(|choices| choices.iter().find(|m| m.id == material.id))
                .ok_or_else(|| {
                    QuoteError::UnknownSelection(format!(
                        "{} 第 {} 層 / {}",
                        known.name,
                        index + 1,
                        material.name
                    ))
                })?;
            layers = layers.with_selection(index, catalog_material.clone())?;
        }

        Ok(MaterialOption {
            id: known.id,
            name: known.name.clone(),
            is_required: known.is_required,
            layers,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::option::Suboption;
    use rstest::rstest;

    fn catalog() -> ReferenceCatalog {
        let pet = MaterialSuboption::new(11, "PET", Decimal::new(14, 1), Decimal::from(12), Decimal::new(15, 1));
        ReferenceCatalog::new()
            .with_subcategory(ProductSubcategory::new(1, "Stand-Up Bag").with_gusset(true))
            .with_printing_type(PrintingType::new(2, PrintingTechnology::Offset))
            .with_option(CatalogOption::Standard(
                StandardOption::new(3, "Color").with_suboption(Suboption::new(31, "CMYK", Decimal::new(2, 1))),
            ))
            .with_option(CatalogOption::Material(MaterialChoices {
                id: 4,
                name: "Layer Material".to_string(),
                is_required: true,
                layers: vec![vec![pet], vec![]],
            }))
    }

    #[rstest]
    #[case("Flat Bottom Bag", BagShape::FlatBottom)]
    #[case("stand-up bag", BagShape::StandUp)]
    #[case("3 Side Seal Bag", BagShape::ThreeSideSeal)]
    #[case("Pillow", BagShape::Other("Pillow".to_string()))]
    fn test_parse_bag_shape(#[case] name: &str, #[case] expected: BagShape) {
        assert_eq!(BagShape::parse(name), expected);
    }

    #[test]
    fn test_bag_shape_groups() {
        assert!(BagShape::SquareBottom.is_box_bottom());
        assert!(BagShape::ThreeSideSeal.is_seal_or_stand_up());
    }

    #[rstest]
    #[case("Digital Printing", Some(PrintingTechnology::Digital))]
    #[case("GRAVURE PRINTING", Some(PrintingTechnology::Gravure))]
    #[case("Offset Printing", Some(PrintingTechnology::Offset))]
    #[case("Screen", None)]
    fn test_parse_printing_technology(#[case] name: &str, #[case] expected: Option<PrintingTechnology>) {
        assert_eq!(PrintingTechnology::parse(name), expected);
        assert_eq!(PrintingType::from_name(9, name).is_ok(), expected.is_some());
    }

    #[test]
    fn test_catalog_lookup() {
        let catalog = catalog();

        assert_eq!(catalog.subcategory(1).unwrap().shape(), BagShape::StandUp);
        assert!(matches!(catalog.subcategory(99), Err(QuoteError::UnknownSubcategory(99))));
        assert_eq!(
            catalog.printing_type(2).unwrap().technology,
            PrintingTechnology::Offset
        );
        assert!(matches!(catalog.printing_type(5), Err(QuoteError::UnknownPrintingType(5))));
    }

    #[test]
    fn test_validate_selection() {
        let catalog = catalog();
        let pet = MaterialSuboption::new(11, "PET", Decimal::new(14, 1), Decimal::from(12), Decimal::new(15, 1));

        let valid = vec![
            SelectableOption::Standard(
                StandardOption::new(3, "Color").with_suboption(Suboption::new(31, "CMYK", Decimal::new(2, 1))),
            ),
            SelectableOption::Material(
                MaterialOption::new(4, "Layer Material")
                    .with_layers(MaterialLayers::new().with_selection(0, pet.clone()).unwrap()),
            ),
        ];
        assert!(catalog.validate_selection(&valid).is_ok());

        let unknown_suboption = vec![SelectableOption::Standard(
            StandardOption::new(3, "Color").with_suboption(Suboption::new(99, "Pantone", Decimal::ONE)),
        )];
        assert!(catalog.validate_selection(&unknown_suboption).is_err());

        // PET 只能放在第一層
        let wrong_layer = vec![SelectableOption::Material(
            MaterialOption::new(4, "Layer Material")
                .with_layers(MaterialLayers::new().with_selection(1, pet).unwrap()),
        )];
        assert!(catalog.validate_selection(&wrong_layer).is_err());
    }

    #[test]
    fn test_resolve_selection_uses_catalog_data() {
        let catalog = catalog();
        // 沿用目錄 id，但改名、改價
        let renamed = StandardOption::new(3, "Production Process")
            .with_suboption(Suboption::new(31, "Special Shape", Decimal::ZERO));
        let cheap_pet = MaterialSuboption::new(11, "PET", Decimal::ZERO, Decimal::ZERO, Decimal::ZERO);
        let layers = MaterialLayers::new().with_selection(0, cheap_pet).unwrap();
        let selected = vec![
            SelectableOption::Standard(renamed),
            SelectableOption::Material(MaterialOption::new(4, "Anything").with_layers(layers)),
        ];

        let resolved = catalog.resolve_selection(&selected).unwrap();

        let standard = resolved[0].as_standard().unwrap();
        assert_eq!(standard.name, "Color");
        assert_eq!(standard.suboptions[0].name, "CMYK");
        assert_eq!(standard.suboptions[0].unit_price_per_square_meter, Decimal::new(2, 1));

        let material = resolved[1].as_material().unwrap();
        assert_eq!(material.name, "Layer Material");
        let pet = material.layers.slot(0).and_then(|slot| slot.selection.as_ref()).unwrap();
        assert_eq!(pet.unit_price_per_square_meter, Decimal::new(15, 1));
        assert_eq!(pet.surface_density(), Decimal::new(168, 1));
    }

    #[test]
    fn test_resolve_selection_rejects_option_kind_mismatch() {
        let catalog = catalog();
        let selected = vec![SelectableOption::Material(MaterialOption::new(3, "Color"))];

        assert!(matches!(
            catalog.resolve_selection(&selected),
            Err(QuoteError::UnknownSelection(_))
        ));
    }

    #[test]
    fn test_initial_layers_visibility() {
        let catalog = catalog();
        let Some(CatalogOption::Material(choices)) = catalog.option(4) else {
            panic!("material option missing");
        };

        let layers = choices.initial_layers();
        assert!(layers.slot(0).unwrap().visible);
        assert!(!layers.slot(1).unwrap().visible);
    }

    #[test]
    fn test_exchange_rate() {
        let rate = ExchangeRate::new(Decimal::new(725, 2));
        assert_eq!(rate.cny_to_usd(Decimal::new(725, 0)).unwrap(), Decimal::from(100));

        let invalid = ExchangeRate::new(Decimal::ZERO);
        assert!(matches!(
            invalid.cny_to_usd(Decimal::ONE),
            Err(QuoteError::InvalidExchangeRate(_))
        ));
    }
}
