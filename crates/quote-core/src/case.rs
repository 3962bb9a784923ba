//! 袋型尺寸與報價批次模型

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 袋型尺寸（單位 mm）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Size {
    /// 袋寬
    pub width: Decimal,

    /// 袋高
    pub height: Decimal,

    /// 底插／側插
    pub gusset: Option<Decimal>,
}

impl Size {
    /// 創建新的尺寸（無插邊）
    pub fn new(width: Decimal, height: Decimal) -> Self {
        Self {
            width,
            height,
            gusset: None,
        }
    }

    /// 建構器模式：設置插邊
    pub fn with_gusset(mut self, gusset: Decimal) -> Self {
        self.gusset = Some(gusset);
        self
    }

    /// 插邊尺寸，未設置時為 0
    pub fn gusset_or_zero(&self) -> Decimal {
        self.gusset.unwrap_or(Decimal::ZERO)
    }

    /// 是否有有效插邊
    pub fn has_gusset(&self) -> bool {
        self.gusset.is_some_and(|g| g > Decimal::ZERO)
    }

    /// 由表單欄位組成尺寸；寬或高缺失、非正數時返回 None
    pub fn from_fields(
        width: Option<Decimal>,
        height: Option<Decimal>,
        gusset: Option<Decimal>,
    ) -> Option<Self> {
        let width = width.filter(|w| *w > Decimal::ZERO)?;
        let height = height.filter(|h| *h > Decimal::ZERO)?;
        Some(Self {
            width,
            height,
            gusset: gusset.filter(|g| *g > Decimal::ZERO),
        })
    }
}

/// 版輥模數匹配結果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModulusMatch {
    /// 匹配模數（版輥一周的重複次數）
    pub modulus: u32,

    /// 版輥周長（mm）
    pub perimeter: Decimal,

    /// 對照表中命中的單拼長度（mm）
    pub value: Decimal,

    /// 對照表中沒有落在範圍內的格子
    pub unmatched: bool,
}

impl ModulusMatch {
    /// 創建命中的匹配結果
    pub fn new(modulus: u32, perimeter: Decimal, value: Decimal) -> Self {
        Self {
            modulus,
            perimeter,
            value,
            unmatched: false,
        }
    }

    /// 未命中時的退化結果：模數 1、周長 0
    pub fn unmatched() -> Self {
        Self {
            modulus: 1,
            perimeter: Decimal::ZERO,
            value: Decimal::ZERO,
            unmatched: true,
        }
    }
}

/// 報價批次（一組款數 × 每款數量）
///
/// 模數匹配在 JSON 中攤平為 `matchedModulus` / `matchedPerimeter`。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "CaseWire", into = "CaseWire")]
pub struct Case {
    /// 款數（SKU 數）
    pub num_of_styles: u32,

    /// 每款數量
    pub quantity_per_style: u64,

    /// 總數量
    pub total_quantity: u64,

    /// 膠印模數匹配（由模數解析器填入）
    pub matched: Option<ModulusMatch>,
}

impl Case {
    /// 創建新的批次，總數量 = 款數 × 每款數量（溢位時取上限）
    pub fn new(num_of_styles: u32, quantity_per_style: u64) -> Self {
        Self {
            num_of_styles,
            quantity_per_style,
            total_quantity: u64::from(num_of_styles).saturating_mul(quantity_per_style),
            matched: None,
        }
    }

    /// 建構器模式：附加模數匹配結果
    pub fn with_matched(mut self, matched: ModulusMatch) -> Self {
        self.matched = Some(matched);
        self
    }

    /// 款數 × 每款數量；溢位時為 None
    pub fn expected_total(&self) -> Option<u64> {
        u64::from(self.num_of_styles).checked_mul(self.quantity_per_style)
    }

    /// 檢查總數量是否與款數 × 每款數量一致
    pub fn is_consistent(&self) -> bool {
        self.expected_total() == Some(self.total_quantity)
    }

    /// 總數量（Decimal）
    pub fn total_quantity_decimal(&self) -> Decimal {
        Decimal::from(self.total_quantity)
    }

    /// 以總數量平均到每款的數量；款數為 0 時視為 1 款
    pub fn effective_quantity_per_style(&self) -> Decimal {
        self.total_quantity_decimal() / Decimal::from(self.num_of_styles.max(1))
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CaseWire {
    num_of_styles: u32,
    quantity_per_style: u64,
    total_quantity: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    matched_modulus: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    matched_perimeter: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    matched_value: Option<Decimal>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    modulus_unmatched: bool,
}

impl From<CaseWire> for Case {
    fn from(wire: CaseWire) -> Self {
        let matched = wire.matched_modulus.map(|modulus| ModulusMatch {
            modulus,
            perimeter: wire.matched_perimeter.unwrap_or_default(),
            value: wire.matched_value.unwrap_or_default(),
            unmatched: wire.modulus_unmatched,
        });
        Self {
            num_of_styles: wire.num_of_styles,
            quantity_per_style: wire.quantity_per_style,
            total_quantity: wire.total_quantity,
            matched,
        }
    }
}

impl From<Case> for CaseWire {
    fn from(case: Case) -> Self {
        Self {
            num_of_styles: case.num_of_styles,
            quantity_per_style: case.quantity_per_style,
            total_quantity: case.total_quantity,
            matched_modulus: case.matched.map(|m| m.modulus),
            matched_perimeter: case.matched.map(|m| m.perimeter),
            matched_value: case.matched.map(|m| m.value),
            modulus_unmatched: case.matched.is_some_and(|m| m.unmatched),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_case() {
        let case = Case::new(3, 500);

        assert_eq!(case.total_quantity, 1500);
        assert!(case.is_consistent());
        assert!(case.matched.is_none());
    }

    #[test]
    fn test_inconsistent_case() {
        let mut case = Case::new(2, 100);
        case.total_quantity = 150;

        assert!(!case.is_consistent());
    }

    #[test]
    fn test_overflowing_quantities_are_inconsistent() {
        let case = Case {
            num_of_styles: 4,
            quantity_per_style: i64::MAX as u64,
            total_quantity: 1000,
            matched: None,
        };

        assert!(case.expected_total().is_none());
        assert!(!case.is_consistent());
        assert_eq!(Case::new(u32::MAX, u64::MAX).total_quantity, u64::MAX);
    }

    #[test]
    fn test_effective_quantity_per_style() {
        let mut case = Case::new(4, 250);
        case.total_quantity = 2000;

        assert_eq!(case.effective_quantity_per_style(), Decimal::from(500));
    }

    #[test]
    fn test_matched_modulus_is_flat_on_the_wire() {
        let case = Case::new(2, 500).with_matched(ModulusMatch::new(6, Decimal::new(6345, 1), Decimal::new(105_750, 3)));

        let json = serde_json::to_value(&case).unwrap();
        assert_eq!(json["matchedModulus"], 6);
        assert_eq!(json["matchedPerimeter"], "634.5");
        assert!(json.get("matched").is_none());
        assert!(json.get("modulusUnmatched").is_none());

        let back: Case = serde_json::from_value(json).unwrap();
        assert_eq!(back, case);
    }

    #[test]
    fn test_case_without_modulus_from_json() {
        let case: Case = serde_json::from_str(
            r#"{"numOfStyles": 3, "quantityPerStyle": 100, "totalQuantity": 300}"#,
        )
        .unwrap();

        assert_eq!(case, Case::new(3, 100));
    }

    #[test]
    fn test_size_from_fields() {
        assert!(Size::from_fields(None, Some(Decimal::from(200)), None).is_none());
        assert!(Size::from_fields(Some(Decimal::ZERO), Some(Decimal::from(200)), None).is_none());

        let size = Size::from_fields(
            Some(Decimal::from(150)),
            Some(Decimal::from(200)),
            Some(Decimal::ZERO),
        )
        .unwrap();
        assert_eq!(size.width, Decimal::from(150));
        assert!(!size.has_gusset());
        assert_eq!(size.gusset_or_zero(), Decimal::ZERO);
    }

    #[test]
    fn test_unmatched_sentinel() {
        let sentinel = ModulusMatch::unmatched();

        assert_eq!(sentinel.modulus, 1);
        assert_eq!(sentinel.perimeter, Decimal::ZERO);
        assert!(sentinel.unmatched);
    }
}
