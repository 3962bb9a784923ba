//! 報價請求、成本明細與報價記錄

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::case::{Case, ModulusMatch, Size};
use crate::catalog::{CustomerTier, ExchangeRate, PrintingTechnology, PrintingType, ProductSubcategory};
use crate::option::SelectableOption;

/// 報價請求
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRequest {
    pub product_subcategory_id: u64,
    pub printing_type_id: u64,
    pub width: Option<Decimal>,
    pub height: Option<Decimal>,
    #[serde(default)]
    pub gusset: Option<Decimal>,
    pub cases: Vec<Case>,
    #[serde(default)]
    pub selected_options: Vec<SelectableOption>,
}

impl QuoteRequest {
    /// 創建新的報價請求
    pub fn new(product_subcategory_id: u64, printing_type_id: u64, size: Size) -> Self {
        Self {
            product_subcategory_id,
            printing_type_id,
            width: Some(size.width),
            height: Some(size.height),
            gusset: size.gusset,
            cases: Vec::new(),
            selected_options: Vec::new(),
        }
    }

    /// 建構器模式：添加批次
    pub fn with_case(mut self, case: Case) -> Self {
        self.cases.push(case);
        self
    }

    /// 建構器模式：添加選項
    pub fn with_option(mut self, option: impl Into<SelectableOption>) -> Self {
        self.selected_options.push(option.into());
        self
    }

    /// 有效尺寸；寬或高缺失時返回 None
    pub fn size(&self) -> Option<Size> {
        Size::from_fields(self.width, self.height, self.gusset)
    }
}

/// 請求上下文（來自會話）
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingContext {
    pub customer_id: Option<String>,
    pub tier: Option<CustomerTier>,
    pub exchange_rate: ExchangeRate,
}

impl PricingContext {
    pub fn new(exchange_rate: ExchangeRate) -> Self {
        Self {
            customer_id: None,
            tier: None,
            exchange_rate,
        }
    }

    /// 建構器模式：設置客戶
    pub fn with_customer(mut self, customer_id: impl Into<String>, tier: Option<CustomerTier>) -> Self {
        self.customer_id = Some(customer_id.into());
        self.tier = tier;
        self
    }
}

/// 膠印分組類型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OffsetGroupKind {
    /// 款數不超過模數，單組印刷
    Single,
    /// 整倍數組
    Multiple,
    /// 餘數組
    Remainder,
}

/// 膠印印刷分組
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OffsetGroup {
    pub kind: OffsetGroupKind,

    /// 本組款數
    pub styles: u32,

    /// 版輥重複次數
    pub repeats: u32,

    /// 印刷長度（m）
    pub printing_length: Decimal,

    /// 印刷費
    pub printing_cost: Decimal,
}

/// 凹印版輥所在的料
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlateWeb {
    Primary,
    SecondWeb,
}

/// 凹印版輥建議
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlateRecommendation {
    pub web: PlateWeb,

    /// 版長（mm，等於材料寬度）
    pub plate_length_mm: Decimal,

    /// 版周長（mm）
    pub perimeter_mm: Decimal,

    /// 周向重複次數
    pub repeats: u32,
}

/// 獨立計算的第二幅料（側面料／底料）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebCost {
    /// 印刷長度（數碼、膠印為 m；凹印為單個袋的 mm）
    pub printing_length: Decimal,
    pub printing_width: Decimal,
    pub material_area: Decimal,
    pub material_cost: Decimal,
    pub printing_cost: Decimal,
    pub lamination_cost: Decimal,
}

/// 利潤率套用的檔位
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiscountStep {
    /// 無客戶等級，原價
    PassThrough,
    /// 未達第一門檻
    Base,
    /// 第一門檻
    First,
    /// 第二門檻
    Second,
}

/// 利潤率調整結果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarginApplied {
    pub step: DiscountStep,

    /// 實際套用的利潤率（%）
    pub effective_margin_percent: Decimal,
    pub price_cny: Decimal,
    pub price_usd: Decimal,
}

/// 單一批次的成本明細
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostBreakdown {
    pub case_index: usize,
    pub technology: PrintingTechnology,
    pub custom_shaped: bool,

    /// 印刷長度（數碼、膠印為 m；凹印為單個袋的 mm）
    pub printing_length: Decimal,

    /// 印刷寬度（mm）
    pub printing_width: Decimal,

    /// 材料寬度（mm）
    pub material_width: Decimal,

    /// 材料面積（m²）
    pub material_area: Decimal,

    pub printing_cost: Decimal,
    pub material_cost: Decimal,
    pub lamination_cost: Decimal,
    pub bag_making_cost: Decimal,
    pub die_cutting_cost: Decimal,
    pub packaging_cost: Decimal,

    /// UV／燙金附加費
    pub process_surcharge: Decimal,
    pub plate_fee: Decimal,
    pub labor_cost: Decimal,
    pub file_processing_fee: Decimal,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub second_web: Option<WebCost>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub offset_groups: Vec<OffsetGroup>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub plates: Vec<PlateRecommendation>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modulus: Option<ModulusMatch>,

    /// 版輥對照表未命中
    pub modulus_unmatched: bool,

    /// 加成前合計
    pub subtotal: Decimal,

    /// 加成後總成本（CNY）
    pub total_cost_cny: Decimal,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub margin: Option<MarginApplied>,
}

impl CostBreakdown {
    /// 創建空的明細
    pub fn new(case_index: usize, technology: PrintingTechnology) -> Self {
        Self {
            case_index,
            technology,
            custom_shaped: false,
            printing_length: Decimal::ZERO,
            printing_width: Decimal::ZERO,
            material_width: Decimal::ZERO,
            material_area: Decimal::ZERO,
            printing_cost: Decimal::ZERO,
            material_cost: Decimal::ZERO,
            lamination_cost: Decimal::ZERO,
            bag_making_cost: Decimal::ZERO,
            die_cutting_cost: Decimal::ZERO,
            packaging_cost: Decimal::ZERO,
            process_surcharge: Decimal::ZERO,
            plate_fee: Decimal::ZERO,
            labor_cost: Decimal::ZERO,
            file_processing_fee: Decimal::ZERO,
            second_web: None,
            offset_groups: Vec::new(),
            plates: Vec::new(),
            modulus: None,
            modulus_unmatched: false,
            subtotal: Decimal::ZERO,
            total_cost_cny: Decimal::ZERO,
            margin: None,
        }
    }

    /// 各項費用合計（不含加成）
    pub fn component_sum(&self) -> Decimal {
        self.printing_cost
            + self.material_cost
            + self.lamination_cost
            + self.bag_making_cost
            + self.die_cutting_cost
            + self.packaging_cost
            + self.process_surcharge
            + self.plate_fee
            + self.labor_cost
            + self.file_processing_fee
    }

    /// 以合計乘上加成係數，得出總成本
    pub fn finish(mut self, subtotal: Decimal, overhead_markup: Decimal) -> Self {
        self.subtotal = subtotal;
        self.total_cost_cny = subtotal * overhead_markup;
        self
    }

    /// 售價（CNY）；未套用利潤率時為總成本
    pub fn price_cny(&self) -> Decimal {
        self.margin
            .map(|m| m.price_cny)
            .unwrap_or(self.total_cost_cny)
    }
}

/// 報價回應
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteResponse {
    #[serde(rename = "totalPricesCNY")]
    pub total_prices_cny: Vec<Decimal>,

    #[serde(rename = "totalPricesUSD")]
    pub total_prices_usd: Vec<Decimal>,

    /// 無法估算的重量為 None
    pub total_weights_kg: Vec<Option<Decimal>>,

    pub per_case_breakdown: Vec<CostBreakdown>,
}

impl QuoteResponse {
    /// 創建空的回應（尺寸不完整時）
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.per_case_breakdown.is_empty()
    }
}

/// 報價歷史記錄（每個批次一筆）
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotationRecord {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub customer_id: Option<String>,
    pub customer_tier_id: Option<u64>,
    pub product_subcategory: ProductSubcategory,
    pub printing_type: PrintingType,
    pub size: Size,
    pub case: Case,
    pub selected_options: Vec<SelectableOption>,
    pub breakdown: CostBreakdown,
    pub price_cny: Decimal,
    pub price_usd: Decimal,
    pub weight_kg: Option<Decimal>,
    pub exchange_rate: ExchangeRate,
}

/// 報價計算結果：回應與待寫入的歷史記錄
#[derive(Debug, Clone, Default)]
pub struct QuoteOutcome {
    pub response: QuoteResponse,
    pub records: Vec<QuotationRecord>,
}

impl QuoteOutcome {
    pub fn empty() -> Self {
        Self::default()
    }
}
