//! 客戶利潤率調整

use quote_core::{CustomerTier, DiscountStep, ExchangeRate, MarginApplied, PrintingTechnology};
use rust_decimal::Decimal;

/// 利潤率調整器
pub struct ProfitMarginAdjuster;

impl ProfitMarginAdjuster {
    /// 依總成本所在的折扣檔位決定實際利潤率（%）
    pub fn effective_margin(
        total_cost: Decimal,
        technology: PrintingTechnology,
        tier: &CustomerTier,
    ) -> (DiscountStep, Decimal) {
        let margin = tier.profit_margin(technology);

        if total_cost <= tier.minimum_discount_amount1 {
            (DiscountStep::Base, margin)
        } else if total_cost <= tier.minimum_discount_amount2 {
            (DiscountStep::First, margin - tier.preferential_profit_margin1)
        } else {
            (DiscountStep::Second, margin - tier.preferential_profit_margin2)
        }
    }

    /// 套用利潤率並換算美元
    ///
    /// 沒有客戶等級時以成本價報出。封存的等級照常套用。
    pub fn apply(
        total_cost: Decimal,
        technology: PrintingTechnology,
        tier: Option<&CustomerTier>,
        exchange_rate: &ExchangeRate,
    ) -> quote_core::Result<MarginApplied> {
        let (step, effective_margin_percent) = match tier {
            Some(tier) => Self::effective_margin(total_cost, technology, tier),
            None => (DiscountStep::PassThrough, Decimal::ZERO),
        };

        let price_cny = total_cost * (Decimal::ONE + effective_margin_percent / Decimal::from(100));
        let price_usd = exchange_rate.cny_to_usd(price_cny)?;

        Ok(MarginApplied {
            step,
            effective_margin_percent,
            price_cny,
            price_usd,
        })
    }
}
