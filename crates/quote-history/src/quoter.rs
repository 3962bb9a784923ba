//! 計算報價並在背景保存歷史記錄

use std::sync::Arc;

use quote_calc::QuotationCalculator;
use quote_core::{PricingContext, QuoteRequest, QuoteResponse};
use tokio::task::JoinHandle;

use crate::dispatcher::{DispatchReport, HistoryDispatcher};

/// 附帶歷史記錄的報價服務
#[derive(Clone)]
pub struct RecordingQuoter {
    calculator: Arc<QuotationCalculator>,
    dispatcher: HistoryDispatcher,
}

impl RecordingQuoter {
    pub fn new(calculator: Arc<QuotationCalculator>, dispatcher: HistoryDispatcher) -> Self {
        Self {
            calculator,
            dispatcher,
        }
    }

    pub fn calculator(&self) -> &QuotationCalculator {
        &self.calculator
    }

    /// 計算報價；歷史記錄交給分派器後立即返回，不等待寫入
    pub fn quote(
        &self,
        request: &QuoteRequest,
        context: &PricingContext,
    ) -> quote_core::Result<QuoteResponse> {
        let (response, _) = self.quote_with_handle(request, context)?;
        Ok(response)
    }

    /// 同 [`Self::quote`]，另外返回背景寫入的 handle
    pub fn quote_with_handle(
        &self,
        request: &QuoteRequest,
        context: &PricingContext,
    ) -> quote_core::Result<(QuoteResponse, Option<JoinHandle<DispatchReport>>)> {
        let outcome = self.calculator.calculate(request, context)?;
        let handle = self.dispatcher.dispatch(outcome.records);
        Ok((outcome.response, handle))
    }
}
