//! 歷史記錄儲存介面

use async_trait::async_trait;
use quote_core::QuotationRecord;
use tokio::sync::Mutex;

use crate::Result;

/// 報價歷史記錄的寫入端
#[async_trait]
pub trait QuotationHistorySink: Send + Sync {
    /// 寫入一筆記錄
    async fn write(&self, record: &QuotationRecord) -> Result<()>;
}

/// 記憶體中的歷史記錄（測試與示範用）
#[derive(Debug, Default)]
pub struct InMemoryHistorySink {
    records: Mutex<Vec<QuotationRecord>>,
}

impl InMemoryHistorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// 目前已寫入的記錄（複本）
    pub async fn records(&self) -> Vec<QuotationRecord> {
        self.records.lock().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.lock().await.is_empty()
    }
}

#[async_trait]
impl QuotationHistorySink for InMemoryHistorySink {
    async fn write(&self, record: &QuotationRecord) -> Result<()> {
        self.records.lock().await.push(record.clone());
        tracing::trace!("歷史記錄已寫入記憶體: {}", record.id);
        Ok(())
    }
}
