//! 歷史記錄背景寫入與重試

use std::sync::Arc;
use std::time::Duration;

use quote_core::QuotationRecord;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::sink::QuotationHistorySink;

/// 重試策略
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// 最多嘗試次數（含第一次）
    pub max_attempts: u32,

    /// 第一次重試前的等待時間，之後每次加倍
    pub initial_backoff: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, initial_backoff: Duration) -> Self {
        Self {
            max_attempts,
            initial_backoff,
        }
    }

    /// 第 `attempt` 次失敗後的等待時間
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.initial_backoff.saturating_mul(factor)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_millis(200))
    }
}

/// 背景寫入結果
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub written: usize,
    pub failed: usize,
}

/// 歷史記錄分派器
#[derive(Clone)]
pub struct HistoryDispatcher {
    sink: Arc<dyn QuotationHistorySink>,
    policy: RetryPolicy,
}

impl HistoryDispatcher {
    /// 創建新的分派器（預設重試策略）
    pub fn new(sink: Arc<dyn QuotationHistorySink>) -> Self {
        Self {
            sink,
            policy: RetryPolicy::default(),
        }
    }

    /// 建構器模式：設置重試策略
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// 在背景寫入記錄，立即返回
    ///
    /// 沒有記錄或目前不在 tokio runtime 中時返回 None（後者記錄會被丟棄）。
    pub fn dispatch(&self, records: Vec<QuotationRecord>) -> Option<JoinHandle<DispatchReport>> {
        if records.is_empty() {
            return None;
        }

        let handle = match Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                tracing::warn!("沒有可用的 tokio runtime，{} 筆歷史記錄未寫入", records.len());
                return None;
            }
        };

        let sink = Arc::clone(&self.sink);
        let policy = self.policy;
        tracing::debug!("分派 {} 筆歷史記錄", records.len());

        Some(handle.spawn(async move { Self::write_all(sink.as_ref(), &records, policy).await }))
    }

    /// 逐筆寫入；單筆失敗不影響其他記錄
    pub async fn write_all(
        sink: &dyn QuotationHistorySink,
        records: &[QuotationRecord],
        policy: RetryPolicy,
    ) -> DispatchReport {
        let mut report = DispatchReport::default();
        for record in records {
            match Self::write_with_retry(sink, record, policy).await {
                Ok(_) => report.written += 1,
                Err(_) => report.failed += 1,
            }
        }

        if report.failed > 0 {
            tracing::error!(
                "歷史記錄寫入完成：成功 {} 筆，失敗 {} 筆",
                report.written,
                report.failed
            );
        } else {
            tracing::debug!("歷史記錄寫入完成：{} 筆", report.written);
        }
        report
    }

    /// 寫入單筆記錄，失敗時按退避時間重試；成功時返回使用的嘗試次數
    pub async fn write_with_retry(
        sink: &dyn QuotationHistorySink,
        record: &QuotationRecord,
        policy: RetryPolicy,
    ) -> crate::Result<u32> {
        let max_attempts = policy.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            match sink.write(record).await {
                Ok(()) => return Ok(attempt),
                Err(err) if attempt < max_attempts => {
                    let delay = policy.backoff(attempt);
                    tracing::warn!(
                        "歷史記錄 {} 第 {} 次寫入失敗: {}，{:?} 後重試",
                        record.id,
                        attempt,
                        err,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => {
                    tracing::error!(
                        "歷史記錄 {} 寫入失敗（已嘗試 {} 次）: {}",
                        record.id,
                        attempt,
                        err
                    );
                    return Err(err);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::InMemoryHistorySink;
    use crate::HistoryError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// 前 `failures` 次寫入失敗
    struct FlakySink {
        failures: u32,
        calls: AtomicU32,
        inner: InMemoryHistorySink,
    }

    impl FlakySink {
        fn new(failures: u32) -> Self {
            Self {
                failures,
                calls: AtomicU32::new(0),
                inner: InMemoryHistorySink::new(),
            }
        }
    }

    #[async_trait]
    impl QuotationHistorySink for FlakySink {
        async fn write(&self, record: &QuotationRecord) -> crate::Result<()> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if call <= self.failures {
                return Err(HistoryError::Unavailable(format!("第 {} 次呼叫", call)));
            }
            self.inner.write(record).await
        }
    }

    fn record() -> QuotationRecord {
        crate::test_support::sample_outcome().records.remove(0)
    }

    #[test]
    fn test_backoff_doubles() {
        let policy = RetryPolicy::default();

        assert_eq!(policy.backoff(1), Duration::from_millis(200));
        assert_eq!(policy.backoff(2), Duration::from_millis(400));
        assert_eq!(policy.backoff(3), Duration::from_millis(800));
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_until_success() {
        let sink = FlakySink::new(2);
        let attempts = HistoryDispatcher::write_with_retry(&sink, &record(), RetryPolicy::default())
            .await
            .unwrap();

        assert_eq!(attempts, 3);
        assert_eq!(sink.inner.len().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_gives_up_after_max_attempts() {
        let sink = FlakySink::new(u32::MAX);
        let result = HistoryDispatcher::write_with_retry(&sink, &record(), RetryPolicy::default()).await;

        assert!(result.is_err());
        assert_eq!(sink.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dispatch_reports_counts() {
        let sink = Arc::new(FlakySink::new(3));
        let dispatcher = HistoryDispatcher::new(sink.clone());

        // 第一筆用完 3 次都失敗，第二筆成功
        let report = dispatcher
            .dispatch(vec![record(), record()])
            .unwrap()
            .await
            .unwrap();

        assert_eq!(report, DispatchReport { written: 1, failed: 1 });
        assert_eq!(sink.inner.len().await, 1);
    }

    #[test]
    fn test_dispatch_without_runtime_is_dropped() {
        let dispatcher = HistoryDispatcher::new(Arc::new(InMemoryHistorySink::new()));

        assert!(dispatcher.dispatch(vec![record()]).is_none());
    }

    #[tokio::test]
    async fn test_dispatch_nothing() {
        let dispatcher = HistoryDispatcher::new(Arc::new(InMemoryHistorySink::new()));

        assert!(dispatcher.dispatch(Vec::new()).is_none());
    }
}
