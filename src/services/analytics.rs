use crate::models::{CallbackCard, Stats};
use crate::services::alerts::OpsAlerter;
use chrono::Utc;
use redis::AsyncCommands;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Callback outcome counters. In-process atomics are authoritative for
/// /stats; daily Redis counters are kept best-effort for dashboards.
pub struct Analytics {
    redis: Option<redis::aio::ConnectionManager>,
    alerter: Arc<OpsAlerter>,
    callbacks_total: AtomicU64,
    success: AtomicU64,
    failed: AtomicU64,
    error: AtomicU64,
    start_time: Instant,
}

impl Analytics {
    pub fn new(redis: Option<redis::aio::ConnectionManager>, alerter: Arc<OpsAlerter>) -> Self {
        Self {
            redis,
            alerter,
            callbacks_total: AtomicU64::new(0),
            success: AtomicU64::new(0),
            failed: AtomicU64::new(0),
            error: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    pub async fn record_outcome(&self, card: &CallbackCard) {
        self.callbacks_total.fetch_add(1, Ordering::SeqCst);
        let counter = match card {
            CallbackCard::Success { .. } => &self.success,
            CallbackCard::Failed { .. } => &self.failed,
            CallbackCard::Error { .. } => &self.error,
        };
        counter.fetch_add(1, Ordering::SeqCst);

        if let Some(mut redis) = self.redis.clone() {
            let date = Utc::now().format("%Y-%m-%d").to_string();
            let key = format!("analytics:callbacks:{}:{}", card.kind(), date);
            if let Err(e) = redis.incr::<_, _, i64>(key, 1).await {
                tracing::warn!("Redis counter increment failed: {}", e);
            }
        }

        tracing::info!(outcome = card.kind(), "Callback outcome recorded");
    }

    pub fn get_stats(&self) -> Stats {
        Stats {
            callbacks_total: self.callbacks_total.load(Ordering::SeqCst),
            success: self.success.load(Ordering::SeqCst),
            failed: self.failed.load(Ordering::SeqCst),
            error: self.error.load(Ordering::SeqCst),
            reconciliation_alerts: self.alerter.alerts_sent(),
            uptime_seconds: self.uptime_seconds(),
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn counters_track_each_outcome_kind() {
        let analytics = Analytics::new(None, Arc::new(OpsAlerter::new(None)));

        analytics
            .record_outcome(&CallbackCard::Error {
                reason: "bad hash".to_string(),
            })
            .await;
        analytics
            .record_outcome(&CallbackCard::Failed {
                code: "105".to_string(),
                reason: "declined".to_string(),
                reconciled: true,
            })
            .await;
        analytics
            .record_outcome(&CallbackCard::Failed {
                code: "105".to_string(),
                reason: "declined".to_string(),
                reconciled: true,
            })
            .await;

        let stats = analytics.get_stats();
        assert_eq!(stats.callbacks_total, 3);
        assert_eq!(stats.success, 0);
        assert_eq!(stats.failed, 2);
        assert_eq!(stats.error, 1);
    }
}
