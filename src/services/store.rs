use crate::models::{PaymentRecord, PaymentStatus};
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;

/// Terminal transition requested by the reconciliation writer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusUpdate {
    Complete { completion_id: String },
    Fail { reason: String },
}

impl StatusUpdate {
    pub fn target_status(&self) -> PaymentStatus {
        match self {
            StatusUpdate::Complete { .. } => PaymentStatus::Completed,
            StatusUpdate::Fail { .. } => PaymentStatus::Failed,
        }
    }
}

/// Result of a conditional transition. `AlreadyTerminal` is the idempotency
/// signal: the record was settled by an earlier delivery and was not touched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreUpdate {
    Applied,
    AlreadyTerminal(PaymentStatus),
    NotFound,
}

/// Payment record store. `transition` is a compare-and-set: it applies only
/// while the record is still `pending`, atomically at the storage layer.
#[async_trait]
pub trait PaymentStore: Send + Sync {
    async fn find(&self, txn_ref: &str) -> Result<Option<PaymentRecord>>;

    /// Returns false when the transaction reference is already taken.
    async fn create_pending(&self, record: PaymentRecord) -> Result<bool>;

    async fn transition(&self, txn_ref: &str, update: StatusUpdate) -> Result<StoreUpdate>;

    async fn ping(&self) -> bool;
}

/// In-memory store used in tests and when Redis is unreachable at startup.
/// The mutex makes the check-then-set transition atomic.
pub struct MemoryPaymentStore {
    records: Mutex<HashMap<String, PaymentRecord>>,
}

impl MemoryPaymentStore {
    pub fn new() -> Self {
        Self {
            records: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for MemoryPaymentStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PaymentStore for MemoryPaymentStore {
    async fn find(&self, txn_ref: &str) -> Result<Option<PaymentRecord>> {
        Ok(self.records.lock().await.get(txn_ref).cloned())
    }

    async fn create_pending(&self, record: PaymentRecord) -> Result<bool> {
        let mut records = self.records.lock().await;
        if records.contains_key(&record.txn_ref) {
            return Ok(false);
        }
        records.insert(record.txn_ref.clone(), record);
        Ok(true)
    }

    async fn transition(&self, txn_ref: &str, update: StatusUpdate) -> Result<StoreUpdate> {
        let mut records = self.records.lock().await;
        let Some(record) = records.get_mut(txn_ref) else {
            return Ok(StoreUpdate::NotFound);
        };
        if record.is_terminal() {
            return Ok(StoreUpdate::AlreadyTerminal(record.status));
        }

        record.status = update.target_status();
        match update {
            StatusUpdate::Complete { completion_id } => {
                record.completion_id = Some(completion_id);
            }
            StatusUpdate::Fail { reason } => {
                record.failure_reason = Some(reason);
            }
        }
        record.updated_at = chrono::Utc::now();
        Ok(StoreUpdate::Applied)
    }

    async fn ping(&self) -> bool {
        true
    }
}
