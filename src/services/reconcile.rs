use crate::models::{CallbackResponse, PaymentStatus};
use crate::services::alerts::{AlertSeverity, OpsAlerter};
use crate::services::store::{PaymentStore, StatusUpdate, StoreUpdate};
use std::sync::Arc;
use std::time::Duration;

/// What reconciliation did for one verified callback. Everything except
/// `Applied` means the store was left as it was.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileReport {
    Applied,
    AlreadyTerminal {
        existing: PaymentStatus,
        conflicting: bool,
    },
    RecordMissing,
    StoreFailed,
}

impl ReconcileReport {
    /// Whether the stored state now agrees with the gateway outcome.
    pub fn reconciled(&self) -> bool {
        matches!(
            self,
            ReconcileReport::Applied
                | ReconcileReport::AlreadyTerminal {
                    conflicting: false,
                    ..
                }
        )
    }
}

/// Applies a verified gateway outcome to the payment record, exactly once.
/// The store write is retried on transient failure; if it still fails, the
/// gateway outcome remains the source of truth for the user-facing card and
/// the failure is escalated as a secondary, non-fatal error.
pub struct ReconciliationWriter {
    store: Arc<dyn PaymentStore>,
    alerter: Arc<OpsAlerter>,
    attempts: u32,
}

impl ReconciliationWriter {
    pub fn new(store: Arc<dyn PaymentStore>, alerter: Arc<OpsAlerter>, attempts: u32) -> Self {
        Self {
            store,
            alerter,
            attempts: attempts.max(1),
        }
    }

    pub async fn complete(&self, response: &CallbackResponse) -> ReconcileReport {
        self.apply(
            response,
            StatusUpdate::Complete {
                completion_id: response.retrieval_ref.clone(),
            },
        )
        .await
    }

    pub async fn fail(&self, response: &CallbackResponse, reason: &str) -> ReconcileReport {
        self.apply(
            response,
            StatusUpdate::Fail {
                reason: reason.to_string(),
            },
        )
        .await
    }

    async fn apply(&self, response: &CallbackResponse, update: StatusUpdate) -> ReconcileReport {
        let txn_ref = &response.txn_ref;
        let requested = update.target_status();

        let mut last_error = None;
        for attempt in 1..=self.attempts {
            match self.store.transition(txn_ref, update.clone()).await {
                Ok(StoreUpdate::Applied) => {
                    tracing::info!(
                        txn_ref = %txn_ref,
                        status = requested.as_str(),
                        "Payment record reconciled"
                    );
                    return ReconcileReport::Applied;
                }
                Ok(StoreUpdate::AlreadyTerminal(existing)) => {
                    let conflicting = existing != requested;
                    if conflicting {
                        // Never overwrite; a later delivery disagreeing with
                        // the settled state needs a human
                        self.alerter
                            .alert(
                                AlertSeverity::Warning,
                                &format!(
                                    "Duplicate callback requested '{}' but record is '{}'",
                                    requested.as_str(),
                                    existing.as_str()
                                ),
                                txn_ref,
                            )
                            .await;
                    } else {
                        tracing::warn!(
                            txn_ref = %txn_ref,
                            status = existing.as_str(),
                            "Duplicate callback for settled record, no-op"
                        );
                    }
                    return ReconcileReport::AlreadyTerminal {
                        existing,
                        conflicting,
                    };
                }
                Ok(StoreUpdate::NotFound) => {
                    self.alerter
                        .alert(
                            AlertSeverity::Critical,
                            "Verified callback references an unknown payment record",
                            txn_ref,
                        )
                        .await;
                    return ReconcileReport::RecordMissing;
                }
                Err(e) => {
                    tracing::warn!(
                        txn_ref = %txn_ref,
                        attempt,
                        "Store write failed: {}",
                        e
                    );
                    last_error = Some(e);
                    if attempt < self.attempts {
                        tokio::time::sleep(Duration::from_millis(100 * attempt as u64)).await;
                    }
                }
            }
        }

        // The gateway did process the payment; losing the write must not
        // turn into a user-facing payment failure
        self.alerter
            .alert(
                AlertSeverity::Critical,
                &format!(
                    "Could not persist '{}' outcome after {} attempts: {}",
                    requested.as_str(),
                    self.attempts,
                    last_error
                        .map(|e| e.to_string())
                        .unwrap_or_else(|| "unknown error".to_string())
                ),
                txn_ref,
            )
            .await;
        ReconcileReport::StoreFailed
    }
}
