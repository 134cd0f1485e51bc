use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Completed => "completed",
            PaymentStatus::Failed => "failed",
        }
    }
}

/// One donation attempt. Created as `pending` at payment initiation and
/// moved to exactly one terminal status by the reconciliation writer.
/// Terminal records are never mutated again.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub txn_ref: String,
    pub campaign_id: String,
    /// Gateway-format amount string, lowest denomination.
    pub amount: String,
    pub currency: String,
    pub status: PaymentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completion_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PaymentRecord {
    pub fn new_pending(
        txn_ref: impl Into<String>,
        campaign_id: impl Into<String>,
        amount: impl Into<String>,
        currency: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            txn_ref: txn_ref.into(),
            campaign_id: campaign_id.into(),
            amount: amount.into(),
            currency: currency.into(),
            status: PaymentStatus::Pending,
            completion_id: None,
            failure_reason: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status != PaymentStatus::Pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_records_are_pending() {
        let record = PaymentRecord::new_pending("T1", "42", "50000", "PKR");
        assert_eq!(record.status, PaymentStatus::Pending);
        assert!(!record.is_terminal());
        assert!(record.completion_id.is_none());
        assert!(record.failure_reason.is_none());
    }

    #[test]
    fn json_omits_absent_optionals() {
        // The Redis CAS script decodes the stored JSON with cjson, which
        // cannot round-trip nulls; absent fields must stay absent.
        let record = PaymentRecord::new_pending("T1", "42", "50000", "PKR");
        let json = serde_json::to_string(&record).unwrap();
        assert!(!json.contains("completion_id"));
        assert!(!json.contains("failure_reason"));

        let back: PaymentRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back.status, PaymentStatus::Pending);
        assert_eq!(back.txn_ref, "T1");
    }

    #[test]
    fn status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&PaymentStatus::Completed).unwrap(),
            "\"completed\""
        );
        assert_eq!(PaymentStatus::Failed.as_str(), "failed");
    }
}
