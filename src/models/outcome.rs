use serde::{Deserialize, Serialize};

/// Terminal result of one callback invocation. Exactly one of three cards,
/// tagged so the presentation layer has to handle every case.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CallbackCard {
    Success {
        amount: String,
        currency: String,
        transaction_id: String,
        auth_code: String,
        timestamp: String,
        /// False when the gateway outcome could not be persisted; the
        /// gateway result still stands for the user (see support_note).
        reconciled: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        support_note: Option<String>,
    },
    Failed {
        code: String,
        reason: String,
        reconciled: bool,
    },
    Error {
        reason: String,
    },
}

impl CallbackCard {
    pub fn kind(&self) -> &'static str {
        match self {
            CallbackCard::Success { .. } => "success",
            CallbackCard::Failed { .. } => "failed",
            CallbackCard::Error { .. } => "error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cards_are_tagged_by_status() {
        let card = CallbackCard::Failed {
            code: "105".to_string(),
            reason: "declined".to_string(),
            reconciled: true,
        };
        let json = serde_json::to_value(&card).unwrap();
        assert_eq!(json["status"], "failed");
        assert_eq!(json["code"], "105");
    }

    #[test]
    fn success_card_omits_absent_support_note() {
        let card = CallbackCard::Success {
            amount: "500".to_string(),
            currency: "PKR".to_string(),
            transaction_id: "R1".to_string(),
            auth_code: "A1".to_string(),
            timestamp: "20260806120000".to_string(),
            reconciled: true,
            support_note: None,
        };
        let json = serde_json::to_string(&card).unwrap();
        assert!(!json.contains("support_note"));
        assert_eq!(card.kind(), "success");
    }
}
