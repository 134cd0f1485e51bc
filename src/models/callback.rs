use std::collections::HashMap;

/// Bill references carry the campaign id behind a fixed prefix, e.g. `CAMP42`.
pub const BILL_REFERENCE_PREFIX: &str = "CAMP";

pub const WIRE_VERSION: &str = "pp_Version";
pub const WIRE_TXN_TYPE: &str = "pp_TxnType";
pub const WIRE_MERCHANT_ID: &str = "pp_MerchantID";
pub const WIRE_TXN_REF: &str = "pp_TxnRefNo";
pub const WIRE_AMOUNT: &str = "pp_Amount";
pub const WIRE_CURRENCY: &str = "pp_TxnCurrency";
pub const WIRE_BILL_REFERENCE: &str = "pp_BillReference";
pub const WIRE_DESCRIPTION: &str = "pp_Description";
pub const WIRE_TXN_DATETIME: &str = "pp_TxnDateTime";
pub const WIRE_SECURE_HASH: &str = "pp_SecureHash";
pub const WIRE_RESPONSE_CODE: &str = "pp_ResponseCode";
pub const WIRE_RESPONSE_MESSAGE: &str = "pp_ResponseMessage";
pub const WIRE_AUTH_CODE: &str = "pp_AuthCode";
// Gateway spelling, kept verbatim on the wire
pub const WIRE_RETRIEVAL_REF: &str = "pp_RetreivalReferenceNo";
pub const WIRE_SETTLEMENT_EXPIRY: &str = "pp_SettlementExpiry";

/// One gateway redirect, as received. Immutable once parsed; all fields
/// default to the empty string so a truncated redirect degrades instead of
/// crashing the flow.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallbackResponse {
    pub version: String,
    pub txn_type: String,
    pub merchant_id: String,
    pub txn_ref: String,
    pub amount: String,
    pub currency: String,
    pub bill_reference: String,
    pub description: String,
    pub txn_datetime: String,
    pub secure_hash: String,
    pub response_code: String,
    pub response_message: String,
    pub auth_code: String,
    pub retrieval_ref: String,
    pub settlement_expiry: String,
}

impl CallbackResponse {
    pub fn from_query(params: &HashMap<String, String>) -> Self {
        let field = |key: &str| params.get(key).cloned().unwrap_or_default();

        Self {
            version: field(WIRE_VERSION),
            txn_type: field(WIRE_TXN_TYPE),
            merchant_id: field(WIRE_MERCHANT_ID),
            txn_ref: field(WIRE_TXN_REF),
            amount: field(WIRE_AMOUNT),
            currency: field(WIRE_CURRENCY),
            bill_reference: field(WIRE_BILL_REFERENCE),
            description: field(WIRE_DESCRIPTION),
            txn_datetime: field(WIRE_TXN_DATETIME),
            secure_hash: field(WIRE_SECURE_HASH),
            response_code: field(WIRE_RESPONSE_CODE),
            response_message: field(WIRE_RESPONSE_MESSAGE),
            auth_code: field(WIRE_AUTH_CODE),
            retrieval_ref: field(WIRE_RETRIEVAL_REF),
            settlement_expiry: field(WIRE_SETTLEMENT_EXPIRY),
        }
    }

    /// Fields that participate in the secure hash, in fixed alphabetical
    /// wire-name order. `pp_SecureHash` itself is excluded.
    pub fn signed_fields(&self) -> [(&'static str, &str); 14] {
        [
            (WIRE_AMOUNT, &self.amount),
            (WIRE_AUTH_CODE, &self.auth_code),
            (WIRE_BILL_REFERENCE, &self.bill_reference),
            (WIRE_DESCRIPTION, &self.description),
            (WIRE_MERCHANT_ID, &self.merchant_id),
            (WIRE_RESPONSE_CODE, &self.response_code),
            (WIRE_RESPONSE_MESSAGE, &self.response_message),
            (WIRE_RETRIEVAL_REF, &self.retrieval_ref),
            (WIRE_SETTLEMENT_EXPIRY, &self.settlement_expiry),
            (WIRE_CURRENCY, &self.currency),
            (WIRE_TXN_DATETIME, &self.txn_datetime),
            (WIRE_TXN_REF, &self.txn_ref),
            (WIRE_TXN_TYPE, &self.txn_type),
            (WIRE_VERSION, &self.version),
        ]
    }

    /// The full wire representation, secure hash included. Used by the
    /// gateway simulator to rebuild the redirect query string.
    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut params: Vec<(String, String)> = self
            .signed_fields()
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        params.push((WIRE_SECURE_HASH.to_string(), self.secure_hash.clone()));
        params
    }

    /// A callback the flow can act on must at least identify a transaction,
    /// report a gateway code, and carry the hash to authenticate both.
    pub fn has_required_fields(&self) -> bool {
        !self.txn_ref.is_empty()
            && !self.response_code.is_empty()
            && !self.secure_hash.is_empty()
    }

    /// Campaign id carried inside the bill reference, if the prefix matches.
    pub fn campaign_id(&self) -> Option<&str> {
        self.bill_reference
            .strip_prefix(BILL_REFERENCE_PREFIX)
            .filter(|id| !id.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn absent_fields_default_to_empty() {
        let parsed = CallbackResponse::from_query(&query(&[
            (WIRE_TXN_REF, "T20260806120000"),
            (WIRE_RESPONSE_CODE, "000"),
        ]));

        assert_eq!(parsed.txn_ref, "T20260806120000");
        assert_eq!(parsed.response_code, "000");
        assert_eq!(parsed.amount, "");
        assert_eq!(parsed.secure_hash, "");
        assert!(!parsed.has_required_fields());
    }

    #[test]
    fn empty_query_parses_without_panic() {
        let parsed = CallbackResponse::from_query(&HashMap::new());
        assert_eq!(parsed, CallbackResponse::default());
        assert!(!parsed.has_required_fields());
    }

    #[test]
    fn unknown_parameters_are_ignored() {
        let parsed = CallbackResponse::from_query(&query(&[
            (WIRE_TXN_REF, "T1"),
            ("pp_BogusField", "x"),
            ("utm_source", "email"),
        ]));
        assert_eq!(parsed.txn_ref, "T1");
    }

    #[test]
    fn signed_fields_exclude_the_hash() {
        let mut parsed = CallbackResponse::default();
        parsed.secure_hash = "ABCDEF".to_string();
        assert!(parsed
            .signed_fields()
            .iter()
            .all(|(key, _)| *key != WIRE_SECURE_HASH));
    }

    #[test]
    fn signed_fields_are_alphabetical_by_wire_name() {
        let parsed = CallbackResponse::default();
        let fields = parsed.signed_fields();
        for pair in fields.windows(2) {
            assert!(pair[0].0 < pair[1].0, "{} !< {}", pair[0].0, pair[1].0);
        }
    }

    #[test]
    fn campaign_id_requires_the_prefix() {
        let mut parsed = CallbackResponse::default();

        parsed.bill_reference = "CAMP42".to_string();
        assert_eq!(parsed.campaign_id(), Some("42"));

        parsed.bill_reference = "ORDER42".to_string();
        assert_eq!(parsed.campaign_id(), None);

        parsed.bill_reference = "CAMP".to_string();
        assert_eq!(parsed.campaign_id(), None);
    }

    #[test]
    fn wire_round_trip_preserves_every_field() {
        let mut original = CallbackResponse::default();
        original.txn_ref = "T20260806120000".to_string();
        original.amount = "50000".to_string();
        original.currency = "PKR".to_string();
        original.bill_reference = "CAMP7".to_string();
        original.response_code = "000".to_string();
        original.secure_hash = "AA11".to_string();

        let wire: HashMap<String, String> = original.to_query().into_iter().collect();
        assert_eq!(CallbackResponse::from_query(&wire), original);
    }
}
