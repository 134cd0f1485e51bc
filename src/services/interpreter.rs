/// Gateway response code for an approved transaction.
pub const APPROVED_CODE: &str = "000";

/// Operator-curated decline messages. Unknown codes fall back to a generic
/// message that carries the raw code so support can look it up.
pub const RESPONSE_CODES: &[(&str, &str)] = &[
    ("101", "Transaction declined by the issuing institution"),
    ("105", "Transaction declined. Please contact your account provider"),
    ("110", "This payment instrument is not allowed for the transaction"),
    ("111", "Merchant authentication failed"),
    ("115", "Insufficient balance in the paying account"),
    ("121", "Transaction exceeds the allowed account limit"),
    ("124", "A transaction with this reference was already processed"),
    ("156", "Invalid PIN entered"),
    ("157", "Transaction cancelled by the customer"),
    ("199", "Gateway system error. Please try again later"),
    ("210", "Transaction timed out awaiting customer confirmation"),
];

/// Three-way classification of a gateway response code. `Malformed` is an
/// application-side fault (the true payment state is unknown), distinct from
/// a gateway-reported decline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Interpretation {
    Approved,
    Declined { code: String, reason: String },
    Malformed,
}

pub fn interpret(code: &str) -> Interpretation {
    let code = code.trim();
    if code.is_empty() {
        return Interpretation::Malformed;
    }
    if code == APPROVED_CODE {
        return Interpretation::Approved;
    }

    let reason = RESPONSE_CODES
        .iter()
        .find(|(known, _)| *known == code)
        .map(|(_, message)| message.to_string())
        .unwrap_or_else(|| format!("Payment failed (gateway response code {})", code));

    Interpretation::Declined {
        code: code.to_string(),
        reason,
    }
}
