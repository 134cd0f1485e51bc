use crate::{
    error::PayGuardError,
    models::{CallbackCard, CallbackResponse},
    services::{interpret, Analytics, Interpretation, ReconciliationWriter, SignatureVerifier},
};
use axum::{
    extract::{Query, State},
    Json,
};
use moka::future::Cache;
use std::collections::HashMap;
use std::sync::Arc;

const SUPPORT_NOTE: &str = "Your payment was processed by the gateway, but our \
records could not be updated. Support has been notified and will reconcile it \
manually.";

#[derive(Clone)]
pub struct CallbackState {
    pub verifier: Arc<SignatureVerifier>,
    pub reconciler: Arc<ReconciliationWriter>,
    pub analytics: Arc<Analytics>,
    /// Replay memo for duplicate redirects (user refreshing the result
    /// page). Consulted only after the signature check has passed, so a
    /// forged duplicate can never be served a cached card.
    pub recent: Cache<String, CallbackCard>,
}

/// The gateway redirect. One invocation ends in exactly one of three
/// terminal cards; flow faults are converted at this boundary, nothing
/// propagates to the client raw.
pub async fn payment_callback(
    State(state): State<CallbackState>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<CallbackCard> {
    let response = CallbackResponse::from_query(&params);

    let card = match run_flow(&state, &response).await {
        Ok(card) => card,
        Err(e) => error_card(&response, e),
    };

    state.analytics.record_outcome(&card).await;
    if !matches!(card, CallbackCard::Error { .. }) {
        state.recent.insert(memo_key(&response), card.clone()).await;
    }
    Json(card)
}

// Keyed by the exact signed payload: a browser refresh replays the same
// redirect and hits the memo, while a differing (conflicting) delivery
// still reaches the reconciler's terminal-state check.
fn memo_key(response: &CallbackResponse) -> String {
    format!("{}:{}", response.txn_ref, response.secure_hash)
}

async fn run_flow(
    state: &CallbackState,
    response: &CallbackResponse,
) -> Result<CallbackCard, PayGuardError> {
    if !response.has_required_fields() {
        return Err(PayGuardError::MalformedCallback(
            "required callback fields absent".to_string(),
        ));
    }

    // Signature check comes before anything that could touch the store
    if !state.verifier.verify(response) {
        return Err(PayGuardError::VerificationFailed(response.txn_ref.clone()));
    }

    if let Some(card) = state.recent.get(&memo_key(response)).await {
        tracing::debug!(txn_ref = %response.txn_ref, "Served from replay memo");
        return Ok(card);
    }

    let card = match interpret(&response.response_code) {
        Interpretation::Approved => {
            let report = state.reconciler.complete(response).await;
            let reconciled = report.reconciled();
            CallbackCard::Success {
                amount: response.amount.clone(),
                currency: response.currency.clone(),
                transaction_id: response.retrieval_ref.clone(),
                auth_code: response.auth_code.clone(),
                timestamp: response.txn_datetime.clone(),
                reconciled,
                support_note: (!reconciled).then(|| SUPPORT_NOTE.to_string()),
            }
        }
        Interpretation::Declined { code, reason } => {
            let report = state.reconciler.fail(response, &reason).await;
            CallbackCard::Failed {
                code,
                reason,
                reconciled: report.reconciled(),
            }
        }
        Interpretation::Malformed => {
            return Err(PayGuardError::MalformedCallback(
                "gateway reported no transaction outcome".to_string(),
            ));
        }
    };

    Ok(card)
}

fn error_card(response: &CallbackResponse, error: PayGuardError) -> CallbackCard {
    // Logged with the offending reference, never the salt
    tracing::warn!(
        txn_ref = %response.txn_ref,
        error = %error,
        "Callback rejected"
    );

    let reason = match error {
        PayGuardError::VerificationFailed(_) => {
            "The payment response could not be verified. If you were charged, \
             please contact support."
        }
        PayGuardError::MalformedCallback(_) => {
            "The gateway response was incomplete. If you were charged, please \
             contact support with your payment details."
        }
        _ => "Something went wrong while processing the payment response. \
              Please contact support.",
    };

    CallbackCard::Error {
        reason: reason.to_string(),
    }
}
