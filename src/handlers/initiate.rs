use crate::{
    error::PayGuardError,
    models::{InitiateRequest, InitiateResponse, PaymentRecord, BILL_REFERENCE_PREFIX},
    services::PaymentStore,
};
use axum::{extract::State, Json};
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Clone)]
pub struct InitiateState {
    pub store: Arc<dyn PaymentStore>,
}

/// Payment-initiation hook: the platform calls this when a donor starts a
/// payment, before redirecting them to the gateway. Creates the pending
/// record the callback will later reconcile against.
pub async fn initiate_payment(
    State(state): State<InitiateState>,
    Json(request): Json<InitiateRequest>,
) -> Result<Json<InitiateResponse>, PayGuardError> {
    if request.campaign_id.is_empty()
        || !request.campaign_id.chars().all(|c| c.is_ascii_alphanumeric())
    {
        return Err(PayGuardError::InvalidRequest(
            "campaign_id must be non-empty and alphanumeric".to_string(),
        ));
    }
    if request.amount.is_empty() || !request.amount.chars().all(|c| c.is_ascii_digit()) {
        return Err(PayGuardError::InvalidRequest(
            "amount must be a positive integer string".to_string(),
        ));
    }
    if request.amount.chars().all(|c| c == '0') {
        return Err(PayGuardError::InvalidRequest(
            "amount must be greater than zero".to_string(),
        ));
    }

    let currency = request
        .currency
        .clone()
        .unwrap_or_else(|| "PKR".to_string());

    let suffix: String = Uuid::new_v4().simple().to_string()[..6].to_uppercase();
    let txn_ref = format!("T{}{}", Utc::now().format("%Y%m%d%H%M%S"), suffix);

    let record = PaymentRecord::new_pending(
        txn_ref.clone(),
        request.campaign_id.clone(),
        request.amount.clone(),
        currency.clone(),
    );
    let created_at = record.created_at;

    let created = state
        .store
        .create_pending(record)
        .await
        .map_err(|e| PayGuardError::ReconciliationFailed(e.to_string()))?;
    if !created {
        return Err(PayGuardError::DuplicateReference(txn_ref));
    }

    tracing::info!(
        txn_ref = %txn_ref,
        campaign_id = %request.campaign_id,
        "Payment initiated"
    );

    Ok(Json(InitiateResponse {
        txn_ref,
        bill_reference: format!("{}{}", BILL_REFERENCE_PREFIX, request.campaign_id),
        amount: request.amount,
        currency,
        created_at,
    }))
}
