use crate::{
    models::HealthStatus,
    services::{Analytics, PaymentStore},
};
use axum::{extract::State, Json};
use chrono::Utc;
use std::sync::Arc;

#[derive(Clone)]
pub struct HealthState {
    pub store: Arc<dyn PaymentStore>,
    pub analytics: Arc<Analytics>,
}

pub async fn health_check(State(state): State<HealthState>) -> Json<HealthStatus> {
    let store_ok = state.store.ping().await;

    let status = if store_ok { "healthy" } else { "degraded" };

    Json(HealthStatus {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        store: store_ok,
        uptime_seconds: state.analytics.uptime_seconds(),
        timestamp: Utc::now(),
    })
}
