use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
    pub store: bool,
    pub uptime_seconds: u64,
    pub timestamp: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct Stats {
    pub callbacks_total: u64,
    pub success: u64,
    pub failed: u64,
    pub error: u64,
    pub reconciliation_alerts: u64,
    pub uptime_seconds: u64,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct InitiateRequest {
    pub campaign_id: String,
    /// Gateway-format amount string, lowest denomination.
    pub amount: String,
    #[serde(default)]
    pub currency: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct InitiateResponse {
    pub txn_ref: String,
    pub bill_reference: String,
    pub amount: String,
    pub currency: String,
    pub created_at: DateTime<Utc>,
}
