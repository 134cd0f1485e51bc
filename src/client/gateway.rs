use crate::config::GatewayConfig;
use crate::models::{CallbackCard, CallbackResponse, InitiateRequest, InitiateResponse};
use crate::services::SignatureVerifier;
use anyhow::{Context, Result};
use chrono::{Duration, Utc};

/// Stand-in for the payment gateway: initiates payments against a running
/// pay-guard instance and forges the signed redirect the real gateway would
/// send back. Used by the `gateway-sim` binary and sandbox testing.
pub struct GatewayClient {
    base_url: String,
    client: reqwest::Client,
    config: GatewayConfig,
    verifier: SignatureVerifier,
}

impl GatewayClient {
    pub fn new(base_url: impl Into<String>, config: GatewayConfig) -> Self {
        Self {
            base_url: base_url.into(),
            client: reqwest::Client::new(),
            verifier: SignatureVerifier::new(config.clone()),
            config,
        }
    }

    pub async fn initiate(&self, campaign_id: &str, amount: &str) -> Result<InitiateResponse> {
        let response = self
            .client
            .post(format!("{}/payments/initiate", self.base_url))
            .json(&InitiateRequest {
                campaign_id: campaign_id.to_string(),
                amount: amount.to_string(),
                currency: None,
            })
            .send()
            .await
            .context("Failed to reach pay-guard")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Initiation rejected ({}): {}", status, body);
        }

        response
            .json()
            .await
            .context("Invalid initiation response")
    }

    /// Build the redirect the gateway would issue for this payment, signed
    /// with the shared integrity salt.
    pub fn signed_callback(
        &self,
        initiation: &InitiateResponse,
        response_code: &str,
        response_message: &str,
    ) -> CallbackResponse {
        let now = Utc::now();
        let mut response = CallbackResponse {
            version: "1.1".to_string(),
            txn_type: "MWALLET".to_string(),
            merchant_id: self.config.merchant_id.clone(),
            txn_ref: initiation.txn_ref.clone(),
            amount: initiation.amount.clone(),
            currency: initiation.currency.clone(),
            bill_reference: initiation.bill_reference.clone(),
            description: "Campaign donation".to_string(),
            txn_datetime: now.format("%Y%m%d%H%M%S").to_string(),
            response_code: response_code.to_string(),
            response_message: response_message.to_string(),
            auth_code: if response_code == "000" {
                format!("{:06}", now.timestamp() % 1_000_000)
            } else {
                String::new()
            },
            retrieval_ref: format!("{}", now.format("%y%m%d%H%M%S")),
            settlement_expiry: (now + Duration::days(7)).format("%Y%m%d%H%M%S").to_string(),
            secure_hash: String::new(),
        };
        response.secure_hash = self.verifier.sign(&response);
        response
    }

    pub async fn send_callback(&self, callback: &CallbackResponse) -> Result<CallbackCard> {
        let response = self
            .client
            .get(format!("{}/payments/callback", self.base_url))
            .query(&callback.to_query())
            .send()
            .await
            .context("Failed to deliver callback")?;

        if !response.status().is_success() {
            anyhow::bail!("Callback rejected: {}", response.status());
        }

        response.json().await.context("Invalid callback card")
    }
}
