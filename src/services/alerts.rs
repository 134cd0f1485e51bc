use chrono::Utc;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Fire-and-forget operational alerts for outcomes that need manual
/// follow-up (store write failures, conflicting duplicate callbacks).
/// Without a configured webhook the alert degrades to an error-level log.
pub struct OpsAlerter {
    client: reqwest::Client,
    webhook_url: Option<String>,
    sent: AtomicU64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertSeverity {
    Warning,
    Critical,
}

impl AlertSeverity {
    fn as_str(&self) -> &'static str {
        match self {
            AlertSeverity::Warning => "warning",
            AlertSeverity::Critical => "critical",
        }
    }
}

impl OpsAlerter {
    pub fn new(webhook_url: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            webhook_url,
            sent: AtomicU64::new(0),
        }
    }

    pub async fn alert(&self, severity: AlertSeverity, message: &str, txn_ref: &str) {
        self.sent.fetch_add(1, Ordering::SeqCst);
        tracing::error!(
            severity = severity.as_str(),
            txn_ref = txn_ref,
            "{}",
            message
        );

        let Some(url) = &self.webhook_url else {
            return;
        };

        #[derive(Serialize)]
        struct AlertPayload<'a> {
            severity: &'a str,
            message: &'a str,
            txn_ref: &'a str,
            service: &'a str,
            timestamp: String,
        }

        let payload = AlertPayload {
            severity: severity.as_str(),
            message,
            txn_ref,
            service: env!("CARGO_PKG_NAME"),
            timestamp: Utc::now().to_rfc3339(),
        };

        match self.client.post(url).json(&payload).send().await {
            Ok(response) if response.status().is_success() => {
                tracing::debug!("Alert delivered to ops webhook");
            }
            Ok(response) => {
                tracing::warn!("Ops webhook rejected alert: {}", response.status());
            }
            Err(e) => {
                tracing::warn!("Ops webhook unreachable: {}", e);
            }
        }
    }

    pub fn alerts_sent(&self) -> u64 {
        self.sent.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn alert_posts_payload_to_webhook() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/alerts")
            .match_header("content-type", "application/json")
            .match_body(mockito::Matcher::PartialJsonString(
                r#"{"severity":"critical","txn_ref":"T1"}"#.to_string(),
            ))
            .with_status(200)
            .create_async()
            .await;

        let alerter = OpsAlerter::new(Some(format!("{}/alerts", server.url())));
        alerter
            .alert(AlertSeverity::Critical, "store write failed", "T1")
            .await;

        mock.assert_async().await;
        assert_eq!(alerter.alerts_sent(), 1);
    }

    #[tokio::test]
    async fn webhook_failure_does_not_panic() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/alerts")
            .with_status(500)
            .create_async()
            .await;

        let alerter = OpsAlerter::new(Some(format!("{}/alerts", server.url())));
        alerter
            .alert(AlertSeverity::Warning, "conflicting duplicate", "T2")
            .await;
        assert_eq!(alerter.alerts_sent(), 1);
    }

    #[tokio::test]
    async fn missing_webhook_degrades_to_logging() {
        let alerter = OpsAlerter::new(None);
        alerter
            .alert(AlertSeverity::Warning, "no webhook configured", "T3")
            .await;
        assert_eq!(alerter.alerts_sent(), 1);
    }
}
