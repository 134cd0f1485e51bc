use anyhow::{bail, Context, Result};
use std::fmt;

#[derive(Debug, Clone)]
pub enum Environment {
    Development,
    Sandbox,
    Production,
}

/// Shared-secret material for the gateway integration. Injected into the
/// signature verifier; the integrity salt must never be logged or persisted.
#[derive(Clone)]
pub struct GatewayConfig {
    pub merchant_id: String,
    pub integrity_salt: String,
}

impl fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("merchant_id", &self.merchant_id)
            .field("integrity_salt", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub environment: Environment,
    pub host: String,
    pub port: u16,

    // Gateway integration
    pub gateway: GatewayConfig,

    // Redis (payment record store + counters)
    pub redis_url: String,

    // Operational alerting
    pub alert_webhook_url: Option<String>,
    pub store_write_attempts: u32,

    // Rate Limiting
    pub rate_limit_per_second: u64,
    pub rate_limit_burst: u32,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let environment = Self::parse_environment()?;

        let config = Self {
            environment: environment.clone(),
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("Invalid PORT")?,

            gateway: GatewayConfig {
                merchant_id: std::env::var("MERCHANT_ID")
                    .context("MERCHANT_ID required")?,
                integrity_salt: std::env::var("INTEGRITY_SALT")
                    .context("INTEGRITY_SALT required")?,
            },

            redis_url: std::env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://localhost:6379".to_string()),

            alert_webhook_url: std::env::var("ALERT_WEBHOOK_URL").ok(),
            store_write_attempts: std::env::var("STORE_WRITE_ATTEMPTS")
                .unwrap_or_else(|_| "3".to_string())
                .parse()
                .context("Invalid STORE_WRITE_ATTEMPTS")?,

            rate_limit_per_second: std::env::var("RATE_LIMIT_PER_SECOND")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .context("Invalid RATE_LIMIT_PER_SECOND")?,
            rate_limit_burst: std::env::var("RATE_LIMIT_BURST")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .context("Invalid RATE_LIMIT_BURST")?,
        };

        config.validate()?;
        Ok(config)
    }

    fn parse_environment() -> Result<Environment> {
        let env = std::env::var("ENVIRONMENT")
            .unwrap_or_else(|_| "development".to_string());

        match env.to_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "sandbox" | "test" => Ok(Environment::Sandbox),
            "production" | "prod" => Ok(Environment::Production),
            _ => bail!("Unknown environment: {}", env),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.gateway.merchant_id.trim().is_empty() {
            bail!("MERCHANT_ID must not be empty");
        }

        // Short salts make the secure hash trivially forgeable
        if self.gateway.integrity_salt.len() < 8 {
            bail!("INTEGRITY_SALT must be at least 8 characters");
        }

        if let Some(url) = &self.alert_webhook_url {
            if !url.starts_with("http") {
                bail!("ALERT_WEBHOOK_URL must be HTTP(S) URL");
            }
        }

        if self.store_write_attempts == 0 {
            bail!("STORE_WRITE_ATTEMPTS must be at least 1");
        }

        tracing::info!(
            "Configuration validated for {:?} environment",
            self.environment
        );

        Ok(())
    }
}
