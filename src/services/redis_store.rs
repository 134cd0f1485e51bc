use crate::models::PaymentRecord;
use crate::services::store::{PaymentStore, StatusUpdate, StoreUpdate};
use anyhow::{Context, Result};
use async_trait::async_trait;
use redis::AsyncCommands;

// Pending-only transition, atomic server-side. Terminal records are left
// untouched and reported back with their current status.
const CAS_TRANSITION: &str = r#"
local raw = redis.call('GET', KEYS[1])
if not raw then
    return 'missing'
end
local record = cjson.decode(raw)
if record.status ~= 'pending' then
    return 'terminal:' .. record.status
end
record.status = ARGV[1]
if ARGV[2] ~= '' then
    record.completion_id = ARGV[2]
end
if ARGV[3] ~= '' then
    record.failure_reason = ARGV[3]
end
record.updated_at = ARGV[4]
redis.call('SET', KEYS[1], cjson.encode(record))
return 'applied'
"#;

/// Payment record store backed by Redis. Records live under
/// `payment:{txn_ref}` as JSON; the conditional transition runs as a Lua
/// script so duplicate callbacks race at the server, not in the client.
pub struct RedisPaymentStore {
    conn: redis::aio::ConnectionManager,
    transition_script: redis::Script,
}

impl RedisPaymentStore {
    pub fn new(conn: redis::aio::ConnectionManager) -> Self {
        Self {
            conn,
            transition_script: redis::Script::new(CAS_TRANSITION),
        }
    }

    fn key(txn_ref: &str) -> String {
        format!("payment:{}", txn_ref)
    }
}

#[async_trait]
impl PaymentStore for RedisPaymentStore {
    async fn find(&self, txn_ref: &str) -> Result<Option<PaymentRecord>> {
        let mut conn = self.conn.clone();
        let raw: Option<String> = conn
            .get(Self::key(txn_ref))
            .await
            .context("Redis GET failed")?;

        match raw {
            Some(json) => {
                let record = serde_json::from_str(&json)
                    .with_context(|| format!("Corrupt payment record for {}", txn_ref))?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    async fn create_pending(&self, record: PaymentRecord) -> Result<bool> {
        let mut conn = self.conn.clone();
        let json = serde_json::to_string(&record)?;
        let created: bool = conn
            .set_nx(Self::key(&record.txn_ref), json)
            .await
            .context("Redis SETNX failed")?;
        Ok(created)
    }

    async fn transition(&self, txn_ref: &str, update: StatusUpdate) -> Result<StoreUpdate> {
        let (completion_id, failure_reason) = match &update {
            StatusUpdate::Complete { completion_id } => (completion_id.as_str(), ""),
            StatusUpdate::Fail { reason } => ("", reason.as_str()),
        };

        let mut conn = self.conn.clone();
        let verdict: String = self
            .transition_script
            .key(Self::key(txn_ref))
            .arg(update.target_status().as_str())
            .arg(completion_id)
            .arg(failure_reason)
            .arg(chrono::Utc::now().to_rfc3339())
            .invoke_async(&mut conn)
            .await
            .context("Redis transition script failed")?;

        match verdict.as_str() {
            "applied" => Ok(StoreUpdate::Applied),
            "missing" => Ok(StoreUpdate::NotFound),
            "terminal:completed" => {
                Ok(StoreUpdate::AlreadyTerminal(crate::models::PaymentStatus::Completed))
            }
            "terminal:failed" => {
                Ok(StoreUpdate::AlreadyTerminal(crate::models::PaymentStatus::Failed))
            }
            other => anyhow::bail!("Unexpected transition verdict: {}", other),
        }
    }

    async fn ping(&self) -> bool {
        let mut conn = self.conn.clone();
        redis::cmd("PING")
            .query_async::<_, String>(&mut conn)
            .await
            .is_ok()
    }
}
