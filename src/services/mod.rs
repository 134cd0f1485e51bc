pub mod alerts;
pub mod analytics;
pub mod interpreter;
pub mod reconcile;
pub mod redis_store;
pub mod store;
pub mod verifier;

pub use alerts::{AlertSeverity, OpsAlerter};
pub use analytics::Analytics;
pub use interpreter::{interpret, Interpretation, APPROVED_CODE, RESPONSE_CODES};
pub use reconcile::{ReconcileReport, ReconciliationWriter};
pub use redis_store::RedisPaymentStore;
pub use store::{MemoryPaymentStore, PaymentStore, StatusUpdate, StoreUpdate};
pub use verifier::SignatureVerifier;
