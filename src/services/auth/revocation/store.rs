use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::services::cache::CacheError;

/// Forced sign-out record. One per principal; a newer sign-out overwrites it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevocationRecord {
    pub principal: String,
    // Tokens issued strictly before this instant are rejected.
    pub last_force_sign_out_ms: i64,
    // Seconds since epoch after which the record no longer applies.
    pub expires_at: i64,
}

impl RevocationRecord {
    pub fn is_expired(&self, now_secs: i64) -> bool {
        self.expires_at <= now_secs
    }

    /// Whether a token issued at `issued_at_secs` predates this sign-out.
    pub fn revokes(&self, issued_at_secs: i64) -> bool {
        issued_at_secs.saturating_mul(1000) < self.last_force_sign_out_ms
    }
}

/// Point lookup / upsert storage for forced sign-out records, keyed by principal.
///
/// Returns:
/// - `Ok(None)` => no (live) record
/// - `Err(_)`   => backend failure (the oracle treats it as fail-closed)
#[async_trait]
pub trait RevocationStore: Send + Sync {
    fn backend_name(&self) -> &'static str;

    async fn get(&self, principal: &str) -> Result<Option<RevocationRecord>, RevocationError>;

    async fn upsert(&self, record: RevocationRecord) -> Result<(), RevocationError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RevocationError {
    #[error("revocation storage failure: {0}")]
    Storage(#[from] CacheError),

    #[error("revocation lookup timed out")]
    Timeout,

    #[error("invalid revocation record: {0}")]
    InvalidRecord(String),
}
