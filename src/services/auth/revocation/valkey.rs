use std::sync::Arc;

use async_trait::async_trait;

use crate::services::{
    auth::revocation::store::{RevocationError, RevocationRecord, RevocationStore},
    cache::{CacheClient, ValkeyClient},
};

/// Valkey-backed revocation store (Redis protocol).
///
/// One key per principal holding the JSON record; the key TTL follows `expires_at`
/// so Valkey evicts records after the retention window.
#[derive(Clone)]
pub struct ValkeyRevocationStore<C: CacheClient> {
    cache: Arc<C>,
    // Optional key prefix to avoid collisions across environments
    prefix: String,
}

impl ValkeyRevocationStore<ValkeyClient> {
    pub async fn new(redis_url: &str) -> Result<Self, RevocationError> {
        Self::new_with_prefix(redis_url, "signout").await
    }

    pub async fn new_with_prefix(
        redis_url: &str,
        prefix: impl Into<String>,
    ) -> Result<Self, RevocationError> {
        let client = ValkeyClient::new(redis_url).await?;

        Ok(Self {
            cache: Arc::new(client),
            prefix: prefix.into(),
        })
    }
}

impl<C: CacheClient> ValkeyRevocationStore<C> {
    pub fn new_with_cache(cache: Arc<C>, prefix: impl Into<String>) -> Self {
        Self {
            cache,
            prefix: prefix.into(),
        }
    }

    pub fn key(&self, principal: &str) -> String {
        format!("{}:{}", self.prefix, principal)
    }
}

#[async_trait]
impl<C: CacheClient> RevocationStore for ValkeyRevocationStore<C> {
    fn backend_name(&self) -> &'static str {
        self.cache.backend_name()
    }

    async fn get(&self, principal: &str) -> Result<Option<RevocationRecord>, RevocationError> {
        let Some(raw) = self.cache.get_string(&self.key(principal)).await? else {
            return Ok(None);
        };

        let record: RevocationRecord = serde_json::from_str(&raw)
            .map_err(|e| RevocationError::InvalidRecord(e.to_string()))?;

        // The key TTL may lag a little behind `expires_at`.
        if record.is_expired(chrono::Utc::now().timestamp()) {
            return Ok(None);
        }

        Ok(Some(record))
    }

    async fn upsert(&self, record: RevocationRecord) -> Result<(), RevocationError> {
        // Best effort: read-then-write is not atomic across instances, but an older
        // sign-out arriving late does not overwrite a newer one.
        // Read failures fall through; the write below reports the backend error.
        if let Ok(Some(existing)) = self.get(&record.principal).await
            && existing.last_force_sign_out_ms > record.last_force_sign_out_ms
        {
            return Ok(());
        }

        let now = chrono::Utc::now().timestamp();
        let ttl = std::time::Duration::from_secs(record.expires_at.saturating_sub(now).max(1) as u64);

        let value = serde_json::to_string(&record)
            .map_err(|e| RevocationError::InvalidRecord(e.to_string()))?;

        self.cache
            .set_with_ttl(&self.key(&record.principal), &value, ttl)
            .await?;

        Ok(())
    }
}
