//! In-process revocation store.
//!
//! Used for local development and tests, or when `VALKEY_URL` is not configured.
//! Not durable and not shared between instances.
use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::store::{RevocationError, RevocationRecord, RevocationStore};

#[derive(Debug, Clone, Default)]
pub struct InMemoryRevocationStore {
    records: Arc<RwLock<HashMap<String, RevocationRecord>>>,
}

impl InMemoryRevocationStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }
}

#[async_trait]
impl RevocationStore for InMemoryRevocationStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn get(&self, principal: &str) -> Result<Option<RevocationRecord>, RevocationError> {
        let now = chrono::Utc::now().timestamp();

        let records = self.records.read().await;
        Ok(records
            .get(principal)
            .filter(|r| !r.is_expired(now))
            .cloned())
    }

    async fn upsert(&self, record: RevocationRecord) -> Result<(), RevocationError> {
        let now = chrono::Utc::now().timestamp();

        let mut records = self.records.write().await;
        // Drop expired records on write so the map does not grow without bound.
        records.retain(|_, r| !r.is_expired(now));

        // Concurrent sign-outs may arrive out of order; the later timestamp wins.
        if let Some(existing) = records.get(&record.principal)
            && existing.last_force_sign_out_ms > record.last_force_sign_out_ms
        {
            return Ok(());
        }

        records.insert(record.principal.clone(), record);
        Ok(())
    }
}
