use std::sync::Arc;
use std::time::Duration;

use super::store::{RevocationError, RevocationRecord, RevocationStore};

/// Records forced sign-outs so the oracle rejects tokens issued before them.
#[derive(Clone)]
pub struct ForcedSignOutRecorder {
    store: Arc<dyn RevocationStore>,
    retention: Duration,
}

impl std::fmt::Debug for ForcedSignOutRecorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ForcedSignOutRecorder")
            .field("backend", &self.store.backend_name())
            .field("retention", &self.retention)
            .finish()
    }
}

impl ForcedSignOutRecorder {
    pub fn new(store: Arc<dyn RevocationStore>, retention: Duration) -> Self {
        Self { store, retention }
    }

    pub async fn record_sign_out(&self, principal: &str) -> Result<RevocationRecord, RevocationError> {
        self.record_sign_out_at(principal, chrono::Utc::now().timestamp_millis())
            .await
    }

    pub async fn record_sign_out_at(
        &self,
        principal: &str,
        now_ms: i64,
    ) -> Result<RevocationRecord, RevocationError> {
        let now_secs = now_ms.div_euclid(1000);

        // A record that is already expired would be ignored by every store.
        let expires_at = i64::try_from(self.retention.as_secs())
            .ok()
            .and_then(|secs| now_secs.checked_add(secs))
            .filter(|&at| at > now_secs)
            .ok_or_else(|| {
                tracing::error!(
                    %principal,
                    retention = ?self.retention,
                    "forced sign-out retention does not yield a live record"
                );
                RevocationError::InvalidRecord(format!(
                    "retention of {}s cannot be applied",
                    self.retention.as_secs()
                ))
            })?;

        let record = RevocationRecord {
            principal: principal.to_string(),
            last_force_sign_out_ms: now_ms,
            expires_at,
        };

        // A failed write leaves the principal's old tokens valid; the caller has to know.
        if let Err(err) = self.store.upsert(record.clone()).await {
            tracing::error!(
                error = %err,
                %principal,
                backend = self.store.backend_name(),
                "failed to record forced sign-out"
            );
            return Err(err);
        }

        tracing::info!(%principal, at_ms = now_ms, "forced sign-out recorded");
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::auth::revocation::oracle::test_stores::FlakyStore;
    use crate::services::auth::revocation::{
        InMemoryRevocationStore, RevocationOracle, RevocationPolicy,
    };

    const THIRTY_DAYS: Duration = Duration::from_secs(2_592_000);

    #[tokio::test]
    async fn record_sets_timestamp_and_expiry() {
        let store = Arc::new(InMemoryRevocationStore::new());
        let recorder = ForcedSignOutRecorder::new(store.clone(), THIRTY_DAYS);

        let now_ms = chrono::Utc::now().timestamp_millis();
        let record = recorder.record_sign_out_at("alice", now_ms).await.unwrap();

        assert_eq!(record.last_force_sign_out_ms, now_ms);
        assert_eq!(record.expires_at, now_ms / 1000 + 2_592_000);
        assert_eq!(store.get("alice").await.unwrap(), Some(record));
    }

    #[tokio::test]
    async fn repeated_sign_out_keeps_one_record_with_later_timestamp() {
        let store = Arc::new(InMemoryRevocationStore::new());
        let recorder = ForcedSignOutRecorder::new(store.clone(), THIRTY_DAYS);

        let first = recorder.record_sign_out("alice").await.unwrap();
        let second = recorder.record_sign_out("alice").await.unwrap();

        assert!(second.last_force_sign_out_ms >= first.last_force_sign_out_ms);
        assert_eq!(store.len().await, 1);
        assert_eq!(store.get("alice").await.unwrap(), Some(second));
    }

    #[tokio::test]
    async fn recorded_sign_out_is_visible_to_oracle() {
        let store = Arc::new(InMemoryRevocationStore::new());
        let recorder = ForcedSignOutRecorder::new(store.clone(), THIRTY_DAYS);
        let oracle = RevocationOracle::new(store, RevocationPolicy::default());

        let now_ms = chrono::Utc::now().timestamp_millis();
        recorder.record_sign_out_at("alice", now_ms).await.unwrap();

        let issued_before = now_ms / 1000 - 60;
        let issued_after = now_ms / 1000 + 1;
        assert!(oracle.is_revoked("alice", issued_before).await.unwrap());
        assert!(!oracle.is_revoked("alice", issued_after).await.unwrap());
    }

    #[tokio::test]
    async fn unusable_retention_is_an_error_not_a_silent_miss() {
        for retention in [Duration::ZERO, Duration::from_secs(u64::MAX)] {
            let store = Arc::new(InMemoryRevocationStore::new());
            let recorder = ForcedSignOutRecorder::new(store.clone(), retention);
            let oracle = RevocationOracle::new(store.clone(), RevocationPolicy::default());

            assert!(matches!(
                recorder.record_sign_out("alice").await,
                Err(RevocationError::InvalidRecord(_))
            ));
            assert_eq!(store.len().await, 0);
            assert!(!oracle.is_revoked("alice", 1000).await.unwrap());
        }
    }

    #[tokio::test]
    async fn shortest_retention_yields_a_live_record() {
        let store = Arc::new(InMemoryRevocationStore::new());
        let recorder = ForcedSignOutRecorder::new(store, Duration::from_secs(1));

        let record = recorder.record_sign_out_at("alice", 1_500_999).await.unwrap();
        assert_eq!(record.expires_at, 1501);
        assert!(!record.is_expired(1500));
    }

    #[tokio::test]
    async fn storage_failure_is_surfaced() {
        let recorder = ForcedSignOutRecorder::new(Arc::new(FlakyStore::default()), THIRTY_DAYS);

        assert!(matches!(
            recorder.record_sign_out("alice").await,
            Err(RevocationError::Storage(_))
        ));
    }
}
