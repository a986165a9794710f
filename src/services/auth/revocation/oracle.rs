use std::sync::Arc;
use std::time::Duration;

use super::store::{RevocationError, RevocationRecord, RevocationStore};

/// Bounds on the revocation lookup performed for every authenticated request.
#[derive(Debug, Clone)]
pub struct RevocationPolicy {
    pub lookup_timeout: Duration,
    // Extra attempts after the first failure; 0 = no retry.
    pub max_retries: u32,
    // Doubles after each failed attempt.
    pub retry_backoff: Duration,
}

impl Default for RevocationPolicy {
    fn default() -> Self {
        Self {
            lookup_timeout: Duration::from_secs(2),
            max_retries: 0,
            retry_backoff: Duration::from_millis(50),
        }
    }
}

/// Answers "has this principal been forcibly signed out since the token was issued?"
#[derive(Clone)]
pub struct RevocationOracle {
    store: Arc<dyn RevocationStore>,
    policy: RevocationPolicy,
}

impl std::fmt::Debug for RevocationOracle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RevocationOracle")
            .field("backend", &self.store.backend_name())
            .field("policy", &self.policy)
            .finish()
    }
}

impl RevocationOracle {
    pub fn new(store: Arc<dyn RevocationStore>, policy: RevocationPolicy) -> Self {
        Self { store, policy }
    }

    /// `Ok(true)` when the token predates the principal's last forced sign-out.
    ///
    /// Lookup failures are returned as `Err`; callers must deny the request.
    pub async fn is_revoked(
        &self,
        principal: &str,
        issued_at_secs: i64,
    ) -> Result<bool, RevocationError> {
        let revoked = self
            .lookup(principal)
            .await?
            .is_some_and(|record| record.revokes(issued_at_secs));

        if revoked {
            tracing::warn!(%principal, issued_at_secs, "token issued before a forced sign-out");
        }

        Ok(revoked)
    }

    async fn lookup(&self, principal: &str) -> Result<Option<RevocationRecord>, RevocationError> {
        let mut backoff = self.policy.retry_backoff;
        let mut attempt = 0;

        loop {
            let result =
                match tokio::time::timeout(self.policy.lookup_timeout, self.store.get(principal))
                    .await
                {
                    Ok(result) => result,
                    Err(_) => Err(RevocationError::Timeout),
                };

            match result {
                Ok(record) => return Ok(record),
                Err(err) if attempt < self.policy.max_retries => {
                    attempt += 1;
                    tracing::debug!(error = %err, attempt, "retrying revocation lookup");
                    tokio::time::sleep(backoff).await;
                    backoff = backoff.saturating_mul(2);
                }
                Err(err) => {
                    tracing::error!(
                        error = %err,
                        backend = self.store.backend_name(),
                        attempts = attempt + 1,
                        "revocation lookup failed"
                    );
                    return Err(err);
                }
            }
        }
    }
}
