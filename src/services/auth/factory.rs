/// Factory: build the access gate and forced sign-out services from application `Config`.
use std::sync::Arc;

use crate::config::Config;
use crate::error::AppError;
use crate::services::auth::revocation::{
    ForcedSignOutRecorder, InMemoryRevocationStore, RevocationOracle, RevocationPolicy,
    RevocationStore, ValkeyRevocationStore,
};
use crate::services::auth::token::TokenDecoder;
use crate::services::auth::{AccessGate, GroupSet};

pub async fn build_revocation_store(config: &Config) -> Result<Arc<dyn RevocationStore>, AppError> {
    match &config.valkey_url {
        Some(url) => {
            let store = ValkeyRevocationStore::new(url).await.map_err(|e| {
                tracing::error!(error = %e, "failed to connect revocation store");
                AppError::Internal
            })?;
            Ok(Arc::new(store))
        }
        None => {
            tracing::warn!("VALKEY_URL not set; forced sign-outs are kept in process memory");
            Ok(Arc::new(InMemoryRevocationStore::new()))
        }
    }
}

pub fn build_access_gate(
    config: &Config,
    store: Arc<dyn RevocationStore>,
) -> Result<Arc<AccessGate>, AppError> {
    let auth = &config.auth;

    let decoder = match &auth.verification {
        Some(settings) => TokenDecoder::from_settings(settings).map_err(|e| {
            tracing::error!(error = %e, "failed to build token verifier");
            AppError::Internal
        })?,
        None => {
            tracing::warn!("ACCESS_JWT_PUBLIC_KEY_PEM not set; token signatures are trusted to the gateway");
            TokenDecoder::delegated()
        }
    };

    let policy = RevocationPolicy {
        lookup_timeout: config.revocation.lookup_timeout,
        max_retries: config.revocation.lookup_retries,
        retry_backoff: config.revocation.retry_backoff,
    };

    tracing::info!(
        verifying = decoder.is_verifying(),
        header = %auth.header_name,
        groups_claim = %auth.groups_claim_name,
        "access gate configured"
    );

    let supported = GroupSet::new([auth.admins_group_name.clone(), auth.users_group_name.clone()]);

    let gate = AccessGate::new(
        decoder,
        RevocationOracle::new(store, policy),
        auth.groups_claim_name.clone(),
        supported,
    )
    .with_header_name(auth.header_name.clone())
    .with_allowed_paths(auth.allowed_paths.iter().cloned());

    Ok(Arc::new(gate))
}

pub fn build_sign_out_recorder(
    config: &Config,
    store: Arc<dyn RevocationStore>,
) -> Arc<ForcedSignOutRecorder> {
    Arc::new(ForcedSignOutRecorder::new(store, config.revocation.retention))
}
