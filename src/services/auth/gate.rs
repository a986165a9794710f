//! Authorization decision for every inbound request.
//!
//! Order per request (must be preserved):
//! 1. allowlisted path → anonymous context, no token is read
//! 2. decode the token                      → 401 on failure
//! 3. revocation check (forced sign-out)     → 401 when revoked or when the check fails
//! 4. group claim ∩ supported groups         → 403 when empty
//! 5. authenticated context with the intersection
use std::collections::HashSet;

use super::context::{AuthCtx, RequestContext};
use super::error::AuthError;
use super::groups::GroupSet;
use super::revocation::RevocationOracle;
use super::token::TokenDecoder;

#[derive(Debug)]
pub struct AccessGate {
    decoder: TokenDecoder,
    oracle: RevocationOracle,
    header_name: String,
    groups_claim_name: String,
    supported_groups: GroupSet,
    allowed_paths: HashSet<String>,
}

impl AccessGate {
    pub fn new(
        decoder: TokenDecoder,
        oracle: RevocationOracle,
        groups_claim_name: impl Into<String>,
        supported_groups: GroupSet,
    ) -> Self {
        Self {
            decoder,
            oracle,
            header_name: "Authorization".to_string(),
            groups_claim_name: groups_claim_name.into(),
            supported_groups,
            allowed_paths: HashSet::from(["/".to_string()]),
        }
    }

    pub fn with_header_name(mut self, header_name: impl Into<String>) -> Self {
        self.header_name = header_name.into();
        self
    }

    pub fn with_allowed_paths<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_paths = paths.into_iter().map(Into::into).collect();
        self
    }

    pub fn header_name(&self) -> &str {
        &self.header_name
    }

    pub fn is_allowlisted(&self, path: &str) -> bool {
        self.allowed_paths.contains(path)
    }

    /// Decide whether a request for `path` carrying `authorization` may proceed.
    pub async fn authorize(
        &self,
        path: &str,
        authorization: Option<&str>,
    ) -> Result<RequestContext, AuthError> {
        if self.is_allowlisted(path) {
            return Ok(RequestContext::anonymous());
        }

        let claims = self.decoder.decode(authorization)?;
        let principal = claims.principal().to_string();

        match self.oracle.is_revoked(&principal, claims.iat).await {
            Ok(false) => {}
            Ok(true) => return Err(AuthError::RevokedToken),
            Err(err) => return Err(AuthError::RevocationCheckFailed(err)),
        }

        let claimed = GroupSet::from_claim(claims.claim(&self.groups_claim_name));
        let groups = claimed.intersection(&self.supported_groups);
        if groups.is_empty() {
            return Err(AuthError::InsufficientGroupMembership);
        }

        tracing::debug!(%principal, groups = groups.len(), "request authorized");

        Ok(RequestContext::authenticated(AuthCtx {
            principal,
            claims,
            groups,
        }))
    }
}
