//! Authentication / authorization failures produced by the access gate.
//!
//! Every variant collapses to 401 or 403 at the HTTP boundary. The internal cause is
//! logged by the middleware and never echoed to the caller.
use axum::http::StatusCode;
use thiserror::Error;

use crate::services::auth::revocation::RevocationError;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("authorization header missing or token malformed")]
    MalformedToken,

    #[error("token signature, issuer or audience rejected")]
    InvalidSignature,

    #[error("token expired")]
    ExpiredToken,

    #[error("principal is not a member of any supported group")]
    InsufficientGroupMembership,

    #[error("token issued before the principal's last forced sign-out")]
    RevokedToken,

    #[error("revocation check failed: {0}")]
    RevocationCheckFailed(#[source] RevocationError),
}

impl AuthError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::InsufficientGroupMembership => StatusCode::FORBIDDEN,
            AuthError::MalformedToken
            | AuthError::InvalidSignature
            | AuthError::ExpiredToken
            | AuthError::RevokedToken
            | AuthError::RevocationCheckFailed(_) => StatusCode::UNAUTHORIZED,
        }
    }
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match e.kind() {
            ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
            ErrorKind::InvalidSignature
            | ErrorKind::InvalidIssuer
            | ErrorKind::InvalidAudience
            | ErrorKind::ImmatureSignature
            | ErrorKind::InvalidAlgorithm => AuthError::InvalidSignature,
            _ => AuthError::MalformedToken,
        }
    }
}
