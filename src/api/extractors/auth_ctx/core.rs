use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::AppError;
use crate::services::auth::{AuthCtx, RequestContext};

/// Handler で AuthCtx を受け取るための extractor
/// middleware が RequestContext を request.extensions() に insert 済みである前提
/// 匿名 (allowlist の path) やミドルウェア未設定の場合は 401 を返す
pub struct AuthCtxExtractor(pub AuthCtx);

impl<S> FromRequestParts<S> for AuthCtxExtractor
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<RequestContext>()
            .and_then(|ctx| ctx.identity().cloned())
            .map(AuthCtxExtractor)
            .ok_or(AppError::Unauthorized)
    }
}
