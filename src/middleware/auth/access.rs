//! Authorization decision middleware: header → AccessGate → RequestContext in extensions.
//!
//! Rejections are logged with their internal cause and answered with a bare 401/403.

use axum::{
    Router,
    body::Body,
    extract::State,
    http::Request,
    middleware::{self, Next},
    response::Response,
};

use crate::error::AppError;
use crate::state::AppState;

/// Put every route of `router` behind the access gate.
///
/// Allowlisted paths (e.g. `/`) pass through with an anonymous context.
pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    router.layer(middleware::from_fn_with_state(state, access_middleware))
}

async fn access_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let gate = state.access.clone();

    // Non UTF-8 header values are treated like a missing header.
    let authorization = req
        .headers()
        .get(gate.header_name())
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);

    let path = req.uri().path().to_owned();

    let ctx = match gate.authorize(&path, authorization.as_deref()).await {
        Ok(ctx) => ctx,
        Err(err) => {
            tracing::warn!(
                error = %err,
                method = %req.method(),
                %path,
                "request rejected by access gate"
            );
            return Err(err.into());
        }
    };

    // middleware → extractor への受け渡し
    req.extensions_mut().insert(ctx);

    Ok(next.run(req).await)
}
