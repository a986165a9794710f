/*
 * Responsibility
 * - POST /forceSignOut
 * - 呼び出し元 (または admins が指定した username) の強制サインアウトを記録する
 * - 記録以前に発行された token は access gate で 401 になる
 */
use axum::{Json, body::Bytes, extract::State};

use crate::{
    api::{
        dto::sign_out::{ForceSignOutRequest, ForceSignOutResponse},
        extractors::auth_ctx::AuthCtxExtractor,
    },
    error::AppError,
    state::AppState,
};

pub async fn force_sign_out(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    body: Bytes,
) -> Result<Json<ForceSignOutResponse>, AppError> {
    // The body is optional.
    let req = if body.iter().all(u8::is_ascii_whitespace) {
        ForceSignOutRequest::default()
    } else {
        serde_json::from_slice::<ForceSignOutRequest>(&body)
            .map_err(|_| AppError::bad_request("INVALID_BODY", "body must be a JSON object"))?
    };

    let target = match req.username.as_deref().map(str::trim) {
        None | Some("") => ctx.principal.clone(),
        Some(username) => username.to_string(),
    };

    if target != ctx.principal && !ctx.in_group(&state.groups.admins) {
        tracing::warn!(caller = %ctx.principal, %target, "forced sign-out of another user denied");
        return Err(AppError::Forbidden);
    }

    let record = state.sign_out.record_sign_out(&target).await?;

    Ok(Json(ForceSignOutResponse {
        username: record.principal,
        signed_out_at_ms: record.last_force_sign_out_ms,
    }))
}
