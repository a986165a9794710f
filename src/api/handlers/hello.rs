use axum::Json;
use serde::Serialize;
use serde_json::Value;

use crate::api::extractors::auth_ctx::AuthCtxExtractor;

const MEMBER_STATUS_CLAIM: &str = "custom:member_status";

#[derive(Debug, Serialize)]
pub struct HelloResponse {
    pub message: &'static str,
    pub member_status: Value,
}

/// GET /hello: greets the caller and echoes their membership attribute (null if unset).
pub async fn hello(AuthCtxExtractor(ctx): AuthCtxExtractor) -> Json<HelloResponse> {
    let member_status = ctx
        .claims
        .claim(MEMBER_STATUS_CLAIM)
        .cloned()
        .unwrap_or(Value::Null);

    Json(HelloResponse {
        message: "Hello API!",
        member_status,
    })
}
