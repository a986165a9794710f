use serde::{Deserialize, Serialize};

/// Optional body of `POST /forceSignOut`. Without `username` the caller signs themself out.
#[derive(Debug, Default, Deserialize)]
pub struct ForceSignOutRequest {
    pub username: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ForceSignOutResponse {
    pub username: String,
    pub signed_out_at_ms: i64,
}
