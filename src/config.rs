/*
 * Responsibility
 * - 環境変数や設定の読み込み (PORT, CORS 許可、Auth/Revocation 設定など)
 * - 設定値のバリデーション (不足なら起動失敗)
 */
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use jsonwebtoken::Algorithm;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    pub fn from_env() -> Self {
        Self::parse(&std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()))
    }

    fn parse(raw: &str) -> Self {
        match raw.to_ascii_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing configuration: {0}")]
    Missing(&'static str),
    #[error("invalid configuration: {0}")]
    Invalid(&'static str),
}

/// Signature verification settings for access tokens.
///
/// Absent means verification is delegated to the upstream gateway.
#[derive(Clone)]
pub struct JwtVerification {
    pub public_key_pem: String,
    pub algorithm: Algorithm,
    pub issuer: Option<String>,
    pub audience: Option<String>,
    pub leeway_seconds: u64,
}

impl std::fmt::Debug for JwtVerification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Do not print key material
        f.debug_struct("JwtVerification")
            .field("algorithm", &self.algorithm)
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("leeway_seconds", &self.leeway_seconds)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct AuthSettings {
    pub header_name: String,
    pub groups_claim_name: String,
    pub admins_group_name: String,
    pub users_group_name: String,
    pub allowed_paths: Vec<String>,
    pub verification: Option<JwtVerification>,
}

#[derive(Debug, Clone)]
pub struct RevocationSettings {
    pub retention: Duration,
    pub lookup_timeout: Duration,
    pub lookup_retries: u32,
    pub retry_backoff: Duration,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,
    pub cors_allowed_origins: Vec<String>,
    pub request_timeout: Duration,

    pub database_url: Option<String>,
    pub valkey_url: Option<String>,

    pub auth: AuthSettings,
    pub revocation: RevocationSettings,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let port: u16 = parsed("PORT", 3000);

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::from_env();

        let cors_allowed_origins = list("CORS_ALLOWED_ORIGINS", "");

        let request_timeout = Duration::from_secs(parsed("REQUEST_TIMEOUT_SECONDS", 30));

        let database_url = optional("DATABASE_URL");
        let valkey_url = optional("VALKEY_URL");

        let verification = match optional("ACCESS_JWT_PUBLIC_KEY_PEM") {
            Some(pem) => {
                let algorithm = std::env::var("ACCESS_JWT_ALGORITHM")
                    .unwrap_or_else(|_| "RS256".to_string());
                let algorithm = Algorithm::from_str(algorithm.trim())
                    .map_err(|_| ConfigError::Invalid("ACCESS_JWT_ALGORITHM"))?;

                Some(JwtVerification {
                    public_key_pem: pem.replace("\\n", "\n"),
                    algorithm,
                    issuer: optional("AUTH_ISSUER"),
                    audience: optional("AUTH_AUDIENCE"),
                    leeway_seconds: parsed("ACCESS_TOKEN_LEEWAY_SECONDS", 60),
                })
            }
            None => None,
        };

        // Unverified decoding in production is only allowed when a gateway in front of
        // this service has already checked the signature.
        if verification.is_none() && app_env.is_production() && !parsed("AUTH_TRUST_GATEWAY", false)
        {
            return Err(ConfigError::Missing("ACCESS_JWT_PUBLIC_KEY_PEM"));
        }

        let auth = AuthSettings {
            header_name: string("AUTHORIZATION_HEADER_NAME", "Authorization"),
            groups_claim_name: string("GROUPS_CLAIM_NAME", "custom:groups"),
            admins_group_name: string("ADMINS_GROUP_NAME", "pet-app-admins"),
            users_group_name: string("USERS_GROUP_NAME", "pet-app-users"),
            allowed_paths: list("AUTH_ALLOWED_PATHS", "/"),
            verification,
        };

        if auth.admins_group_name.is_empty() {
            return Err(ConfigError::Invalid("ADMINS_GROUP_NAME"));
        }
        if auth.users_group_name.is_empty() {
            return Err(ConfigError::Invalid("USERS_GROUP_NAME"));
        }

        let revocation = RevocationSettings {
            retention: sign_out_retention(parsed("FORCED_SIGNOUT_TTL_SECONDS", 2_592_000))?, // 30 days
            lookup_timeout: Duration::from_millis(parsed("REVOCATION_LOOKUP_TIMEOUT_MS", 2000)),
            lookup_retries: parsed("REVOCATION_LOOKUP_RETRIES", 0),
            retry_backoff: Duration::from_millis(parsed("REVOCATION_RETRY_BACKOFF_MS", 50)),
        };

        Ok(Self {
            addr,
            app_env,
            cors_allowed_origins,
            request_timeout,
            database_url,
            valkey_url,
            auth,
            revocation,
        })
    }
}

fn optional(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn string(key: &str, default: &str) -> String {
    optional(key).unwrap_or_else(|| default.to_string())
}

fn parsed<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

fn list(key: &str, default: &str) -> Vec<String> {
    split_list(&std::env::var(key).unwrap_or_else(|_| default.to_string()))
}

// 0 would write records that are already expired; the upper bound keeps
// `now + retention` representable as epoch seconds.
fn sign_out_retention(secs: u64) -> Result<Duration, ConfigError> {
    if secs == 0 || i64::try_from(secs).is_err() {
        return Err(ConfigError::Invalid("FORCED_SIGNOUT_TTL_SECONDS"));
    }
    Ok(Duration::from_secs(secs))
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
