use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::config::JwtVerification;
use crate::services::auth::error::AuthError;

/// Claims carried by an identity-provider token.
///
/// `sub` and `iat` are required. Custom attributes (e.g. `custom:groups`) stay in `extra`
/// and are looked up by name.
#[derive(Debug, Clone, Deserialize)]
pub struct Claims {
    pub sub: String,
    // Issued at (seconds since epoch)
    pub iat: i64,

    #[serde(default)]
    pub exp: Option<i64>,
    #[serde(default, rename = "cognito:username")]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Claims {
    /// The principal a request acts as: the username claim if present, otherwise `sub`.
    pub fn principal(&self) -> &str {
        self.username
            .as_deref()
            .filter(|u| !u.trim().is_empty())
            .unwrap_or(&self.sub)
    }

    pub fn claim(&self, name: &str) -> Option<&Value> {
        self.extra.get(name)
    }
}

enum Mode {
    // Signature checked here against the configured public key.
    Verified {
        key: DecodingKey,
        validation: Validation,
    },
    // Signature already checked by the gateway in front of this service.
    Delegated,
}

/// Decodes the raw authorization header value into `Claims`.
pub struct TokenDecoder {
    mode: Mode,
}

impl std::fmt::Debug for TokenDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Do not print key material
        let mode = match &self.mode {
            Mode::Verified { .. } => "verified",
            Mode::Delegated => "delegated",
        };
        f.debug_struct("TokenDecoder").field("mode", &mode).finish()
    }
}

impl TokenDecoder {
    pub fn delegated() -> Self {
        Self {
            mode: Mode::Delegated,
        }
    }

    pub fn verified(key: DecodingKey, validation: Validation) -> Self {
        Self {
            mode: Mode::Verified { key, validation },
        }
    }

    pub fn from_settings(settings: &JwtVerification) -> Result<Self, String> {
        let pem = settings.public_key_pem.as_bytes();
        let key = match settings.algorithm {
            Algorithm::RS256
            | Algorithm::RS384
            | Algorithm::RS512
            | Algorithm::PS256
            | Algorithm::PS384
            | Algorithm::PS512 => DecodingKey::from_rsa_pem(pem),
            Algorithm::ES256 | Algorithm::ES384 => DecodingKey::from_ec_pem(pem),
            Algorithm::EdDSA => DecodingKey::from_ed_pem(pem),
            // HMAC needs a shared secret, not a public key.
            _ => return Err(format!("unsupported algorithm: {:?}", settings.algorithm)),
        }
        .map_err(|e| format!("invalid access token public key pem: {}", e))?;

        let mut validation = Validation::new(settings.algorithm);
        validation.leeway = settings.leeway_seconds;
        if let Some(issuer) = &settings.issuer {
            validation.set_issuer(&[issuer]);
        }
        match &settings.audience {
            Some(audience) => validation.set_audience(&[audience]),
            // ID tokens carry `aud` (the app client id); only check it when configured.
            None => validation.validate_aud = false,
        }

        Ok(Self::verified(key, validation))
    }

    pub fn is_verifying(&self) -> bool {
        matches!(self.mode, Mode::Verified { .. })
    }

    /// Decode `<scheme> <token>` or a bare `<token>` into claims.
    pub fn decode(&self, raw_header: Option<&str>) -> Result<Claims, AuthError> {
        let token = extract_token(raw_header.unwrap_or_default())?;

        let claims = match &self.mode {
            Mode::Verified { key, validation } => {
                jsonwebtoken::decode::<Claims>(token, key, validation)?.claims
            }
            Mode::Delegated => {
                jsonwebtoken::dangerous::insecure_decode::<Claims>(token)
                    .map_err(|_| AuthError::MalformedToken)?
                    .claims
            }
        };

        if claims.sub.trim().is_empty() || claims.principal().trim().is_empty() {
            return Err(AuthError::MalformedToken);
        }

        Ok(claims)
    }
}

fn extract_token(raw: &str) -> Result<&str, AuthError> {
    let mut parts = raw.split_whitespace();
    let token = match (parts.next(), parts.next(), parts.next()) {
        (Some(token), None, None) => token,
        (Some(_scheme), Some(token), None) => token,
        _ => return Err(AuthError::MalformedToken),
    };

    // A JWS compact token has exactly three segments.
    if token.split('.').count() != 3 {
        return Err(AuthError::MalformedToken);
    }

    Ok(token)
}
