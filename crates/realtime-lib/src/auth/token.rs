// ============================
// crates/realtime-lib/src/auth/token.rs
// ============================
//! Bearer token verification and issuing (HS256).

use crate::error::AppError;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Claims carried by a bearer credential.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    #[serde(rename = "userId")]
    pub user_id: String,
    /// Expiry as a unix timestamp.
    pub exp: i64,
}

/// Verifies signature and expiry of incoming bearer credentials.
pub struct TokenVerifier {
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(secret: &str) -> Self {
        Self {
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
        }
    }

    /// Verify a credential. Malformed, mis-signed, and expired tokens all
    /// collapse into `AuthenticationError("InvalidToken")`.
    pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|_| AppError::Authentication("InvalidToken".to_string()))
    }
}

/// Issues signed tokens; used by the demo binary and the test suite.
pub struct TokenIssuer {
    encoding: EncodingKey,
    ttl: Duration,
}

impl TokenIssuer {
    pub fn new(secret: &str, ttl_secs: u64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::seconds(ttl_secs as i64),
        }
    }

    pub fn issue(&self, user_id: &str) -> Result<String, AppError> {
        let claims = Claims {
            user_id: user_id.to_string(),
            exp: (Utc::now() + self.ttl).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AppError::Internal(format!("Failed to sign token: {e}")))
    }
}

/// Extract the bearer credential from a connection handshake: the auth
/// payload `token` field takes precedence, then an
/// `Authorization: Bearer <token>` header.
pub fn bearer_token<'a>(auth_field: Option<&'a str>, header: Option<&'a str>) -> Option<&'a str> {
    if let Some(token) = auth_field {
        if !token.is_empty() {
            return Some(token);
        }
    }
    header.and_then(|h| h.strip_prefix("Bearer "))
}
