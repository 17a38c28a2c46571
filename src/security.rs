use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::AppState;

// =============================================================================
// Admin Tokens
// =============================================================================

/// Payload of an operator token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Operator username
    pub sub: String,
    /// Issued at (Unix timestamp)
    pub iat: u64,
    /// Expiration time (Unix timestamp)
    pub exp: u64,
}

/// HS256 signer/verifier for operator tokens
#[derive(Clone)]
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    expiry_secs: u64,
}

impl TokenKeys {
    pub fn new(secret: &str, expiry_secs: u64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            expiry_secs,
        }
    }

    /// Issue a signed token for `username`
    pub fn issue(&self, username: &str) -> Result<String, AppError> {
        let now = chrono::Utc::now().timestamp().max(0) as u64;
        let claims = Claims {
            sub: username.to_string(),
            iat: now,
            exp: now + self.expiry_secs,
        };

        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| AppError::Misconfigured(format!("Failed to sign token: {}", e)))
    }

    /// Verify signature and expiry
    pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
        decode::<Claims>(token, &self.decoding, &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::warn!("Rejected admin token: {}", e);
                AppError::InvalidToken
            })
    }
}

/// Extract the token from a `Bearer <token>` authorization header
pub fn extract_bearer(header: Option<&str>) -> Option<&str> {
    let token = header?.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then_some(token)
}

/// Verified operator; add as a handler argument to protect a route
#[derive(Debug, Clone)]
pub struct AdminUser {
    pub username: String,
}

#[async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, AppError> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok());

        let token = extract_bearer(header).ok_or(AppError::MissingToken)?;
        let claims = state.tokens.verify(token)?;

        Ok(AdminUser {
            username: claims.sub,
        })
    }
}

// =============================================================================
// Password Verification
// =============================================================================

/// Hash a password into an Argon2id PHC string
pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Misconfigured(format!("Failed to hash password: {}", e)))
}

/// Check `password` against the configured admin hash
///
/// Accepts bcrypt (`$2a$`, `$2b$`, `$2y$`) and Argon2 PHC strings. A
/// malformed hash is a configuration problem, not a wrong password.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
    if is_bcrypt_hash(hash) {
        return bcrypt::verify(password, hash)
            .map_err(|e| AppError::Misconfigured(format!("Invalid bcrypt hash: {}", e)));
    }

    let parsed = PasswordHash::new(hash)
        .map_err(|e| AppError::Misconfigured(format!("Invalid password hash format: {}", e)))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

fn is_bcrypt_hash(hash: &str) -> bool {
    ["$2a$", "$2b$", "$2y$"]
        .iter()
        .any(|prefix| hash.starts_with(prefix))
}
