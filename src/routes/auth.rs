use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::constants::ERR_CREDENTIALS_REQUIRED;
use crate::error::{AppError, Result};
use crate::security::verify_password;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: String,
    pub token: String,
    pub username: String,
}

/// Operator login
///
/// POST /api/auth/login
///
/// Checks the credentials against `ADMIN_USERNAME` / `ADMIN_PASSWORD_HASH`
/// and returns a bearer token for the admin routes.
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    let (username, password) = match (payload.username, payload.password) {
        (Some(u), Some(p)) if !u.is_empty() && !p.is_empty() => (u, p),
        _ => return Err(AppError::InvalidInput(ERR_CREDENTIALS_REQUIRED.to_string())),
    };

    let (admin_username, admin_hash) = match (
        state.config.admin_username.as_deref(),
        state.config.admin_password_hash.as_deref(),
    ) {
        (Some(u), Some(h)) => (u, h),
        _ => {
            return Err(AppError::Misconfigured(
                "Admin credentials not configured".to_string(),
            ))
        }
    };

    if username != admin_username || !verify_password(&password, admin_hash)? {
        tracing::warn!("Failed login attempt for '{}'", username);
        return Err(AppError::InvalidCredentials);
    }

    let token = state.tokens.issue(&username)?;
    tracing::info!("Admin '{}' logged in", username);

    Ok(Json(LoginResponse {
        message: "Login successful".to_string(),
        token,
        username,
    }))
}
