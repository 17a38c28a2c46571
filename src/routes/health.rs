use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};

use crate::constants::MSG_ROUTE_NOT_FOUND;
use crate::AppState;

/// Health check endpoint
///
/// Returns the health status of the server and database connection.
/// Used by the hosting platform to detect sleeping instances.
pub async fn health_check(State(state): State<AppState>) -> Json<Value> {
    let db_status = match state.sheets.ping().await {
        Ok(()) => "connected",
        Err(e) => {
            tracing::error!("Database health check failed: {:?}", e);
            "disconnected"
        }
    };

    Json(json!({
        "status": if db_status == "connected" { "healthy" } else { "unhealthy" },
        "database": db_status,
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

/// Service index
pub async fn root() -> Json<Value> {
    Json(json!({
        "message": "Sheet Catalog API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "health": "/health",
            "sheets": "/api/sheets",
            "categories": "/api/categories",
            "auth": "/api/auth/login"
        }
    }))
}

/// JSON 404 for unknown routes
pub async fn not_found(uri: axum::http::Uri) -> (StatusCode, Json<Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": "Not found",
            "message": MSG_ROUTE_NOT_FOUND,
            "path": uri.path(),
        })),
    )
}
