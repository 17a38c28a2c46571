pub mod auth;
pub mod categories;
pub mod health;
pub mod sheets;

use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub use auth::login;
pub use categories::{create_category, delete_category, list_categories};
pub use health::{health_check, not_found, root};
pub use sheets::{create_sheet, delete_sheet, download_sheet, list_sheets};

use crate::constants::{MAX_SHEET_SIZE_BYTES, MULTIPART_OVERHEAD_BYTES};
use crate::AppState;

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers(Any)
}

/// Build the full API router
pub fn router(state: AppState) -> Router {
    let upload_limit = DefaultBodyLimit::max(MAX_SHEET_SIZE_BYTES + MULTIPART_OVERHEAD_BYTES);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/api/auth/login", post(login))
        .route(
            "/api/sheets",
            get(list_sheets).post(create_sheet).layer(upload_limit),
        )
        .route("/api/sheets/:id/download", get(download_sheet))
        .route("/api/sheets/:id", delete(delete_sheet))
        .route(
            "/api/categories",
            get(list_categories).post(create_category),
        )
        .route("/api/categories/:id", delete(delete_category))
        .fallback(not_found)
        .layer(cors_layer(&state.config.allowed_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
