//! Sheet Catalog Server Library
//!
//! Catalog of PDF source sheets stored in an external blob store, with
//! metadata and download counters kept in PostgreSQL.

pub mod config;
pub mod constants;
pub mod db;
pub mod error;
pub mod lifecycle;
pub mod models;
pub mod routes;
pub mod security;
pub mod storage;

pub use config::Config;
pub use error::{AppError, Result};
pub use lifecycle::{SheetError, SheetManager, Timeouts};

use std::sync::Arc;

use db::CategoryRepository;
use security::TokenKeys;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub sheets: SheetManager,
    pub categories: Arc<dyn CategoryRepository>,
    pub tokens: TokenKeys,
    pub config: Config,
}

impl AppState {
    /// Create a new AppState from the lifecycle manager, category store and configuration
    pub fn new(
        sheets: SheetManager,
        categories: Arc<dyn CategoryRepository>,
        config: Config,
    ) -> Self {
        let tokens = TokenKeys::new(&config.jwt_secret, config.jwt_expiry_secs);
        Self {
            sheets,
            categories,
            tokens,
            config,
        }
    }
}
