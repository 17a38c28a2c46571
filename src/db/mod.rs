//! Relational persistence for sheets and categories
//!
//! Every mutating operation maps onto a single SQL statement so that the
//! database provides row-level atomicity (`UPDATE .. RETURNING`,
//! `DELETE .. RETURNING`). The in-memory store mirrors those semantics.

pub mod memory;
pub mod pool;
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{
    Category, CategorySummary, DeletedSheet, DownloadTicket, NewSheet, Sheet, SheetFilter,
};

pub use memory::MemorySheetStore;
pub use pool::create_pool;
pub use postgres::PgStore;

/// Repository failures
#[derive(Error, Debug)]
pub enum RepoError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Duplicate value: {0}")]
    Conflict(String),

    #[error("Referenced row does not exist: {0}")]
    MissingReference(String),

    #[error("Database query timed out")]
    Timeout,

    #[error("Repository unavailable: {0}")]
    Unavailable(String),
}

pub type RepoResult<T> = std::result::Result<T, RepoError>;

/// Persistence for sheet rows
#[async_trait]
pub trait SheetRepository: Send + Sync {
    /// Insert a row for an already-uploaded payload.
    async fn insert(&self, sheet: NewSheet) -> RepoResult<Sheet>;

    async fn list(&self, filter: SheetFilter) -> RepoResult<Vec<Sheet>>;

    /// Increment the download counter and return the post-increment values
    /// in one atomic step. `None` when no row has this id.
    async fn increment_download(&self, id: i32) -> RepoResult<Option<DownloadTicket>>;

    /// Delete the row and return the columns needed for blob cleanup.
    async fn delete_returning(&self, id: i32) -> RepoResult<Option<DeletedSheet>>;

    /// Connectivity check for health reporting
    async fn ping(&self) -> RepoResult<()>;
}

/// Persistence for categories
///
/// Deleting a category clears `category_id` on its sheets instead of
/// removing them.
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// All categories ordered by name, with their sheet counts
    async fn list_with_counts(&self) -> RepoResult<Vec<CategorySummary>>;

    async fn create(&self, name: &str) -> RepoResult<Category>;

    async fn delete(&self, id: i32) -> RepoResult<Option<Category>>;
}
