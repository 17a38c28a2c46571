use async_trait::async_trait;
use sqlx::PgPool;

use super::{CategoryRepository, RepoError, RepoResult, SheetRepository};
use crate::models::{
    Category, CategorySummary, DeletedSheet, DownloadTicket, NewSheet, Sheet, SheetFilter, SortKey,
};

const SHEET_COLUMNS: &str = "s.id, s.title, s.category_id, s.file_url, s.remote_ref, \
     s.download_count, s.created_at, c.name AS category_name";

/// PostgreSQL-backed sheet and category repository
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Translate constraint violations into repository errors
fn classify(err: sqlx::Error) -> RepoError {
    if let Some(db_err) = err.as_database_error() {
        if db_err.is_unique_violation() {
            return RepoError::Conflict(db_err.message().to_string());
        }
        if db_err.is_foreign_key_violation() {
            return RepoError::MissingReference(db_err.message().to_string());
        }
    }
    RepoError::Database(err)
}

fn order_clause(sort: SortKey) -> &'static str {
    match sort {
        SortKey::Newest => "ORDER BY s.created_at DESC, s.id DESC",
        SortKey::Popular => "ORDER BY s.download_count DESC, s.created_at DESC, s.id DESC",
    }
}

#[async_trait]
impl SheetRepository for PgStore {
    async fn insert(&self, sheet: NewSheet) -> RepoResult<Sheet> {
        sqlx::query_as::<_, Sheet>(
            r#"
            INSERT INTO sheets (title, category_id, file_url, remote_ref)
            VALUES ($1, $2, $3, $4)
            RETURNING id, title, category_id, file_url, remote_ref, download_count, created_at
            "#,
        )
        .bind(&sheet.title)
        .bind(sheet.category_id)
        .bind(&sheet.file_url)
        .bind(&sheet.remote_ref)
        .fetch_one(&self.pool)
        .await
        .map_err(classify)
    }

    async fn list(&self, filter: SheetFilter) -> RepoResult<Vec<Sheet>> {
        let query = format!(
            "SELECT {} FROM sheets s LEFT JOIN categories c ON s.category_id = c.id \
             WHERE ($1::INT IS NULL OR s.category_id = $1) {}",
            SHEET_COLUMNS,
            order_clause(filter.sort)
        );
        sqlx::query_as::<_, Sheet>(&query)
            .bind(filter.category_id)
            .fetch_all(&self.pool)
            .await
            .map_err(classify)
    }

    async fn increment_download(&self, id: i32) -> RepoResult<Option<DownloadTicket>> {
        sqlx::query_as::<_, DownloadTicket>(
            r#"
            UPDATE sheets
            SET download_count = download_count + 1
            WHERE id = $1
            RETURNING file_url, download_count
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(classify)
    }

    async fn delete_returning(&self, id: i32) -> RepoResult<Option<DeletedSheet>> {
        sqlx::query_as::<_, DeletedSheet>(
            "DELETE FROM sheets WHERE id = $1 RETURNING title, remote_ref",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(classify)
    }

    async fn ping(&self) -> RepoResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(classify)?;
        Ok(())
    }
}

#[async_trait]
impl CategoryRepository for PgStore {
    async fn list_with_counts(&self) -> RepoResult<Vec<CategorySummary>> {
        sqlx::query_as::<_, CategorySummary>(
            r#"
            SELECT c.id, c.name, c.created_at, COUNT(s.id) AS sheet_count
            FROM categories c
            LEFT JOIN sheets s ON c.id = s.category_id
            GROUP BY c.id, c.name, c.created_at
            ORDER BY c.name
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(classify)
    }

    async fn create(&self, name: &str) -> RepoResult<Category> {
        sqlx::query_as::<_, Category>(
            "INSERT INTO categories (name) VALUES ($1) RETURNING id, name, created_at",
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await
        .map_err(classify)
    }

    async fn delete(&self, id: i32) -> RepoResult<Option<Category>> {
        // ON DELETE SET NULL on sheets.category_id detaches dependent sheets
        sqlx::query_as::<_, Category>(
            "DELETE FROM categories WHERE id = $1 RETURNING id, name, created_at",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(classify)
    }
}
