use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::constants::ERR_CATEGORY_NAME_REQUIRED;
use crate::db::RepoError;
use crate::error::{AppError, Result};
use crate::models::{Category, CategorySummary};
use crate::security::AdminUser;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateCategoryRequest {
    pub name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CategoryResponse {
    pub message: String,
    pub category: Category,
}

/// List categories with sheet counts
///
/// GET /api/categories
pub async fn list_categories(State(state): State<AppState>) -> Result<Json<Vec<CategorySummary>>> {
    let categories = state.categories.list_with_counts().await?;
    Ok(Json(categories))
}

/// Create a category (admin only)
///
/// POST /api/categories
pub async fn create_category(
    _admin: AdminUser,
    State(state): State<AppState>,
    Json(payload): Json<CreateCategoryRequest>,
) -> Result<(StatusCode, Json<CategoryResponse>)> {
    let name = payload
        .name
        .as_deref()
        .and_then(Category::normalize_name)
        .ok_or_else(|| AppError::InvalidInput(ERR_CATEGORY_NAME_REQUIRED.to_string()))?;

    let category = state.categories.create(&name).await.map_err(|e| match e {
        RepoError::Conflict(_) => AppError::CategoryExists,
        other => AppError::Repository(other),
    })?;

    tracing::info!("Category created: {} ({})", category.name, category.id);

    Ok((
        StatusCode::CREATED,
        Json(CategoryResponse {
            message: "Category created successfully".to_string(),
            category,
        }),
    ))
}

/// Delete a category (admin only)
///
/// DELETE /api/categories/:id
///
/// Sheets in the category are kept; their category is cleared.
pub async fn delete_category(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<CategoryResponse>> {
    let category = state
        .categories
        .delete(id)
        .await?
        .ok_or(AppError::CategoryNotFound)?;

    tracing::info!("Category deleted: {} ({})", category.name, category.id);

    Ok(Json(CategoryResponse {
        message: "Category deleted successfully".to_string(),
        category,
    }))
}
