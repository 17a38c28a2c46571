use axum::{
    extract::{multipart::Field, Multipart, Path, Query, State},
    http::StatusCode,
    Json,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::error::{AppError, Result};
use crate::lifecycle::SheetUpload;
use crate::models::{DownloadTicket, Sheet, SheetFilter, SortKey};
use crate::security::AdminUser;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ListSheetsParams {
    pub category: Option<String>,
    pub sort: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreateSheetResponse {
    pub message: String,
    pub sheet: Sheet,
}

#[derive(Debug, Serialize)]
pub struct DeleteSheetResponse {
    pub message: String,
    pub title: String,
}

/// Parse an optional numeric category id; blank means "no category"
fn parse_category_id(raw: Option<&str>) -> Result<Option<i32>> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => s
            .parse::<i32>()
            .map(Some)
            .map_err(|_| AppError::InvalidInput(ERR_INVALID_CATEGORY_ID.to_string())),
    }
}

fn multipart_error(err: axum::extract::multipart::MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::FileTooLarge
    } else {
        AppError::InvalidInput(format!("Invalid multipart body: {}", err))
    }
}

struct FilePart {
    bytes: Bytes,
    content_type: Option<String>,
    file_name: Option<String>,
}

async fn read_file(field: Field<'_>) -> Result<FilePart> {
    let content_type = field.content_type().map(str::to_string);
    let file_name = field.file_name().map(str::to_string);
    let bytes = field.bytes().await.map_err(multipart_error)?;

    Ok(FilePart {
        bytes,
        content_type,
        file_name,
    })
}

/// List sheets
///
/// GET /api/sheets?category=<id>&sort=<newest|popular>
pub async fn list_sheets(
    State(state): State<AppState>,
    Query(params): Query<ListSheetsParams>,
) -> Result<Json<Vec<Sheet>>> {
    let filter = SheetFilter {
        category_id: parse_category_id(params.category.as_deref())?,
        sort: SortKey::parse_lenient(params.sort.as_deref()),
    };

    let sheets = state.sheets.list(filter).await?;
    Ok(Json(sheets))
}

/// Count a download and hand out the file URL
///
/// GET /api/sheets/:id/download
pub async fn download_sheet(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<DownloadTicket>> {
    let ticket = state.sheets.download(id).await?;
    Ok(Json(ticket))
}

/// Create a sheet from a multipart upload (admin only)
///
/// POST /api/sheets with fields `title`, optional `category_id` and `file`.
///
/// # Validation
/// - `file` must be `application/pdf`, at most 10MB
/// - `title` must be present
///
/// The file is held in memory and piped to the blob store; it never touches
/// local disk.
pub async fn create_sheet(
    admin: AdminUser,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<CreateSheetResponse>)> {
    let mut title: Option<String> = None;
    let mut category_raw: Option<String> = None;
    let mut file: Option<FilePart> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("title") => title = Some(field.text().await.map_err(multipart_error)?),
            Some("category_id") => {
                category_raw = Some(field.text().await.map_err(multipart_error)?)
            }
            Some("file") => file = Some(read_file(field).await?),
            other => tracing::debug!("Ignoring unexpected multipart field {:?}", other),
        }
    }

    let (title, file) = match (title, file) {
        (Some(title), Some(file)) if !title.trim().is_empty() => (title, file),
        _ => return Err(AppError::InvalidInput(ERR_MISSING_FIELDS.to_string())),
    };
    let category_id = parse_category_id(category_raw.as_deref())?;

    if file.content_type.as_deref() != Some(PDF_CONTENT_TYPE) {
        tracing::warn!(
            "Rejected upload with content type {:?}",
            file.content_type
        );
        return Err(AppError::InvalidInput(ERR_ONLY_PDF.to_string()));
    }

    if file.bytes.len() > MAX_SHEET_SIZE_BYTES {
        tracing::warn!(
            "Upload too large: {} bytes (max: {})",
            file.bytes.len(),
            MAX_SHEET_SIZE_BYTES
        );
        return Err(AppError::FileTooLarge);
    }

    tracing::info!(
        "Sheet upload by {}: '{}' ({} bytes)",
        admin.username,
        title,
        file.bytes.len()
    );

    let sheet = state
        .sheets
        .create(SheetUpload {
            title,
            category_id,
            payload: file.bytes,
            content_type: PDF_CONTENT_TYPE.to_string(),
            file_name: file.file_name,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateSheetResponse {
            message: "Sheet created successfully".to_string(),
            sheet,
        }),
    ))
}

/// Delete a sheet and its stored file (admin only)
///
/// DELETE /api/sheets/:id
///
/// Responds with success once the catalog entry is gone, even if the stored
/// file could not be removed.
pub async fn delete_sheet(
    admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<DeleteSheetResponse>> {
    let receipt = state.sheets.delete(id).await?;

    tracing::info!("Sheet {} deleted by {}", id, admin.username);

    Ok(Json(DeleteSheetResponse {
        message: "Sheet deleted successfully".to_string(),
        title: receipt.title,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_category_id() {
        assert_eq!(parse_category_id(None).unwrap(), None);
        assert_eq!(parse_category_id(Some("")).unwrap(), None);
        assert_eq!(parse_category_id(Some(" 3 ")).unwrap(), Some(3));
        assert!(matches!(
            parse_category_id(Some("three")),
            Err(AppError::InvalidInput(_))
        ));
    }
}
