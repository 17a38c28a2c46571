use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A catalogued PDF source sheet
///
/// `remote_ref` and `file_url` are written once, after the blob store has
/// confirmed the upload. Only `download_count` changes afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Sheet {
    pub id: i32,
    pub title: String,
    /// Absent when the sheet was never categorised or its category was deleted
    pub category_id: Option<i32>,
    /// Public retrieval URL of the payload
    pub file_url: String,
    /// Blob store identifier, used to destroy the payload later
    pub remote_ref: String,
    pub download_count: i32,
    pub created_at: DateTime<Utc>,
    /// Joined from `categories` when listing
    #[sqlx(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_name: Option<String>,
}

/// Row to insert once the payload is safely stored remotely
#[derive(Debug, Clone)]
pub struct NewSheet {
    pub title: String,
    pub category_id: Option<i32>,
    pub file_url: String,
    pub remote_ref: String,
}

/// Result of the atomic increment-and-return on a sheet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct DownloadTicket {
    #[serde(rename = "fileUrl")]
    pub file_url: String,
    #[serde(rename = "downloadCount")]
    pub download_count: i32,
}

/// Columns captured by the delete-and-return statement
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct DeletedSheet {
    pub title: String,
    pub remote_ref: String,
}

/// Listing order
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    /// Most recently created first
    #[default]
    Newest,
    /// Most downloaded first, ties broken by recency
    Popular,
}

impl SortKey {
    /// Parse a client-supplied sort key; anything unrecognised means `Newest`
    pub fn parse_lenient(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some(s) if s.eq_ignore_ascii_case("popular") => SortKey::Popular,
            _ => SortKey::Newest,
        }
    }
}

/// Filter and ordering for a sheet listing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SheetFilter {
    pub category_id: Option<i32>,
    pub sort: SortKey,
}
