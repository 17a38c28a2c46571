//! Sheet lifecycle manager
//!
//! Orchestrates the blob store and the sheet repository. There is no
//! transaction spanning both stores; consistency comes from call ordering:
//!
//! - create: upload first, write the row only after the upload is confirmed
//! - download: one atomic increment-and-return, the URL is disclosed after it
//! - delete: remove the row first, then best-effort removal of the blob
//!
//! A failed insert after a successful upload leaves an orphaned blob. It is
//! logged and reported as [`SheetError::PersistFailed`], never reconciled.

use bytes::Bytes;
use chrono::Utc;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::constants::{MAX_SHEET_SIZE_BYTES, SHEET_PUBLIC_ID_PREFIX};
use crate::db::{RepoError, SheetRepository};
use crate::models::{DownloadTicket, NewSheet, Sheet, SheetFilter};
use crate::storage::{BlobError, BlobStore, UploadMetadata};

/// Failures surfaced by [`SheetManager`]
#[derive(Error, Debug)]
pub enum SheetError {
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Upload to blob store failed: {0}")]
    UploadFailed(#[source] BlobError),

    /// The payload was uploaded but its row could not be written; the remote
    /// object `remote_ref` may now be orphaned.
    #[error("Sheet metadata could not be saved (uploaded object {remote_ref} may be orphaned): {source}")]
    PersistFailed {
        remote_ref: String,
        #[source]
        source: RepoError,
    },

    #[error("Sheet not found")]
    NotFound,

    /// A read or counter update failed before anything was changed
    #[error("Repository error: {0}")]
    Repository(#[from] RepoError),
}

/// A payload waiting to become a sheet
#[derive(Debug, Clone)]
pub struct SheetUpload {
    pub title: String,
    pub category_id: Option<i32>,
    pub payload: Bytes,
    pub content_type: String,
    pub file_name: Option<String>,
}

/// Outcome of a delete
///
/// `blob_removed` is informational only: the sheet is gone either way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteReceipt {
    pub title: String,
    pub blob_removed: bool,
}

/// Per-call time limits for the two external stores
#[derive(Debug, Clone, Copy)]
pub struct Timeouts {
    pub blob: Duration,
    pub db: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            blob: Duration::from_secs(crate::constants::DEFAULT_BLOB_TIMEOUT_SECS),
            db: Duration::from_secs(crate::constants::DEFAULT_DB_TIMEOUT_SECS),
        }
    }
}

/// Generate a public id unique per call: millisecond timestamp plus a random suffix
pub fn generate_public_id() -> String {
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!(
        "{}_{}_{}",
        SHEET_PUBLIC_ID_PREFIX,
        Utc::now().timestamp_millis(),
        &suffix[..8]
    )
}

async fn bounded_blob<T, F>(limit: Duration, fut: F) -> Result<T, BlobError>
where
    F: Future<Output = Result<T, BlobError>>,
{
    tokio::time::timeout(limit, fut)
        .await
        .unwrap_or(Err(BlobError::Timeout))
}

async fn bounded_repo<T, F>(limit: Duration, fut: F) -> Result<T, RepoError>
where
    F: Future<Output = Result<T, RepoError>>,
{
    tokio::time::timeout(limit, fut)
        .await
        .unwrap_or(Err(RepoError::Timeout))
}

/// Coordinates sheet creation, listing, downloads and deletion
#[derive(Clone)]
pub struct SheetManager {
    repo: Arc<dyn SheetRepository>,
    blobs: Arc<dyn BlobStore>,
    timeouts: Timeouts,
}

impl SheetManager {
    pub fn new(
        repo: Arc<dyn SheetRepository>,
        blobs: Arc<dyn BlobStore>,
        timeouts: Timeouts,
    ) -> Self {
        Self {
            repo,
            blobs,
            timeouts,
        }
    }

    /// Upload the payload, then record the sheet
    ///
    /// # Errors
    /// - [`SheetError::Validation`] for a blank title or an empty/oversized
    ///   payload; nothing is uploaded
    /// - [`SheetError::UploadFailed`] if the blob store fails or times out; no
    ///   row is written
    /// - [`SheetError::PersistFailed`] if the row cannot be written; the blob
    ///   named in the error may be left behind
    pub async fn create(&self, upload: SheetUpload) -> Result<Sheet, SheetError> {
        let title = upload.title.trim().to_string();
        if title.is_empty() {
            return Err(SheetError::Validation(
                crate::constants::ERR_EMPTY_TITLE.to_string(),
            ));
        }
        if upload.payload.is_empty() {
            return Err(SheetError::Validation(
                crate::constants::ERR_EMPTY_PAYLOAD.to_string(),
            ));
        }
        let size_bytes = upload.payload.len();
        if size_bytes > MAX_SHEET_SIZE_BYTES {
            return Err(SheetError::Validation(format!(
                "File too large: {} bytes (max: {})",
                size_bytes, MAX_SHEET_SIZE_BYTES
            )));
        }

        let meta = UploadMetadata {
            public_id: generate_public_id(),
            content_type: upload.content_type,
            file_name: upload.file_name,
            size_bytes,
        };

        let remote = bounded_blob(self.timeouts.blob, self.blobs.upload(upload.payload, &meta))
            .await
            .map_err(|e| {
                tracing::error!("Upload of '{}' ({} bytes) failed: {}", title, size_bytes, e);
                SheetError::UploadFailed(e)
            })?;

        let new_sheet = NewSheet {
            title,
            category_id: upload.category_id,
            file_url: remote.url,
            remote_ref: remote.remote_id,
        };
        let remote_ref = new_sheet.remote_ref.clone();

        match bounded_repo(self.timeouts.db, self.repo.insert(new_sheet)).await {
            Ok(sheet) => {
                tracing::info!(
                    sheet_id = sheet.id,
                    remote_ref = %sheet.remote_ref,
                    "Sheet created: '{}' ({} bytes)",
                    sheet.title,
                    size_bytes
                );
                Ok(sheet)
            }
            Err(source) => {
                tracing::warn!(
                    remote_ref = %remote_ref,
                    "Sheet row insert failed after upload; remote object is orphaned: {}",
                    source
                );
                Err(SheetError::PersistFailed { remote_ref, source })
            }
        }
    }

    /// Sheets matching `filter`, read straight from the repository
    pub async fn list(&self, filter: SheetFilter) -> Result<Vec<Sheet>, SheetError> {
        let sheets = bounded_repo(self.timeouts.db, self.repo.list(filter)).await?;
        tracing::debug!(
            "Listed {} sheets (category: {:?}, sort: {:?})",
            sheets.len(),
            filter.category_id,
            filter.sort
        );
        Ok(sheets)
    }

    /// Count a download and return the retrieval URL
    ///
    /// The increment is committed before the URL leaves this function, so
    /// the recorded count never under-counts disclosed URLs.
    pub async fn download(&self, id: i32) -> Result<DownloadTicket, SheetError> {
        let ticket = bounded_repo(self.timeouts.db, self.repo.increment_download(id))
            .await?
            .ok_or(SheetError::NotFound)?;

        tracing::info!(
            sheet_id = id,
            "Download #{} recorded",
            ticket.download_count
        );

        Ok(ticket)
    }

    /// Remove the row, then try to remove its blob
    ///
    /// Succeeds as soon as the row is gone. A failed or timed-out blob
    /// removal is logged and reported through `blob_removed` only.
    pub async fn delete(&self, id: i32) -> Result<DeleteReceipt, SheetError> {
        let deleted = bounded_repo(self.timeouts.db, self.repo.delete_returning(id))
            .await?
            .ok_or(SheetError::NotFound)?;

        let blob_removed =
            match bounded_blob(self.timeouts.blob, self.blobs.delete(&deleted.remote_ref)).await {
                Ok(()) => true,
                Err(e) => {
                    tracing::warn!(
                        sheet_id = id,
                        remote_ref = %deleted.remote_ref,
                        "Remote object delete failed, blob leaked: {}",
                        e
                    );
                    false
                }
            };

        tracing::info!(sheet_id = id, "Sheet deleted: '{}'", deleted.title);

        Ok(DeleteReceipt {
            title: deleted.title,
            blob_removed,
        })
    }

    /// Repository connectivity, for health reporting
    pub async fn ping(&self) -> Result<(), SheetError> {
        bounded_repo(self.timeouts.db, self.repo.ping()).await?;
        Ok(())
    }
}
