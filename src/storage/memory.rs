use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;

use super::{BlobError, BlobStore, RemoteRef, UploadMetadata};

/// In-process blob store with switchable failure modes
///
/// ```
/// use bytes::Bytes;
/// use sheet_catalog_server::storage::{BlobStore, MemoryBlobStore, UploadMetadata};
///
/// # tokio_test::block_on(async {
/// let store = MemoryBlobStore::new();
/// let meta = UploadMetadata {
///     public_id: "sheet_1".to_string(),
///     content_type: "application/pdf".to_string(),
///     file_name: None,
///     size_bytes: 4,
/// };
///
/// let remote = store.upload(Bytes::from_static(b"%PDF"), &meta).await.unwrap();
/// assert!(store.contains(&remote.remote_id).await);
///
/// store.fail_deletes(true);
/// assert!(store.delete(&remote.remote_id).await.is_err());
/// # });
/// ```
#[derive(Default)]
pub struct MemoryBlobStore {
    objects: Mutex<HashMap<String, Bytes>>,
    fail_uploads: AtomicBool,
    fail_deletes: AtomicBool,
    upload_delay: Mutex<Option<Duration>>,
    upload_calls: AtomicUsize,
    delete_calls: AtomicUsize,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent upload fail (or succeed again)
    pub fn fail_uploads(&self, fail: bool) {
        self.fail_uploads.store(fail, Ordering::SeqCst);
    }

    /// Make every subsequent delete fail (or succeed again)
    pub fn fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }

    /// Stall uploads, used to exercise caller timeouts
    pub async fn set_upload_delay(&self, delay: Option<Duration>) {
        *self.upload_delay.lock().await = delay;
    }

    pub async fn contains(&self, remote_id: &str) -> bool {
        self.objects.lock().await.contains_key(remote_id)
    }

    pub async fn object_count(&self) -> usize {
        self.objects.lock().await.len()
    }

    pub fn upload_calls(&self) -> usize {
        self.upload_calls.load(Ordering::SeqCst)
    }

    pub fn delete_calls(&self) -> usize {
        self.delete_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn upload(&self, payload: Bytes, meta: &UploadMetadata) -> Result<RemoteRef, BlobError> {
        self.upload_calls.fetch_add(1, Ordering::SeqCst);

        let delay = *self.upload_delay.lock().await;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self.fail_uploads.load(Ordering::SeqCst) {
            return Err(BlobError::Unavailable("upload disabled".to_string()));
        }

        let remote_id = format!("memory/{}", meta.public_id);
        let mut objects = self.objects.lock().await;
        if objects.contains_key(&remote_id) {
            return Err(BlobError::Rejected {
                status: 409,
                message: format!("{} already exists", remote_id),
            });
        }
        objects.insert(remote_id.clone(), payload);

        Ok(RemoteRef {
            url: format!("memory://blobs/{}", remote_id),
            remote_id,
        })
    }

    async fn delete(&self, remote_id: &str) -> Result<(), BlobError> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);

        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(BlobError::Unavailable("delete disabled".to_string()));
        }

        self.objects.lock().await.remove(remote_id);
        Ok(())
    }
}
