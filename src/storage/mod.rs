//! Blob store client contract
//!
//! The lifecycle manager only sees [`BlobStore`]; the Cloudinary adapter is
//! used in production and the in-memory store backs tests.

pub mod cloudinary;
pub mod memory;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

pub use cloudinary::CloudinaryStore;
pub use memory::MemoryBlobStore;

/// Where an uploaded payload ended up
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteRef {
    /// Opaque identifier used for later deletion
    pub remote_id: String,
    /// Publicly resolvable retrieval URL
    pub url: String,
}

/// Describes a payload handed to [`BlobStore::upload`]
#[derive(Debug, Clone)]
pub struct UploadMetadata {
    /// Unique id requested for the object (without folder)
    pub public_id: String,
    pub content_type: String,
    pub file_name: Option<String>,
    pub size_bytes: usize,
}

/// Blob store failures
#[derive(Error, Debug)]
pub enum BlobError {
    #[error("Blob store request timed out")]
    Timeout,

    #[error("Blob store rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Blob store transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Unexpected blob store response: {0}")]
    InvalidResponse(String),

    #[error("Blob store unavailable: {0}")]
    Unavailable(String),
}

/// External content store holding sheet payloads
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Transfer `payload` as a single request and return its remote reference.
    async fn upload(&self, payload: Bytes, meta: &UploadMetadata) -> Result<RemoteRef, BlobError>;

    /// Remove the object addressed by `remote_id`.
    async fn delete(&self, remote_id: &str) -> Result<(), BlobError>;
}
