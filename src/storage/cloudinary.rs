use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use sha1::{Digest, Sha1};
use std::collections::BTreeMap;
use std::time::Duration;

use super::{BlobError, BlobStore, RemoteRef, UploadMetadata};
use crate::config::CloudinaryConfig;
use crate::constants::PDF_CONTENT_TYPE;

/// PDFs are stored as raw (non-image) resources
const RESOURCE_TYPE: &str = "raw";

/// Delivery format requested for a payload, so raw URLs keep their extension
fn delivery_format(content_type: &str) -> Option<&'static str> {
    (content_type == PDF_CONTENT_TYPE).then_some("pdf")
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    public_id: String,
    secure_url: String,
}

#[derive(Debug, Deserialize)]
struct DestroyResponse {
    result: String,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Cloudinary upload/destroy client using signed API requests
#[derive(Clone)]
pub struct CloudinaryStore {
    client: reqwest::Client,
    config: CloudinaryConfig,
}

impl CloudinaryStore {
    /// Build a client whose every request is bounded by `timeout`
    pub fn new(config: &CloudinaryConfig, timeout: Duration) -> Result<Self, BlobError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(BlobError::Transport)?;

        tracing::info!(
            "Cloudinary client configured for cloud '{}' (folder: {})",
            config.cloud_name,
            config.folder
        );

        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    /// Params covered by the upload signature
    fn upload_params(
        &self,
        meta: &UploadMetadata,
        timestamp: &str,
    ) -> BTreeMap<&'static str, String> {
        let mut params = BTreeMap::new();
        params.insert("folder", self.config.folder.clone());
        params.insert("public_id", meta.public_id.clone());
        params.insert("timestamp", timestamp.to_string());
        if let Some(format) = delivery_format(&meta.content_type) {
            params.insert("format", format.to_string());
        }
        params
    }

    fn endpoint(&self, action: &str) -> String {
        format!(
            "{}/v1_1/{}/{}/{}",
            self.config.api_base.trim_end_matches('/'),
            self.config.cloud_name,
            RESOURCE_TYPE,
            action
        )
    }

    async fn rejection(response: reqwest::Response) -> BlobError {
        let status = response.status().as_u16();
        let message = match response.json::<ErrorEnvelope>().await {
            Ok(envelope) => envelope.error.message,
            Err(_) => "no error message".to_string(),
        };
        BlobError::Rejected { status, message }
    }
}

/// Sign request parameters the way the Cloudinary API expects:
/// `sha1("k1=v1&k2=v2" + api_secret)` with keys in lexicographic order.
pub fn sign_params(params: &BTreeMap<&str, String>, api_secret: &str) -> String {
    let to_sign = params
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha1::new();
    hasher.update(to_sign.as_bytes());
    hasher.update(api_secret.as_bytes());
    hex::encode(hasher.finalize())
}

fn map_transport(err: reqwest::Error) -> BlobError {
    if err.is_timeout() {
        BlobError::Timeout
    } else {
        BlobError::Transport(err)
    }
}

#[async_trait]
impl BlobStore for CloudinaryStore {
    async fn upload(&self, payload: Bytes, meta: &UploadMetadata) -> Result<RemoteRef, BlobError> {
        let timestamp = Utc::now().timestamp().to_string();

        let params = self.upload_params(meta, &timestamp);
        let signature = sign_params(&params, &self.config.api_secret);

        let file_name = meta
            .file_name
            .clone()
            .unwrap_or_else(|| meta.public_id.clone());

        // The buffer is piped into the request body as-is, never spooled to disk
        let length = payload.len() as u64;
        let file_part = Part::stream_with_length(reqwest::Body::from(payload), length)
            .file_name(file_name)
            .mime_str(&meta.content_type)
            .map_err(BlobError::Transport)?;

        // Every signed param is sent as a form field alongside the signature
        let form = params
            .into_iter()
            .fold(Form::new(), |form, (key, value)| form.text(key, value))
            .text("api_key", self.config.api_key.clone())
            .text("signature", signature)
            .part("file", file_part);

        let response = self
            .client
            .post(self.endpoint("upload"))
            .multipart(form)
            .send()
            .await
            .map_err(map_transport)?;

        if !response.status().is_success() {
            return Err(Self::rejection(response).await);
        }

        let body: UploadResponse = response
            .json()
            .await
            .map_err(|e| BlobError::InvalidResponse(e.to_string()))?;

        tracing::debug!(
            "Cloudinary upload complete: {} ({} bytes)",
            body.public_id,
            meta.size_bytes
        );

        Ok(RemoteRef {
            remote_id: body.public_id,
            url: body.secure_url,
        })
    }

    async fn delete(&self, remote_id: &str) -> Result<(), BlobError> {
        let timestamp = Utc::now().timestamp().to_string();

        let mut params = BTreeMap::new();
        params.insert("public_id", remote_id.to_string());
        params.insert("timestamp", timestamp.clone());
        let signature = sign_params(&params, &self.config.api_secret);

        let form = [
            ("public_id", remote_id.to_string()),
            ("timestamp", timestamp),
            ("api_key", self.config.api_key.clone()),
            ("signature", signature),
        ];

        let response = self
            .client
            .post(self.endpoint("destroy"))
            .form(&form)
            .send()
            .await
            .map_err(map_transport)?;

        if !response.status().is_success() {
            return Err(Self::rejection(response).await);
        }

        let body: DestroyResponse = response
            .json()
            .await
            .map_err(|e| BlobError::InvalidResponse(e.to_string()))?;

        match body.result.as_str() {
            "ok" => Ok(()),
            // Already gone; nothing left to clean up
            "not found" => {
                tracing::warn!("Cloudinary object {} was already absent", remote_id);
                Ok(())
            }
            other => Err(BlobError::InvalidResponse(format!(
                "destroy returned '{}'",
                other
            ))),
        }
    }
}
