//! Object storage client
//!
//! Uploads image assets to an S3-compatible object store over plain HTTP
//! (path-style addressing, works with MinIO / Supabase storage and other
//! S3-compatible services) and returns the durable public URL. Keys are
//! namespaced `<prefix>/<uuid>.<original-extension>`.

use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

/// Storage client errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Storage rejected upload ({0}): {1}")]
    Rejected(u16, String),
}

/// Storage backend configuration
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// S3-compatible endpoint URL
    pub endpoint: String,
    /// Bucket name
    pub bucket: String,
    /// Base URL for public object access; defaults to `<endpoint>/<bucket>`
    pub public_base_url: Option<String>,
    /// Bearer credential for the storage service, if required
    pub access_key: Option<String>,
}

/// A successfully stored object
#[derive(Debug, Clone, Serialize)]
pub struct StoredObject {
    pub key: String,
    pub url: String,
}

/// Object storage client
pub struct StorageClient {
    config: StorageConfig,
    http: reqwest::Client,
}

/// Build an object key: `<prefix>/<uuid>.<extension>`
///
/// The extension is taken from the declared file name; files without one
/// get `bin`.
pub fn object_key(prefix: &str, file_name: &str) -> String {
    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .unwrap_or_else(|| "bin".to_string());

    format!("{}/{}.{}", prefix, Uuid::new_v4(), extension)
}

impl StorageClient {
    pub fn new(config: StorageConfig) -> Result<Self, StorageError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| StorageError::Network(e.to_string()))?;

        Ok(Self { config, http })
    }

    /// Upload a buffered binary asset and return its key and public URL
    pub async fn put(
        &self,
        bytes: Vec<u8>,
        file_name: &str,
        content_type: &str,
        prefix: &str,
    ) -> Result<StoredObject, StorageError> {
        let key = object_key(prefix, file_name);
        let upload_url = format!(
            "{}/{}/{}",
            self.config.endpoint.trim_end_matches('/'),
            self.config.bucket,
            key
        );

        debug!(
            key = %key,
            content_type = %content_type,
            size = bytes.len(),
            "Uploading object"
        );

        let mut request = self
            .http
            .put(&upload_url)
            .header("Content-Type", content_type)
            .body(bytes);

        if let Some(access_key) = &self.config.access_key {
            request = request.bearer_auth(access_key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| StorageError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StorageError::Rejected(status.as_u16(), body));
        }

        let public_base = self
            .config
            .public_base_url
            .clone()
            .unwrap_or_else(|| {
                format!(
                    "{}/{}",
                    self.config.endpoint.trim_end_matches('/'),
                    self.config.bucket
                )
            });
        let url = format!("{}/{}", public_base.trim_end_matches('/'), key);

        info!(key = %key, url = %url, "Object stored");

        Ok(StoredObject { key, url })
    }
}
