use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, StatusCode};
use s3::creds::Credentials;
use s3::{Bucket, Region};

use crate::services::issuer::{IssueError, UrlIssuer};

/// Receives the upload payload at a pre-signed URL.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put(&self, url: &str, bytes: Vec<u8>, content_type: &str) -> Result<(), StorageError>;
}

/// Direct binary PUT against a pre-signed object storage URL.
pub struct HttpObjectStore {
    http: Client,
}

impl HttpObjectStore {
    pub fn new(http: Client) -> Self {
        Self { http }
    }
}

#[async_trait]
impl ObjectStore for HttpObjectStore {
    async fn put(&self, url: &str, bytes: Vec<u8>, content_type: &str) -> Result<(), StorageError> {
        let len = bytes.len();
        let response = self
            .http
            .put(url)
            .header(CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await?;

        // Only a plain 200 counts, as the bucket answers presigned PUTs with it.
        if response.status() != StatusCode::OK {
            return Err(StorageError::Rejected(response.status().as_u16()));
        }

        tracing::debug!(bytes = len, content_type = %content_type, "Object stored");
        Ok(())
    }
}

/// Signs upload URLs locally against an S3-compatible bucket.
pub struct BucketPresigner {
    bucket: Box<Bucket>,
}

impl BucketPresigner {
    pub fn new(
        bucket_name: &str,
        endpoint: &str,
        access_key: &str,
        secret_key: &str,
    ) -> Result<Self, StorageError> {
        let region = Region::Custom {
            region: "auto".to_string(),
            endpoint: endpoint.to_string(),
        };

        let credentials =
            Credentials::new(Some(access_key), Some(secret_key), None, None, None)
                .map_err(|e| StorageError::Config(e.to_string()))?;

        let bucket = Bucket::new(bucket_name, region, credentials)
            .map_err(|e| StorageError::Config(e.to_string()))?;

        Ok(Self { bucket })
    }
}

#[async_trait]
impl UrlIssuer for BucketPresigner {
    async fn issue(
        &self,
        object_name: &str,
        content_type: &str,
        expiration_secs: u32,
    ) -> Result<String, IssueError> {
        tracing::debug!(object_name = %object_name, content_type = %content_type, "Presigning upload URL");
        self.bucket
            .presign_put(object_name, expiration_secs, None, None)
            .await
            .map_err(|e| IssueError::Presign(e.to_string()))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Object store rejected upload with status {0}")]
    Rejected(u16),

    #[error("Storage configuration error: {0}")]
    Config(String),
}
