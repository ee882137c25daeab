use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

/// Hands out pre-signed URLs that allow a direct write into the bucket.
#[async_trait]
pub trait UrlIssuer: Send + Sync {
    async fn issue(
        &self,
        object_name: &str,
        content_type: &str,
        expiration_secs: u32,
    ) -> Result<String, IssueError>;
}

/// Client for the signed-URL issuing endpoint.
pub struct HttpUrlIssuer {
    http: Client,
    endpoint: String,
    bucket: String,
}

#[derive(Deserialize)]
struct IssuedUrl {
    #[serde(default)]
    url: Option<String>,
}

impl HttpUrlIssuer {
    pub fn new(http: Client, endpoint: impl Into<String>, bucket: impl Into<String>) -> Self {
        Self {
            http,
            endpoint: endpoint.into(),
            bucket: bucket.into(),
        }
    }

    fn request_url(&self) -> String {
        format!("{}/{}", self.endpoint.trim_end_matches('/'), self.bucket)
    }
}

#[async_trait]
impl UrlIssuer for HttpUrlIssuer {
    async fn issue(
        &self,
        object_name: &str,
        content_type: &str,
        expiration_secs: u32,
    ) -> Result<String, IssueError> {
        let expiration = expiration_secs.to_string();
        let response = self
            .http
            .put(self.request_url())
            .query(&[
                ("object_name", object_name),
                ("content_type", content_type),
                ("expiration", expiration.as_str()),
            ])
            .json(&serde_json::json!({}))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(IssueError::Status(status.as_u16()));
        }

        let issued: IssuedUrl = response.json().await?;
        match issued.url {
            Some(url) if !url.trim().is_empty() => Ok(url),
            _ => Err(IssueError::MissingUrl),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum IssueError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Issuer responded with status {0}")]
    Status(u16),

    #[error("Issuer response did not contain an upload URL")]
    MissingUrl,

    #[error("Presigning failed: {0}")]
    Presign(String),
}
