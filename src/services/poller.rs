use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

/// Location of a processed "future self" image.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProcessedResult {
    pub url: String,
    pub content_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    Pending,
    Ready(ProcessedResult),
}

/// Checks whether the processed artifact for an uploaded object exists.
#[async_trait]
pub trait ResultPoller: Send + Sync {
    async fn check(&self, object_name: &str) -> Result<PollOutcome, PollError>;
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum ResultStatus {
    Pending,
    Ready,
}

/// Body of `GET {result_endpoint}?object_name=...`.
#[derive(Debug, Deserialize)]
struct ResultResponse {
    status: ResultStatus,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    content_type: Option<String>,
}

pub struct HttpResultPoller {
    http: Client,
    endpoint: String,
}

impl HttpResultPoller {
    pub fn new(http: Client, endpoint: impl Into<String>) -> Self {
        Self {
            http,
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl ResultPoller for HttpResultPoller {
    async fn check(&self, object_name: &str) -> Result<PollOutcome, PollError> {
        let response = self
            .http
            .get(&self.endpoint)
            .query(&[("object_name", object_name)])
            .send()
            .await?;

        match response.status() {
            StatusCode::NOT_FOUND => return Ok(PollOutcome::Pending),
            status if !status.is_success() => return Err(PollError::Status(status.as_u16())),
            _ => {}
        }

        let body: ResultResponse = response.json().await?;
        interpret(body)
    }
}

fn interpret(body: ResultResponse) -> Result<PollOutcome, PollError> {
    match body.status {
        ResultStatus::Pending => Ok(PollOutcome::Pending),
        ResultStatus::Ready => {
            let url = body.url.filter(|u| !u.is_empty()).ok_or(PollError::MissingUrl)?;
            Ok(PollOutcome::Ready(ProcessedResult {
                url,
                content_type: body.content_type,
            }))
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PollError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Result endpoint responded with status {0}")]
    Status(u16),

    #[error("Result marked ready without a URL")]
    MissingUrl,
}
