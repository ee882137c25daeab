//! Upload orchestration: one selfie submission from file pick to result.
//!
//! The [`UploadOrchestrator`] owns the single [`UploadTask`] slot, its
//! progress and polling timers, and the transient cancel notice. External
//! work goes through the [`Collaborators`] traits so each step can be
//! swapped out in tests.
//!
//! [`UploadTask`]: crate::models::task::UploadTask

pub mod events;
pub mod naming;
pub mod progress;
mod runner;

use std::sync::Arc;

use thiserror::Error;
use uuid::Uuid;

use crate::services::compression::Compressor;
use crate::services::issuer::UrlIssuer;
use crate::services::poller::ResultPoller;
use crate::services::storage::ObjectStore;

pub use events::{EventSink, LogSink, TaskEvent};
pub use progress::ProgressStrategy;
pub use runner::{UploadOrchestrator, FAILURE_ALERT};

/// The four services a task is sequenced through.
#[derive(Clone)]
pub struct Collaborators {
    pub compressor: Arc<dyn Compressor>,
    pub issuer: Arc<dyn UrlIssuer>,
    pub store: Arc<dyn ObjectStore>,
    pub poller: Arc<dyn ResultPoller>,
}

#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// A submission is already in flight.
    #[error("task already in progress: {0}")]
    TaskInProgress(Uuid),

    #[error("invalid submission: {0}")]
    InvalidSubmission(#[from] garde::Report),
}
