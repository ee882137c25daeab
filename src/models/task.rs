use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::Display;
use uuid::Uuid;

use crate::services::poller::ProcessedResult;

/// Lifecycle of one upload submission.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Display, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TaskState {
    Idle,
    Compressing,
    AwaitingUrl,
    Uploading,
    Polling,
    Succeeded,
    Failed,
    Canceled,
}

impl TaskState {
    /// States in which a task is in flight and may be canceled.
    pub fn is_active(self) -> bool {
        matches!(
            self,
            TaskState::Compressing
                | TaskState::AwaitingUrl
                | TaskState::Uploading
                | TaskState::Polling
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            TaskState::Succeeded | TaskState::Failed | TaskState::Canceled
        )
    }
}

/// One submission tracked by the orchestrator.
#[derive(Debug, Clone, Serialize)]
pub struct UploadTask {
    pub id: Uuid,
    pub profession: String,
    pub object_name: String,
    pub source_name: String,
    pub source_mime: String,
    pub source_len: usize,
    pub state: TaskState,
    pub progress: u8,
    pub result: Option<ProcessedResult>,
    pub created_at: DateTime<Utc>,
}

/// Transient notice shown to the user outside the task flow.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Notice {
    Canceled,
}

impl Notice {
    pub fn message(self) -> &'static str {
        match self {
            Notice::Canceled => "The operation has been canceled.",
        }
    }
}

/// Point-in-time view of the orchestrator, used for rendering and tests.
#[derive(Debug, Clone, Serialize)]
pub struct TaskSnapshot {
    pub task_id: Option<Uuid>,
    pub object_name: Option<String>,
    pub state: TaskState,
    pub progress: u8,
    pub result: Option<ProcessedResult>,
    pub notice: Option<Notice>,
    /// Progress and polling timers currently scheduled
    pub active_timers: usize,
}

impl TaskSnapshot {
    /// Whether the panel shows the progress view instead of the idle form.
    pub fn is_busy(&self) -> bool {
        self.state.is_active()
    }
}
