use uuid::Uuid;

use crate::models::task::{Notice, TaskState};
use crate::services::poller::ProcessedResult;

/// Something the panel UI should render.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskEvent {
    StateChanged { task_id: Uuid, state: TaskState },
    Progress { task_id: Uuid, progress: u8 },
    /// Modal alert; sent once per failed task.
    Alert { task_id: Uuid, message: String },
    NoticeShown(Notice),
    NoticeCleared,
    ResultReady { task_id: Uuid, result: ProcessedResult },
}

/// Receives orchestrator events. Called without internal locks held.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: TaskEvent);
}

/// Forwards events to the log.
#[derive(Debug, Default)]
pub struct LogSink;

impl EventSink for LogSink {
    fn emit(&self, event: TaskEvent) {
        match event {
            TaskEvent::Progress { task_id, progress } => {
                tracing::trace!(task_id = %task_id, progress, "Progress")
            }
            TaskEvent::Alert { task_id, message } => {
                tracing::warn!(task_id = %task_id, message = %message, "Alert shown")
            }
            other => tracing::debug!(event = ?other, "Task event"),
        }
    }
}
