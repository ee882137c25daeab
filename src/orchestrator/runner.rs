//! Upload orchestrator implementation.
//!
//! Drives one submission at a time through
//! compress → issue URL → upload → poll, with a progress timer while work is
//! in flight and a polling timer while waiting for the result. Every exit
//! path (success, failure, cancel, reset, shutdown) aborts both timers.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::Utc;
use garde::Validate;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::config::OrchestratorConfig;
use crate::models::submission::{SourceImage, Submission};
use crate::models::task::{Notice, TaskSnapshot, TaskState, UploadTask};
use crate::services::canvas::{CanvasPlacer, PlacementError};
use crate::services::poller::{PollOutcome, ProcessedResult};

use super::events::{EventSink, TaskEvent};
use super::naming;
use super::progress::{ProgressStrategy, MAX_PROGRESS};
use super::{Collaborators, OrchestratorError};

/// Message of the modal alert shown when a task fails.
pub const FAILURE_ALERT: &str = "Got an Error. Please try again.";

/// Runs upload tasks. Cheap to clone; clones share the same task slot.
#[derive(Clone)]
pub struct UploadOrchestrator {
    shared: Arc<Shared>,
}

struct Shared {
    config: OrchestratorConfig,
    services: Collaborators,
    placer: Option<Arc<CanvasPlacer>>,
    sink: Arc<dyn EventSink>,
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    task: Option<UploadTask>,
    strategy: Option<ProgressStrategy>,
    progress_timer: Option<JoinHandle<()>>,
    polling_timer: Option<JoinHandle<()>>,
    notice: Option<(u64, Notice)>,
    notice_timer: Option<JoinHandle<()>>,
    notice_seq: u64,
}

impl Inner {
    /// The task with `id`, only while it is still in flight.
    fn active_task(&mut self, id: Uuid) -> Option<&mut UploadTask> {
        self.task
            .as_mut()
            .filter(|t| t.id == id && t.state.is_active())
    }

    fn clear_timers(&mut self) {
        if let Some(handle) = self.progress_timer.take() {
            handle.abort();
        }
        if let Some(handle) = self.polling_timer.take() {
            handle.abort();
        }
    }

    fn active_timers(&self) -> usize {
        usize::from(self.progress_timer.is_some()) + usize::from(self.polling_timer.is_some())
    }
}

impl UploadOrchestrator {
    pub fn new(
        config: OrchestratorConfig,
        services: Collaborators,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        Self::build(config, services, None, sink)
    }

    /// Orchestrator that places every successful result on the page.
    pub fn with_placer(
        config: OrchestratorConfig,
        services: Collaborators,
        placer: CanvasPlacer,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        Self::build(config, services, Some(Arc::new(placer)), sink)
    }

    fn build(
        config: OrchestratorConfig,
        services: Collaborators,
        placer: Option<Arc<CanvasPlacer>>,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                config,
                services,
                placer,
                sink,
                inner: Mutex::new(Inner::default()),
            }),
        }
    }

    /// Start a task with the configured progress strategy.
    ///
    /// Must be called from within a tokio runtime. The task is in
    /// `Compressing` with progress 0 when this returns.
    pub fn submit(&self, submission: Submission) -> Result<Uuid, OrchestratorError> {
        let strategy = ProgressStrategy::from_config(&self.shared.config);
        self.submit_with_strategy(submission, strategy)
    }

    pub fn submit_with_strategy(
        &self,
        submission: Submission,
        strategy: ProgressStrategy,
    ) -> Result<Uuid, OrchestratorError> {
        submission.validate()?;

        let Submission { profession, image } = submission;
        let id = Uuid::new_v4();
        let object_name = naming::object_name(&profession);

        {
            let mut inner = self.shared.lock();
            if let Some(current) = inner.task.as_ref().filter(|t| t.state.is_active()) {
                return Err(OrchestratorError::TaskInProgress(current.id));
            }
            inner.clear_timers();

            inner.task = Some(UploadTask {
                id,
                profession: profession.clone(),
                object_name: object_name.clone(),
                source_name: image.file_name.clone(),
                source_mime: image.mime_type.clone(),
                source_len: image.len(),
                state: TaskState::Compressing,
                progress: 0,
                result: None,
                created_at: Utc::now(),
            });
            inner.strategy = Some(strategy);
            if let Some(tick) = strategy.tick() {
                inner.progress_timer = Some(self.shared.spawn_progress_timer(id, strategy, tick));
            }
        }

        metrics::counter!("future_self_tasks_submitted").increment(1);
        info!(
            task_id = %id,
            profession = %profession,
            object_name = %object_name,
            "Upload task started"
        );

        self.shared.emit(vec![
            TaskEvent::StateChanged {
                task_id: id,
                state: TaskState::Compressing,
            },
            TaskEvent::Progress {
                task_id: id,
                progress: 0,
            },
        ]);

        tokio::spawn(run_task(Arc::clone(&self.shared), id, image, object_name));
        Ok(id)
    }

    /// Cancel the task in flight. Returns `false` when nothing was active.
    ///
    /// Requests already sent are not interrupted; their outcome is ignored.
    pub fn cancel(&self) -> bool {
        let id = {
            let mut inner = self.shared.lock();
            let Some(task) = inner.task.as_mut().filter(|t| t.state.is_active()) else {
                return false;
            };
            task.state = TaskState::Canceled;
            task.progress = 0;
            let id = task.id;
            inner.clear_timers();
            self.shared.show_notice(&mut inner, Notice::Canceled);
            id
        };

        metrics::counter!("future_self_tasks_canceled").increment(1);
        info!(task_id = %id, "Upload task canceled");

        self.shared.emit(vec![
            TaskEvent::StateChanged {
                task_id: id,
                state: TaskState::Canceled,
            },
            TaskEvent::Progress {
                task_id: id,
                progress: 0,
            },
            TaskEvent::NoticeShown(Notice::Canceled),
        ]);
        true
    }

    /// Stop all timers and return to `Idle` with progress 0. Idempotent.
    pub fn reset(&self) {
        let mut inner = self.shared.lock();
        inner.clear_timers();
        if let Some(task) = inner.task.take() {
            debug!(task_id = %task.id, state = %task.state, "Task discarded");
        }
        inner.strategy = None;
    }

    /// Teardown: reset and drop any visible notice.
    pub fn shutdown(&self) {
        self.reset();
        let mut inner = self.shared.lock();
        if let Some(handle) = inner.notice_timer.take() {
            handle.abort();
        }
        inner.notice = None;
    }

    pub fn snapshot(&self) -> TaskSnapshot {
        let inner = self.shared.lock();
        let task = inner.task.as_ref();
        TaskSnapshot {
            task_id: task.map(|t| t.id),
            object_name: task.map(|t| t.object_name.clone()),
            state: task.map_or(TaskState::Idle, |t| t.state),
            progress: task.map_or(0, |t| t.progress),
            result: task.and_then(|t| t.result.clone()),
            notice: inner.notice.map(|(_, notice)| notice),
            active_timers: inner.active_timers(),
        }
    }

    /// Number of progress and polling timers currently scheduled.
    pub fn active_timers(&self) -> usize {
        self.shared.lock().active_timers()
    }
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, events: Vec<TaskEvent>) {
        for event in events {
            self.sink.emit(event);
        }
    }

    /// Move task `id` to `state`. Returns `false` when the task was canceled
    /// or replaced in the meantime.
    fn transition(&self, id: Uuid, state: TaskState) -> bool {
        let (progress, events) = {
            let mut inner = self.lock();
            let milestone = inner.strategy.and_then(|s| s.milestone(state));
            let Some(task) = inner.active_task(id) else {
                return false;
            };
            task.state = state;
            if let Some(progress) = milestone {
                task.progress = task.progress.max(progress);
            }
            let progress = task.progress;
            let mut events = vec![TaskEvent::StateChanged { task_id: id, state }];
            if milestone.is_some() {
                events.push(TaskEvent::Progress {
                    task_id: id,
                    progress,
                });
            }
            (progress, events)
        };

        debug!(task_id = %id, state = %state, progress, "Task state changed");
        self.emit(events);
        true
    }

    /// Abort task `id`: alert once, progress 0, no timers left.
    fn fail(&self, id: Uuid, reason: &str) {
        {
            let mut inner = self.lock();
            let Some(task) = inner.active_task(id) else {
                return;
            };
            task.state = TaskState::Failed;
            task.progress = 0;
            inner.clear_timers();
        }

        metrics::counter!("future_self_tasks_failed").increment(1);
        error!(task_id = %id, reason = %reason, "Upload task failed");

        self.emit(vec![
            TaskEvent::StateChanged {
                task_id: id,
                state: TaskState::Failed,
            },
            TaskEvent::Progress {
                task_id: id,
                progress: 0,
            },
            TaskEvent::Alert {
                task_id: id,
                message: FAILURE_ALERT.to_string(),
            },
        ]);
    }

    fn succeed(self: &Arc<Self>, id: Uuid, result: ProcessedResult) {
        let elapsed = {
            let mut inner = self.lock();
            let Some(task) = inner.active_task(id) else {
                return;
            };
            task.state = TaskState::Succeeded;
            task.progress = MAX_PROGRESS;
            task.result = Some(result.clone());
            let elapsed = Utc::now() - task.created_at;
            inner.clear_timers();
            elapsed
        };

        let seconds = elapsed.num_milliseconds() as f64 / 1000.0;
        metrics::counter!("future_self_tasks_succeeded").increment(1);
        metrics::histogram!("future_self_task_seconds").record(seconds);
        info!(task_id = %id, result_url = %result.url, seconds, "Upload task succeeded");

        self.emit(vec![
            TaskEvent::StateChanged {
                task_id: id,
                state: TaskState::Succeeded,
            },
            TaskEvent::Progress {
                task_id: id,
                progress: MAX_PROGRESS,
            },
            TaskEvent::ResultReady {
                task_id: id,
                result: result.clone(),
            },
        ]);

        self.spawn_placement(id, result);
    }

    /// Place `result` on the page in a detached task. Failures are only logged.
    fn spawn_placement(&self, id: Uuid, result: ProcessedResult) {
        let Some(placer) = self.placer.clone() else {
            return;
        };
        tokio::spawn(async move {
            match placer.place(&result).await {
                Ok(placement) => debug!(task_id = %id, ?placement, "Placement finished"),
                Err(PlacementError::Host(e)) => e.log("place_result"),
                Err(e) => warn!(task_id = %id, error = %e, "Result could not be placed"),
            }
        });
    }

    /// Fixed-step progress hit 100: place the configured sample result.
    fn place_demo_result(&self, id: Uuid) {
        match &self.config.demo_result_url {
            Some(url) => {
                info!(task_id = %id, demo_url = %url, "Progress complete, placing demo result");
                self.spawn_placement(
                    id,
                    ProcessedResult {
                        url: url.clone(),
                        content_type: None,
                    },
                );
            }
            None => debug!(task_id = %id, "Progress complete, no demo result configured"),
        }
    }

    /// Leave the upload phase: progress timer off, polling timer on.
    fn begin_polling(self: &Arc<Self>, id: Uuid, object_name: String) -> bool {
        {
            let mut inner = self.lock();
            let milestone = inner
                .strategy
                .and_then(|s| s.milestone(TaskState::Polling));
            let Some(task) = inner.active_task(id) else {
                return false;
            };
            task.state = TaskState::Polling;
            if let Some(progress) = milestone {
                task.progress = task.progress.max(progress);
            }
            inner.clear_timers();
            inner.polling_timer = Some(self.spawn_polling_timer(id, object_name));
        }

        info!(task_id = %id, "Upload stored, polling for result");
        self.emit(vec![TaskEvent::StateChanged {
            task_id: id,
            state: TaskState::Polling,
        }]);
        true
    }

    fn spawn_progress_timer(
        self: &Arc<Self>,
        id: Uuid,
        strategy: ProgressStrategy,
        tick: Duration,
    ) -> JoinHandle<()> {
        let shared = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + tick, tick);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let (progress, completed) = {
                    let mut inner = shared.lock();
                    let Some(task) = inner.active_task(id) else {
                        break;
                    };
                    let next = strategy.advance(task.progress);
                    if next == task.progress {
                        continue;
                    }
                    task.progress = next;
                    let completed = next == MAX_PROGRESS && strategy.places_on_completion();
                    if completed {
                        // The loop ends below; release the slot instead of aborting itself.
                        inner.progress_timer = None;
                    }
                    (next, completed)
                };
                shared.sink.emit(TaskEvent::Progress {
                    task_id: id,
                    progress,
                });
                if completed {
                    shared.place_demo_result(id);
                    break;
                }
            }
        })
    }

    fn spawn_polling_timer(self: &Arc<Self>, id: Uuid, object_name: String) -> JoinHandle<()> {
        let shared = Arc::clone(self);
        let period = self.config.polling_interval;
        let max_attempts = self.config.max_poll_attempts;

        tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut attempts: u32 = 0;
            loop {
                ticker.tick().await;
                if shared.lock().active_task(id).is_none() {
                    break;
                }

                attempts += 1;
                match shared.services.poller.check(&object_name).await {
                    Ok(PollOutcome::Ready(result)) => {
                        shared.succeed(id, result);
                        break;
                    }
                    Ok(PollOutcome::Pending) => {
                        debug!(task_id = %id, attempts, "Result not ready yet");
                    }
                    Err(e) => {
                        warn!(task_id = %id, attempts, error = %e, "Result check failed");
                    }
                }

                if max_attempts > 0 && attempts >= max_attempts {
                    shared.fail(
                        id,
                        &format!("result not ready after {} checks", attempts),
                    );
                    break;
                }
            }
        })
    }

    fn show_notice(self: &Arc<Self>, inner: &mut Inner, notice: Notice) {
        if let Some(handle) = inner.notice_timer.take() {
            handle.abort();
        }
        inner.notice_seq += 1;
        let seq = inner.notice_seq;
        inner.notice = Some((seq, notice));

        let shared = Arc::clone(self);
        let duration = self.config.notice_duration;
        inner.notice_timer = Some(tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            let cleared = {
                let mut inner = shared.lock();
                if inner.notice.map(|(s, _)| s) == Some(seq) {
                    inner.notice = None;
                    inner.notice_timer = None;
                    true
                } else {
                    false
                }
            };
            if cleared {
                shared.sink.emit(TaskEvent::NoticeCleared);
            }
        }));
    }
}

/// The sequential part of a task. Stops quietly once the task is no longer
/// current.
async fn run_task(shared: Arc<Shared>, id: Uuid, image: SourceImage, object_name: String) {
    let file = match shared.services.compressor.compress(&image, &object_name).await {
        Ok(compressed) => compressed,
        Err(e) => {
            warn!(task_id = %id, error = %e, "Compression failed, uploading original image");
            image
        }
    };

    if !shared.transition(id, TaskState::AwaitingUrl) {
        return;
    }

    let url = match shared
        .services
        .issuer
        .issue(&object_name, &file.mime_type, shared.config.url_expiration_secs)
        .await
    {
        Ok(url) => url,
        Err(e) => {
            shared.fail(id, &format!("upload URL not issued: {}", e));
            return;
        }
    };

    if !shared.transition(id, TaskState::Uploading) {
        return;
    }

    let content_type = file.mime_type;
    if let Err(e) = shared.services.store.put(&url, file.bytes, &content_type).await {
        shared.fail(id, &format!("upload rejected: {}", e));
        return;
    }

    shared.begin_polling(id, object_name);
}
