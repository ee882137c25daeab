use std::time::Duration;

use crate::config::{OrchestratorConfig, ProgressMode};
use crate::models::task::TaskState;

pub const MAX_PROGRESS: u8 = 100;

const FIXED_STEP: u8 = 10;
const FIXED_STEP_TICK: Duration = Duration::from_millis(500);

/// How progress moves for one task. Chosen once when the task starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressStrategy {
    /// Constant step per tick so the bar fills over the estimated duration.
    SimulatedLinear { step: u8, tick: Duration },
    /// Constant step per tick, independent of any estimate.
    FixedStep { step: u8, tick: Duration },
    /// No timer; progress jumps to a milestone on each state change.
    RealFeedback,
}

impl ProgressStrategy {
    /// Linear estimate: `ceil(100 / ceil(estimated / tick))` per tick.
    pub fn simulated(estimated: Duration, tick: Duration) -> Self {
        let tick_ms = tick.as_millis().max(1);
        let ticks = estimated.as_millis().div_ceil(tick_ms).max(1);
        let step = u128::from(MAX_PROGRESS).div_ceil(ticks).max(1);
        ProgressStrategy::SimulatedLinear {
            step: step.min(u128::from(MAX_PROGRESS)) as u8,
            tick: Duration::from_millis(tick_ms as u64),
        }
    }

    pub fn fixed_step() -> Self {
        ProgressStrategy::FixedStep {
            step: FIXED_STEP,
            tick: FIXED_STEP_TICK,
        }
    }

    pub fn from_config(config: &OrchestratorConfig) -> Self {
        match config.progress_mode {
            ProgressMode::SimulatedLinear => {
                Self::simulated(config.estimated_completion, config.progress_tick)
            }
            ProgressMode::FixedStep => Self::fixed_step(),
            ProgressMode::RealFeedback => ProgressStrategy::RealFeedback,
        }
    }

    /// Interval of the progress timer, if this strategy uses one.
    pub fn tick(&self) -> Option<Duration> {
        match self {
            ProgressStrategy::SimulatedLinear { tick, .. }
            | ProgressStrategy::FixedStep { tick, .. } => Some(*tick),
            ProgressStrategy::RealFeedback => None,
        }
    }

    /// Whether reaching 100 ends the timer and places the demo result.
    pub fn places_on_completion(&self) -> bool {
        matches!(self, ProgressStrategy::FixedStep { .. })
    }

    /// Progress after one timer tick, never above 100.
    pub fn advance(&self, current: u8) -> u8 {
        match self {
            ProgressStrategy::SimulatedLinear { step, .. }
            | ProgressStrategy::FixedStep { step, .. } => {
                current.saturating_add(*step).min(MAX_PROGRESS)
            }
            ProgressStrategy::RealFeedback => current,
        }
    }

    /// Progress to show when a task enters `state`, for milestone strategies.
    ///
    /// Every task starts at 0 in `Compressing`; milestones only apply to the
    /// states that follow it.
    pub fn milestone(&self, state: TaskState) -> Option<u8> {
        if !matches!(self, ProgressStrategy::RealFeedback) {
            return None;
        }
        match state {
            TaskState::AwaitingUrl => Some(25),
            TaskState::Uploading => Some(40),
            TaskState::Polling => Some(80),
            _ => None,
        }
    }
}
