//! External task lifecycle: raw processor status, progress, and ETA.
//!
//! The processor reports a coarse status string per task. This module maps
//! it onto an explicit finite-state machine, derives a bounded progress
//! value from the state alone, and derives a human-readable ETA from the
//! progress alone.

use serde::Serialize;

use crate::record::RecordStatus;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Assumed wall-clock duration of a full task, used only for ETA display.
pub const FULL_CYCLE_SECS: u32 = 120;

/// ETA sentinel for a task that completed successfully.
pub const ETA_COMPLETED: &str = "completed";

/// ETA sentinel for a task that failed.
pub const ETA_FAILED: &str = "failed";

/// ETA shown when the processor reports a status we do not recognise.
pub const ETA_UNKNOWN: &str = "unknown";

// ---------------------------------------------------------------------------
// TaskState
// ---------------------------------------------------------------------------

/// Normalized lifecycle state of an external task.
///
/// `Unknown` covers any raw status outside the processor's documented
/// vocabulary. It reports zero progress like `Failed`, but is kept distinct
/// so callers never mistake an unrecognised status for a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskState {
    Pending,
    Running,
    Finished,
    Failed,
    Unknown,
}

impl TaskState {
    /// Map a raw processor status onto a state. Never fails.
    pub fn from_raw(raw: &str) -> Self {
        match raw {
            "pending" => Self::Pending,
            "running" => Self::Running,
            "finished" => Self::Finished,
            "failed" => Self::Failed,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Finished => "finished",
            Self::Failed => "failed",
            Self::Unknown => "unknown",
        }
    }

    /// Progress percentage implied by this state.
    pub fn progress(self) -> u8 {
        match self {
            Self::Pending => 5,
            Self::Running => 50,
            Self::Finished => 100,
            Self::Failed | Self::Unknown => 0,
        }
    }

    /// `finished` and `failed` accept no further transitions.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Finished | Self::Failed)
    }

    /// Whether a task observed in `self` may next be observed in `next`.
    ///
    /// Re-observing the same state is always allowed. `Unknown` is never a
    /// valid transition target or source.
    pub fn can_transition_to(self, next: Self) -> bool {
        use TaskState::*;
        match (self, next) {
            (Unknown, _) | (_, Unknown) => false,
            (a, b) if a == b => true,
            (Pending, Running | Finished | Failed) => true,
            (Running, Finished | Failed) => true,
            _ => false,
        }
    }

    /// Non-terminal states from which a task may move into `self`.
    pub fn live_predecessors(self) -> Vec<TaskState> {
        [Self::Pending, Self::Running]
            .into_iter()
            .filter(|from| from.can_transition_to(self))
            .collect()
    }

    /// The persisted record status this state projects to, if any.
    pub fn record_status(self) -> Option<RecordStatus> {
        match self {
            Self::Pending => Some(RecordStatus::Pending),
            Self::Running => Some(RecordStatus::Processing),
            Self::Finished => Some(RecordStatus::Success),
            Self::Failed => Some(RecordStatus::Failed),
            Self::Unknown => None,
        }
    }

    /// ETA for this state. Identical to [`eta_for_progress`] except that
    /// `Unknown` reports [`ETA_UNKNOWN`] instead of the failure sentinel.
    pub fn eta(self) -> String {
        match self {
            Self::Unknown => ETA_UNKNOWN.to_string(),
            known => eta_for_progress(known.progress()),
        }
    }
}

impl std::fmt::Display for TaskState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ETA
// ---------------------------------------------------------------------------

/// Seconds left under the fixed full-cycle model.
pub fn remaining_secs(progress: u8) -> u32 {
    let progress = u32::from(progress.min(100));
    (100 - progress) * FULL_CYCLE_SECS / 100
}

/// Human-readable ETA derived purely from `progress`.
///
/// - `>= 100` yields [`ETA_COMPLETED`]
/// - `0` yields [`ETA_FAILED`]
/// - otherwise `"N seconds"` below one minute, else `"M minutes S seconds"`
pub fn eta_for_progress(progress: u8) -> String {
    if progress >= 100 {
        return ETA_COMPLETED.to_string();
    }
    if progress == 0 {
        return ETA_FAILED.to_string();
    }

    let secs = remaining_secs(progress);
    if secs < 60 {
        format!("{secs} seconds")
    } else {
        format!("{} minutes {} seconds", secs / 60, secs % 60)
    }
}

// ---------------------------------------------------------------------------
// Projection
// ---------------------------------------------------------------------------

/// What a client sees for one poll of an external task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskProjection {
    pub state: TaskState,
    pub progress: u8,
    pub estimated_time: String,
}

impl TaskProjection {
    /// Project a raw processor status. Progress depends on nothing else.
    pub fn from_raw_status(raw: &str) -> Self {
        let state = TaskState::from_raw(raw);
        Self {
            state,
            progress: state.progress(),
            estimated_time: state.eta(),
        }
    }
}
