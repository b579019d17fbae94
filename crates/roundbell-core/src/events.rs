use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::acceleration::AccelerationInterval;
use crate::timer::Phase;

/// Every state change in the engine produces an Event.
/// The host renders them and forwards cue-worthy ones to its audio sink
/// (see [`crate::cue::Cue::for_event`]).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    TimerStarted {
        phase: Phase,
        round: u32,
        remaining_secs: u32,
        at: DateTime<Utc>,
    },
    TimerPaused {
        phase: Phase,
        remaining_secs: u32,
        at: DateTime<Utc>,
    },
    TimerReset {
        at: DateTime<Utc>,
    },
    /// A phase began; for work phases this is the moment accelerations were
    /// regenerated.
    PhaseStarted {
        phase: Phase,
        round: u32,
        duration_secs: u32,
        at: DateTime<Utc>,
    },
    PhaseCompleted {
        phase: Phase,
        round: u32,
        at: DateTime<Utc>,
    },
    /// The final round's work phase ended; the engine has auto-reset to the
    /// canonical beginning and stopped.
    WorkoutCompleted {
        rounds: u32,
        at: DateTime<Utc>,
    },
    AccelerationStarted {
        interval: AccelerationInterval,
        at: DateTime<Utc>,
    },
    AccelerationEnded {
        at: DateTime<Utc>,
    },
    StateSnapshot {
        phase: Phase,
        elapsed_secs: u32,
        total_secs: u32,
        round: u32,
        rounds: u32,
        is_running: bool,
        workout_completed: bool,
        acceleration_active: bool,
        at: DateTime<Utc>,
    },
}
