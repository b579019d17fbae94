//! Validated workout settings.
//!
//! Every write clamps the value to its documented bounds; reads never
//! re-validate. A write that would leave `max_acceleration_secs` below
//! `min_acceleration_secs` repairs the invariant by moving the other bound,
//! so `max >= min` holds after every update. Out-of-range values are never
//! surfaced as errors.

use serde::{Deserialize, Serialize};

const PREPARATION_BOUNDS: (u32, u32) = (0, 30);
const WORK_BOUNDS: (u32, u32) = (5, 3600);
const REST_BOUNDS: (u32, u32) = (0, 1800);
const ROUNDS_BOUNDS: (u32, u32) = (1, 100);
const MIN_ACCELERATION_BOUNDS: (u32, u32) = (2, 10);
const MAX_ACCELERATION_CEILING: u32 = 20;
const PER_MINUTE_BOUNDS: (u32, u32) = (3, 6);

fn clamp(value: u32, (lo, hi): (u32, u32)) -> u32 {
    value.max(lo).min(hi)
}

/// One workout's configuration. All durations are whole seconds.
///
/// Fields are private so that every mutation goes through a clamping setter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WorkoutSettings {
    preparation_secs: u32,
    work_secs: u32,
    rest_secs: u32,
    rounds: u32,
    accelerations_enabled: bool,
    min_acceleration_secs: u32,
    max_acceleration_secs: u32,
    accelerations_per_minute: u32,
}

impl Default for WorkoutSettings {
    fn default() -> Self {
        Self {
            preparation_secs: 10,
            work_secs: 120,
            rest_secs: 60,
            rounds: 4,
            accelerations_enabled: false,
            min_acceleration_secs: 2,
            max_acceleration_secs: 15,
            accelerations_per_minute: 4,
        }
    }
}

impl WorkoutSettings {
    // ── Reads ────────────────────────────────────────────────────────

    pub fn preparation_secs(&self) -> u32 {
        self.preparation_secs
    }

    pub fn work_secs(&self) -> u32 {
        self.work_secs
    }

    pub fn rest_secs(&self) -> u32 {
        self.rest_secs
    }

    pub fn rounds(&self) -> u32 {
        self.rounds
    }

    pub fn accelerations_enabled(&self) -> bool {
        self.accelerations_enabled
    }

    pub fn min_acceleration_secs(&self) -> u32 {
        self.min_acceleration_secs
    }

    pub fn max_acceleration_secs(&self) -> u32 {
        self.max_acceleration_secs
    }

    pub fn accelerations_per_minute(&self) -> u32 {
        self.accelerations_per_minute
    }

    // ── Writes (clamping) ────────────────────────────────────────────

    pub fn set_preparation_secs(&mut self, secs: u32) {
        self.preparation_secs = clamp(secs, PREPARATION_BOUNDS);
    }

    pub fn set_work_secs(&mut self, secs: u32) {
        self.work_secs = clamp(secs, WORK_BOUNDS);
    }

    pub fn set_rest_secs(&mut self, secs: u32) {
        self.rest_secs = clamp(secs, REST_BOUNDS);
    }

    pub fn set_rounds(&mut self, rounds: u32) {
        self.rounds = clamp(rounds, ROUNDS_BOUNDS);
    }

    pub fn set_accelerations_enabled(&mut self, enabled: bool) {
        self.accelerations_enabled = enabled;
    }

    /// Raising the minimum above the current maximum drags the maximum up
    /// with it.
    pub fn set_min_acceleration_secs(&mut self, secs: u32) {
        let min = clamp(secs, MIN_ACCELERATION_BOUNDS);
        self.min_acceleration_secs = min;
        if self.max_acceleration_secs < min {
            self.max_acceleration_secs = min;
        }
    }

    /// The maximum never drops below the current minimum.
    pub fn set_max_acceleration_secs(&mut self, secs: u32) {
        self.max_acceleration_secs = secs
            .min(MAX_ACCELERATION_CEILING)
            .max(self.min_acceleration_secs);
    }

    pub fn set_accelerations_per_minute(&mut self, count: u32) {
        self.accelerations_per_minute = clamp(count, PER_MINUTE_BOUNDS);
    }

    /// Apply a partial update. Each present field goes through its clamping
    /// setter; the minimum is applied before the maximum so an update that
    /// moves both lands with `max >= min`.
    pub fn apply(&mut self, patch: &SettingsPatch) {
        if let Some(secs) = patch.preparation_secs {
            self.set_preparation_secs(secs);
        }
        if let Some(secs) = patch.work_secs {
            self.set_work_secs(secs);
        }
        if let Some(secs) = patch.rest_secs {
            self.set_rest_secs(secs);
        }
        if let Some(rounds) = patch.rounds {
            self.set_rounds(rounds);
        }
        if let Some(enabled) = patch.accelerations_enabled {
            self.set_accelerations_enabled(enabled);
        }
        if let Some(secs) = patch.min_acceleration_secs {
            self.set_min_acceleration_secs(secs);
        }
        if let Some(secs) = patch.max_acceleration_secs {
            self.set_max_acceleration_secs(secs);
        }
        if let Some(count) = patch.accelerations_per_minute {
            self.set_accelerations_per_minute(count);
        }
    }
}

/// Partial settings update; `None` fields are left untouched.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SettingsPatch {
    pub preparation_secs: Option<u32>,
    pub work_secs: Option<u32>,
    pub rest_secs: Option<u32>,
    pub rounds: Option<u32>,
    pub accelerations_enabled: Option<bool>,
    pub min_acceleration_secs: Option<u32>,
    pub max_acceleration_secs: Option<u32>,
    pub accelerations_per_minute: Option<u32>,
}
