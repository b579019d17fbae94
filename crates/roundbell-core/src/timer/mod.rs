//! Workout timer: a phase state machine driven by an external 1 Hz tick.

mod engine;

pub use engine::{format_clock, Phase, WorkoutTimer};
