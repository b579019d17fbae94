//! # Roundbell Core Library
//!
//! Core business logic for the Roundbell interval-workout timer. All
//! operations are available through this library; the CLI binary is a thin
//! host that owns the clock and the terminal.
//!
//! ## Architecture
//!
//! - **Timer Engine**: a tick-driven phase state machine
//!   (preparation → work → rest). It owns no clock; the host calls `tick()`
//!   once per second while the timer is running.
//! - **Acceleration Generator**: bounded-best-effort random placement of
//!   "accelerate!" sub-intervals inside each work phase.
//! - **Storage**: TOML-based settings persistence.
//! - **Host boundaries**: audio cues and screen-keep-awake are reached
//!   through the [`CueSink`] and [`KeepAwake`] traits; both are best-effort
//!   and can never affect timer correctness.
//!
//! ## Key Components
//!
//! - [`WorkoutTimer`]: the phase state machine
//! - [`WorkoutSettings`]: clamp-on-write configuration values
//! - [`Config`]: persisted settings blob
//! - [`Event`]: every state change produces one

pub mod acceleration;
pub mod cue;
pub mod error;
pub mod events;
pub mod settings;
pub mod storage;
pub mod timer;
pub mod wake;

pub use acceleration::AccelerationInterval;
pub use cue::{Cue, CueSink, NullSink};
pub use error::{ConfigError, CoreError};
pub use events::Event;
pub use settings::{SettingsPatch, WorkoutSettings};
pub use storage::Config;
pub use timer::{format_clock, Phase, WorkoutTimer};
pub use wake::{KeepAwake, NoopKeepAwake};
