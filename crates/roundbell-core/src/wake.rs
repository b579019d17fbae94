//! Screen-keep-awake boundary.
//!
//! Enabled while a workout is running, disabled otherwise. Like the cue
//! sink, implementations are best-effort: a platform without the facility
//! (or one that fails to acquire it) must not disturb the timer.

/// Keeps the display awake while a workout is running.
pub trait KeepAwake {
    fn enable(&mut self);
    fn disable(&mut self);
}

/// No-op implementation for hosts without a wake-lock facility.
#[derive(Debug, Default)]
pub struct NoopKeepAwake;

impl KeepAwake for NoopKeepAwake {
    fn enable(&mut self) {}
    fn disable(&mut self) {}
}
