//! Audio cue boundary.
//!
//! The core decides *when* a sound belongs; how it is played is host
//! plumbing. Sinks are best-effort: a sink that fails must swallow (and may
//! log) the failure -- the timer keeps advancing regardless.

use serde::{Deserialize, Serialize};

use crate::events::Event;
use crate::timer::Phase;

/// Discrete cue names understood by the audio collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Cue {
    WorkStart,
    WorkEnd,
    AccelerationStart,
    AccelerationEnd,
}

impl Cue {
    /// The cue a single engine event calls for, if any.
    ///
    /// Entering a work phase rings the start bell, leaving one rings the end
    /// bell; preparation and rest boundaries are silent on their own.
    pub fn for_event(event: &Event) -> Option<Cue> {
        match event {
            Event::PhaseStarted {
                phase: Phase::Work, ..
            } => Some(Cue::WorkStart),
            Event::PhaseCompleted {
                phase: Phase::Work, ..
            } => Some(Cue::WorkEnd),
            Event::AccelerationStarted { .. } => Some(Cue::AccelerationStart),
            Event::AccelerationEnded { .. } => Some(Cue::AccelerationEnd),
            _ => None,
        }
    }
}

/// Plays workout cues.
pub trait CueSink {
    fn play(&mut self, cue: Cue);
}

/// Sink that discards every cue, for headless hosts and tests.
#[derive(Debug, Default)]
pub struct NullSink;

impl CueSink for NullSink {
    fn play(&mut self, _cue: Cue) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn work_boundaries_map_to_bells() {
        let started = Event::PhaseStarted {
            phase: Phase::Work,
            round: 1,
            duration_secs: 120,
            at: Utc::now(),
        };
        let completed = Event::PhaseCompleted {
            phase: Phase::Work,
            round: 1,
            at: Utc::now(),
        };
        assert_eq!(Cue::for_event(&started), Some(Cue::WorkStart));
        assert_eq!(Cue::for_event(&completed), Some(Cue::WorkEnd));
    }

    #[test]
    fn rest_and_preparation_boundaries_are_silent() {
        for phase in [Phase::Preparation, Phase::Rest] {
            let started = Event::PhaseStarted {
                phase,
                round: 1,
                duration_secs: 10,
                at: Utc::now(),
            };
            assert_eq!(Cue::for_event(&started), None);
        }
    }

    #[test]
    fn acceleration_edges_map_to_cues() {
        let ended = Event::AccelerationEnded { at: Utc::now() };
        assert_eq!(Cue::for_event(&ended), Some(Cue::AccelerationEnd));
    }

    #[test]
    fn null_sink_accepts_every_cue() {
        // A headless host wires the discarding sink through the trait.
        let mut sink: Box<dyn CueSink> = Box::<NullSink>::default();
        for cue in [
            Cue::WorkStart,
            Cue::WorkEnd,
            Cue::AccelerationStart,
            Cue::AccelerationEnd,
        ] {
            sink.play(cue);
        }
    }
}
