//! Randomized acceleration-interval placement.
//!
//! Accelerations are short "go harder" sub-intervals placed randomly inside a
//! work phase. Placement is greedy random packing with a hard attempt
//! ceiling: candidates are drawn uniformly and kept only if they fit inside
//! the safe zone without touching an already-accepted interval. Landing short
//! of the target count is accepted output, not an error -- the ceiling bounds
//! worst-case runtime.

use rand::{Rng, SeedableRng};
use rand_pcg::Mcg128Xsl64;
use serde::{Deserialize, Serialize};

/// No acceleration may start in the first or end in the last two seconds of
/// a work phase.
pub const SAFETY_MARGIN_SECS: u32 = 2;

/// Hard ceiling on placement attempts per work phase.
pub const MAX_PLACEMENT_ATTEMPTS: u32 = 100;

/// One acceleration, in seconds relative to the start of the current work
/// phase. `end_secs = start_secs + duration_secs` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccelerationInterval {
    pub start_secs: u32,
    pub duration_secs: u32,
    pub end_secs: u32,
}

impl AccelerationInterval {
    /// Half-open membership: a tick exactly at `end_secs` is outside.
    pub fn contains(&self, elapsed_secs: u32) -> bool {
        elapsed_secs >= self.start_secs && elapsed_secs < self.end_secs
    }

    fn overlaps(&self, other: &AccelerationInterval) -> bool {
        self.start_secs < other.end_secs && other.start_secs < self.end_secs
    }
}

/// Generate a fresh interval set for one work phase, sorted by start time.
///
/// Target count is `per_minute` scaled to the phase length. Work phases
/// shorter than ten seconds (or too narrow a safe zone) yield no intervals.
/// Inverted duration bounds are repaired to `max = min` before any draw.
pub fn generate<R: Rng>(
    work_secs: u32,
    min_duration_secs: u32,
    max_duration_secs: u32,
    per_minute: u32,
    rng: &mut R,
) -> Vec<AccelerationInterval> {
    let max_duration_secs = max_duration_secs.max(min_duration_secs);
    if work_secs < 10 {
        return Vec::new();
    }

    let safe_start = SAFETY_MARGIN_SECS;
    let safe_end = work_secs - SAFETY_MARGIN_SECS;
    if safe_end <= safe_start {
        return Vec::new();
    }

    let target = (per_minute * work_secs / 60) as usize;

    let max_start = match safe_end.checked_sub(min_duration_secs) {
        Some(s) if s >= safe_start => s,
        _ => return Vec::new(),
    };

    let mut intervals: Vec<AccelerationInterval> = Vec::with_capacity(target);
    let mut attempts = 0;
    while intervals.len() < target && attempts < MAX_PLACEMENT_ATTEMPTS {
        attempts += 1;

        let start_secs = rng.gen_range(safe_start..=max_start);
        let duration_secs = rng.gen_range(min_duration_secs..=max_duration_secs);
        let candidate = AccelerationInterval {
            start_secs,
            duration_secs,
            end_secs: start_secs + duration_secs,
        };

        let overlaps = intervals.iter().any(|i| i.overlaps(&candidate));
        if !overlaps && candidate.end_secs <= safe_end {
            intervals.push(candidate);
        }
    }

    intervals.sort_by_key(|i| i.start_secs);
    intervals
}

/// Generate with an explicit seed (`None` = entropy). Used by hosts that
/// want reproducible placement, e.g. for previewing a set.
pub fn generate_with_seed(
    work_secs: u32,
    min_duration_secs: u32,
    max_duration_secs: u32,
    per_minute: u32,
    seed: Option<u64>,
) -> Vec<AccelerationInterval> {
    let mut rng = match seed {
        Some(seed) => Mcg128Xsl64::seed_from_u64(seed),
        None => Mcg128Xsl64::from_entropy(),
    };
    generate(work_secs, min_duration_secs, max_duration_secs, per_minute, &mut rng)
}

/// The acceleration covering `elapsed_secs`, if any.
///
/// Intervals never overlap, so at most one matches; if that invariant were
/// ever violated the first match in sequence order wins.
pub fn find_active(
    intervals: &[AccelerationInterval],
    elapsed_secs: u32,
) -> Option<&AccelerationInterval> {
    intervals.iter().find(|i| i.contains(elapsed_secs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn interval(start_secs: u32, end_secs: u32) -> AccelerationInterval {
        AccelerationInterval {
            start_secs,
            duration_secs: end_secs - start_secs,
            end_secs,
        }
    }

    #[test]
    fn short_work_phase_yields_nothing() {
        let set = generate_with_seed(9, 2, 5, 6, Some(1));
        assert!(set.is_empty());
    }

    #[test]
    fn sub_minute_phase_can_have_zero_target() {
        // floor(3 * 10 / 60) == 0
        let set = generate_with_seed(10, 2, 5, 3, Some(1));
        assert!(set.is_empty());
    }

    #[test]
    fn lookup_boundary_is_half_open() {
        let set = vec![interval(5, 10)];
        assert!(find_active(&set, 4).is_none());
        assert_eq!(find_active(&set, 5), Some(&set[0]));
        assert_eq!(find_active(&set, 9), Some(&set[0]));
        assert!(find_active(&set, 10).is_none());
    }

    #[test]
    fn lookup_returns_first_match_on_overlapping_input() {
        // Violates the generator invariant on purpose; lookup must not care.
        let set = vec![interval(3, 8), interval(5, 12)];
        assert_eq!(find_active(&set, 6), Some(&set[0]));
    }

    #[test]
    fn same_seed_same_set() {
        let a = generate_with_seed(120, 2, 15, 4, Some(42));
        let b = generate_with_seed(120, 2, 15, 4, Some(42));
        assert_eq!(a, b);
        assert!(!a.is_empty());
    }

    #[test]
    fn inverted_duration_bounds_are_repaired() {
        let set = generate_with_seed(120, 10, 3, 4, Some(5));
        assert!(!set.is_empty());
        for i in &set {
            assert_eq!(i.duration_secs, 10);
        }
    }

    #[test]
    fn output_is_sorted_by_start() {
        let set = generate_with_seed(300, 2, 10, 6, Some(7));
        for pair in set.windows(2) {
            assert!(pair[0].start_secs <= pair[1].start_secs);
        }
    }

    proptest! {
        #[test]
        fn generated_sets_hold_all_invariants(
            work_secs in 10u32..=600,
            min in 2u32..=10,
            span in 0u32..=10,
            per_minute in 3u32..=6,
            seed in any::<u64>(),
        ) {
            let max = (min + span).min(20);
            let set = generate_with_seed(work_secs, min, max, per_minute, Some(seed));

            let target = (per_minute * work_secs / 60) as usize;
            prop_assert!(set.len() <= target);

            for i in &set {
                prop_assert_eq!(i.end_secs, i.start_secs + i.duration_secs);
                prop_assert!(i.start_secs >= SAFETY_MARGIN_SECS);
                prop_assert!(i.end_secs <= work_secs - SAFETY_MARGIN_SECS);
                prop_assert!(i.duration_secs >= min);
                prop_assert!(i.duration_secs <= max);
            }

            for (n, a) in set.iter().enumerate() {
                for b in &set[n + 1..] {
                    prop_assert!(!(a.start_secs < b.end_secs && b.start_secs < a.end_secs));
                }
            }
        }
    }
}
