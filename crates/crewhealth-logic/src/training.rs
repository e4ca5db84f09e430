//! Training accrual toward per-module familiarity caps.
//!
//! Each trainable module instance has a complexity; time spent training on
//! it accumulates completion toward a configured cap, slower for complex
//! modules. A person's overall training level (what the stress factor
//! reads) is the complexity-weighted average of per-module completion
//! across the modules relevant to their current assignment.

use crate::constants::SECONDS_PER_DAY;
use serde::{Deserialize, Serialize};

/// Tunables for training progression.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TrainingParams {
    /// Completion ceiling per module (also the best reachable overall
    /// training level), 0..1.
    pub cap: f64,
    /// Completion gained per day of training on a complexity-1 module.
    pub rate_per_day: f64,
}

impl Default for TrainingParams {
    fn default() -> Self {
        Self {
            cap: 0.75,
            rate_per_day: 0.25,
        }
    }
}

/// Advance training progress on one module by `seconds` of training time.
/// Complexity divides the accrual rate; progress saturates at the cap.
pub fn accrue(progress: f64, complexity: f64, seconds: f64, params: &TrainingParams) -> f64 {
    if complexity <= 0.0 {
        return progress;
    }
    let gain = params.rate_per_day / complexity * (seconds / SECONDS_PER_DAY);
    (progress + gain).min(params.cap)
}

/// Overall training level from `(completion, complexity)` pairs for the
/// modules relevant to the person's assignment: the complexity-weighted
/// average completion. Zero when nothing relevant is trainable.
pub fn weighted_level<I>(entries: I) -> f64
where
    I: IntoIterator<Item = (f64, f64)>,
{
    let mut weighted = 0.0;
    let mut total = 0.0;
    for (completion, complexity) in entries {
        if complexity <= 0.0 {
            continue;
        }
        weighted += completion * complexity;
        total += complexity;
    }
    if total <= 0.0 {
        return 0.0;
    }
    weighted / total
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accrual_rate_basic() {
        let p = TrainingParams::default();
        // one full day on a complexity-1 module
        let after = accrue(0.0, 1.0, SECONDS_PER_DAY, &p);
        assert!((after - 0.25).abs() < 1e-9);
    }

    #[test]
    fn complexity_slows_accrual() {
        let p = TrainingParams::default();
        let easy = accrue(0.0, 1.0, SECONDS_PER_DAY, &p);
        let hard = accrue(0.0, 2.0, SECONDS_PER_DAY, &p);
        assert!((easy / hard - 2.0).abs() < 1e-9);
    }

    #[test]
    fn accrual_saturates_at_cap() {
        let p = TrainingParams::default();
        let after = accrue(0.7, 1.0, 10.0 * SECONDS_PER_DAY, &p);
        assert!((after - p.cap).abs() < 1e-12);
    }

    #[test]
    fn zero_complexity_is_untrainable() {
        let p = TrainingParams::default();
        assert!((accrue(0.1, 0.0, SECONDS_PER_DAY, &p) - 0.1).abs() < f64::EPSILON);
    }

    #[test]
    fn weighted_level_empty_is_zero() {
        assert!(weighted_level(std::iter::empty()).abs() < f64::EPSILON);
    }

    #[test]
    fn weighted_level_averages_by_complexity() {
        // fully trained on the hard module, untrained on the easy one
        let level = weighted_level([(0.75, 3.0), (0.0, 1.0)]);
        assert!((level - 0.75 * 3.0 / 4.0).abs() < 1e-9);
    }

    #[test]
    fn weighted_level_uniform() {
        let level = weighted_level([(0.5, 1.0), (0.5, 1.0)]);
        assert!((level - 0.5).abs() < 1e-12);
    }
}
