//! Health condition state machine.
//!
//! OK ⇄ Exhausted with hysteresis, OK/Exhausted → Dead (terminal). The
//! Exhausted variant stashes the role the person held when they broke down,
//! so the exact role is restored on revival. Thresholds are fractions of the
//! person's MaxHP; configuration must keep
//! `exhaustion_end ≥ exhaustion_start` for the hysteresis to make sense
//! (documented precondition, not enforced here).

use serde::{Deserialize, Serialize};

/// Current health condition of a tracked person.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Condition {
    /// Healthy enough to work.
    Ok,
    /// Below the exhaustion threshold; treated as a non-working passenger
    /// until recovered. Carries the role held before breaking down.
    Exhausted { prior_role: String },
    /// Terminal. A dead record is never updated again.
    Dead,
}

impl Condition {
    pub fn is_dead(&self) -> bool {
        matches!(self, Condition::Dead)
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self, Condition::Exhausted { .. })
    }
}

/// Condition thresholds as fractions of MaxHP.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Thresholds {
    /// At or below this fraction an OK person becomes Exhausted.
    pub exhaustion_start: f64,
    /// At or above this fraction an Exhausted person revives.
    pub exhaustion_end: f64,
    /// At or below this fraction the person dies (when death is enabled).
    pub death: f64,
}

/// A condition transition that occurred during evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Transition {
    Exhausted,
    Revived { restored_role: String },
    Died,
}

/// Evaluate condition transitions for the given HP level.
///
/// Checks run in priority order: death first, then OK→Exhausted, then
/// Exhausted→OK. `role` is the person's current working role, stashed if
/// they become exhausted. Returns the new condition and the transition that
/// fired, if any. A `Dead` condition never changes.
pub fn evaluate(
    condition: &Condition,
    hp: f64,
    max_hp: f64,
    thresholds: &Thresholds,
    death_enabled: bool,
    role: &str,
) -> (Condition, Option<Transition>) {
    if condition.is_dead() {
        return (Condition::Dead, None);
    }
    if death_enabled && hp <= thresholds.death * max_hp {
        return (Condition::Dead, Some(Transition::Died));
    }
    match condition {
        Condition::Ok if hp <= thresholds.exhaustion_start * max_hp => (
            Condition::Exhausted {
                prior_role: role.to_string(),
            },
            Some(Transition::Exhausted),
        ),
        Condition::Exhausted { prior_role } if hp >= thresholds.exhaustion_end * max_hp => (
            Condition::Ok,
            Some(Transition::Revived {
                restored_role: prior_role.clone(),
            }),
        ),
        other => (other.clone(), None),
    }
}

/// The next HP threshold this person will cross given the sign of their
/// current net change, or NaN if none applies (e.g. already dead).
pub fn next_threshold_hp(
    condition: &Condition,
    change_per_day: f64,
    max_hp: f64,
    thresholds: &Thresholds,
) -> f64 {
    if change_per_day > 0.0 {
        return match condition {
            Condition::Ok => max_hp,
            Condition::Exhausted { .. } => thresholds.exhaustion_end * max_hp,
            Condition::Dead => f64::NAN,
        };
    }
    match condition {
        Condition::Ok => thresholds.exhaustion_start * max_hp,
        Condition::Exhausted { .. } => thresholds.death * max_hp,
        Condition::Dead => f64::NAN,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn thresholds() -> Thresholds {
        Thresholds {
            exhaustion_start: 0.2,
            exhaustion_end: 0.25,
            death: 0.0,
        }
    }

    #[test]
    fn ok_stays_ok_above_threshold() {
        let (c, t) = evaluate(&Condition::Ok, 50.0, 100.0, &thresholds(), true, "Pilot");
        assert_eq!(c, Condition::Ok);
        assert!(t.is_none());
    }

    #[test]
    fn ok_becomes_exhausted_and_stashes_role() {
        let (c, t) = evaluate(&Condition::Ok, 19.9, 100.0, &thresholds(), true, "Pilot");
        assert_eq!(
            c,
            Condition::Exhausted {
                prior_role: "Pilot".into()
            }
        );
        assert_eq!(t, Some(Transition::Exhausted));
    }

    #[test]
    fn exhausted_holds_in_hysteresis_band() {
        // between start (20) and end (25): no transition either way
        let exhausted = Condition::Exhausted {
            prior_role: "Pilot".into(),
        };
        let (c, t) = evaluate(&exhausted, 22.0, 100.0, &thresholds(), true, "Tourist");
        assert!(c.is_exhausted());
        assert!(t.is_none());
    }

    #[test]
    fn exhausted_revives_with_original_role() {
        let exhausted = Condition::Exhausted {
            prior_role: "Engineer".into(),
        };
        let (c, t) = evaluate(&exhausted, 25.0, 100.0, &thresholds(), true, "Tourist");
        assert_eq!(c, Condition::Ok);
        assert_eq!(
            t,
            Some(Transition::Revived {
                restored_role: "Engineer".into()
            })
        );
    }

    #[test]
    fn death_takes_priority() {
        let (c, t) = evaluate(&Condition::Ok, 0.0, 100.0, &thresholds(), true, "Pilot");
        assert_eq!(c, Condition::Dead);
        assert_eq!(t, Some(Transition::Died));
    }

    #[test]
    fn death_disabled_never_dies() {
        let (c, t) = evaluate(&Condition::Ok, 0.0, 100.0, &thresholds(), false, "Pilot");
        // still eligible for exhaustion, just not death
        assert!(c.is_exhausted());
        assert_eq!(t, Some(Transition::Exhausted));
    }

    #[test]
    fn dead_is_terminal() {
        let (c, t) = evaluate(&Condition::Dead, 90.0, 100.0, &thresholds(), true, "Pilot");
        assert_eq!(c, Condition::Dead);
        assert!(t.is_none());
    }

    #[test]
    fn next_threshold_follows_drift() {
        let th = thresholds();
        let ok = Condition::Ok;
        let exhausted = Condition::Exhausted {
            prior_role: "Pilot".into(),
        };
        assert!((next_threshold_hp(&ok, 1.0, 100.0, &th) - 100.0).abs() < f64::EPSILON);
        assert!((next_threshold_hp(&ok, -1.0, 100.0, &th) - 20.0).abs() < f64::EPSILON);
        assert!((next_threshold_hp(&exhausted, 1.0, 100.0, &th) - 25.0).abs() < f64::EPSILON);
        assert!((next_threshold_hp(&exhausted, -1.0, 100.0, &th)).abs() < f64::EPSILON);
        assert!(next_threshold_hp(&Condition::Dead, 1.0, 100.0, &th).is_nan());
    }
}
