//! Bounded-HP arithmetic: marginal (proportional) change, equilibrium
//! solving, and linear time-to-target projection.
//!
//! Health points live in `[MIN_HP, max_hp]` where `max_hp` depends on the
//! person's experience level. Net change per day is the sum of a *linear*
//! component (flat factor and module contributions) and a *marginal*
//! component expressed as percentages of the remaining range:
//! recuperation acts on the headroom toward `max_hp`, decay on the depth
//! above `MIN_HP`.

use crate::constants::{MIN_HP, SECONDS_PER_DAY};

/// Maximum HP for a person at the given experience level.
pub fn max_hp(base_max_hp: f64, hp_per_level: f64, experience_level: u8) -> f64 {
    base_max_hp + hp_per_level * f64::from(experience_level)
}

/// Clamp an HP value into the valid range.
pub fn clamp_hp(hp: f64, max_hp: f64) -> f64 {
    hp.clamp(MIN_HP, max_hp)
}

/// Health as a fraction of the full range, 0.0 (floor) to 1.0 (full).
pub fn health_fraction(hp: f64, max_hp: f64) -> f64 {
    if max_hp <= MIN_HP {
        return 0.0;
    }
    (hp - MIN_HP) / (max_hp - MIN_HP)
}

/// Marginal HP change per day at the given HP level.
///
/// `marginal_positive` and `marginal_negative` are percentages per day:
/// `(max_hp − hp) × pos% − (hp − MIN_HP) × neg%`.
pub fn marginal_change(hp: f64, max_hp: f64, marginal_positive: f64, marginal_negative: f64) -> f64 {
    (max_hp - hp) * (marginal_positive / 100.0) - (hp - MIN_HP) * (marginal_negative / 100.0)
}

/// HP level at which marginal recuperation balances marginal decay plus the
/// flat (linear) change. Returns 0 when no finite equilibrium exists, i.e.
/// when `marginal_positive ≤ marginal_negative` (the drift is monotonic).
pub fn balance_hp(
    max_hp: f64,
    linear_change: f64,
    marginal_positive: f64,
    marginal_negative: f64,
) -> f64 {
    if marginal_positive <= marginal_negative {
        return 0.0;
    }
    (max_hp * marginal_positive + linear_change * 100.0) / (marginal_positive - marginal_negative)
}

/// Seconds until `hp` reaches `target` at a constant `change_per_day`.
///
/// Returns NaN (the "never" sentinel) when the rate is zero or the target
/// lies behind the current drift direction. The projection is linear: it
/// freezes the marginal term at its current value rather than integrating
/// its curvature, so estimates are approximate when marginal effects
/// dominate.
pub fn time_to_value(hp: f64, target: f64, change_per_day: f64) -> f64 {
    if change_per_day == 0.0 {
        return f64::NAN;
    }
    let days = (target - hp) / change_per_day;
    if days < 0.0 {
        return f64::NAN;
    }
    days * SECONDS_PER_DAY
}

/// True if a `time_to_value` result is the "never" sentinel.
pub fn is_never(time: f64) -> bool {
    time.is_nan()
}
