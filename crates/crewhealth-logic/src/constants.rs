//! Model constants — day length, HP floor, factor name keys.
//!
//! Tunable rates live in the engine's configuration; these are the fixed
//! quantities the model is defined in terms of.

/// Seconds in one simulated day. All per-day rates are divided by this when
/// an update interval (in seconds) is applied.
pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// Hard floor for health points. MaxHP is per-person (base + per-level).
pub const MIN_HP: f64 = 0.0;

/// Accumulated radiation dose that corresponds to one full application of
/// the configured radiation effect.
pub const DOSE_EFFECT_UNIT: f64 = 1e7;

/// Stable string keys for the health factors. Module contributions reference
/// factors by these names (e.g. an exercise machine multiplying
/// `MICROGRAVITY` by 0.5), so they are part of the data format.
pub mod factor_names {
    pub const ASSIGNED: &str = "Assigned";
    pub const CONFINEMENT: &str = "Confinement";
    pub const LONELINESS: &str = "Loneliness";
    pub const MICROGRAVITY: &str = "Microgravity";
    pub const EVA: &str = "EVA";
    pub const CONNECTED: &str = "Connected";
    pub const HOME: &str = "Home";
    pub const STRESS: &str = "Stress";
    pub const RADIATION: &str = "Radiation";
    /// Wildcard: a module multiplying `ALL` scales every factor.
    pub const ALL: &str = "All";
}
