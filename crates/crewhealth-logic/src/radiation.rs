//! Radiation environment math.
//!
//! Ambient cosmic radiation (solar + galactic, in dose units per day) is
//! scaled by a per-body coefficient for the altitude regime the location is
//! in, then attenuated by hull shielding expressed in halving-thicknesses:
//! each thickness cuts the transmitted dose in half, scaled by a configured
//! shielding efficiency. Accumulated dose above an effect threshold drains
//! HP proportionally to the configured effect strength.

use crate::constants::DOSE_EFFECT_UNIT;
use serde::{Deserialize, Serialize};

/// Altitude regime of a location relative to its celestial body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AltitudeRegime {
    /// Surface and lower atmosphere.
    Surface,
    /// Upper atmosphere.
    Stratosphere,
    /// Low planetary orbit.
    LowOrbit,
    /// High planetary orbit and moons.
    HighOrbit,
    /// Outside any body's sphere of influence.
    Interplanetary,
}

/// Per-body coefficients scaling how much ambient radiation reaches each
/// altitude regime. Loaded once per body, immutable afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegimeCoefficients {
    pub troposphere: f64,
    pub stratosphere: f64,
    pub low_orbit: f64,
    pub high_orbit: f64,
    pub interplanetary: f64,
}

impl RegimeCoefficients {
    pub fn coefficient(&self, regime: AltitudeRegime) -> f64 {
        match regime {
            AltitudeRegime::Surface => self.troposphere,
            AltitudeRegime::Stratosphere => self.stratosphere,
            AltitudeRegime::LowOrbit => self.low_orbit,
            AltitudeRegime::HighOrbit => self.high_orbit,
            AltitudeRegime::Interplanetary => self.interplanetary,
        }
    }
}

impl Default for RegimeCoefficients {
    fn default() -> Self {
        // Dense atmosphere absorbs nearly everything at the surface; the
        // magnetosphere still helps in low orbit.
        Self {
            troposphere: 0.01,
            stratosphere: 0.2,
            low_orbit: 0.5,
            high_orbit: 0.8,
            interplanetary: 1.0,
        }
    }
}

/// Ambient dose per day before any regime scaling: galactic background plus
/// solar output falling off with the square of distance from the star.
pub fn ambient_dose(solar_at_1au: f64, galactic: f64, distance_au: f64) -> f64 {
    let d = distance_au.max(0.01);
    galactic + solar_at_1au / (d * d)
}

/// Fraction of ambient dose that penetrates `shielding` halving-thicknesses
/// at the given efficiency, floored at `min_exposure`.
pub fn exposure(shielding: f64, shielding_effect: f64, min_exposure: f64) -> f64 {
    let raw = 0.5_f64.powf(shielding.max(0.0) * shielding_effect);
    raw.max(min_exposure).min(1.0)
}

/// HP change per day from accumulated dose: zero until the dose crosses
/// `effect_threshold`, then a drain of `effect` percent of MaxHP per
/// [`DOSE_EFFECT_UNIT`] of excess dose.
pub fn dose_change_per_day(dose: f64, effect_threshold: f64, effect: f64, max_hp: f64) -> f64 {
    if dose <= effect_threshold {
        return 0.0;
    }
    -(dose - effect_threshold) / DOSE_EFFECT_UNIT * (effect / 100.0) * max_hp
}
