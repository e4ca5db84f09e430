//! Engine configuration: general thresholds, per-factor base rates,
//! radiation environment and training tunables.
//!
//! Loadable from TOML; every field has a default so a partial file (or none
//! at all) yields a playable configuration. The config is passed explicitly
//! into the engine and treated as immutable for the duration of a tick.

use std::collections::BTreeMap;

use crewhealth_logic::condition::Thresholds;
use crewhealth_logic::radiation::RegimeCoefficients;
use crewhealth_logic::training::TrainingParams;
use serde::{Deserialize, Serialize};

/// Error loading or parsing a configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Top-level configuration, loadable from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HealthConfig {
    #[serde(default)]
    pub general: GeneralSettings,
    #[serde(default)]
    pub factors: FactorSettings,
    #[serde(default)]
    pub radiation: RadiationSettings,
    #[serde(default)]
    pub training: TrainingSettings,
    #[serde(default)]
    pub resources: ResourceSettings,
}

impl HealthConfig {
    /// Parse a configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Load a configuration from a TOML file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        Self::from_toml(&std::fs::read_to_string(path)?)
    }

    /// Cross-field validation problems worth logging at load time. The
    /// config is still usable; offending entries are ignored by the engine.
    pub fn validation_errors(&self) -> Vec<String> {
        let mut errors = Vec::new();
        for name in self.resources.shielding.keys() {
            if !self.resources.definitions.contains_key(name) {
                errors.push(format!(
                    "resource shielding references undefined resource {name:?}"
                ));
            }
        }
        if self.general.exhaustion_end < self.general.exhaustion_start {
            errors.push(format!(
                "exhaustion_end ({}) must be >= exhaustion_start ({})",
                self.general.exhaustion_end, self.general.exhaustion_start
            ));
        }
        errors
    }
}

/// Pool sizing, condition thresholds and alerting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralSettings {
    /// Max HP for a level-0 crew member.
    #[serde(default = "default_base_max_hp")]
    pub base_max_hp: f64,
    /// Extra max HP per experience level.
    #[serde(default = "default_hp_per_level")]
    pub hp_per_level: f64,
    /// When false, HP clamps at the floor instead of killing anyone.
    #[serde(default = "default_true")]
    pub death_enabled: bool,
    /// Death threshold as a fraction of MaxHP.
    #[serde(default)]
    pub death_threshold: f64,
    /// Fraction of MaxHP at which an OK person becomes exhausted.
    #[serde(default = "default_exhaustion_start")]
    pub exhaustion_start: f64,
    /// Fraction of MaxHP at which an exhausted person revives.
    #[serde(default = "default_exhaustion_end")]
    pub exhaustion_end: f64,
    /// Health fraction below which a one-time low-health alert fires.
    #[serde(default = "default_low_health_alert")]
    pub low_health_alert: f64,
    /// Name of the home body (used by the Home factor and decontamination).
    #[serde(default = "default_home_body")]
    pub home_body: String,
    /// Role label applied while a person is exhausted.
    #[serde(default = "default_exhausted_role")]
    pub exhausted_role: String,
}

impl GeneralSettings {
    pub fn thresholds(&self) -> Thresholds {
        Thresholds {
            exhaustion_start: self.exhaustion_start,
            exhaustion_end: self.exhaustion_end,
            death: self.death_threshold,
        }
    }
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            base_max_hp: default_base_max_hp(),
            hp_per_level: default_hp_per_level(),
            death_enabled: true,
            death_threshold: 0.0,
            exhaustion_start: default_exhaustion_start(),
            exhaustion_end: default_exhaustion_end(),
            low_health_alert: default_low_health_alert(),
            home_body: default_home_body(),
            exhausted_role: default_exhausted_role(),
        }
    }
}

/// Base HP change per day for each factor. Negative values drain health.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FactorSettings {
    #[serde(default = "default_assigned")]
    pub assigned: f64,
    #[serde(default = "default_confinement")]
    pub confinement: f64,
    #[serde(default = "default_loneliness")]
    pub loneliness: f64,
    /// Loneliness applies while the crew count is below this.
    #[serde(default = "default_loneliness_threshold")]
    pub loneliness_crew_threshold: u32,
    #[serde(default = "default_microgravity")]
    pub microgravity: f64,
    #[serde(default = "default_eva")]
    pub eva: f64,
    #[serde(default = "default_connected")]
    pub connected: f64,
    #[serde(default = "default_home")]
    pub home: f64,
    #[serde(default = "default_stress")]
    pub stress: f64,
    /// Flat change per day while idle at the base facility.
    #[serde(default = "default_base_facility")]
    pub base_facility: f64,
}

impl Default for FactorSettings {
    fn default() -> Self {
        Self {
            assigned: default_assigned(),
            confinement: default_confinement(),
            loneliness: default_loneliness(),
            loneliness_crew_threshold: default_loneliness_threshold(),
            microgravity: default_microgravity(),
            eva: default_eva(),
            connected: default_connected(),
            home: default_home(),
            stress: default_stress(),
            base_facility: default_base_facility(),
        }
    }
}

/// Radiation model tunables plus per-body regime coefficients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RadiationSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Percent of MaxHP drained per day per 1e7 accumulated dose above the
    /// effect threshold.
    #[serde(default = "default_radiation_effect")]
    pub effect: f64,
    /// Accumulated dose below this has no health effect.
    #[serde(default = "default_effect_threshold")]
    pub effect_threshold: f64,
    /// Attenuation efficiency per halving-thickness of shielding.
    #[serde(default = "default_shielding_effect")]
    pub shielding_effect: f64,
    /// Exposure never drops below this fraction, however thick the hull.
    #[serde(default = "default_min_exposure")]
    pub min_exposure: f64,
    /// Ambient dose multiplier while on EVA (no hull at all).
    #[serde(default = "default_eva_exposure")]
    pub eva_exposure: f64,
    /// Solar radiation at 1 AU, dose units per day.
    #[serde(default = "default_solar")]
    pub solar: f64,
    /// Galactic cosmic background, dose units per day.
    #[serde(default = "default_galactic")]
    pub galactic: f64,
    /// Dose removed per day of decontamination at the base facility.
    #[serde(default = "default_decontamination_rate")]
    pub decontamination_rate: f64,
    /// Per-body regime coefficients; bodies not listed use the defaults.
    #[serde(default = "default_bodies")]
    pub bodies: BTreeMap<String, RegimeCoefficients>,
}

impl RadiationSettings {
    /// Coefficients for a body, falling back to defaults for unknown names.
    pub fn body_coefficients(&self, body: &str) -> RegimeCoefficients {
        self.bodies
            .get(body)
            .copied()
            .unwrap_or_default()
    }
}

impl Default for RadiationSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            effect: default_radiation_effect(),
            effect_threshold: default_effect_threshold(),
            shielding_effect: default_shielding_effect(),
            min_exposure: default_min_exposure(),
            eva_exposure: default_eva_exposure(),
            solar: default_solar(),
            galactic: default_galactic(),
            decontamination_rate: default_decontamination_rate(),
            bodies: default_bodies(),
        }
    }
}

/// Training accrual tunables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Completion ceiling per module, 0..1.
    #[serde(default = "default_training_cap")]
    pub cap: f64,
    /// Completion gained per day on a complexity-1 module.
    #[serde(default = "default_training_rate")]
    pub rate_per_day: f64,
}

impl TrainingSettings {
    pub fn params(&self) -> TrainingParams {
        TrainingParams {
            cap: self.cap,
            rate_per_day: self.rate_per_day,
        }
    }
}

impl Default for TrainingSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            cap: default_training_cap(),
            rate_per_day: default_training_rate(),
        }
    }
}

/// Known consumable resources and the shielding some of them provide.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceSettings {
    /// Resource name → physical properties. Modules drawing a resource not
    /// listed here are logged at registration and draw nothing.
    #[serde(default = "default_resource_definitions")]
    pub definitions: BTreeMap<String, ResourceDefinition>,
    /// Resource name → shielding halving-thicknesses per ton of stored
    /// resource. Names must also appear in `definitions`.
    #[serde(default = "default_resource_shielding")]
    pub shielding: BTreeMap<String, f64>,
}

impl ResourceSettings {
    pub fn is_known(&self, name: &str) -> bool {
        self.definitions.contains_key(name)
    }

    /// Shielding per stored unit of a resource, if it both shields and is a
    /// known resource.
    pub fn shielding_per_unit(&self, name: &str) -> Option<f64> {
        let per_ton = self.shielding.get(name)?;
        let def = self.definitions.get(name)?;
        Some(per_ton * def.density)
    }
}

impl Default for ResourceSettings {
    fn default() -> Self {
        Self {
            definitions: default_resource_definitions(),
            shielding: default_resource_shielding(),
        }
    }
}

/// Physical properties of a consumable resource.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ResourceDefinition {
    /// Tons per stored unit.
    pub density: f64,
}

fn default_true() -> bool {
    true
}
fn default_base_max_hp() -> f64 {
    100.0
}
fn default_hp_per_level() -> f64 {
    10.0
}
fn default_exhaustion_start() -> f64 {
    0.2
}
fn default_exhaustion_end() -> f64 {
    0.25
}
fn default_low_health_alert() -> f64 {
    0.3
}
fn default_home_body() -> String {
    "Earth".to_string()
}
fn default_exhausted_role() -> String {
    "Passenger".to_string()
}
fn default_assigned() -> f64 {
    -0.5
}
fn default_confinement() -> f64 {
    -3.0
}
fn default_loneliness() -> f64 {
    -1.0
}
fn default_loneliness_threshold() -> u32 {
    2
}
fn default_microgravity() -> f64 {
    -1.0
}
fn default_eva() -> f64 {
    -10.0
}
fn default_connected() -> f64 {
    0.5
}
fn default_home() -> f64 {
    2.0
}
fn default_stress() -> f64 {
    -2.0
}
fn default_base_facility() -> f64 {
    1.0
}
fn default_radiation_effect() -> f64 {
    10.0
}
fn default_effect_threshold() -> f64 {
    10_000.0
}
fn default_shielding_effect() -> f64 {
    0.25
}
fn default_min_exposure() -> f64 {
    0.05
}
fn default_eva_exposure() -> f64 {
    5.0
}
fn default_solar() -> f64 {
    2_500.0
}
fn default_galactic() -> f64 {
    12_500.0
}
fn default_decontamination_rate() -> f64 {
    100_000.0
}
fn default_training_cap() -> f64 {
    0.75
}
fn default_training_rate() -> f64 {
    0.25
}
fn default_bodies() -> BTreeMap<String, RegimeCoefficients> {
    let mut bodies = BTreeMap::new();
    bodies.insert("Earth".to_string(), RegimeCoefficients::default());
    bodies
}
fn default_resource_definitions() -> BTreeMap<String, ResourceDefinition> {
    let mut defs = BTreeMap::new();
    defs.insert("ElectricCharge".to_string(), ResourceDefinition { density: 0.0 });
    defs.insert("Water".to_string(), ResourceDefinition { density: 1.0 });
    defs
}
fn default_resource_shielding() -> BTreeMap<String, f64> {
    let mut shielding = BTreeMap::new();
    shielding.insert("Water".to_string(), 0.1);
    shielding
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_consistent() {
        let config = HealthConfig::default();
        assert!(config.validation_errors().is_empty());
        assert!(config.general.exhaustion_end >= config.general.exhaustion_start);
    }

    #[test]
    fn empty_toml_uses_defaults() {
        let config = HealthConfig::from_toml("").unwrap();
        assert!((config.general.base_max_hp - 100.0).abs() < f64::EPSILON);
        assert!(config.general.death_enabled);
    }

    #[test]
    fn partial_toml_overrides() {
        let config = HealthConfig::from_toml(
            r#"
            [general]
            death_enabled = false
            base_max_hp = 80.0

            [factors]
            confinement = -5.0
            "#,
        )
        .unwrap();
        assert!(!config.general.death_enabled);
        assert!((config.general.base_max_hp - 80.0).abs() < f64::EPSILON);
        assert!((config.factors.confinement + 5.0).abs() < f64::EPSILON);
        // untouched groups keep defaults
        assert!((config.factors.stress + 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn unknown_shielding_resource_is_flagged() {
        let mut config = HealthConfig::default();
        config
            .resources
            .shielding
            .insert("Unobtainium".to_string(), 1.0);
        assert_eq!(config.validation_errors().len(), 1);
    }

    #[test]
    fn shielding_per_unit_uses_density() {
        let config = HealthConfig::default();
        let per_unit = config.resources.shielding_per_unit("Water").unwrap();
        assert!((per_unit - 0.1).abs() < 1e-12);
        assert!(config.resources.shielding_per_unit("ElectricCharge").is_none());
    }

    #[test]
    fn unknown_body_falls_back_to_defaults() {
        let config = HealthConfig::default();
        let coeffs = config.radiation.body_coefficients("Mars");
        assert!((coeffs.interplanetary - 1.0).abs() < f64::EPSILON);
    }
}
