//! Location components: vessels/assemblies, the health modules attached to
//! them, resource stores, and crew placement.

use std::collections::BTreeMap;

use crewhealth_logic::constants::factor_names;
use crewhealth_logic::radiation::AltitudeRegime;
use serde::{Deserialize, Serialize};

/// A vessel, station or ship-under-construction: anything that contains
/// modules and crew.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Location {
    /// Stable location identity (the modifier cache key).
    pub id: u32,
    pub name: String,
    /// Celestial body the location is at or around.
    pub body: String,
    pub regime: AltitudeRegime,
    /// Distance from the star, for solar dose falloff.
    pub distance_au: f64,
    pub crew_capacity: u32,
    /// Whether live situation data is available for this location this
    /// tick. Crew aboard an unloaded location fall back to cached changes.
    pub loaded: bool,
    /// Whether the location has a working link home (default connectivity
    /// check; an external provider can override it).
    pub comm_link: bool,
    pub resources: ResourceStore,
}

impl Location {
    pub fn new(id: u32, name: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            body: body.into(),
            regime: AltitudeRegime::LowOrbit,
            distance_au: 1.0,
            crew_capacity: 1,
            loaded: true,
            comm_link: false,
            resources: ResourceStore::default(),
        }
    }

    pub fn with_regime(mut self, regime: AltitudeRegime) -> Self {
        self.regime = regime;
        self
    }

    pub fn with_distance_au(mut self, distance_au: f64) -> Self {
        self.distance_au = distance_au;
        self
    }

    pub fn with_capacity(mut self, capacity: u32) -> Self {
        self.crew_capacity = capacity;
        self
    }

    pub fn with_comm_link(mut self, comm_link: bool) -> Self {
        self.comm_link = comm_link;
        self
    }
}

/// Stored consumables at a location.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceStore {
    amounts: BTreeMap<String, f64>,
}

impl ResourceStore {
    pub fn amount(&self, name: &str) -> f64 {
        self.amounts.get(name).copied().unwrap_or(0.0)
    }

    pub fn add(&mut self, name: impl Into<String>, quantity: f64) {
        *self.amounts.entry(name.into()).or_insert(0.0) += quantity;
    }

    /// Withdraw up to `quantity`, returning what was actually delivered.
    pub fn request(&mut self, name: &str, quantity: f64) -> f64 {
        let Some(stored) = self.amounts.get_mut(name) else {
            return 0.0;
        };
        let delivered = quantity.min(*stored).max(0.0);
        *stored -= delivered;
        delivered
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.amounts.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

/// One part/unit's declared environmental effect on occupants: a habitat
/// module, radiation shield, exercise machine, life-support unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthModule {
    /// Persistent id, stable across vessels — the training-log key.
    pub id: u32,
    pub title: String,
    /// Flat HP change per day for affected occupants.
    pub flat_change: f64,
    /// Recuperation, percent of missing HP per day.
    pub recuperation: f64,
    /// Decay, percent of HP above the floor per day.
    pub decay: f64,
    /// Name of the factor this module multiplies (`All` for every factor).
    pub multiply_factor: String,
    pub multiplier: f64,
    /// Max occupants served at full strength; 0 means unlimited.
    pub crew_cap: u32,
    /// When set, the module only affects crew stationed in it rather than
    /// the whole location.
    pub crew_only: bool,
    /// Living-space points provided.
    pub space: f64,
    /// Radiation shielding in halving-thicknesses.
    pub shielding: f64,
    /// Radioactive emission, dose units per day.
    pub radioactivity: f64,
    /// Consumed resource name.
    pub resource: String,
    /// Flat draw, units per second.
    pub resource_draw: f64,
    /// Additional draw per affected crew member, units per second.
    pub resource_draw_per_crew: f64,
    /// Training complexity; 0 means the module is not trainable.
    pub training_complexity: f64,
    /// Player toggle. Modules with no draw are always active.
    pub active: bool,
    /// Set while the module's resource draw goes unmet; a starving module
    /// contributes nothing until flow resumes.
    pub starving: bool,
}

impl HealthModule {
    pub fn new(id: u32, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            flat_change: 0.0,
            recuperation: 0.0,
            decay: 0.0,
            multiply_factor: factor_names::ALL.to_string(),
            multiplier: 1.0,
            crew_cap: 0,
            crew_only: false,
            space: 0.0,
            shielding: 0.0,
            radioactivity: 0.0,
            resource: "ElectricCharge".to_string(),
            resource_draw: 0.0,
            resource_draw_per_crew: 0.0,
            training_complexity: 0.0,
            active: true,
            starving: false,
        }
    }

    pub fn with_flat_change(mut self, flat_change: f64) -> Self {
        self.flat_change = flat_change;
        self
    }

    pub fn with_recuperation(mut self, recuperation: f64) -> Self {
        self.recuperation = recuperation;
        self
    }

    pub fn with_decay(mut self, decay: f64) -> Self {
        self.decay = decay;
        self
    }

    pub fn with_multiplier(mut self, factor: impl Into<String>, multiplier: f64) -> Self {
        self.multiply_factor = factor.into();
        self.multiplier = multiplier;
        self
    }

    pub fn with_crew_cap(mut self, crew_cap: u32) -> Self {
        self.crew_cap = crew_cap;
        self
    }

    pub fn crew_only(mut self) -> Self {
        self.crew_only = true;
        self
    }

    pub fn with_space(mut self, space: f64) -> Self {
        self.space = space;
        self
    }

    pub fn with_shielding(mut self, shielding: f64) -> Self {
        self.shielding = shielding;
        self
    }

    pub fn with_radioactivity(mut self, radioactivity: f64) -> Self {
        self.radioactivity = radioactivity;
        self
    }

    pub fn with_resource_draw(
        mut self,
        resource: impl Into<String>,
        per_second: f64,
        per_crew: f64,
    ) -> Self {
        self.resource = resource.into();
        self.resource_draw = per_second;
        self.resource_draw_per_crew = per_crew;
        self
    }

    pub fn with_training_complexity(mut self, complexity: f64) -> Self {
        self.training_complexity = complexity;
        self
    }

    /// Modules with no resource draw cannot be toggled off or starve.
    pub fn is_always_active(&self) -> bool {
        self.resource_draw == 0.0 && self.resource_draw_per_crew == 0.0
    }

    /// Whether the module is contributing this tick.
    pub fn is_operational(&self) -> bool {
        self.is_always_active() || (self.active && !self.starving)
    }

    /// Occupants actually served at full strength.
    pub fn affected_crew(&self, crew_count: u32) -> u32 {
        if self.crew_cap > 0 {
            crew_count.min(self.crew_cap)
        } else {
            crew_count
        }
    }

    /// Recuperation contribution, diluted when more occupants draw on the
    /// module than its crew cap serves.
    pub fn recuperation_power(&self, crew_count: u32) -> f64 {
        self.capped_power(self.recuperation, crew_count)
    }

    /// Decay contribution, diluted the same way as recuperation.
    pub fn decay_power(&self, crew_count: u32) -> f64 {
        self.capped_power(self.decay, crew_count)
    }

    fn capped_power(&self, rate: f64, crew_count: u32) -> f64 {
        if self.crew_cap > 0 && crew_count > 0 {
            rate * (f64::from(self.crew_cap) / f64::from(crew_count)).min(1.0)
        } else {
            rate
        }
    }

    /// Resource units needed for `seconds` of operation.
    pub fn resource_needed(&self, crew_count: u32, seconds: f64) -> f64 {
        (self.resource_draw
            + self.resource_draw_per_crew * f64::from(self.affected_crew(crew_count)))
            * seconds
    }
}

/// Placement of a person or module at a location, with an optional station
/// inside a specific crew-only module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Aboard {
    pub location: u32,
    pub station: Option<u32>,
}

impl Aboard {
    pub fn new(location: u32) -> Self {
        Self {
            location,
            station: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resource_store_request() {
        let mut store = ResourceStore::default();
        store.add("Water", 10.0);
        assert!((store.request("Water", 4.0) - 4.0).abs() < f64::EPSILON);
        assert!((store.amount("Water") - 6.0).abs() < f64::EPSILON);
        // over-draw delivers only what is stored
        assert!((store.request("Water", 100.0) - 6.0).abs() < f64::EPSILON);
        assert!(store.request("Oxygen", 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn crew_cap_dilutes_recuperation() {
        let module = HealthModule::new(1, "R&R").with_recuperation(2.0).with_crew_cap(2);
        // two of four occupants served → half strength
        assert!((module.recuperation_power(4) - 1.0).abs() < 1e-12);
        // under the cap → full strength
        assert!((module.recuperation_power(2) - 2.0).abs() < 1e-12);
        assert!((module.recuperation_power(1) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn uncapped_module_never_dilutes() {
        let module = HealthModule::new(1, "Hab ring").with_recuperation(1.0);
        assert!((module.recuperation_power(50) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn always_active_without_draw() {
        let mut module = HealthModule::new(1, "Shield plate").with_shielding(3.0);
        module.active = false;
        assert!(module.is_operational());

        let mut powered = HealthModule::new(2, "Scrubber").with_resource_draw("ElectricCharge", 1.0, 0.0);
        powered.active = false;
        assert!(!powered.is_operational());
        powered.active = true;
        powered.starving = true;
        assert!(!powered.is_operational());
    }

    #[test]
    fn resource_needed_scales_with_crew() {
        let module = HealthModule::new(1, "Scrubber")
            .with_resource_draw("ElectricCharge", 0.5, 0.25)
            .with_crew_cap(2);
        // cap limits the per-crew component
        let need = module.resource_needed(4, 10.0);
        assert!((need - (0.5 + 0.25 * 2.0) * 10.0).abs() < 1e-12);
    }
}
