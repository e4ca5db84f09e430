//! Location modifier aggregation and its per-tick cache.
//!
//! Scanning every module attached to a location is the expensive part of a
//! health tick, so the result is computed once per location and memoized in
//! a [`ModifierCache`] keyed by location identity. The cache is owned by
//! the tick driver and must be fully cleared at every tick boundary and on
//! any structural change (module added or removed, crew boarding) — a stale
//! snapshot silently freezes space, shielding and exposure values.

use std::collections::{BTreeMap, HashMap};

use crewhealth_logic::constants::factor_names;
use crewhealth_logic::radiation;
use hecs::World;
use serde::{Deserialize, Serialize};

use crate::components::{Aboard, HealthModule, Location};
use crate::config::HealthConfig;

/// Derived environmental quantities for one location, valid for one tick.
/// Never mutated in place; always replaced wholesale on recompute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationModifiers {
    pub location: u32,
    pub crew_count: u32,
    /// Total living-space points.
    pub space: f64,
    /// Aggregate shielding in halving-thicknesses (modules + stored
    /// shielding resources).
    pub shielding: f64,
    /// Summed flat HP/day from location-wide modules.
    pub flat_change: f64,
    /// Summed recuperation %/day, crew-cap diluted.
    pub recuperation: f64,
    /// Summed decay %/day, crew-cap diluted.
    pub decay: f64,
    /// Internal radioactive emission, dose units per day.
    pub radioactivity: f64,
    /// Ambient dose per day at this location after the body's regime
    /// coefficient, before shielding.
    pub ambient_dose: f64,
    /// Fraction of ambient dose reaching occupants.
    pub exposure: f64,
    /// Exposure in the best-shielded occupied spot available.
    pub shelter_exposure: f64,
    /// Factor name → combined multiplier from location-wide modules.
    pub multipliers: BTreeMap<String, f64>,
}

impl LocationModifiers {
    /// Combined multiplier for a named factor, including `All` wildcards.
    pub fn factor_multiplier(&self, factor: &str) -> f64 {
        let named = self.multipliers.get(factor).copied().unwrap_or(1.0);
        let all = self
            .multipliers
            .get(factor_names::ALL)
            .copied()
            .unwrap_or(1.0);
        named * all
    }

    /// Dose per day received inside the hull: attenuated ambient radiation
    /// plus internal emissions (which bypass the shielding).
    pub fn dose_per_day(&self) -> f64 {
        self.ambient_dose * self.exposure + self.radioactivity
    }
}

/// Per-tick memo of location modifiers, keyed by location identity.
#[derive(Debug, Default)]
pub struct ModifierCache {
    entries: HashMap<u32, LocationModifiers>,
    computations: u64,
}

impl ModifierCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached snapshot for `location`, computing it with
    /// `compute` only on a miss.
    pub fn get_or_compute(
        &mut self,
        location: u32,
        compute: impl FnOnce() -> LocationModifiers,
    ) -> &LocationModifiers {
        let computations = &mut self.computations;
        self.entries.entry(location).or_insert_with(|| {
            *computations += 1;
            compute()
        })
    }

    /// Drop every cached snapshot. Called at each tick boundary and after
    /// any structural change.
    pub fn invalidate_all(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of underlying recomputations performed so far.
    pub fn computations(&self) -> u64 {
        self.computations
    }
}

/// Aggregate every module contribution attached to `location` into a fresh
/// snapshot. Deterministic: no randomness, stable iteration via the module
/// id ordering.
pub fn compute_modifiers(
    world: &World,
    location: &Location,
    crew_count: u32,
    config: &HealthConfig,
    modules_enabled: bool,
) -> LocationModifiers {
    let mut space = 0.0;
    let mut shielding = 0.0;
    let mut flat_change = 0.0;
    let mut recuperation = 0.0;
    let mut decay = 0.0;
    let mut radioactivity = 0.0;
    let mut multipliers: BTreeMap<String, f64> = BTreeMap::new();
    // (shielding rating, seats) of crewable compartments, for shelter search
    let mut compartments: Vec<(f64, u32)> = Vec::new();

    let mut modules: Vec<(u32, HealthModule)> = world
        .query::<(&HealthModule, &Aboard)>()
        .iter()
        .filter(|(_, (_, aboard))| aboard.location == location.id)
        .map(|(_, (module, _))| (module.id, module.clone()))
        .collect();
    modules.sort_by_key(|(id, _)| *id);

    for (_, module) in &modules {
        if !modules_enabled || !module.is_operational() {
            continue;
        }
        space += module.space;
        shielding += module.shielding;
        radioactivity += module.radioactivity;
        compartments.push((module.shielding, module.crew_cap));

        if module.crew_only {
            // applied per stationed person, not location-wide
            continue;
        }
        flat_change += module.flat_change;
        recuperation += module.recuperation_power(crew_count);
        decay += module.decay_power(crew_count);
        if module.multiplier != 1.0 {
            let effective = effective_multiplier(module, crew_count);
            multipliers
                .entry(module.multiply_factor.clone())
                .and_modify(|m| *m *= effective)
                .or_insert(effective);
        }
    }

    let resource_shielding: f64 = location
        .resources
        .iter()
        .filter_map(|(name, amount)| {
            config
                .resources
                .shielding_per_unit(name)
                .map(|per_unit| amount * per_unit)
        })
        .sum();
    shielding += resource_shielding;

    let rad = &config.radiation;
    let coefficients = rad.body_coefficients(&location.body);
    let ambient_dose = radiation::ambient_dose(rad.solar, rad.galactic, location.distance_au)
        * coefficients.coefficient(location.regime);
    let exposure = radiation::exposure(shielding, rad.shielding_effect, rad.min_exposure);
    let shelter_shielding = shelter_shielding(&compartments, crew_count) + resource_shielding;
    let shelter_exposure = radiation::exposure(
        shelter_shielding.max(shielding),
        rad.shielding_effect,
        rad.min_exposure,
    );

    LocationModifiers {
        location: location.id,
        crew_count,
        space,
        shielding,
        flat_change,
        recuperation,
        decay,
        radioactivity,
        ambient_dose,
        exposure,
        shelter_exposure,
        multipliers,
    }
}

/// A capped module applies its full multiplier up to `crew_cap` occupants
/// and is diluted toward 1.0 beyond that.
fn effective_multiplier(module: &HealthModule, crew_count: u32) -> f64 {
    if module.crew_cap == 0 || crew_count == 0 {
        return module.multiplier;
    }
    let served = (f64::from(module.crew_cap) / f64::from(crew_count)).min(1.0);
    1.0 - (1.0 - module.multiplier) * served
}

/// Best-shielded occupied spot: take compartments in descending shielding
/// order until their seats cover the crew (cap 0 covers everyone), then
/// seat-weight the chosen ratings.
fn shelter_shielding(compartments: &[(f64, u32)], crew_count: u32) -> f64 {
    if compartments.is_empty() || crew_count == 0 {
        return 0.0;
    }
    let mut sorted = compartments.to_vec();
    sorted.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

    let mut need = crew_count;
    let mut weighted = 0.0;
    let mut seats_taken = 0u32;
    for (rating, cap) in sorted {
        let seats = if cap == 0 { need } else { cap.min(need) };
        weighted += rating * f64::from(seats);
        seats_taken += seats;
        need -= seats;
        if need == 0 {
            break;
        }
    }
    if seats_taken == 0 {
        return 0.0;
    }
    weighted / f64::from(seats_taken)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crewhealth_logic::radiation::AltitudeRegime;

    fn test_location(id: u32) -> Location {
        Location::new(id, "Test Station", "Earth").with_regime(AltitudeRegime::LowOrbit)
    }

    fn spawn_module(world: &mut World, location: u32, module: HealthModule) {
        world.spawn((module, Aboard::new(location)));
    }

    #[test]
    fn cache_hits_skip_recomputation() {
        let mut cache = ModifierCache::new();
        let world = World::new();
        let location = test_location(1);
        let config = HealthConfig::default();

        let first =
            cache.get_or_compute(1, || compute_modifiers(&world, &location, 2, &config, true));
        let first = first.clone();
        let second =
            cache.get_or_compute(1, || compute_modifiers(&world, &location, 2, &config, true));
        assert_eq!(&first, second);
        assert_eq!(cache.computations(), 1);
    }

    #[test]
    fn invalidation_forces_recompute() {
        let mut cache = ModifierCache::new();
        let world = World::new();
        let location = test_location(1);
        let config = HealthConfig::default();

        cache.get_or_compute(1, || compute_modifiers(&world, &location, 2, &config, true));
        cache.invalidate_all();
        assert!(cache.is_empty());
        cache.get_or_compute(1, || compute_modifiers(&world, &location, 2, &config, true));
        assert_eq!(cache.computations(), 2);
    }

    #[test]
    fn space_and_shielding_sum() {
        let mut world = World::new();
        spawn_module(&mut world, 1, HealthModule::new(10, "Hab").with_space(10.0));
        spawn_module(
            &mut world,
            1,
            HealthModule::new(11, "Shield").with_shielding(4.0),
        );
        // module at another location is ignored
        spawn_module(&mut world, 2, HealthModule::new(12, "Hab").with_space(99.0));

        let m = compute_modifiers(&world, &test_location(1), 2, &HealthConfig::default(), true);
        assert!((m.space - 10.0).abs() < 1e-12);
        assert!((m.shielding - 4.0).abs() < 1e-12);
    }

    #[test]
    fn crew_cap_scales_recuperation() {
        let mut world = World::new();
        spawn_module(
            &mut world,
            1,
            HealthModule::new(10, "Hab").with_space(10.0).with_recuperation(1.0),
        );
        spawn_module(
            &mut world,
            1,
            HealthModule::new(11, "Bunk")
                .with_space(5.0)
                .with_recuperation(2.0)
                .with_crew_cap(2),
        );

        let m = compute_modifiers(&world, &test_location(1), 4, &HealthConfig::default(), true);
        // capped module diluted to 2/4 of its nominal 2%/day
        assert!((m.recuperation - (1.0 + 1.0)).abs() < 1e-12);
        assert!((m.space - 15.0).abs() < 1e-12);
    }

    #[test]
    fn starving_module_contributes_nothing() {
        let mut world = World::new();
        let mut module = HealthModule::new(10, "Scrubber")
            .with_space(5.0)
            .with_resource_draw("ElectricCharge", 1.0, 0.0);
        module.starving = true;
        spawn_module(&mut world, 1, module);

        let m = compute_modifiers(&world, &test_location(1), 1, &HealthConfig::default(), true);
        assert!(m.space.abs() < 1e-12);
    }

    #[test]
    fn modules_disabled_yields_bare_hull() {
        let mut world = World::new();
        spawn_module(&mut world, 1, HealthModule::new(10, "Hab").with_space(10.0));
        let m = compute_modifiers(&world, &test_location(1), 1, &HealthConfig::default(), false);
        assert!(m.space.abs() < 1e-12);
    }

    #[test]
    fn shielding_lowers_exposure() {
        let mut world = World::new();
        let bare = compute_modifiers(&world, &test_location(1), 1, &HealthConfig::default(), true);
        spawn_module(
            &mut world,
            1,
            HealthModule::new(10, "Shield").with_shielding(8.0),
        );
        let shielded =
            compute_modifiers(&world, &test_location(1), 1, &HealthConfig::default(), true);
        assert!(shielded.exposure < bare.exposure);
        assert!((bare.exposure - 1.0).abs() < 1e-12);
    }

    #[test]
    fn resource_shielding_counts() {
        let world = World::new();
        let mut location = test_location(1);
        location.resources.add("Water", 50.0);
        let m = compute_modifiers(&world, &location, 1, &HealthConfig::default(), true);
        // 50 units × 0.1 per ton × density 1.0
        assert!((m.shielding - 5.0).abs() < 1e-12);
    }

    #[test]
    fn unknown_resource_shields_nothing() {
        let world = World::new();
        let mut location = test_location(1);
        location.resources.add("Unobtainium", 50.0);
        let m = compute_modifiers(&world, &location, 1, &HealthConfig::default(), true);
        assert!(m.shielding.abs() < 1e-12);
    }

    #[test]
    fn shelter_prefers_best_compartment() {
        let mut world = World::new();
        spawn_module(
            &mut world,
            1,
            HealthModule::new(10, "Hull").with_shielding(1.0),
        );
        spawn_module(
            &mut world,
            1,
            HealthModule::new(11, "Storm shelter")
                .with_shielding(6.0)
                .with_crew_cap(4),
        );
        let m = compute_modifiers(&world, &test_location(1), 2, &HealthConfig::default(), true);
        assert!(m.shelter_exposure <= m.exposure);
    }

    #[test]
    fn multiplier_combines_with_wildcard() {
        let mut world = World::new();
        spawn_module(
            &mut world,
            1,
            HealthModule::new(10, "Gym").with_multiplier(factor_names::MICROGRAVITY, 0.5),
        );
        spawn_module(
            &mut world,
            1,
            HealthModule::new(11, "Spa").with_multiplier(factor_names::ALL, 0.8),
        );
        let m = compute_modifiers(&world, &test_location(1), 1, &HealthConfig::default(), true);
        assert!((m.factor_multiplier(factor_names::MICROGRAVITY) - 0.4).abs() < 1e-12);
        assert!((m.factor_multiplier(factor_names::CONFINEMENT) - 0.8).abs() < 1e-12);
    }

    #[test]
    fn capped_multiplier_dilutes_past_cap() {
        let mut world = World::new();
        spawn_module(
            &mut world,
            1,
            HealthModule::new(10, "Gym")
                .with_multiplier(factor_names::MICROGRAVITY, 0.5)
                .with_crew_cap(2),
        );
        let m = compute_modifiers(&world, &test_location(1), 4, &HealthConfig::default(), true);
        // half the crew served: 1 − 0.5 × 0.5 = 0.75
        assert!((m.factor_multiplier(factor_names::MICROGRAVITY) - 0.75).abs() < 1e-12);
    }
}
