//! Assembly-preview health report.
//!
//! For a previewed assembly (a location inspected in the editor), produces
//! one row per crew member: current HP, projected net change per day,
//! equilibrium HP and time to the next condition transition. Factor values
//! that are pure functions of the shared assembly situation are computed
//! once; non-cacheable factors (stress, radiation) are evaluated per
//! person.

use crewhealth_logic::condition::Condition;
use crewhealth_logic::vitals;
use serde::{Deserialize, Serialize};

use crate::components::{Aboard, CrewHealth, HealthModule, Location, Name};
use crate::engine::HealthEngine;
use crate::factors::FactorContext;
use crate::modifiers::compute_modifiers;
use crate::situation::Situation;
use crate::systems::training;

/// One crew member's projection in the preview report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthReportRow {
    pub name: String,
    pub hp: f64,
    pub max_hp: f64,
    pub condition: Condition,
    /// Projected net HP change per day in this assembly.
    pub change_per_day: f64,
    /// Equilibrium HP; 0 when the drift is monotonic.
    pub balance_hp: f64,
    /// Seconds to the next condition threshold, NaN for "never".
    pub time_to_next_condition: f64,
}

/// Build the preview report for everyone aboard `location`, honoring the
/// engine's editor options. Empty when the location is unknown.
pub fn assembly_report(engine: &HealthEngine, location: u32) -> Vec<HealthReportRow> {
    let world = &engine.world;
    let config = &engine.config;

    let Some(location_data) = world
        .query::<&Location>()
        .iter()
        .find(|(_, l)| l.id == location)
        .map(|(_, l)| l.clone())
    else {
        return Vec::new();
    };

    let crew: Vec<(String, CrewHealth)> = world
        .query::<(&Name, &CrewHealth, &Aboard)>()
        .iter()
        .filter(|(_, (_, _, aboard))| aboard.location == location)
        .map(|(_, (name, record, _))| (name.full(), record.clone()))
        .collect();
    let crew_count = crew.len() as u32;
    if crew_count == 0 {
        return Vec::new();
    }

    let modifiers = compute_modifiers(
        world,
        &location_data,
        crew_count,
        config,
        engine.editor.modules_enabled,
    );

    let trainable: Vec<HealthModule> = world
        .query::<(&HealthModule, &Aboard)>()
        .iter()
        .filter(|(_, (module, aboard))| {
            aboard.location == location && module.training_complexity > 0.0
        })
        .map(|(_, (module, _))| module.clone())
        .collect();

    let mut shared_situation = Situation::at_base(0, &config.general.home_body);
    shared_situation.in_editor = true;
    shared_situation.location = Some(location);
    shared_situation.crew_count = crew_count;
    shared_situation.crew_capacity = location_data.crew_capacity.max(1);

    // Cacheable factors depend only on the shared assembly situation:
    // compute their multiplied sum once.
    let shared_ctx = FactorContext {
        config,
        situation: &shared_situation,
        modifiers: Some(&modifiers),
        editor: &engine.editor,
        training_level: 0.0,
        connected: false,
        dose: 0.0,
        max_hp: config.general.base_max_hp,
    };
    let shared_sum: f64 = engine
        .factors
        .iter()
        .filter(|f| f.cacheable())
        .map(|f| f.change_per_day(&shared_ctx) * modifiers.factor_multiplier(f.name()))
        .sum();

    let mut rows = Vec::with_capacity(crew.len());
    for (name, record) in crew {
        let max_hp = record.max_hp(&config.general);
        let mut situation = shared_situation.clone();
        situation.experience_level = record.experience_level;
        let training_level = training::training_level(&record, trainable.iter(), &config.training);
        let ctx = FactorContext {
            config,
            situation: &situation,
            modifiers: Some(&modifiers),
            editor: &engine.editor,
            training_level,
            connected: false,
            dose: record.dose,
            max_hp,
        };
        let personal_sum: f64 = engine
            .factors
            .iter()
            .filter(|f| !f.cacheable())
            .map(|f| f.change_per_day(&ctx) * modifiers.factor_multiplier(f.name()))
            .sum();

        let linear = shared_sum + personal_sum + modifiers.flat_change;
        let change_per_day = linear
            + vitals::marginal_change(record.hp, max_hp, modifiers.recuperation, modifiers.decay);
        let balance = vitals::balance_hp(max_hp, linear, modifiers.recuperation, modifiers.decay);
        let next_hp = crewhealth_logic::condition::next_threshold_hp(
            &record.condition,
            change_per_day,
            max_hp,
            &config.general.thresholds(),
        );
        let time_to_next = vitals::time_to_value(record.hp, next_hp, change_per_day);

        rows.push(HealthReportRow {
            name,
            hp: record.hp,
            max_hp,
            condition: record.condition.clone(),
            change_per_day,
            balance_hp: balance,
            time_to_next_condition: time_to_next,
        });
    }
    rows.sort_by(|a, b| a.name.cmp(&b.name));
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HealthConfig;
    use crate::engine::HealthEngine;

    fn preview_engine() -> (HealthEngine, u32) {
        let mut engine = HealthEngine::new(HealthConfig::default());
        let station = engine.add_location("Preview", "Earth");
        engine.add_module(
            station,
            HealthModule::new(0, "Hab").with_space(20.0).with_recuperation(1.0),
        );
        engine.track_crew(Name::new("Ada", "Reyes"), "Pilot", 0);
        engine.track_crew(Name::new("Kai", "Larsen"), "Engineer", 2);
        engine.assign_crew("Ada Reyes", station);
        engine.assign_crew("Kai Larsen", station);
        (engine, station)
    }

    #[test]
    fn one_row_per_crew_member() {
        let (engine, station) = preview_engine();
        let rows = assembly_report(&engine, station);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].name, "Ada Reyes");
        assert_eq!(rows[1].name, "Kai Larsen");
        assert!((rows[0].max_hp - 100.0).abs() < f64::EPSILON);
        assert!((rows[1].max_hp - 120.0).abs() < f64::EPSILON);
    }

    #[test]
    fn full_health_upward_drift_is_never() {
        let (engine, station) = preview_engine();
        let rows = assembly_report(&engine, station);
        for row in &rows {
            if row.change_per_day > 0.0 {
                // already at max: the "next condition" is max HP itself
                assert!((row.hp - row.max_hp).abs() < f64::EPSILON);
            }
        }
    }

    #[test]
    fn unknown_location_is_empty() {
        let (engine, _) = preview_engine();
        assert!(assembly_report(&engine, 999).is_empty());
    }

    #[test]
    fn disabling_modules_changes_projection() {
        let (mut engine, station) = preview_engine();
        let with_modules = assembly_report(&engine, station);
        engine.editor.modules_enabled = false;
        let without = assembly_report(&engine, station);
        // recuperation from the hab module only counts when modules are on
        assert!(with_modules[0].change_per_day >= without[0].change_per_day);
    }
}
