//! The per-record health update: factor composition, cached fallback,
//! clamping, and condition transitions.
//!
//! One tick runs in three conceptual steps for each tracked person:
//! compute the net change for their current situation (live, fallback or
//! base-facility branch), integrate it over the interval, then evaluate the
//! condition state machine. A failure computing one person's change never
//! affects another's already-applied update.

use crewhealth_logic::condition::Transition;
use crewhealth_logic::constants::SECONDS_PER_DAY;
use crewhealth_logic::vitals;

use crate::components::{CrewHealth, HealthModule, RosterStatus};
use crate::config::GeneralSettings;
use crate::factors::{FactorContext, FactorRegistry};

/// Net change for one person for one tick, before integration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChangeComputation {
    /// Linear HP change per day (factors + flat module contributions).
    pub linear: f64,
    /// Marginal recuperation, percent per day.
    pub marginal_positive: f64,
    /// Marginal decay, percent per day.
    pub marginal_negative: f64,
    /// True when this was a live recomputation whose results should be
    /// cached for fallback ticks.
    pub cache: bool,
}

/// Compute the change for the person's current situation.
///
/// * Live (loaded, editor preview, or on EVA): marginal accumulators are
///   re-derived from scratch, every factor runs, and the result is cached.
/// * Assigned but unsimulatable (unloaded location): the previous live
///   computation is replayed verbatim.
/// * Idle at base: a flat base-facility rate applies and nothing is cached.
///
/// `station` is the crew-only module the person is stationed in, if any;
/// its contributions apply undiluted on top of the location-wide snapshot.
pub fn compute_change(
    record: &CrewHealth,
    ctx: &FactorContext<'_>,
    registry: &FactorRegistry,
    station: Option<&HealthModule>,
) -> ChangeComputation {
    if ctx.situation.is_live() {
        let mut linear = registry.total_change_per_day(ctx);
        let mut marginal_positive = 0.0;
        let mut marginal_negative = 0.0;
        if let Some(modifiers) = ctx.modifiers {
            linear += modifiers.flat_change;
            marginal_positive += modifiers.recuperation;
            marginal_negative += modifiers.decay;
        }
        if let Some(module) = station {
            if module.crew_only && module.is_operational() {
                linear += module.flat_change;
                marginal_positive += module.recuperation;
                marginal_negative += module.decay;
            }
        }
        return ChangeComputation {
            linear,
            marginal_positive,
            marginal_negative,
            cache: !ctx.situation.in_editor,
        };
    }
    if ctx.situation.status == RosterStatus::Assigned {
        // No live situation data; replay the cached change unchanged.
        return ChangeComputation {
            linear: record.last_change,
            marginal_positive: record.last_marginal_positive,
            marginal_negative: record.last_marginal_negative,
            cache: false,
        };
    }
    ChangeComputation {
        linear: ctx.config.factors.base_facility,
        marginal_positive: 0.0,
        marginal_negative: 0.0,
        cache: false,
    }
}

/// What happened when an update was applied.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateOutcome {
    /// Net change per day that was integrated, marginal term included.
    pub net_change_per_day: f64,
    pub transition: Option<Transition>,
    /// Health fraction crossed below the low-health alert level.
    pub low_health_crossed: bool,
}

/// Integrate a computed change over `interval` seconds and evaluate
/// condition transitions. Dead records are never touched.
pub fn apply_update(
    record: &mut CrewHealth,
    computation: &ChangeComputation,
    interval: f64,
    general: &GeneralSettings,
) -> UpdateOutcome {
    if record.condition.is_dead() {
        return UpdateOutcome {
            net_change_per_day: 0.0,
            transition: None,
            low_health_crossed: false,
        };
    }
    if computation.cache {
        record.last_change = computation.linear;
        record.last_marginal_positive = computation.marginal_positive;
        record.last_marginal_negative = computation.marginal_negative;
    }

    let max_hp = record.max_hp(general);
    let net_change_per_day = computation.linear
        + vitals::marginal_change(
            record.hp,
            max_hp,
            computation.marginal_positive,
            computation.marginal_negative,
        );

    let previous_health = record.health(general);
    record.set_hp(
        record.hp + net_change_per_day * interval / SECONDS_PER_DAY,
        general,
    );

    let (condition, transition) = crewhealth_logic::condition::evaluate(
        &record.condition,
        record.hp,
        max_hp,
        &general.thresholds(),
        general.death_enabled,
        &record.role,
    );
    match &transition {
        Some(Transition::Exhausted) => record.role = general.exhausted_role.clone(),
        Some(Transition::Revived { restored_role }) => record.role = restored_role.clone(),
        _ => {}
    }
    record.condition = condition;

    let low_health_crossed = !record.condition.is_dead()
        && previous_health >= general.low_health_alert
        && record.health(general) < general.low_health_alert;

    UpdateOutcome {
        net_change_per_day,
        transition,
        low_health_crossed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HealthConfig;
    use crate::factors::EditorOptions;
    use crate::situation::Situation;
    use crewhealth_logic::condition::Condition;

    fn live_situation() -> Situation {
        let mut s = Situation::at_base(0, "Earth");
        s.status = RosterStatus::Assigned;
        s.location = Some(1);
        s.loaded = true;
        s
    }

    fn context<'a>(
        config: &'a HealthConfig,
        situation: &'a Situation,
        editor: &'a EditorOptions,
    ) -> FactorContext<'a> {
        FactorContext {
            config,
            situation,
            modifiers: None,
            editor,
            training_level: 0.0,
            connected: false,
            dose: 0.0,
            max_hp: 100.0,
        }
    }

    #[test]
    fn plain_drift_integrates_over_interval() {
        let general = GeneralSettings::default();
        let mut record = CrewHealth::new("Pilot", 0, &general);
        record.hp = 50.0;
        let computation = ChangeComputation {
            linear: 10.0,
            marginal_positive: 0.0,
            marginal_negative: 0.0,
            cache: true,
        };
        // 12 hours at +10/day → +5
        let outcome = apply_update(&mut record, &computation, 43_200.0, &general);
        assert!((record.hp - 55.0).abs() < 1e-9);
        assert!((outcome.net_change_per_day - 10.0).abs() < 1e-12);
        assert!(outcome.transition.is_none());
    }

    #[test]
    fn marginal_term_uses_current_hp() {
        let general = GeneralSettings::default();
        let mut record = CrewHealth::new("Pilot", 0, &general);
        record.hp = 50.0;
        let computation = ChangeComputation {
            linear: 0.0,
            marginal_positive: 2.0,
            marginal_negative: 0.0,
            cache: true,
        };
        let outcome = apply_update(&mut record, &computation, SECONDS_PER_DAY, &general);
        // 2% of the missing 50 HP
        assert!((outcome.net_change_per_day - 1.0).abs() < 1e-12);
        assert!((record.hp - 51.0).abs() < 1e-9);
    }

    #[test]
    fn live_computation_caches_for_fallback() {
        let config = HealthConfig::default();
        let general = config.general.clone();
        let editor = EditorOptions::default();
        let situation = live_situation();
        let ctx = context(&config, &situation, &editor);
        let registry = FactorRegistry::standard();
        let mut record = CrewHealth::new("Pilot", 0, &general);

        let live = compute_change(&record, &ctx, &registry, None);
        assert!(live.cache);
        apply_update(&mut record, &live, 3_600.0, &general);
        assert!((record.last_change - live.linear).abs() < 1e-12);

        // unloaded next tick: identical change replayed
        let mut unloaded = situation.clone();
        unloaded.loaded = false;
        let ctx = context(&config, &unloaded, &editor);
        let fallback = compute_change(&record, &ctx, &registry, None);
        assert!(!fallback.cache);
        assert!((fallback.linear - live.linear).abs() < 1e-12);
        assert!((fallback.marginal_positive - live.marginal_positive).abs() < 1e-12);
    }

    #[test]
    fn idle_at_base_uses_facility_rate() {
        let config = HealthConfig::default();
        let editor = EditorOptions::default();
        let situation = Situation::at_base(0, "Earth");
        let ctx = context(&config, &situation, &editor);
        let registry = FactorRegistry::standard();
        let record = CrewHealth::new("Pilot", 0, &config.general);

        let computation = compute_change(&record, &ctx, &registry, None);
        assert!(!computation.cache);
        assert!((computation.linear - config.factors.base_facility).abs() < 1e-12);
        assert!(computation.marginal_positive.abs() < f64::EPSILON);
    }

    #[test]
    fn exhaustion_fires_once_with_role_swap() {
        let general = GeneralSettings::default();
        let mut record = CrewHealth::new("Pilot", 0, &general);
        record.hp = 19.9;
        let computation = ChangeComputation {
            linear: 0.0,
            marginal_positive: 0.0,
            marginal_negative: 0.0,
            cache: false,
        };
        let outcome = apply_update(&mut record, &computation, 60.0, &general);
        assert_eq!(outcome.transition, Some(Transition::Exhausted));
        assert_eq!(record.role, "Passenger");
        assert!(record.condition.is_exhausted());

        // second update in place: no repeated notification
        let outcome = apply_update(&mut record, &computation, 60.0, &general);
        assert!(outcome.transition.is_none());
    }

    #[test]
    fn death_disabled_clamps_at_floor() {
        let mut general = GeneralSettings::default();
        general.death_enabled = false;
        let mut record = CrewHealth::new("Pilot", 0, &general);
        record.hp = 1.0;
        let computation = ChangeComputation {
            linear: -50.0,
            marginal_positive: 0.0,
            marginal_negative: 0.0,
            cache: false,
        };
        for _ in 0..10 {
            apply_update(&mut record, &computation, SECONDS_PER_DAY, &general);
        }
        assert!(record.hp.abs() < 1e-9);
        assert!(!record.condition.is_dead());
    }

    #[test]
    fn death_is_terminal_and_stops_updates() {
        let general = GeneralSettings::default();
        let mut record = CrewHealth::new("Pilot", 0, &general);
        record.hp = 0.5;
        let computation = ChangeComputation {
            linear: -100.0,
            marginal_positive: 0.0,
            marginal_negative: 0.0,
            cache: false,
        };
        let outcome = apply_update(&mut record, &computation, SECONDS_PER_DAY, &general);
        assert_eq!(outcome.transition, Some(Transition::Died));
        assert_eq!(record.condition, Condition::Dead);

        let hp_at_death = record.hp;
        let outcome = apply_update(&mut record, &computation, SECONDS_PER_DAY, &general);
        assert!(outcome.transition.is_none());
        assert!((record.hp - hp_at_death).abs() < f64::EPSILON);
    }

    #[test]
    fn low_health_alert_crosses_once() {
        let general = GeneralSettings::default();
        let mut record = CrewHealth::new("Pilot", 0, &general);
        record.hp = 31.0;
        let computation = ChangeComputation {
            linear: -2.0,
            marginal_positive: 0.0,
            marginal_negative: 0.0,
            cache: false,
        };
        let outcome = apply_update(&mut record, &computation, SECONDS_PER_DAY, &general);
        assert!(outcome.low_health_crossed);
        let outcome = apply_update(&mut record, &computation, SECONDS_PER_DAY, &general);
        assert!(!outcome.low_health_crossed);
    }
}
