//! CrewHealth Headless Simulation Harness
//!
//! Exercises the health engine end-to-end without a game shell — no UI, no
//! networking, no rendering. Builds synthetic fleets, runs multi-day
//! simulations and checks the model's invariants.
//!
//! Usage:
//!   cargo run -p crewhealth-simtest
//!   cargo run -p crewhealth-simtest -- --verbose

mod generation;

use crewhealth_core::prelude::*;
use crewhealth_core::report::assembly_report;
use crewhealth_logic::constants::SECONDS_PER_DAY;
use crewhealth_logic::radiation::AltitudeRegime;
use crewhealth_logic::vitals;
use rand::rngs::StdRng;
use rand::SeedableRng;

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

fn check(results: &mut Vec<TestResult>, name: &str, passed: bool, detail: String, verbose: bool) {
    if verbose || !passed {
        println!("  [{}] {name}: {detail}", if passed { "ok" } else { "FAIL" });
    }
    results.push(TestResult {
        name: name.to_string(),
        passed,
        detail,
    });
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let verbose = std::env::args().any(|a| a == "--verbose");
    println!("=== CrewHealth Simulation Harness ===\n");

    let mut results = Vec::new();

    // 1. Configuration defaults and overrides
    results.extend(validate_config(verbose));

    // 2. Pure vitals math sweep
    results.extend(validate_vitals(verbose));

    // 3. A week of nominal cruising with a generated fleet
    results.extend(validate_cruise(verbose));

    // 4. Exhaustion hysteresis cycle
    results.extend(validate_exhaustion_cycle(verbose));

    // 5. Radiation exposure and shelter
    results.extend(validate_radiation(verbose));

    // 6. Unloaded fallback caching
    results.extend(validate_fallback(verbose));

    // 7. Training against stress
    results.extend(validate_training(verbose));

    // 8. Save/load continuity
    results.extend(validate_persistence(verbose));

    // 9. Assembly preview report
    results.extend(validate_preview(verbose));

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    println!("{passed} passed, {failed} failed, {} total", results.len());
    if failed > 0 {
        for result in results.iter().filter(|r| !r.passed) {
            println!("  FAILED: {} — {}", result.name, result.detail);
        }
        std::process::exit(1);
    }
}

// ── Sections ────────────────────────────────────────────────────────────

fn validate_config(verbose: bool) -> Vec<TestResult> {
    println!("Configuration:");
    let mut results = Vec::new();

    let defaults = HealthConfig::default();
    check(
        &mut results,
        "defaults validate",
        defaults.validation_errors().is_empty(),
        format!("{} problems", defaults.validation_errors().len()),
        verbose,
    );

    let overridden = HealthConfig::from_toml(
        "[general]\nbase_max_hp = 80.0\n[radiation]\nenabled = false\n",
    );
    let ok = overridden
        .as_ref()
        .map(|c| (c.general.base_max_hp - 80.0).abs() < f64::EPSILON && !c.radiation.enabled)
        .unwrap_or(false);
    check(
        &mut results,
        "toml overrides apply",
        ok,
        "partial file overrides two fields, keeps the rest".into(),
        verbose,
    );
    results
}

fn validate_vitals(verbose: bool) -> Vec<TestResult> {
    println!("Vitals math:");
    let mut results = Vec::new();

    // balance is 0 for every non-positive recuperation margin
    let mut monotonic_ok = true;
    for pos in [0.0, 0.5, 1.0, 2.0] {
        for neg in [pos, pos + 0.5, pos + 2.0] {
            if vitals::balance_hp(100.0, -1.0, pos, neg) != 0.0 {
                monotonic_ok = false;
            }
        }
    }
    check(
        &mut results,
        "balance sentinel",
        monotonic_ok,
        "pos <= neg always reports no equilibrium".into(),
        verbose,
    );

    // linear projection lands on its target
    let mut projection_ok = true;
    for (hp, target, change) in [(50.0, 60.0, 4.0), (80.0, 20.0, -2.5), (10.0, 95.0, 12.0)] {
        let t = vitals::time_to_value(hp, target, change);
        let replayed = hp + change * t / SECONDS_PER_DAY;
        if (replayed - target).abs() > 1e-6 {
            projection_ok = false;
        }
    }
    check(
        &mut results,
        "time-to-value projection",
        projection_ok,
        "hp + change × t replays to the target".into(),
        verbose,
    );
    check(
        &mut results,
        "never sentinel",
        vitals::is_never(vitals::time_to_value(50.0, 60.0, 0.0))
            && vitals::is_never(vitals::time_to_value(50.0, 60.0, -1.0)),
        "zero or wrong-signed rates report never".into(),
        verbose,
    );
    results
}

/// A habitable cruiser with a generated crew: a week of six-hour ticks must
/// keep every record inside its bounds and nobody should die.
fn validate_cruise(verbose: bool) -> Vec<TestResult> {
    println!("Nominal cruise:");
    let mut results = Vec::new();
    let mut rng = StdRng::seed_from_u64(42);

    let mut engine = HealthEngine::new(HealthConfig::default());
    let ship = engine.add_location("Aurora", "Earth");
    engine.configure_location(ship, |l| {
        l.regime = AltitudeRegime::LowOrbit;
        l.crew_capacity = 12;
        l.comm_link = true;
        l.resources.add("ElectricCharge", 1.0e7);
    });
    engine.add_module(
        ship,
        HealthModule::new(0, "Hab ring").with_space(40.0).with_recuperation(1.0),
    );
    engine.add_module(ship, HealthModule::new(0, "Shield plate").with_shielding(6.0));
    engine.add_module(
        ship,
        HealthModule::new(0, "Scrubber").with_resource_draw("ElectricCharge", 1.0, 0.1),
    );
    let names = generation::generate_crew(&mut engine, &mut rng, 8, ship);

    for _ in 0..28 {
        engine.update(6.0 * 3600.0);
    }

    let general = engine.config.general.clone();
    let mut bounds_ok = true;
    let mut alive_ok = true;
    for name in &names {
        let record = engine.record(name).unwrap();
        let max = record.max_hp(&general);
        if record.hp < -1e-9 || record.hp > max + 1e-9 {
            bounds_ok = false;
        }
        if record.condition.is_dead() {
            alive_ok = false;
        }
    }
    check(
        &mut results,
        "hp stays in bounds",
        bounds_ok,
        format!("{} crew over 7 days", names.len()),
        verbose,
    );
    check(
        &mut results,
        "habitable ship keeps crew alive",
        alive_ok,
        "no deaths on a week-long cruise".into(),
        verbose,
    );
    let events = engine.drain_events();
    check(
        &mut results,
        "no death events",
        !events.iter().any(|e| matches!(e, HealthEvent::Died { .. })),
        format!("{} events total", events.len()),
        verbose,
    );
    results
}

/// Drive one person down into exhaustion, then heal them out of it; the
/// hysteresis band must hold and the role must round-trip.
fn validate_exhaustion_cycle(verbose: bool) -> Vec<TestResult> {
    println!("Exhaustion cycle:");
    let mut results = Vec::new();

    let mut config = HealthConfig::default();
    config.radiation.enabled = false;
    config.general.death_enabled = false;
    let mut engine = HealthEngine::new(config);
    let ship = engine.add_location("Wreck", "Earth");
    engine.add_module(ship, HealthModule::new(0, "Hab").with_space(20.0));
    let drain = engine
        .add_module(ship, HealthModule::new(0, "Broken scrubber").with_flat_change(-40.0))
        .unwrap();
    engine.track_crew(Name::new("Noor", "Haddad"), "Scientist", 0);
    engine.assign_crew("Noor Haddad", ship);

    let mut exhausted_events = 0;
    for _ in 0..8 {
        engine.update(6.0 * 3600.0);
        for event in engine.drain_events() {
            if matches!(event, HealthEvent::Exhausted { .. }) {
                exhausted_events += 1;
            }
        }
    }
    let exhausted_now = engine
        .record("Noor Haddad")
        .map(|r| r.condition.is_exhausted())
        .unwrap_or(false);
    check(
        &mut results,
        "exhaustion fires once",
        exhausted_events == 1 && exhausted_now,
        format!("{exhausted_events} exhausted events"),
        verbose,
    );
    check(
        &mut results,
        "exhausted role suspended",
        engine.record("Noor Haddad").unwrap().role == "Passenger",
        "working role swapped out".into(),
        verbose,
    );

    // swap the drain for a sick bay and heal back out
    engine.remove_module(drain);
    engine.add_module(ship, HealthModule::new(0, "Sick bay").with_flat_change(30.0));
    let mut revived = false;
    let mut restored_role = String::new();
    for _ in 0..8 {
        engine.update(6.0 * 3600.0);
        for event in engine.drain_events() {
            if let HealthEvent::Revived { role, .. } = event {
                revived = true;
                restored_role = role;
            }
        }
    }
    check(
        &mut results,
        "revival restores role",
        revived && restored_role == "Scientist",
        format!("restored role {restored_role:?}"),
        verbose,
    );
    results
}

fn validate_radiation(verbose: bool) -> Vec<TestResult> {
    println!("Radiation:");
    let mut results = Vec::new();

    // two identical hulls; only the shielding differs, so any HP gap is
    // the radiation model's doing
    let mut engine = HealthEngine::new(HealthConfig::default());
    let exposed = engine.add_location("Scout", "Deep Space");
    engine.configure_location(exposed, |l| l.regime = AltitudeRegime::Interplanetary);
    engine.add_module(exposed, HealthModule::new(0, "Hab").with_space(20.0));
    let bunkered = engine.add_location("Freighter", "Deep Space");
    engine.configure_location(bunkered, |l| {
        l.regime = AltitudeRegime::Interplanetary;
        l.resources.add("Water", 100.0);
    });
    engine.add_module(bunkered, HealthModule::new(0, "Hab").with_space(20.0));
    engine.add_module(bunkered, HealthModule::new(0, "Shield plate").with_shielding(10.0));

    engine.track_crew(Name::new("Diego", "Costa"), "Pilot", 0);
    engine.track_crew(Name::new("Katya", "Ivanov"), "Pilot", 0);
    engine.assign_crew("Diego Costa", exposed);
    engine.assign_crew("Katya Ivanov", bunkered);

    for _ in 0..10 {
        engine.update(SECONDS_PER_DAY);
    }

    let dose_exposed = engine.record("Diego Costa").unwrap().dose;
    let dose_bunkered = engine.record("Katya Ivanov").unwrap().dose;
    check(
        &mut results,
        "dose accumulates in deep space",
        dose_exposed > 0.0,
        format!("{dose_exposed:.0} dose units after 10 days"),
        verbose,
    );
    check(
        &mut results,
        "shielding and water slow the dose",
        dose_bunkered < dose_exposed * 0.5,
        format!("{dose_bunkered:.0} vs {dose_exposed:.0}"),
        verbose,
    );

    // identical hulls otherwise: any HP gap comes from the dose drain
    let hp_exposed = engine.record("Diego Costa").unwrap().hp;
    let hp_bunkered = engine.record("Katya Ivanov").unwrap().hp;
    check(
        &mut results,
        "dose over threshold drains hp",
        dose_exposed > engine.config.radiation.effect_threshold && hp_exposed < hp_bunkered,
        format!("hp {hp_exposed:.1} exposed vs {hp_bunkered:.1} bunkered"),
        verbose,
    );
    results
}

fn validate_fallback(verbose: bool) -> Vec<TestResult> {
    println!("Unloaded fallback:");
    let mut results = Vec::new();

    let mut config = HealthConfig::default();
    config.radiation.enabled = false;
    let mut engine = HealthEngine::new(config);
    let ship = engine.add_location("Relay", "Earth");
    engine.add_module(ship, HealthModule::new(0, "Hab").with_space(20.0));
    engine.track_crew(Name::new("Sven", "Andersson"), "Engineer", 1);
    engine.assign_crew("Sven Andersson", ship);

    engine.update(3600.0);
    let cached = engine.record("Sven Andersson").unwrap().last_change;

    engine.configure_location(ship, |l| l.loaded = false);
    let hp_before = engine.record("Sven Andersson").unwrap().hp;
    engine.update(SECONDS_PER_DAY);
    let record = engine.record("Sven Andersson").unwrap();

    check(
        &mut results,
        "cached change replayed verbatim",
        (record.last_change - cached).abs() < f64::EPSILON,
        format!("cached {cached:.3}/day"),
        verbose,
    );
    // no marginal modules aboard: one day of fallback drifts by the
    // cached linear change exactly
    let expected = (hp_before + cached).clamp(0.0, record.max_hp(&engine.config.general));
    check(
        &mut results,
        "fallback drift matches cache",
        (record.hp - expected).abs() < 1e-6,
        format!("hp {:.3} vs expected {expected:.3}", record.hp),
        verbose,
    );
    results
}

fn validate_training(verbose: bool) -> Vec<TestResult> {
    println!("Training:");
    let mut results = Vec::new();

    let mut config = HealthConfig::default();
    config.radiation.enabled = false;
    let mut engine = HealthEngine::new(config);
    let ship = engine.add_location("Lab ship", "Earth");
    engine.add_module(ship, HealthModule::new(0, "Hab").with_space(30.0));
    let lab = engine
        .add_module(ship, HealthModule::new(0, "Science lab").with_training_complexity(2.0))
        .unwrap();

    engine.track_crew(Name::new("Priya", "Singh"), "Scientist", 0);
    engine.track_crew(Name::new("Omar", "Farah"), "Scientist", 0);
    engine.train_crew("Priya Singh", lab, 30.0 * SECONDS_PER_DAY);
    engine.assign_crew("Priya Singh", ship);
    engine.assign_crew("Omar Farah", ship);

    let trained_level = engine.record("Priya Singh").unwrap().training.progress(lab);
    check(
        &mut results,
        "training saturates at cap",
        (trained_level - engine.config.training.cap).abs() < 1e-9,
        format!("progress {trained_level:.2}"),
        verbose,
    );

    for _ in 0..12 {
        engine.update(6.0 * 3600.0);
    }
    let trained_hp = engine.record("Priya Singh").unwrap().hp;
    let untrained_hp = engine.record("Omar Farah").unwrap().hp;
    check(
        &mut results,
        "trained crew fare better",
        trained_hp > untrained_hp,
        format!("{trained_hp:.2} vs {untrained_hp:.2} after 3 days"),
        verbose,
    );
    results
}

fn validate_persistence(verbose: bool) -> Vec<TestResult> {
    println!("Persistence:");
    let mut results = Vec::new();
    let mut rng = StdRng::seed_from_u64(7);

    let mut engine = HealthEngine::new(HealthConfig::default());
    let ship = engine.add_location("Aurora", "Earth");
    engine.add_module(ship, HealthModule::new(0, "Hab").with_space(25.0));
    let names = generation::generate_crew(&mut engine, &mut rng, 5, ship);
    for _ in 0..4 {
        engine.update(6.0 * 3600.0);
    }

    let mut buffer = Vec::new();
    let saved = engine.save(&mut buffer).is_ok();
    check(
        &mut results,
        "save succeeds",
        saved,
        format!("{} bytes", buffer.len()),
        verbose,
    );

    let mut restored = HealthEngine::new(HealthConfig::default());
    let loaded = restored.load(buffer.as_slice()).is_ok();
    let mut identical = loaded && restored.crew_count() == engine.crew_count();
    if loaded {
        for name in &names {
            match (engine.record(name), restored.record(name)) {
                (Some(a), Some(b)) if a == b => {}
                _ => identical = false,
            }
        }
    }
    check(
        &mut results,
        "load restores every record",
        identical,
        format!("{} records compared", names.len()),
        verbose,
    );

    // flat document round-trip for the external savegame surface
    let record = engine.record(&names[0]).unwrap();
    let doc = record.to_document(&names[0]);
    let (name, rebuilt) =
        CrewHealth::from_document(&doc, record.role.clone(), record.experience_level, &engine.config.general);
    check(
        &mut results,
        "flat document round-trips",
        name == names[0] && (rebuilt.hp - record.hp).abs() < 1e-9,
        "name and hp survive the key→value surface".into(),
        verbose,
    );
    results
}

fn validate_preview(verbose: bool) -> Vec<TestResult> {
    println!("Assembly preview:");
    let mut results = Vec::new();

    let mut engine = HealthEngine::new(HealthConfig::default());
    let assembly = engine.add_location("Prototype", "Earth");
    engine.configure_location(assembly, |l| l.crew_capacity = 3);
    engine.add_module(
        assembly,
        HealthModule::new(0, "Crew cabin").with_space(15.0).with_recuperation(0.5),
    );
    engine.track_crew(Name::new("Ada", "Reyes"), "Pilot", 3);
    engine.track_crew(Name::new("Kai", "Larsen"), "Engineer", 0);
    engine.assign_crew("Ada Reyes", assembly);
    engine.assign_crew("Kai Larsen", assembly);

    let rows = assembly_report(&engine, assembly);
    check(
        &mut results,
        "one row per occupant",
        rows.len() == 2,
        format!("{} rows", rows.len()),
        verbose,
    );
    let levels_ok = rows
        .iter()
        .all(|r| (r.max_hp - 100.0).abs() < f64::EPSILON || (r.max_hp - 130.0).abs() < f64::EPSILON);
    check(
        &mut results,
        "max hp follows experience",
        levels_ok,
        "levels 0 and 3 → pools 100 and 130".into(),
        verbose,
    );

    // disabling the stress factor in the preview changes the projection
    let baseline = rows[0].change_per_day;
    engine
        .editor
        .set_factor_enabled(crewhealth_logic::constants::factor_names::STRESS, false);
    let rows = assembly_report(&engine, assembly);
    check(
        &mut results,
        "editor toggles bite",
        rows[0].change_per_day > baseline,
        format!("{baseline:.2} → {:.2} without stress", rows[0].change_per_day),
        verbose,
    );
    results
}
