//! Synthetic roster generation for the harness.

use crewhealth_core::prelude::*;
use rand::Rng;

/// Generate a random crew name, avoiding duplicates against `taken`.
pub fn generate_name(rng: &mut impl Rng, taken: &[String]) -> Name {
    loop {
        let first = GIVEN_NAMES[rng.gen_range(0..GIVEN_NAMES.len())];
        let last = FAMILY_NAMES[rng.gen_range(0..FAMILY_NAMES.len())];
        let name = Name::new(first, last);
        if !taken.contains(&name.full()) {
            return name;
        }
    }
}

/// Track `count` random crew members and assign them to `location`.
/// Returns their full names.
pub fn generate_crew(
    engine: &mut HealthEngine,
    rng: &mut impl Rng,
    count: usize,
    location: u32,
) -> Vec<String> {
    let mut names = Vec::with_capacity(count);
    for _ in 0..count {
        let name = generate_name(rng, &names);
        let role = ROLES[rng.gen_range(0..ROLES.len())];
        let level = rng.gen_range(0..=5);
        engine.track_crew(name.clone(), role, level);
        engine.assign_crew(&name.full(), location);
        names.push(name.full());
    }
    names
}

static ROLES: &[&str] = &["Pilot", "Engineer", "Scientist", "Medic"];

// Sample name lists - enough variety for harness-sized rosters
static GIVEN_NAMES: &[&str] = &[
    "James", "Mary", "Wei", "Yuki", "Aisha", "Pavel", "Ingrid", "Carlos", "Fatima", "Kenji",
    "Olga", "Raj", "Amara", "Dmitri", "Elena", "Hassan", "Priya", "Sven", "Ming", "Akiko",
    "Omar", "Katya", "Diego", "Nadia", "Hiroshi", "Leila", "Zara", "Orion",
];

static FAMILY_NAMES: &[&str] = &[
    "Reyes", "Larsen", "Haddad", "Volkov", "Tanaka", "Okafor", "Silva", "Novak", "Fischer",
    "Moreau", "Ivanov", "Chen", "Park", "Singh", "Andersson", "Costa", "Farah", "Walker",
];

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn generated_names_are_unique() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut taken = Vec::new();
        for _ in 0..50 {
            let name = generate_name(&mut rng, &taken);
            taken.push(name.full());
        }
        let mut deduped = taken.clone();
        deduped.sort();
        deduped.dedup();
        assert_eq!(deduped.len(), taken.len());
    }

    #[test]
    fn generated_crew_are_tracked_and_assigned() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut engine = HealthEngine::new(HealthConfig::default());
        let ship = engine.add_location("Harness", "Earth");
        let names = generate_crew(&mut engine, &mut rng, 8, ship);
        assert_eq!(engine.crew_count(), 8);
        for name in &names {
            let situation = engine.situation(name).unwrap();
            assert_eq!(situation.location, Some(ship));
        }
    }
}
