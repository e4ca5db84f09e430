//! Training feed: explicit, user-initiated training time accruing toward
//! per-module familiarity, and the overall level the stress factor reads.

use crewhealth_logic::training;

use crate::components::{CrewHealth, HealthModule};
use crate::config::TrainingSettings;

/// Apply `seconds` of training on one module. Untrainable modules
/// (complexity 0) and disabled training are no-ops.
pub fn train(
    record: &mut CrewHealth,
    module: &HealthModule,
    seconds: f64,
    settings: &TrainingSettings,
) {
    if !settings.enabled || module.training_complexity <= 0.0 {
        return;
    }
    let progress = record.training.progress(module.id);
    let updated = training::accrue(
        progress,
        module.training_complexity,
        seconds,
        &settings.params(),
    );
    record.training.set_progress(module.id, updated);
}

/// Overall training level for the modules relevant to the person's current
/// assignment. With training disabled everyone counts as fully trained.
pub fn training_level<'a>(
    record: &CrewHealth,
    relevant: impl Iterator<Item = &'a HealthModule>,
    settings: &TrainingSettings,
) -> f64 {
    if !settings.enabled {
        return settings.cap;
    }
    training::weighted_level(relevant.filter(|m| m.training_complexity > 0.0).map(|m| {
        (
            record.training.progress(m.id),
            m.training_complexity,
        )
    }))
}
