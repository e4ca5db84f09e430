use crewhealth_logic::constants::factor_names;

use super::{FactorContext, HealthFactor};
use crate::components::RosterStatus;
use crate::config::FactorSettings;

/// Mission stress, softened by familiarity with the equipment:
/// `base × (1 − training_level)`. Never cacheable — training progress
/// mutates continuously.
pub struct StressFactor;

impl HealthFactor for StressFactor {
    fn name(&self) -> &'static str {
        factor_names::STRESS
    }

    fn cacheable(&self) -> bool {
        false
    }

    fn base_change(&self, settings: &FactorSettings) -> f64 {
        settings.stress
    }

    fn change_per_day(&self, ctx: &FactorContext<'_>) -> f64 {
        let base = self.base_change(&ctx.config.factors);
        if ctx.situation.in_editor {
            if !ctx.editor.factor_enabled(self.name()) {
                return 0.0;
            }
            return if ctx.config.training.enabled && ctx.editor.training_complete {
                base * (1.0 - ctx.config.training.cap)
            } else {
                base
            };
        }
        if ctx.situation.status == RosterStatus::Assigned {
            base * (1.0 - ctx.training_level)
        } else {
            0.0
        }
    }
}
