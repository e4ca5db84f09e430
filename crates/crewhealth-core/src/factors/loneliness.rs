use crewhealth_logic::constants::factor_names;

use super::{FactorContext, HealthFactor};
use crate::config::FactorSettings;

/// Isolation: applies while the crew count is below the configured
/// threshold (flying solo, by default).
pub struct LonelinessFactor;

impl HealthFactor for LonelinessFactor {
    fn name(&self) -> &'static str {
        factor_names::LONELINESS
    }

    fn base_change(&self, settings: &FactorSettings) -> f64 {
        settings.loneliness
    }

    fn change_per_day(&self, ctx: &FactorContext<'_>) -> f64 {
        if ctx.disabled_in_editor(self.name()) {
            return 0.0;
        }
        if ctx.situation.crew_count < ctx.config.factors.loneliness_crew_threshold {
            self.base_change(&ctx.config.factors)
        } else {
            0.0
        }
    }
}
