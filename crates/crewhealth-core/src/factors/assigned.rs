use crewhealth_logic::constants::factor_names;

use super::{FactorContext, HealthFactor};
use crate::components::RosterStatus;
use crate::config::FactorSettings;

/// Baseline wear of serving on a mission at all.
pub struct AssignedFactor;

impl HealthFactor for AssignedFactor {
    fn name(&self) -> &'static str {
        factor_names::ASSIGNED
    }

    fn base_change(&self, settings: &FactorSettings) -> f64 {
        settings.assigned
    }

    fn change_per_day(&self, ctx: &FactorContext<'_>) -> f64 {
        if ctx.disabled_in_editor(self.name()) {
            return 0.0;
        }
        if ctx.situation.in_editor || ctx.situation.status == RosterStatus::Assigned {
            self.base_change(&ctx.config.factors)
        } else {
            0.0
        }
    }
}
