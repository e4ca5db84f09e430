use crewhealth_logic::constants::factor_names;

use super::{FactorContext, HealthFactor};
use crate::config::FactorSettings;

/// Morale bonus for having a working link home. The engine resolves the
/// connection state before factor evaluation, through an installed
/// connectivity provider when one exists, otherwise the location's own
/// comm-link flag.
pub struct ConnectedFactor;

impl HealthFactor for ConnectedFactor {
    fn name(&self) -> &'static str {
        factor_names::CONNECTED
    }

    fn base_change(&self, settings: &FactorSettings) -> f64 {
        settings.connected
    }

    fn change_per_day(&self, ctx: &FactorContext<'_>) -> f64 {
        if ctx.situation.in_editor {
            return if ctx.editor.factor_enabled(self.name()) {
                self.base_change(&ctx.config.factors)
            } else {
                0.0
            };
        }
        if ctx.connected {
            self.base_change(&ctx.config.factors)
        } else {
            0.0
        }
    }
}
