use crewhealth_logic::constants::factor_names;

use super::{FactorContext, HealthFactor};
use crate::config::FactorSettings;

/// The strain of working in a suit, applied only while on EVA.
pub struct EvaFactor;

impl HealthFactor for EvaFactor {
    fn name(&self) -> &'static str {
        factor_names::EVA
    }

    fn base_change(&self, settings: &FactorSettings) -> f64 {
        settings.eva
    }

    fn change_per_day(&self, ctx: &FactorContext<'_>) -> f64 {
        if ctx.situation.on_eva {
            self.base_change(&ctx.config.factors)
        } else {
            0.0
        }
    }
}
