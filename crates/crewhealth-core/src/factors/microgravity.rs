use crewhealth_logic::constants::factor_names;
use crewhealth_logic::radiation::AltitudeRegime;

use super::{FactorContext, HealthFactor};
use crate::config::FactorSettings;

/// Weightlessness: applies in orbit, deep space and on EVA. Exercise
/// equipment and spin sections counteract it through the factor-multiplier
/// mechanism rather than here.
pub struct MicrogravityFactor;

impl HealthFactor for MicrogravityFactor {
    fn name(&self) -> &'static str {
        factor_names::MICROGRAVITY
    }

    fn base_change(&self, settings: &FactorSettings) -> f64 {
        settings.microgravity
    }

    fn change_per_day(&self, ctx: &FactorContext<'_>) -> f64 {
        if ctx.disabled_in_editor(self.name()) {
            return 0.0;
        }
        let weightless = ctx.situation.on_eva
            || matches!(
                ctx.situation.regime,
                AltitudeRegime::LowOrbit | AltitudeRegime::HighOrbit | AltitudeRegime::Interplanetary
            );
        if weightless {
            self.base_change(&ctx.config.factors)
        } else {
            0.0
        }
    }
}
