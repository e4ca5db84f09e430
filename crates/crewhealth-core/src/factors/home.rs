use crewhealth_logic::constants::factor_names;
use crewhealth_logic::radiation::AltitudeRegime;

use super::{FactorContext, HealthFactor};
use crate::config::FactorSettings;

/// Comfort of flying low over the home body. An editor preview sits on the
/// pad, so it qualifies unless toggled off.
pub struct HomeFactor;

impl HealthFactor for HomeFactor {
    fn name(&self) -> &'static str {
        factor_names::HOME
    }

    fn base_change(&self, settings: &FactorSettings) -> f64 {
        settings.home
    }

    fn change_per_day(&self, ctx: &FactorContext<'_>) -> f64 {
        if ctx.disabled_in_editor(self.name()) {
            return 0.0;
        }
        if ctx.situation.in_editor {
            return self.base_change(&ctx.config.factors);
        }
        let at_home = !ctx.situation.on_eva
            && ctx.situation.body == ctx.config.general.home_body
            && ctx.situation.regime == AltitudeRegime::Surface;
        if at_home {
            self.base_change(&ctx.config.factors)
        } else {
            0.0
        }
    }
}
