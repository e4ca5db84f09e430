use crewhealth_logic::constants::factor_names;
use crewhealth_logic::radiation;

use super::{FactorContext, HealthFactor};
use crate::config::FactorSettings;

/// Radiation sickness: converts accumulated dose into an HP drain once the
/// dose crosses the configured effect threshold. Never cacheable — the dose
/// grows every tick.
pub struct RadiationFactor;

impl HealthFactor for RadiationFactor {
    fn name(&self) -> &'static str {
        factor_names::RADIATION
    }

    fn cacheable(&self) -> bool {
        false
    }

    fn base_change(&self, _settings: &FactorSettings) -> f64 {
        0.0
    }

    fn change_per_day(&self, ctx: &FactorContext<'_>) -> f64 {
        let rad = &ctx.config.radiation;
        if !rad.enabled || ctx.disabled_in_editor(self.name()) {
            return 0.0;
        }
        radiation::dose_change_per_day(ctx.dose, rad.effect_threshold, rad.effect, ctx.max_hp)
    }
}
