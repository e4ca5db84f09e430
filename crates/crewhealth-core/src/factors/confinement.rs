use crewhealth_logic::constants::factor_names;

use super::{FactorContext, HealthFactor};
use crate::config::FactorSettings;

/// Cramped quarters: scales with crowding, inversely with living space.
/// Zero while on EVA (no quarters to be cramped in).
pub struct ConfinementFactor;

impl HealthFactor for ConfinementFactor {
    fn name(&self) -> &'static str {
        factor_names::CONFINEMENT
    }

    fn base_change(&self, settings: &FactorSettings) -> f64 {
        settings.confinement
    }

    fn change_per_day(&self, ctx: &FactorContext<'_>) -> f64 {
        if ctx.situation.on_eva || ctx.disabled_in_editor(self.name()) {
            return 0.0;
        }
        let Some(modifiers) = ctx.modifiers else {
            return 0.0;
        };
        self.base_change(&ctx.config.factors) * f64::from(ctx.situation.crew_count)
            / modifiers.space.max(0.1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::RosterStatus;
    use crate::factors::EditorOptions;
    use crate::modifiers::LocationModifiers;
    use crate::situation::Situation;
    use crate::config::HealthConfig;
    use std::collections::BTreeMap;

    fn modifiers(space: f64) -> LocationModifiers {
        LocationModifiers {
            location: 1,
            crew_count: 2,
            space,
            shielding: 0.0,
            flat_change: 0.0,
            recuperation: 0.0,
            decay: 0.0,
            radioactivity: 0.0,
            ambient_dose: 0.0,
            exposure: 1.0,
            shelter_exposure: 1.0,
            multipliers: BTreeMap::new(),
        }
    }

    fn context<'a>(
        config: &'a HealthConfig,
        situation: &'a Situation,
        modifiers: Option<&'a LocationModifiers>,
        editor: &'a EditorOptions,
    ) -> FactorContext<'a> {
        FactorContext {
            config,
            situation,
            modifiers,
            editor,
            training_level: 0.0,
            connected: false,
            dose: 0.0,
            max_hp: 100.0,
        }
    }

    #[test]
    fn scales_with_crowding() {
        let config = HealthConfig::default();
        let editor = EditorOptions::default();
        let mut situation = Situation::at_base(0, "Earth");
        situation.status = RosterStatus::Assigned;
        situation.location = Some(1);
        situation.crew_count = 4;
        let m = modifiers(8.0);
        let ctx = context(&config, &situation, Some(&m), &editor);
        // −3 × 4 / 8
        assert!((ConfinementFactor.change_per_day(&ctx) + 1.5).abs() < 1e-12);
    }

    #[test]
    fn space_floor_prevents_blowup() {
        let config = HealthConfig::default();
        let editor = EditorOptions::default();
        let mut situation = Situation::at_base(0, "Earth");
        situation.status = RosterStatus::Assigned;
        situation.crew_count = 1;
        let m = modifiers(0.0);
        let ctx = context(&config, &situation, Some(&m), &editor);
        assert!((ConfinementFactor.change_per_day(&ctx) + 30.0).abs() < 1e-9);
    }

    #[test]
    fn zero_on_eva() {
        let config = HealthConfig::default();
        let editor = EditorOptions::default();
        let mut situation = Situation::at_base(0, "Earth");
        situation.status = RosterStatus::Assigned;
        situation.on_eva = true;
        let m = modifiers(8.0);
        let ctx = context(&config, &situation, Some(&m), &editor);
        assert!(ConfinementFactor.change_per_day(&ctx).abs() < f64::EPSILON);
    }

    #[test]
    fn zero_when_disabled_in_editor() {
        let config = HealthConfig::default();
        let mut editor = EditorOptions::default();
        editor.set_factor_enabled(factor_names::CONFINEMENT, false);
        let mut situation = Situation::at_base(0, "Earth");
        situation.in_editor = true;
        situation.crew_count = 4;
        let m = modifiers(8.0);
        let ctx = context(&config, &situation, Some(&m), &editor);
        assert!(ConfinementFactor.change_per_day(&ctx).abs() < f64::EPSILON);
    }
}
