//! Pluggable health factors.
//!
//! Each factor is one rule producing an HP-change-per-day contribution from
//! a person's situation. Factors are registered once, in a stable order, in
//! a [`FactorRegistry`]; module contributions reference them by name to
//! apply multipliers. A non-cacheable factor depends on state that mutates
//! between otherwise-identical situations (training progress, accumulated
//! dose) and must be recomputed per person even where a shared result would
//! otherwise do.

mod assigned;
mod confinement;
mod connected;
mod eva;
mod home;
mod loneliness;
mod microgravity;
mod radiation;
mod stress;

pub use assigned::AssignedFactor;
pub use confinement::ConfinementFactor;
pub use connected::ConnectedFactor;
pub use eva::EvaFactor;
pub use home::HomeFactor;
pub use loneliness::LonelinessFactor;
pub use microgravity::MicrogravityFactor;
pub use radiation::RadiationFactor;
pub use stress::StressFactor;

use std::collections::BTreeMap;
use std::collections::HashMap;

use crate::config::{FactorSettings, HealthConfig};
use crate::modifiers::LocationModifiers;
use crate::situation::Situation;

/// Editor-preview toggles: individual factors, module contributions and the
/// assume-training-complete switch can each be turned off while previewing
/// an assembly. All on by default; irrelevant outside editor mode.
#[derive(Debug, Clone)]
pub struct EditorOptions {
    disabled_factors: BTreeMap<String, bool>,
    pub modules_enabled: bool,
    pub training_complete: bool,
}

impl Default for EditorOptions {
    fn default() -> Self {
        Self {
            disabled_factors: BTreeMap::new(),
            modules_enabled: true,
            training_complete: true,
        }
    }
}

impl EditorOptions {
    pub fn factor_enabled(&self, name: &str) -> bool {
        !self.disabled_factors.get(name).copied().unwrap_or(false)
    }

    pub fn set_factor_enabled(&mut self, name: impl Into<String>, enabled: bool) {
        self.disabled_factors.insert(name.into(), !enabled);
    }
}

/// Everything a factor may read when computing its contribution.
pub struct FactorContext<'a> {
    pub config: &'a HealthConfig,
    pub situation: &'a Situation,
    /// None while on EVA or unsituated.
    pub modifiers: Option<&'a LocationModifiers>,
    pub editor: &'a EditorOptions,
    /// Overall training completion, 0..cap.
    pub training_level: f64,
    /// Resolved home-connection state for the person's location.
    pub connected: bool,
    /// Accumulated radiation dose.
    pub dose: f64,
    pub max_hp: f64,
}

impl FactorContext<'_> {
    /// Editor preview with this factor switched off?
    pub fn disabled_in_editor(&self, name: &str) -> bool {
        self.situation.in_editor && !self.editor.factor_enabled(name)
    }
}

/// One health factor rule.
pub trait HealthFactor {
    /// Stable name, used for multiplier lookup and editor toggles.
    fn name(&self) -> &'static str;

    /// False for factors whose inputs mutate between identical situations;
    /// the editor report recomputes these per person instead of sharing one
    /// per-assembly value.
    fn cacheable(&self) -> bool {
        true
    }

    /// Configured base rate, HP per day.
    fn base_change(&self, settings: &FactorSettings) -> f64;

    /// Contribution for the given situation. Factors whose preconditions
    /// are unmet return zero rather than erroring.
    fn change_per_day(&self, ctx: &FactorContext<'_>) -> f64;
}

/// The ordered factor collection, built once at startup.
pub struct FactorRegistry {
    factors: Vec<Box<dyn HealthFactor>>,
    by_name: HashMap<&'static str, usize>,
}

impl FactorRegistry {
    /// The standard factor set, in evaluation order.
    pub fn standard() -> Self {
        Self::from_factors(vec![
            Box::new(AssignedFactor),
            Box::new(ConfinementFactor),
            Box::new(LonelinessFactor),
            Box::new(MicrogravityFactor),
            Box::new(EvaFactor),
            Box::new(ConnectedFactor),
            Box::new(HomeFactor),
            Box::new(StressFactor),
            Box::new(RadiationFactor),
        ])
    }

    pub fn from_factors(factors: Vec<Box<dyn HealthFactor>>) -> Self {
        let by_name = factors
            .iter()
            .enumerate()
            .map(|(i, f)| (f.name(), i))
            .collect();
        Self { factors, by_name }
    }

    pub fn get(&self, name: &str) -> Option<&dyn HealthFactor> {
        self.by_name.get(name).map(|&i| self.factors[i].as_ref())
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn HealthFactor> {
        self.factors.iter().map(Box::as_ref)
    }

    pub fn len(&self) -> usize {
        self.factors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factors.is_empty()
    }

    /// Sum every factor's contribution, each scaled by the location's
    /// multiplier for that factor.
    pub fn total_change_per_day(&self, ctx: &FactorContext<'_>) -> f64 {
        self.iter()
            .map(|factor| {
                let multiplier = ctx
                    .modifiers
                    .map(|m| m.factor_multiplier(factor.name()))
                    .unwrap_or(1.0);
                factor.change_per_day(ctx) * multiplier
            })
            .sum()
    }
}

impl Default for FactorRegistry {
    fn default() -> Self {
        Self::standard()
    }
}
