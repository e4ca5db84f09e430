//! Situation snapshots and the narrow read interfaces the core consumes.
//!
//! A [`Situation`] is everything the factor engine needs to know about one
//! person's surroundings for one tick. The engine resolves situations from
//! its own world; embedders with their own state can implement
//! [`SituationProvider`] instead. Connectivity checks likewise default to
//! the location's own comm-link flag unless an external
//! [`ConnectivityProvider`] is installed.

use crewhealth_logic::radiation::AltitudeRegime;
use serde::{Deserialize, Serialize};

use crate::components::RosterStatus;

/// Instantaneous snapshot of one person's surroundings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Situation {
    pub status: RosterStatus,
    /// Location identity, if the person is aboard anything.
    pub location: Option<u32>,
    /// True when live data for the location is available this tick.
    pub loaded: bool,
    pub on_eva: bool,
    /// True during an editor/assembly preview rather than flight.
    pub in_editor: bool,
    pub crew_count: u32,
    pub crew_capacity: u32,
    pub experience_level: u8,
    pub body: String,
    pub regime: AltitudeRegime,
    pub distance_au: f64,
}

impl Situation {
    /// Baseline for a person idle at the base facility.
    pub fn at_base(experience_level: u8, home_body: &str) -> Self {
        Self {
            status: RosterStatus::Available,
            location: None,
            loaded: false,
            on_eva: false,
            in_editor: false,
            crew_count: 1,
            crew_capacity: 1,
            experience_level,
            body: home_body.to_string(),
            regime: AltitudeRegime::Surface,
            distance_au: 1.0,
        }
    }

    /// Whether this person is actively simulated this tick: loaded aboard a
    /// location, previewed in the editor, or out on EVA.
    pub fn is_live(&self) -> bool {
        self.in_editor
            || self.on_eva
            || (self.status == RosterStatus::Assigned && self.location.is_some() && self.loaded)
    }
}

/// Read interface answering "what is this person's situation right now".
pub trait SituationProvider {
    /// None when the person is unknown to the provider.
    fn situation(&self, name: &str) -> Option<Situation>;
}

/// Read interface answering "does this location have a link home". An
/// installed provider takes precedence over the location's comm-link flag.
pub trait ConnectivityProvider {
    fn has_home_connection(&self, location: u32) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_situation_is_not_live() {
        let s = Situation::at_base(0, "Earth");
        assert!(!s.is_live());
    }

    #[test]
    fn eva_is_live_even_unloaded() {
        let mut s = Situation::at_base(0, "Earth");
        s.status = RosterStatus::Assigned;
        s.on_eva = true;
        assert!(s.is_live());
    }

    #[test]
    fn assigned_unloaded_is_not_live() {
        let mut s = Situation::at_base(0, "Earth");
        s.status = RosterStatus::Assigned;
        s.location = Some(3);
        s.loaded = false;
        assert!(!s.is_live());
        s.loaded = true;
        assert!(s.is_live());
    }
}
