//! CrewHealth Core - Crew Health Simulation Engine
//!
//! An ECS-based simulation of per-crew-member health aboard spacecraft:
//! each tracked person has a bounded HP pool that drifts under the combined
//! influence of pluggable factors (confinement, isolation, microgravity,
//! radiation, stress, connectivity, ...) and the modules of whatever vessel
//! they are aboard.
//!
//! # Architecture
//!
//! The simulation uses an Entity Component System via `hecs`:
//! - **Entities**: crew members, locations (vessels/assemblies), modules
//! - **Components**: Pure data attached to entities (CrewHealth, Location,
//!   HealthModule, Aboard, ...)
//! - **Systems**: Logic that queries and updates components
//!
//! The [`engine::HealthEngine`] composes everything: factor registry,
//! per-tick location modifier cache, event queue and the tick driver.
//!
//! # Example
//!
//! ```rust
//! use crewhealth_core::prelude::*;
//!
//! let mut engine = HealthEngine::new(HealthConfig::default());
//! let station = engine.add_location("Horizon Station", "Earth");
//! engine.add_module(station, HealthModule::new(0, "Hab ring").with_space(30.0));
//! engine.track_crew(Name::new("Ada", "Reyes"), "Pilot", 1);
//! engine.assign_crew("Ada Reyes", station);
//!
//! // one hour of simulated time
//! engine.update(3600.0);
//! for event in engine.drain_events() {
//!     println!("{event:?}");
//! }
//! ```

pub mod components;
pub mod config;
pub mod engine;
pub mod events;
pub mod factors;
pub mod modifiers;
pub mod persistence;
pub mod report;
pub mod situation;
pub mod systems;

/// Commonly used types for convenient importing
pub mod prelude {
    pub use crate::components::*;
    pub use crate::config::HealthConfig;
    pub use crate::engine::HealthEngine;
    pub use crate::events::HealthEvent;
    pub use crate::report::{assembly_report, HealthReportRow};
    pub use crate::situation::{ConnectivityProvider, Situation, SituationProvider};
}
