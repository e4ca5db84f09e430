//! Component definitions for the ECS simulation.
//!
//! Components are pure data structs attached to entities.
//! They have no behavior beyond small accessors - systems do the work.

mod crew;
mod vessel;

pub use crew::*;
pub use vessel::*;
