//! Pure simulation math for CrewHealth.
//!
//! This crate contains all health-model arithmetic that is independent of any
//! entity store, engine, or runtime. Functions take plain data and return
//! results, making them unit-testable and portable.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`condition`] | OK ⇄ Exhausted / Dead state machine with hysteresis |
//! | [`constants`] | Day length, HP floor, factor name keys |
//! | [`radiation`] | Altitude regimes, ambient dose, shielding attenuation |
//! | [`training`] | Per-module training accrual and completion levels |
//! | [`vitals`] | Bounded-HP arithmetic, equilibrium and time-to-target |

pub mod condition;
pub mod constants;
pub mod radiation;
pub mod training;
pub mod vitals;
