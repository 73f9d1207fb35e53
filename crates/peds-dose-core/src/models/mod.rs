//! Domain models for the dose calculator.

mod calculation;
mod drug;
mod formulation;
mod patient;

pub use calculation::*;
pub use drug::*;
pub use formulation::*;
pub use patient::*;
