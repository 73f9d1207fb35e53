//! Dose calculation.
//!
//! Pipeline: Patient → Weight Resolution → Frequency Parsing → Dose Engine → Result
//!
//! Every calculation is a fresh derivation from a complete set of inputs.

mod engine;
mod frequency;
mod session;
mod tablets;
mod weight;

pub use engine::*;
pub use frequency::*;
pub use session::*;
pub use tablets::*;
pub use weight::*;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{CalculationResult, DrugReference, Formulation, PatientParameters, ResolvedWeight};

/// Dosing errors.
#[derive(Error, Debug, PartialEq)]
pub enum DosingError {
    #[error("Please provide a valid weight or age.")]
    UnresolvableWeight,

    #[error("No dose per kg available for: {0}")]
    MissingDosePerKg(String),

    #[error("Invalid numeric input: {0}")]
    InvalidInput(String),
}

pub type DosingResult<T> = Result<T, DosingError>;

/// Everything needed for one calculation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DoseRequest {
    pub patient: PatientParameters,
    pub drug: DrugReference,
    pub formulation: Formulation,
}

/// A calculation together with the weight it was based on.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DoseOutcome {
    pub weight: ResolvedWeight,
    pub result: CalculationResult,
}

/// Runs the full pipeline for a request.
#[derive(Debug, Clone, Copy, Default)]
pub struct Calculator {
    engine: DoseEngine,
}

impl Calculator {
    pub fn new() -> Self {
        Self {
            engine: DoseEngine::new(),
        }
    }

    /// Calculate a dose for a request.
    pub fn calculate(&self, request: &DoseRequest) -> DosingResult<DoseOutcome> {
        validate(request)?;

        // Step 1: Resolve weight (measured, or estimated from age)
        let weight = request
            .patient
            .resolve_weight()
            .ok_or(DosingError::UnresolvableWeight)?;

        // Step 2: Normalize the frequency
        let doses = doses_per_day(request.drug.frequency.as_deref());

        // Step 3: Dose arithmetic
        let result = self
            .engine
            .compute(
                weight.weight_kg,
                request.drug.dose_per_kg_per_day,
                request.drug.max_daily_dose_per_kg,
                doses,
                &request.formulation,
            )
            .ok_or_else(|| DosingError::MissingDosePerKg(request.drug.name.clone()))?;

        tracing::debug!(
            drug = %request.drug.name,
            weight_kg = weight.weight_kg,
            estimated = weight.is_estimated(),
            doses_per_day = result.doses_per_day,
            single_dose_mg = result.single_dose_mg,
            "calculated dose"
        );

        Ok(DoseOutcome { weight, result })
    }
}

/// Reject NaN and infinities before they reach the arithmetic.
fn validate(request: &DoseRequest) -> DosingResult<()> {
    let checks = [
        ("weight", request.patient.weight_kg),
        ("age", request.patient.age_years),
        ("dose per kg", Some(request.drug.dose_per_kg_per_day)),
        ("max daily dose per kg", request.drug.max_daily_dose_per_kg),
        ("strength", Some(request.formulation.strength_mg)),
        ("volume", request.formulation.volume_ml),
    ];

    for (field, value) in checks {
        if let Some(v) = value {
            if !v.is_finite() {
                return Err(DosingError::InvalidInput(format!("{} is {}", field, v)));
            }
        }
    }
    Ok(())
}
