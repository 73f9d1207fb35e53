//! Patient models.

use serde::{Deserialize, Serialize};

use crate::dosing::estimate_weight;

/// Patient parameters as entered by the clinician.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct PatientParameters {
    /// Measured weight in kg
    pub weight_kg: Option<f64>,
    /// Age in years (used only when weight is absent)
    pub age_years: Option<f64>,
}

/// Where a patient weight came from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub enum WeightSource {
    /// Entered directly
    Measured,
    /// Derived from age
    EstimatedFromAge { age_years: f64 },
}

/// A positive patient weight ready for dosing.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ResolvedWeight {
    pub weight_kg: f64,
    pub source: WeightSource,
}

impl PatientParameters {
    /// Patient with a measured weight.
    pub fn with_weight(weight_kg: f64) -> Self {
        Self {
            weight_kg: Some(weight_kg),
            age_years: None,
        }
    }

    /// Patient known only by age.
    pub fn with_age(age_years: f64) -> Self {
        Self {
            weight_kg: None,
            age_years: Some(age_years),
        }
    }

    /// Resolve the weight to dose against.
    ///
    /// A measured weight wins when it is positive. Otherwise the age is run
    /// through the estimator. Returns `None` when neither yields a positive
    /// weight, in which case the caller has to ask for better input.
    pub fn resolve_weight(&self) -> Option<ResolvedWeight> {
        if let Some(weight_kg) = self.weight_kg.filter(|w| w.is_finite() && *w > 0.0) {
            return Some(ResolvedWeight {
                weight_kg,
                source: WeightSource::Measured,
            });
        }

        let age_years = self.age_years.filter(|a| a.is_finite() && *a > 0.0)?;
        let estimated = estimate_weight(age_years);
        if estimated > 0.0 {
            Some(ResolvedWeight {
                weight_kg: estimated,
                source: WeightSource::EstimatedFromAge { age_years },
            })
        } else {
            None
        }
    }
}

impl ResolvedWeight {
    /// Whether the weight was estimated rather than measured.
    pub fn is_estimated(&self) -> bool {
        matches!(self.source, WeightSource::EstimatedFromAge { .. })
    }

    /// Weight as shown back to the clinician (one decimal place).
    pub fn display(&self) -> String {
        format!("{:.1}", self.weight_kg)
    }
}
