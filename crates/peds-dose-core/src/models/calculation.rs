//! Dose calculation results.

use serde::{Deserialize, Serialize};

use super::formulation::FormKind;
use crate::dosing::format_tablets;

/// A fresh dose derivation for one set of inputs.
///
/// `dose_ml` is only ever set for syrups and `dose_tablets` only for tablets.
/// Either may be absent when the formulation strength cannot be used.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CalculationResult {
    /// Amount per administration in mg
    pub single_dose_mg: f64,
    /// Amount per day in mg
    pub total_daily_dose_mg: f64,
    /// Administrations per day (always >= 1)
    pub doses_per_day: u32,
    /// Weight-scaled daily ceiling in mg
    pub max_daily_dose_mg: Option<f64>,
    /// Formulation the derived quantity refers to
    pub form: FormKind,
    /// Volume per administration (syrup only)
    pub dose_ml: Option<f64>,
    /// Tablet count per administration (tablet only)
    pub dose_tablets: Option<f64>,
    /// Set when the total daily dose exceeds the maximum
    pub warning: Option<String>,
}

impl CalculationResult {
    pub fn exceeds_max(&self) -> bool {
        self.warning.is_some()
    }

    /// Volume to one decimal place.
    pub fn display_volume(&self) -> Option<String> {
        self.dose_ml.map(|ml| format!("{:.1}", ml))
    }

    /// Tablet count in quarters.
    pub fn display_tablets(&self) -> Option<String> {
        self.dose_tablets.map(format_tablets)
    }

    /// One-line summary such as "3.0 mL (75.00 mg)".
    pub fn summary(&self) -> String {
        let amount = match (self.display_volume(), self.display_tablets()) {
            (Some(ml), _) => format!("{} mL", ml),
            (None, Some(tablets)) => format!("{} tablets", tablets),
            (None, None) => return format!("{:.2} mg", self.single_dose_mg),
        };
        format!("{} ({:.2} mg)", amount, self.single_dose_mg)
    }
}
