//! Weight-based dose arithmetic.
//!
//! Steps:
//! 1. total daily dose = weight * dose/kg/day
//! 2. single dose = total / doses per day
//! 3. max daily dose = weight * max/kg/day, warning when total > max
//! 4. volume (syrup) or tablet count (tablet) from the single dose

use crate::models::{CalculationResult, FormKind, Formulation};

/// Pure dose computation over already-resolved numbers.
#[derive(Debug, Clone, Copy, Default)]
pub struct DoseEngine;

impl DoseEngine {
    pub fn new() -> Self {
        Self
    }

    /// Compute a dose.
    ///
    /// Returns `None` when the weight or dose-per-kg is not a positive finite
    /// number. A formulation whose strength or volume cannot be used only
    /// drops the derived volume/tablet field; the mg amounts still stand.
    pub fn compute(
        &self,
        weight_kg: f64,
        dose_per_kg_per_day: f64,
        max_daily_dose_per_kg: Option<f64>,
        doses_per_day: u32,
        formulation: &Formulation,
    ) -> Option<CalculationResult> {
        if !is_positive(weight_kg) || !is_positive(dose_per_kg_per_day) {
            return None;
        }
        let doses_per_day = doses_per_day.max(1);

        let total_daily_dose_mg = weight_kg * dose_per_kg_per_day;
        let single_dose_mg = total_daily_dose_mg / f64::from(doses_per_day);

        let max_daily_dose_mg = max_daily_dose_per_kg
            .filter(|m| m.is_finite())
            .map(|m| weight_kg * m);

        let warning = max_daily_dose_mg
            .filter(|max| total_daily_dose_mg > *max)
            .map(|max| {
                tracing::warn!(
                    total_daily_dose_mg,
                    max_daily_dose_mg = max,
                    "total daily dose exceeds maximum"
                );
                format!(
                    "Total daily dose {:.2}mg exceeds the maximum daily dose of {:.2}mg.",
                    total_daily_dose_mg, max
                )
            });

        let (dose_ml, dose_tablets) = match formulation.kind {
            FormKind::Syrup => (
                formulation
                    .concentration_mg_per_ml()
                    .map(|mg_per_ml| single_dose_mg / mg_per_ml),
                None,
            ),
            FormKind::Tablet => (
                None,
                formulation
                    .has_usable_strength()
                    .then(|| single_dose_mg / formulation.strength_mg),
            ),
        };

        Some(CalculationResult {
            single_dose_mg,
            total_daily_dose_mg,
            doses_per_day,
            max_daily_dose_mg,
            form: formulation.kind,
            dose_ml,
            dose_tablets,
            warning,
        })
    }
}

fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}
