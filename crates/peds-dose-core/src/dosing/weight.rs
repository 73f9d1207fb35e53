//! Age-based weight estimation.
//!
//! Rule-of-thumb pediatric formulas:
//! - Under 1 year: 3.5 kg birth weight, +0.6 kg/month to 6 months, +0.5 kg/month after
//! - 1 to 6 years: `2 * age + 8`
//! - Over 6 to 12 years: `(7 * age - 5) / 2`
//! - Over 12 years: `3 * age` (rough fallback only)
//!
//! No clinical validation happens here.

/// Approximate birth weight in kg.
const BIRTH_WEIGHT_KG: f64 = 3.5;

/// Monthly gain up to six months.
const EARLY_GAIN_KG_PER_MONTH: f64 = 0.6;

/// Monthly gain from six months on.
const LATE_GAIN_KG_PER_MONTH: f64 = 0.5;

/// Estimate weight in kg from age in years.
///
/// Returns `0.0` for ages at or below zero (and for NaN), which callers must
/// treat as unresolvable.
pub fn estimate_weight(age_years: f64) -> f64 {
    if age_years.is_nan() || age_years <= 0.0 {
        return 0.0;
    }

    if age_years < 1.0 {
        let months = age_years * 12.0;
        return if months <= 6.0 {
            BIRTH_WEIGHT_KG + EARLY_GAIN_KG_PER_MONTH * months
        } else {
            BIRTH_WEIGHT_KG + 6.0 * EARLY_GAIN_KG_PER_MONTH + LATE_GAIN_KG_PER_MONTH * (months - 6.0)
        };
    }

    if age_years <= 6.0 {
        2.0 * age_years + 8.0
    } else if age_years <= 12.0 {
        (7.0 * age_years - 5.0) / 2.0
    } else {
        3.0 * age_years
    }
}
