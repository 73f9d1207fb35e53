//! Formulation models.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Strength display strings such as "125mg/5mL" or "500mg".
static STRENGTH_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?i)([0-9]+(?:\.[0-9]+)?)\s*mg(?:/([0-9]+(?:\.[0-9]+)?)\s*mL)?").ok());

/// Physical delivery form.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum FormKind {
    /// Liquid measured by volume
    Syrup,
    /// Solid counted by unit
    Tablet,
}

impl FormKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FormKind::Syrup => "syrup",
            FormKind::Tablet => "tablet",
        }
    }
}

impl fmt::Display for FormKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FormKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "syrup" | "suspension" | "liquid" => Ok(FormKind::Syrup),
            "tablet" | "tablets" | "tab" => Ok(FormKind::Tablet),
            other => Err(format!("unknown formulation: {}", other)),
        }
    }
}

/// A concrete preparation of a drug.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Formulation {
    pub kind: FormKind,
    /// Drug amount in mg (per `volume_ml` for syrups, per unit for tablets)
    pub strength_mg: f64,
    /// Volume in mL that carries `strength_mg` (syrup only)
    pub volume_ml: Option<f64>,
}

impl Formulation {
    pub fn syrup(strength_mg: f64, volume_ml: f64) -> Self {
        Self {
            kind: FormKind::Syrup,
            strength_mg,
            volume_ml: Some(volume_ml),
        }
    }

    pub fn tablet(strength_mg: f64) -> Self {
        Self {
            kind: FormKind::Tablet,
            strength_mg,
            volume_ml: None,
        }
    }

    /// Parse a strength display string.
    ///
    /// `NUMBER "mg" [ "/" NUMBER "mL" ]`, case-insensitive. Without the `/mL`
    /// group the preparation is taken to be a tablet.
    pub fn parse_strength(text: &str) -> Option<Self> {
        let caps = STRENGTH_PATTERN.as_ref()?.captures(text)?;
        let strength_mg: f64 = caps.get(1)?.as_str().parse().ok()?;

        match caps.get(2) {
            Some(volume) => {
                let volume_ml: f64 = volume.as_str().parse().ok()?;
                Some(Self::syrup(strength_mg, volume_ml))
            }
            None => Some(Self::tablet(strength_mg)),
        }
    }

    /// Concentration in mg per mL, when it can be derived.
    pub fn concentration_mg_per_ml(&self) -> Option<f64> {
        let volume_ml = self.volume_ml?;
        if !self.has_usable_strength() || !(volume_ml.is_finite() && volume_ml > 0.0) {
            return None;
        }
        Some(self.strength_mg / volume_ml)
    }

    /// Strength usable as a divisor.
    pub fn has_usable_strength(&self) -> bool {
        self.strength_mg.is_finite() && self.strength_mg > 0.0
    }

    /// Overlay user-entered fields on a looked-up preparation.
    ///
    /// The kind defaults to the base's (syrup when there is none). A strength
    /// known from neither side is left at 0, which the dose engine treats as
    /// unusable.
    pub fn overlay(
        base: Option<Formulation>,
        kind: Option<FormKind>,
        strength_mg: Option<f64>,
        volume_ml: Option<f64>,
    ) -> Formulation {
        let kind = kind.or(base.map(|f| f.kind)).unwrap_or(FormKind::Syrup);
        // A base of another kind contributes nothing
        let base = base.filter(|f| f.kind == kind);
        let volume_ml = match kind {
            FormKind::Syrup => volume_ml.or(base.and_then(|f| f.volume_ml)),
            FormKind::Tablet => None,
        };
        Formulation {
            kind,
            strength_mg: strength_mg.or(base.map(|f| f.strength_mg)).unwrap_or(0.0),
            volume_ml,
        }
    }

    /// Label such as "125mg/5mL" or "500mg".
    pub fn label(&self) -> String {
        match (self.kind, self.volume_ml) {
            (FormKind::Syrup, Some(volume_ml)) => format!("{}mg/{}mL", self.strength_mg, volume_ml),
            _ => format!("{}mg", self.strength_mg),
        }
    }
}

/// Per-form strength record from the offline formulary.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct FormStrength {
    pub strength_mg: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume_ml: Option<f64>,
}

impl FormStrength {
    pub fn to_formulation(&self, kind: FormKind) -> Formulation {
        Formulation {
            kind,
            strength_mg: self.strength_mg,
            volume_ml: match kind {
                FormKind::Syrup => self.volume_ml,
                FormKind::Tablet => None,
            },
        }
    }
}
