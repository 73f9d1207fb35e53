//! Drug reference models.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::formulation::{FormKind, FormStrength, Formulation};

/// Structured dosing facts for a single drug.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DrugReference {
    /// Generic name
    pub name: String,
    /// Standard total daily dose in mg/kg/day
    pub dose_per_kg_per_day: f64,
    /// Maximum daily dose in mg/kg/day
    pub max_daily_dose_per_kg: Option<f64>,
    /// Administration frequency, free text (e.g., "Every 12 hours")
    pub frequency: Option<String>,
    /// Drug category label (e.g., "Antibiotic")
    pub category: Option<String>,
}

impl DrugReference {
    pub fn new(name: impl Into<String>, dose_per_kg_per_day: f64) -> Self {
        Self {
            name: name.into(),
            dose_per_kg_per_day,
            max_daily_dose_per_kg: None,
            frequency: None,
            category: None,
        }
    }

    pub fn category_kind(&self) -> Option<DrugCategory> {
        self.category.as_deref().map(DrugCategory::from_label)
    }
}

/// Known drug categories.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum DrugCategory {
    Antibiotic,
    Antipyretic,
    Respiratory,
    GI,
    Other(String),
}

impl DrugCategory {
    /// Map a free-text label onto a category (case-insensitive).
    pub fn from_label(label: &str) -> Self {
        let trimmed = label.trim().trim_end_matches('.');
        match trimmed.to_lowercase().as_str() {
            "antibiotic" | "antibiotics" | "antibacterial" => DrugCategory::Antibiotic,
            "antipyretic" | "antipyretics" | "analgesic/antipyretic" => DrugCategory::Antipyretic,
            "respiratory" => DrugCategory::Respiratory,
            "gi" | "gastrointestinal" => DrugCategory::GI,
            _ => DrugCategory::Other(trimmed.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            DrugCategory::Antibiotic => "Antibiotic",
            DrugCategory::Antipyretic => "Antipyretic",
            DrugCategory::Respiratory => "Respiratory",
            DrugCategory::GI => "GI",
            DrugCategory::Other(label) => label,
        }
    }
}

impl fmt::Display for DrugCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Drug facts returned by the online search service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OnlineDrugInfo {
    pub name: String,
    pub dose_per_kg: f64,
    pub max_daily_dose_per_kg: Option<f64>,
    pub frequency: Option<String>,
    pub category: Option<String>,
    /// Common forms, free text (e.g., "syrup, tablet")
    pub form: Option<String>,
    /// Strength display string (e.g., "125mg/5mL")
    pub strength: Option<String>,
}

/// An entry in the offline formulary.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LocalDrugEntry {
    /// Generic name - unique key
    pub name: String,
    /// Brand names and abbreviations
    pub aliases: Vec<String>,
    pub category: Option<String>,
    /// Standard total daily dose in mg/kg/day
    pub dose_per_kg: Option<f64>,
    pub max_daily_dose_per_kg: Option<f64>,
    pub frequency: Option<String>,
    /// Available preparations keyed by form
    pub forms: BTreeMap<FormKind, FormStrength>,
}

impl LocalDrugEntry {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            aliases: Vec::new(),
            category: None,
            dose_per_kg: None,
            max_daily_dose_per_kg: None,
            frequency: None,
            forms: BTreeMap::new(),
        }
    }

    /// Case-insensitive substring match against name or any alias.
    pub fn matches(&self, term: &str) -> bool {
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            return false;
        }
        self.name.to_lowercase().contains(&term)
            || self.aliases.iter().any(|a| a.to_lowercase().contains(&term))
    }

    /// Whether `term` equals one of the aliases (case-insensitive).
    pub fn has_alias(&self, term: &str) -> bool {
        let term = term.trim().to_lowercase();
        self.aliases.iter().any(|a| a.to_lowercase() == term)
    }
}

/// Drug information from either lookup path.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "source", rename_all = "lowercase")]
pub enum DrugInfo {
    Online(OnlineDrugInfo),
    Offline(LocalDrugEntry),
}

impl DrugInfo {
    pub fn name(&self) -> &str {
        match self {
            DrugInfo::Online(info) => &info.name,
            DrugInfo::Offline(entry) => &entry.name,
        }
    }

    pub fn category(&self) -> Option<&str> {
        match self {
            DrugInfo::Online(info) => info.category.as_deref(),
            DrugInfo::Offline(entry) => entry.category.as_deref(),
        }
    }

    pub fn frequency(&self) -> Option<&str> {
        match self {
            DrugInfo::Online(info) => info.frequency.as_deref(),
            DrugInfo::Offline(entry) => entry.frequency.as_deref(),
        }
    }

    /// Normalize into the facts the dose engine needs.
    ///
    /// Returns `None` when the mandatory dose-per-kg is absent.
    pub fn reference(&self) -> Option<DrugReference> {
        let (name, dose_per_kg, max, frequency, category) = match self {
            DrugInfo::Online(info) => (
                &info.name,
                Some(info.dose_per_kg),
                info.max_daily_dose_per_kg,
                &info.frequency,
                &info.category,
            ),
            DrugInfo::Offline(entry) => (
                &entry.name,
                entry.dose_per_kg,
                entry.max_daily_dose_per_kg,
                &entry.frequency,
                &entry.category,
            ),
        };

        Some(DrugReference {
            name: name.clone(),
            dose_per_kg_per_day: dose_per_kg?,
            max_daily_dose_per_kg: max,
            frequency: frequency.clone(),
            category: category.clone(),
        })
    }

    /// The preparation for a requested form, if the source describes one.
    pub fn formulation(&self, kind: FormKind) -> Option<Formulation> {
        match self {
            DrugInfo::Online(_) => self
                .suggested_formulation()
                .filter(|f| f.kind == kind),
            DrugInfo::Offline(entry) => entry.forms.get(&kind).map(|s| s.to_formulation(kind)),
        }
    }

    /// Default preparation (syrup first when several are known).
    pub fn suggested_formulation(&self) -> Option<Formulation> {
        match self {
            DrugInfo::Online(info) => info
                .strength
                .as_deref()
                .and_then(Formulation::parse_strength),
            DrugInfo::Offline(entry) => entry
                .forms
                .iter()
                .next()
                .map(|(kind, strength)| strength.to_formulation(*kind)),
        }
    }
}
