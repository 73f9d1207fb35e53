//! Peds-Dose Core Library
//!
//! Weight-based pediatric dose calculation with an offline drug formulary.
//!
//! # Architecture
//!
//! ```text
//! Drug query ──► Online search (LLM)  ─┐
//!            └─► Offline formulary    ─┴─► DrugInfo { source } ──► DrugReference
//!                                                                      │
//! Weight / Age ──► Weight resolution (age → weight estimate) ──────────┤
//!                                                                      │
//! Frequency text ──► Doses per day ────────────────────────────────────┤
//!                                                                      ▼
//! Formulation (syrup mg/mL | tablet mg) ─────────────────────────► Dose engine
//!                                                                      │
//!                                         ┌────────────────────────────▼──────┐
//!                                         │ single dose mg, total daily mg,    │
//!                                         │ max daily mg + warning,            │
//!                                         │ mL (syrup) or tablets (quartered)  │
//!                                         └────────────────────────────────────┘
//! ```
//!
//! # Core Principle
//!
//! **Missing data is never rendered as zero.** A field that cannot be derived
//! is absent, and a calculation that cannot be made returns no result.
//!
//! # Modules
//!
//! - [`db`]: SQLite offline formulary
//! - [`models`]: Domain types (DrugReference, Formulation, CalculationResult, etc.)
//! - [`dosing`]: Weight estimation, frequency parsing, dose engine, tablet display
//! - [`lookup`]: Drug sources (offline lookup, the trait online search implements)

pub mod db;
pub mod dosing;
pub mod lookup;
pub mod models;

// Re-export commonly used types
pub use db::Database;
pub use dosing::{
    Calculator, DoseEngine, DoseOutcome, DoseRequest, DoseSession, DosingError, InputChange,
};
pub use lookup::{DrugQuery, DrugSource, LookupError, OfflineLookup};
pub use models::{
    CalculationResult, DrugCategory, DrugInfo, DrugReference, FormKind, FormStrength,
    Formulation, LocalDrugEntry, OnlineDrugInfo, PatientParameters, ResolvedWeight,
    WeightSource,
};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum PedsDoseError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<db::DbError> for PedsDoseError {
    fn from(e: db::DbError) -> Self {
        PedsDoseError::DatabaseError(e.to_string())
    }
}

impl From<lookup::LookupError> for PedsDoseError {
    fn from(e: lookup::LookupError) -> Self {
        match e {
            LookupError::NotFound { .. } => PedsDoseError::NotFound(e.to_string()),
            other => PedsDoseError::DatabaseError(other.to_string()),
        }
    }
}

impl From<dosing::DosingError> for PedsDoseError {
    fn from(e: dosing::DosingError) -> Self {
        PedsDoseError::InvalidInput(e.to_string())
    }
}

impl<T> From<std::sync::PoisonError<T>> for PedsDoseError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        PedsDoseError::DatabaseError(format!("Lock poisoned: {}", e))
    }
}

// =========================================================================
// Factory and Helper Functions (exported to FFI)
// =========================================================================

/// Open or create a formulary at the given path.
#[uniffi::export]
pub fn open_formulary(path: String) -> Result<Arc<PedsDoseCore>, PedsDoseError> {
    let db = Database::open(&path)?;
    Ok(Arc::new(PedsDoseCore {
        db: Arc::new(Mutex::new(db)),
    }))
}

/// Create an in-memory formulary (for testing).
#[uniffi::export]
pub fn open_formulary_in_memory() -> Result<Arc<PedsDoseCore>, PedsDoseError> {
    let db = Database::open_in_memory()?;
    Ok(Arc::new(PedsDoseCore {
        db: Arc::new(Mutex::new(db)),
    }))
}

/// Estimate weight in kg from age in years (0 when unresolvable).
#[uniffi::export]
pub fn estimate_weight(age_years: f64) -> f64 {
    dosing::estimate_weight(age_years)
}

/// Doses per day for a frequency description.
#[uniffi::export]
pub fn doses_per_day(frequency: Option<String>) -> u32 {
    dosing::doses_per_day(frequency.as_deref())
}

/// Tablet count as a quarter fraction label.
#[uniffi::export]
pub fn format_tablets(tablets: f64) -> String {
    dosing::format_tablets(tablets)
}

// =========================================================================
// Main API Object
// =========================================================================

/// Thread-safe formulary wrapper for FFI.
#[derive(uniffi::Object)]
pub struct PedsDoseCore {
    db: Arc<Mutex<Database>>,
}

#[uniffi::export]
impl PedsDoseCore {
    // =========================================================================
    // Formulary Operations
    // =========================================================================

    /// Add or update a formulary entry.
    pub fn upsert_drug(&self, drug: FfiDrugEntry) -> Result<(), PedsDoseError> {
        let db = self.db.lock()?;
        db.upsert_drug(&drug.into())?;
        Ok(())
    }

    /// Search the formulary by name/alias substring, best match first.
    pub fn search_drugs(&self, term: String) -> Result<Vec<FfiDrugEntry>, PedsDoseError> {
        let db = self.db.lock()?;
        let entries = OfflineLookup::new(&db).search(&term)?;
        Ok(entries.into_iter().map(|e| e.into()).collect())
    }

    /// Insert the built-in reference set. Returns the number inserted.
    pub fn seed_default_formulary(&self) -> Result<u32, PedsDoseError> {
        let db = self.db.lock()?;
        let inserted = db.seed_default_formulary()?;
        Ok(u32::try_from(inserted).unwrap_or(u32::MAX))
    }

    // =========================================================================
    // Calculation
    // =========================================================================

    /// Look a drug up offline and calculate a dose.
    ///
    /// Formulation fields left unset fall back to the formulary's preparation
    /// for the requested form (or its default form). Without any strength the
    /// mg amounts are still returned.
    pub fn calculate(
        &self,
        request: FfiDoseRequest,
    ) -> Result<FfiDoseOutcome, PedsDoseError> {
        let db = self.db.lock()?;
        let info = OfflineLookup::new(&db).lookup(&DrugQuery {
            text: request.query.clone(),
            weight_kg: request.weight_kg,
            age_years: request.age_years,
        })?;

        let drug = info
            .reference()
            .ok_or_else(|| DosingError::MissingDosePerKg(info.name().to_string()))?;

        let kind = request.form.map(FormKind::from);
        let base = match kind {
            Some(kind) => info.formulation(kind),
            None => info.suggested_formulation(),
        };
        let formulation =
            Formulation::overlay(base, kind, request.strength_mg, request.volume_ml);

        let outcome = Calculator::new().calculate(&DoseRequest {
            patient: PatientParameters {
                weight_kg: request.weight_kg,
                age_years: request.age_years,
            },
            drug,
            formulation,
        })?;

        Ok(FfiDoseOutcome::from_outcome(info.name().to_string(), outcome))
    }
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe formulation kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum FfiFormKind {
    Syrup,
    Tablet,
}

impl From<FfiFormKind> for FormKind {
    fn from(kind: FfiFormKind) -> Self {
        match kind {
            FfiFormKind::Syrup => FormKind::Syrup,
            FfiFormKind::Tablet => FormKind::Tablet,
        }
    }
}

impl From<FormKind> for FfiFormKind {
    fn from(kind: FormKind) -> Self {
        match kind {
            FormKind::Syrup => FfiFormKind::Syrup,
            FormKind::Tablet => FfiFormKind::Tablet,
        }
    }
}

/// FFI-safe per-form strength.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiFormStrength {
    pub kind: FfiFormKind,
    pub strength_mg: f64,
    pub volume_ml: Option<f64>,
}

/// FFI-safe formulary entry.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiDrugEntry {
    pub name: String,
    pub aliases: Vec<String>,
    pub category: Option<String>,
    pub dose_per_kg: Option<f64>,
    pub max_daily_dose_per_kg: Option<f64>,
    pub frequency: Option<String>,
    pub forms: Vec<FfiFormStrength>,
}

impl From<LocalDrugEntry> for FfiDrugEntry {
    fn from(entry: LocalDrugEntry) -> Self {
        Self {
            name: entry.name,
            aliases: entry.aliases,
            category: entry.category,
            dose_per_kg: entry.dose_per_kg,
            max_daily_dose_per_kg: entry.max_daily_dose_per_kg,
            frequency: entry.frequency,
            forms: entry
                .forms
                .into_iter()
                .map(|(kind, strength)| FfiFormStrength {
                    kind: kind.into(),
                    strength_mg: strength.strength_mg,
                    volume_ml: strength.volume_ml,
                })
                .collect(),
        }
    }
}

impl From<FfiDrugEntry> for LocalDrugEntry {
    fn from(entry: FfiDrugEntry) -> Self {
        LocalDrugEntry {
            name: entry.name,
            aliases: entry.aliases,
            category: entry.category,
            dose_per_kg: entry.dose_per_kg,
            max_daily_dose_per_kg: entry.max_daily_dose_per_kg,
            frequency: entry.frequency,
            forms: entry
                .forms
                .into_iter()
                .map(|f| {
                    (
                        FormKind::from(f.kind),
                        FormStrength {
                            strength_mg: f.strength_mg,
                            volume_ml: f.volume_ml,
                        },
                    )
                })
                .collect::<BTreeMap<_, _>>(),
        }
    }
}

/// FFI-safe dose request.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiDoseRequest {
    pub query: String,
    pub weight_kg: Option<f64>,
    pub age_years: Option<f64>,
    pub form: Option<FfiFormKind>,
    pub strength_mg: Option<f64>,
    pub volume_ml: Option<f64>,
}

/// FFI-safe calculation outcome.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiDoseOutcome {
    pub drug_name: String,
    pub weight_kg: f64,
    pub weight_estimated: bool,
    pub single_dose_mg: f64,
    pub total_daily_dose_mg: f64,
    pub doses_per_day: u32,
    pub max_daily_dose_mg: Option<f64>,
    pub form: FfiFormKind,
    pub dose_ml: Option<f64>,
    pub dose_tablets: Option<f64>,
    pub dose_tablets_label: Option<String>,
    pub warning: Option<String>,
}

impl FfiDoseOutcome {
    fn from_outcome(drug_name: String, outcome: DoseOutcome) -> Self {
        let DoseOutcome { weight, result } = outcome;
        Self {
            drug_name,
            weight_kg: weight.weight_kg,
            weight_estimated: weight.is_estimated(),
            dose_tablets_label: result.display_tablets(),
            single_dose_mg: result.single_dose_mg,
            total_daily_dose_mg: result.total_daily_dose_mg,
            doses_per_day: result.doses_per_day,
            max_daily_dose_mg: result.max_daily_dose_mg,
            form: result.form.into(),
            dose_ml: result.dose_ml,
            dose_tablets: result.dose_tablets,
            warning: result.warning,
        }
    }
}
