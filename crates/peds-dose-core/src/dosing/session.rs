//! Recompute-on-change session state.

use crate::models::{DrugReference, FormKind, Formulation, PatientParameters};

use super::{Calculator, DoseOutcome, DoseRequest};

/// Immutable snapshot of every input a calculation depends on.
#[derive(Debug, Clone, PartialEq)]
pub struct DoseInputs {
    pub patient: PatientParameters,
    pub drug: Option<DrugReference>,
    pub formulation: Formulation,
}

impl Default for DoseInputs {
    fn default() -> Self {
        Self {
            patient: PatientParameters::default(),
            drug: None,
            // 5 mL is the usual syrup reference volume
            formulation: Formulation::syrup(0.0, 5.0),
        }
    }
}

impl DoseInputs {
    fn to_request(&self) -> Option<DoseRequest> {
        Some(DoseRequest {
            patient: self.patient,
            drug: self.drug.clone()?,
            formulation: self.formulation,
        })
    }
}

/// A single input edit.
#[derive(Debug, Clone, PartialEq)]
pub enum InputChange {
    Weight(Option<f64>),
    Age(Option<f64>),
    FormKind(FormKind),
    Strength(f64),
    Volume(Option<f64>),
    Drug(Option<DrugReference>),
}

/// Holds the current inputs and the result derived from them.
///
/// Each change replaces the snapshot and recomputes from scratch, so no
/// field of the result can outlive the inputs it came from.
#[derive(Debug, Clone, Default)]
pub struct DoseSession {
    calculator: Calculator,
    inputs: DoseInputs,
    outcome: Option<DoseOutcome>,
}

impl DoseSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a given snapshot.
    pub fn with_inputs(inputs: DoseInputs) -> Self {
        let mut session = Self {
            calculator: Calculator::new(),
            inputs,
            outcome: None,
        };
        session.recompute();
        session
    }

    pub fn inputs(&self) -> &DoseInputs {
        &self.inputs
    }

    /// Latest outcome, `None` while the inputs are not computable.
    pub fn outcome(&self) -> Option<&DoseOutcome> {
        self.outcome.as_ref()
    }

    /// Apply an edit and recompute.
    pub fn apply(&mut self, change: InputChange) -> Option<&DoseOutcome> {
        self.inputs = reduce(&self.inputs, change);
        self.recompute();
        self.outcome.as_ref()
    }

    fn recompute(&mut self) {
        self.outcome = self
            .inputs
            .to_request()
            .and_then(|request| self.calculator.calculate(&request).ok());
    }
}

/// Build the next snapshot from the previous one and an edit.
pub fn reduce(inputs: &DoseInputs, change: InputChange) -> DoseInputs {
    let mut next = inputs.clone();
    match change {
        InputChange::Weight(weight_kg) => next.patient.weight_kg = weight_kg,
        InputChange::Age(age_years) => next.patient.age_years = age_years,
        InputChange::FormKind(kind) => {
            next.formulation.kind = kind;
            if kind == FormKind::Tablet {
                next.formulation.volume_ml = None;
            }
        }
        InputChange::Strength(strength_mg) => next.formulation.strength_mg = strength_mg,
        InputChange::Volume(volume_ml) => next.formulation.volume_ml = volume_ml,
        InputChange::Drug(drug) => next.drug = drug,
    }
    next
}
