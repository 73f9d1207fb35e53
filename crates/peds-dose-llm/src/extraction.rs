//! Drug facts extraction from LLM output.

use peds_dose_core::lookup::{DrugQuery, DrugSource, LookupError, LookupResult};
use peds_dose_core::models::{DrugCategory, DrugInfo, OnlineDrugInfo};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::prompts::{build_categorize_prompt, build_full_prompt};

/// Extraction errors.
#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Invalid response format: {0}")]
    InvalidFormat(String),

    #[error("LLM inference error: {0}")]
    Inference(String),
}

pub type ExtractionResult<T> = Result<T, ExtractionError>;

/// Raw search reply from the LLM.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DrugSearchOutput {
    pub name: String,
    pub dose_per_kg: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_daily_dose_per_kg: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub form: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strength: Option<String>,
}

impl DrugSearchOutput {
    pub fn into_drug_info(self) -> DrugInfo {
        DrugInfo::Online(OnlineDrugInfo {
            name: self.name,
            dose_per_kg: self.dose_per_kg,
            max_daily_dose_per_kg: self.max_daily_dose_per_kg,
            frequency: self.frequency,
            category: self.category,
            form: self.form,
            strength: self.strength,
        })
    }
}

/// Parse an LLM search reply into structured drug facts.
pub fn parse_search_output(reply: &str) -> ExtractionResult<DrugSearchOutput> {
    // Try to find JSON in the response (in case LLM adds extra text)
    let json_start = reply.find('{').ok_or_else(|| {
        ExtractionError::InvalidFormat("No JSON object found in response".into())
    })?;
    let json_end = reply.rfind('}').ok_or_else(|| {
        ExtractionError::InvalidFormat("No closing brace found in response".into())
    })?;
    if json_end < json_start {
        return Err(ExtractionError::InvalidFormat(
            "Closing brace precedes opening brace".into(),
        ));
    }

    let output: DrugSearchOutput = serde_json::from_str(&reply[json_start..=json_end])?;

    if !(output.dose_per_kg.is_finite() && output.dose_per_kg > 0.0) {
        return Err(ExtractionError::InvalidFormat(format!(
            "dosePerKg must be positive, got {}",
            output.dose_per_kg
        )));
    }
    Ok(output)
}

/// Parse a categorizer reply ("Antibiotic", "Category: GI", ...).
pub fn parse_category(reply: &str) -> ExtractionResult<DrugCategory> {
    let line = reply
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .ok_or_else(|| ExtractionError::InvalidFormat("Empty category reply".into()))?;

    let label = match line.split_once(':') {
        Some((prefix, rest)) if prefix.trim().eq_ignore_ascii_case("category") => rest.trim(),
        _ => line,
    };
    if label.is_empty() {
        return Err(ExtractionError::InvalidFormat("Empty category label".into()));
    }
    Ok(DrugCategory::from_label(label))
}

/// Text completion backend (local model, hosted API, or a mock).
pub trait CompletionBackend {
    fn complete(&self, prompt: &str) -> ExtractionResult<String>;
}

/// Mock backend for testing without actual LLM inference.
pub struct MockCompletion;

impl MockCompletion {
    // (pattern, canned reply)
    const REPLIES: &'static [(&'static str, &'static str)] = &[
        (
            "paracetamol",
            r#"{"name":"Paracetamol","dosePerKg":60,"maxDailyDosePerKg":75,"frequency":"Every 6 hours","category":"Antipyretic","form":"syrup","strength":"125mg/5mL"}"#,
        ),
        (
            "crocin",
            r#"{"name":"Paracetamol","dosePerKg":60,"maxDailyDosePerKg":75,"frequency":"Every 6 hours","category":"Antipyretic","form":"syrup","strength":"125mg/5mL"}"#,
        ),
        (
            "ibuprofen",
            r#"{"name":"Ibuprofen","dosePerKg":30,"maxDailyDosePerKg":40,"frequency":"Every 8 hours","category":"Antipyretic","form":"syrup","strength":"100mg/5mL"}"#,
        ),
        (
            "azithromycin",
            r#"{"name":"Azithromycin","dosePerKg":10,"frequency":"Once a day","category":"Antibiotic","form":"tablet","strength":"250mg"}"#,
        ),
        (
            "cetirizine",
            r#"{"name":"Cetirizine","dosePerKg":0.25,"frequency":"Once a day","form":"syrup","strength":"5mg/5mL"}"#,
        ),
    ];

    const CATEGORIES: &'static [(&'static str, &'static str)] = &[
        ("paracetamol", "Antipyretic"),
        ("ibuprofen", "Antipyretic"),
        ("amoxicillin", "Antibiotic"),
        ("azithromycin", "Antibiotic"),
        ("salbutamol", "Respiratory"),
        ("ondansetron", "GI"),
    ];
}

impl CompletionBackend for MockCompletion {
    fn complete(&self, prompt: &str) -> ExtractionResult<String> {
        // Only the last user turn carries the query
        let request = prompt.rsplit("<|user|>").next().unwrap_or(prompt);
        let request = request.to_lowercase();

        if request.contains("category:") {
            return Ok(Self::CATEGORIES
                .iter()
                .find(|(pattern, _)| request.contains(pattern))
                .map(|(_, label)| label.to_string())
                .unwrap_or_else(|| "Other".to_string()));
        }

        Self::REPLIES
            .iter()
            .find(|(pattern, _)| request.contains(pattern))
            .map(|(_, reply)| reply.to_string())
            .ok_or_else(|| ExtractionError::Inference("No information for this drug".into()))
    }
}

/// Online drug search over a completion backend.
pub struct LlmDrugSearch<B: CompletionBackend> {
    backend: B,
    include_examples: bool,
}

impl<B: CompletionBackend> LlmDrugSearch<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            include_examples: true,
        }
    }

    /// Toggle few-shot examples in the prompt.
    pub fn with_examples(mut self, include_examples: bool) -> Self {
        self.include_examples = include_examples;
        self
    }

    /// Run a search and return the raw structured reply.
    pub fn search(&self, query: &DrugQuery) -> ExtractionResult<DrugSearchOutput> {
        let prompt = build_full_prompt(
            &query.text,
            query.weight_kg,
            query.age_years,
            self.include_examples,
        );
        let reply = self.backend.complete(&prompt)?;
        tracing::debug!(query = %query.text, reply_len = reply.len(), "search reply received");
        parse_search_output(&reply)
    }

    /// Ask the backend for a drug's category.
    pub fn categorize(&self, drug_name: &str) -> ExtractionResult<DrugCategory> {
        let reply = self.backend.complete(&build_categorize_prompt(drug_name))?;
        parse_category(&reply)
    }
}

impl<B: CompletionBackend> DrugSource for LlmDrugSearch<B> {
    fn lookup(&self, query: &DrugQuery) -> LookupResult<DrugInfo> {
        self.search(query)
            .map(DrugSearchOutput::into_drug_info)
            .map_err(|e| {
                tracing::warn!(query = %query.text, error = %e, "online search failed");
                LookupError::Search(e.to_string())
            })
    }
}
