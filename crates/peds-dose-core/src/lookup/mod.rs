//! Drug lookup sources.
//!
//! Both the online search service and the offline formulary answer a
//! [`DrugQuery`] with a [`DrugInfo`] tagged by where it came from.

mod offline;

pub use offline::*;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::DrugInfo;

/// Lookup errors.
#[derive(Error, Debug)]
pub enum LookupError {
    #[error("Database error: {0}")]
    Database(#[from] crate::db::DbError),

    #[error("Drug not found: {query}")]
    NotFound {
        query: String,
        suggestions: Vec<String>,
    },

    #[error("Search failed: {0}")]
    Search(String),
}

pub type LookupResult<T> = Result<T, LookupError>;

/// A free-text drug query with optional patient hints.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DrugQuery {
    pub text: String,
    pub weight_kg: Option<f64>,
    pub age_years: Option<f64>,
}

impl DrugQuery {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            weight_kg: None,
            age_years: None,
        }
    }
}

/// Anything that can turn a query into drug facts.
pub trait DrugSource {
    fn lookup(&self, query: &DrugQuery) -> LookupResult<DrugInfo>;
}
