//! Offline lookup against the local formulary.
//!
//! Substring search decides which entries match. When more than one does,
//! they are ranked by exact name, then exact alias, then fuzzy similarity.

use strsim::{jaro_winkler, normalized_levenshtein};

use crate::db::Database;
use crate::models::{DrugInfo, LocalDrugEntry};

use super::{DrugQuery, DrugSource, LookupError, LookupResult};

/// Number of "did you mean" suggestions on a miss.
const MAX_SUGGESTIONS: usize = 3;

/// Minimum similarity for a suggestion.
const MIN_SUGGESTION_SCORE: f64 = 0.6;

/// Lookup backed by the offline formulary.
pub struct OfflineLookup<'a> {
    db: &'a Database,
}

impl<'a> OfflineLookup<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// All entries matching a term, best first.
    pub fn search(&self, term: &str) -> LookupResult<Vec<LocalDrugEntry>> {
        let mut entries = self.db.search_drugs(term)?;
        let term = term.trim().to_lowercase();
        entries.sort_by(|a, b| {
            rank(b, &term)
                .partial_cmp(&rank(a, &term))
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        Ok(entries)
    }

    /// Names close to a term that did not match anything.
    pub fn suggest(&self, term: &str) -> LookupResult<Vec<String>> {
        let term = term.trim().to_lowercase();
        let mut scored: Vec<(f64, String)> = self
            .db
            .list_drugs()?
            .into_iter()
            .map(|entry| (best_similarity(&entry, &term), entry.name))
            .filter(|(score, _)| *score >= MIN_SUGGESTION_SCORE)
            .collect();

        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        Ok(scored
            .into_iter()
            .take(MAX_SUGGESTIONS)
            .map(|(_, name)| name)
            .collect())
    }
}

impl DrugSource for OfflineLookup<'_> {
    fn lookup(&self, query: &DrugQuery) -> LookupResult<DrugInfo> {
        match self.search(&query.text)?.into_iter().next() {
            Some(entry) => {
                tracing::debug!(query = %query.text, drug = %entry.name, "offline lookup hit");
                Ok(DrugInfo::Offline(entry))
            }
            None => Err(LookupError::NotFound {
                query: query.text.clone(),
                suggestions: self.suggest(&query.text)?,
            }),
        }
    }
}

/// Ranking score for an entry that already matched.
fn rank(entry: &LocalDrugEntry, term: &str) -> f64 {
    if entry.name.to_lowercase() == term {
        return 3.0;
    }
    if entry.has_alias(term) {
        return 2.0;
    }
    best_similarity(entry, term)
}

fn best_similarity(entry: &LocalDrugEntry, term: &str) -> f64 {
    std::iter::once(&entry.name)
        .chain(entry.aliases.iter())
        .map(|candidate| fuzzy_match(term, &candidate.to_lowercase()))
        .fold(0.0, f64::max)
}

/// Combined Jaro-Winkler and normalized Levenshtein similarity.
fn fuzzy_match(a: &str, b: &str) -> f64 {
    jaro_winkler(a, b) * 0.6 + normalized_levenshtein(a, b) * 0.4
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FormKind, FormStrength};

    fn setup_db() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.seed_default_formulary().unwrap();
        db
    }

    #[test]
    fn test_lookup_by_alias() {
        let db = setup_db();
        let lookup = OfflineLookup::new(&db);

        let info = lookup.lookup(&DrugQuery::new("Dolo")).unwrap();
        assert_eq!(info.name(), "Paracetamol");
        assert!(matches!(info, DrugInfo::Offline(_)));
    }

    #[test]
    fn test_exact_name_ranks_first() {
        let db = setup_db();
        let mut other = LocalDrugEntry::new("Amoxicillin-Clavulanate");
        other.aliases = vec!["Augmentin".into()];
        other.dose_per_kg = Some(45.0);
        other.forms.insert(
            FormKind::Syrup,
            FormStrength {
                strength_mg: 228.0,
                volume_ml: Some(5.0),
            },
        );
        db.upsert_drug(&other).unwrap();
        let lookup = OfflineLookup::new(&db);

        let results = lookup.search("amoxicillin").unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].name, "Amoxicillin");

        let results = lookup.search("augmentin").unwrap();
        assert_eq!(results[0].name, "Amoxicillin-Clavulanate");
    }

    #[test]
    fn test_lookup_non_ascii_name() {
        let db = setup_db();
        let mut entry = LocalDrugEntry::new("Ácido Fólico");
        entry.aliases = vec!["ÁCIDO".into()];
        entry.dose_per_kg = Some(0.1);
        db.upsert_drug(&entry).unwrap();
        let lookup = OfflineLookup::new(&db);

        let results = lookup.search("ácido fólico").unwrap();
        assert_eq!(results.len(), 1);

        let info = lookup.lookup(&DrugQuery::new("ácido")).unwrap();
        assert_eq!(info.name(), "Ácido Fólico");
    }

    #[test]
    fn test_not_found_with_suggestions() {
        let db = setup_db();
        let lookup = OfflineLookup::new(&db);

        let err = lookup.lookup(&DrugQuery::new("ibuprofin")).unwrap_err();
        match err {
            LookupError::NotFound { query, suggestions } => {
                assert_eq!(query, "ibuprofin");
                assert_eq!(suggestions.first().map(String::as_str), Some("Ibuprofen"));
                assert!(suggestions.len() <= MAX_SUGGESTIONS);
            }
            other => panic!("expected NotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_not_found_without_suggestions() {
        let db = setup_db();
        let lookup = OfflineLookup::new(&db);

        let err = lookup.lookup(&DrugQuery::new("zzzzzzzz")).unwrap_err();
        assert!(matches!(
            err,
            LookupError::NotFound { ref suggestions, .. } if suggestions.is_empty()
        ));
    }

    #[test]
    fn test_fuzzy_match() {
        assert!(fuzzy_match("ibuprofen", "ibuprofen") > 0.99);
        assert!(fuzzy_match("ibuprofin", "ibuprofen") > 0.85);
        assert!(fuzzy_match("ibuprofen", "ondansetron") < 0.6);
    }
}
