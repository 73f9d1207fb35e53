//! Offline formulary operations.

use std::collections::BTreeMap;

use rusqlite::{params, OptionalExtension};

use super::{Database, DbError, DbResult};
use crate::models::{FormKind, FormStrength, LocalDrugEntry};

const SELECT_COLUMNS: &str = r#"
    SELECT name, aliases, category, dose_per_kg, max_daily_dose_per_kg, frequency, forms
    FROM drug_reference
"#;

impl Database {
    /// Insert or update a formulary entry.
    pub fn upsert_drug(&self, entry: &LocalDrugEntry) -> DbResult<()> {
        let aliases_json = serde_json::to_string(&entry.aliases)?;
        let forms_json = serde_json::to_string(&entry.forms)?;

        self.conn.execute(
            r#"
            INSERT INTO drug_reference (
                name, aliases, category, dose_per_kg, max_daily_dose_per_kg,
                frequency, forms, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, datetime('now'))
            ON CONFLICT(name) DO UPDATE SET
                aliases = excluded.aliases,
                category = excluded.category,
                dose_per_kg = excluded.dose_per_kg,
                max_daily_dose_per_kg = excluded.max_daily_dose_per_kg,
                frequency = excluded.frequency,
                forms = excluded.forms,
                updated_at = datetime('now')
            "#,
            params![
                entry.name,
                aliases_json,
                entry.category,
                entry.dose_per_kg,
                entry.max_daily_dose_per_kg,
                entry.frequency,
                forms_json,
            ],
        )?;
        Ok(())
    }

    /// Get an entry by name (case-insensitive).
    pub fn get_drug(&self, name: &str) -> DbResult<Option<LocalDrugEntry>> {
        let sql = format!("{} WHERE name = ?1", SELECT_COLUMNS);
        let result = self
            .conn
            .query_row(&sql, [name], DrugEntryRow::from_row)
            .optional()?;

        result.map(|row| row.try_into()).transpose()
    }

    /// Search by case-insensitive substring of name or any alias.
    ///
    /// Matching happens in Rust: SQLite's `lower()` only folds ASCII.
    pub fn search_drugs(&self, term: &str) -> DbResult<Vec<LocalDrugEntry>> {
        let needle = term.trim().to_lowercase();
        if needle.is_empty() {
            return Ok(Vec::new());
        }

        Ok(self
            .list_drugs()?
            .into_iter()
            .filter(|entry| entry.matches(&needle))
            .collect())
    }

    /// Get all entries ordered by name.
    pub fn list_drugs(&self) -> DbResult<Vec<LocalDrugEntry>> {
        let sql = format!("{} ORDER BY name", SELECT_COLUMNS);
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([], DrugEntryRow::from_row)?;

        let mut entries = Vec::new();
        for row in rows {
            entries.push(row?.try_into()?);
        }
        Ok(entries)
    }

    /// Delete an entry.
    pub fn delete_drug(&self, name: &str) -> DbResult<bool> {
        let rows_affected = self
            .conn
            .execute("DELETE FROM drug_reference WHERE name = ?", [name])?;
        Ok(rows_affected > 0)
    }

    /// Insert the built-in reference set. Existing entries are left alone.
    ///
    /// Returns the number of entries inserted.
    pub fn seed_default_formulary(&self) -> DbResult<usize> {
        let mut inserted = 0;
        for entry in default_formulary() {
            if self.get_drug(&entry.name)?.is_none() {
                self.upsert_drug(&entry)?;
                inserted += 1;
            }
        }
        tracing::info!(inserted, "seeded default formulary");
        Ok(inserted)
    }

    /// Count formulary entries.
    pub fn count_drugs(&self) -> DbResult<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM drug_reference", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or_default())
    }
}

/// Intermediate row struct for database mapping.
struct DrugEntryRow {
    name: String,
    aliases: String,
    category: Option<String>,
    dose_per_kg: Option<f64>,
    max_daily_dose_per_kg: Option<f64>,
    frequency: Option<String>,
    forms: String,
}

impl DrugEntryRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            name: row.get(0)?,
            aliases: row.get(1)?,
            category: row.get(2)?,
            dose_per_kg: row.get(3)?,
            max_daily_dose_per_kg: row.get(4)?,
            frequency: row.get(5)?,
            forms: row.get(6)?,
        })
    }
}

impl TryFrom<DrugEntryRow> for LocalDrugEntry {
    type Error = DbError;

    fn try_from(row: DrugEntryRow) -> Result<Self, Self::Error> {
        Ok(LocalDrugEntry {
            name: row.name,
            aliases: serde_json::from_str(&row.aliases)?,
            category: row.category,
            dose_per_kg: row.dose_per_kg,
            max_daily_dose_per_kg: row.max_daily_dose_per_kg,
            frequency: row.frequency,
            forms: serde_json::from_str(&row.forms)?,
        })
    }
}

/// Built-in pediatric reference set (doses in mg/kg/day).
pub fn default_formulary() -> Vec<LocalDrugEntry> {
    vec![
        entry(
            "Paracetamol",
            &["PCM", "Dolo", "Crocin", "Acetaminophen", "Calpol"],
            "Antipyretic",
            60.0,
            Some(75.0),
            "Every 6 hours",
            Some((125.0, 5.0)),
            Some(500.0),
        ),
        entry(
            "Ibuprofen",
            &["Brufen", "Advil", "Motrin"],
            "Antipyretic",
            30.0,
            Some(40.0),
            "Every 8 hours",
            Some((100.0, 5.0)),
            Some(200.0),
        ),
        entry(
            "Amoxicillin",
            &["Amoxil", "Mox", "Novamox"],
            "Antibiotic",
            50.0,
            Some(90.0),
            "Every 8 hours",
            Some((250.0, 5.0)),
            Some(250.0),
        ),
        entry(
            "Azithromycin",
            &["Zithromax", "Azithral", "Azee"],
            "Antibiotic",
            10.0,
            Some(10.0),
            "Once a day",
            Some((200.0, 5.0)),
            Some(250.0),
        ),
        entry(
            "Salbutamol",
            &["Albuterol", "Asthalin", "Ventolin"],
            "Respiratory",
            0.3,
            Some(0.6),
            "Three times a day",
            Some((2.0, 5.0)),
            Some(2.0),
        ),
        entry(
            "Ondansetron",
            &["Zofran", "Emeset"],
            "GI",
            0.45,
            None,
            "Every 8 hours",
            Some((2.0, 5.0)),
            Some(4.0),
        ),
    ]
}

#[allow(clippy::too_many_arguments)]
fn entry(
    name: &str,
    aliases: &[&str],
    category: &str,
    dose_per_kg: f64,
    max_daily_dose_per_kg: Option<f64>,
    frequency: &str,
    syrup: Option<(f64, f64)>,
    tablet_mg: Option<f64>,
) -> LocalDrugEntry {
    let mut forms = BTreeMap::new();
    if let Some((strength_mg, volume_ml)) = syrup {
        forms.insert(
            FormKind::Syrup,
            FormStrength {
                strength_mg,
                volume_ml: Some(volume_ml),
            },
        );
    }
    if let Some(strength_mg) = tablet_mg {
        forms.insert(
            FormKind::Tablet,
            FormStrength {
                strength_mg,
                volume_ml: None,
            },
        );
    }

    LocalDrugEntry {
        name: name.to_string(),
        aliases: aliases.iter().map(|a| a.to_string()).collect(),
        category: Some(category.to_string()),
        dose_per_kg: Some(dose_per_kg),
        max_daily_dose_per_kg,
        frequency: Some(frequency.to_string()),
        forms,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_db() -> Database {
        Database::open_in_memory().unwrap()
    }

    #[test]
    fn test_upsert_and_get() {
        let db = setup_db();

        let mut item = LocalDrugEntry::new("Cetirizine");
        item.aliases = vec!["Zyrtec".into()];
        item.dose_per_kg = Some(0.25);
        item.forms.insert(
            FormKind::Syrup,
            FormStrength {
                strength_mg: 5.0,
                volume_ml: Some(5.0),
            },
        );
        db.upsert_drug(&item).unwrap();

        let retrieved = db.get_drug("cetirizine").unwrap().unwrap();
        assert_eq!(retrieved, item);
    }

    #[test]
    fn test_upsert_updates() {
        let db = setup_db();

        let mut item = LocalDrugEntry::new("Cetirizine");
        item.dose_per_kg = Some(0.25);
        db.upsert_drug(&item).unwrap();

        item.frequency = Some("Once a day".into());
        db.upsert_drug(&item).unwrap();

        let retrieved = db.get_drug("Cetirizine").unwrap().unwrap();
        assert_eq!(retrieved.frequency.as_deref(), Some("Once a day"));
        assert_eq!(db.count_drugs().unwrap(), 1);
    }

    #[test]
    fn test_search_by_name_and_alias() {
        let db = setup_db();
        db.seed_default_formulary().unwrap();

        // Name substring
        let results = db.search_drugs("AMOX").unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].name, "Amoxicillin");

        // Alias
        let results = db.search_drugs("crocin").unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].name, "Paracetamol");

        // Alias substring
        let results = db.search_drugs("ventol").unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].name, "Salbutamol");
    }

    #[test]
    fn test_search_multiple_ordered_by_name() {
        let db = setup_db();
        db.seed_default_formulary().unwrap();

        // "mox" hits Amoxicillin (name and alias) only once
        let results = db.search_drugs("mox").unwrap();
        assert_eq!(results.len(), 1);

        let results = db.search_drugs("in").unwrap();
        let names: Vec<&str> = results.iter().map(|e| e.name.as_str()).collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
        assert!(names.len() > 1);
    }

    #[test]
    fn test_search_ignores_json_punctuation() {
        let db = setup_db();
        db.seed_default_formulary().unwrap();

        assert!(db.search_drugs("\",\"").unwrap().is_empty());
        assert!(db.search_drugs("").unwrap().is_empty());
        assert!(db.search_drugs("nonexistentdrug").unwrap().is_empty());
    }

    #[test]
    fn test_search_folds_non_ascii_case() {
        let db = setup_db();
        let mut entry = LocalDrugEntry::new("Ácido Fólico");
        entry.aliases = vec!["ÁCIDO".into()];
        entry.dose_per_kg = Some(0.1);
        db.upsert_drug(&entry).unwrap();

        let results = db.search_drugs("ácido").unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].name, "Ácido Fólico");

        assert_eq!(db.search_drugs("FÓLICO").unwrap().len(), 1);
    }

    #[test]
    fn test_seed_is_idempotent() {
        let db = setup_db();
        let first = db.seed_default_formulary().unwrap();
        let second = db.seed_default_formulary().unwrap();

        assert_eq!(first, default_formulary().len());
        assert_eq!(second, 0);
        assert_eq!(db.count_drugs().unwrap(), first);
    }

    #[test]
    fn test_delete() {
        let db = setup_db();
        db.seed_default_formulary().unwrap();

        assert!(db.delete_drug("Ondansetron").unwrap());
        assert!(!db.delete_drug("Ondansetron").unwrap());
        assert!(db.get_drug("Ondansetron").unwrap().is_none());
    }

    #[test]
    fn test_forms_round_trip() {
        let db = setup_db();
        db.seed_default_formulary().unwrap();

        let paracetamol = db.get_drug("Paracetamol").unwrap().unwrap();
        let syrup = paracetamol.forms.get(&FormKind::Syrup).unwrap();
        assert_eq!(syrup.strength_mg, 125.0);
        assert_eq!(syrup.volume_ml, Some(5.0));
        assert_eq!(
            paracetamol.forms.get(&FormKind::Tablet).unwrap().strength_mg,
            500.0
        );
    }
}
