//! SQLite schema definition.

/// Complete database schema for the offline formulary.
pub const SCHEMA: &str = r#"
-- ============================================================================
-- Drug Reference (offline formulary)
-- ============================================================================

CREATE TABLE IF NOT EXISTS drug_reference (
    name TEXT PRIMARY KEY COLLATE NOCASE,
    aliases TEXT NOT NULL DEFAULT '[]',           -- JSON array of strings
    category TEXT,
    dose_per_kg REAL,                             -- mg/kg/day
    max_daily_dose_per_kg REAL,                   -- mg/kg/day
    frequency TEXT,
    forms TEXT NOT NULL DEFAULT '{}',             -- JSON object {kind: {strength_mg, volume_ml}}
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_drug_reference_category ON drug_reference(category);
"#;
