//! Text and JSON rendering for CLI output.

use std::fmt::Write;

use peds_dose_core::{
    DoseOutcome, DrugInfo, FormKind, Formulation, LocalDrugEntry, WeightSource,
};

/// "Drug not found" message with suggestions.
pub fn not_found(query: &str, suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        format!("Drug not found: {}", query)
    } else {
        format!(
            "Drug not found: {}. Did you mean: {}?",
            query,
            suggestions.join(", ")
        )
    }
}

/// One-line summary of a formulary entry.
pub fn entry_line(entry: &LocalDrugEntry) -> String {
    let mut line = entry.name.clone();
    if !entry.aliases.is_empty() {
        let _ = write!(line, " ({})", entry.aliases.join(", "));
    }
    if let Some(dose) = entry.dose_per_kg {
        let _ = write!(line, " - {} mg/kg/day", dose);
    }
    for (kind, strength) in &entry.forms {
        let _ = write!(line, " | {} {}", kind, strength.to_formulation(*kind).label());
    }
    line
}

/// Human-readable calculation report.
pub fn render(info: &DrugInfo, formulation: &Formulation, outcome: &DoseOutcome) -> String {
    let result = &outcome.result;
    let mut out = String::new();

    let source = match info {
        DrugInfo::Online(_) => "online search",
        DrugInfo::Offline(_) => "offline formulary",
    };
    let _ = writeln!(out, "{} ({})", info.name(), source);
    if let Some(category) = info.category() {
        let _ = writeln!(out, "  Category:     {}", category);
    }

    let weight_note = match outcome.weight.source {
        WeightSource::Measured => String::new(),
        WeightSource::EstimatedFromAge { age_years } => {
            format!(" (estimated from age {})", age_years)
        }
    };
    let _ = writeln!(out, "  Weight:       {} kg{}", outcome.weight.display(), weight_note);
    let _ = writeln!(
        out,
        "  Frequency:    {} ({} doses/day)",
        info.frequency().unwrap_or("unspecified"),
        result.doses_per_day
    );
    if formulation.has_usable_strength() {
        let _ = writeln!(out, "  Formulation:  {} {}", formulation.kind, formulation.label());
    } else {
        let _ = writeln!(out, "  Formulation:  {} (strength unknown)", formulation.kind);
    }

    let _ = writeln!(out, "  Single dose:  {:.2} mg", result.single_dose_mg);
    let _ = writeln!(out, "  Daily total:  {:.2} mg", result.total_daily_dose_mg);
    if let Some(max) = result.max_daily_dose_mg {
        let _ = writeln!(out, "  Daily max:    {:.2} mg", max);
    }

    match result.form {
        FormKind::Syrup => {
            if let Some(ml) = result.display_volume() {
                let _ = writeln!(out, "  Give:         {} mL per dose", ml);
            }
        }
        FormKind::Tablet => {
            if let Some(tablets) = result.display_tablets() {
                let _ = writeln!(out, "  Give:         {} tablets per dose", tablets);
            }
        }
    }

    if let Some(warning) = &result.warning {
        let _ = writeln!(out, "  WARNING:      {}", warning);
    }
    out
}

/// Pretty JSON with the drug, formulation, weight, and result.
pub fn to_json(
    info: &DrugInfo,
    formulation: &Formulation,
    outcome: &DoseOutcome,
) -> serde_json::Result<String> {
    let value = serde_json::json!({
        "drug": info,
        "formulation": formulation,
        "weight": outcome.weight,
        "result": outcome.result,
        "summary": outcome.result.summary(),
    });
    serde_json::to_string_pretty(&value)
}
