//! Command-line pediatric dose calculator.
//!
//! # Environment Variables
//!
//! - `PEDS_DOSE_DB`: Formulary database path (default: "peds-dose.sqlite",
//!   ":memory:" for a throwaway database)
//! - `RUST_LOG`: Log filter (default: "peds_dose=info")

mod report;

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use peds_dose_core::dosing::{doses_per_day, estimate_weight};
use peds_dose_core::{
    Calculator, Database, DoseRequest, DosingError, DrugInfo, DrugQuery, DrugSource, FormKind,
    Formulation, LookupError, OfflineLookup, PatientParameters,
};
use peds_dose_llm::parse_search_output;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "peds-dose")]
#[command(about = "Weight-based pediatric dose calculator")]
struct Cli {
    /// Formulary database path
    #[arg(long, env = "PEDS_DOSE_DB", default_value = "peds-dose.sqlite", global = true)]
    db: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Calculate a dose
    Calc(CalcArgs),
    /// Search the offline formulary
    Search {
        /// Name, brand, or abbreviation (substring)
        term: String,
    },
    /// Seed the built-in formulary
    Seed,
    /// Estimate weight in kg from age in years
    EstimateWeight {
        /// Age in years (fractions allowed, e.g. 0.5)
        #[arg(allow_negative_numbers = true)]
        age: f64,
    },
    /// Doses per day for a frequency description
    Frequency {
        /// e.g. "Every 8 hours", "twice a day", "q6h"
        text: String,
    },
}

#[derive(clap::Args)]
struct CalcArgs {
    /// Drug name, brand, or abbreviation
    query: String,
    /// Weight in kg
    #[arg(long)]
    weight: Option<f64>,
    /// Age in years (used when weight is absent)
    #[arg(long)]
    age: Option<f64>,
    /// Formulation: syrup or tablet
    #[arg(long)]
    form: Option<FormKind>,
    /// Strength in mg (per --volume for syrups, per tablet)
    #[arg(long)]
    strength: Option<f64>,
    /// Syrup volume in mL carrying --strength
    #[arg(long)]
    volume: Option<f64>,
    /// Saved online search reply to use instead of the formulary
    #[arg(long)]
    search_response: Option<PathBuf>,
    /// Print JSON instead of a report
    #[arg(long)]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("peds_dose=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Calc(args) => {
            let db = open_database(&cli.db, true)?;
            calc(&db, args)?;
        }
        Commands::Search { term } => {
            let db = open_database(&cli.db, true)?;
            let entries = OfflineLookup::new(&db).search(&term)?;
            if entries.is_empty() {
                println!("No matching drugs found.");
            }
            for entry in entries {
                println!("{}", report::entry_line(&entry));
            }
        }
        Commands::Seed => {
            let db = open_database(&cli.db, false)?;
            let inserted = db.seed_default_formulary()?;
            println!("Seeded {} drugs ({} total).", inserted, db.count_drugs()?);
        }
        Commands::EstimateWeight { age } => {
            let weight = estimate_weight(age);
            if weight <= 0.0 {
                bail!(DosingError::UnresolvableWeight);
            }
            println!("{:.1} kg", weight);
        }
        Commands::Frequency { text } => {
            println!("{}", doses_per_day(Some(&text)));
        }
    }

    Ok(())
}

fn open_database(path: &str, seed_if_empty: bool) -> anyhow::Result<Database> {
    let db = if path == ":memory:" {
        Database::open_in_memory()?
    } else {
        Database::open(path).with_context(|| format!("Failed to open formulary at {}", path))?
    };

    if seed_if_empty && db.count_drugs()? == 0 {
        tracing::info!("formulary is empty, seeding defaults");
        db.seed_default_formulary()?;
    }
    Ok(db)
}

fn calc(db: &Database, args: CalcArgs) -> anyhow::Result<()> {
    let query = DrugQuery {
        text: args.query.clone(),
        weight_kg: args.weight,
        age_years: args.age,
    };

    let info = match &args.search_response {
        Some(path) => {
            let reply = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            parse_search_output(&reply)?.into_drug_info()
        }
        None => match OfflineLookup::new(db).lookup(&query) {
            Ok(info) => info,
            Err(LookupError::NotFound { query, suggestions }) => {
                bail!(report::not_found(&query, &suggestions))
            }
            Err(e) => return Err(e.into()),
        },
    };

    let Some(drug) = info.reference() else {
        bail!(DosingError::MissingDosePerKg(info.name().to_string()));
    };

    let formulation = Formulation::overlay(
        requested_formulation(&info, args.form),
        args.form,
        args.strength,
        args.volume,
    );

    let outcome = Calculator::new().calculate(&DoseRequest {
        patient: PatientParameters {
            weight_kg: args.weight,
            age_years: args.age,
        },
        drug,
        formulation,
    })?;

    if args.json {
        println!("{}", report::to_json(&info, &formulation, &outcome)?);
    } else {
        print!("{}", report::render(&info, &formulation, &outcome));
    }
    Ok(())
}

fn requested_formulation(info: &DrugInfo, kind: Option<FormKind>) -> Option<Formulation> {
    match kind {
        Some(kind) => info.formulation(kind),
        None => info.suggested_formulation(),
    }
}
