use anyhow::{anyhow, Context, Result};
use clap::Parser;
use std::path::PathBuf;
use utils::{read_existing_months, validate_months, ValidationReport};

/// Check the months database for records the calculator would accept but
/// that are probably mistakes.
#[derive(Parser, Debug)]
#[command(name = "validate-months", author, version, about, long_about = None)]
struct Args {
    /// Path to settings.json
    #[arg(short, long)]
    settings: Option<PathBuf>,

    /// Database file or directory (default: database_path from settings)
    #[arg(short, long)]
    db: Option<PathBuf>,
}

fn print_report(report: &ValidationReport, file: &str) {
    for w in &report.warnings {
        println!("[WARN] {}: {}", file, w);
    }
    for e in &report.errors {
        println!("[ERROR] {}: {}", file, e);
    }
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    logger::init("warn");

    let args = Args::parse();
    let settings = settings_loader::load_settings_with_fallback(args.settings.as_ref());
    let db_path = args.db.unwrap_or_else(|| settings.database_path.clone());

    let months =
        read_existing_months(&db_path).with_context(|| format!("reading {}", db_path.display()))?;
    let report = validate_months(&months);
    print_report(&report, &db_path.display().to_string());

    if report.has_errors() {
        Err(anyhow!("Validation failed"))
    } else {
        println!("All {} month records passed validation.", months.len());
        Ok(())
    }
}
