use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use utils::{export_csv, read_existing_months};

/// Export every recorded month to a spreadsheet-friendly CSV file.
#[derive(Parser, Debug)]
#[command(name = "export-csv", author, version, about, long_about = None)]
struct Args {
    /// Path to settings.json
    #[arg(short, long)]
    settings: Option<PathBuf>,

    /// Output file or directory (default: export_dir from settings)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    logger::init("info");

    let args = Args::parse();
    let settings = settings_loader::load_settings_with_fallback(args.settings.as_ref());
    let months = read_existing_months(&settings.database_path)
        .with_context(|| format!("reading {}", settings.database_path.display()))?;

    let out = args.out.unwrap_or_else(|| settings.export_dir.clone());
    let path = export_csv(&months, &out)?;

    println!("✓ Exported {} months to {}", months.len(), path.display());
    Ok(())
}
