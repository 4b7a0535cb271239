use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use summary_engine::{generate_dashboard, write_dashboard_json};
use utils::read_existing_months;

/// Write the dashboard data (latest month, chart series, yearly totals) as JSON.
#[derive(Parser, Debug)]
#[command(name = "generate-dashboard", author, version, about, long_about = None)]
struct Args {
    /// Path to settings.json
    #[arg(short, long)]
    settings: Option<PathBuf>,

    /// Output file
    #[arg(short, long, default_value = "dashboard/dashboard.json")]
    out: PathBuf,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    logger::init("info");

    let args = Args::parse();
    let settings = settings_loader::load_settings_with_fallback(args.settings.as_ref());

    println!(
        "Generating dashboard...\n  database: {}\n  output  : {}",
        settings.database_path.display(),
        args.out.display()
    );

    let months = read_existing_months(&settings.database_path).context("read months database")?;
    let dashboard = generate_dashboard(&months);
    write_dashboard_json(&dashboard, &args.out).context("write dashboard.json")?;

    println!("Done. Generated at {}", dashboard.metadata.generated_at);
    Ok(())
}
