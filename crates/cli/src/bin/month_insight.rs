use ai_client::{month_insight, OllamaClient, OllamaConfig, INSIGHT_FALLBACK};
use anyhow::{anyhow, Context, Result};
use clap::Parser;
use std::path::PathBuf;
use summary_engine::share_report;
use utils::read_existing_months;

/// Ask the local Ollama model for a short narrative about one month.
///
/// The figures are always printed; the narrative degrades to a neutral
/// message when the model is unavailable.
#[derive(Parser, Debug)]
#[command(name = "month-insight", author, version, about, long_about = None)]
struct Args {
    /// Month id (default: latest month)
    id: Option<String>,

    /// Path to settings.json
    #[arg(short, long)]
    settings: Option<PathBuf>,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    logger::init("info");

    let args = Args::parse();
    let settings = settings_loader::load_settings_with_fallback(args.settings.as_ref());
    let months = read_existing_months(&settings.database_path)
        .with_context(|| format!("reading {}", settings.database_path.display()))?;

    let month = match &args.id {
        Some(id) => months
            .iter()
            .find(|m| &m.id == id)
            .ok_or_else(|| anyhow!("month record '{}' not found", id))?,
        None => months.last().ok_or_else(|| anyhow!("no months recorded yet"))?,
    };

    println!("{}\n", share_report(month));

    let narrative = match OllamaConfig::from_env().and_then(OllamaClient::new) {
        Ok(client) => month_insight(&client, month),
        Err(err) => {
            tracing::warn!("Ollama client unavailable: {:#}", err);
            INSIGHT_FALLBACK.to_string()
        }
    };
    println!("{}", narrative);

    Ok(())
}
