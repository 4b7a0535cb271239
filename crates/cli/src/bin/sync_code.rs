use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::{fs, path::PathBuf};
use utils::{decode_sync_code, encode_sync_code, merge_months_with_deduplication, MonthStore};

/// Move the month records between devices as a copy-and-paste code.
#[derive(Parser, Debug)]
#[command(name = "sync-code", author, version, about, long_about = None)]
struct Args {
    /// Path to settings.json
    #[arg(short, long, global = true)]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print (or write) the sync code of every recorded month
    Export {
        /// Write the code to this file instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Load a sync code produced on another device
    Import {
        /// The code itself; use --file for long codes
        code: Option<String>,

        /// Read the code from a file
        #[arg(short, long, conflicts_with = "code")]
        file: Option<PathBuf>,

        /// Keep current months and only add the ones not present yet
        #[arg(long)]
        merge: bool,

        /// Confirm replacing the current months
        #[arg(short, long)]
        yes: bool,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    logger::init("warn");

    let args = Args::parse();
    let settings = settings_loader::load_settings_with_fallback(args.settings.as_ref());
    let mut store = MonthStore::open(&settings)
        .with_context(|| format!("opening {}", settings.database_path.display()))?;

    match args.command {
        Command::Export { out } => {
            let code = encode_sync_code(store.months())?;
            match out {
                Some(path) => {
                    fs::write(&path, &code).with_context(|| format!("writing {}", path.display()))?;
                    println!("✓ Sync code for {} months written to {}", store.len(), path.display());
                }
                None => println!("{}", code),
            }
        }
        Command::Import {
            code,
            file,
            merge,
            yes,
        } => {
            let code = match (code, file) {
                (Some(code), _) => code,
                (None, Some(path)) => {
                    fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?
                }
                (None, None) => bail!("provide the sync code as an argument or with --file"),
            };

            let incoming = decode_sync_code(&code).context("Invalid sync code")?;

            if merge {
                let (merged, stats) =
                    merge_months_with_deduplication(store.months().to_vec(), incoming);
                store.import_all(merged)?;
                println!(
                    "✓ Merged sync code: {} added, {} already present ({} in code)",
                    stats.added, stats.skipped, stats.total
                );
            } else {
                if !store.is_empty() && !yes {
                    bail!(
                        "this replaces the {} months currently recorded; re-run with --yes to confirm or use --merge",
                        store.len()
                    );
                }
                let count = incoming.len();
                store.import_all(incoming)?;
                println!("✓ Imported {} months", count);
            }
        }
    }

    Ok(())
}
