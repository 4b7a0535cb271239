use anyhow::{anyhow, Context, Result};
use chrono::{Datelike, Local};
use clap::{Parser, Subcommand};
use models::{MonthData, MonthName};
use std::path::PathBuf;
use summary_engine::{
    calculate_summary, format_currency, format_percent, latest_breakdown, share_report,
    sorted_newest_first, yearly_totals,
};
use utils::{parse_amount, MonthStore};

#[derive(Parser, Debug)]
#[command(
    name = "months",
    author,
    version,
    about = "Record and review the monthly figures of a rental flat"
)]
struct Args {
    /// Path to settings.json (defaults to ./settings.json, then built-in defaults)
    #[arg(short, long, global = true)]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Record a new month
    Add {
        /// Month label or number (default: current month)
        #[arg(short, long, value_parser = month_arg)]
        month: Option<MonthName>,

        /// Year (default: current year)
        #[arg(short, long)]
        year: Option<i32>,

        /// Gross revenue, e.g. 10000 or "10.000,00"
        #[arg(short, long, value_parser = amount_arg)]
        revenue: f64,

        /// Expense as "description=amount"; repeat for several
        #[arg(short, long = "expense", value_parser = expense_arg)]
        expenses: Vec<(String, f64)>,

        /// Admin fee percentage over gross revenue (default from settings)
        #[arg(short, long)]
        fee: Option<f64>,

        /// Number of partners sharing the profit (default from settings)
        #[arg(short, long)]
        partners: Option<i32>,
    },

    /// Replace fields of an existing month; unspecified fields are kept
    Edit {
        id: String,

        #[arg(short, long, value_parser = month_arg)]
        month: Option<MonthName>,

        #[arg(short, long)]
        year: Option<i32>,

        #[arg(short, long, value_parser = amount_arg)]
        revenue: Option<f64>,

        /// Drop all existing expenses before adding the new ones
        #[arg(long)]
        clear_expenses: bool,

        /// Expense id to remove; repeat for several
        #[arg(long = "remove-expense")]
        remove_expenses: Vec<String>,

        /// Expense to add as "description=amount"; repeat for several
        #[arg(short, long = "expense", value_parser = expense_arg)]
        expenses: Vec<(String, f64)>,

        #[arg(short, long)]
        fee: Option<f64>,

        #[arg(short, long)]
        partners: Option<i32>,
    },

    /// Delete a month
    Delete { id: String },

    /// List months, newest first
    List,

    /// Show one month with its expenses and summary
    Show {
        id: String,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Chat-friendly text report (default: latest month)
    Report { id: Option<String> },

    /// Overview of the latest month and yearly totals
    Dashboard,
}

fn month_arg(s: &str) -> Result<MonthName, String> {
    MonthName::parse(s).ok_or_else(|| format!("unknown month '{s}' (use Janeiro..Dezembro or 1..12)"))
}

fn amount_arg(s: &str) -> Result<f64, String> {
    parse_amount(s).map_err(|e| e.to_string())
}

fn expense_arg(s: &str) -> Result<(String, f64), String> {
    let (description, amount) = s
        .rsplit_once('=')
        .ok_or_else(|| format!("expected \"description=amount\", got '{s}'"))?;
    let description = description.trim();
    if description.is_empty() {
        return Err(format!("expense '{s}' has no description"));
    }
    Ok((description.to_string(), amount_arg(amount)?))
}

fn add_expenses(mut month: MonthData, expenses: Vec<(String, f64)>) -> MonthData {
    for (description, amount) in expenses {
        month = month.with_expense(description, amount);
    }
    month
}

fn print_month(month: &MonthData) {
    let s = calculate_summary(month);
    println!("{} [{}]", month.period_label(), month.id);
    println!("  Faturamento:       {}", format_currency(s.total_revenue));
    for e in &month.expenses {
        println!("    - {:<24} {} ({})", e.description, format_currency(e.amount), e.id);
    }
    println!("  Despesas:          {}", format_currency(s.total_expenses));
    println!(
        "  Taxa Adm ({:>5}%): {}",
        format_percent(month.admin_fee_percent),
        format_currency(s.admin_fee_amount)
    );
    println!("  Lucro Líquido:     {}", format_currency(s.net_profit));
    println!(
        "  Por sócio ({}):     {}",
        month.partners_count,
        format_currency(s.per_partner_amount)
    );
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    logger::init("warn");

    let args = Args::parse();
    let settings = settings_loader::load_settings_with_fallback(args.settings.as_ref());
    let mut store = MonthStore::open(&settings)
        .with_context(|| format!("opening {}", settings.database_path.display()))?;

    match args.command {
        Command::Add {
            month,
            year,
            revenue,
            expenses,
            fee,
            partners,
        } => {
            let mut record = MonthData::new(
                month.unwrap_or_else(MonthName::current),
                year.unwrap_or_else(|| Local::now().year()),
                revenue,
                fee.unwrap_or(settings.default_admin_fee_percent),
            );
            record.id = store.fresh_id();
            record.partners_count = partners.unwrap_or(settings.default_partners_count);
            let record = add_expenses(record, expenses);

            store.append(record.clone())?;
            println!("✓ Saved month {}", record.id);
            print_month(&record);
        }
        Command::Edit {
            id,
            month,
            year,
            revenue,
            clear_expenses,
            remove_expenses,
            expenses,
            fee,
            partners,
        } => {
            let mut record = store
                .get(&id)
                .cloned()
                .ok_or_else(|| anyhow!("month record '{}' not found", id))?;

            if let Some(m) = month {
                record.month = m;
            }
            if let Some(y) = year {
                record.year = y;
            }
            if let Some(r) = revenue {
                record.revenue = r;
            }
            if let Some(f) = fee {
                record.admin_fee_percent = f;
            }
            if let Some(p) = partners {
                record.partners_count = p;
            }
            if clear_expenses {
                record.expenses.clear();
            }
            for expense_id in &remove_expenses {
                let before = record.expenses.len();
                record.expenses.retain(|e| &e.id != expense_id);
                if record.expenses.len() == before {
                    return Err(anyhow!("expense '{}' not found in month '{}'", expense_id, id));
                }
            }
            let record = add_expenses(record, expenses);

            store.replace(record.clone())?;
            println!("✓ Updated month {}", record.id);
            print_month(&record);
        }
        Command::Delete { id } => {
            let removed = store.remove(&id)?;
            println!("✓ Deleted {} [{}]", removed.period_label(), removed.id);
        }
        Command::List => {
            if store.is_empty() {
                println!("No months recorded yet. Add one with `months add --revenue <amount>`.");
                return Ok(());
            }
            println!(
                "{:<15} {:<16} {:>16} {:>16} {:>16} {:>16}",
                "ID", "Mês", "Faturamento", "Despesas", "Lucro", "Por sócio"
            );
            for m in sorted_newest_first(store.months()) {
                let s = calculate_summary(m);
                println!(
                    "{:<15} {:<16} {:>16} {:>16} {:>16} {:>16}",
                    m.id,
                    m.period_label(),
                    format_currency(s.total_revenue),
                    format_currency(s.total_expenses),
                    format_currency(s.net_profit),
                    format_currency(s.per_partner_amount)
                );
            }
        }
        Command::Show { id, json } => {
            let record = store
                .get(&id)
                .ok_or_else(|| anyhow!("month record '{}' not found", id))?;
            if json {
                let out = serde_json::json!({
                    "month": record,
                    "summary": calculate_summary(record),
                });
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                print_month(record);
            }
        }
        Command::Report { id } => {
            let record = match id {
                Some(id) => store
                    .get(&id)
                    .ok_or_else(|| anyhow!("month record '{}' not found", id))?,
                None => store.latest().ok_or_else(|| anyhow!("no months recorded yet"))?,
            };
            println!("{}", share_report(record));
        }
        Command::Dashboard => {
            let Some(latest) = latest_breakdown(store.months()) else {
                println!("No months recorded yet.");
                return Ok(());
            };
            println!("Último lançamento: {}", latest.period);
            println!("  Faturamento:   {}", format_currency(latest.summary.total_revenue));
            println!("  Despesas:      {}", format_currency(latest.expenses_slice));
            println!(
                "  Taxa Adm ({}%): {}",
                format_percent(latest.admin_fee_percent),
                format_currency(latest.admin_fee_slice)
            );
            println!("  Lucro Líquido: {}", format_currency(latest.summary.net_profit));
            if latest.is_loss {
                println!("  ⚠ Mês com prejuízo");
            }
            println!();
            println!("{:<6} {:>6} {:>18} {:>18}", "Ano", "Meses", "Faturamento", "Lucro");
            for y in yearly_totals(store.months()) {
                println!(
                    "{:<6} {:>6} {:>18} {:>18}",
                    y.year,
                    y.months_count,
                    format_currency(y.total_revenue),
                    format_currency(y.total_net_profit)
                );
            }
        }
    }

    Ok(())
}
