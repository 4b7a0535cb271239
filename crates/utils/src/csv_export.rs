use anyhow::{bail, Context, Result};
use chrono::{Datelike, Local};
use models::MonthData;
use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};
use summary_engine::{calculate_summary, format_decimal, format_percent};

const BOM: &str = "\u{feff}";

pub const CSV_HEADERS: [&str; 9] = [
    "Mês",
    "Ano",
    "Faturamento",
    "Despesas Totais",
    "Taxa Adm (%)",
    "Taxa Adm (R$)",
    "Lucro Líquido",
    "Sócios",
    "Valor/Sócio",
];

/// `flat-money-relatorio-<current year>.csv`
pub fn default_csv_file_name() -> String {
    format!("flat-money-relatorio-{}.csv", Local::now().year())
}

/// Writes the spreadsheet-friendly report: BOM, `;` separated, comma
/// decimals, one row per month in collection order.
pub fn write_csv<W: Write>(months: &[MonthData], mut writer: W) -> Result<()> {
    if months.is_empty() {
        bail!("Nothing to export: there are no month records");
    }

    writer.write_all(BOM.as_bytes())?;

    let mut wtr = csv::WriterBuilder::new()
        .delimiter(b';')
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(&mut writer);

    wtr.write_record(CSV_HEADERS)?;
    for m in months {
        let s = calculate_summary(m);
        wtr.write_record([
            m.month.label().to_string(),
            m.year.to_string(),
            format_decimal(s.total_revenue),
            format_decimal(s.total_expenses),
            format_percent(m.admin_fee_percent),
            format_decimal(s.admin_fee_amount),
            format_decimal(s.net_profit),
            m.partners_count.to_string(),
            format_decimal(s.per_partner_amount),
        ])?;
    }
    wtr.flush()?;

    Ok(())
}

/// Writes the report to `path`, or to the default file name inside it when
/// `path` is a directory. An empty collection leaves any existing file
/// untouched.
pub fn export_csv<P: AsRef<Path>>(months: &[MonthData], path: P) -> Result<PathBuf> {
    if months.is_empty() {
        bail!("Nothing to export: there are no month records");
    }
    let path = path.as_ref();
    let out_path = if path.is_dir() || path.extension().is_none() {
        path.join(default_csv_file_name())
    } else {
        path.to_path_buf()
    };

    if let Some(parent) = out_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let file = File::create(&out_path)
        .with_context(|| format!("Cannot create CSV file at {:?}", out_path))?;
    write_csv(months, file)?;

    tracing::info!(rows = months.len(), "Exported CSV report to {:?}", out_path);
    Ok(out_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use models::MonthName;

    fn sample() -> Vec<MonthData> {
        let mut loss = MonthData::new(MonthName::Fevereiro, 2025, 1000.0, 50.0).with_expense("Reparo", 600.0);
        loss.partners_count = 2;
        vec![
            MonthData::new(MonthName::Janeiro, 2025, 10000.0, 35.0)
                .with_expense("Limpeza", 1500.0)
                .with_expense("Luz", 500.0),
            loss,
        ]
    }

    #[test]
    fn test_csv_layout() {
        let mut buf = Vec::new();
        write_csv(&sample(), &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();

        assert!(text.starts_with('\u{feff}'));
        let lines: Vec<&str> = text.trim_start_matches('\u{feff}').lines().collect();
        assert_eq!(
            lines[0],
            "Mês;Ano;Faturamento;Despesas Totais;Taxa Adm (%);Taxa Adm (R$);Lucro Líquido;Sócios;Valor/Sócio"
        );
        assert_eq!(lines[1], "Janeiro;2025;10000,00;2000,00;35;3500,00;4500,00;1;4500,00");
        assert_eq!(lines[2], "Fevereiro;2025;1000,00;600,00;50;500,00;-100,00;2;0,00");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_fractional_fee_uses_comma() {
        let months = vec![MonthData::new(MonthName::Maio, 2025, 800.0, 12.5)];
        let mut buf = Vec::new();
        write_csv(&months, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("Maio;2025;800,00;0,00;12,5;100,00;700,00;1;700,00"));
    }

    #[test]
    fn test_empty_collection_is_refused() {
        let mut buf = Vec::new();
        assert!(write_csv(&[], &mut buf).is_err());
        assert!(buf.is_empty());
    }

    #[test]
    fn test_empty_export_keeps_previous_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("relatorio.csv");
        fs::write(&path, "conteúdo anterior").unwrap();

        assert!(export_csv(&[], &path).is_err());
        assert_eq!(fs::read_to_string(&path).unwrap(), "conteúdo anterior");
    }

    #[test]
    fn test_export_into_directory_uses_default_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = export_csv(&sample(), dir.path()).unwrap();

        assert_eq!(path.file_name().unwrap().to_str().unwrap(), default_csv_file_name());
        assert!(fs::read_to_string(path).unwrap().contains("Janeiro;2025"));
    }
}
