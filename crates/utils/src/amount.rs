use anyhow::{anyhow, Result};
use regex::Regex;

/// Parses an amount typed by a person: `1500`, `1500.5`, `1.500,50`,
/// `R$ 1.500,50`, `-80`.
///
/// When a comma is present it is the decimal separator and dots are
/// thousands separators. Without a comma, several dots are all grouping,
/// and so is a single dot followed by exactly three digits (`1.500`).
/// Any other single dot is the decimal point.
pub fn parse_amount(input: &str) -> Result<f64> {
    let noise = Regex::new(r"[^0-9,.\-]").map_err(|e| anyhow!("invalid amount pattern: {e}"))?;
    let cleaned = noise.replace_all(input.trim(), "").to_string();

    let normalized = if cleaned.contains(',') {
        cleaned.replace('.', "").replace(',', ".")
    } else if cleaned.matches('.').count() > 1 || is_thousands_group(&cleaned) {
        cleaned.replace('.', "")
    } else {
        cleaned
    };

    let shape = Regex::new(r"^-?\d+(\.\d+)?$").map_err(|e| anyhow!("invalid amount pattern: {e}"))?;
    if !shape.is_match(&normalized) {
        return Err(anyhow!("'{}' is not a valid amount", input.trim()));
    }

    normalized
        .parse::<f64>()
        .map_err(|e| anyhow!("'{}' is not a valid amount: {e}", input.trim()))
}

fn is_thousands_group(cleaned: &str) -> bool {
    match cleaned.split_once('.') {
        Some((int, frac)) => {
            let digits = int.trim_start_matches('-');
            !digits.is_empty() && frac.len() == 3 && frac.bytes().all(|b| b.is_ascii_digit())
        }
        None => false,
    }
}
