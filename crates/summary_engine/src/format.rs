use crate::round_currency;

/// Brazilian real, always two decimals: `R$ 1.234,56`, `-R$ 100,00`.
pub fn format_currency(value: f64) -> String {
    let rounded = round_currency(value);
    let body = grouped_decimal(rounded.abs());
    if rounded < 0.0 {
        format!("-R$ {body}")
    } else {
        format!("R$ {body}")
    }
}

/// Two decimals with a comma separator and no grouping (`4500,00`).
pub fn format_decimal(value: f64) -> String {
    format!("{:.2}", round_currency(value)).replace('.', ",")
}

/// Percentages as entered, comma decimal separator, no trailing zeros
/// (`35`, `12,5`).
pub fn format_percent(value: f64) -> String {
    format!("{value}").replace('.', ",")
}

fn grouped_decimal(value: f64) -> String {
    let fixed = format!("{value:.2}");
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let digits: Vec<char> = int_part.chars().collect();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(*c);
    }

    format!("{grouped},{frac_part}")
}
