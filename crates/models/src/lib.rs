use chrono::{Datelike, Local, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

// Month labels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MonthName {
	Janeiro,
	Fevereiro,
	#[serde(rename = "Março")]
	Marco,
	Abril,
	Maio,
	Junho,
	Julho,
	Agosto,
	Setembro,
	Outubro,
	Novembro,
	Dezembro,
}

impl MonthName {
	pub const ALL: [MonthName; 12] = [
		MonthName::Janeiro,
		MonthName::Fevereiro,
		MonthName::Marco,
		MonthName::Abril,
		MonthName::Maio,
		MonthName::Junho,
		MonthName::Julho,
		MonthName::Agosto,
		MonthName::Setembro,
		MonthName::Outubro,
		MonthName::Novembro,
		MonthName::Dezembro,
	];

	pub fn label(self) -> &'static str {
		match self {
			MonthName::Janeiro => "Janeiro",
			MonthName::Fevereiro => "Fevereiro",
			MonthName::Marco => "Março",
			MonthName::Abril => "Abril",
			MonthName::Maio => "Maio",
			MonthName::Junho => "Junho",
			MonthName::Julho => "Julho",
			MonthName::Agosto => "Agosto",
			MonthName::Setembro => "Setembro",
			MonthName::Outubro => "Outubro",
			MonthName::Novembro => "Novembro",
			MonthName::Dezembro => "Dezembro",
		}
	}

	/// First three letters of the label, as used on chart axes ("Mar").
	pub fn abbreviation(self) -> String {
		self.label().chars().take(3).collect()
	}

	/// 1-based calendar month number.
	pub fn number(self) -> u32 {
		MonthName::ALL.iter().position(|m| *m == self).unwrap_or(0) as u32 + 1
	}

	pub fn from_number(number: u32) -> Option<Self> {
		number
			.checked_sub(1)
			.and_then(|idx| MonthName::ALL.get(idx as usize).copied())
	}

	/// Accepts the canonical label (case-insensitive, with or without the
	/// cedilla) or a month number `1..=12`.
	pub fn parse(input: &str) -> Option<Self> {
		let trimmed = input.trim();
		if let Ok(n) = trimmed.parse::<u32>() {
			return MonthName::from_number(n);
		}
		let folded = trimmed.to_lowercase().replace('ç', "c");
		MonthName::ALL
			.iter()
			.copied()
			.find(|m| m.label().to_lowercase().replace('ç', "c") == folded)
	}

	pub fn current() -> Self {
		MonthName::from_number(Local::now().month()).unwrap_or(MonthName::Janeiro)
	}
}

impl fmt::Display for MonthName {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.label())
	}
}

// Persisted records
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseItem {
	pub id: String,
	pub description: String,
	pub amount: f64,
}

fn default_partners_count() -> i32 {
	1
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthData {
	pub id: String,
	pub month: MonthName,
	pub year: i32,
	pub revenue: f64,
	#[serde(default)]
	pub expenses: Vec<ExpenseItem>,
	#[serde(default)]
	pub admin_fee_percent: f64,
	#[serde(default = "default_partners_count")]
	pub partners_count: i32,
	#[serde(default)]
	pub created_at: i64,
}

impl MonthData {
	/// Builds a fresh record stamped with the current wall clock. The id is
	/// the creation time in milliseconds; callers holding a collection
	/// should prefer an id that is known to be unique there.
	pub fn new(month: MonthName, year: i32, revenue: f64, admin_fee_percent: f64) -> Self {
		let now = now_millis();
		Self {
			id: now.to_string(),
			month,
			year,
			revenue,
			expenses: Vec::new(),
			admin_fee_percent,
			partners_count: 1,
			created_at: now,
		}
	}

	/// Appends an expense whose id is the record id plus the first free
	/// position suffix (`<id>-1`, `<id>-2`, ...).
	pub fn with_expense(mut self, description: impl Into<String>, amount: f64) -> Self {
		let mut n = self.expenses.len() + 1;
		let id = loop {
			let candidate = format!("{}-{}", self.id, n);
			if !self.expenses.iter().any(|e| e.id == candidate) {
				break candidate;
			}
			n += 1;
		};
		self.expenses.push(ExpenseItem {
			id,
			description: description.into(),
			amount,
		});
		self
	}

	/// "Março/2025"
	pub fn period_label(&self) -> String {
		format!("{}/{}", self.month, self.year)
	}
}

pub fn now_millis() -> i64 {
	Utc::now().timestamp_millis()
}

// Derived values
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialSummary {
	pub total_revenue: f64,
	pub total_expenses: f64,
	pub net_profit: f64,
	pub admin_fee_amount: f64,
	pub per_partner_amount: f64,
}

// Settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
	pub database_path: PathBuf,
	pub default_admin_fee_percent: f64,
	pub default_partners_count: i32,
	pub activity_log_path: Option<PathBuf>,
	pub export_dir: PathBuf,
}

impl Default for Settings {
	fn default() -> Self {
		Self {
			database_path: PathBuf::from("database/months.json"),
			default_admin_fee_percent: 35.0,
			default_partners_count: 1,
			activity_log_path: None,
			export_dir: PathBuf::from("exports"),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	#[test]
	fn test_month_data_deserializes_camel_case() {
		let value = json!({
			"id": "1717171717171",
			"month": "Março",
			"year": 2025,
			"revenue": 10000.0,
			"expenses": [{"id": "e1", "description": "Limpeza", "amount": 1500.0}],
			"adminFeePercent": 35,
			"partnersCount": 1,
			"createdAt": 1717171717171i64
		});

		let month: MonthData = serde_json::from_value(value).unwrap();
		assert_eq!(month.month, MonthName::Marco);
		assert_eq!(month.expenses.len(), 1);
		assert_eq!(month.admin_fee_percent, 35.0);
		assert_eq!(month.created_at, 1717171717171);
	}

	#[test]
	fn test_missing_optional_fields_take_defaults() {
		let value = json!({"id": "a", "month": "Maio", "year": 2024, "revenue": 100.0});
		let month: MonthData = serde_json::from_value(value).unwrap();
		assert!(month.expenses.is_empty());
		assert_eq!(month.partners_count, 1);
		assert_eq!(month.admin_fee_percent, 0.0);
	}

	#[test]
	fn test_unknown_month_label_is_rejected() {
		let value = json!({"id": "a", "month": "March", "year": 2024, "revenue": 100.0});
		assert!(serde_json::from_value::<MonthData>(value).is_err());
	}

	#[test]
	fn test_month_serializes_with_cedilla() {
		let value = serde_json::to_value(MonthName::Marco).unwrap();
		assert_eq!(value, json!("Março"));
	}

	#[test]
	fn test_month_parse_variants() {
		assert_eq!(MonthName::parse("marco"), Some(MonthName::Marco));
		assert_eq!(MonthName::parse("MARÇO"), Some(MonthName::Marco));
		assert_eq!(MonthName::parse("12"), Some(MonthName::Dezembro));
		assert_eq!(MonthName::parse("13"), None);
		assert_eq!(MonthName::parse("0"), None);
		assert_eq!(MonthName::parse("Smarch"), None);
	}

	#[test]
	fn test_abbreviation_and_number() {
		assert_eq!(MonthName::Marco.abbreviation(), "Mar");
		assert_eq!(MonthName::Janeiro.number(), 1);
		assert_eq!(MonthName::Dezembro.number(), 12);
	}

	#[test]
	fn test_expense_ids_skip_taken_suffixes() {
		let mut month = MonthData::new(MonthName::Maio, 2025, 1.0, 0.0);
		month.id = "x".to_string();
		let mut month = month.with_expense("Luz", 10.0).with_expense("Água", 20.0);
		month.expenses.remove(0);
		let month = month.with_expense("Gás", 5.0);

		let ids: Vec<&str> = month.expenses.iter().map(|e| e.id.as_str()).collect();
		assert_eq!(ids, vec!["x-2", "x-3"]);
	}

	#[test]
	fn test_summary_serializes_camel_case() {
		let summary = FinancialSummary {
			total_revenue: 1.0,
			total_expenses: 2.0,
			net_profit: 3.0,
			admin_fee_amount: 4.0,
			per_partner_amount: 5.0,
		};
		let value = serde_json::to_value(summary).unwrap();
		assert_eq!(value["perPartnerAmount"], json!(5.0));
		assert_eq!(value["adminFeeAmount"], json!(4.0));
	}

	#[test]
	fn test_settings_partial_file_uses_defaults() {
		let settings: Settings =
			serde_json::from_value(json!({"default_admin_fee_percent": 20.0})).unwrap();
		assert_eq!(settings.default_admin_fee_percent, 20.0);
		assert_eq!(settings.default_partners_count, 1);
		assert_eq!(settings.database_path, PathBuf::from("database/months.json"));
	}
}
