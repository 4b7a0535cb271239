use models::MonthData;
use serde_json::Value;
use std::collections::HashSet;
use thiserror::Error;

/// Why a JSON payload could not be accepted as a list of month records.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("expected a JSON array of month records, found {0}")]
    NotAnArray(&'static str),

    #[error("month record at index {index} is malformed: {source}")]
    InvalidRecord {
        index: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("month id {0:?} appears more than once")]
    DuplicateId(String),
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Schema-checks a decoded JSON value: it must be an array whose every
/// element deserializes as a [`MonthData`], with no id repeated.
pub fn months_from_value(value: Value) -> Result<Vec<MonthData>, SchemaError> {
    let items = match value {
        Value::Array(items) => items,
        other => return Err(SchemaError::NotAnArray(json_kind(&other))),
    };

    let months = items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            serde_json::from_value(item).map_err(|source| SchemaError::InvalidRecord { index, source })
        })
        .collect::<Result<Vec<MonthData>, _>>()?;

    if let Some(id) = find_duplicate_month_ids(&months).into_iter().next() {
        return Err(SchemaError::DuplicateId(id));
    }
    Ok(months)
}

/// Ids that appear more than once, in first-seen order.
pub fn find_duplicate_month_ids(months: &[MonthData]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut duplicates = Vec::new();
    for m in months {
        if !seen.insert(m.id.as_str()) && !duplicates.contains(&m.id) {
            duplicates.push(m.id.clone());
        }
    }
    duplicates
}

/// Statistics about a month merge operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeStats {
    pub added: usize,
    pub skipped: usize,
    pub total: usize,
}

impl MergeStats {
    pub fn has_duplicates(&self) -> bool {
        self.skipped > 0
    }
}

/// Appends the incoming records whose id is not already present, keeping
/// the existing version of any record that appears in both.
///
/// # Example
/// ```no_run
/// use utils::merge_months_with_deduplication;
///
/// let (merged, stats) = merge_months_with_deduplication(vec![], vec![]);
/// println!("Added: {}, Skipped: {}", stats.added, stats.skipped);
/// ```
pub fn merge_months_with_deduplication(
    mut existing: Vec<MonthData>,
    incoming: Vec<MonthData>,
) -> (Vec<MonthData>, MergeStats) {
    let mut known: HashSet<String> = existing.iter().map(|m| m.id.clone()).collect();

    let mut stats = MergeStats {
        added: 0,
        skipped: 0,
        total: incoming.len(),
    };

    for month in incoming {
        if known.insert(month.id.clone()) {
            existing.push(month);
            stats.added += 1;
        } else {
            stats.skipped += 1;
        }
    }

    (existing, stats)
}

#[derive(Debug, Default, Clone)]
pub struct ValidationReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationReport {
    fn error(&mut self, msg: impl Into<String>) {
        self.errors.push(msg.into());
    }
    fn warn(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Boundary checks the calculator itself never performs.
///
/// Errors: empty or duplicate ids, non-positive partner counts.
/// Warnings: fee outside 0-100, negative revenue, negative expense amounts.
pub fn validate_months(months: &[MonthData]) -> ValidationReport {
    let mut rep = ValidationReport::default();

    for id in find_duplicate_month_ids(months) {
        rep.error(format!("duplicate month id '{}'", id));
    }

    for (i, m) in months.iter().enumerate() {
        let label = format!("months[{}] ({})", i, m.period_label());
        if m.id.trim().is_empty() {
            rep.error(format!("{} has an empty id", label));
        }
        if m.partners_count <= 0 {
            rep.error(format!(
                "{} has partnersCount {}, expected at least 1",
                label, m.partners_count
            ));
        }
        if !(0.0..=100.0).contains(&m.admin_fee_percent) {
            rep.warn(format!(
                "{} has adminFeePercent {} outside 0-100",
                label, m.admin_fee_percent
            ));
        }
        if m.revenue < 0.0 {
            rep.warn(format!("{} has negative revenue {}", label, m.revenue));
        }
        for e in m.expenses.iter().filter(|e| e.amount < 0.0) {
            rep.warn(format!(
                "{} expense '{}' has negative amount {}",
                label, e.description, e.amount
            ));
        }
    }

    rep
}

#[cfg(test)]
mod tests {
    use super::*;
    use models::MonthName;
    use serde_json::json;

    fn month(id: &str) -> MonthData {
        let mut m = MonthData::new(MonthName::Janeiro, 2025, 1000.0, 35.0);
        m.id = id.to_string();
        m
    }

    #[test]
    fn test_months_from_value_accepts_array() {
        let value = json!([
            {"id": "1", "month": "Janeiro", "year": 2025, "revenue": 100.0, "expenses": [],
             "adminFeePercent": 35, "partnersCount": 1, "createdAt": 1}
        ]);
        let months = months_from_value(value).unwrap();
        assert_eq!(months.len(), 1);
        assert_eq!(months[0].id, "1");
    }

    #[test]
    fn test_months_from_value_rejects_object() {
        let err = months_from_value(json!({"id": "1"})).unwrap_err();
        assert!(matches!(err, SchemaError::NotAnArray("an object")));
    }

    #[test]
    fn test_months_from_value_reports_bad_index() {
        let value = json!([
            {"id": "1", "month": "Janeiro", "year": 2025, "revenue": 100.0},
            {"id": "2", "month": "Janeiro", "year": "dois mil", "revenue": 100.0}
        ]);
        match months_from_value(value).unwrap_err() {
            SchemaError::InvalidRecord { index, .. } => assert_eq!(index, 1),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_months_from_value_rejects_repeated_id() {
        let value = json!([
            {"id": "1", "month": "Janeiro", "year": 2025, "revenue": 100.0},
            {"id": "1", "month": "Fevereiro", "year": 2025, "revenue": 200.0}
        ]);
        match months_from_value(value).unwrap_err() {
            SchemaError::DuplicateId(id) => assert_eq!(id, "1"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_find_duplicate_month_ids() {
        let months = vec![month("a"), month("b"), month("a"), month("a")];
        assert_eq!(find_duplicate_month_ids(&months), vec!["a".to_string()]);
    }

    #[test]
    fn test_merge_with_no_duplicates() {
        let (merged, stats) = merge_months_with_deduplication(vec![month("a")], vec![month("b"), month("c")]);

        assert_eq!(stats.added, 2);
        assert_eq!(stats.skipped, 0);
        assert_eq!(stats.total, 2);
        assert_eq!(merged.len(), 3);
    }

    #[test]
    fn test_merge_with_duplicates_keeps_existing() {
        let mut changed = month("a");
        changed.revenue = 1.0;

        let (merged, stats) = merge_months_with_deduplication(vec![month("a")], vec![changed, month("b")]);

        assert_eq!(stats.added, 1);
        assert_eq!(stats.skipped, 1);
        assert!(stats.has_duplicates());
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].revenue, 1000.0);
    }

    #[test]
    fn test_validate_clean_records() {
        let report = validate_months(&[month("a"), month("b")]);
        assert!(!report.has_errors());
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_validate_flags_problems() {
        let mut bad = month("b").with_expense("Estorno", -10.0);
        bad.partners_count = 0;
        bad.admin_fee_percent = 120.0;
        bad.revenue = -5.0;

        let report = validate_months(&[month("a"), month("a"), bad]);

        assert_eq!(report.errors.len(), 2);
        assert!(report.errors[0].contains("duplicate month id 'a'"));
        assert!(report.errors[1].contains("partnersCount 0"));
        assert_eq!(report.warnings.len(), 3);
    }
}
