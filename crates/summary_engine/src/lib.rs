//! Derives the monthly financial summary of a flat and the aggregate views
//! built on top of it.
//!
//! Everything here is a pure function of its input records: no I/O except
//! [`write_dashboard_json`], no hidden state.

pub mod dashboard;
pub mod format;
pub mod report;

use models::{FinancialSummary, MonthData};

pub use crate::dashboard::{
    chart_series, generate_dashboard, latest_breakdown, sorted_newest_first, write_dashboard_json,
    yearly_totals, Breakdown, ChartPoint, DashboardMetadata, DashboardOutput, YearlyTotals,
};
pub use crate::format::{format_currency, format_decimal, format_percent};
pub use crate::report::share_report;

/// Rounds half-up to two decimals, nudging by `f64::EPSILON` first so that
/// values such as `1.005` land on `1.01` despite their binary representation.
pub fn round_currency(value: f64) -> f64 {
    (((value + f64::EPSILON) * 100.0) + 0.5).floor() / 100.0
}

/// Computes the derived figures of one month.
///
/// The admin fee is taken on gross revenue. Net profit may be negative and
/// is kept as is; the per-partner share is floored at zero. No validation
/// is performed on the inputs.
pub fn calculate_summary(data: &MonthData) -> FinancialSummary {
    let total_expenses: f64 = data.expenses.iter().map(|e| e.amount).sum();
    let admin_fee_amount = data.revenue * data.admin_fee_percent / 100.0;
    let net_profit = data.revenue - total_expenses - admin_fee_amount;
    let per_partner_amount = if data.partners_count > 0 {
        net_profit / f64::from(data.partners_count)
    } else {
        0.0
    };

    FinancialSummary {
        total_revenue: round_currency(data.revenue),
        total_expenses: round_currency(total_expenses),
        net_profit: round_currency(net_profit),
        admin_fee_amount: round_currency(admin_fee_amount),
        per_partner_amount: round_currency(per_partner_amount.max(0.0)),
    }
}
