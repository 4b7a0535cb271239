use anyhow::{Context, Result};
use chrono::Local;
use models::{FinancialSummary, MonthData};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fs, path::Path};

use crate::{calculate_summary, round_currency};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChartPoint {
    pub label: String,
    pub revenue: f64,
    pub net_profit: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Breakdown {
    pub month_id: String,
    pub period: String,
    pub admin_fee_percent: f64,
    pub summary: FinancialSummary,
    pub expenses_slice: f64,
    pub admin_fee_slice: f64,
    pub net_profit_slice: f64,
    pub is_loss: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct YearlyTotals {
    pub year: i32,
    pub months_count: usize,
    pub total_revenue: f64,
    pub total_expenses: f64,
    pub total_admin_fees: f64,
    pub total_net_profit: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct DashboardMetadata {
    pub generated_at: String,
    pub months_count: usize,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct DashboardOutput {
    pub metadata: DashboardMetadata,
    pub latest: Option<Breakdown>,
    pub chart: Vec<ChartPoint>,
    pub yearly_totals: Vec<YearlyTotals>,
}

/// Revenue and profit per month in creation order, labelled `Mmm/YY`.
pub fn chart_series(months: &[MonthData]) -> Vec<ChartPoint> {
    let mut ordered: Vec<&MonthData> = months.iter().collect();
    ordered.sort_by_key(|m| m.created_at);

    ordered
        .into_iter()
        .map(|m| {
            let summary = calculate_summary(m);
            let year = m.year.rem_euclid(100);
            ChartPoint {
                label: format!("{}/{:02}", m.month.abbreviation(), year),
                revenue: summary.total_revenue,
                net_profit: summary.net_profit,
            }
        })
        .collect()
}

/// Breakdown of the last record in collection order (the most recently
/// entered month), or `None` when there is nothing recorded yet.
pub fn latest_breakdown(months: &[MonthData]) -> Option<Breakdown> {
    let last = months.last()?;
    let summary = calculate_summary(last);
    Some(Breakdown {
        month_id: last.id.clone(),
        period: last.period_label(),
        admin_fee_percent: last.admin_fee_percent,
        summary,
        expenses_slice: summary.total_expenses,
        admin_fee_slice: summary.admin_fee_amount,
        net_profit_slice: summary.net_profit.max(0.0),
        is_loss: summary.net_profit < 0.0,
    })
}

pub fn yearly_totals(months: &[MonthData]) -> Vec<YearlyTotals> {
    let mut by_year: BTreeMap<i32, Vec<FinancialSummary>> = BTreeMap::new();
    for m in months {
        by_year.entry(m.year).or_default().push(calculate_summary(m));
    }

    by_year
        .into_iter()
        .map(|(year, summaries)| YearlyTotals {
            year,
            months_count: summaries.len(),
            total_revenue: round_currency(summaries.iter().map(|s| s.total_revenue).sum()),
            total_expenses: round_currency(summaries.iter().map(|s| s.total_expenses).sum()),
            total_admin_fees: round_currency(summaries.iter().map(|s| s.admin_fee_amount).sum()),
            total_net_profit: round_currency(summaries.iter().map(|s| s.net_profit).sum()),
        })
        .collect()
}

/// Month list order: newest entry first.
pub fn sorted_newest_first(months: &[MonthData]) -> Vec<&MonthData> {
    let mut ordered: Vec<&MonthData> = months.iter().collect();
    ordered.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    ordered
}

pub fn generate_dashboard(months: &[MonthData]) -> DashboardOutput {
    DashboardOutput {
        metadata: DashboardMetadata {
            generated_at: Local::now().to_rfc3339(),
            months_count: months.len(),
        },
        latest: latest_breakdown(months),
        chart: chart_series(months),
        yearly_totals: yearly_totals(months),
    }
}

pub fn write_dashboard_json(output: &DashboardOutput, out_path: &Path) -> Result<()> {
    if let Some(parent) = out_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Cannot create directory {:?}", parent))?;
        }
    }
    let json = serde_json::to_string_pretty(output)?;
    fs::write(out_path, json).with_context(|| format!("Cannot write dashboard to {:?}", out_path))?;
    Ok(())
}
