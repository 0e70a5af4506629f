//! Local aggregators.
//!
//! Pure fallback computations over a fetched row set, used whenever no
//! remote aggregation procedure answers. Every function is deterministic
//! for a given row set and produces the same canonical shapes as the
//! normalized remote results. Rows with an unrecognized `item_type` are
//! skipped; an empty row set yields zeroed totals and empty lists.
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use chrono::{Datelike, Days, NaiveDate};

use crate::entry::{EntryKind, LedgerEntry};

/// Default and maximum sizes of a top-items ranking.
pub const TOP_ITEMS_DEFAULT_LIMIT: usize = 5;
pub const TOP_ITEMS_MAX_LIMIT: usize = 20;

/// Metric a top-items ranking is sorted by.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RankMetric {
    #[default]
    Revenue,
    Quantity,
}

/// Range-wide income/expense totals.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct KpiTotals {
    pub total_income: f64,
    pub total_expense: f64,
    pub net_income: f64,
}

/// Per-day rollup.
#[derive(Clone, Debug, PartialEq)]
pub struct DaySummary {
    pub date: NaiveDate,
    pub total_income: f64,
    pub total_expense: f64,
    pub net_profit: f64,
}

/// Per-week rollup.
///
/// The report fields are only filled by the remote aggregation service;
/// the local fallback leaves them empty.
#[derive(Clone, Debug, PartialEq)]
pub struct WeekSummary {
    pub week_start: NaiveDate,
    pub week_end: NaiveDate,
    pub total_income: f64,
    pub total_expense: f64,
    pub net_profit: f64,
    pub analysis: Option<String>,
    pub pdf_url: Option<String>,
    pub signed_pdf_url: Option<String>,
}

/// One labeled dashboard point (a day or a week).
#[derive(Clone, Debug, PartialEq)]
pub struct PeriodPoint {
    pub label: String,
    pub total_income: f64,
    pub total_expense: f64,
    pub net_profit: f64,
}

/// Aggregated revenue and quantity for one item name.
#[derive(Clone, Debug, PartialEq)]
pub struct ItemTotals {
    pub item_name: String,
    pub revenue: f64,
    pub quantity: i64,
}

/// One category's share of the range's total expense.
#[derive(Clone, Debug, PartialEq)]
pub struct CategorySlice {
    pub category: String,
    pub total: f64,
    pub percent: f64,
}

/// Clamp a requested ranking size to `[1, 20]`, defaulting to 5.
pub fn effective_limit(limit: Option<u32>) -> usize {
    match limit {
        Some(0) | None => TOP_ITEMS_DEFAULT_LIMIT,
        Some(n) => (n as usize).min(TOP_ITEMS_MAX_LIMIT),
    }
}

/// Sum amounts by kind; `net = income - expense`.
pub fn kpis(rows: &[LedgerEntry]) -> KpiTotals {
    let (total_income, total_expense) =
        rows.iter()
            .fold((0.0f64, 0.0f64), |acc, row| match row.kind() {
                Some(EntryKind::Income) => (acc.0 + row.amount(), acc.1),
                Some(EntryKind::Expense) => (acc.0, acc.1 + row.amount()),
                None => acc,
            });

    KpiTotals {
        total_income,
        total_expense,
        net_income: total_income - total_expense,
    }
}

/// Group rows by date, ascending.
pub fn daily_summaries(rows: &[LedgerEntry]) -> Vec<DaySummary> {
    let mut days: BTreeMap<NaiveDate, (f64, f64)> = BTreeMap::new();

    for row in rows {
        let Some(kind) = row.kind() else { continue };
        let bucket = days.entry(row.date).or_default();
        match kind {
            EntryKind::Income => bucket.0 += row.amount(),
            EntryKind::Expense => bucket.1 += row.amount(),
        }
    }

    days.into_iter()
        .map(|(date, (income, expense))| DaySummary {
            date,
            total_income: income,
            total_expense: expense,
            net_profit: income - expense,
        })
        .collect()
}

/// The Sunday-starting week containing `date`.
///
/// Sunday is the week-start convention for every rollup in this service.
pub fn week_bounds(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let start = date - Days::new(u64::from(date.weekday().num_days_from_sunday()));
    (start, start + Days::new(6))
}

/// Group rows by their Sunday-starting week, ascending by week start.
pub fn weekly_summaries(rows: &[LedgerEntry]) -> Vec<WeekSummary> {
    let mut weeks: BTreeMap<NaiveDate, (f64, f64)> = BTreeMap::new();

    for row in rows {
        let Some(kind) = row.kind() else { continue };
        let (week_start, _) = week_bounds(row.date);
        let bucket = weeks.entry(week_start).or_default();
        match kind {
            EntryKind::Income => bucket.0 += row.amount(),
            EntryKind::Expense => bucket.1 += row.amount(),
        }
    }

    weeks
        .into_iter()
        .map(|(week_start, (income, expense))| WeekSummary {
            week_start,
            week_end: week_start + Days::new(6),
            total_income: income,
            total_expense: expense,
            net_profit: income - expense,
            analysis: None,
            pdf_url: None,
            signed_pdf_url: None,
        })
        .collect()
}

/// Rank income items by the requested metric.
///
/// Grouping preserves first-seen order and the sort is stable, so ties keep
/// insertion order. Expense and unknown-kind rows never contribute.
pub fn top_items(rows: &[LedgerEntry], by: RankMetric, limit: usize) -> Vec<ItemTotals> {
    let mut items: Vec<ItemTotals> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for row in rows {
        if row.kind() != Some(EntryKind::Income) {
            continue;
        }
        match index.get(&row.item_name) {
            Some(&i) => {
                items[i].revenue += row.amount();
                items[i].quantity += row.quantity;
            }
            None => {
                index.insert(row.item_name.clone(), items.len());
                items.push(ItemTotals {
                    item_name: row.item_name.clone(),
                    revenue: row.amount(),
                    quantity: row.quantity,
                });
            }
        }
    }

    match by {
        RankMetric::Revenue => items.sort_by(|a, b| {
            b.revenue
                .partial_cmp(&a.revenue)
                .unwrap_or(Ordering::Equal)
        }),
        RankMetric::Quantity => items.sort_by(|a, b| b.quantity.cmp(&a.quantity)),
    }

    items.truncate(limit);
    items
}

/// Expense totals per category with their share of the grand total.
///
/// Categories appear in first-seen order; every percent is zero when the
/// range has no expenses at all.
pub fn expenses_by_category(rows: &[LedgerEntry]) -> Vec<CategorySlice> {
    let mut slices: Vec<CategorySlice> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut grand_total = 0.0f64;

    for row in rows {
        if row.kind() != Some(EntryKind::Expense) {
            continue;
        }
        let amount = row.amount();
        grand_total += amount;
        match index.get(&row.category) {
            Some(&i) => slices[i].total += amount,
            None => {
                index.insert(row.category.clone(), slices.len());
                slices.push(CategorySlice {
                    category: row.category.clone(),
                    total: amount,
                    percent: 0.0,
                });
            }
        }
    }

    if grand_total > 0.0 {
        for slice in &mut slices {
            slice.percent = slice.total / grand_total * 100.0;
        }
    }

    slices
}
