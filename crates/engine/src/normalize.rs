//! Response normalizer.
//!
//! Remote procedures and the local aggregators do not agree on field
//! names: deployed procedures answer with `total_income`/`net_profit`
//! style rows, older ones with camelCase, and a few with their own labels
//! (`date_period`). Each function here is the single mapping from a remote
//! payload to the canonical shape for one aggregate kind, so nothing
//! downstream ever learns which path produced the data. Numeric fields
//! default to zero when absent or non-numeric; rows without their
//! structural key (a date, a week start) are dropped.
use chrono::{Days, NaiveDate};
use serde_json::Value;

use crate::aggregate::{
    CategorySlice, DaySummary, ItemTotals, KpiTotals, PeriodPoint, WeekSummary,
};
use crate::entry::{LedgerEntry, coerce_f64, coerce_i64};

/// Read the first present numeric field among `names`, defaulting to 0.
fn num(row: &Value, names: &[&str]) -> f64 {
    names
        .iter()
        .find_map(|name| row.get(name).and_then(coerce_f64))
        .unwrap_or(0.0)
}

fn int(row: &Value, names: &[&str]) -> i64 {
    names
        .iter()
        .find_map(|name| row.get(name).and_then(coerce_i64))
        .unwrap_or(0)
}

fn text(row: &Value, names: &[&str]) -> Option<String> {
    names
        .iter()
        .find_map(|name| row.get(name).and_then(Value::as_str))
        .map(str::to_string)
}

fn date(row: &Value, names: &[&str]) -> Option<NaiveDate> {
    names
        .iter()
        .find_map(|name| row.get(name).and_then(Value::as_str))
        .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
}

/// Treat a payload as a row list: arrays as-is, a lone object as one row,
/// anything else as empty.
fn rows(payload: &Value) -> Vec<&Value> {
    match payload {
        Value::Array(rows) => rows.iter().collect(),
        Value::Object(_) => vec![payload],
        _ => Vec::new(),
    }
}

pub fn kpis(payload: &Value) -> KpiTotals {
    // Some procedure versions answer with a one-row table.
    let row = match payload {
        Value::Array(rows) => rows.first().unwrap_or(&Value::Null),
        other => other,
    };

    let total_income = num(row, &["total_income", "totalIncome"]);
    let total_expense = num(row, &["total_expense", "totalExpense"]);
    let net_income = row
        .get("net_profit")
        .or_else(|| row.get("net_income"))
        .or_else(|| row.get("netProfit"))
        .or_else(|| row.get("net"))
        .and_then(coerce_f64)
        .unwrap_or(total_income - total_expense);

    KpiTotals {
        total_income,
        total_expense,
        net_income,
    }
}

pub fn day_summaries(payload: &Value) -> Vec<DaySummary> {
    rows(payload)
        .into_iter()
        .filter_map(|row| {
            let day = date(row, &["date", "day", "date_period"])?;
            let total_income = num(row, &["total_income", "totalIncome"]);
            let total_expense = num(row, &["total_expense", "totalExpense"]);
            Some(DaySummary {
                date: day,
                total_income,
                total_expense,
                net_profit: row
                    .get("net_profit")
                    .or_else(|| row.get("netProfit"))
                    .and_then(coerce_f64)
                    .unwrap_or(total_income - total_expense),
            })
        })
        .collect()
}

pub fn week_summaries(payload: &Value) -> Vec<WeekSummary> {
    rows(payload)
        .into_iter()
        .filter_map(|row| {
            let week_start = date(row, &["week_start", "weekStart"])?;
            let week_end =
                date(row, &["week_end", "weekEnd"]).unwrap_or(week_start + Days::new(6));
            let total_income = num(row, &["total_income", "totalIncome"]);
            let total_expense = num(row, &["total_expense", "totalExpense"]);
            Some(WeekSummary {
                week_start,
                week_end,
                total_income,
                total_expense,
                net_profit: row
                    .get("net_profit")
                    .or_else(|| row.get("netProfit"))
                    .and_then(coerce_f64)
                    .unwrap_or(total_income - total_expense),
                analysis: text(row, &["analysis"]),
                pdf_url: text(row, &["pdf_url", "pdfUrl"]),
                signed_pdf_url: text(row, &["signed_pdf_url", "signedPdfUrl"]),
            })
        })
        .collect()
}

pub fn dashboard_points(payload: &Value) -> Vec<PeriodPoint> {
    rows(payload)
        .into_iter()
        .filter_map(|row| {
            let label = text(row, &["date_period", "label", "date"])?;
            let total_income = num(row, &["total_income", "totalIncome"]);
            let total_expense = num(row, &["total_expense", "totalExpense"]);
            Some(PeriodPoint {
                label,
                total_income,
                total_expense,
                net_profit: row
                    .get("net_profit")
                    .or_else(|| row.get("netProfit"))
                    .and_then(coerce_f64)
                    .unwrap_or(total_income - total_expense),
            })
        })
        .collect()
}

pub fn top_items(payload: &Value) -> Vec<ItemTotals> {
    rows(payload)
        .into_iter()
        .map(|row| ItemTotals {
            item_name: text(row, &["item_name", "itemName", "item", "name"])
                .unwrap_or_else(|| "(unknown)".to_string()),
            revenue: num(row, &["revenue", "total_revenue", "amount"]),
            quantity: int(row, &["quantity", "qty", "total_quantity"]),
        })
        .collect()
}

pub fn category_slices(payload: &Value) -> Vec<CategorySlice> {
    rows(payload)
        .into_iter()
        .filter_map(|row| {
            let category = text(row, &["category", "name"])?;
            Some(CategorySlice {
                category,
                total: num(row, &["total", "value", "amount"]),
                percent: num(row, &["percent", "percentage"]),
            })
        })
        .collect()
}

/// Lenient row list for the transactions listing; undecodable rows are
/// dropped rather than failing the set.
pub fn entries(payload: &Value) -> Vec<LedgerEntry> {
    rows(payload)
        .into_iter()
        .filter_map(|row| serde_json::from_value(row.clone()).ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn kpis_from_snake_case_object() {
        let totals = kpis(&json!({
            "total_income": 250.0, "total_expense": 800, "net_profit": -550.0
        }));
        assert_eq!(totals.total_income, 250.0);
        assert_eq!(totals.total_expense, 800.0);
        assert_eq!(totals.net_income, -550.0);
    }

    #[test]
    fn kpis_from_one_row_table_with_string_numbers() {
        let totals = kpis(&json!([{ "totalIncome": "100.5", "totalExpense": "0.5" }]));
        assert_eq!(totals.total_income, 100.5);
        assert_eq!(totals.net_income, 100.0);
    }

    #[test]
    fn kpis_default_to_zero() {
        let totals = kpis(&json!({}));
        assert_eq!(totals, KpiTotals::default());
    }

    #[test]
    fn day_rows_without_date_are_dropped() {
        let days = day_summaries(&json!([
            { "date": "2025-09-10", "total_income": 10 },
            { "total_income": 99 }
        ]));
        assert_eq!(days.len(), 1);
        assert_eq!(days[0].net_profit, 10.0);
    }

    #[test]
    fn week_end_defaults_to_six_days_after_start() {
        let weeks = week_summaries(&json!([
            { "week_start": "2025-09-07", "total_income": 5, "analysis": "steady" }
        ]));
        assert_eq!(weeks.len(), 1);
        assert_eq!(
            weeks[0].week_end,
            "2025-09-13".parse::<NaiveDate>().unwrap()
        );
        assert_eq!(weeks[0].analysis.as_deref(), Some("steady"));
    }

    #[test]
    fn dashboard_label_prefers_date_period() {
        let points = dashboard_points(&json!([
            { "date_period": "2025-09-07 to 2025-09-13", "label": "ignored", "net_profit": 3 }
        ]));
        assert_eq!(points[0].label, "2025-09-07 to 2025-09-13");
        assert_eq!(points[0].net_profit, 3.0);
    }

    #[test]
    fn top_items_accept_legacy_field_names() {
        let items = top_items(&json!([
            { "item": "Injera", "revenue": "75" },
            { "item_name": "Tea", "amount": 100, "qty": 100 }
        ]));
        assert_eq!(items[0].item_name, "Injera");
        assert_eq!(items[0].revenue, 75.0);
        assert_eq!(items[1].quantity, 100);
    }

    #[test]
    fn category_rows_without_name_are_dropped() {
        let slices = category_slices(&json!([
            { "category": "Rent", "value": 800, "percent": 80 },
            { "total": 200 }
        ]));
        assert_eq!(slices.len(), 1);
        assert_eq!(slices[0].total, 800.0);
    }

    #[test]
    fn garbage_payload_normalizes_to_empty() {
        assert!(day_summaries(&json!("oops")).is_empty());
        assert!(top_items(&json!(null)).is_empty());
    }

    #[test]
    fn entries_skip_undecodable_rows() {
        let rows = entries(&json!([
            { "item_name": "Injera", "quantity": 2, "price_per_quantity": 5,
              "item_type": "income", "category": "Food", "date": "2025-09-10" },
            { "item_name": "broken" }
        ]));
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].amount(), 10.0);
    }
}
