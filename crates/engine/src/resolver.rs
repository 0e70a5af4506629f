//! Remote procedure resolution strategy.
//!
//! The aggregation procedures live in the managed database, but their
//! parameter-naming contract is not pinned down: deployments have shipped
//! them with `p_`-prefixed, bare, and `_date`-suffixed argument names. The
//! engine therefore tries a fixed, ordered list of candidate parameter
//! shapes ([`ParamStyle::ORDER`]) and takes the first call that answers.
//! The ordering is part of the behavior: it is attempted sequentially, one
//! call per shape, and the first non-null result wins.
use serde_json::{Map, Value, json};

use crate::range::DateRange;

/// Which aggregate a reporting request asks for.
///
/// Each kind is served by one named remote procedure and, on fallback, by
/// the matching local aggregator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AggregateKind {
    Transactions,
    Kpis,
    DailySummaries,
    WeeklySummaries,
    DashboardSummary,
    TopRevenueItems,
    ExpensesByCategory,
}

impl AggregateKind {
    /// The remote procedure serving this aggregate.
    pub fn procedure(self) -> &'static str {
        match self {
            Self::Transactions => "get_transactions",
            Self::Kpis => "get_kpis",
            Self::DailySummaries => "get_daily_summaries",
            Self::WeeklySummaries => "get_weekly_summaries",
            Self::DashboardSummary => "get_dashboard_summary",
            Self::TopRevenueItems => "get_top_revenue_items",
            Self::ExpensesByCategory => "get_expenses_by_category",
        }
    }
}

/// Extra procedure arguments beyond the date range.
#[derive(Clone, Copy, Debug, Default)]
pub struct ProcArgs {
    pub limit: Option<usize>,
    pub granularity: Option<&'static str>,
}

/// One candidate parameter-naming shape.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParamStyle {
    /// `{p_start, p_end}` (+ `p_limit`, `p_granularity`)
    Prefixed,
    /// `{start, end}` (+ `limit`, `granularity`)
    Bare,
    /// `{start_date, end_date}` (+ `limit`, `granularity`)
    DateSuffixed,
    /// `{p_start_date, p_end_date}` (+ `p_limit`, `p_granularity`)
    PrefixedDateSuffixed,
}

impl ParamStyle {
    /// The attempt order. Do not reorder: deployed procedures are matched
    /// by whichever shape succeeds first.
    pub const ORDER: [Self; 4] = [
        Self::Prefixed,
        Self::Bare,
        Self::DateSuffixed,
        Self::PrefixedDateSuffixed,
    ];

    fn keys(self) -> (&'static str, &'static str, &'static str, &'static str) {
        match self {
            Self::Prefixed => ("p_start", "p_end", "p_limit", "p_granularity"),
            Self::Bare => ("start", "end", "limit", "granularity"),
            Self::DateSuffixed => ("start_date", "end_date", "limit", "granularity"),
            Self::PrefixedDateSuffixed => {
                ("p_start_date", "p_end_date", "p_limit", "p_granularity")
            }
        }
    }

    /// Build the parameter object for this shape.
    pub fn params(self, range: &DateRange, args: &ProcArgs) -> Value {
        let (start_key, end_key, limit_key, granularity_key) = self.keys();

        let mut params = Map::new();
        params.insert(start_key.to_string(), json!(range.start.to_string()));
        params.insert(end_key.to_string(), json!(range.end.to_string()));
        if let Some(limit) = args.limit {
            params.insert(limit_key.to_string(), json!(limit));
        }
        if let Some(granularity) = args.granularity {
            params.insert(granularity_key.to_string(), json!(granularity));
        }
        Value::Object(params)
    }
}
