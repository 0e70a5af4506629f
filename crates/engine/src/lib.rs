//! Ledger engine: remote-first aggregation with local fallback.
//!
//! Every reporting operation prefers a pre-computed answer from the remote
//! data service ([`AggregateKind::procedure`]) and falls back to fetching
//! the raw date-filtered rows and aggregating them in memory. Both paths
//! produce the same canonical shapes, so callers never know which one
//! served them.
use std::sync::Arc;

use serde_json::Value;

pub use aggregate::{
    CategorySlice, DaySummary, ItemTotals, KpiTotals, PeriodPoint, RankMetric, WeekSummary,
    effective_limit,
};
pub use entry::{EntryDraft, EntryKind, LedgerEntry, NewEntry};
pub use error::EngineError;
pub use range::DateRange;
pub use resolver::{AggregateKind, ParamStyle, ProcArgs};
pub use store::{RecordStore, RestStore, StoreError};

pub mod aggregate;
mod entry;
mod error;
pub mod normalize;
mod range;
mod resolver;
mod store;

type ResultEngine<T> = Result<T, EngineError>;

/// Dashboard period granularity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Granularity {
    #[default]
    Auto,
    Daily,
    Weekly,
}

impl Granularity {
    /// Resolve `Auto` against the requested range: ranges longer than 30
    /// days roll up weekly, shorter ones daily.
    pub fn effective(self, range: &DateRange) -> Self {
        match self {
            Self::Auto => {
                if (range.end - range.start).num_days().abs() > 30 {
                    Self::Weekly
                } else {
                    Self::Daily
                }
            }
            resolved => resolved,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Daily => "daily",
            Self::Weekly => "weekly",
        }
    }
}

/// The engine owns the store handle and serves one request at a time per
/// call; it keeps no state between calls and caches nothing.
#[derive(Clone)]
pub struct Engine {
    store: Arc<dyn RecordStore>,
}

impl Engine {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Try the remote procedure for `kind` under every candidate parameter
    /// shape, in order, one attempt each. Attempt failures are logged and
    /// swallowed; `None` means the caller must fall back.
    async fn remote_aggregate(
        &self,
        kind: AggregateKind,
        range: &DateRange,
        args: ProcArgs,
    ) -> Option<Value> {
        let procedure = kind.procedure();
        for style in ParamStyle::ORDER {
            let params = style.params(range, &args);
            match self.store.call_procedure(procedure, &params).await {
                Ok(Some(value)) if !value.is_null() => {
                    tracing::debug!(procedure, ?style, "remote aggregate answered");
                    return Some(value);
                }
                Ok(_) => {
                    tracing::debug!(procedure, ?style, "remote aggregate returned null");
                }
                Err(err) => {
                    tracing::debug!(procedure, ?style, "remote aggregate attempt failed: {err}");
                }
            }
        }
        None
    }

    async fn rows_in_range(&self, range: &DateRange) -> ResultEngine<Vec<LedgerEntry>> {
        Ok(self.store.entries_in_range(range).await?)
    }

    /// Validate and insert one ledger entry.
    pub async fn add_entry(&self, draft: EntryDraft) -> ResultEngine<LedgerEntry> {
        let entry = draft.validate()?;
        Ok(self.store.insert_entry(&entry).await?)
    }

    /// List the entries of a range, newest first.
    pub async fn entries(&self, range: &DateRange) -> ResultEngine<Vec<LedgerEntry>> {
        if let Some(payload) = self
            .remote_aggregate(AggregateKind::Transactions, range, ProcArgs::default())
            .await
        {
            return Ok(normalize::entries(&payload));
        }
        self.rows_in_range(range).await
    }

    /// Range totals: income, expense, net.
    pub async fn kpis(&self, range: &DateRange) -> ResultEngine<KpiTotals> {
        if let Some(payload) = self
            .remote_aggregate(AggregateKind::Kpis, range, ProcArgs::default())
            .await
        {
            return Ok(normalize::kpis(&payload));
        }
        let rows = self.rows_in_range(range).await?;
        Ok(aggregate::kpis(&rows))
    }

    /// Per-day rollup, ascending by date.
    pub async fn daily_summaries(&self, range: &DateRange) -> ResultEngine<Vec<DaySummary>> {
        if let Some(payload) = self
            .remote_aggregate(AggregateKind::DailySummaries, range, ProcArgs::default())
            .await
        {
            let mut days = normalize::day_summaries(&payload);
            days.sort_by_key(|day| day.date);
            return Ok(days);
        }
        let rows = self.rows_in_range(range).await?;
        Ok(aggregate::daily_summaries(&rows))
    }

    /// Per-week rollup, ascending by week start.
    pub async fn weekly_summaries(&self, range: &DateRange) -> ResultEngine<Vec<WeekSummary>> {
        if let Some(payload) = self
            .remote_aggregate(AggregateKind::WeeklySummaries, range, ProcArgs::default())
            .await
        {
            let mut weeks = normalize::week_summaries(&payload);
            weeks.sort_by_key(|week| week.week_start);
            return Ok(weeks);
        }
        let rows = self.rows_in_range(range).await?;
        Ok(aggregate::weekly_summaries(&rows))
    }

    /// Labeled series for the dashboard chart.
    pub async fn dashboard(
        &self,
        range: &DateRange,
        granularity: Granularity,
    ) -> ResultEngine<Vec<PeriodPoint>> {
        let effective = granularity.effective(range);

        let args = ProcArgs {
            limit: None,
            granularity: Some(effective.as_str()),
        };
        if let Some(payload) = self
            .remote_aggregate(AggregateKind::DashboardSummary, range, args)
            .await
        {
            return Ok(normalize::dashboard_points(&payload));
        }

        // No dashboard procedure deployed: serve from the per-period
        // rollups and relabel.
        let points = match effective {
            Granularity::Weekly => self
                .weekly_summaries(range)
                .await?
                .into_iter()
                .map(|week| PeriodPoint {
                    label: format!("{} to {}", week.week_start, week.week_end),
                    total_income: week.total_income,
                    total_expense: week.total_expense,
                    net_profit: week.net_profit,
                })
                .collect(),
            _ => self
                .daily_summaries(range)
                .await?
                .into_iter()
                .map(|day| PeriodPoint {
                    label: day.date.to_string(),
                    total_income: day.total_income,
                    total_expense: day.total_expense,
                    net_profit: day.net_profit,
                })
                .collect(),
        };
        Ok(points)
    }

    /// Top income items by the requested metric.
    ///
    /// The deployed procedure only ranks by revenue; quantity rankings are
    /// always computed locally.
    pub async fn top_items(
        &self,
        range: &DateRange,
        by: RankMetric,
        limit: Option<u32>,
    ) -> ResultEngine<Vec<ItemTotals>> {
        let limit = effective_limit(limit);

        if by == RankMetric::Revenue {
            let args = ProcArgs {
                limit: Some(limit),
                granularity: None,
            };
            if let Some(payload) = self
                .remote_aggregate(AggregateKind::TopRevenueItems, range, args)
                .await
            {
                let mut items = normalize::top_items(&payload);
                items.truncate(limit);
                return Ok(items);
            }
        }

        let rows = self.rows_in_range(range).await?;
        Ok(aggregate::top_items(&rows, by, limit))
    }

    /// Expense totals per category with their percentage share.
    pub async fn expenses_by_category(
        &self,
        range: &DateRange,
    ) -> ResultEngine<Vec<CategorySlice>> {
        if let Some(payload) = self
            .remote_aggregate(AggregateKind::ExpensesByCategory, range, ProcArgs::default())
            .await
        {
            return Ok(normalize::category_slices(&payload));
        }
        let rows = self.rows_in_range(range).await?;
        Ok(aggregate::expenses_by_category(&rows))
    }

    /// Resolve a report path to a downloadable URL.
    ///
    /// External URLs pass through unchanged; anything else must be a
    /// `bucket/path/to/object` storage path.
    pub async fn report_url(&self, path: &str) -> ResultEngine<String> {
        if path.starts_with("http://") || path.starts_with("https://") {
            return Ok(path.to_string());
        }

        let (bucket, object) = path
            .split_once('/')
            .filter(|(bucket, object)| !bucket.is_empty() && !object.is_empty())
            .ok_or_else(|| {
                EngineError::InvalidPath(
                    "expected an external URL or bucket_name/path/to/file".to_string(),
                )
            })?;

        Ok(self.store.signed_url(bucket, object).await?)
    }

    /// Resolve a caller's bearer token to its account email.
    pub async fn token_email(&self, token: &str) -> ResultEngine<Option<String>> {
        Ok(self.store.token_email(token).await?)
    }
}
