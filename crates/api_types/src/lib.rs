use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub mod entry {
    use super::*;

    /// Body of `POST /api/transactions`.
    ///
    /// Every field is optional at the wire level; the engine validates the
    /// draft and reports the offending field names. Legacy camelCase field
    /// names from older frontend builds are accepted as aliases.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct EntryNew {
        #[serde(default, alias = "itemName", alias = "item")]
        pub item_name: Option<String>,
        /// JSON number or numeric string.
        #[serde(default)]
        pub quantity: Option<serde_json::Value>,
        /// JSON number or numeric string.
        #[serde(
            default,
            alias = "pricePerUnit",
            alias = "pricePerQuantity"
        )]
        pub price_per_quantity: Option<serde_json::Value>,
        #[serde(default, alias = "itemType", alias = "entryType")]
        pub item_type: Option<String>,
        #[serde(default)]
        pub category: Option<String>,
        /// `YYYY-MM-DD`.
        #[serde(default)]
        pub date: Option<String>,
    }

    /// One stored ledger row, as returned to clients.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct EntryView {
        #[serde(skip_serializing_if = "Option::is_none")]
        pub id: Option<i64>,
        pub item_name: String,
        pub quantity: i64,
        pub price_per_quantity: f64,
        pub item_type: String,
        pub category: String,
        pub date: NaiveDate,
        pub processed: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct EntryCreated {
        pub success: bool,
        pub row: EntryView,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct EntriesResponse {
        pub rows: Vec<EntryView>,
    }
}

pub mod query {
    use super::*;

    /// Date-range query string shared by the reporting endpoints.
    ///
    /// `start_date`/`end_date` are legacy aliases. Absent bounds default to
    /// the trailing 30-day window server-side.
    #[derive(Debug, Default, Deserialize)]
    pub struct RangeQuery {
        #[serde(default, alias = "start_date")]
        pub start: Option<NaiveDate>,
        #[serde(default, alias = "end_date")]
        pub end: Option<NaiveDate>,
    }

    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
    #[serde(rename_all = "lowercase")]
    pub enum Granularity {
        #[default]
        Auto,
        Daily,
        Weekly,
    }

    #[derive(Debug, Default, Deserialize)]
    pub struct DashboardQuery {
        #[serde(default, alias = "start_date")]
        pub start: Option<NaiveDate>,
        #[serde(default, alias = "end_date")]
        pub end: Option<NaiveDate>,
        #[serde(default)]
        pub granularity: Granularity,
    }

    #[derive(Debug, Default, Deserialize)]
    pub struct TopItemsQuery {
        #[serde(default, alias = "start_date")]
        pub start: Option<NaiveDate>,
        #[serde(default, alias = "end_date")]
        pub end: Option<NaiveDate>,
        /// `revenue` (default) or `quantity`.
        #[serde(default)]
        pub by: Option<String>,
        #[serde(default)]
        pub limit: Option<u32>,
    }

    #[derive(Debug, Deserialize)]
    pub struct ReportQuery {
        pub path: Option<String>,
    }
}

pub mod kpi {
    use super::*;

    /// Response of `GET /api/kpis`.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct KpiResponse {
        pub total_income: f64,
        pub total_expense: f64,
        pub net_income: f64,
    }
}

pub mod summary {
    use super::*;

    /// One element of the `GET /api/daily-summaries` array.
    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct DaySummaryView {
        pub date: NaiveDate,
        pub total_income: f64,
        pub total_expense: f64,
        pub net_profit: f64,
    }

    /// One element of the `GET /api/weekly-summaries` array.
    ///
    /// The optional report fields are only present when the remote
    /// aggregation service has produced them.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct WeekSummaryView {
        pub week_start: NaiveDate,
        pub week_end: NaiveDate,
        pub total_income: f64,
        pub total_expense: f64,
        pub net_profit: f64,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub analysis: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub pdf_url: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub signed_pdf_url: Option<String>,
    }

    /// One element of the `GET /api/dashboard` array.
    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct DashboardPointView {
        pub label: String,
        pub total_income: f64,
        pub total_expense: f64,
        pub net_profit: f64,
    }
}

pub mod items {
    use super::*;

    /// One element of the `GET /api/top-items` array.
    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct TopItemView {
        pub item_name: String,
        pub revenue: f64,
        pub quantity: i64,
    }

    /// One element of the `GET /api/top-revenue-items` array.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct RevenueItemView {
        pub item: String,
        pub revenue: f64,
    }
}

pub mod category {
    use super::*;

    /// One element of the `GET /api/category-breakdown` array.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategorySliceView {
        pub category: String,
        pub value: f64,
        pub percent: f64,
    }

    /// One element of the `GET /api/expenses-by-category` array.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryTotalView {
        pub category: String,
        pub total: f64,
        pub percent: f64,
    }
}

pub mod report {
    use super::*;

    /// Response of `GET /api/report-signed-url`.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct SignedUrlResponse {
        pub url: String,
    }
}
