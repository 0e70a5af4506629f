use axum::{
    Json,
    extract::{Query, State},
};

use api_types::kpi::KpiResponse;
use api_types::query::{self, DashboardQuery, RangeQuery};
use api_types::summary::{DashboardPointView, DaySummaryView, WeekSummaryView};
use engine::{DateRange, Granularity};

use crate::ServerError;
use crate::server::ServerState;

fn map_granularity(value: query::Granularity) -> Granularity {
    match value {
        query::Granularity::Auto => Granularity::Auto,
        query::Granularity::Daily => Granularity::Daily,
        query::Granularity::Weekly => Granularity::Weekly,
    }
}

/// GET /api/kpis
pub async fn kpis(
    State(state): State<ServerState>,
    Query(query): Query<RangeQuery>,
) -> Result<Json<KpiResponse>, ServerError> {
    let range = DateRange::from_bounds(query.start, query.end);
    let totals = state.engine.kpis(&range).await?;

    Ok(Json(KpiResponse {
        total_income: totals.total_income,
        total_expense: totals.total_expense,
        net_income: totals.net_income,
    }))
}

/// GET /api/daily-summaries
pub async fn daily(
    State(state): State<ServerState>,
    Query(query): Query<RangeQuery>,
) -> Result<Json<Vec<DaySummaryView>>, ServerError> {
    let range = DateRange::from_bounds(query.start, query.end);
    let days = state.engine.daily_summaries(&range).await?;

    Ok(Json(
        days.into_iter()
            .map(|day| DaySummaryView {
                date: day.date,
                total_income: day.total_income,
                total_expense: day.total_expense,
                net_profit: day.net_profit,
            })
            .collect(),
    ))
}

/// GET /api/weekly-summaries
pub async fn weekly(
    State(state): State<ServerState>,
    Query(query): Query<RangeQuery>,
) -> Result<Json<Vec<WeekSummaryView>>, ServerError> {
    let range = DateRange::from_bounds(query.start, query.end);
    let weeks = state.engine.weekly_summaries(&range).await?;

    Ok(Json(
        weeks
            .into_iter()
            .map(|week| WeekSummaryView {
                week_start: week.week_start,
                week_end: week.week_end,
                total_income: week.total_income,
                total_expense: week.total_expense,
                net_profit: week.net_profit,
                analysis: week.analysis,
                pdf_url: week.pdf_url,
                signed_pdf_url: week.signed_pdf_url,
            })
            .collect(),
    ))
}

/// GET /api/dashboard
pub async fn dashboard(
    State(state): State<ServerState>,
    Query(query): Query<DashboardQuery>,
) -> Result<Json<Vec<DashboardPointView>>, ServerError> {
    let range = DateRange::from_bounds(query.start, query.end);
    let points = state
        .engine
        .dashboard(&range, map_granularity(query.granularity))
        .await?;

    Ok(Json(
        points
            .into_iter()
            .map(|point| DashboardPointView {
                label: point.label,
                total_income: point.total_income,
                total_expense: point.total_expense,
                net_profit: point.net_profit,
            })
            .collect(),
    ))
}
