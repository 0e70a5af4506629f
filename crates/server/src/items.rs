use axum::{
    Json,
    extract::{Query, State},
};

use api_types::items::{RevenueItemView, TopItemView};
use api_types::query::TopItemsQuery;
use engine::{DateRange, RankMetric};

use crate::ServerError;
use crate::server::ServerState;

fn rank_metric(by: Option<&str>) -> Result<RankMetric, ServerError> {
    match by {
        None | Some("revenue") => Ok(RankMetric::Revenue),
        Some("quantity") => Ok(RankMetric::Quantity),
        Some(other) => Err(ServerError::Generic(format!(
            "invalid \"by\" value {other:?}, expected \"revenue\" or \"quantity\""
        ))),
    }
}

/// GET /api/top-items
pub async fn top_items(
    State(state): State<ServerState>,
    Query(query): Query<TopItemsQuery>,
) -> Result<Json<Vec<TopItemView>>, ServerError> {
    let range = DateRange::from_bounds(query.start, query.end);
    let by = rank_metric(query.by.as_deref())?;
    let items = state.engine.top_items(&range, by, query.limit).await?;

    Ok(Json(
        items
            .into_iter()
            .map(|item| TopItemView {
                item_name: item.item_name,
                revenue: item.revenue,
                quantity: item.quantity,
            })
            .collect(),
    ))
}

/// GET /api/top-revenue-items
pub async fn top_revenue_items(
    State(state): State<ServerState>,
    Query(query): Query<TopItemsQuery>,
) -> Result<Json<Vec<RevenueItemView>>, ServerError> {
    let range = DateRange::from_bounds(query.start, query.end);
    let items = state
        .engine
        .top_items(&range, RankMetric::Revenue, query.limit)
        .await?;

    Ok(Json(
        items
            .into_iter()
            .map(|item| RevenueItemView {
                item: item.item_name,
                revenue: item.revenue,
            })
            .collect(),
    ))
}
