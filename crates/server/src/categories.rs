use axum::{
    Json,
    extract::{Query, State},
};

use api_types::category::{CategorySliceView, CategoryTotalView};
use api_types::query::RangeQuery;
use engine::DateRange;

use crate::ServerError;
use crate::server::ServerState;

/// GET /api/category-breakdown
pub async fn breakdown(
    State(state): State<ServerState>,
    Query(query): Query<RangeQuery>,
) -> Result<Json<Vec<CategorySliceView>>, ServerError> {
    let range = DateRange::from_bounds(query.start, query.end);
    let slices = state.engine.expenses_by_category(&range).await?;

    Ok(Json(
        slices
            .into_iter()
            .map(|slice| CategorySliceView {
                category: slice.category,
                value: slice.total,
                percent: slice.percent,
            })
            .collect(),
    ))
}

/// GET /api/expenses-by-category
pub async fn expenses(
    State(state): State<ServerState>,
    Query(query): Query<RangeQuery>,
) -> Result<Json<Vec<CategoryTotalView>>, ServerError> {
    let range = DateRange::from_bounds(query.start, query.end);
    let slices = state.engine.expenses_by_category(&range).await?;

    Ok(Json(
        slices
            .into_iter()
            .map(|slice| CategoryTotalView {
                category: slice.category,
                total: slice.total,
                percent: slice.percent,
            })
            .collect(),
    ))
}
