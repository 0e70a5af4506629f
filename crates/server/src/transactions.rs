use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};

use api_types::entry::{EntriesResponse, EntryCreated, EntryNew, EntryView};
use api_types::query::RangeQuery;
use engine::{DateRange, EntryDraft, LedgerEntry};

use crate::ServerError;
use crate::server::ServerState;

fn entry_view(row: LedgerEntry) -> EntryView {
    EntryView {
        id: row.id,
        item_name: row.item_name,
        quantity: row.quantity,
        price_per_quantity: row.price_per_quantity,
        item_type: row.item_type,
        category: row.category,
        date: row.date,
        processed: row.processed,
    }
}

/// GET /api/transactions
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<RangeQuery>,
) -> Result<Json<EntriesResponse>, ServerError> {
    let range = DateRange::from_bounds(query.start, query.end);
    let rows = state.engine.entries(&range).await?;

    Ok(Json(EntriesResponse {
        rows: rows.into_iter().map(entry_view).collect(),
    }))
}

/// POST /api/transactions
pub async fn create(
    State(state): State<ServerState>,
    Json(body): Json<EntryNew>,
) -> Result<(StatusCode, Json<EntryCreated>), ServerError> {
    let draft = EntryDraft {
        item_name: body.item_name,
        quantity: body.quantity,
        price_per_quantity: body.price_per_quantity,
        item_type: body.item_type,
        category: body.category,
        date: body.date,
    };
    let row = state.engine.add_entry(draft).await?;

    Ok((
        StatusCode::CREATED,
        Json(EntryCreated {
            success: true,
            row: entry_view(row),
        }),
    ))
}
