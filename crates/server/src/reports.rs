use axum::{
    Json,
    extract::{Query, State},
};

use api_types::query::ReportQuery;
use api_types::report::SignedUrlResponse;

use crate::ServerError;
use crate::server::ServerState;

/// GET /api/report-signed-url
pub async fn signed_url(
    State(state): State<ServerState>,
    Query(query): Query<ReportQuery>,
) -> Result<Json<SignedUrlResponse>, ServerError> {
    let path = query
        .path
        .as_deref()
        .map(str::trim)
        .filter(|path| !path.is_empty())
        .ok_or_else(|| ServerError::Generic("Missing path parameter".to_string()))?;

    let url = state.engine.report_url(path).await?;
    Ok(Json(SignedUrlResponse { url }))
}
