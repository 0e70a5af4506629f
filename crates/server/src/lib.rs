use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::EngineError;

use serde::Serialize;
pub use server::{ServerConfig, run, run_with_listener, spawn_with_listener};

mod categories;
mod items;
mod reports;
mod server;
mod summaries;
mod transactions;

pub mod types {
    pub mod entry {
        pub use api_types::entry::{EntriesResponse, EntryCreated, EntryNew, EntryView};
    }

    pub mod query {
        pub use api_types::query::{DashboardQuery, RangeQuery, ReportQuery, TopItemsQuery};
    }

    pub mod kpi {
        pub use api_types::kpi::KpiResponse;
    }

    pub mod summary {
        pub use api_types::summary::{DashboardPointView, DaySummaryView, WeekSummaryView};
    }

    pub mod items {
        pub use api_types::items::{RevenueItemView, TopItemView};
    }

    pub mod category {
        pub use api_types::category::{CategorySliceView, CategoryTotalView};
    }

    pub mod report {
        pub use api_types::report::SignedUrlResponse;
    }
}

pub enum ServerError {
    Engine(EngineError),
    Generic(String),
}

#[derive(Serialize)]
struct Error {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Vec<&'static str>>,
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, body) = match self {
            ServerError::Engine(EngineError::Validation(details)) => (
                StatusCode::BAD_REQUEST,
                Error {
                    error: "Missing or invalid fields".to_string(),
                    details: Some(details),
                },
            ),
            ServerError::Engine(EngineError::InvalidPath(message)) => (
                StatusCode::BAD_REQUEST,
                Error {
                    error: message,
                    details: None,
                },
            ),
            ServerError::Engine(EngineError::Store(err)) => {
                tracing::error!("data layer error: {err}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Error {
                        error: "server error".to_string(),
                        details: None,
                    },
                )
            }
            ServerError::Generic(error) => (
                StatusCode::BAD_REQUEST,
                Error {
                    error,
                    details: None,
                },
            ),
        };

        (status, Json(body)).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine::StoreError;

    #[test]
    fn validation_maps_to_400() {
        let res =
            ServerError::from(EngineError::Validation(vec!["quantity"])).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn invalid_path_maps_to_400() {
        let res = ServerError::from(EngineError::InvalidPath("bad".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn store_failure_maps_to_500() {
        let res = ServerError::from(EngineError::Store(StoreError::Gateway {
            status: 503,
            message: "down".to_string(),
        }))
        .into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn generic_maps_to_400() {
        let res = ServerError::Generic("bad".to_string()).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
