use axum::{
    Router,
    extract::{Request, State},
    http::{HeaderValue, Method, StatusCode, header},
    middleware::{self, Next},
    response::Response,
    routing::get,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use tower_http::cors::CorsLayer;

use std::sync::Arc;

use crate::{categories, items, reports, summaries, transactions};
use engine::Engine;

/// Server-side configuration injected at startup.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// The only account allowed to call the API.
    pub owner_email: String,
    /// Frontend origins allowed by CORS.
    pub origins: Vec<String>,
}

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    pub owner_email: Arc<String>,
}

/// Owner-only bearer authentication.
///
/// The token is resolved against the identity endpoint on every request;
/// there is no token shortcut. An unknown token is a 401, a known token
/// belonging to anyone but the configured owner is a 403.
async fn auth(
    auth_header: Option<TypedHeader<Authorization<Bearer>>>,
    State(state): State<ServerState>,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let Some(TypedHeader(bearer)) = auth_header else {
        return Err(StatusCode::UNAUTHORIZED);
    };

    let email = state
        .engine
        .token_email(bearer.token())
        .await
        .map_err(|_| StatusCode::UNAUTHORIZED)?;

    let Some(email) = email else {
        return Err(StatusCode::UNAUTHORIZED);
    };

    if !email.eq_ignore_ascii_case(&state.owner_email) {
        tracing::warn!("rejected non-owner account");
        return Err(StatusCode::FORBIDDEN);
    }

    Ok(next.run(request).await)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(err) => {
                tracing::error!("invalid CORS origin {origin}: {err}");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}

fn router(state: ServerState, origins: &[String]) -> Router {
    Router::new()
        .route(
            "/api/transactions",
            get(transactions::list).post(transactions::create),
        )
        .route("/api/kpis", get(summaries::kpis))
        .route("/api/daily-summaries", get(summaries::daily))
        .route("/api/weekly-summaries", get(summaries::weekly))
        .route("/api/dashboard", get(summaries::dashboard))
        .route("/api/top-items", get(items::top_items))
        .route("/api/top-revenue-items", get(items::top_revenue_items))
        .route("/api/category-breakdown", get(categories::breakdown))
        .route("/api/expenses-by-category", get(categories::expenses))
        .route("/api/report-signed-url", get(reports::signed_url))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth))
        .layer(cors_layer(origins))
        .with_state(state)
}

pub async fn run(engine: Engine, config: ServerConfig) {
    let listener = match tokio::net::TcpListener::bind("127.0.0.1:3005").await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener: {err}");
            return;
        }
    };
    if let Err(err) = run_with_listener(engine, config, listener).await {
        tracing::error!("server failed: {err}");
    }
}

pub async fn run_with_listener(
    engine: Engine,
    config: ServerConfig,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    let state = ServerState {
        engine: Arc::new(engine),
        owner_email: Arc::new(config.owner_email.clone()),
    };

    axum::serve(listener, router(state, &config.origins)).await
}

pub fn spawn_with_listener(
    engine: Engine,
    config: ServerConfig,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(engine, config, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}

#[cfg(test)]
mod tests {
    use super::*;

    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request as HttpRequest;
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use engine::{DateRange, LedgerEntry, NewEntry, RecordStore, StoreError};

    /// Store double with no deployed procedures: every report runs the
    /// fallback path.
    #[derive(Default)]
    struct TestStore {
        rows: Vec<LedgerEntry>,
    }

    #[async_trait]
    impl RecordStore for TestStore {
        async fn insert_entry(&self, entry: &NewEntry) -> Result<LedgerEntry, StoreError> {
            Ok(LedgerEntry {
                id: Some(1),
                item_name: entry.item_name.clone(),
                quantity: entry.quantity,
                price_per_quantity: entry.price_per_quantity,
                item_type: entry.item_type.clone(),
                category: entry.category.clone(),
                date: entry.date,
                processed: entry.processed,
            })
        }

        async fn entries_in_range(
            &self,
            range: &DateRange,
        ) -> Result<Vec<LedgerEntry>, StoreError> {
            Ok(self
                .rows
                .iter()
                .filter(|row| range.contains(row.date))
                .cloned()
                .collect())
        }

        async fn call_procedure(
            &self,
            name: &str,
            _params: &Value,
        ) -> Result<Option<Value>, StoreError> {
            Err(StoreError::Gateway {
                status: 404,
                message: format!("function {name} does not exist"),
            })
        }

        async fn signed_url(&self, bucket: &str, object: &str) -> Result<String, StoreError> {
            Ok(format!("https://store.test/sign/{bucket}/{object}"))
        }

        async fn token_email(&self, token: &str) -> Result<Option<String>, StoreError> {
            match token {
                "owner-token" => Ok(Some("owner@example.com".to_string())),
                "guest-token" => Ok(Some("guest@example.com".to_string())),
                _ => Ok(None),
            }
        }
    }

    fn app(rows: Vec<LedgerEntry>) -> Router {
        let state = ServerState {
            engine: Arc::new(Engine::new(Arc::new(TestStore { rows }))),
            owner_email: Arc::new("owner@example.com".to_string()),
        };
        router(state, &["http://localhost:8080".to_string()])
    }

    fn entry(kind: &str, item: &str, qty: i64, price: f64, date: &str) -> LedgerEntry {
        LedgerEntry {
            id: Some(7),
            item_name: item.to_string(),
            quantity: qty,
            price_per_quantity: price,
            item_type: kind.to_string(),
            category: "General".to_string(),
            date: date.parse().unwrap(),
            processed: false,
        }
    }

    fn get(uri: &str, token: Option<&str>) -> HttpRequest<Body> {
        let mut builder = HttpRequest::builder().uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        builder.body(Body::empty()).unwrap()
    }

    async fn body_json(response: Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn missing_token_is_401() {
        let res = app(Vec::new())
            .oneshot(get("/api/kpis?start=2025-09-01&end=2025-09-30", None))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn unknown_token_is_401() {
        let res = app(Vec::new())
            .oneshot(get("/api/kpis", Some("bogus")))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn non_owner_is_403() {
        let res = app(Vec::new())
            .oneshot(get("/api/kpis", Some("guest-token")))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn kpis_answer_zeroes_for_empty_ranges() {
        let res = app(Vec::new())
            .oneshot(get(
                "/api/kpis?start=2025-09-01&end=2025-09-30",
                Some("owner-token"),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let body = body_json(res).await;
        assert_eq!(
            body,
            json!({ "total_income": 0.0, "total_expense": 0.0, "net_income": 0.0 })
        );
    }

    #[tokio::test]
    async fn kpis_aggregate_the_range() {
        let rows = vec![
            entry("Income", "Injera", 50, 5.0, "2025-09-10"),
            entry("Expense", "Oil", 10, 80.0, "2025-09-10"),
        ];
        let res = app(rows)
            .oneshot(get(
                "/api/kpis?start=2025-09-10&end=2025-09-10",
                Some("owner-token"),
            ))
            .await
            .unwrap();
        let body = body_json(res).await;
        assert_eq!(body["total_income"], 250.0);
        assert_eq!(body["total_expense"], 800.0);
        assert_eq!(body["net_income"], -550.0);
    }

    #[tokio::test]
    async fn transactions_list_wraps_rows() {
        let rows = vec![entry("Income", "Injera", 2, 5.0, "2025-09-10")];
        let res = app(rows)
            .oneshot(get(
                "/api/transactions?start=2025-09-01&end=2025-09-30",
                Some("owner-token"),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let body = body_json(res).await;
        assert_eq!(body["rows"][0]["item_name"], "Injera");
        assert_eq!(body["rows"][0]["processed"], false);
    }

    #[tokio::test]
    async fn create_accepts_camel_case_aliases() {
        let payload = json!({
            "itemName": "Injera",
            "quantity": 50,
            "pricePerUnit": 5,
            "itemType": "Income",
            "category": "Food",
            "date": "2025-09-10"
        });
        let req = HttpRequest::builder()
            .uri("/api/transactions")
            .method("POST")
            .header("authorization", "Bearer owner-token")
            .header("content-type", "application/json")
            .body(Body::from(payload.to_string()))
            .unwrap();

        let res = app(Vec::new()).oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::CREATED);
        let body = body_json(res).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["row"]["item_type"], "income");
        assert_eq!(body["row"]["id"], 1);
    }

    #[tokio::test]
    async fn create_rejects_zero_quantity_with_details() {
        let payload = json!({
            "item_name": "Injera",
            "quantity": 0,
            "price_per_quantity": 5,
            "item_type": "income",
            "category": "Food",
            "date": "2025-09-10"
        });
        let req = HttpRequest::builder()
            .uri("/api/transactions")
            .method("POST")
            .header("authorization", "Bearer owner-token")
            .header("content-type", "application/json")
            .body(Body::from(payload.to_string()))
            .unwrap();

        let res = app(Vec::new()).oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body = body_json(res).await;
        assert_eq!(body["error"], "Missing or invalid fields");
        assert!(
            body["details"]
                .as_array()
                .unwrap()
                .contains(&json!("quantity"))
        );
    }

    #[tokio::test]
    async fn daily_summaries_return_an_array() {
        let rows = vec![
            entry("Income", "a", 1, 10.0, "2025-09-10"),
            entry("Expense", "b", 1, 4.0, "2025-09-11"),
        ];
        let res = app(rows)
            .oneshot(get(
                "/api/daily-summaries?start=2025-09-01&end=2025-09-30",
                Some("owner-token"),
            ))
            .await
            .unwrap();
        let body = body_json(res).await;
        let days = body.as_array().unwrap();
        assert_eq!(days.len(), 2);
        assert_eq!(days[0]["date"], "2025-09-10");
        assert_eq!(days[0]["totalIncome"], 10.0);
        assert_eq!(days[1]["netProfit"], -4.0);
    }

    #[tokio::test]
    async fn dashboard_rejects_unknown_granularity() {
        let res = app(Vec::new())
            .oneshot(get(
                "/api/dashboard?start=2025-09-01&end=2025-09-30&granularity=hourly",
                Some("owner-token"),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn top_items_reject_unknown_metric() {
        let res = app(Vec::new())
            .oneshot(get(
                "/api/top-items?start=2025-09-01&end=2025-09-30&by=profit",
                Some("owner-token"),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn top_revenue_items_use_the_compact_shape() {
        let rows = vec![
            entry("Income", "Injera", 50, 5.0, "2025-09-10"),
            entry("Income", "Tea", 10, 2.0, "2025-09-11"),
        ];
        let res = app(rows)
            .oneshot(get(
                "/api/top-revenue-items?start=2025-09-01&end=2025-09-30&limit=1",
                Some("owner-token"),
            ))
            .await
            .unwrap();
        let body = body_json(res).await;
        assert_eq!(body, json!([{ "item": "Injera", "revenue": 250.0 }]));
    }

    #[tokio::test]
    async fn category_endpoints_differ_only_in_field_names() {
        let mut rent = entry("Expense", "x", 1, 800.0, "2025-09-10");
        rent.category = "Rent".to_string();
        let rows = vec![rent];

        let res = app(rows.clone())
            .oneshot(get(
                "/api/category-breakdown?start=2025-09-01&end=2025-09-30",
                Some("owner-token"),
            ))
            .await
            .unwrap();
        let body = body_json(res).await;
        assert_eq!(body[0]["value"], 800.0);
        assert_eq!(body[0]["percent"], 100.0);

        let res = app(rows)
            .oneshot(get(
                "/api/expenses-by-category?start=2025-09-01&end=2025-09-30",
                Some("owner-token"),
            ))
            .await
            .unwrap();
        let body = body_json(res).await;
        assert_eq!(body[0]["total"], 800.0);
    }

    #[tokio::test]
    async fn report_signed_url_requires_path() {
        let res = app(Vec::new())
            .oneshot(get("/api/report-signed-url", Some("owner-token")))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn report_signed_url_passes_external_urls_through() {
        let res = app(Vec::new())
            .oneshot(get(
                "/api/report-signed-url?path=https%3A%2F%2Freports.example.com%2Fw1.pdf",
                Some("owner-token"),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let body = body_json(res).await;
        assert_eq!(body["url"], "https://reports.example.com/w1.pdf");
    }

    #[tokio::test]
    async fn report_signed_url_resolves_storage_paths() {
        let res = app(Vec::new())
            .oneshot(get(
                "/api/report-signed-url?path=reports/2025/w37.pdf",
                Some("owner-token"),
            ))
            .await
            .unwrap();
        let body = body_json(res).await;
        assert_eq!(body["url"], "https://store.test/sign/reports/2025/w37.pdf");
    }
}
