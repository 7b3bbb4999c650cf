//! End-to-end API tests: the real router wired to an in-memory SQLite store
//! and a scripted price provider, driven through tower's `oneshot`.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use chrono::{Days, NaiveDate};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use sqlx::sqlite::SqlitePoolOptions;
use tower::util::ServiceExt;

use stock_analyzer_backend::app::create_app;
use stock_analyzer_backend::db;
use stock_analyzer_backend::external::price_provider::{
    PricePoint, PriceProvider, PriceProviderError,
};
use stock_analyzer_backend::state::AppState;

/// Deterministic stand-in for the market-data provider.
///
/// "ACME" yields the closes [100, 105, 95, 102, 98] starting at the range
/// start, "NODATA" yields an empty series, "ZZZZ" fails as an unknown
/// ticker, and anything else yields [100, 150, 125]. Every call is counted.
struct MockProvider {
    calls: AtomicUsize,
}

impl MockProvider {
    fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
        }
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PriceProvider for MockProvider {
    async fn fetch_daily_closes(
        &self,
        ticker: &str,
        start_date: NaiveDate,
        _end_date: NaiveDate,
    ) -> Result<Vec<PricePoint>, PriceProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let closes: &[f64] = match ticker {
            "ACME" => &[100.0, 105.0, 95.0, 102.0, 98.0],
            "NODATA" => &[],
            "ZZZZ" => {
                return Err(PriceProviderError::BadResponse(
                    "unknown ticker ZZZZ".to_string(),
                ))
            }
            _ => &[100.0, 150.0, 125.0],
        };

        Ok(closes
            .iter()
            .enumerate()
            .map(|(i, &close)| PricePoint {
                date: start_date + Days::new(i as u64),
                close,
            })
            .collect())
    }
}

async fn test_app() -> (Router, Arc<MockProvider>) {
    // One connection so every query sees the same in-memory database.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory sqlite");
    db::init_schema(&pool).await.expect("schema");

    let provider = Arc::new(MockProvider::new());
    let state = AppState {
        pool,
        price_provider: provider.clone(),
    };
    (create_app(state), provider)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.expect("request");
    let status = response.status();
    let bytes = response.into_body().collect().await.expect("body").to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, body)
}

fn submit_request(ticker: &str, start_date: &str, end_date: &str) -> Request<Body> {
    let payload = json!({
        "ticker": ticker,
        "start_date": start_date,
        "end_date": end_date,
    });
    Request::builder()
        .method("POST")
        .uri("/api/stocks")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(payload.to_string()))
        .unwrap()
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn delete_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn health_is_alive() {
    let (app, _) = test_app().await;
    let response = app
        .oneshot(get_request("/health"))
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn submit_stores_expected_aggregates() {
    let (app, provider) = test_app().await;

    let (status, body) = send(&app, submit_request("ACME", "2024-01-01", "2024-01-05")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ticker"], "ACME");
    assert_eq!(body["start_date"], "2024-01-01");
    assert_eq!(body["end_date"], "2024-01-05");
    assert_eq!(body["max_price"], 105.0);
    assert_eq!(body["min_price"], 95.0);
    assert_eq!(body["mean_price"], 100.0);
    assert!(body.get("message").is_none());
    assert_eq!(provider.call_count(), 1);
}

#[tokio::test]
async fn second_submit_reuses_the_stored_row() {
    let (app, provider) = test_app().await;

    let (_, first) = send(&app, submit_request("GOOG", "2023-01-01", "2023-01-31")).await;
    let (status, second) = send(&app, submit_request("GOOG", "2023-01-01", "2023-01-31")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["id"], first["id"]);
    assert_eq!(
        second["message"],
        "Data already exists in the database."
    );
    // Cache hit never re-fetches.
    assert_eq!(provider.call_count(), 1);

    let (_, listed) = send(&app, get_request("/api/stocks")).await;
    assert_eq!(listed.as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn ticker_is_uppercased_before_the_uniqueness_check() {
    let (app, provider) = test_app().await;

    let (_, first) = send(&app, submit_request("ACME", "2024-01-01", "2024-01-05")).await;
    let (status, second) = send(&app, submit_request("  acme ", "2024-01-01", "2024-01-05")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["id"], first["id"]);
    assert_eq!(provider.call_count(), 1);
}

#[tokio::test]
async fn inverted_range_is_rejected_before_any_fetch() {
    let (app, provider) = test_app().await;

    let (status, body) = send(&app, submit_request("ACME", "2024-01-05", "2024-01-01")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("start_date"));
    assert_eq!(provider.call_count(), 0);
}

#[tokio::test]
async fn blank_ticker_is_rejected() {
    let (app, provider) = test_app().await;

    let (status, _) = send(&app, submit_request("   ", "2024-01-01", "2024-01-05")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(provider.call_count(), 0);
}

#[tokio::test]
async fn unknown_ticker_stores_nothing() {
    let (app, _) = test_app().await;

    let (status, body) = send(&app, submit_request("ZZZZ", "2024-01-01", "2024-01-05")).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body["error"].as_str().unwrap().contains("ZZZZ"));

    let (_, listed) = send(&app, get_request("/api/stocks")).await;
    assert_eq!(listed.as_array().map(Vec::len), Some(0));
}

#[tokio::test]
async fn empty_range_reports_no_data_and_stores_nothing() {
    let (app, _) = test_app().await;

    let (status, body) = send(&app, submit_request("NODATA", "2024-01-01", "2024-01-05")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"],
        "No data found for the given ticker and date range."
    );

    let (_, listed) = send(&app, get_request("/api/stocks")).await;
    assert_eq!(listed.as_array().map(Vec::len), Some(0));
}

#[tokio::test]
async fn list_is_ordered_by_id_ascending() {
    let (app, _) = test_app().await;

    send(&app, submit_request("AAA", "2024-01-01", "2024-01-03")).await;
    send(&app, submit_request("BBB", "2024-01-01", "2024-01-03")).await;
    send(&app, submit_request("CCC", "2024-01-01", "2024-01-03")).await;

    let (status, listed) = send(&app, get_request("/api/stocks")).await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<i64> = listed
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["id"].as_i64().unwrap())
        .collect();
    let mut sorted = ids.clone();
    sorted.sort_unstable();
    assert_eq!(ids, sorted);
    assert_eq!(ids.len(), 3);
}

#[tokio::test]
async fn delete_removes_the_row_and_repeat_delete_is_not_found() {
    let (app, _) = test_app().await;

    let (_, created) = send(&app, submit_request("ACME", "2024-01-01", "2024-01-05")).await;
    let id = created["id"].as_i64().unwrap();

    let (status, _) = send(&app, delete_request(&format!("/api/stocks/{id}"))).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, listed) = send(&app, get_request("/api/stocks")).await;
    assert_eq!(listed.as_array().map(Vec::len), Some(0));

    let (status, _) = send(&app, delete_request(&format!("/api/stocks/{id}"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn series_endpoint_returns_the_raw_closes_for_plotting() {
    let (app, provider) = test_app().await;

    let (_, created) = send(&app, submit_request("ACME", "2024-01-01", "2024-01-05")).await;
    let id = created["id"].as_i64().unwrap();

    let (status, series) = send(&app, get_request(&format!("/api/stocks/{id}/series"))).await;
    assert_eq!(status, StatusCode::OK);
    let points = series.as_array().unwrap();
    assert_eq!(points.len(), 5);
    assert_eq!(points[0]["date"], "2024-01-01");
    assert_eq!(points[0]["close"], 100.0);
    assert_eq!(points[1]["close"], 105.0);
    // One fetch for the ingest, one re-fetch for the plot.
    assert_eq!(provider.call_count(), 2);
}

#[tokio::test]
async fn series_for_unknown_id_is_not_found() {
    let (app, _) = test_app().await;

    let (status, _) = send(&app, get_request("/api/stocks/999/series")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
