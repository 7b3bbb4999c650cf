use axum::extract::{Path, State};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use http::StatusCode;
use serde::Serialize;
use tracing::{error, info};

use crate::errors::AppError;
use crate::external::price_provider::PricePoint;
use crate::models::{IngestRequest, StockSummaryRecord};
use crate::services::stock_service::{self, IngestOutcome};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(submit_stock).get(fetch_stocks))
        .route("/:id", delete(delete_stock))
        .route("/:id/series", get(get_series))
}

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    #[serde(flatten)]
    pub record: StockSummaryRecord,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[axum::debug_handler]
pub async fn submit_stock(
    State(state): State<AppState>,
    Json(data): Json<IngestRequest>,
) -> Result<Json<SubmitResponse>, AppError> {
    info!("POST /stocks - Ingesting {} {}..{}", data.ticker, data.start_date, data.end_date);
    let outcome = stock_service::ingest(&state.pool, state.price_provider.as_ref(), data)
        .await
        .map_err(|e| {
            error!("Failed to ingest stock summary: {}", e);
            e
        })?;

    let response = match outcome {
        IngestOutcome::Inserted(record) => SubmitResponse {
            record,
            message: None,
        },
        IngestOutcome::Existing(record) => SubmitResponse {
            record,
            message: Some("Data already exists in the database.".to_string()),
        },
    };
    Ok(Json(response))
}

pub async fn fetch_stocks(
    State(state): State<AppState>,
) -> Result<Json<Vec<StockSummaryRecord>>, AppError> {
    info!("GET /stocks - Fetching all stored summaries");
    let records = stock_service::fetch_all(&state.pool).await.map_err(|e| {
        error!("Failed to fetch stored summaries: {}", e);
        e
    })?;
    Ok(Json(records))
}

pub async fn delete_stock(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    info!("DELETE /stocks/{} - Deleting stored summary", id);
    stock_service::delete(&state.pool, id).await.map_err(|e| {
        error!("Failed to delete summary {}: {}", id, e);
        e
    })?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_series(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<PricePoint>>, AppError> {
    info!("GET /stocks/{}/series - Fetching raw series for plot", id);
    let series = stock_service::fetch_series(&state.pool, state.price_provider.as_ref(), id)
        .await
        .map_err(|e| {
            error!("Failed to fetch series for summary {}: {}", id, e);
            e
        })?;
    Ok(Json(series))
}
