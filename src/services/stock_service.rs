use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::db;
use crate::errors::AppError;
use crate::external::price_provider::{PricePoint, PriceProvider, PriceProviderError};
use crate::models::{IngestRequest, NewStockSummary, StockSummaryRecord};
use crate::services::aggregate;

const NO_DATA_MSG: &str = "No data found for the given ticker and date range.";

/// Result of an ingest: either a freshly stored summary or one that already
/// existed for the same (ticker, start_date, end_date) key.
#[derive(Debug)]
pub enum IngestOutcome {
    Inserted(StockSummaryRecord),
    Existing(StockSummaryRecord),
}

/// End-to-end ingest: validate, check the store, and only on a miss fetch,
/// aggregate, and insert. At most one row per key ever lands in the store.
pub async fn ingest(
    pool: &SqlitePool,
    provider: &dyn PriceProvider,
    request: IngestRequest,
) -> Result<IngestOutcome, AppError> {
    let (ticker, start_date, end_date) = validate(request)?;

    if let Some(existing) = db::stock_queries::find(pool, &ticker, start_date, end_date).await? {
        info!("Summary for {} {}..{} already stored", ticker, start_date, end_date);
        return Ok(IngestOutcome::Existing(existing));
    }

    let prices = provider
        .fetch_daily_closes(&ticker, start_date, end_date)
        .await
        .map_err(map_provider_err)?;

    if prices.is_empty() {
        return Err(AppError::NoData(NO_DATA_MSG.to_string()));
    }

    let summary =
        aggregate::summarize(&prices).map_err(|_| AppError::NoData(NO_DATA_MSG.to_string()))?;

    let input = NewStockSummary {
        ticker: ticker.clone(),
        start_date,
        end_date,
        max_price: summary.max,
        min_price: summary.min,
        mean_price: summary.mean,
    };

    match db::stock_queries::insert(pool, input).await {
        Ok(record) => Ok(IngestOutcome::Inserted(record)),
        // Lost a check-then-insert race to a concurrent request for the same
        // key; the row that won is the answer.
        Err(e) if db::stock_queries::is_duplicate(&e) => {
            warn!("Concurrent insert for {} {}..{}, reusing existing row", ticker, start_date, end_date);
            db::stock_queries::find(pool, &ticker, start_date, end_date)
                .await?
                .map(IngestOutcome::Existing)
                .ok_or(AppError::Db(e))
        }
        Err(e) => Err(AppError::Db(e)),
    }
}

pub async fn fetch_all(pool: &SqlitePool) -> Result<Vec<StockSummaryRecord>, AppError> {
    let records = db::stock_queries::fetch_all(pool).await?;
    Ok(records)
}

pub async fn delete(pool: &SqlitePool, id: i64) -> Result<(), AppError> {
    match db::stock_queries::delete(pool, id).await {
        Ok(0) => Err(AppError::NotFound(format!("No stored summary with id {id}"))),
        Ok(_) => Ok(()),
        Err(e) => Err(AppError::from(e)),
    }
}

/// Raw daily series behind a stored summary, for plotting. The store keeps
/// only the aggregate, so the series is re-fetched from the provider.
pub async fn fetch_series(
    pool: &SqlitePool,
    provider: &dyn PriceProvider,
    id: i64,
) -> Result<Vec<PricePoint>, AppError> {
    let record = db::stock_queries::fetch_one(pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No stored summary with id {id}")))?;

    let prices = provider
        .fetch_daily_closes(&record.ticker, record.start_date, record.end_date)
        .await
        .map_err(map_provider_err)?;

    if prices.is_empty() {
        return Err(AppError::NoData(NO_DATA_MSG.to_string()));
    }

    Ok(prices)
}

// Ticker case-handling policy: the uniqueness key is the uppercased symbol,
// so "acme" and "ACME" share one row.
fn validate(
    request: IngestRequest,
) -> Result<(String, chrono::NaiveDate, chrono::NaiveDate), AppError> {
    let ticker = request.ticker.trim().to_uppercase();
    if ticker.is_empty() {
        return Err(AppError::Validation("Ticker must not be empty".to_string()));
    }
    if request.start_date > request.end_date {
        return Err(AppError::Validation(
            "start_date must not be after end_date".to_string(),
        ));
    }
    Ok((ticker, request.start_date, request.end_date))
}

fn map_provider_err(err: PriceProviderError) -> AppError {
    match err {
        PriceProviderError::RateLimited => AppError::RateLimited,
        other => AppError::Provider(other.to_string()),
    }
}
