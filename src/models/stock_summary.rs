use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// Persisted (min, max, mean) aggregate for one ticker/date-range query.
// Immutable once inserted; removed only by an explicit delete.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct StockSummaryRecord {
    pub id: i64,
    pub ticker: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub max_price: f64,
    pub min_price: f64,
    pub mean_price: f64,
}

/// A summary row before the store has assigned its id.
#[derive(Debug, Clone)]
pub struct NewStockSummary {
    pub ticker: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub max_price: f64,
    pub min_price: f64,
    pub mean_price: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestRequest {
    pub ticker: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}
