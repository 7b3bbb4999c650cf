use chrono::NaiveDate;
use sqlx::SqlitePool;

use crate::models::{NewStockSummary, StockSummaryRecord};

pub async fn find(
    pool: &SqlitePool,
    ticker: &str,
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> Result<Option<StockSummaryRecord>, sqlx::Error> {
    sqlx::query_as::<_, StockSummaryRecord>(
        "SELECT id, ticker, start_date, end_date, max_price, min_price, mean_price
         FROM stock
         WHERE ticker = $1 AND start_date = $2 AND end_date = $3",
    )
    .bind(ticker)
    .bind(start_date)
    .bind(end_date)
    .fetch_optional(pool)
    .await
}

/// Insert a new summary row, letting the UNIQUE(ticker, start_date, end_date)
/// constraint reject duplicates. Callers distinguish that case with
/// [`is_duplicate`].
pub async fn insert(
    pool: &SqlitePool,
    input: NewStockSummary,
) -> Result<StockSummaryRecord, sqlx::Error> {
    sqlx::query_as::<_, StockSummaryRecord>(
        "INSERT INTO stock (ticker, start_date, end_date, max_price, min_price, mean_price)
         VALUES ($1, $2, $3, $4, $5, $6)
         RETURNING id, ticker, start_date, end_date, max_price, min_price, mean_price",
    )
    .bind(input.ticker)
    .bind(input.start_date)
    .bind(input.end_date)
    .bind(input.max_price)
    .bind(input.min_price)
    .bind(input.mean_price)
    .fetch_one(pool)
    .await
}

pub async fn fetch_all(pool: &SqlitePool) -> Result<Vec<StockSummaryRecord>, sqlx::Error> {
    sqlx::query_as::<_, StockSummaryRecord>(
        "SELECT id, ticker, start_date, end_date, max_price, min_price, mean_price
         FROM stock
         ORDER BY id ASC",
    )
    .fetch_all(pool)
    .await
}

pub async fn fetch_one(
    pool: &SqlitePool,
    id: i64,
) -> Result<Option<StockSummaryRecord>, sqlx::Error> {
    sqlx::query_as::<_, StockSummaryRecord>(
        "SELECT id, ticker, start_date, end_date, max_price, min_price, mean_price
         FROM stock
         WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub async fn delete(pool: &SqlitePool, id: i64) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM stock WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

/// True when the error is the store rejecting a row that would violate the
/// uniqueness key, i.e. "already exists" rather than a real failure.
pub fn is_duplicate(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => {
            matches!(db_err.kind(), sqlx::error::ErrorKind::UniqueViolation)
        }
        _ => false,
    }
}
