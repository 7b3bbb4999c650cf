use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One daily closing price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
}

#[derive(Debug, Error)]
pub enum PriceProviderError {
    #[error("network error: {0}")]
    Network(String),

    #[error("bad response: {0}")]
    BadResponse(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("rate limited")]
    RateLimited,
}

/// External market-data source for daily closing prices.
///
/// Implementations make a single attempt per call. An `Ok` result holds the
/// closes inside the inclusive date range in ascending date order; an empty
/// vector means the provider answered but had no trading data for the range,
/// which is a distinct condition from any `Err`.
#[async_trait]
pub trait PriceProvider: Send + Sync {
    async fn fetch_daily_closes(
        &self,
        ticker: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<PricePoint>, PriceProviderError>;
}
