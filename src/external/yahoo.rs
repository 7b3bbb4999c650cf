use crate::external::price_provider::{PricePoint, PriceProvider, PriceProviderError};
use async_trait::async_trait;
use chrono::{DateTime, Days, NaiveDate};
use serde::Deserialize;

pub struct YahooProvider {
    client: reqwest::Client,
}

impl YahooProvider {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

// Minimal response structs (only what we need)
#[derive(Debug, Deserialize)]
struct YahooChartResponse {
    chart: YahooChart,
}

#[derive(Debug, Deserialize)]
struct YahooChart {
    result: Option<Vec<YahooResult>>,
    #[allow(dead_code)]
    error: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct YahooResult {
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: YahooIndicators,
}

#[derive(Debug, Deserialize)]
struct YahooIndicators {
    quote: Vec<YahooQuote>,
}

#[derive(Debug, Deserialize)]
struct YahooQuote {
    close: Vec<Option<f64>>,
}

#[async_trait]
impl PriceProvider for YahooProvider {
    async fn fetch_daily_closes(
        &self,
        ticker: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<PricePoint>, PriceProviderError> {
        // Yahoo's period2 is exclusive, so push it one day past the
        // requested inclusive end.
        let period1 = start_date
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| PriceProviderError::Parse("bad start date".into()))?
            .and_utc()
            .timestamp();
        let period2 = end_date
            .checked_add_days(Days::new(1))
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .ok_or_else(|| PriceProviderError::Parse("bad end date".into()))?
            .and_utc()
            .timestamp();

        let url = format!(
            "https://query1.finance.yahoo.com/v8/finance/chart/{ticker}?period1={period1}&period2={period2}&interval=1d"
        );

        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| PriceProviderError::Network(e.to_string()))?;

        if resp.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(PriceProviderError::RateLimited);
        }
        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(PriceProviderError::BadResponse(format!(
                "unknown ticker {ticker}"
            )));
        }

        let body = resp
            .json::<YahooChartResponse>()
            .await
            .map_err(|e| PriceProviderError::Parse(e.to_string()))?;

        let result = body
            .chart
            .result
            .and_then(|mut r| r.pop())
            .ok_or_else(|| PriceProviderError::BadResponse("missing result".into()))?;

        // timestamp aligns with the close list by index
        let closes = &result
            .indicators
            .quote
            .first()
            .ok_or_else(|| PriceProviderError::BadResponse("missing quote".into()))?
            .close;

        let mut out = Vec::new();

        for (i, ts) in result.timestamp.iter().enumerate() {
            // skip missing closes
            let Some(close) = closes.get(i).copied().flatten() else {
                continue;
            };

            let date = DateTime::from_timestamp(*ts, 0)
                .ok_or_else(|| PriceProviderError::Parse("bad timestamp".into()))?
                .date_naive();

            // Yahoo occasionally returns a bar just outside the window.
            if date < start_date || date > end_date {
                continue;
            }

            out.push(PricePoint { date, close });
        }

        out.sort_by_key(|p| p.date);

        Ok(out)
    }
}
