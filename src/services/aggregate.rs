use thiserror::Error;

use crate::external::price_provider::PricePoint;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    pub max: f64,
    pub min: f64,
    pub mean: f64,
}

#[derive(Debug, Error)]
#[error("cannot summarize an empty price series")]
pub struct EmptyInput;

/// Reduce a price series to (max, min, mean).
///
/// The mean is the unweighted arithmetic mean over every close in the
/// series, accumulated with Kahan compensation so long series don't drift.
pub fn summarize(prices: &[PricePoint]) -> Result<Summary, EmptyInput> {
    let first = prices.first().ok_or(EmptyInput)?;

    let mut max = first.close;
    let mut min = first.close;

    // Kahan (compensated) summation
    let mut sum = 0.0_f64;
    let mut compensation = 0.0_f64;

    for p in prices {
        max = max.max(p.close);
        min = min.min(p.close);

        let y = p.close - compensation;
        let t = sum + y;
        compensation = (t - sum) - y;
        sum = t;
    }

    Ok(Summary {
        max,
        min,
        mean: sum / prices.len() as f64,
    })
}
