//! Exponential Moving Average.
//!
//! k = 2/(n+1), seed with the SMA of the first n closes, then
//! EMA[i] = C[i]*k + EMA[i-1]*(1-k).

use super::mean;

pub fn smoothing(period: usize) -> f64 {
    2.0 / (period as f64 + 1.0)
}

/// Initial EMA value: the arithmetic mean of the seed prices.
pub fn seed(prices: &[f64]) -> f64 {
    mean(prices)
}

pub fn step(prev: f64, price: f64, period: usize) -> f64 {
    let k = smoothing(period);
    price * k + prev * (1.0 - k)
}

/// EMA path over `prices`; `None` for the first `period - 1` entries.
pub fn series(prices: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut values = Vec::with_capacity(prices.len());
    if period == 0 {
        values.resize(prices.len(), None);
        return values;
    }

    let mut ema = 0.0;
    for (i, &price) in prices.iter().enumerate() {
        if i + 1 < period {
            values.push(None);
        } else if i + 1 == period {
            ema = seed(&prices[..period]);
            values.push(Some(ema));
        } else {
            ema = step(ema, price, period);
            values.push(Some(ema));
        }
    }
    values
}
