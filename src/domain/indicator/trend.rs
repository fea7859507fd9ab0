//! Long-period trend EMA and the "close above trend" flag.

use super::ema;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendState {
    pub ema_long_trend: f64,
    pub above: bool,
}

impl TrendState {
    /// Trend as of the last of exactly-or-more `period` prices.
    pub fn seed(prices: &[f64], period: usize) -> Option<Self> {
        if period == 0 || prices.len() < period {
            return None;
        }
        let mut value = ema::seed(&prices[..period]);
        for &price in &prices[period..] {
            value = ema::step(value, price, period);
        }
        let close = prices[prices.len() - 1];
        Some(TrendState {
            ema_long_trend: value,
            above: close > value,
        })
    }

    pub fn advance(&self, price: f64, period: usize) -> Self {
        let value = ema::step(self.ema_long_trend, price, period);
        TrendState {
            ema_long_trend: value,
            above: price > value,
        }
    }
}
