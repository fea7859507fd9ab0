//! MACD (Moving Average Convergence Divergence).
//!
//! MACD line = EMA(short) - EMA(long)
//! Signal line: mean of the MACD line over indices [long, long + signal),
//! then an EMA(signal) of the MACD line from index long + signal onward.

use super::{ema, mean, IndicatorParams};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MacdState {
    pub ema_short: f64,
    pub ema_long: f64,
    pub macd: f64,
    pub signal: f64,
}

impl MacdState {
    /// Smallest number of prices [`MacdState::seed`] accepts.
    pub fn min_prices(params: &IndicatorParams) -> usize {
        params.long_period + params.signal_period
    }

    /// State as of the last of `prices`, or `None` if there are too few.
    pub fn seed(prices: &[f64], params: &IndicatorParams) -> Option<Self> {
        if params.short_period == 0
            || params.long_period == 0
            || params.signal_period == 0
            || prices.len() < Self::min_prices(params)
        {
            return None;
        }

        let short = ema::series(prices, params.short_period);
        let long = ema::series(prices, params.long_period);
        let line: Vec<f64> = short
            .iter()
            .zip(&long)
            .map(|(s, l)| match (s, l) {
                (Some(s), Some(l)) => s - l,
                _ => 0.0,
            })
            .collect();

        let seed_start = params.long_period;
        let seed_end = seed_start + params.signal_period;
        let mut signal = mean(&line[seed_start..seed_end]);
        for &value in &line[seed_end..] {
            signal = ema::step(signal, value, params.signal_period);
        }

        let last = prices.len() - 1;
        Some(MacdState {
            ema_short: short[last]?,
            ema_long: long[last]?,
            macd: line[last],
            signal,
        })
    }

    pub fn advance(&self, price: f64, params: &IndicatorParams) -> Self {
        let ema_short = ema::step(self.ema_short, price, params.short_period);
        let ema_long = ema::step(self.ema_long, price, params.long_period);
        let macd = ema_short - ema_long;
        let signal = ema::step(self.signal, macd, params.signal_period);
        MacdState {
            ema_short,
            ema_long,
            macd,
            signal,
        }
    }

    pub fn histogram(&self) -> f64 {
        self.macd - self.signal
    }
}
