//! RSI (Relative Strength Index) with Wilder's smoothing.
//!
//! - First averages: simple mean of gains/losses over the first n price changes
//! - Subsequent: avg = (prev_avg * (n-1) + current) / n
//!
//! RSI = 100 - (100 / (1 + avg_gain / avg_loss)); if avg_loss == 0: RSI = 100.
//! Losses are stored as positive magnitudes.

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WilderAverages {
    pub average_gain: f64,
    pub average_loss: f64,
}

/// Split a price change into its (gain, loss) contributions.
pub fn split_delta(delta: f64) -> (f64, f64) {
    if delta > 0.0 {
        (delta, 0.0)
    } else {
        (0.0, -delta)
    }
}

pub fn rsi(average_gain: f64, average_loss: f64) -> f64 {
    if average_loss == 0.0 {
        return 100.0;
    }
    100.0 - (100.0 / (1.0 + average_gain / average_loss))
}

impl WilderAverages {
    /// Averages as of the last of `prices`, plus the RSI value at every index
    /// from `period` onward (oldest first). `None` with fewer than
    /// `period + 1` prices.
    pub fn seed(prices: &[f64], period: usize) -> Option<(Self, Vec<f64>)> {
        if period == 0 || prices.len() < period + 1 {
            return None;
        }

        let mut gain_sum = 0.0;
        let mut loss_sum = 0.0;
        for pair in prices[..=period].windows(2) {
            let (gain, loss) = split_delta(pair[1] - pair[0]);
            gain_sum += gain;
            loss_sum += loss;
        }

        let mut averages = WilderAverages {
            average_gain: gain_sum / period as f64,
            average_loss: loss_sum / period as f64,
        };
        let mut path = Vec::with_capacity(prices.len() - period);
        path.push(averages.rsi());

        for pair in prices[period..].windows(2) {
            averages = averages.advance(pair[1] - pair[0], period);
            path.push(averages.rsi());
        }

        Some((averages, path))
    }

    pub fn advance(&self, delta: f64, period: usize) -> Self {
        let (gain, loss) = split_delta(delta);
        let n = period as f64;
        WilderAverages {
            average_gain: (self.average_gain * (n - 1.0) + gain) / n,
            average_loss: (self.average_loss * (n - 1.0) + loss) / n,
        }
    }

    pub fn rsi(&self) -> f64 {
        rsi(self.average_gain, self.average_loss)
    }
}
