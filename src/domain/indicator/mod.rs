//! Incremental indicator recurrences.
//!
//! Every indicator comes in two forms: a `seed` that walks a historical
//! price series once, and a single-step `advance`/`step` that moves an
//! existing state forward by one new close. Seeding is implemented in terms
//! of the same step functions, so seeding `n + 1` prices and advancing a
//! seed of `n` prices by one produce identical values.
//!
//! - [`ema`]: exponential moving average (SMA seed, `k = 2/(n+1)`)
//! - [`macd`]: short/long EMA difference and its signal EMA
//! - [`rsi`]: Wilder-smoothed average gain/loss and the derived RSI
//! - [`trend`]: long-period trend EMA and the above-trend flag

pub mod ema;
pub mod macd;
pub mod rsi;
pub mod trend;

pub const DEFAULT_SHORT_PERIOD: usize = 12;
pub const DEFAULT_LONG_PERIOD: usize = 26;
pub const DEFAULT_SIGNAL_PERIOD: usize = 9;
pub const DEFAULT_RSI_PERIOD: usize = 14;
pub const DEFAULT_TREND_PERIOD: usize = 200;
pub const DEFAULT_RSI_WINDOW: usize = 5;
pub const DEFAULT_TREND_WINDOW: usize = 5;
pub const DEFAULT_MIN_SEED_BARS: usize = 250;
pub const DEFAULT_RETAINED_HISTORY: usize = 30;

/// Periods and window sizes shared by seeding and advancing.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorParams {
    pub short_period: usize,
    pub long_period: usize,
    pub signal_period: usize,
    pub rsi_period: usize,
    pub trend_period: usize,
    pub rsi_window: usize,
    pub trend_window: usize,
    pub min_seed_bars: usize,
    /// Number of warmed-up daily snapshots kept from a seeding pass.
    pub retained_history: usize,
}

impl Default for IndicatorParams {
    fn default() -> Self {
        IndicatorParams {
            short_period: DEFAULT_SHORT_PERIOD,
            long_period: DEFAULT_LONG_PERIOD,
            signal_period: DEFAULT_SIGNAL_PERIOD,
            rsi_period: DEFAULT_RSI_PERIOD,
            trend_period: DEFAULT_TREND_PERIOD,
            rsi_window: DEFAULT_RSI_WINDOW,
            trend_window: DEFAULT_TREND_WINDOW,
            min_seed_bars: DEFAULT_MIN_SEED_BARS,
            retained_history: DEFAULT_RETAINED_HISTORY,
        }
    }
}

impl IndicatorParams {
    /// Fewest bars a seeding pass accepts. Never less than what is needed to
    /// fill the trend window once the trend EMA exists.
    pub fn required_bars(&self) -> usize {
        self.min_seed_bars
            .max(self.trend_period + self.trend_window)
    }

    /// Index of the first bar at which every indicator has a value.
    pub fn bootstrap_index(&self) -> usize {
        self.trend_period - 1
    }
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}
