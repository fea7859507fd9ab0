//! Per-symbol indicator state and its seed/advance lifecycle.
//!
//! A [`TrackedAsset`] is the full indicator state as of one trading date.
//! It is created once by [`seed`] from a long price history and then moved
//! forward one trading day at a time by [`TrackedAsset::advance`], which is
//! O(1) and never revisits history.

use chrono::NaiveDate;

use crate::domain::admission;
use crate::domain::bar::DailyBar;
use crate::domain::error::SwingtraderError;
use crate::domain::indicator::IndicatorParams;
use crate::domain::indicator::macd::MacdState;
use crate::domain::indicator::rsi::WilderAverages;
use crate::domain::indicator::trend::TrendState;
use crate::domain::window::BoundedWindow;

#[derive(Debug, Clone, PartialEq)]
pub struct TrackedAsset {
    pub symbol: String,
    pub date: NaiveDate,
    pub close: f64,
    pub ema_short: f64,
    pub ema_long: f64,
    pub macd: f64,
    pub macd_signal: f64,
    pub average_gain: f64,
    pub average_loss: f64,
    pub rsi_window: BoundedWindow<f64>,
    pub ema_long_trend: f64,
    pub trend_window: BoundedWindow<bool>,
}

/// Output of a seeding pass: the current state plus the warmed-up daily
/// snapshots that preceded it (oldest first), capped at
/// `IndicatorParams::retained_history` records in total.
#[derive(Debug, Clone)]
pub struct Seeded {
    pub history: Vec<TrackedAsset>,
    pub current: TrackedAsset,
}

impl Seeded {
    /// Every retained record, oldest first, ending with `current`.
    pub fn records(&self) -> impl Iterator<Item = &TrackedAsset> {
        self.history.iter().chain(std::iter::once(&self.current))
    }
}

impl TrackedAsset {
    /// Both lookback windows hold their full capacity.
    pub fn is_warm(&self) -> bool {
        self.rsi_window.is_full() && self.trend_window.is_full()
    }

    /// Stored windows must hold exactly the configured number of values.
    /// Records written under other `[indicators]` window settings need a
    /// fresh seed.
    pub fn check_window_capacity(&self, params: &IndicatorParams) -> Result<(), SwingtraderError> {
        if self.rsi_window.capacity() == params.rsi_window
            && self.trend_window.capacity() == params.trend_window
        {
            return Ok(());
        }
        Err(SwingtraderError::InvariantViolation {
            reason: format!(
                "{} on {} has rsi/trend windows of {}/{} but {}/{} are configured; re-seed it",
                self.symbol,
                self.date,
                self.rsi_window.capacity(),
                self.trend_window.capacity(),
                params.rsi_window,
                params.trend_window,
            ),
        })
    }

    pub fn latest_rsi(&self) -> Option<f64> {
        self.rsi_window.latest().copied()
    }

    fn macd_state(&self) -> MacdState {
        MacdState {
            ema_short: self.ema_short,
            ema_long: self.ema_long,
            macd: self.macd,
            signal: self.macd_signal,
        }
    }

    /// Apply one new daily close. Rejects any date not strictly after the
    /// current one; `self` is never modified.
    pub fn advance(
        &self,
        close: f64,
        date: NaiveDate,
        params: &IndicatorParams,
    ) -> Result<TrackedAsset, SwingtraderError> {
        if date <= self.date {
            return Err(SwingtraderError::NonMonotonicDate {
                symbol: self.symbol.clone(),
                current: self.date,
                attempted: date,
            });
        }

        let macd = self.macd_state().advance(close, params);
        let averages = WilderAverages {
            average_gain: self.average_gain,
            average_loss: self.average_loss,
        }
        .advance(close - self.close, params.rsi_period);
        let trend = TrendState {
            ema_long_trend: self.ema_long_trend,
            above: false,
        }
        .advance(close, params.trend_period);

        let mut rsi_window = self.rsi_window.clone();
        rsi_window.push(averages.rsi());
        let mut trend_window = self.trend_window.clone();
        trend_window.push(trend.above);

        Ok(TrackedAsset {
            symbol: self.symbol.clone(),
            date,
            close,
            ema_short: macd.ema_short,
            ema_long: macd.ema_long,
            macd: macd.macd,
            macd_signal: macd.signal,
            average_gain: averages.average_gain,
            average_loss: averages.average_loss,
            rsi_window,
            ema_long_trend: trend.ema_long_trend,
            trend_window,
        })
    }
}

/// Seed a symbol from its bar history after running the admission checks
/// (history length, liquidity floor, zero-volume bars).
pub fn seed(
    symbol: &str,
    bars: &[DailyBar],
    params: &IndicatorParams,
    liquidity_floor: f64,
) -> Result<Seeded, SwingtraderError> {
    admission::check_bars(symbol, bars, params.required_bars(), liquidity_floor)?;
    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let dates: Vec<NaiveDate> = bars.iter().map(|b| b.date).collect();
    seed_series(symbol, &closes, &dates, params)
}

/// Seed from parallel close/date sequences. Builds the state at the first
/// index where every indicator exists, then advances through the rest.
pub fn seed_series(
    symbol: &str,
    closes: &[f64],
    dates: &[NaiveDate],
    params: &IndicatorParams,
) -> Result<Seeded, SwingtraderError> {
    let minimum = params.required_bars();
    if closes.len() < minimum || dates.len() != closes.len() {
        return Err(SwingtraderError::InsufficientHistory {
            symbol: symbol.to_string(),
            bars: closes.len().min(dates.len()),
            minimum,
        });
    }

    let boot = params.bootstrap_index();
    let prefix = &closes[..=boot];
    let invariant = |what: &str| SwingtraderError::InvariantViolation {
        reason: format!("cannot bootstrap {what} for {symbol} from {} prices", prefix.len()),
    };

    let macd = MacdState::seed(prefix, params).ok_or_else(|| invariant("MACD"))?;
    let (averages, rsi_path) =
        WilderAverages::seed(prefix, params.rsi_period).ok_or_else(|| invariant("RSI"))?;
    let trend = TrendState::seed(prefix, params.trend_period).ok_or_else(|| invariant("trend"))?;

    let mut rsi_window = BoundedWindow::new(params.rsi_window);
    for &value in &rsi_path {
        rsi_window.push(value);
    }
    let mut trend_window = BoundedWindow::new(params.trend_window);
    trend_window.push(trend.above);

    let mut state = TrackedAsset {
        symbol: symbol.to_string(),
        date: dates[boot],
        close: closes[boot],
        ema_short: macd.ema_short,
        ema_long: macd.ema_long,
        macd: macd.macd,
        macd_signal: macd.signal,
        average_gain: averages.average_gain,
        average_loss: averages.average_loss,
        rsi_window,
        ema_long_trend: trend.ema_long_trend,
        trend_window,
    };

    let mut retained = BoundedWindow::new(params.retained_history.max(1));
    if state.is_warm() {
        retained.push(state.clone());
    }
    for (&close, &date) in closes[boot + 1..].iter().zip(&dates[boot + 1..]) {
        state = state.advance(close, date, params)?;
        if state.is_warm() {
            retained.push(state.clone());
        }
    }

    let mut history = retained.to_vec();
    let current = history.pop().ok_or_else(|| invariant("warm windows"))?;
    Ok(Seeded { history, current })
}
