//! Entry and exit signal evaluation over a tracked asset's indicator state.
//!
//! Entries need a MACD crossover confirmed by the RSI window and the trend
//! window. Exits are the MACD reversal against the held direction alone.

use crate::domain::tracked_asset::TrackedAsset;

pub const DEFAULT_TARGET_RSI: f64 = 30.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    None,
    LongEntry,
    ShortEntry,
    LongExit,
    ShortExit,
}

/// How the RSI window confirms an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RsiWindowPolicy {
    /// Any value in the window breaches the threshold.
    #[default]
    AnyInWindow,
    /// Only the newest value is considered.
    LatestOnly,
}

impl RsiWindowPolicy {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "any" => Some(RsiWindowPolicy::AnyInWindow),
            "latest" => Some(RsiWindowPolicy::LatestOnly),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SignalConfig {
    pub target_rsi: f64,
    pub rsi_policy: RsiWindowPolicy,
}

impl Default for SignalConfig {
    fn default() -> Self {
        SignalConfig {
            target_rsi: DEFAULT_TARGET_RSI,
            rsi_policy: RsiWindowPolicy::default(),
        }
    }
}

/// The indicator fields the evaluator reads.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorView<'a> {
    pub macd: f64,
    pub macd_signal: f64,
    pub rsi_window: &'a [f64],
    pub trend_window: &'a [bool],
}

fn rsi_confirms(view: &IndicatorView<'_>, policy: RsiWindowPolicy, pred: impl Fn(f64) -> bool) -> bool {
    match policy {
        RsiWindowPolicy::AnyInWindow => view.rsi_window.iter().any(|&v| pred(v)),
        RsiWindowPolicy::LatestOnly => view.rsi_window.last().is_some_and(|&v| pred(v)),
    }
}

/// Entry signal for a symbol with no open position.
pub fn evaluate_entry(view: &IndicatorView<'_>, config: &SignalConfig) -> Signal {
    let oversold = config.target_rsi;
    let overbought = 100.0 - config.target_rsi;

    if view.macd > view.macd_signal
        && rsi_confirms(view, config.rsi_policy, |v| v < oversold)
        && view.trend_window.iter().any(|&above| above)
    {
        return Signal::LongEntry;
    }

    if view.macd < view.macd_signal
        && rsi_confirms(view, config.rsi_policy, |v| v > overbought)
        && view.trend_window.iter().any(|&above| !above)
    {
        return Signal::ShortEntry;
    }

    Signal::None
}

/// Exit signal for a held position.
pub fn evaluate_exit(view: &IndicatorView<'_>, is_long: bool) -> Signal {
    if is_long && view.macd <= view.macd_signal {
        Signal::LongExit
    } else if !is_long && view.macd >= view.macd_signal {
        Signal::ShortExit
    } else {
        Signal::None
    }
}

/// Entry evaluation when `held` is `None`, otherwise exit evaluation for
/// the held direction (`Some(true)` = long).
pub fn evaluate(asset: &TrackedAsset, held: Option<bool>, config: &SignalConfig) -> Signal {
    let rsi = asset.rsi_window.to_vec();
    let trend = asset.trend_window.to_vec();
    let view = IndicatorView {
        macd: asset.macd,
        macd_signal: asset.macd_signal,
        rsi_window: &rsi,
        trend_window: &trend,
    };
    match held {
        None => evaluate_entry(&view, config),
        Some(is_long) => evaluate_exit(&view, is_long),
    }
}
