//! Paper-trading replay over stored daily records.
//!
//! Records from every symbol are replayed in date order against a paper
//! portfolio: a fixed cash amount per long entry, a stop at
//! `-stop_loss_percent`, the target latch at `+target_percent`, and an exit
//! on MACD reversal once the target is met.

use chrono::NaiveDate;
use std::collections::BTreeMap;

use crate::domain::signal::{self, IndicatorView, Signal, SignalConfig};
use crate::domain::sizing;
use crate::domain::tracked_asset::TrackedAsset;

pub const DEFAULT_STARTING_FUNDS: f64 = 10_000.0;
pub const DEFAULT_BUY_AMOUNT: f64 = 1_000.0;

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    pub starting_funds: f64,
    pub buy_amount: f64,
    pub stop_loss_percent: f64,
    pub target_percent: f64,
    pub signal: SignalConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            starting_funds: DEFAULT_STARTING_FUNDS,
            buy_amount: DEFAULT_BUY_AMOUNT,
            stop_loss_percent: sizing::DEFAULT_STOP_LOSS_PERCENT,
            target_percent: sizing::DEFAULT_TARGET_PERCENT,
            signal: SignalConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    StopLoss,
    TargetExit,
    /// Still open at the end of the replay, marked at its last close.
    OpenAtEnd,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimulatedTrade {
    pub symbol: String,
    pub quantity: u64,
    pub entry_date: NaiveDate,
    pub entry_price: f64,
    pub exit_date: NaiveDate,
    pub exit_price: f64,
    pub reason: ExitReason,
}

impl SimulatedTrade {
    pub fn pnl(&self) -> f64 {
        self.quantity as f64 * (self.exit_price - self.entry_price)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationReport {
    pub starting_funds: f64,
    pub final_funds: f64,
    pub trades: Vec<SimulatedTrade>,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    /// Entry signals skipped for lack of funds or a price above the buy amount.
    pub skipped_entries: usize,
}

impl SimulationReport {
    pub fn roi_percent(&self) -> f64 {
        if self.starting_funds == 0.0 {
            return 0.0;
        }
        (self.final_funds - self.starting_funds) / self.starting_funds * 100.0
    }

    pub fn days_covered(&self) -> i64 {
        match (self.first_date, self.last_date) {
            (Some(first), Some(last)) => (last - first).num_days(),
            _ => 0,
        }
    }
}

struct PaperPosition {
    quantity: u64,
    entry_date: NaiveDate,
    entry_price: f64,
    target_met: bool,
}

fn view(record: &TrackedAsset) -> (Vec<f64>, Vec<bool>) {
    (record.rsi_window.to_vec(), record.trend_window.to_vec())
}

/// Replay `records` (any order, any mix of symbols) and report the result.
pub fn simulate(mut records: Vec<TrackedAsset>, config: &SimulationConfig) -> SimulationReport {
    records.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.symbol.cmp(&b.symbol)));

    let mut funds = config.starting_funds;
    let mut open: BTreeMap<String, PaperPosition> = BTreeMap::new();
    let mut last_seen: BTreeMap<String, (NaiveDate, f64)> = BTreeMap::new();
    let mut trades = Vec::new();
    let mut skipped_entries = 0;

    for record in &records {
        last_seen.insert(record.symbol.clone(), (record.date, record.close));

        if let Some(position) = open.get_mut(&record.symbol) {
            let stop = sizing::stop_level(position.entry_price, config.stop_loss_percent, true);
            let exit = if record.close <= stop {
                Some(ExitReason::StopLoss)
            } else {
                if sizing::target_reached(position.entry_price, record.close, config.target_percent, true) {
                    position.target_met = true;
                }
                (position.target_met && record.macd <= record.macd_signal)
                    .then_some(ExitReason::TargetExit)
            };

            if let Some(reason) = exit {
                if let Some(position) = open.remove(&record.symbol) {
                    funds += position.quantity as f64 * record.close;
                    trades.push(SimulatedTrade {
                        symbol: record.symbol.clone(),
                        quantity: position.quantity,
                        entry_date: position.entry_date,
                        entry_price: position.entry_price,
                        exit_date: record.date,
                        exit_price: record.close,
                        reason,
                    });
                }
            }
            continue;
        }

        let (rsi, trend) = view(record);
        let indicators = IndicatorView {
            macd: record.macd,
            macd_signal: record.macd_signal,
            rsi_window: &rsi,
            trend_window: &trend,
        };
        if signal::evaluate_entry(&indicators, &config.signal) != Signal::LongEntry {
            continue;
        }
        if record.close > config.buy_amount || funds < config.buy_amount {
            skipped_entries += 1;
            continue;
        }
        let Some(quantity) = sizing::entry_quantity(config.buy_amount, record.close) else {
            skipped_entries += 1;
            continue;
        };
        funds -= quantity as f64 * record.close;
        open.insert(
            record.symbol.clone(),
            PaperPosition {
                quantity,
                entry_date: record.date,
                entry_price: record.close,
                target_met: false,
            },
        );
    }

    for (symbol, position) in open {
        let Some(&(date, close)) = last_seen.get(&symbol) else {
            continue;
        };
        funds += position.quantity as f64 * close;
        trades.push(SimulatedTrade {
            symbol,
            quantity: position.quantity,
            entry_date: position.entry_date,
            entry_price: position.entry_price,
            exit_date: date,
            exit_price: close,
            reason: ExitReason::OpenAtEnd,
        });
    }

    SimulationReport {
        starting_funds: config.starting_funds,
        final_funds: funds,
        trades,
        first_date: records.first().map(|r| r.date),
        last_date: records.last().map(|r| r.date),
        skipped_entries,
    }
}
