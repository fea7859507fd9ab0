//! Daily price bar as delivered by a market data source.

use chrono::NaiveDate;
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DailyBar {
    pub date: NaiveDate,
    pub close: f64,
    pub volume: u64,
}

impl DailyBar {
    pub fn new(date: NaiveDate, close: f64, volume: u64) -> Self {
        Self { date, close, volume }
    }
}

/// Mean traded volume over the series, or 0.0 for an empty series.
pub fn average_volume(bars: &[DailyBar]) -> f64 {
    if bars.is_empty() {
        return 0.0;
    }
    bars.iter().map(|b| b.volume as f64).sum::<f64>() / bars.len() as f64
}

pub fn closes(bars: &[DailyBar]) -> Vec<f64> {
    bars.iter().map(|b| b.close).collect()
}
