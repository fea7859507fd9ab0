//! Universe admission: which symbols are tracked at all.
//!
//! A symbol enters the universe when it is tradable, not on the exclusion
//! list, and its seeding history is long and liquid enough.

use crate::domain::bar::{average_volume, DailyBar};
use crate::domain::error::{SwingtraderError, VolumeIssue};
use chrono::NaiveDate;
use std::collections::BTreeSet;

pub const DEFAULT_EXCLUDED: &str = "VXX,VIXY,UVXY";
pub const DEFAULT_MIN_AVERAGE_VOLUME: f64 = 20_000_000.0;

#[derive(Debug, Clone, thiserror::Error)]
pub enum SymbolListError {
    #[error("empty token in symbol list")]
    EmptyToken,

    #[error("duplicate symbol: {0}")]
    DuplicateSymbol(String),
}

/// Parse a comma-separated symbol list, uppercased. An empty input is an
/// empty list.
pub fn parse_symbols(input: &str) -> Result<Vec<String>, SymbolListError> {
    let mut symbols = Vec::new();
    let mut seen = BTreeSet::new();
    if input.trim().is_empty() {
        return Ok(symbols);
    }

    for token in input.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(SymbolListError::EmptyToken);
        }
        let symbol = trimmed.to_uppercase();
        if !seen.insert(symbol.clone()) {
            return Err(SymbolListError::DuplicateSymbol(symbol));
        }
        symbols.push(symbol);
    }

    Ok(symbols)
}

/// Tradable symbols minus the exclusion list, sorted and deduplicated.
pub fn candidate_symbols(tradable: &[String], excluded: &[String]) -> Vec<String> {
    let excluded: BTreeSet<&str> = excluded.iter().map(String::as_str).collect();
    tradable
        .iter()
        .filter(|s| !excluded.contains(s.as_str()))
        .cloned()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// History-length and liquidity checks, in that order.
pub fn check_bars(
    symbol: &str,
    bars: &[DailyBar],
    minimum: usize,
    liquidity_floor: f64,
) -> Result<(), SwingtraderError> {
    if bars.len() < minimum {
        return Err(SwingtraderError::InsufficientHistory {
            symbol: symbol.to_string(),
            bars: bars.len(),
            minimum,
        });
    }

    if let Some(bar) = bars.iter().find(|b| b.volume == 0) {
        return Err(SwingtraderError::SuspiciousVolume {
            symbol: symbol.to_string(),
            issue: VolumeIssue::ZeroVolumeBar { date: bar.date },
        });
    }

    let average = average_volume(bars);
    if average < liquidity_floor {
        return Err(SwingtraderError::SuspiciousVolume {
            symbol: symbol.to_string(),
            issue: VolumeIssue::BelowFloor {
                average,
                floor: liquidity_floor,
            },
        });
    }

    Ok(())
}

#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    NoData,
    InsufficientHistory { bars: usize },
    SuspiciousVolume(VolumeIssue),
    /// Last bar is older than the latest trading session.
    StaleHistory { last: NaiveDate },
    Merger,
    Spinoff,
    SplitWithoutExDate,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkippedSymbol {
    pub symbol: String,
    pub reason: SkipReason,
}

impl SkipReason {
    /// Skip reason for an admission error, or `None` if the error is not an
    /// admission rejection.
    pub fn from_error(err: &SwingtraderError) -> Option<SkipReason> {
        match err {
            SwingtraderError::InsufficientHistory { bars, .. } => {
                Some(SkipReason::InsufficientHistory { bars: *bars })
            }
            SwingtraderError::SuspiciousVolume { issue, .. } => {
                Some(SkipReason::SuspiciousVolume(issue.clone()))
            }
            SwingtraderError::NoData { .. } => Some(SkipReason::NoData),
            _ => None,
        }
    }
}
