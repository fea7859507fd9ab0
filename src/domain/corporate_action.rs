//! Corporate-action handling for tracked and to-be-seeded symbols.
//!
//! Splits rescale every close strictly before the ex-date by
//! `old_rate / new_rate`; the symbol is then re-seeded from the corrected
//! series. Mergers drop the symbol. Spin-offs are not supported.

use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use crate::domain::bar::DailyBar;

/// Announcements are collected in chunks of this many days.
pub const ANNOUNCEMENT_CHUNK_DAYS: i64 = 90;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CorporateActionKind {
    Split,
    Merger,
    Spinoff,
}

impl CorporateActionKind {
    fn precedence(self) -> u8 {
        match self {
            CorporateActionKind::Split => 0,
            CorporateActionKind::Merger => 1,
            CorporateActionKind::Spinoff => 2,
        }
    }
}

impl std::fmt::Display for CorporateActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            CorporateActionKind::Split => "split",
            CorporateActionKind::Merger => "merger",
            CorporateActionKind::Spinoff => "spin-off",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CorporateAction {
    pub symbol: String,
    pub kind: CorporateActionKind,
    pub old_rate: f64,
    pub new_rate: f64,
    pub ex_date: Option<NaiveDate>,
}

/// What to do with a symbol that has an announcement.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionOutcome {
    Adjust { ex_date: NaiveDate, ratio: f64 },
    Drop,
    Unsupported,
    MissingExDate,
}

impl CorporateAction {
    pub fn outcome(&self) -> ActionOutcome {
        match self.kind {
            CorporateActionKind::Merger => ActionOutcome::Drop,
            CorporateActionKind::Spinoff => ActionOutcome::Unsupported,
            CorporateActionKind::Split => match self.ex_date {
                Some(ex_date) => ActionOutcome::Adjust {
                    ex_date,
                    ratio: self.old_rate / self.new_rate,
                },
                None => ActionOutcome::MissingExDate,
            },
        }
    }
}

/// Rescale closes dated strictly before `ex_date`. Bars must be in date order.
pub fn adjust_for_split(bars: &mut [DailyBar], ex_date: NaiveDate, ratio: f64) {
    for bar in bars.iter_mut().take_while(|b| b.date < ex_date) {
        bar.close *= ratio;
    }
}

/// The governing announcement per symbol. A spin-off outranks a merger,
/// which outranks a split; among equals the first one wins.
pub fn index_by_symbol(actions: Vec<CorporateAction>) -> BTreeMap<String, CorporateAction> {
    let mut result: BTreeMap<String, CorporateAction> = BTreeMap::new();
    for action in actions {
        match result.entry(action.symbol.clone()) {
            Entry::Vacant(slot) => {
                slot.insert(action);
            }
            Entry::Occupied(mut slot) => {
                if action.kind.precedence() > slot.get().kind.precedence() {
                    slot.insert(action);
                }
            }
        }
    }
    result
}

/// Split `[start, end)` into consecutive spans of at most
/// [`ANNOUNCEMENT_CHUNK_DAYS`].
pub fn announcement_chunks(start: NaiveDate, end: NaiveDate) -> Vec<(NaiveDate, NaiveDate)> {
    let mut chunks = Vec::new();
    let mut current = start;
    while current < end {
        let next = (current + chrono::Duration::days(ANNOUNCEMENT_CHUNK_DAYS)).min(end);
        chunks.push((current, next));
        current = next;
    }
    chunks
}
