//! Operator commands over the stored state.

use super::context::JobContext;
use super::require_market_status;
use crate::domain::error::SwingtraderError;
use crate::domain::signal::{evaluate, Signal};
use crate::domain::simulation::{simulate, SimulationReport};
use crate::domain::tracked_asset::TrackedAsset;
use chrono::NaiveDate;
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq)]
pub struct VerifyReport {
    pub latest_date: NaiveDate,
    pub tracked: usize,
    /// Tracked symbols with no record at `latest_date`.
    pub missing: Vec<String>,
}

impl VerifyReport {
    pub fn is_consistent(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Check that every tracked symbol has a record at the latest date.
pub fn verify_latest(ctx: &JobContext<'_>) -> Result<VerifyReport, SwingtraderError> {
    let status = require_market_status(ctx)?;
    let present: BTreeSet<String> = ctx
        .store
        .records_on(status.latest_date)?
        .into_iter()
        .map(|r| r.symbol)
        .collect();
    let tracked = ctx.store.tracked_symbols()?;
    let missing: Vec<String> = tracked
        .iter()
        .filter(|s| !present.contains(*s))
        .cloned()
        .collect();

    if !missing.is_empty() {
        tracing::warn!(latest_date = %status.latest_date, missing = missing.len(), "records missing at latest date");
    }
    Ok(VerifyReport {
        latest_date: status.latest_date,
        tracked: tracked.len(),
        missing,
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct RollbackReport {
    pub removed_date: NaiveDate,
    pub restored_date: NaiveDate,
    pub deleted: usize,
}

/// Delete every record at the latest date and step the market status back
/// to the previous stored date.
pub fn rollback_latest(ctx: &JobContext<'_>) -> Result<RollbackReport, SwingtraderError> {
    let mut status = require_market_status(ctx)?;
    let removed_date = status.latest_date;
    let restored_date = ctx
        .store
        .previous_record_date(removed_date)?
        .ok_or_else(|| SwingtraderError::InvariantViolation {
            reason: format!("no records before {removed_date} to roll back to"),
        })?;

    let deleted = ctx.store.delete_records_on(removed_date)?;
    status.latest_date = restored_date;
    ctx.store.save_market_status(&status)?;

    tracing::info!(%removed_date, %restored_date, deleted, "rolled back latest date");
    Ok(RollbackReport {
        removed_date,
        restored_date,
        deleted,
    })
}

/// Entry signals at the latest date, by symbol.
pub fn show_entries(ctx: &JobContext<'_>) -> Result<Vec<(String, Signal, f64)>, SwingtraderError> {
    let status = require_market_status(ctx)?;
    let signal = &ctx.config.trading.signal;
    let records = ctx.store.records_on(status.latest_date)?;
    for record in &records {
        record.check_window_capacity(&ctx.config.indicators)?;
    }
    Ok(records
        .into_iter()
        .filter_map(|asset| match evaluate(&asset, None, signal) {
            Signal::None => None,
            s => Some((asset.symbol, s, asset.close)),
        })
        .collect())
}

pub fn show_asset(
    ctx: &JobContext<'_>,
    symbol: &str,
) -> Result<Option<TrackedAsset>, SwingtraderError> {
    ctx.store.latest_asset_state(&symbol.to_uppercase())
}

/// Paper-trade the whole stored history.
pub fn run_simulation(ctx: &JobContext<'_>) -> Result<SimulationReport, SwingtraderError> {
    let records = ctx.store.all_records()?;
    tracing::info!(records = records.len(), "replaying stored history");
    Ok(simulate(records, &ctx.config.simulation))
}
