//! After-close update: advance every tracked symbol by yesterday's bar.

use super::context::JobContext;
use super::initial_load::{lookback_start, seed_symbol, stale_history, SeedOutcome};
use super::require_market_status;
use crate::domain::corporate_action::{index_by_symbol, ActionOutcome, CorporateAction};
use crate::domain::error::SwingtraderError;
use crate::domain::market::previous_day;
use crate::domain::tracked_asset::TrackedAsset;
use chrono::{Duration, NaiveDate};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct UpdateReport {
    /// The day whose bar was applied.
    pub target_date: Option<NaiveDate>,
    pub market_was_open: bool,
    pub advanced: Vec<String>,
    /// Already at the target date from an earlier partial run.
    pub resumed: Vec<String>,
    pub reseeded: Vec<String>,
    pub dropped: Vec<String>,
}

/// Split and merger announcements effective in `(after, through]`. A
/// spin-off on a tracked symbol aborts before anything is changed.
fn effective_actions(
    ctx: &JobContext<'_>,
    tracked: &[String],
    after: NaiveDate,
    through: NaiveDate,
) -> Result<BTreeMap<String, CorporateAction>, SwingtraderError> {
    let announced = ctx
        .market_data
        .get_corporate_actions(after + Duration::days(1), through)?;
    ctx.pacer.pause();

    let mut actions = index_by_symbol(announced);
    actions.retain(|symbol, _| tracked.binary_search(symbol).is_ok());

    for (symbol, action) in &actions {
        if action.outcome() == ActionOutcome::Unsupported {
            return Err(SwingtraderError::UnsupportedCorporateAction {
                symbol: symbol.clone(),
                action: action.kind.to_string(),
            });
        }
    }
    actions.retain(|symbol, action| match action.outcome() {
        ActionOutcome::MissingExDate => {
            tracing::warn!(symbol = %symbol, "split announced without ex-date; ignored");
            false
        }
        _ => true,
    });
    Ok(actions)
}

/// Apply yesterday's bar to every tracked symbol.
///
/// Requires the market check to have run yesterday. Nothing happens when
/// the market was closed. A symbol must sit exactly at the stored latest
/// date (or already at the target, from an interrupted run) and receive
/// exactly one bar dated the target day. Each symbol is persisted as soon
/// as it advances.
pub fn update_indicators(
    ctx: &JobContext<'_>,
    today: NaiveDate,
) -> Result<UpdateReport, SwingtraderError> {
    let target = previous_day(today);
    let mut status = require_market_status(ctx)?;
    status.ensure_synced(target)?;

    let mut report = UpdateReport {
        target_date: Some(target),
        market_was_open: status.market_is_open,
        ..UpdateReport::default()
    };
    if !status.market_is_open {
        tracing::info!(%target, "market was closed; nothing to update");
        return Ok(report);
    }

    let latest = status.latest_date;
    if latest >= target {
        tracing::info!(%latest, %target, "records already up to date");
        return Ok(report);
    }

    let mut tracked = ctx.store.tracked_symbols()?;
    tracked.sort();
    let actions = effective_actions(ctx, &tracked, latest, target)?;
    let params = &ctx.config.indicators;

    for symbol in &tracked {
        let current = ctx.store.latest_asset_state(symbol)?.ok_or_else(|| {
            SwingtraderError::DateSkew {
                symbol: symbol.clone(),
                expected: latest,
                found: None,
            }
        })?;

        if current.date == target {
            tracing::debug!(symbol = %symbol, "already advanced");
            report.resumed.push(symbol.clone());
            continue;
        }
        if current.date != latest {
            return Err(SwingtraderError::DateSkew {
                symbol: symbol.clone(),
                expected: latest,
                found: Some(current.date),
            });
        }

        if let Some(action) = actions.get(symbol) {
            if action.outcome() == ActionOutcome::Drop {
                ctx.store.drop_symbol(symbol)?;
                tracing::info!(symbol = %symbol, "merger announced; symbol dropped");
                report.dropped.push(symbol.clone());
                continue;
            }

            // Stored records stay untouched until the adjusted series is ready.
            let start = lookback_start(ctx, today);
            let outcome = seed_symbol(ctx, symbol, start, target, Some(action))?;
            ctx.pacer.pause();
            let skip = match outcome {
                SeedOutcome::Seeded(seeded) => match stale_history(&seeded, target) {
                    Some(reason) => Some(reason),
                    None => {
                        let records: Vec<TrackedAsset> = seeded.records().cloned().collect();
                        ctx.store.replace_symbol(symbol, &records)?;
                        None
                    }
                },
                SeedOutcome::Skipped(reason) => Some(reason),
            };
            match skip {
                None => {
                    tracing::info!(symbol = %symbol, "re-seeded after split");
                    report.reseeded.push(symbol.clone());
                }
                Some(reason) => {
                    ctx.store.drop_symbol(symbol)?;
                    tracing::warn!(symbol = %symbol, reason = ?reason, "could not re-seed after split; dropped");
                    report.dropped.push(symbol.clone());
                }
            }
            continue;
        }

        current.check_window_capacity(params)?;
        let bars = ctx.market_data.get_daily_bars(symbol, target, target)?;
        ctx.pacer.pause();
        let [bar] = bars.as_slice() else {
            return Err(SwingtraderError::UnexpectedBarCount {
                symbol: symbol.clone(),
                count: bars.len(),
            });
        };
        if bar.date != target {
            return Err(SwingtraderError::UnexpectedBarDate {
                symbol: symbol.clone(),
                expected: target,
                found: bar.date,
            });
        }

        let next = current.advance(bar.close, bar.date, params)?;
        ctx.store.append_record(&next, current.date)?;
        tracing::debug!(symbol = %symbol, close = bar.close, "advanced");
        report.advanced.push(symbol.clone());
    }

    status.latest_date = target;
    ctx.store.save_market_status(&status)?;

    tracing::info!(
        %target,
        advanced = report.advanced.len(),
        resumed = report.resumed.len(),
        reseeded = report.reseeded.len(),
        dropped = report.dropped.len(),
        "indicator update complete"
    );
    Ok(report)
}
