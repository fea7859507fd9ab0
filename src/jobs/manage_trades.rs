//! Trade management: reconcile, exit, then enter.

use super::context::JobContext;
use super::require_market_status;
use crate::domain::error::SwingtraderError;
use crate::domain::lifecycle::{
    plan_entries, reconcile, review_position, EntryCandidate, EntryRejection, ExclusionList,
};
use crate::domain::position::{HeldPosition, HeldPositions};
use crate::domain::signal::{evaluate, Signal};
use crate::domain::tracked_asset::TrackedAsset;
use crate::ports::broker_port::{BrokerPort, BrokerPosition};
use chrono::NaiveDate;
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TradeReport {
    pub market_open: bool,
    /// Held locally but gone at the broker, most likely stopped out.
    pub externally_closed: Vec<String>,
    pub targets_reached: Vec<String>,
    pub exited: Vec<String>,
    pub long_entries: Vec<String>,
    pub short_entries: Vec<String>,
    pub rejected: Vec<(String, EntryRejection)>,
}

/// Cancel the symbol's single standing order, wait for it to clear, then
/// market-close the position.
fn exit_position(
    ctx: &JobContext<'_>,
    broker: &dyn BrokerPort,
    symbol: &str,
) -> Result<(), SwingtraderError> {
    let orders: Vec<_> = broker
        .get_open_orders()?
        .into_iter()
        .filter(|o| o.symbol == symbol)
        .collect();
    ctx.pacer.pause();

    let [order] = orders.as_slice() else {
        return Err(SwingtraderError::UnexpectedOpenOrders {
            symbol: symbol.to_string(),
            count: orders.len(),
        });
    };

    ctx.notify(&format!(
        "Exit signal for {symbol}. Cancelling stop loss order then exiting position."
    ));
    broker.cancel_order(&order.id)?;
    ctx.pacer.settle();
    broker.close_position(symbol)?;
    ctx.pacer.pause();
    Ok(())
}

fn review_held(
    ctx: &JobContext<'_>,
    broker: &dyn BrokerPort,
    held: &mut HeldPositions,
    broker_positions: &[BrokerPosition],
    latest_date: NaiveDate,
    exclusions: &mut ExclusionList,
    report: &mut TradeReport,
) -> Result<(), SwingtraderError> {
    let target_percent = ctx.config.trading.target_percent;

    for broker_position in broker_positions {
        let symbol = broker_position.symbol.as_str();
        let asset = ctx
            .store
            .load_asset_state(symbol, latest_date)?
            .ok_or_else(|| SwingtraderError::DateSkew {
                symbol: symbol.to_string(),
                expected: latest_date,
                found: None,
            })?;
        asset.check_window_capacity(&ctx.config.indicators)?;
        let position = held
            .get_mut(symbol)
            .ok_or_else(|| SwingtraderError::InvariantViolation {
                reason: format!("broker holds {symbol} but it is not tracked"),
            })?;

        let review = review_position(
            position,
            &asset,
            broker_position.avg_entry_price,
            target_percent,
        )?;
        let is_long = position.is_long;

        if review.target_reached {
            ctx.notify(&format!(
                "Target reached for {} {symbol}: close {:.2}",
                if is_long { "long" } else { "short" },
                asset.close
            ));
            report.targets_reached.push(symbol.to_string());
            ctx.store.save_held_positions(held)?;
        }

        if review.exit {
            exit_position(ctx, broker, symbol)?;
            held.remove(symbol);
            ctx.store.save_held_positions(held)?;
            exclusions.add(symbol);
            report.exited.push(symbol.to_string());
            tracing::info!(symbol = %symbol, is_long, "position exited");
        }
    }
    Ok(())
}

/// Entry candidates among the latest records for one direction.
fn entry_candidates(
    ctx: &JobContext<'_>,
    records: &[TrackedAsset],
    wanted: Signal,
    skip: impl Fn(&str) -> bool,
) -> Vec<EntryCandidate> {
    records
        .iter()
        .filter(|asset| !skip(&asset.symbol))
        .filter(|asset| evaluate(asset, None, &ctx.config.trading.signal) == wanted)
        .map(|asset| EntryCandidate {
            symbol: asset.symbol.clone(),
            close: asset.close,
        })
        .collect()
}

fn enter(
    ctx: &JobContext<'_>,
    broker: &dyn BrokerPort,
    held: &mut HeldPositions,
    candidates: Vec<EntryCandidate>,
    is_long: bool,
    report: &mut TradeReport,
) -> Result<(), SwingtraderError> {
    if candidates.is_empty() {
        return Ok(());
    }

    let account = broker.get_account()?;
    ctx.pacer.pause();

    let plan = plan_entries(
        candidates,
        is_long,
        account.cash,
        ctx.config.trading.max_positions,
        held.len(),
        |symbol| {
            if is_long {
                return Ok(true);
            }
            let asset = broker.get_asset(symbol)?;
            ctx.pacer.pause();
            Ok(asset.shortable && asset.easy_to_borrow)
        },
    )?;

    for order in &plan.orders {
        let order_id = broker.submit_order(order)?;
        ctx.pacer.pause();
        held.insert(HeldPosition::pending(&order.symbol, &order_id, is_long));
        ctx.store.save_held_positions(held)?;
        tracing::info!(
            symbol = %order.symbol,
            quantity = order.quantity,
            side = order.side.as_str(),
            "entry submitted"
        );
        if is_long {
            report.long_entries.push(order.symbol.clone());
        } else {
            report.short_entries.push(order.symbol.clone());
        }
    }

    if !plan.orders.is_empty() {
        let symbols: Vec<&str> = plan.orders.iter().map(|o| o.symbol.as_str()).collect();
        ctx.notify(&format!(
            "{} signal: {:?}. Allocation per position: {:.2}",
            if is_long { "Buy" } else { "Short" },
            symbols,
            plan.allocation
        ));
    }
    report.rejected.extend(plan.rejected);
    Ok(())
}

/// Reconcile held positions with the broker, exit positions whose target
/// is met and whose momentum reversed, then open new positions into the
/// free slots: longs first, shorts when enabled.
pub fn manage_trades(
    ctx: &JobContext<'_>,
    today: NaiveDate,
) -> Result<TradeReport, SwingtraderError> {
    let status = require_market_status(ctx)?;
    status.ensure_synced(today)?;

    let mut report = TradeReport {
        market_open: status.market_is_open,
        ..TradeReport::default()
    };
    if !status.market_is_open {
        tracing::info!(%today, "market closed; no trading");
        return Ok(report);
    }

    let broker = ctx.broker()?;
    let mut broker_positions = broker.get_open_positions()?;
    broker_positions.sort_by(|a, b| a.symbol.cmp(&b.symbol));
    ctx.pacer.pause();

    let mut held = ctx.store.load_held_positions()?;
    let mut exclusions = ExclusionList::new();
    let broker_symbols: BTreeSet<String> =
        broker_positions.iter().map(|p| p.symbol.clone()).collect();

    report.externally_closed = reconcile(&mut held, &broker_symbols, &mut exclusions);
    if !report.externally_closed.is_empty() {
        ctx.notify(&format!(
            "Stop loss detected for: {:?}. Removing from tracked positions.",
            report.externally_closed
        ));
        ctx.store.save_held_positions(&held)?;
    }

    review_held(
        ctx,
        broker,
        &mut held,
        &broker_positions,
        status.latest_date,
        &mut exclusions,
        &mut report,
    )?;

    let max_positions = ctx.config.trading.max_positions;
    if held.len() >= max_positions {
        tracing::info!(held = held.len(), "no free slots");
        return Ok(report);
    }

    let records = ctx.store.records_on(status.latest_date)?;
    for record in &records {
        record.check_window_capacity(&ctx.config.indicators)?;
    }
    let skip = |symbol: &str| {
        exclusions.contains(symbol) || broker_symbols.contains(symbol)
    };

    let longs = entry_candidates(ctx, &records, Signal::LongEntry, |s| {
        skip(s) || held.contains(s)
    });
    enter(ctx, broker, &mut held, longs, true, &mut report)?;

    if ctx.config.trading.allow_shorting && held.len() < max_positions {
        let shorts = entry_candidates(ctx, &records, Signal::ShortEntry, |s| {
            skip(s) || held.contains(s)
        });
        enter(ctx, broker, &mut held, shorts, false, &mut report)?;
    }

    tracing::info!(
        held = held.len(),
        exited = report.exited.len(),
        long_entries = report.long_entries.len(),
        short_entries = report.short_entries.len(),
        "trade management complete"
    );
    Ok(report)
}
