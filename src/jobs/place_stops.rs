//! Protective stops for entries whose fill is now confirmed.

use super::context::JobContext;
use super::require_market_status;
use crate::domain::error::SwingtraderError;
use crate::domain::lifecycle::plan_stop;
use crate::domain::position::PositionPhase;
use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct StopReport {
    pub market_open: bool,
    /// (symbol, stop order id)
    pub placed: Vec<(String, String)>,
}

/// Place a stop for every held position still awaiting one. The entry
/// order must be filled; anything else aborts the run.
pub fn place_stops(
    ctx: &JobContext<'_>,
    today: NaiveDate,
) -> Result<StopReport, SwingtraderError> {
    let status = require_market_status(ctx)?;
    status.ensure_synced(today)?;

    let mut report = StopReport {
        market_open: status.market_is_open,
        ..StopReport::default()
    };
    if !status.market_is_open {
        return Ok(report);
    }

    let broker = ctx.broker()?;
    let mut held = ctx.store.load_held_positions()?;
    let awaiting: Vec<String> = held
        .iter()
        .filter(|p| p.phase() == PositionPhase::AwaitingStop)
        .map(|p| p.symbol.clone())
        .collect();

    for symbol in awaiting {
        let Some(position) = held.get_mut(&symbol) else {
            continue;
        };
        let fill = broker.get_order(&position.order_id)?;
        ctx.pacer.pause();

        let stop = plan_stop(position, &fill, ctx.config.trading.stop_loss_percent)?;
        let stop_id = broker.submit_order(&stop)?;
        ctx.pacer.pause();

        position.stop_order_id = Some(stop_id.clone());
        ctx.store.save_held_positions(&held)?;

        tracing::info!(symbol = %symbol, stop_id = %stop_id, kind = ?stop.kind, "stop placed");
        ctx.notify(&format!("Found new order, placed stop loss: {symbol}"));
        report.placed.push((symbol, stop_id));
    }

    Ok(report)
}
