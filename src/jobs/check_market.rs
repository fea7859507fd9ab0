//! Morning check: is today a trading session?

use super::context::JobContext;
use super::require_market_status;
use crate::domain::error::SwingtraderError;
use crate::domain::market::{session_today, MarketStatus};
use chrono::{Datelike, NaiveDate};

/// Record whether `today` is a session and stamp the status with today's
/// day of month. `latest_date` is left alone.
pub fn check_market(
    ctx: &JobContext<'_>,
    today: NaiveDate,
) -> Result<MarketStatus, SwingtraderError> {
    let sessions = ctx.market_data.get_trading_calendar(today, today)?;
    let market_is_open = session_today(&sessions, today)?;

    let mut status = require_market_status(ctx)?;
    status.day_of_month = today.day();
    status.market_is_open = market_is_open;
    ctx.store.save_market_status(&status)?;

    tracing::info!(%today, market_is_open, "market status updated");
    Ok(status)
}
