//! Daily invocations over a [`JobContext`].
//!
//! Each job runs to completion or fails fast; a failed job is retried
//! wholesale by the next scheduled run. Wrap a job in [`run_job`] to get
//! the single abort notification.

pub mod check_market;
pub mod context;
pub mod initial_load;
pub mod maintenance;
pub mod manage_trades;
pub mod place_stops;
pub mod update_indicators;

use crate::domain::error::SwingtraderError;
use crate::domain::market::MarketStatus;
use context::JobContext;

/// Run `job`, sending exactly one notification if it aborts.
pub fn run_job<T, F>(ctx: &JobContext<'_>, name: &str, job: F) -> Result<T, SwingtraderError>
where
    F: FnOnce(&JobContext<'_>) -> Result<T, SwingtraderError>,
{
    tracing::info!(job = name, "job started");
    match job(ctx) {
        Ok(value) => {
            tracing::info!(job = name, "job finished");
            Ok(value)
        }
        Err(e) => {
            tracing::error!(job = name, kind = ?e.kind(), error = %e, "job aborted");
            ctx.notify(&format!("{name} aborted: {e}"));
            Err(e)
        }
    }
}

/// The stored market status, which only exists once seeding has run.
pub(crate) fn require_market_status(
    ctx: &JobContext<'_>,
) -> Result<MarketStatus, SwingtraderError> {
    ctx.store
        .load_market_status()?
        .ok_or_else(|| SwingtraderError::InvariantViolation {
            reason: "market status missing; run the initial load first".to_string(),
        })
}
