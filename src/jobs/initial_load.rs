//! Initial load: seed every admissible symbol from its bar history.

use super::context::JobContext;
use crate::domain::admission::{candidate_symbols, SkipReason, SkippedSymbol};
use crate::domain::corporate_action::{
    adjust_for_split, announcement_chunks, index_by_symbol, ActionOutcome, CorporateAction,
};
use crate::domain::error::SwingtraderError;
use crate::domain::market::{previous_day, subtract_business_days, MarketStatus};
use crate::domain::tracked_asset::{self, Seeded, TrackedAsset};
use chrono::{Datelike, NaiveDate};

/// Extra business days fetched beyond `history_points` to cover holidays.
const LOOKBACK_SLACK_DAYS: u32 = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct LoadReport {
    /// Date every seeded record now ends on.
    pub latest_date: NaiveDate,
    pub seeded: Vec<String>,
    pub skipped: Vec<SkippedSymbol>,
    /// Symbols left untouched because they already had records.
    pub already_tracked: usize,
}

pub(crate) enum SeedOutcome {
    Seeded(Seeded),
    Skipped(SkipReason),
}

/// First day of the seeding fetch window for a load as of `as_of`.
pub fn lookback_start(ctx: &JobContext<'_>, as_of: NaiveDate) -> NaiveDate {
    let days = u32::try_from(ctx.config.universe.history_points)
        .unwrap_or(u32::MAX)
        .saturating_add(LOOKBACK_SLACK_DAYS);
    subtract_business_days(as_of, days)
}

/// Fetch, adjust and seed one symbol. Admission failures and unusable
/// announcements come back as a skip; anything else is an error.
pub(crate) fn seed_symbol(
    ctx: &JobContext<'_>,
    symbol: &str,
    start: NaiveDate,
    end: NaiveDate,
    action: Option<&CorporateAction>,
) -> Result<SeedOutcome, SwingtraderError> {
    let mut split = None;
    if let Some(action) = action {
        match action.outcome() {
            ActionOutcome::Drop => return Ok(SeedOutcome::Skipped(SkipReason::Merger)),
            ActionOutcome::Unsupported => {
                ctx.notify(&format!(
                    "Spin-off announced for {symbol}; not tracking it"
                ));
                return Ok(SeedOutcome::Skipped(SkipReason::Spinoff));
            }
            ActionOutcome::MissingExDate => {
                tracing::warn!(symbol = %symbol, "split announced without ex-date");
                return Ok(SeedOutcome::Skipped(SkipReason::SplitWithoutExDate));
            }
            ActionOutcome::Adjust { ex_date, ratio } => split = Some((ex_date, ratio)),
        }
    }

    let mut bars = match ctx.market_data.get_daily_bars(symbol, start, end) {
        Ok(bars) => bars,
        Err(SwingtraderError::NoData { .. }) => {
            return Ok(SeedOutcome::Skipped(SkipReason::NoData));
        }
        Err(e) => return Err(e),
    };
    if let Some((ex_date, ratio)) = split {
        tracing::info!(symbol = %symbol, %ex_date, ratio, "adjusting history for split");
        adjust_for_split(&mut bars, ex_date, ratio);
    }

    match tracked_asset::seed(
        symbol,
        &bars,
        &ctx.config.indicators,
        ctx.config.universe.min_average_volume,
    ) {
        Ok(seeded) => Ok(SeedOutcome::Seeded(seeded)),
        Err(e) => match SkipReason::from_error(&e) {
            Some(reason) => Ok(SeedOutcome::Skipped(reason)),
            None => Err(e),
        },
    }
}

/// A seeded series must end on `latest_date` to be stored.
pub(crate) fn stale_history(seeded: &Seeded, latest_date: NaiveDate) -> Option<SkipReason> {
    (seeded.current.date != latest_date).then_some(SkipReason::StaleHistory {
        last: seeded.current.date,
    })
}

/// Insert a seeded series if it ends on `latest_date`.
pub(crate) fn store_seeded(
    ctx: &JobContext<'_>,
    seeded: &Seeded,
    latest_date: NaiveDate,
) -> Result<Option<SkipReason>, SwingtraderError> {
    if let Some(reason) = stale_history(seeded, latest_date) {
        return Ok(Some(reason));
    }
    let records: Vec<TrackedAsset> = seeded.records().cloned().collect();
    ctx.store.insert_records(&records)?;
    Ok(None)
}

/// Seed every candidate symbol with history through the last session
/// before `as_of`, then record that session as the market's latest date.
///
/// Symbols that already have records are left alone, so an interrupted
/// load can simply be run again.
pub fn initial_load(
    ctx: &JobContext<'_>,
    as_of: NaiveDate,
) -> Result<LoadReport, SwingtraderError> {
    let start = lookback_start(ctx, as_of);
    let end = previous_day(as_of);

    let latest_date = ctx
        .market_data
        .get_trading_calendar(start, end)?
        .into_iter()
        .filter(|d| *d < as_of)
        .max()
        .ok_or_else(|| SwingtraderError::DataSource {
            reason: format!("no trading session between {start} and {end}"),
        })?;

    let existing = ctx.store.load_market_status()?;
    if let Some(status) = &existing {
        if status.latest_date != latest_date {
            return Err(SwingtraderError::DateSkew {
                symbol: "market".to_string(),
                expected: latest_date,
                found: Some(status.latest_date),
            });
        }
    }

    let tradable = ctx.market_data.list_tradable_symbols()?;
    let symbols = candidate_symbols(&tradable, &ctx.config.universe.excluded);

    let mut announcements = Vec::new();
    for (chunk_start, chunk_end) in announcement_chunks(start, as_of) {
        announcements.extend(ctx.market_data.get_corporate_actions(chunk_start, chunk_end)?);
        ctx.pacer.pause();
    }
    let actions = index_by_symbol(announcements);

    tracing::info!(
        candidates = symbols.len(),
        announcements = actions.len(),
        %start,
        %latest_date,
        "seeding universe"
    );

    let mut report = LoadReport {
        latest_date,
        seeded: Vec::new(),
        skipped: Vec::new(),
        already_tracked: 0,
    };

    for symbol in symbols {
        if ctx.store.latest_asset_state(&symbol)?.is_some() {
            report.already_tracked += 1;
            continue;
        }

        let outcome = seed_symbol(ctx, &symbol, start, end, actions.get(&symbol))?;
        ctx.pacer.pause();

        let skip = match outcome {
            SeedOutcome::Skipped(reason) => Some(reason),
            SeedOutcome::Seeded(seeded) => store_seeded(ctx, &seeded, latest_date)?,
        };
        match skip {
            Some(reason) => {
                tracing::info!(symbol = %symbol, reason = ?reason, "symbol skipped");
                report.skipped.push(SkippedSymbol { symbol, reason });
            }
            None => {
                tracing::debug!(symbol = %symbol, "symbol seeded");
                report.seeded.push(symbol);
            }
        }
    }

    let status = MarketStatus {
        day_of_month: as_of.day(),
        market_is_open: existing.map(|s| s.market_is_open).unwrap_or(false),
        latest_date,
    };
    ctx.store.save_market_status(&status)?;

    tracing::info!(
        seeded = report.seeded.len(),
        skipped = report.skipped.len(),
        already_tracked = report.already_tracked,
        "initial load complete"
    );
    Ok(report)
}
