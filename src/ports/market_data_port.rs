//! Market data port trait.

use crate::domain::bar::DailyBar;
use crate::domain::corporate_action::CorporateAction;
use crate::domain::error::SwingtraderError;
use chrono::NaiveDate;

pub trait MarketDataPort {
    /// Daily bars for `symbol` in `[start, end]`, oldest first. Fails with
    /// `NoData` when the source has nothing for the symbol.
    fn get_daily_bars(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyBar>, SwingtraderError>;

    /// Symbols that are active and tradable.
    fn list_tradable_symbols(&self) -> Result<Vec<String>, SwingtraderError>;

    /// Corporate actions announced with ex-dates in `[start, end]`.
    fn get_corporate_actions(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<CorporateAction>, SwingtraderError>;

    /// Trading sessions on or after `start`, up to `end`. A lookup for a single
    /// non-session day returns the next session.
    fn get_trading_calendar(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<NaiveDate>, SwingtraderError>;
}
