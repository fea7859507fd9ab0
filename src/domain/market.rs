//! Market session status shared by every job, and business-day arithmetic.

use chrono::{Datelike, Duration, NaiveDate, Weekday};

use crate::domain::error::SwingtraderError;

#[derive(Debug, Clone, PartialEq)]
pub struct MarketStatus {
    /// Day of month of the last market check.
    pub day_of_month: u32,
    pub market_is_open: bool,
    /// Date every tracked record should currently reflect.
    pub latest_date: NaiveDate,
}

impl MarketStatus {
    /// The last market check must have run on `expected`.
    pub fn ensure_synced(&self, expected: NaiveDate) -> Result<(), SwingtraderError> {
        if self.day_of_month != expected.day() {
            return Err(SwingtraderError::MarketOutOfSync {
                stored_day: self.day_of_month,
                expected_day: expected.day(),
            });
        }
        Ok(())
    }
}

/// Whether `today` is a session, given the calendar lookup for exactly
/// that day. The lookup must return a single entry.
pub fn session_today(sessions: &[NaiveDate], today: NaiveDate) -> Result<bool, SwingtraderError> {
    match sessions {
        [session] => Ok(*session == today),
        _ => Err(SwingtraderError::DataSource {
            reason: format!(
                "unexpected number of trading days returned for {today}: {}",
                sessions.len()
            ),
        }),
    }
}

pub fn is_business_day(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Step back `count` weekdays from `date`.
pub fn subtract_business_days(date: NaiveDate, count: u32) -> NaiveDate {
    let mut current = date;
    let mut remaining = count;
    while remaining > 0 {
        current -= Duration::days(1);
        if is_business_day(current) {
            remaining -= 1;
        }
    }
    current
}

pub fn previous_day(date: NaiveDate) -> NaiveDate {
    date - Duration::days(1)
}
