//! CSV directory market data adapter.
//!
//! Layout of the data directory:
//! - `{SYMBOL}.csv` with columns `date,close,volume` (extra columns ignored)
//! - `calendar.csv` (optional) with a `date` column listing trading sessions;
//!   without it every weekday is a session
//! - `corporate_actions.csv` (optional) with columns
//!   `symbol,kind,old_rate,new_rate,ex_date`

use crate::domain::bar::DailyBar;
use crate::domain::corporate_action::CorporateAction;
use crate::domain::error::SwingtraderError;
use crate::domain::market::is_business_day;
use crate::ports::market_data_port::MarketDataPort;
use chrono::{Duration, NaiveDate};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

const CALENDAR_FILE: &str = "calendar.csv";
const CORPORATE_ACTIONS_FILE: &str = "corporate_actions.csv";
/// How far past the requested range to look for the next session.
const NEXT_SESSION_LOOKAHEAD_DAYS: i64 = 10;

pub struct CsvAdapter {
    base_path: PathBuf,
}

#[derive(Debug, Deserialize)]
struct CalendarRow {
    date: NaiveDate,
}

fn read_rows<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<Vec<T>, SwingtraderError> {
    let mut rdr = csv::Reader::from_path(path).map_err(|e| SwingtraderError::DataSource {
        reason: format!("failed to read {}: {}", path.display(), e),
    })?;
    let mut rows = Vec::new();
    for result in rdr.deserialize() {
        let row: T = result.map_err(|e| SwingtraderError::DataSource {
            reason: format!("CSV parse error in {}: {}", path.display(), e),
        })?;
        rows.push(row);
    }
    Ok(rows)
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", symbol))
    }

    fn sessions(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<NaiveDate>, SwingtraderError> {
        let path = self.base_path.join(CALENDAR_FILE);
        if path.exists() {
            let mut dates: Vec<NaiveDate> = read_rows::<CalendarRow>(&path)?
                .into_iter()
                .map(|r| r.date)
                .filter(|d| *d >= start && *d <= end)
                .collect();
            dates.sort();
            dates.dedup();
            return Ok(dates);
        }

        Ok(start
            .iter_days()
            .take_while(|d| *d <= end)
            .filter(|d| is_business_day(*d))
            .collect())
    }
}

impl MarketDataPort for CsvAdapter {
    fn get_daily_bars(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyBar>, SwingtraderError> {
        let path = self.csv_path(symbol);
        if !path.exists() {
            return Err(SwingtraderError::NoData {
                symbol: symbol.to_string(),
            });
        }

        let mut bars: Vec<DailyBar> = read_rows::<DailyBar>(&path)?
            .into_iter()
            .filter(|b| b.date >= start && b.date <= end)
            .collect();
        if bars.is_empty() {
            return Err(SwingtraderError::NoData {
                symbol: symbol.to_string(),
            });
        }

        bars.sort_by_key(|b| b.date);
        Ok(bars)
    }

    fn list_tradable_symbols(&self) -> Result<Vec<String>, SwingtraderError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| SwingtraderError::DataSource {
            reason: format!("failed to read {}: {}", self.base_path.display(), e),
        })?;

        let mut symbols = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| SwingtraderError::DataSource {
                reason: e.to_string(),
            })?;
            let name = entry.file_name().to_string_lossy().to_string();
            if name == CALENDAR_FILE || name == CORPORATE_ACTIONS_FILE {
                continue;
            }
            if let Some(stem) = name.strip_suffix(".csv") {
                symbols.push(stem.to_string());
            }
        }
        symbols.sort();
        Ok(symbols)
    }

    fn get_corporate_actions(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<CorporateAction>, SwingtraderError> {
        let path = self.base_path.join(CORPORATE_ACTIONS_FILE);
        if !path.exists() {
            return Ok(Vec::new());
        }

        Ok(read_rows::<CorporateAction>(&path)?
            .into_iter()
            .filter(|a| match a.ex_date {
                Some(ex) => ex >= start && ex <= end,
                None => true,
            })
            .collect())
    }

    fn get_trading_calendar(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<NaiveDate>, SwingtraderError> {
        let sessions = self.sessions(start, end)?;
        if !sessions.is_empty() {
            return Ok(sessions);
        }

        let lookahead_end = end + Duration::days(NEXT_SESSION_LOOKAHEAD_DAYS);
        let next = self.sessions(end + Duration::days(1), lookahead_end)?;
        Ok(next.into_iter().take(1).collect())
    }
}
