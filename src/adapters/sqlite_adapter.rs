//! SQLite store adapter.
//!
//! One row per (symbol, date) in `asset_record`, the held positions in
//! `held_position`, and a single-row `market_status`. Dates are stored as
//! UTC-midnight RFC 3339 timestamps; the RSI and trend windows as JSON
//! arrays.

use crate::domain::error::SwingtraderError;
use crate::domain::market::MarketStatus;
use crate::domain::position::{HeldPosition, HeldPositions};
use crate::domain::tracked_asset::TrackedAsset;
use crate::domain::window::BoundedWindow;
use crate::ports::config_port::ConfigPort;
use crate::ports::store_port::StorePort;
use chrono::{DateTime, NaiveDate};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, OptionalExtension};

const ASSET_COLUMNS: &str = "symbol, date, close, ema_short, ema_long, macd, macd_signal, \
     average_gain, average_loss, rsi_window, ema_long_trend, trend_window";

pub struct SqliteAdapter {
    pool: Pool<SqliteConnectionManager>,
}

pub fn format_date(date: NaiveDate) -> String {
    format!("{}T00:00:00Z", date.format("%Y-%m-%d"))
}

pub fn parse_date(value: &str) -> Result<NaiveDate, chrono::ParseError> {
    DateTime::parse_from_rfc3339(value).map(|dt| dt.date_naive())
}

fn conversion_error(
    index: usize,
    err: impl std::error::Error + Send + Sync + 'static,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(index, rusqlite::types::Type::Text, Box::new(err))
}

fn asset_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<TrackedAsset> {
    let date_str: String = row.get(1)?;
    let date = parse_date(&date_str).map_err(|e| conversion_error(1, e))?;
    let rsi_json: String = row.get(9)?;
    let rsi: Vec<f64> = serde_json::from_str(&rsi_json).map_err(|e| conversion_error(9, e))?;
    let trend_json: String = row.get(11)?;
    let trend: Vec<bool> =
        serde_json::from_str(&trend_json).map_err(|e| conversion_error(11, e))?;

    Ok(TrackedAsset {
        symbol: row.get(0)?,
        date,
        close: row.get(2)?,
        ema_short: row.get(3)?,
        ema_long: row.get(4)?,
        macd: row.get(5)?,
        macd_signal: row.get(6)?,
        average_gain: row.get(7)?,
        average_loss: row.get(8)?,
        rsi_window: BoundedWindow::from_full(rsi),
        ema_long_trend: row.get(10)?,
        trend_window: BoundedWindow::from_full(trend),
    })
}

fn query_error(e: rusqlite::Error) -> SwingtraderError {
    SwingtraderError::DatabaseQuery {
        reason: e.to_string(),
    }
}

fn is_constraint_violation(e: &rusqlite::Error) -> bool {
    matches!(
        e,
        rusqlite::Error::SqliteFailure(inner, _)
            if inner.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

fn insert_asset(conn: &rusqlite::Connection, asset: &TrackedAsset) -> Result<(), SwingtraderError> {
    let rsi = serde_json::to_string(&asset.rsi_window.to_vec()).map_err(|e| {
        SwingtraderError::DatabaseQuery {
            reason: e.to_string(),
        }
    })?;
    let trend = serde_json::to_string(&asset.trend_window.to_vec()).map_err(|e| {
        SwingtraderError::DatabaseQuery {
            reason: e.to_string(),
        }
    })?;

    conn.execute(
        &format!(
            "INSERT INTO asset_record ({ASSET_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)"
        ),
        params![
            asset.symbol,
            format_date(asset.date),
            asset.close,
            asset.ema_short,
            asset.ema_long,
            asset.macd,
            asset.macd_signal,
            asset.average_gain,
            asset.average_loss,
            rsi,
            asset.ema_long_trend,
            trend
        ],
    )
    .map_err(|e: rusqlite::Error| {
        if is_constraint_violation(&e) {
            SwingtraderError::DuplicateRecord {
                symbol: asset.symbol.clone(),
                date: asset.date,
            }
        } else {
            query_error(e)
        }
    })?;
    Ok(())
}

impl SqliteAdapter {
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, SwingtraderError> {
        let db_path =
            config
                .get_string("sqlite", "path")
                .ok_or_else(|| SwingtraderError::ConfigMissing {
                    section: "sqlite".into(),
                    key: "path".into(),
                })?;

        let pool_size = config.get_int("sqlite", "pool_size", 4).max(1) as u32;

        let manager = SqliteConnectionManager::file(&db_path);
        let pool =
            Pool::builder()
                .max_size(pool_size)
                .build(manager)
                .map_err(|e: r2d2::Error| SwingtraderError::Database {
                    reason: e.to_string(),
                })?;

        Ok(Self { pool })
    }

    pub fn in_memory() -> Result<Self, SwingtraderError> {
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder()
            .max_size(1)
            .build(manager)
            .map_err(|e: r2d2::Error| SwingtraderError::Database {
                reason: e.to_string(),
            })?;

        Ok(Self { pool })
    }

    fn connection(&self) -> Result<PooledConnection<SqliteConnectionManager>, SwingtraderError> {
        self.pool
            .get()
            .map_err(|e: r2d2::Error| SwingtraderError::Database {
                reason: e.to_string(),
            })
    }

    pub fn initialize_schema(&self) -> Result<(), SwingtraderError> {
        let conn = self.connection()?;

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS asset_record (
                symbol TEXT NOT NULL,
                date TEXT NOT NULL,
                close REAL NOT NULL,
                ema_short REAL NOT NULL,
                ema_long REAL NOT NULL,
                macd REAL NOT NULL,
                macd_signal REAL NOT NULL,
                average_gain REAL NOT NULL,
                average_loss REAL NOT NULL,
                rsi_window TEXT NOT NULL,
                ema_long_trend REAL NOT NULL,
                trend_window TEXT NOT NULL,
                PRIMARY KEY (symbol, date)
            );
            CREATE INDEX IF NOT EXISTS idx_asset_record_date ON asset_record(date);
            CREATE TABLE IF NOT EXISTS held_position (
                symbol TEXT PRIMARY KEY,
                order_id TEXT NOT NULL,
                is_long INTEGER NOT NULL,
                target_met INTEGER NOT NULL,
                stop_order_id TEXT
            );
            CREATE TABLE IF NOT EXISTS market_status (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                day_of_month INTEGER NOT NULL,
                market_is_open INTEGER NOT NULL,
                latest_date TEXT NOT NULL
            );",
        )
        .map_err(query_error)?;

        Ok(())
    }

    fn query_assets(
        &self,
        filter: &str,
        args: &[&dyn rusqlite::ToSql],
    ) -> Result<Vec<TrackedAsset>, SwingtraderError> {
        let conn = self.connection()?;
        let query = format!("SELECT {ASSET_COLUMNS} FROM asset_record {filter}");
        let mut stmt = conn.prepare(&query).map_err(query_error)?;
        let rows = stmt.query_map(args, asset_from_row).map_err(query_error)?;

        let mut assets = Vec::new();
        for row in rows {
            assets.push(row.map_err(query_error)?);
        }
        Ok(assets)
    }
}

impl StorePort for SqliteAdapter {
    fn insert_records(&self, records: &[TrackedAsset]) -> Result<(), SwingtraderError> {
        let mut conn = self.connection()?;
        let tx = conn.transaction().map_err(query_error)?;
        for record in records {
            insert_asset(&tx, record)?;
        }
        tx.commit().map_err(query_error)?;
        Ok(())
    }

    fn append_record(
        &self,
        next: &TrackedAsset,
        expected_prior: NaiveDate,
    ) -> Result<(), SwingtraderError> {
        let mut conn = self.connection()?;
        let tx = conn.transaction().map_err(query_error)?;

        let latest: Option<String> = tx
            .query_row(
                "SELECT MAX(date) FROM asset_record WHERE symbol = ?1",
                params![next.symbol],
                |row| row.get(0),
            )
            .map_err(query_error)?;
        let latest = latest
            .map(|s| parse_date(&s))
            .transpose()
            .map_err(|e: chrono::ParseError| SwingtraderError::Database {
                reason: e.to_string(),
            })?;

        if latest != Some(expected_prior) {
            return Err(SwingtraderError::DateSkew {
                symbol: next.symbol.clone(),
                expected: expected_prior,
                found: latest,
            });
        }

        insert_asset(&tx, next)?;
        tx.commit().map_err(query_error)?;
        Ok(())
    }

    fn load_asset_state(
        &self,
        symbol: &str,
        date: NaiveDate,
    ) -> Result<Option<TrackedAsset>, SwingtraderError> {
        let date = format_date(date);
        let mut assets = self.query_assets("WHERE symbol = ?1 AND date = ?2", &[&symbol, &date])?;
        Ok(assets.pop())
    }

    fn latest_asset_state(&self, symbol: &str) -> Result<Option<TrackedAsset>, SwingtraderError> {
        let mut assets = self.query_assets(
            "WHERE symbol = ?1 ORDER BY date DESC LIMIT 1",
            &[&symbol],
        )?;
        Ok(assets.pop())
    }

    fn asset_history(&self, symbol: &str) -> Result<Vec<TrackedAsset>, SwingtraderError> {
        self.query_assets("WHERE symbol = ?1 ORDER BY date ASC", &[&symbol])
    }

    fn all_records(&self) -> Result<Vec<TrackedAsset>, SwingtraderError> {
        self.query_assets("ORDER BY date ASC, symbol ASC", &[])
    }

    fn records_on(&self, date: NaiveDate) -> Result<Vec<TrackedAsset>, SwingtraderError> {
        let date = format_date(date);
        self.query_assets("WHERE date = ?1 ORDER BY symbol ASC", &[&date])
    }

    fn tracked_symbols(&self) -> Result<Vec<String>, SwingtraderError> {
        let conn = self.connection()?;
        let mut stmt = conn
            .prepare("SELECT DISTINCT symbol FROM asset_record ORDER BY symbol")
            .map_err(query_error)?;
        let rows = stmt
            .query_map([], |row| row.get(0))
            .map_err(query_error)?;

        let mut symbols = Vec::new();
        for row in rows {
            symbols.push(row.map_err(query_error)?);
        }
        Ok(symbols)
    }

    fn drop_symbol(&self, symbol: &str) -> Result<(), SwingtraderError> {
        let conn = self.connection()?;
        conn.execute("DELETE FROM asset_record WHERE symbol = ?1", params![symbol])
            .map_err(query_error)?;
        Ok(())
    }

    fn replace_symbol(
        &self,
        symbol: &str,
        records: &[TrackedAsset],
    ) -> Result<(), SwingtraderError> {
        if let Some(other) = records.iter().find(|r| r.symbol != symbol) {
            return Err(SwingtraderError::InvariantViolation {
                reason: format!("record for {} in replacement series of {symbol}", other.symbol),
            });
        }
        let mut conn = self.connection()?;
        let tx = conn.transaction().map_err(query_error)?;
        tx.execute("DELETE FROM asset_record WHERE symbol = ?1", params![symbol])
            .map_err(query_error)?;
        for record in records {
            insert_asset(&tx, record)?;
        }
        tx.commit().map_err(query_error)?;
        Ok(())
    }

    fn delete_records_on(&self, date: NaiveDate) -> Result<usize, SwingtraderError> {
        let conn = self.connection()?;
        conn.execute(
            "DELETE FROM asset_record WHERE date = ?1",
            params![format_date(date)],
        )
        .map_err(query_error)
    }

    fn previous_record_date(&self, date: NaiveDate) -> Result<Option<NaiveDate>, SwingtraderError> {
        let conn = self.connection()?;
        let previous: Option<String> = conn
            .query_row(
                "SELECT MAX(date) FROM asset_record WHERE date < ?1",
                params![format_date(date)],
                |row| row.get(0),
            )
            .map_err(query_error)?;
        previous
            .map(|s| parse_date(&s))
            .transpose()
            .map_err(|e: chrono::ParseError| SwingtraderError::Database {
                reason: e.to_string(),
            })
    }

    fn load_held_positions(&self) -> Result<HeldPositions, SwingtraderError> {
        let conn = self.connection()?;
        let mut stmt = conn
            .prepare(
                "SELECT symbol, order_id, is_long, target_met, stop_order_id
                 FROM held_position ORDER BY symbol",
            )
            .map_err(query_error)?;
        let rows = stmt
            .query_map([], |row| {
                Ok(HeldPosition {
                    symbol: row.get(0)?,
                    order_id: row.get(1)?,
                    is_long: row.get(2)?,
                    target_met: row.get(3)?,
                    stop_order_id: row.get(4)?,
                })
            })
            .map_err(query_error)?;

        let mut positions = Vec::new();
        for row in rows {
            positions.push(row.map_err(query_error)?);
        }
        Ok(HeldPositions::from_positions(positions))
    }

    fn save_held_positions(&self, positions: &HeldPositions) -> Result<(), SwingtraderError> {
        let mut conn = self.connection()?;
        let tx = conn.transaction().map_err(query_error)?;
        tx.execute("DELETE FROM held_position", [])
            .map_err(query_error)?;
        for position in positions.iter() {
            tx.execute(
                "INSERT INTO held_position (symbol, order_id, is_long, target_met, stop_order_id)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    position.symbol,
                    position.order_id,
                    position.is_long,
                    position.target_met,
                    position.stop_order_id
                ],
            )
            .map_err(query_error)?;
        }
        tx.commit().map_err(query_error)?;
        Ok(())
    }

    fn load_market_status(&self) -> Result<Option<MarketStatus>, SwingtraderError> {
        let conn = self.connection()?;
        let row: Option<(u32, bool, String)> = conn
            .query_row(
                "SELECT day_of_month, market_is_open, latest_date FROM market_status WHERE id = 1",
                [],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .optional()
            .map_err(query_error)?;

        match row {
            None => Ok(None),
            Some((day_of_month, market_is_open, latest)) => {
                let latest_date = parse_date(&latest).map_err(|e: chrono::ParseError| {
                    SwingtraderError::Database {
                        reason: e.to_string(),
                    }
                })?;
                Ok(Some(MarketStatus {
                    day_of_month,
                    market_is_open,
                    latest_date,
                }))
            }
        }
    }

    fn save_market_status(&self, status: &MarketStatus) -> Result<(), SwingtraderError> {
        let conn = self.connection()?;
        conn.execute(
            "INSERT INTO market_status (id, day_of_month, market_is_open, latest_date)
             VALUES (1, ?1, ?2, ?3)
             ON CONFLICT(id) DO UPDATE SET
                day_of_month = excluded.day_of_month,
                market_is_open = excluded.market_is_open,
                latest_date = excluded.latest_date",
            params![
                status.day_of_month,
                status.market_is_open,
                format_date(status.latest_date)
            ],
        )
        .map_err(query_error)?;
        Ok(())
    }
}
