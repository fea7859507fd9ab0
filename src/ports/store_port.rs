//! Persistence port trait for tracked assets, held positions and the
//! market status singleton.

use crate::domain::error::SwingtraderError;
use crate::domain::market::MarketStatus;
use crate::domain::position::HeldPositions;
use crate::domain::tracked_asset::TrackedAsset;
use chrono::NaiveDate;

pub trait StorePort {
    /// Insert a freshly seeded series. Fails with `DuplicateRecord` if any
    /// (symbol, date) already exists; nothing is written in that case.
    fn insert_records(&self, records: &[TrackedAsset]) -> Result<(), SwingtraderError>;

    /// Store `next` as the symbol's new latest record, provided the stored
    /// latest record is still dated `expected_prior`. Otherwise fails with
    /// `DateSkew` and writes nothing.
    fn append_record(
        &self,
        next: &TrackedAsset,
        expected_prior: NaiveDate,
    ) -> Result<(), SwingtraderError>;

    fn load_asset_state(
        &self,
        symbol: &str,
        date: NaiveDate,
    ) -> Result<Option<TrackedAsset>, SwingtraderError>;

    fn latest_asset_state(&self, symbol: &str) -> Result<Option<TrackedAsset>, SwingtraderError>;

    /// Every stored record for `symbol`, oldest first.
    fn asset_history(&self, symbol: &str) -> Result<Vec<TrackedAsset>, SwingtraderError>;

    /// Every stored record for every symbol.
    fn all_records(&self) -> Result<Vec<TrackedAsset>, SwingtraderError>;

    /// Records dated exactly `date`, ordered by symbol.
    fn records_on(&self, date: NaiveDate) -> Result<Vec<TrackedAsset>, SwingtraderError>;

    fn tracked_symbols(&self) -> Result<Vec<String>, SwingtraderError>;

    /// Remove every record for `symbol`.
    fn drop_symbol(&self, symbol: &str) -> Result<(), SwingtraderError>;

    /// Atomically swap every record for `symbol` for `records`. Either the
    /// old series or the new one is stored, never neither.
    fn replace_symbol(
        &self,
        symbol: &str,
        records: &[TrackedAsset],
    ) -> Result<(), SwingtraderError>;

    /// Remove every record dated `date`; returns how many were removed.
    fn delete_records_on(&self, date: NaiveDate) -> Result<usize, SwingtraderError>;

    /// Latest stored record date strictly before `date`.
    fn previous_record_date(&self, date: NaiveDate) -> Result<Option<NaiveDate>, SwingtraderError>;

    fn load_held_positions(&self) -> Result<HeldPositions, SwingtraderError>;

    /// Replace the stored held positions with `positions`.
    fn save_held_positions(&self, positions: &HeldPositions) -> Result<(), SwingtraderError>;

    fn load_market_status(&self) -> Result<Option<MarketStatus>, SwingtraderError>;

    fn save_market_status(&self, status: &MarketStatus) -> Result<(), SwingtraderError>;
}
