//! Brokerage account port trait.

use crate::domain::error::SwingtraderError;
use crate::domain::order::{OrderFill, OrderIntent};

#[derive(Debug, Clone, PartialEq)]
pub struct BrokerPosition {
    pub symbol: String,
    pub quantity: f64,
    /// Absent when the broker cannot report it.
    pub avg_entry_price: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OpenOrder {
    pub id: String,
    pub symbol: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    pub cash: f64,
    pub equity: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssetInfo {
    pub symbol: String,
    pub shortable: bool,
    pub easy_to_borrow: bool,
}

pub trait BrokerPort {
    fn get_open_positions(&self) -> Result<Vec<BrokerPosition>, SwingtraderError>;

    fn get_open_orders(&self) -> Result<Vec<OpenOrder>, SwingtraderError>;

    fn get_account(&self) -> Result<Account, SwingtraderError>;

    fn get_asset(&self, symbol: &str) -> Result<AssetInfo, SwingtraderError>;

    /// Submit a market or stop order; returns the broker's order id.
    fn submit_order(&self, order: &OrderIntent) -> Result<String, SwingtraderError>;

    fn cancel_order(&self, order_id: &str) -> Result<(), SwingtraderError>;

    fn get_order(&self, order_id: &str) -> Result<OrderFill, SwingtraderError>;

    /// Market-close the whole position in `symbol`.
    fn close_position(&self, symbol: &str) -> Result<(), SwingtraderError>;
}
