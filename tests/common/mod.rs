#![allow(dead_code)]

use chrono::{Duration, NaiveDate};
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use swingtrader::adapters::sqlite_adapter::SqliteAdapter;
use swingtrader::domain::bar::DailyBar;
use swingtrader::domain::config::BotConfig;
use swingtrader::domain::corporate_action::{CorporateAction, CorporateActionKind};
use swingtrader::domain::error::SwingtraderError;
use swingtrader::domain::indicator::IndicatorParams;
use swingtrader::domain::market::is_business_day;
use swingtrader::domain::order::{OrderFill, OrderIntent, OrderStatus};
use swingtrader::domain::tracked_asset::TrackedAsset;
use swingtrader::domain::window::BoundedWindow;
use swingtrader::ports::broker_port::{Account, AssetInfo, BrokerPort, BrokerPosition, OpenOrder};
use swingtrader::ports::market_data_port::MarketDataPort;
use swingtrader::ports::notifier_port::Notifier;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Weekdays from `start` through `end`.
pub fn weekdays(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    start
        .iter_days()
        .take_while(|d| *d <= end)
        .filter(|d| is_business_day(*d))
        .collect()
}

/// A gently oscillating uptrend, one bar per weekday.
pub fn make_bars(start: NaiveDate, end: NaiveDate, base: f64, volume: u64) -> Vec<DailyBar> {
    weekdays(start, end)
        .into_iter()
        .enumerate()
        .map(|(i, d)| {
            let wiggle = ((i % 7) as f64 - 3.0) * 0.8;
            DailyBar::new(d, base + i as f64 * 0.25 + wiggle, volume)
        })
        .collect()
}

pub fn small_params() -> IndicatorParams {
    IndicatorParams {
        short_period: 3,
        long_period: 6,
        signal_period: 3,
        rsi_period: 4,
        trend_period: 10,
        rsi_window: 3,
        trend_window: 3,
        min_seed_bars: 13,
        retained_history: 5,
    }
}

/// Small indicator periods, no pacing, a low liquidity floor.
pub fn test_config() -> BotConfig {
    let mut config = BotConfig::default();
    config.indicators = small_params();
    config.universe.history_points = 25;
    config.universe.min_average_volume = 1_000.0;
    config.api.request_delay_ms = 0;
    config.api.cancel_settle_ms = 0;
    config
}

pub fn store() -> SqliteAdapter {
    let store = SqliteAdapter::in_memory().unwrap();
    store.initialize_schema().unwrap();
    store
}

/// A hand-built record with full windows.
pub fn record(
    symbol: &str,
    day: NaiveDate,
    close: f64,
    macd: f64,
    macd_signal: f64,
    rsi: Vec<f64>,
    trend: Vec<bool>,
) -> TrackedAsset {
    TrackedAsset {
        symbol: symbol.to_string(),
        date: day,
        close,
        ema_short: close,
        ema_long: close,
        macd,
        macd_signal,
        average_gain: 1.0,
        average_loss: 1.0,
        rsi_window: BoundedWindow::from_full(rsi),
        ema_long_trend: close,
        trend_window: BoundedWindow::from_full(trend),
    }
}

pub fn action(
    symbol: &str,
    kind: CorporateActionKind,
    old_rate: f64,
    new_rate: f64,
    ex_date: Option<NaiveDate>,
) -> CorporateAction {
    CorporateAction {
        symbol: symbol.to_string(),
        kind,
        old_rate,
        new_rate,
        ex_date,
    }
}

// ---------------------------------------------------------------------------
// Market data
// ---------------------------------------------------------------------------

pub struct MockMarketData {
    pub bars: BTreeMap<String, Vec<DailyBar>>,
    pub actions: Vec<CorporateAction>,
    pub holidays: Vec<NaiveDate>,
    pub errors: HashMap<String, String>,
    pub bar_requests: RefCell<Vec<(String, NaiveDate, NaiveDate)>>,
}

impl MockMarketData {
    pub fn new() -> Self {
        Self {
            bars: BTreeMap::new(),
            actions: Vec::new(),
            holidays: Vec::new(),
            errors: HashMap::new(),
            bar_requests: RefCell::new(Vec::new()),
        }
    }

    pub fn with_bars(mut self, symbol: &str, bars: Vec<DailyBar>) -> Self {
        self.bars.insert(symbol.to_string(), bars);
        self
    }

    pub fn with_action(mut self, action: CorporateAction) -> Self {
        self.actions.push(action);
        self
    }

    pub fn with_holiday(mut self, day: NaiveDate) -> Self {
        self.holidays.push(day);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }

    fn is_session(&self, day: NaiveDate) -> bool {
        is_business_day(day) && !self.holidays.contains(&day)
    }
}

impl MarketDataPort for MockMarketData {
    fn get_daily_bars(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyBar>, SwingtraderError> {
        self.bar_requests
            .borrow_mut()
            .push((symbol.to_string(), start, end));
        if let Some(reason) = self.errors.get(symbol) {
            return Err(SwingtraderError::DataSource {
                reason: reason.clone(),
            });
        }
        let bars: Vec<DailyBar> = self
            .bars
            .get(symbol)
            .map(|b| {
                b.iter()
                    .filter(|bar| bar.date >= start && bar.date <= end)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        if bars.is_empty() {
            return Err(SwingtraderError::NoData {
                symbol: symbol.to_string(),
            });
        }
        Ok(bars)
    }

    fn list_tradable_symbols(&self) -> Result<Vec<String>, SwingtraderError> {
        Ok(self.bars.keys().cloned().collect())
    }

    fn get_corporate_actions(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<CorporateAction>, SwingtraderError> {
        Ok(self
            .actions
            .iter()
            .filter(|a| a.ex_date.map_or(true, |d| d >= start && d <= end))
            .cloned()
            .collect())
    }

    fn get_trading_calendar(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<NaiveDate>, SwingtraderError> {
        let sessions: Vec<NaiveDate> = start
            .iter_days()
            .take_while(|d| *d <= end)
            .filter(|d| self.is_session(*d))
            .collect();
        if !sessions.is_empty() {
            return Ok(sessions);
        }
        Ok((end + Duration::days(1))
            .iter_days()
            .take(10)
            .filter(|d| self.is_session(*d))
            .take(1)
            .collect())
    }
}

// ---------------------------------------------------------------------------
// Broker
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct BrokerState {
    pub positions: Vec<BrokerPosition>,
    pub open_orders: Vec<OpenOrder>,
    pub fills: HashMap<String, OrderFill>,
    pub assets: HashMap<String, AssetInfo>,
    pub submitted: Vec<OrderIntent>,
    pub cancelled: Vec<String>,
    pub closed: Vec<String>,
    pub next_id: u32,
}

pub struct MockBroker {
    pub cash: f64,
    pub state: RefCell<BrokerState>,
}

impl MockBroker {
    pub fn new(cash: f64) -> Self {
        Self {
            cash,
            state: RefCell::new(BrokerState::default()),
        }
    }

    pub fn with_position(self, symbol: &str, avg_entry_price: Option<f64>) -> Self {
        self.state.borrow_mut().positions.push(BrokerPosition {
            symbol: symbol.to_string(),
            quantity: 10.0,
            avg_entry_price,
        });
        self
    }

    pub fn with_open_order(self, id: &str, symbol: &str) -> Self {
        self.state.borrow_mut().open_orders.push(OpenOrder {
            id: id.to_string(),
            symbol: symbol.to_string(),
        });
        self
    }

    pub fn with_fill(self, order_id: &str, status: OrderStatus, quantity: u64, price: f64) -> Self {
        self.state.borrow_mut().fills.insert(
            order_id.to_string(),
            OrderFill {
                status,
                filled_quantity: quantity,
                filled_average_price: Some(price),
            },
        );
        self
    }

    pub fn with_asset(self, symbol: &str, shortable: bool, easy_to_borrow: bool) -> Self {
        self.state.borrow_mut().assets.insert(
            symbol.to_string(),
            AssetInfo {
                symbol: symbol.to_string(),
                shortable,
                easy_to_borrow,
            },
        );
        self
    }

    pub fn submitted(&self) -> Vec<OrderIntent> {
        self.state.borrow().submitted.clone()
    }
}

impl BrokerPort for MockBroker {
    fn get_open_positions(&self) -> Result<Vec<BrokerPosition>, SwingtraderError> {
        Ok(self.state.borrow().positions.clone())
    }

    fn get_open_orders(&self) -> Result<Vec<OpenOrder>, SwingtraderError> {
        Ok(self.state.borrow().open_orders.clone())
    }

    fn get_account(&self) -> Result<Account, SwingtraderError> {
        Ok(Account {
            cash: self.cash,
            equity: self.cash,
        })
    }

    fn get_asset(&self, symbol: &str) -> Result<AssetInfo, SwingtraderError> {
        self.state
            .borrow()
            .assets
            .get(symbol)
            .cloned()
            .ok_or_else(|| SwingtraderError::broker("get_asset", format!("unknown {symbol}")))
    }

    fn submit_order(&self, order: &OrderIntent) -> Result<String, SwingtraderError> {
        let mut state = self.state.borrow_mut();
        state.next_id += 1;
        state.submitted.push(order.clone());
        Ok(format!("order-{}", state.next_id))
    }

    fn cancel_order(&self, order_id: &str) -> Result<(), SwingtraderError> {
        let mut state = self.state.borrow_mut();
        state.open_orders.retain(|o| o.id != order_id);
        state.cancelled.push(order_id.to_string());
        Ok(())
    }

    fn get_order(&self, order_id: &str) -> Result<OrderFill, SwingtraderError> {
        self.state
            .borrow()
            .fills
            .get(order_id)
            .cloned()
            .ok_or_else(|| SwingtraderError::broker("get_order", format!("unknown {order_id}")))
    }

    fn close_position(&self, symbol: &str) -> Result<(), SwingtraderError> {
        let mut state = self.state.borrow_mut();
        state.positions.retain(|p| p.symbol != symbol);
        state.closed.push(symbol.to_string());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Notifier
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct RecordingNotifier {
    pub messages: RefCell<Vec<String>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.borrow().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn send(&self, text: &str) -> Result<(), SwingtraderError> {
        self.messages.borrow_mut().push(text.to_string());
        Ok(())
    }
}

/// A notifier whose sends always fail.
pub struct FailingNotifier;

impl Notifier for FailingNotifier {
    fn send(&self, _text: &str) -> Result<(), SwingtraderError> {
        Err(SwingtraderError::broker("notify", "channel down"))
    }
}
