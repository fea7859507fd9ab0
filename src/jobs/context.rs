//! Dependency-injected context shared by every job.
//!
//! Built once per process from the configured adapters and passed by
//! reference to each job function. Holds no global state.

use crate::domain::config::BotConfig;
use crate::domain::error::SwingtraderError;
use crate::ports::broker_port::BrokerPort;
use crate::ports::market_data_port::MarketDataPort;
use crate::ports::notifier_port::Notifier;
use crate::ports::store_port::StorePort;
use std::thread;
use std::time::Duration;

/// Fixed delays between external calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Pacer {
    request_delay: Duration,
    cancel_settle: Duration,
}

impl Pacer {
    pub fn new(request_delay: Duration, cancel_settle: Duration) -> Self {
        Self {
            request_delay,
            cancel_settle,
        }
    }

    /// No waiting at all.
    pub fn immediate() -> Self {
        Self::default()
    }

    /// Wait between two provider requests.
    pub fn pause(&self) {
        if !self.request_delay.is_zero() {
            thread::sleep(self.request_delay);
        }
    }

    /// Wait for a cancelled order to clear before closing the position.
    pub fn settle(&self) {
        if !self.cancel_settle.is_zero() {
            thread::sleep(self.cancel_settle);
        }
    }
}

pub struct JobContext<'a> {
    pub store: &'a dyn StorePort,
    pub market_data: &'a dyn MarketDataPort,
    broker: Option<&'a dyn BrokerPort>,
    pub notifier: &'a dyn Notifier,
    pub config: BotConfig,
    pub pacer: Pacer,
}

impl<'a> JobContext<'a> {
    /// Context without a broker. Pacing follows `[api]`.
    pub fn new(
        store: &'a dyn StorePort,
        market_data: &'a dyn MarketDataPort,
        notifier: &'a dyn Notifier,
        config: BotConfig,
    ) -> Self {
        let pacer = Pacer::new(
            Duration::from_millis(config.api.request_delay_ms),
            Duration::from_millis(config.api.cancel_settle_ms),
        );
        Self {
            store,
            market_data,
            broker: None,
            notifier,
            config,
            pacer,
        }
    }

    pub fn with_broker(mut self, broker: &'a dyn BrokerPort) -> Self {
        self.broker = Some(broker);
        self
    }

    pub fn with_pacer(mut self, pacer: Pacer) -> Self {
        self.pacer = pacer;
        self
    }

    /// The broker, for jobs that trade.
    pub fn broker(&self) -> Result<&'a dyn BrokerPort, SwingtraderError> {
        self.broker.ok_or_else(|| SwingtraderError::ConfigMissing {
            section: "broker".to_string(),
            key: "adapter".to_string(),
        })
    }

    /// Send a notification. A failed send is logged and otherwise ignored.
    pub fn notify(&self, text: &str) {
        if let Err(e) = self.notifier.send(text) {
            tracing::warn!(error = %e, "notification failed");
        }
    }
}
