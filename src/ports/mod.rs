//! Port traits at the boundaries of the domain.

pub mod broker_port;
pub mod config_port;
pub mod market_data_port;
pub mod notifier_port;
pub mod store_port;
