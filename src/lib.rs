//! swingtrader: daily equity swing-trading engine.
//!
//! Hexagonal architecture: domain logic in [`domain`], port traits in [`ports`],
//! concrete implementations in [`adapters`], daily invocations in [`jobs`].

pub mod domain;
pub mod ports;
pub mod adapters;
pub mod jobs;
pub mod logging;
pub mod cli;
