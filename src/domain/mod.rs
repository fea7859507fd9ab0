//! Core domain types and logic.

pub mod admission;
pub mod bar;
pub mod config;
pub mod corporate_action;
pub mod error;
pub mod indicator;
pub mod lifecycle;
pub mod market;
pub mod order;
pub mod position;
pub mod signal;
pub mod simulation;
pub mod sizing;
pub mod tracked_asset;
pub mod window;
