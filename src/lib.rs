//! Multi-provider crypto data aggregation and trading signal derivation.
//!
//! Providers are fanned out concurrently, their results merged into a single
//! [`models::MarketSnapshot`], indicators computed over a rolling window of
//! snapshots and a confidence-scored [`models::TradingSignal`] derived from
//! the indicator votes.

pub mod common;
pub mod config;
pub mod core;
pub mod error;
pub mod indicators;
pub mod logging;
pub mod models;
pub mod services;
pub mod signals;

pub use error::{EngineError, EngineResult};
