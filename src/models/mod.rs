//! Shared data models spanning the engine layers.

pub mod indicators;
pub mod metrics;
pub mod signal;
pub mod snapshot;
pub mod symbol;

pub use indicators::{Indicator, IndicatorCategory, Vote};
pub use signal::{SignalDirection, SignalReason, SignalStrength, TradingSignal};
pub use snapshot::{FetchStatus, HistoricalPoint, MarketSnapshot, MetricValue, ProviderResult};
pub use symbol::normalize_symbol;
