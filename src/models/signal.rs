use chrono::{DateTime, Utc};
use serde::Serialize;

use super::indicators::Indicator;
use super::snapshot::MarketSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalDirection {
    Buy,
    Sell,
    Hold,
}

/// Coarse bucket of the continuous strength value
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalStrength {
    Weak,
    Moderate,
    Strong,
    VeryStrong,
}

impl SignalStrength {
    pub fn from_strength(strength: f64) -> Self {
        if strength < 0.25 {
            SignalStrength::Weak
        } else if strength < 0.5 {
            SignalStrength::Moderate
        } else if strength < 0.75 {
            SignalStrength::Strong
        } else {
            SignalStrength::VeryStrong
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignalReason {
    pub description: String,
    pub weight: f64,
}

/// Final directional recommendation. Holds copies of the snapshot and
/// indicators that produced it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradingSignal {
    pub symbol: String,
    pub timestamp: DateTime<Utc>,
    pub direction: SignalDirection,
    /// 0.0 - 1.0
    pub strength: f64,
    /// 0.0 - 1.0
    pub confidence: f64,
    pub strength_label: SignalStrength,
    pub indicators: Vec<Indicator>,
    pub snapshot: MarketSnapshot,
    pub reasons: Vec<SignalReason>,
}

impl TradingSignal {
    pub fn is_buy(&self) -> bool {
        self.direction == SignalDirection::Buy
    }

    pub fn is_sell(&self) -> bool {
        self.direction == SignalDirection::Sell
    }

    pub fn is_hold(&self) -> bool {
        self.direction == SignalDirection::Hold
    }
}
