use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Indicator family, used to group explanations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndicatorCategory {
    Momentum,
    Trend,
    OnChain,
    DeFi,
}

impl IndicatorCategory {
    pub fn label(self) -> &'static str {
        match self {
            IndicatorCategory::Momentum => "Momentum",
            IndicatorCategory::Trend => "Trend",
            IndicatorCategory::OnChain => "On-chain",
            IndicatorCategory::DeFi => "DeFi",
        }
    }
}

/// Directional vote of a single indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Vote {
    Bearish,
    Neutral,
    Bullish,
}

impl Vote {
    pub fn as_f64(self) -> f64 {
        match self {
            Vote::Bearish => -1.0,
            Vote::Neutral => 0.0,
            Vote::Bullish => 1.0,
        }
    }

    /// +1 above `high`, -1 below `low`, otherwise neutral
    pub fn from_band(value: f64, low: f64, high: f64) -> Self {
        if value > high {
            Vote::Bullish
        } else if value < low {
            Vote::Bearish
        } else {
            Vote::Neutral
        }
    }

    pub fn inverted(self) -> Self {
        match self {
            Vote::Bearish => Vote::Bullish,
            Vote::Neutral => Vote::Neutral,
            Vote::Bullish => Vote::Bearish,
        }
    }
}

/// A derived quantity computed over a window of snapshots
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Indicator {
    pub name: String,
    pub category: IndicatorCategory,
    /// Snapshot metric the indicator reads
    pub source_metric: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    #[serde(default)]
    pub params: BTreeMap<String, f64>,
    pub valid: bool,
    pub vote: Vote,
}

impl Indicator {
    pub fn new(
        name: impl Into<String>,
        category: IndicatorCategory,
        source_metric: impl Into<String>,
        value: f64,
        vote: Vote,
    ) -> Self {
        Self {
            name: name.into(),
            category,
            source_metric: source_metric.into(),
            value: Some(value),
            params: BTreeMap::new(),
            valid: true,
            vote,
        }
    }

    /// Placeholder for an indicator that lacked history; carries no value
    pub fn invalid(
        name: impl Into<String>,
        category: IndicatorCategory,
        source_metric: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            category,
            source_metric: source_metric.into(),
            value: None,
            params: BTreeMap::new(),
            valid: false,
            vote: Vote::Neutral,
        }
    }

    pub fn with_param(mut self, key: impl Into<String>, value: f64) -> Self {
        self.params.insert(key.into(), value);
        self
    }
}
