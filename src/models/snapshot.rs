use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Outcome of a single provider fetch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FetchStatus {
    Ok,
    /// Some requested metrics were returned, others failed
    Partial { reason: String },
    /// Deadline exceeded or request skipped
    Unavailable { reason: String },
    Error { reason: String },
}

impl FetchStatus {
    /// Whether the values carried alongside this status may be merged
    pub fn is_usable(&self) -> bool {
        matches!(self, FetchStatus::Ok | FetchStatus::Partial { .. })
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            FetchStatus::Ok => None,
            FetchStatus::Partial { reason }
            | FetchStatus::Unavailable { reason }
            | FetchStatus::Error { reason } => Some(reason),
        }
    }
}

/// One provider's raw contribution to an aggregation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderResult {
    pub provider: String,
    pub values: HashMap<String, f64>,
    pub fetched_at: DateTime<Utc>,
    pub status: FetchStatus,
}

impl ProviderResult {
    pub fn ok(
        provider: impl Into<String>,
        values: HashMap<String, f64>,
        fetched_at: DateTime<Utc>,
    ) -> Self {
        Self {
            provider: provider.into(),
            values,
            fetched_at,
            status: FetchStatus::Ok,
        }
    }

    pub fn partial(
        provider: impl Into<String>,
        values: HashMap<String, f64>,
        fetched_at: DateTime<Utc>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            provider: provider.into(),
            values,
            fetched_at,
            status: FetchStatus::Partial {
                reason: reason.into(),
            },
        }
    }

    pub fn unavailable(provider: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            values: HashMap::new(),
            fetched_at: Utc::now(),
            status: FetchStatus::Unavailable {
                reason: reason.into(),
            },
        }
    }

    pub fn error(provider: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            values: HashMap::new(),
            fetched_at: Utc::now(),
            status: FetchStatus::Error {
                reason: reason.into(),
            },
        }
    }

    /// Value for `metric` if the status allows merging and the value is finite
    pub fn usable_value(&self, metric: &str) -> Option<f64> {
        if !self.status.is_usable() {
            return None;
        }
        self.values.get(metric).copied().filter(|v| v.is_finite())
    }
}

/// One dated value from a provider's daily history
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistoricalPoint {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

/// A merged metric inside a snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricValue {
    pub value: f64,
    pub source: String,
    /// Age of the winning provider's data relative to the snapshot timestamp
    pub staleness: Duration,
    /// Winner was `ok` and another `ok` provider disagreed beyond tolerance
    #[serde(default)]
    pub contested: bool,
}

/// Merged point-in-time view of one asset. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketSnapshot {
    symbol: String,
    timestamp: DateTime<Utc>,
    metrics: BTreeMap<String, MetricValue>,
}

impl MarketSnapshot {
    /// Build a snapshot; fails with `InsufficientData` when `metrics` is empty
    pub fn new(
        symbol: impl Into<String>,
        timestamp: DateTime<Utc>,
        metrics: BTreeMap<String, MetricValue>,
    ) -> EngineResult<Self> {
        let symbol = symbol.into();
        if metrics.is_empty() {
            return Err(EngineError::insufficient_data(symbol));
        }
        Ok(Self {
            symbol,
            timestamp,
            metrics,
        })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn metrics(&self) -> &BTreeMap<String, MetricValue> {
        &self.metrics
    }

    pub fn get(&self, metric: &str) -> Option<&MetricValue> {
        self.metrics.get(metric)
    }

    pub fn value(&self, metric: &str) -> Option<f64> {
        self.metrics.get(metric).map(|m| m.value)
    }

    pub fn contains(&self, metric: &str) -> bool {
        self.metrics.contains_key(metric)
    }

    pub fn is_contested(&self, metric: &str) -> bool {
        self.metrics.get(metric).map_or(false, |m| m.contested)
    }

    pub fn contested_metrics(&self) -> Vec<&str> {
        self.metrics
            .iter()
            .filter(|(_, m)| m.contested)
            .map(|(name, _)| name.as_str())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }
}
