//! Engine configuration.
//!
//! Every component receives its settings explicitly at construction; nothing
//! here reads the environment.

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{EngineError, EngineResult};
use crate::models::metrics;

/// Connection parameters for one provider, fully resolved by the caller
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderSettings {
    pub base_url: String,
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
    #[serde(default = "default_provider_timeout")]
    pub timeout: Duration,
    /// Minimum spacing between two requests to this provider
    #[serde(default)]
    pub min_request_interval: Option<Duration>,
}

fn default_provider_timeout() -> Duration {
    Duration::from_secs(10)
}

impl ProviderSettings {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: None,
            timeout: default_provider_timeout(),
            min_request_interval: None,
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_min_request_interval(mut self, interval: Duration) -> Self {
        self.min_request_interval = Some(interval);
        self
    }

    /// Parse and check the base URL
    pub fn validate(&self) -> EngineResult<Url> {
        let url = Url::parse(&self.base_url)
            .map_err(|e| EngineError::config(format!("invalid base url '{}': {}", self.base_url, e)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(EngineError::config(format!(
                "unsupported scheme '{}' in {}",
                url.scheme(),
                self.base_url
            )));
        }
        if self.timeout.is_zero() {
            return Err(EngineError::config("provider timeout must be positive"));
        }
        Ok(url)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregatorConfig {
    /// Relative difference above which two `ok` providers are contested
    pub relative_tolerance: f64,
    /// Upper bound for a single adapter call, further capped by the request deadline
    pub provider_timeout: Option<Duration>,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            relative_tolerance: 0.01,
            provider_timeout: Some(Duration::from_secs(10)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Consecutive hard errors before a provider is disabled
    pub error_threshold: u32,
    /// Consecutive timeouts before a provider is disabled
    pub timeout_threshold: u32,
    pub cooldown: Duration,
    /// Number of recent outcomes kept per provider
    pub health_window: usize,
    /// Provider order used for metrics without an explicit entry
    pub default_priority: Vec<String>,
    pub metric_priority: HashMap<String, Vec<String>>,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        let market = vec!["defillama".to_string(), "glassnode".to_string()];
        let metric_priority = [metrics::PRICE, metrics::MARKET_CAP, metrics::VOLUME_24H]
            .iter()
            .map(|m| (m.to_string(), market.clone()))
            .collect();

        Self {
            error_threshold: 3,
            timeout_threshold: 5,
            cooldown: Duration::from_secs(60),
            health_window: 20,
            default_priority: vec!["glassnode".to_string(), "defillama".to_string()],
            metric_priority,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorConfig {
    pub sma_fast: usize,
    pub sma_slow: usize,
    pub ema_period: usize,
    pub rsi_period: usize,
    pub rsi_oversold: f64,
    pub rsi_overbought: f64,
    pub mvrv_low: f64,
    pub mvrv_high: f64,
    pub sopr_low: f64,
    pub sopr_high: f64,
    pub nvt_low: f64,
    pub nvt_high: f64,
    /// Lookback for the active address and TVL deltas
    pub delta_period: usize,
    /// Relative change that counts as a move for the deltas
    pub delta_threshold: f64,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            sma_fast: 5,
            sma_slow: 20,
            ema_period: 20,
            rsi_period: 14,
            rsi_oversold: 30.0,
            rsi_overbought: 70.0,
            mvrv_low: 1.0,
            mvrv_high: 3.0,
            sopr_low: 0.95,
            sopr_high: 1.05,
            nvt_low: 20.0,
            nvt_high: 50.0,
            delta_period: 7,
            delta_threshold: 0.05,
        }
    }
}

impl IndicatorConfig {
    /// Largest window any default indicator needs before it is valid
    pub fn longest_history(&self) -> usize {
        [
            self.sma_slow.max(self.sma_fast),
            self.ema_period,
            self.rsi_period + 1,
            self.delta_period + 1,
        ]
        .into_iter()
        .max()
        .unwrap_or(1)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalConfig {
    /// Importance weight per indicator name
    pub weights: HashMap<String, f64>,
    pub default_weight: f64,
    pub min_confidence: f64,
    pub min_strength: f64,
    /// Confidence penalty per contested metric, capped at 1
    pub contested_penalty: f64,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            weights: HashMap::new(),
            default_weight: 1.0,
            min_confidence: 0.3,
            min_strength: 0.2,
            contested_penalty: 0.1,
        }
    }
}

impl SignalConfig {
    pub fn weight_for(&self, indicator: &str) -> f64 {
        self.weights
            .get(indicator)
            .copied()
            .unwrap_or(self.default_weight)
    }

    pub fn with_weight(mut self, indicator: impl Into<String>, weight: f64) -> Self {
        self.weights.insert(indicator.into(), weight);
        self
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub aggregator: AggregatorConfig,
    pub registry: RegistryConfig,
    pub indicators: IndicatorConfig,
    pub signal: SignalConfig,
    pub history: HistoryConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Snapshots kept per symbol
    pub capacity: usize,
    /// Days of daily history requested when warming a symbol's window
    pub warmup_days: u32,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            capacity: 50,
            warmup_days: 30,
        }
    }
}

fn check_unit(name: &str, value: f64) -> EngineResult<()> {
    if !(0.0..=1.0).contains(&value) {
        return Err(EngineError::config(format!(
            "{} must be within 0..=1, got {}",
            name, value
        )));
    }
    Ok(())
}

fn check_band(name: &str, low: f64, high: f64) -> EngineResult<()> {
    if !low.is_finite() || !high.is_finite() || low >= high {
        return Err(EngineError::config(format!(
            "{} band must satisfy low < high, got {}..{}",
            name, low, high
        )));
    }
    Ok(())
}

fn check_positive(name: &str, value: usize) -> EngineResult<()> {
    if value == 0 {
        return Err(EngineError::config(format!("{} must be positive", name)));
    }
    Ok(())
}

impl EngineConfig {
    pub fn validate(&self) -> EngineResult<()> {
        let tolerance = self.aggregator.relative_tolerance;
        if !tolerance.is_finite() || tolerance < 0.0 {
            return Err(EngineError::config(format!(
                "relative_tolerance must be a non-negative number, got {}",
                tolerance
            )));
        }

        check_positive("error_threshold", self.registry.error_threshold as usize)?;
        check_positive("timeout_threshold", self.registry.timeout_threshold as usize)?;
        check_positive("health_window", self.registry.health_window)?;
        check_positive("history capacity", self.history.capacity)?;

        let ind = &self.indicators;
        check_positive("sma_fast", ind.sma_fast)?;
        check_positive("ema_period", ind.ema_period)?;
        check_positive("rsi_period", ind.rsi_period)?;
        check_positive("delta_period", ind.delta_period)?;
        if ind.sma_fast >= ind.sma_slow {
            return Err(EngineError::config(format!(
                "sma_fast ({}) must be shorter than sma_slow ({})",
                ind.sma_fast, ind.sma_slow
            )));
        }
        check_band("rsi", ind.rsi_oversold, ind.rsi_overbought)?;
        check_band("mvrv", ind.mvrv_low, ind.mvrv_high)?;
        check_band("sopr", ind.sopr_low, ind.sopr_high)?;
        check_band("nvt", ind.nvt_low, ind.nvt_high)?;
        if !ind.delta_threshold.is_finite() || ind.delta_threshold < 0.0 {
            return Err(EngineError::config(format!(
                "delta_threshold must be a non-negative number, got {}",
                ind.delta_threshold
            )));
        }

        let longest = ind.longest_history();
        if self.history.capacity < longest {
            return Err(EngineError::config(format!(
                "history capacity {} cannot hold the {} snapshots the indicators need",
                self.history.capacity, longest
            )));
        }

        let sig = &self.signal;
        check_unit("min_confidence", sig.min_confidence)?;
        check_unit("min_strength", sig.min_strength)?;
        check_unit("contested_penalty", sig.contested_penalty)?;
        if sig.default_weight < 0.0 || sig.weights.values().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(EngineError::config("indicator weights must be non-negative"));
        }

        Ok(())
    }
}
