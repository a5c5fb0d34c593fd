//! Shared fixtures for integration tests

use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chainsignal::config::RegistryConfig;
use chainsignal::error::{ProviderContractError, ProviderFetchError};
use chainsignal::models::{FetchStatus, HistoricalPoint, ProviderResult};
use chainsignal::services::{ProviderAdapter, ProviderRegistry};
use chrono::{DateTime, TimeZone, Utc};

#[derive(Clone)]
pub enum StubBehavior {
    /// Return the configured values with this status
    Respond(FetchStatus),
    /// Violate the adapter contract
    Reject,
}

/// Scriptable in-memory provider
pub struct StubAdapter {
    id: String,
    capabilities: BTreeSet<String>,
    values: Mutex<HashMap<String, f64>>,
    behavior: Mutex<StubBehavior>,
    delay: Duration,
    interval: Option<Duration>,
    fetched_at: DateTime<Utc>,
    history: HashMap<String, Vec<HistoricalPoint>>,
    calls: AtomicUsize,
    history_calls: AtomicUsize,
}

impl StubAdapter {
    pub fn new(id: &str, values: &[(&str, f64)]) -> Self {
        Self {
            id: id.to_string(),
            capabilities: values.iter().map(|(m, _)| m.to_string()).collect(),
            values: Mutex::new(values.iter().map(|(m, v)| (m.to_string(), *v)).collect()),
            behavior: Mutex::new(StubBehavior::Respond(FetchStatus::Ok)),
            delay: Duration::ZERO,
            interval: None,
            fetched_at: fixed_time(),
            history: HashMap::new(),
            calls: AtomicUsize::new(0),
            history_calls: AtomicUsize::new(0),
        }
    }

    pub fn with_fetched_at(mut self, fetched_at: DateTime<Utc>) -> Self {
        self.fetched_at = fetched_at;
        self
    }

    /// Serve `values` as daily history of `metric`, one point per day
    /// counting back from the stub's fetch time, oldest first
    pub fn with_history(mut self, metric: &str, values: &[f64]) -> Self {
        let days = values.len() as i64;
        let points = values
            .iter()
            .enumerate()
            .map(|(i, value)| HistoricalPoint {
                timestamp: self.fetched_at - chrono::Duration::days(days - i as i64),
                value: *value,
            })
            .collect();
        self.history.insert(metric.to_string(), points);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_status(self, status: FetchStatus) -> Self {
        self.set_behavior(StubBehavior::Respond(status));
        self
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = Some(interval);
        self
    }

    pub fn rejecting(self) -> Self {
        self.set_behavior(StubBehavior::Reject);
        self
    }

    pub fn set_behavior(&self, behavior: StubBehavior) {
        *self.behavior.lock().unwrap() = behavior;
    }

    pub fn set_value(&self, metric: &str, value: f64) {
        self.values.lock().unwrap().insert(metric.to_string(), value);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn history_calls(&self) -> usize {
        self.history_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProviderAdapter for StubAdapter {
    fn id(&self) -> &str {
        &self.id
    }

    fn capabilities(&self) -> &BTreeSet<String> {
        &self.capabilities
    }

    fn min_request_interval(&self) -> Option<Duration> {
        self.interval
    }

    async fn fetch(
        &self,
        symbol: &str,
        metrics: &[String],
        _deadline: Duration,
    ) -> Result<ProviderResult, ProviderContractError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let behavior = self.behavior.lock().unwrap().clone();
        let status = match behavior {
            StubBehavior::Reject => {
                return Err(ProviderContractError::InvalidSymbol(symbol.to_string()))
            }
            StubBehavior::Respond(status) => status,
        };

        let values = if status.is_usable() {
            let all = self.values.lock().unwrap();
            metrics
                .iter()
                .filter_map(|m| all.get(m).map(|v| (m.clone(), *v)))
                .collect()
        } else {
            HashMap::new()
        };

        Ok(ProviderResult {
            provider: self.id.clone(),
            values,
            fetched_at: self.fetched_at,
            status,
        })
    }

    fn supports_history(&self, metric: &str) -> bool {
        self.history.contains_key(metric)
    }

    async fn fetch_history(
        &self,
        _symbol: &str,
        metric: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        _deadline: Duration,
    ) -> Result<Vec<HistoricalPoint>, ProviderFetchError> {
        self.history_calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let points = self
            .history
            .get(metric)
            .ok_or_else(|| ProviderFetchError::HistoryUnsupported(metric.to_string()))?;
        Ok(points
            .iter()
            .filter(|p| p.timestamp >= start && p.timestamp <= end)
            .copied()
            .collect())
    }
}

pub fn fixed_time() -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000, 0).unwrap()
}

/// Registry with `order` as the default priority
pub fn registry_with(order: &[&str], adapters: Vec<Arc<StubAdapter>>) -> Arc<ProviderRegistry> {
    let config = RegistryConfig {
        default_priority: order.iter().map(|p| p.to_string()).collect(),
        metric_priority: HashMap::new(),
        ..RegistryConfig::default()
    };
    let mut registry = ProviderRegistry::new(config);
    for adapter in adapters {
        registry.register(adapter).unwrap();
    }
    Arc::new(registry)
}

pub fn error_status() -> FetchStatus {
    FetchStatus::Error {
        reason: "stub failure".to_string(),
    }
}

pub fn unavailable_status() -> FetchStatus {
    FetchStatus::Unavailable {
        reason: "stub timeout".to_string(),
    }
}
