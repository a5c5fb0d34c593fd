//! Provider registry: active adapters, their priority order and health.

use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::{info, warn};

use crate::config::RegistryConfig;
use crate::error::{EngineError, EngineResult};
use crate::models::snapshot::FetchStatus;
use crate::services::market_data::ProviderAdapter;
use crate::services::rate_limiter::RateLimiter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthState {
    Available,
    Degraded,
    Disabled,
}

/// Outcome of one completed adapter call, as seen by the health tracker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchOutcome {
    Success,
    Partial,
    Timeout,
    Error,
}

impl FetchOutcome {
    pub fn from_status(status: &FetchStatus) -> Self {
        match status {
            FetchStatus::Ok => FetchOutcome::Success,
            FetchStatus::Partial { .. } => FetchOutcome::Partial,
            FetchStatus::Unavailable { .. } => FetchOutcome::Timeout,
            FetchStatus::Error { .. } => FetchOutcome::Error,
        }
    }
}

#[derive(Debug, Clone)]
struct ProviderHealth {
    state: HealthState,
    disabled_until: Option<Instant>,
    consecutive_errors: u32,
    consecutive_timeouts: u32,
    recent: VecDeque<FetchOutcome>,
}

impl ProviderHealth {
    fn new() -> Self {
        Self {
            state: HealthState::Available,
            disabled_until: None,
            consecutive_errors: 0,
            consecutive_timeouts: 0,
            recent: VecDeque::new(),
        }
    }

    /// Lift an expired cooldown: disabled -> degraded
    fn refresh(&mut self, now: Instant) {
        if self.state == HealthState::Disabled
            && self.disabled_until.map_or(true, |until| now >= until)
        {
            self.state = HealthState::Degraded;
            self.disabled_until = None;
            self.consecutive_errors = 0;
            self.consecutive_timeouts = 0;
        }
    }

    fn apply(&mut self, outcome: FetchOutcome, now: Instant, config: &RegistryConfig) {
        self.refresh(now);

        self.recent.push_back(outcome);
        while self.recent.len() > config.health_window {
            self.recent.pop_front();
        }

        match outcome {
            FetchOutcome::Success | FetchOutcome::Partial => {
                self.state = HealthState::Available;
                self.consecutive_errors = 0;
                self.consecutive_timeouts = 0;
            }
            FetchOutcome::Error => {
                self.consecutive_errors += 1;
                self.state = HealthState::Degraded;
                if self.consecutive_errors >= config.error_threshold {
                    self.disable(now, config.cooldown);
                }
            }
            FetchOutcome::Timeout => {
                self.consecutive_timeouts += 1;
                self.state = HealthState::Degraded;
                if self.consecutive_timeouts >= config.timeout_threshold {
                    self.disable(now, config.cooldown);
                }
            }
        }
    }

    fn disable(&mut self, now: Instant, cooldown: Duration) {
        self.state = HealthState::Disabled;
        self.disabled_until = Some(now + cooldown);
    }

    fn count(&self, outcome: FetchOutcome) -> usize {
        self.recent.iter().filter(|o| **o == outcome).count()
    }
}

/// Serializable view of one provider's health
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProviderHealthReport {
    pub provider: String,
    pub state: HealthState,
    pub consecutive_errors: u32,
    pub consecutive_timeouts: u32,
    pub recent_successes: usize,
    pub recent_partials: usize,
    pub recent_timeouts: usize,
    pub recent_errors: usize,
    pub capabilities: Vec<String>,
}

/// One adapter to invoke and the metrics it should fetch
#[derive(Clone)]
pub struct Assignment {
    pub adapter: Arc<dyn ProviderAdapter>,
    pub metrics: Vec<String>,
}

/// Result of `ProviderRegistry::select`
#[derive(Clone, Default)]
pub struct Selection {
    /// Metric -> eligible provider ids, highest priority first
    pub priorities: BTreeMap<String, Vec<String>>,
    pub assignments: Vec<Assignment>,
}

impl Selection {
    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }
}

struct Entry {
    adapter: Arc<dyn ProviderAdapter>,
    limiter: Option<RateLimiter>,
}

pub struct ProviderRegistry {
    config: RegistryConfig,
    entries: Vec<Entry>,
    health: RwLock<HashMap<String, ProviderHealth>>,
}

impl ProviderRegistry {
    pub fn new(config: RegistryConfig) -> Self {
        Self {
            config,
            entries: Vec::new(),
            health: RwLock::new(HashMap::new()),
        }
    }

    /// Add an adapter. Ids must be unique.
    pub fn register(&mut self, adapter: Arc<dyn ProviderAdapter>) -> EngineResult<()> {
        let id = adapter.id().to_string();
        if self.entries.iter().any(|e| e.adapter.id() == id) {
            return Err(EngineError::config(format!("provider '{}' registered twice", id)));
        }

        let limiter = adapter
            .min_request_interval()
            .filter(|interval| !interval.is_zero())
            .map(|interval| RateLimiter::new(id.clone(), interval));

        info!(
            provider = %id,
            capabilities = ?adapter.capabilities(),
            rate_limited = limiter.is_some(),
            "registered provider"
        );

        self.health.get_mut().insert(id, ProviderHealth::new());
        self.entries.push(Entry { adapter, limiter });
        Ok(())
    }

    pub fn with_adapter(mut self, adapter: Arc<dyn ProviderAdapter>) -> EngineResult<Self> {
        self.register(adapter)?;
        Ok(self)
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    pub fn provider_ids(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.adapter.id()).collect()
    }

    /// Union of all registered capabilities
    pub fn known_metrics(&self) -> BTreeSet<String> {
        self.entries
            .iter()
            .flat_map(|e| e.adapter.capabilities().iter().cloned())
            .collect()
    }

    /// Providers supplying `metric`, ordered by the configured priority for
    /// that metric, then the default priority, then registration order.
    /// Health is not considered.
    pub fn priority_for(&self, metric: &str) -> Vec<&str> {
        let explicit = self.config.metric_priority.get(metric);
        let rank = |id: &str| -> (usize, usize) {
            if let Some(pos) = explicit.and_then(|list| list.iter().position(|p| p == id)) {
                return (0, pos);
            }
            if let Some(pos) = self.config.default_priority.iter().position(|p| p == id) {
                return (1, pos);
            }
            (2, 0)
        };

        let mut ids: Vec<(usize, &str)> = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.adapter.supports(metric))
            .map(|(idx, e)| (idx, e.adapter.id()))
            .collect();
        // stable sort keeps registration order among equal ranks
        ids.sort_by_key(|(idx, id)| {
            let (tier, pos) = rank(*id);
            (tier, pos, *idx)
        });
        ids.into_iter().map(|(_, id)| id).collect()
    }

    /// Eligible, non-disabled adapters for `metrics`, plus the per-metric
    /// priority order used to break ties during merging.
    pub async fn select(&self, metrics: &[String]) -> Selection {
        let now = Instant::now();
        let eligible: BTreeSet<String> = {
            let mut health = self.health.write().await;
            health
                .iter_mut()
                .filter_map(|(id, h)| {
                    h.refresh(now);
                    (h.state != HealthState::Disabled).then(|| id.clone())
                })
                .collect()
        };

        let mut priorities = BTreeMap::new();
        for metric in metrics {
            let ordered: Vec<String> = self
                .priority_for(metric)
                .into_iter()
                .filter(|id| eligible.contains(*id))
                .map(str::to_string)
                .collect();
            priorities.insert(metric.clone(), ordered);
        }

        let assignments = self
            .entries
            .iter()
            .filter(|e| eligible.contains(e.adapter.id()))
            .filter_map(|e| {
                let wanted: Vec<String> = metrics
                    .iter()
                    .filter(|m| e.adapter.supports(m))
                    .cloned()
                    .collect();
                (!wanted.is_empty()).then(|| Assignment {
                    adapter: e.adapter.clone(),
                    metrics: wanted,
                })
            })
            .collect();

        Selection {
            priorities,
            assignments,
        }
    }

    /// Apply one completed call's outcome. Each call takes the write lock
    /// once, so concurrent aggregations never lose an update.
    pub async fn record(&self, provider: &str, outcome: FetchOutcome) {
        let now = Instant::now();
        let mut health = self.health.write().await;
        let Some(entry) = health.get_mut(provider) else {
            warn!(provider, "outcome recorded for unknown provider");
            return;
        };

        let before = entry.state;
        entry.apply(outcome, now, &self.config);
        if entry.state != before {
            info!(
                provider,
                from = ?before,
                to = ?entry.state,
                consecutive_errors = entry.consecutive_errors,
                consecutive_timeouts = entry.consecutive_timeouts,
                "provider health changed"
            );
        }
    }

    /// Reserve a rate-limit slot for `provider` that opens within `max_wait`.
    /// Unlimited providers always get `Some(Duration::ZERO)`.
    pub async fn reserve(&self, provider: &str, max_wait: Duration) -> Option<Duration> {
        let entry = self.entries.iter().find(|e| e.adapter.id() == provider)?;
        match &entry.limiter {
            Some(limiter) => limiter.try_reserve(max_wait).await,
            None => Some(Duration::ZERO),
        }
    }

    pub async fn health(&self, provider: &str) -> Option<HealthState> {
        let now = Instant::now();
        let mut health = self.health.write().await;
        health.get_mut(provider).map(|h| {
            h.refresh(now);
            h.state
        })
    }

    /// Health of every provider in registration order
    pub async fn health_report(&self) -> Vec<ProviderHealthReport> {
        let now = Instant::now();
        let mut health = self.health.write().await;
        self.entries
            .iter()
            .filter_map(|e| {
                let id = e.adapter.id();
                let h = health.get_mut(id)?;
                h.refresh(now);
                Some(ProviderHealthReport {
                    provider: id.to_string(),
                    state: h.state,
                    consecutive_errors: h.consecutive_errors,
                    consecutive_timeouts: h.consecutive_timeouts,
                    recent_successes: h.count(FetchOutcome::Success),
                    recent_partials: h.count(FetchOutcome::Partial),
                    recent_timeouts: h.count(FetchOutcome::Timeout),
                    recent_errors: h.count(FetchOutcome::Error),
                    capabilities: e.adapter.capabilities().iter().cloned().collect(),
                })
            })
            .collect()
    }
}
