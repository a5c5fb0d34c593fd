//! Concurrent provider fan-out and merge into a `MarketSnapshot`

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, NaiveTime, TimeZone, Utc};
use futures_util::future::join_all;
use futures_util::stream::{FuturesUnordered, StreamExt};
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::config::AggregatorConfig;
use crate::core::merge::{build_snapshot, merge_results};
use crate::error::{EngineError, EngineResult, ProviderContractError};
use crate::models::snapshot::{HistoricalPoint, MarketSnapshot, MetricValue, ProviderResult};
use crate::models::symbol::normalize_symbol;
use crate::services::registry::{FetchOutcome, ProviderRegistry, Selection};

enum Dispatch {
    Completed(Result<ProviderResult, ProviderContractError>),
    TimedOut,
}

struct Gathered {
    symbol: String,
    requested: Vec<String>,
    selection: Selection,
    results: Vec<ProviderResult>,
}

pub struct Aggregator {
    config: AggregatorConfig,
    registry: Arc<ProviderRegistry>,
    /// Newest snapshot timestamp handed out per symbol
    last_timestamps: Mutex<HashMap<String, DateTime<Utc>>>,
}

impl Aggregator {
    pub fn new(config: AggregatorConfig, registry: Arc<ProviderRegistry>) -> Self {
        Self {
            config,
            registry,
            last_timestamps: Mutex::new(HashMap::new()),
        }
    }

    pub fn registry(&self) -> &Arc<ProviderRegistry> {
        &self.registry
    }

    /// Canonical symbol plus the de-duplicated, sorted metric list.
    /// Unknown metrics and malformed symbols are configuration errors.
    pub fn validate_request(
        &self,
        symbol: &str,
        metrics: &[String],
    ) -> EngineResult<(String, Vec<String>)> {
        let symbol = normalize_symbol(symbol)?;

        let requested: BTreeSet<String> = metrics.iter().map(|m| m.trim().to_string()).collect();
        if requested.is_empty() {
            return Err(EngineError::config("no metrics requested"));
        }

        let known = self.registry.known_metrics();
        if let Some(unknown) = requested.iter().find(|m| !known.contains(*m)) {
            return Err(EngineError::config(format!(
                "no registered provider supplies metric '{}'",
                unknown
            )));
        }

        Ok((symbol, requested.into_iter().collect()))
    }

    /// Fetch `metrics` for `symbol` from every eligible provider and merge.
    ///
    /// Returns `InsufficientData` when no metric could be merged. Dropping the
    /// returned future cancels all outstanding provider calls; calls that had
    /// not completed leave registry health untouched.
    pub async fn aggregate(
        &self,
        symbol: &str,
        metrics: &[String],
        overall_deadline: Duration,
    ) -> EngineResult<MarketSnapshot> {
        let Gathered {
            symbol,
            requested,
            selection,
            results,
        } = self.gather(symbol, metrics, overall_deadline).await?;
        let merged = merge_results(
            &requested,
            &selection.priorities,
            &results,
            self.config.relative_tolerance,
        );

        if merged.is_empty() {
            warn!(
                symbol = %symbol,
                providers = results.len(),
                "aggregation produced no usable metrics"
            );
            return Err(EngineError::insufficient_data(symbol));
        }

        let snapshot = {
            let mut last = self.last_timestamps.lock().await;
            let snapshot = build_snapshot(&symbol, merged, last.get(&symbol).copied())?;
            last.insert(symbol.clone(), snapshot.timestamp());
            snapshot
        };

        info!(
            symbol = %symbol,
            requested = requested.len(),
            merged = snapshot.len(),
            contested = ?snapshot.contested_metrics(),
            providers = results.len(),
            ok = results.iter().filter(|r| r.status.is_usable()).count(),
            "aggregation complete"
        );

        Ok(snapshot)
    }

    /// Per-provider results of one fan-out, without merging. Health is
    /// recorded exactly as `aggregate` records it.
    pub async fn collect_results(
        &self,
        symbol: &str,
        metrics: &[String],
        overall_deadline: Duration,
    ) -> EngineResult<Vec<ProviderResult>> {
        Ok(self.gather(symbol, metrics, overall_deadline).await?.results)
    }

    async fn gather(
        &self,
        symbol: &str,
        metrics: &[String],
        overall_deadline: Duration,
    ) -> EngineResult<Gathered> {
        let (symbol, requested) = self.validate_request(symbol, metrics)?;
        let deadline_at = Instant::now() + overall_deadline;

        let selection = self.registry.select(&requested).await;
        if selection.is_empty() {
            warn!(symbol = %symbol, "no eligible providers, all disabled");
        }

        let results = self.collect(&symbol, &selection, deadline_at).await?;
        Ok(Gathered {
            symbol,
            requested,
            selection,
            results,
        })
    }

    async fn collect(
        &self,
        symbol: &str,
        selection: &Selection,
        deadline_at: Instant,
    ) -> EngineResult<Vec<ProviderResult>> {
        let mut results = Vec::with_capacity(selection.assignments.len());
        let mut pending = FuturesUnordered::new();

        for assignment in &selection.assignments {
            let id = assignment.adapter.id().to_string();
            let remaining = deadline_at.saturating_duration_since(Instant::now());
            let budget = self
                .config
                .provider_timeout
                .map_or(remaining, |cap| cap.min(remaining));

            if budget.is_zero() {
                debug!(provider = %id, "deadline elapsed before dispatch");
                self.registry.record(&id, FetchOutcome::Timeout).await;
                results.push(ProviderResult::unavailable(&id, "deadline elapsed before dispatch"));
                continue;
            }

            let Some(wait) = self.registry.reserve(&id, budget).await else {
                results.push(ProviderResult::unavailable(&id, "rate limited"));
                continue;
            };

            let expires_at = Instant::now() + budget;
            let adapter = assignment.adapter.clone();
            let metrics = assignment.metrics.clone();
            let symbol = symbol.to_string();
            pending.push(async move {
                let call = async {
                    if !wait.is_zero() {
                        tokio::time::sleep(wait).await;
                    }
                    let remaining = expires_at.saturating_duration_since(Instant::now());
                    adapter.fetch(&symbol, &metrics, remaining).await
                };
                let dispatch = match tokio::time::timeout_at(expires_at, call).await {
                    Ok(outcome) => Dispatch::Completed(outcome),
                    Err(_) => Dispatch::TimedOut,
                };
                (id, dispatch)
            });
        }

        while let Some((id, dispatch)) = pending.next().await {
            let mut result = match dispatch {
                Dispatch::Completed(Ok(result)) => result,
                Dispatch::Completed(Err(violation)) => {
                    warn!(provider = %id, error = %violation, "provider contract violation");
                    return Err(violation.into());
                }
                Dispatch::TimedOut => ProviderResult::unavailable(&id, "deadline exceeded"),
            };
            result.provider = id.clone();

            self.registry
                .record(&id, FetchOutcome::from_status(&result.status))
                .await;
            if let Some(reason) = result.status.reason() {
                warn!(provider = %id, symbol, reason, "provider fetch incomplete");
            }
            results.push(result);
        }

        Ok(results)
    }

    /// Daily snapshots of `metrics` for `symbol` between `start` and `end`,
    /// oldest first, from provider history endpoints.
    ///
    /// Each metric takes the first non-empty series in priority order among
    /// providers that serve its history. Days are UTC-aligned and nothing is
    /// contested. Metrics without history are simply absent; registry health
    /// is not touched.
    pub async fn backfill(
        &self,
        symbol: &str,
        metrics: &[String],
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        overall_deadline: Duration,
    ) -> EngineResult<Vec<MarketSnapshot>> {
        let (symbol, requested) = self.validate_request(symbol, metrics)?;
        if start > end {
            return Err(EngineError::config(format!(
                "backfill start {} is after end {}",
                start, end
            )));
        }
        let deadline_at = Instant::now() + overall_deadline;
        let selection = self.registry.select(&requested).await;

        let series = join_all(requested.iter().map(|metric| {
            self.metric_history(&symbol, metric, &selection, start, end, deadline_at)
        }))
        .await;

        let mut days: BTreeMap<DateTime<Utc>, BTreeMap<String, MetricValue>> = BTreeMap::new();
        for (metric, found) in requested.iter().zip(series) {
            let Some((source, points)) = found else {
                continue;
            };
            for point in points {
                let day = Utc.from_utc_datetime(&point.timestamp.date_naive().and_time(NaiveTime::MIN));
                days.entry(day).or_default().insert(
                    metric.clone(),
                    MetricValue {
                        value: point.value,
                        source: source.clone(),
                        staleness: Duration::ZERO,
                        contested: false,
                    },
                );
            }
        }

        let snapshots = days
            .into_iter()
            .map(|(day, values)| MarketSnapshot::new(&symbol, day, values))
            .collect::<EngineResult<Vec<_>>>()?;

        info!(
            symbol = %symbol,
            requested = requested.len(),
            days = snapshots.len(),
            "history backfill complete"
        );
        Ok(snapshots)
    }

    async fn metric_history(
        &self,
        symbol: &str,
        metric: &str,
        selection: &Selection,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        deadline_at: Instant,
    ) -> Option<(String, Vec<HistoricalPoint>)> {
        let order = selection.priorities.get(metric)?;
        for id in order {
            let Some(assignment) = selection.assignments.iter().find(|a| a.adapter.id() == id) else {
                continue;
            };
            let adapter = &assignment.adapter;
            if !adapter.supports_history(metric) {
                continue;
            }

            let budget = deadline_at.saturating_duration_since(Instant::now());
            let budget = self
                .config
                .provider_timeout
                .map_or(budget, |cap| cap.min(budget));
            if budget.is_zero() {
                debug!(provider = %id, metric, "deadline elapsed before history request");
                return None;
            }
            let Some(wait) = self.registry.reserve(id, budget).await else {
                debug!(provider = %id, metric, "history request rate limited");
                continue;
            };

            let expires_at = Instant::now() + budget;
            let call = async {
                if !wait.is_zero() {
                    tokio::time::sleep(wait).await;
                }
                let remaining = expires_at.saturating_duration_since(Instant::now());
                adapter.fetch_history(symbol, metric, start, end, remaining).await
            };
            match tokio::time::timeout_at(expires_at, call).await {
                Ok(Ok(points)) if !points.is_empty() => {
                    debug!(provider = %id, metric, points = points.len(), "history received");
                    return Some((id.clone(), points));
                }
                Ok(Ok(_)) => debug!(provider = %id, metric, "empty history"),
                Ok(Err(err)) => warn!(provider = %id, metric, error = %err, "history fetch failed"),
                Err(_) => warn!(provider = %id, metric, "history fetch timed out"),
            }
        }
        None
    }
}
