//! Provider adapter contract shared by every external data source.

use std::collections::{BTreeSet, HashMap};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::{ProviderContractError, ProviderFetchError};
use crate::models::snapshot::{HistoricalPoint, ProviderResult};
use crate::models::symbol;

/// Wraps one external data provider and translates its responses into the
/// canonical metric schema.
///
/// Ordinary network and API failures are reported through the returned
/// `ProviderResult` status; only contract violations (malformed symbol,
/// metric outside `capabilities`) come back as `Err`.
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    /// Stable identifier, also used in priority lists
    fn id(&self) -> &str;

    /// Metric names this provider can supply
    fn capabilities(&self) -> &BTreeSet<String>;

    /// Minimum spacing between requests, if the provider is rate limited
    fn min_request_interval(&self) -> Option<Duration> {
        None
    }

    /// Fetch `metrics` for a canonical `symbol`, finishing within `deadline`
    async fn fetch(
        &self,
        symbol: &str,
        metrics: &[String],
        deadline: Duration,
    ) -> Result<ProviderResult, ProviderContractError>;

    fn supports(&self, metric: &str) -> bool {
        self.capabilities().contains(metric)
    }

    /// Whether `fetch_history` can serve `metric`
    fn supports_history(&self, _metric: &str) -> bool {
        false
    }

    /// Daily values of `metric` for a canonical `symbol` between `start` and
    /// `end` inclusive, oldest first.
    async fn fetch_history(
        &self,
        _symbol: &str,
        metric: &str,
        _start: DateTime<Utc>,
        _end: DateTime<Utc>,
        _deadline: Duration,
    ) -> Result<Vec<HistoricalPoint>, ProviderFetchError> {
        Err(ProviderFetchError::HistoryUnsupported(metric.to_string()))
    }
}

/// Check a fetch request against the adapter contract
pub fn check_request(
    adapter: &dyn ProviderAdapter,
    symbol: &str,
    metrics: &[String],
) -> Result<(), ProviderContractError> {
    if !symbol::is_canonical(symbol) {
        return Err(ProviderContractError::InvalidSymbol(symbol.to_string()));
    }
    if let Some(metric) = metrics.iter().find(|m| !adapter.supports(m)) {
        return Err(ProviderContractError::UnsupportedMetric {
            provider: adapter.id().to_string(),
            metric: metric.clone(),
        });
    }
    Ok(())
}

/// Fold per-metric outcomes into one `ProviderResult`.
///
/// All succeeded -> `ok`; some succeeded -> `partial`; none succeeded ->
/// `unavailable` when every failure was a timeout, `error` otherwise.
pub fn collect_metric_outcomes(
    provider: &str,
    outcomes: Vec<(String, Result<f64, ProviderFetchError>)>,
    fetched_at: DateTime<Utc>,
) -> ProviderResult {
    let mut values = HashMap::new();
    let mut failures: Vec<(String, ProviderFetchError)> = Vec::new();

    for (metric, outcome) in outcomes {
        match outcome {
            Ok(value) if value.is_finite() => {
                values.insert(metric, value);
            }
            Ok(_) => failures.push((metric.clone(), ProviderFetchError::MissingValue(metric))),
            Err(err) => failures.push((metric, err)),
        }
    }

    if failures.is_empty() {
        return ProviderResult::ok(provider, values, fetched_at);
    }

    let reason = failures
        .iter()
        .map(|(metric, err)| format!("{}: {}", metric, err))
        .collect::<Vec<_>>()
        .join("; ");

    if !values.is_empty() {
        ProviderResult::partial(provider, values, fetched_at, reason)
    } else if failures.iter().all(|(_, err)| err.is_timeout()) {
        ProviderResult::unavailable(provider, reason)
    } else {
        ProviderResult::error(provider, reason)
    }
}
