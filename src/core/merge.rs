//! Per-metric merge of provider results.
//!
//! The value of the highest-priority `ok` provider wins and only other `ok`
//! providers can contest it. A `partial` result fills a metric no `ok`
//! provider supplied. Values are never averaged and missing metrics are
//! never defaulted.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::error::EngineResult;
use crate::models::snapshot::{FetchStatus, MarketSnapshot, MetricValue, ProviderResult};

#[derive(Debug, Clone, PartialEq)]
pub struct MergedMetric {
    pub value: f64,
    pub source: String,
    pub fetched_at: DateTime<Utc>,
    pub contested: bool,
}

/// `|a - b| / max(|a|, |b|)`, zero when both are zero
pub fn relative_difference(a: f64, b: f64) -> f64 {
    let scale = a.abs().max(b.abs());
    if scale == 0.0 {
        0.0
    } else {
        (a - b).abs() / scale
    }
}

/// Merge `results` for every metric in `requested`.
///
/// `priorities` maps each metric to provider ids, highest priority first.
/// Metrics nobody supplied are absent from the output.
pub fn merge_results(
    requested: &[String],
    priorities: &BTreeMap<String, Vec<String>>,
    results: &[ProviderResult],
    tolerance: f64,
) -> BTreeMap<String, MergedMetric> {
    let mut merged = BTreeMap::new();

    for metric in requested {
        let Some(order) = priorities.get(metric) else {
            continue;
        };

        let candidates: Vec<(&ProviderResult, f64)> = order
            .iter()
            .filter_map(|provider| {
                results
                    .iter()
                    .find(|r| &r.provider == provider)
                    .and_then(|r| r.usable_value(metric).map(|v| (r, v)))
            })
            .collect();

        let mut complete = candidates
            .iter()
            .filter(|(r, _)| r.status == FetchStatus::Ok);

        let (winner, value, contested) = match complete.next() {
            Some(&(winner, value)) => {
                let contested =
                    complete.any(|(_, other)| relative_difference(value, *other) > tolerance);
                (winner, value, contested)
            }
            None => match candidates.first() {
                Some(&(winner, value)) => (winner, value, false),
                None => continue,
            },
        };

        merged.insert(
            metric.clone(),
            MergedMetric {
                value,
                source: winner.provider.clone(),
                fetched_at: winner.fetched_at,
                contested,
            },
        );
    }

    merged
}

/// Turn merged metrics into a snapshot.
///
/// The timestamp is the newest contributing fetch time, clamped to
/// `previous` so successive snapshots of a symbol never go backwards.
pub fn build_snapshot(
    symbol: &str,
    merged: BTreeMap<String, MergedMetric>,
    previous: Option<DateTime<Utc>>,
) -> EngineResult<MarketSnapshot> {
    let newest = merged.values().map(|m| m.fetched_at).max();
    let timestamp = match (newest, previous) {
        (Some(newest), Some(previous)) => newest.max(previous),
        (Some(newest), None) => newest,
        (None, Some(previous)) => previous,
        (None, None) => Utc::now(),
    };

    let metrics = merged
        .into_iter()
        .map(|(name, m)| {
            let staleness = (timestamp - m.fetched_at).to_std().unwrap_or_default();
            (
                name,
                MetricValue {
                    value: m.value,
                    source: m.source,
                    staleness,
                    contested: m.contested,
                },
            )
        })
        .collect();

    MarketSnapshot::new(symbol, timestamp, metrics)
}
