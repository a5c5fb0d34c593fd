//! Unit tests for the indicator engine

use std::collections::BTreeMap;
use std::time::Duration;

use chainsignal::config::IndicatorConfig;
use chainsignal::indicators::engine::metric_series;
use chainsignal::indicators::IndicatorEngine;
use chainsignal::models::{metrics, MarketSnapshot, MetricValue, Vote};
use chrono::{TimeZone, Utc};

fn snapshot(index: i64, values: &[(&str, f64)]) -> MarketSnapshot {
    let metrics = values
        .iter()
        .map(|(name, value)| {
            (
                name.to_string(),
                MetricValue {
                    value: *value,
                    source: "test".to_string(),
                    staleness: Duration::ZERO,
                    contested: false,
                },
            )
        })
        .collect::<BTreeMap<_, _>>();
    let timestamp = Utc.timestamp_opt(1_700_000_000 + index * 60, 0).unwrap();
    MarketSnapshot::new("BTC", timestamp, metrics).unwrap()
}

fn price_window(count: usize) -> Vec<MarketSnapshot> {
    (0..count)
        .map(|i| snapshot(i as i64, &[(metrics::PRICE, 100.0 + i as f64)]))
        .collect()
}

#[test]
fn test_single_snapshot_invalidates_history_indicators() {
    let engine = IndicatorEngine::new(IndicatorConfig::default());
    let window = vec![snapshot(0, &[(metrics::PRICE, 100.0), (metrics::MVRV, 3.5)])];
    let requested = metrics::owned(&[metrics::PRICE, metrics::MVRV]);

    let indicators = engine.compute(&window, &requested);
    let by_name = |name: &str| indicators.iter().find(|i| i.name == name).unwrap();

    assert!(!by_name("rsi").valid);
    assert!(by_name("rsi").value.is_none());
    assert!(!by_name("sma_cross").valid);
    assert!(!by_name("ema_trend").valid);

    let mvrv = by_name("mvrv");
    assert!(mvrv.valid);
    assert_eq!(mvrv.value, Some(3.5));
    assert_eq!(mvrv.vote, Vote::Bearish);
}

#[test]
fn test_only_requested_metrics_are_computed() {
    let engine = IndicatorEngine::new(IndicatorConfig::default());
    let window = vec![snapshot(0, &[(metrics::NVT, 10.0)])];

    let indicators = engine.compute(&window, &metrics::owned(&[metrics::NVT]));
    assert_eq!(indicators.len(), 1);
    assert_eq!(indicators[0].name, "nvt");
    assert_eq!(indicators[0].vote, Vote::Bullish);
}

#[test]
fn test_indicator_params_recorded() {
    let engine = IndicatorEngine::new(IndicatorConfig::default());
    let indicators = engine.compute(&price_window(30), &metrics::owned(&[metrics::PRICE]));

    let rsi = indicators.iter().find(|i| i.name == "rsi").unwrap();
    assert!(rsi.valid);
    assert_eq!(rsi.params.get("period"), Some(&14.0));
    assert_eq!(rsi.params.get("min_history"), Some(&15.0));
}

#[test]
fn test_compute_is_deterministic() {
    let engine = IndicatorEngine::new(IndicatorConfig::default());
    let window = price_window(25);
    let requested = metrics::owned(&[metrics::PRICE]);

    assert_eq!(engine.compute(&window, &requested), engine.compute(&window, &requested));
}

#[test]
fn test_metric_series_requires_latest_value() {
    let window = vec![
        snapshot(0, &[(metrics::TVL, 1.0)]),
        snapshot(1, &[(metrics::PRICE, 2.0)]),
    ];
    assert!(metric_series(&window, metrics::TVL).is_none());
    assert_eq!(metric_series(&window, metrics::PRICE), Some(vec![2.0]));
}

#[test]
fn test_series_skips_gaps() {
    let window = vec![
        snapshot(0, &[(metrics::TVL, 100.0)]),
        snapshot(1, &[(metrics::PRICE, 2.0)]),
        snapshot(2, &[(metrics::TVL, 110.0)]),
    ];
    assert_eq!(metric_series(&window, metrics::TVL), Some(vec![100.0, 110.0]));
}
