//! End-to-end signal generation over the stub providers

use std::sync::Arc;
use std::time::Duration;

use chainsignal::config::EngineConfig;
use chainsignal::core::SignalPipeline;
use chainsignal::models::{metrics, SignalDirection};
use chainsignal::EngineError;
use chrono::Utc;

use crate::test_utils::{registry_with, StubAdapter};

const DEADLINE: Duration = Duration::from_secs(5);

#[tokio::test]
async fn single_valid_indicator_with_full_coverage_buys() {
    let onchain = Arc::new(StubAdapter::new("onchain", &[(metrics::MVRV, 0.8)]));
    let pipeline =
        SignalPipeline::new(EngineConfig::default(), registry_with(&["onchain"], vec![onchain])).unwrap();

    let signal = pipeline
        .get_signal("btc", &metrics::owned(&[metrics::MVRV]), DEADLINE)
        .await
        .unwrap();

    assert_eq!(signal.symbol, "BTC");
    assert_eq!(signal.direction, SignalDirection::Buy);
    assert_eq!(signal.strength, 1.0);
    assert_eq!(signal.confidence, 1.0);
    assert_eq!(signal.indicators.len(), 1);
    assert_eq!(signal.indicators[0].name, "mvrv");
    assert_eq!(signal.snapshot.value(metrics::MVRV), Some(0.8));
}

#[tokio::test]
async fn short_history_is_no_signal_rather_than_hold() {
    let market = Arc::new(StubAdapter::new("market", &[(metrics::PRICE, 100.0)]));
    let pipeline =
        SignalPipeline::new(EngineConfig::default(), registry_with(&["market"], vec![market])).unwrap();

    let err = pipeline
        .get_signal("BTC", &metrics::owned(&[metrics::PRICE]), DEADLINE)
        .await
        .unwrap_err();

    assert_eq!(
        err,
        EngineError::InsufficientIndicators {
            symbol: "BTC".to_string(),
            computed: 3
        }
    );
    assert_eq!(pipeline.history().len("BTC").await, 1, "snapshot still recorded");
}

#[tokio::test]
async fn price_indicators_become_valid_as_history_grows() {
    let market = Arc::new(StubAdapter::new("market", &[(metrics::PRICE, 100.0)]));
    let pipeline = SignalPipeline::new(
        EngineConfig::default(),
        registry_with(&["market"], vec![market.clone()]),
    )
    .unwrap();
    let requested = metrics::owned(&[metrics::PRICE]);

    let mut last = None;
    for step in 0..20 {
        market.set_value(metrics::PRICE, 100.0 + step as f64);
        let outcome = pipeline.get_signal("BTC", &requested, DEADLINE).await;
        // rsi needs 15 points
        assert_eq!(outcome.is_ok(), step >= 14, "step {step}");
        last = outcome.ok();
    }

    let signal = last.unwrap();
    assert_eq!(signal.indicators.len(), 3);
    // trend votes bullish twice, overbought rsi votes bearish once
    assert_eq!(signal.direction, SignalDirection::Buy);
    assert!((signal.strength - 1.0 / 3.0).abs() < 1e-12);
    assert_eq!(signal.confidence, 1.0);
    assert_eq!(pipeline.history().len("BTC").await, 20);
}

#[tokio::test]
async fn warm_up_makes_price_indicators_valid_on_first_signal() {
    let history: Vec<f64> = (0..25).map(|day| 100.0 + day as f64).collect();
    let market = Arc::new(
        StubAdapter::new("market", &[(metrics::PRICE, 125.0)])
            .with_fetched_at(Utc::now())
            .with_history(metrics::PRICE, &history),
    );
    let pipeline =
        SignalPipeline::new(EngineConfig::default(), registry_with(&["market"], vec![market])).unwrap();
    let requested = metrics::owned(&[metrics::PRICE]);

    let stored = pipeline.warm_up("BTC", &requested, DEADLINE).await.unwrap();
    assert_eq!(stored, 25);

    let signal = pipeline.get_signal("BTC", &requested, DEADLINE).await.unwrap();
    assert_eq!(signal.indicators.len(), 3);
    assert_eq!(signal.direction, SignalDirection::Buy);
    assert_eq!(pipeline.history().len("BTC").await, 26);

    let again = pipeline.warm_up("BTC", &requested, DEADLINE).await.unwrap();
    assert_eq!(again, 0, "days already seeded are skipped");
}

#[tokio::test]
async fn missing_metrics_lower_confidence_and_force_hold() {
    let onchain = Arc::new(StubAdapter::new("onchain", &[(metrics::MVRV, 0.8)]));
    let defi = Arc::new(
        StubAdapter::new("defi", &[(metrics::TVL, 1.0)]).with_status(crate::test_utils::error_status()),
    );
    let pipeline = SignalPipeline::new(
        EngineConfig::default(),
        registry_with(&["onchain", "defi"], vec![onchain, defi]),
    )
    .unwrap();

    let signal = pipeline
        .get_signal("BTC", &metrics::owned(&[metrics::MVRV, metrics::TVL]), DEADLINE)
        .await
        .unwrap();

    // half the metrics present, one of two indicators valid
    assert_eq!(signal.confidence, 0.25);
    assert_eq!(signal.strength, 1.0);
    assert_eq!(signal.direction, SignalDirection::Hold);
    assert!(!signal.snapshot.contains(metrics::TVL));
}

#[tokio::test]
async fn invalid_config_is_rejected() {
    let onchain = Arc::new(StubAdapter::new("onchain", &[(metrics::MVRV, 0.8)]));
    let mut config = EngineConfig::default();
    config.signal.min_confidence = 1.5;

    let result = SignalPipeline::new(config, registry_with(&["onchain"], vec![onchain]));
    assert!(matches!(result, Err(EngineError::Configuration(_))));
}
