//! Unit tests for RSI

use chainsignal::indicators::momentum::{calculate_rsi, Rsi};
use chainsignal::indicators::IndicatorCalculator;
use chainsignal::models::Vote;

#[test]
fn test_rsi_insufficient_data() {
    let values = vec![100.0; 10];
    assert!(calculate_rsi(&values, 14).is_none());
}

#[test]
fn test_rsi_only_gains_is_100() {
    let values: Vec<f64> = (0..20).map(|i| 100.0 + i as f64).collect();
    assert_eq!(calculate_rsi(&values, 14), Some(100.0));
}

#[test]
fn test_rsi_flat_series_is_neutral() {
    let values = vec![100.0; 20];
    assert_eq!(calculate_rsi(&values, 14), Some(50.0));
}

#[test]
fn test_rsi_balanced_changes() {
    // alternating +1 / -1 gives equal average gain and loss
    let values: Vec<f64> = (0..15).map(|i| if i % 2 == 0 { 100.0 } else { 101.0 }).collect();
    let rsi = calculate_rsi(&values, 14).unwrap();
    assert!((rsi - 50.0).abs() < 1e-9);
}

#[test]
fn test_rsi_vote_is_contrarian() {
    let rsi = Rsi::new(14, 30.0, 70.0);
    assert_eq!(rsi.min_history(), 15);

    let rising: Vec<f64> = (0..15).map(|i| 100.0 + i as f64).collect();
    let (value, vote) = rsi.evaluate(&rising).unwrap();
    assert_eq!(value, 100.0);
    assert_eq!(vote, Vote::Bearish);

    let falling: Vec<f64> = (0..15).map(|i| 100.0 - i as f64).collect();
    let (value, vote) = rsi.evaluate(&falling).unwrap();
    assert_eq!(value, 0.0);
    assert_eq!(vote, Vote::Bullish);
}
