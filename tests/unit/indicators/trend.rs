//! Unit tests for EMA and SMA trend indicators

use chainsignal::indicators::trend::{calculate_ema, check_sma_cross, EmaTrend, SmaCross};
use chainsignal::indicators::IndicatorCalculator;
use chainsignal::models::Vote;

fn rising(count: usize) -> Vec<f64> {
    (0..count).map(|i| 100.0 + i as f64 * 0.5).collect()
}

#[test]
fn test_ema_insufficient_data() {
    assert!(calculate_ema(&rising(10), 20).is_none());
}

#[test]
fn test_ema_sufficient_data() {
    let ema = calculate_ema(&rising(50), 12).unwrap();
    assert!(ema.is_finite());
}

#[test]
fn test_ema_trend_votes_with_price() {
    let indicator = EmaTrend::new(5);
    let (_, vote) = indicator.evaluate(&rising(10)).unwrap();
    assert_eq!(vote, Vote::Bullish);

    let falling: Vec<f64> = rising(10).into_iter().rev().collect();
    let (_, vote) = indicator.evaluate(&falling).unwrap();
    assert_eq!(vote, Vote::Bearish);
}

#[test]
fn test_sma_cross_spread() {
    let spread = check_sma_cross(&rising(20), 5, 20).unwrap();
    assert!(spread > 0.0);

    let flat = vec![10.0; 20];
    assert_eq!(check_sma_cross(&flat, 5, 20), Some(0.0));
}

#[test]
fn test_sma_cross_flat_is_neutral() {
    let indicator = SmaCross::new(5, 20);
    assert_eq!(indicator.min_history(), 20);
    let (_, vote) = indicator.evaluate(&vec![10.0; 20]).unwrap();
    assert_eq!(vote, Vote::Neutral);
}
