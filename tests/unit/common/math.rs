//! Unit tests for shared numeric helpers

use chainsignal::common::math::{ema, relative_change, sma};

#[test]
fn test_sma_uses_last_period_values() {
    let values = [1.0, 2.0, 3.0, 4.0, 5.0];
    assert_eq!(sma(&values, 2), Some(4.5));
    assert_eq!(sma(&values, 5), Some(3.0));
}

#[test]
fn test_sma_insufficient_data() {
    assert!(sma(&[1.0, 2.0], 3).is_none());
    assert!(sma(&[1.0, 2.0], 0).is_none());
}

#[test]
fn test_ema_constant_series_equals_value() {
    let values = vec![42.0; 30];
    let result = ema(&values, 10).unwrap();
    assert!((result - 42.0).abs() < 1e-9);
}

#[test]
fn test_ema_follows_trend() {
    let values: Vec<f64> = (0..40).map(|i| 100.0 + i as f64).collect();
    let result = ema(&values, 10).unwrap();
    assert!(result < 139.0, "EMA lags a rising series");
    assert!(result > sma(&values, 40).unwrap());
}

#[test]
fn test_relative_change() {
    assert_eq!(relative_change(100.0, 110.0), Some(0.1));
    assert_eq!(relative_change(-100.0, -90.0), Some(0.1));
    assert!(relative_change(0.0, 5.0).is_none());
    assert!(relative_change(1.0, f64::NAN).is_none());
}
