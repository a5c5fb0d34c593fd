//! Unit tests for signal scoring arithmetic

use chainsignal::models::SignalDirection;
use chainsignal::signals::scoring::{
    calculate_confidence, contested_penalty, direction_of, fraction, strength, weighted_vote,
};

#[test]
fn test_weighted_vote() {
    let (sum, total) = weighted_vote(&[(1.0, 1.0), (2.0, -1.0), (0.5, 0.0)]);
    assert_eq!(sum, -1.0);
    assert_eq!(total, 3.5);
}

#[test]
fn test_strength_bounds() {
    assert_eq!(strength(2.0, 2.0), 1.0);
    assert_eq!(strength(-1.0, 4.0), 0.25);
    assert_eq!(strength(1.0, 0.0), 0.0);
}

#[test]
fn test_direction_of() {
    assert_eq!(direction_of(0.5), SignalDirection::Buy);
    assert_eq!(direction_of(-0.5), SignalDirection::Sell);
    assert_eq!(direction_of(0.0), SignalDirection::Hold);
}

#[test]
fn test_fraction() {
    assert_eq!(fraction(1, 4), 0.25);
    assert_eq!(fraction(0, 0), 0.0);
}

#[test]
fn test_contested_penalty_capped() {
    assert_eq!(contested_penalty(0, 0.1), 0.0);
    assert!((contested_penalty(2, 0.1) - 0.2).abs() < 1e-12);
    assert_eq!(contested_penalty(20, 0.1), 1.0);
}

#[test]
fn test_confidence_product() {
    assert_eq!(calculate_confidence(1.0, 1.0, 0.0), 1.0);
    assert!((calculate_confidence(0.5, 0.5, 0.2) - 0.2).abs() < 1e-12);
    assert_eq!(calculate_confidence(1.0, 1.0, 1.0), 0.0);
}
