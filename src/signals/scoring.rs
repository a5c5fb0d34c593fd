//! Strength and confidence arithmetic

use crate::models::signal::SignalDirection;
use crate::models::snapshot::MarketSnapshot;

/// Weighted vote total and the sum of the weights that took part
pub fn weighted_vote(votes: &[(f64, f64)]) -> (f64, f64) {
    votes
        .iter()
        .fold((0.0, 0.0), |(sum, total), (weight, vote)| {
            (sum + weight * vote, total + weight)
        })
}

/// `|weighted sum| / total weight`, zero when no weight took part
pub fn strength(weighted_sum: f64, total_weight: f64) -> f64 {
    if total_weight <= 0.0 {
        return 0.0;
    }
    (weighted_sum.abs() / total_weight).min(1.0)
}

/// Sign of the weighted sum; exactly zero holds
pub fn direction_of(weighted_sum: f64) -> SignalDirection {
    if weighted_sum > 0.0 {
        SignalDirection::Buy
    } else if weighted_sum < 0.0 {
        SignalDirection::Sell
    } else {
        SignalDirection::Hold
    }
}

/// Fraction of requested metrics present in the snapshot
pub fn metric_coverage(requested: &[String], snapshot: &MarketSnapshot) -> f64 {
    if requested.is_empty() {
        return 1.0;
    }
    let present = requested.iter().filter(|m| snapshot.contains(m)).count();
    present as f64 / requested.len() as f64
}

pub fn fraction(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}

/// `per_metric * contested`, capped at 1
pub fn contested_penalty(contested: usize, per_metric: f64) -> f64 {
    (per_metric * contested as f64).clamp(0.0, 1.0)
}

/// `coverage * validity * (1 - penalty)`, clamped to 0..=1
pub fn calculate_confidence(coverage: f64, validity: f64, penalty: f64) -> f64 {
    (coverage * validity * (1.0 - penalty)).clamp(0.0, 1.0)
}
