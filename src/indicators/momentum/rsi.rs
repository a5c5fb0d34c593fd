//! RSI (Relative Strength Index) over the merged price series

use crate::indicators::registry::IndicatorCalculator;
use crate::models::indicators::{IndicatorCategory, Vote};
use crate::models::metrics;

/// Calculate RSI over the last `period` changes
///
/// RSI = 100 - (100 / (1 + RS))
/// RS = Average Gain / Average Loss
pub fn calculate_rsi(values: &[f64], period: usize) -> Option<f64> {
    if period == 0 || values.len() < period + 1 {
        return None;
    }

    let changes: Vec<f64> = values.windows(2).map(|w| w[1] - w[0]).collect();
    let recent = &changes[changes.len() - period..];

    let avg_gain = recent.iter().filter(|c| **c > 0.0).sum::<f64>() / period as f64;
    let avg_loss = recent.iter().filter(|c| **c < 0.0).map(|c| c.abs()).sum::<f64>() / period as f64;

    if avg_loss == 0.0 {
        // flat series has no momentum either way
        return Some(if avg_gain == 0.0 { 50.0 } else { 100.0 });
    }

    let rs = avg_gain / avg_loss;
    Some(100.0 - (100.0 / (1.0 + rs)))
}

pub struct Rsi {
    period: usize,
    oversold: f64,
    overbought: f64,
}

impl Rsi {
    pub fn new(period: usize, oversold: f64, overbought: f64) -> Self {
        Self {
            period,
            oversold,
            overbought,
        }
    }
}

impl IndicatorCalculator for Rsi {
    fn name(&self) -> &'static str {
        "rsi"
    }

    fn category(&self) -> IndicatorCategory {
        IndicatorCategory::Momentum
    }

    fn source_metric(&self) -> &'static str {
        metrics::PRICE
    }

    fn min_history(&self) -> usize {
        self.period + 1
    }

    fn params(&self) -> Vec<(&'static str, f64)> {
        vec![
            ("period", self.period as f64),
            ("oversold", self.oversold),
            ("overbought", self.overbought),
        ]
    }

    fn evaluate(&self, series: &[f64]) -> Option<(f64, Vote)> {
        let rsi = calculate_rsi(series, self.period)?;
        // oversold is bullish, overbought bearish
        let vote = Vote::from_band(rsi, self.oversold, self.overbought).inverted();
        Some((rsi, vote))
    }
}
