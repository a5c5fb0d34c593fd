//! DeFi total value locked delta

use crate::common::math;
use crate::indicators::registry::IndicatorCalculator;
use crate::models::indicators::{IndicatorCategory, Vote};
use crate::models::metrics;

/// Relative TVL change between the point `period` steps back and the latest
pub fn calculate_tvl_delta(values: &[f64], period: usize) -> Option<f64> {
    if values.len() < period + 1 {
        return None;
    }
    let latest = values[values.len() - 1];
    let base = values[values.len() - 1 - period];
    math::relative_change(base, latest)
}

/// Capital flowing into the protocol is bullish, flowing out bearish
pub struct TvlDelta {
    period: usize,
    threshold: f64,
}

impl TvlDelta {
    pub fn new(period: usize, threshold: f64) -> Self {
        Self { period, threshold }
    }
}

impl IndicatorCalculator for TvlDelta {
    fn name(&self) -> &'static str {
        "tvl_delta"
    }

    fn category(&self) -> IndicatorCategory {
        IndicatorCategory::DeFi
    }

    fn source_metric(&self) -> &'static str {
        metrics::TVL
    }

    fn min_history(&self) -> usize {
        self.period + 1
    }

    fn params(&self) -> Vec<(&'static str, f64)> {
        vec![("period", self.period as f64), ("threshold", self.threshold)]
    }

    fn evaluate(&self, series: &[f64]) -> Option<(f64, Vote)> {
        let delta = calculate_tvl_delta(series, self.period)?;
        Some((delta, Vote::from_band(delta, -self.threshold, self.threshold)))
    }
}
