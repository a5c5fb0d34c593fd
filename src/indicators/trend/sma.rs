//! SMA crossover indicator

use crate::common::math;
use crate::indicators::registry::IndicatorCalculator;
use crate::models::indicators::{IndicatorCategory, Vote};
use crate::models::metrics;

/// Relative spread of the fast SMA over the slow one, `fast / slow - 1`
pub fn check_sma_cross(values: &[f64], fast_period: usize, slow_period: usize) -> Option<f64> {
    let fast = math::sma(values, fast_period)?;
    let slow = math::sma(values, slow_period)?;
    math::relative_change(slow, fast)
}

pub struct SmaCross {
    fast: usize,
    slow: usize,
}

impl SmaCross {
    pub fn new(fast: usize, slow: usize) -> Self {
        Self { fast, slow }
    }
}

impl IndicatorCalculator for SmaCross {
    fn name(&self) -> &'static str {
        "sma_cross"
    }

    fn category(&self) -> IndicatorCategory {
        IndicatorCategory::Trend
    }

    fn source_metric(&self) -> &'static str {
        metrics::PRICE
    }

    fn min_history(&self) -> usize {
        self.slow.max(self.fast)
    }

    fn params(&self) -> Vec<(&'static str, f64)> {
        vec![("fast", self.fast as f64), ("slow", self.slow as f64)]
    }

    fn evaluate(&self, series: &[f64]) -> Option<(f64, Vote)> {
        let spread = check_sma_cross(series, self.fast, self.slow)?;
        Some((spread, Vote::from_band(spread, 0.0, 0.0)))
    }
}
