//! EMA (Exponential Moving Average) trend indicator

use crate::common::math;
use crate::indicators::registry::IndicatorCalculator;
use crate::models::indicators::{IndicatorCategory, Vote};
use crate::models::metrics;

/// Calculate EMA for a specific period
pub fn calculate_ema(values: &[f64], period: usize) -> Option<f64> {
    math::ema(values, period)
}

/// Latest price above its EMA is bullish, below is bearish
pub struct EmaTrend {
    period: usize,
}

impl EmaTrend {
    pub fn new(period: usize) -> Self {
        Self { period }
    }
}

impl IndicatorCalculator for EmaTrend {
    fn name(&self) -> &'static str {
        "ema_trend"
    }

    fn category(&self) -> IndicatorCategory {
        IndicatorCategory::Trend
    }

    fn source_metric(&self) -> &'static str {
        metrics::PRICE
    }

    fn min_history(&self) -> usize {
        self.period
    }

    fn params(&self) -> Vec<(&'static str, f64)> {
        vec![("period", self.period as f64)]
    }

    fn evaluate(&self, series: &[f64]) -> Option<(f64, Vote)> {
        let ema = calculate_ema(series, self.period)?;
        let price = *series.last()?;
        let vote = Vote::from_band(price, ema, ema);
        Some((ema, vote))
    }
}
