//! On-chain valuation ratios (MVRV, SOPR, NVT).
//!
//! Each reads the latest value: below the low band is undervalued (bullish),
//! above the high band overvalued (bearish).

use crate::indicators::registry::IndicatorCalculator;
use crate::models::indicators::{IndicatorCategory, Vote};
use crate::models::metrics;

pub struct ValuationBand {
    name: &'static str,
    metric: &'static str,
    low: f64,
    high: f64,
}

impl ValuationBand {
    pub fn new(name: &'static str, metric: &'static str, low: f64, high: f64) -> Self {
        Self {
            name,
            metric,
            low,
            high,
        }
    }

    pub fn mvrv(low: f64, high: f64) -> Self {
        Self::new("mvrv", metrics::MVRV, low, high)
    }

    pub fn sopr(low: f64, high: f64) -> Self {
        Self::new("sopr", metrics::SOPR, low, high)
    }

    pub fn nvt(low: f64, high: f64) -> Self {
        Self::new("nvt", metrics::NVT, low, high)
    }
}

impl IndicatorCalculator for ValuationBand {
    fn name(&self) -> &'static str {
        self.name
    }

    fn category(&self) -> IndicatorCategory {
        IndicatorCategory::OnChain
    }

    fn source_metric(&self) -> &'static str {
        self.metric
    }

    fn min_history(&self) -> usize {
        1
    }

    fn params(&self) -> Vec<(&'static str, f64)> {
        vec![("low", self.low), ("high", self.high)]
    }

    fn evaluate(&self, series: &[f64]) -> Option<(f64, Vote)> {
        let latest = *series.last()?;
        Some((latest, Vote::from_band(latest, self.low, self.high).inverted()))
    }
}
