//! Network activity and exchange flow indicators

use crate::common::math;
use crate::indicators::registry::IndicatorCalculator;
use crate::models::indicators::{IndicatorCategory, Vote};
use crate::models::metrics;

/// Net coins moving onto exchanges. Inflow (positive) is read as sell
/// pressure, outflow as accumulation.
pub struct ExchangeNetflow;

impl IndicatorCalculator for ExchangeNetflow {
    fn name(&self) -> &'static str {
        "exchange_netflow"
    }

    fn category(&self) -> IndicatorCategory {
        IndicatorCategory::OnChain
    }

    fn source_metric(&self) -> &'static str {
        metrics::EXCHANGE_NETFLOW
    }

    fn min_history(&self) -> usize {
        1
    }

    fn params(&self) -> Vec<(&'static str, f64)> {
        Vec::new()
    }

    fn evaluate(&self, series: &[f64]) -> Option<(f64, Vote)> {
        let latest = *series.last()?;
        Some((latest, Vote::from_band(latest, 0.0, 0.0).inverted()))
    }
}

/// Relative change of active addresses over `period` points
pub struct ActiveAddressesDelta {
    period: usize,
    threshold: f64,
}

impl ActiveAddressesDelta {
    pub fn new(period: usize, threshold: f64) -> Self {
        Self { period, threshold }
    }
}

impl IndicatorCalculator for ActiveAddressesDelta {
    fn name(&self) -> &'static str {
        "active_addresses_delta"
    }

    fn category(&self) -> IndicatorCategory {
        IndicatorCategory::OnChain
    }

    fn source_metric(&self) -> &'static str {
        metrics::ACTIVE_ADDRESSES
    }

    fn min_history(&self) -> usize {
        self.period + 1
    }

    fn params(&self) -> Vec<(&'static str, f64)> {
        vec![("period", self.period as f64), ("threshold", self.threshold)]
    }

    fn evaluate(&self, series: &[f64]) -> Option<(f64, Vote)> {
        let latest = *series.last()?;
        let base = *series.iter().rev().nth(self.period)?;
        let change = math::relative_change(base, latest)?;
        Some((change, Vote::from_band(change, -self.threshold, self.threshold)))
    }
}
