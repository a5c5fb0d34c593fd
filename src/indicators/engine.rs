//! Runs the indicator set over a window of snapshots.
//!
//! Pure and deterministic: the same window and request always yield the same
//! indicators in the same order.

use crate::config::IndicatorConfig;
use crate::models::indicators::Indicator;
use crate::models::snapshot::MarketSnapshot;

use super::registry::{default_indicators, IndicatorCalculator};

pub struct IndicatorEngine {
    calculators: Vec<Box<dyn IndicatorCalculator>>,
}

impl IndicatorEngine {
    pub fn new(config: IndicatorConfig) -> Self {
        Self {
            calculators: default_indicators(&config),
        }
    }

    pub fn with_calculators(calculators: Vec<Box<dyn IndicatorCalculator>>) -> Self {
        Self { calculators }
    }

    /// Names of every indicator the engine can compute
    pub fn names(&self) -> Vec<&'static str> {
        self.calculators.iter().map(|c| c.name()).collect()
    }

    /// Compute every indicator whose source metric is in `requested`.
    ///
    /// `window` is ordered oldest to newest. Indicators without enough
    /// history come back with `valid == false` and no value.
    pub fn compute(&self, window: &[MarketSnapshot], requested: &[String]) -> Vec<Indicator> {
        self.calculators
            .iter()
            .filter(|c| requested.iter().any(|m| m == c.source_metric()))
            .map(|c| evaluate(c.as_ref(), window))
            .collect()
    }
}

/// Values of `metric` across `window`, skipping snapshots without it.
/// `None` when the newest snapshot lacks the metric.
pub fn metric_series(window: &[MarketSnapshot], metric: &str) -> Option<Vec<f64>> {
    window.last()?.value(metric)?;
    Some(window.iter().filter_map(|s| s.value(metric)).collect())
}

fn evaluate(calculator: &dyn IndicatorCalculator, window: &[MarketSnapshot]) -> Indicator {
    let metric = calculator.source_metric();
    let min_history = calculator.min_history();

    let evaluated = metric_series(window, metric)
        .filter(|series| series.len() >= min_history)
        .and_then(|series| calculator.evaluate(&series));

    let indicator = match evaluated {
        Some((value, vote)) if value.is_finite() => {
            Indicator::new(calculator.name(), calculator.category(), metric, value, vote)
        }
        _ => Indicator::invalid(calculator.name(), calculator.category(), metric),
    };

    calculator
        .params()
        .into_iter()
        .fold(indicator.with_param("min_history", min_history as f64), |ind, (k, v)| {
            ind.with_param(k, v)
        })
}
