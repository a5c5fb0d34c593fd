//! Indicator trait and the default indicator set

use crate::config::IndicatorConfig;
use crate::models::indicators::{IndicatorCategory, Vote};

use super::defi::tvl::TvlDelta;
use super::momentum::rsi::Rsi;
use super::onchain::activity::{ActiveAddressesDelta, ExchangeNetflow};
use super::onchain::ratios::ValuationBand;
use super::trend::ema::EmaTrend;
use super::trend::sma::SmaCross;

/// Trait for all indicators
pub trait IndicatorCalculator: Send + Sync {
    fn name(&self) -> &'static str;

    fn category(&self) -> IndicatorCategory;

    /// Snapshot metric the indicator reads
    fn source_metric(&self) -> &'static str;

    /// Points of `source_metric` needed before a value is produced
    fn min_history(&self) -> usize;

    fn params(&self) -> Vec<(&'static str, f64)>;

    /// Value and vote over `series` (oldest first, at least `min_history`
    /// points). `None` when the series admits no meaningful value.
    fn evaluate(&self, series: &[f64]) -> Option<(f64, Vote)>;
}

/// The standard indicator set, in evaluation order
pub fn default_indicators(config: &IndicatorConfig) -> Vec<Box<dyn IndicatorCalculator>> {
    vec![
        Box::new(SmaCross::new(config.sma_fast, config.sma_slow)),
        Box::new(EmaTrend::new(config.ema_period)),
        Box::new(Rsi::new(config.rsi_period, config.rsi_oversold, config.rsi_overbought)),
        Box::new(ValuationBand::mvrv(config.mvrv_low, config.mvrv_high)),
        Box::new(ValuationBand::sopr(config.sopr_low, config.sopr_high)),
        Box::new(ValuationBand::nvt(config.nvt_low, config.nvt_high)),
        Box::new(ExchangeNetflow),
        Box::new(ActiveAddressesDelta::new(config.delta_period, config.delta_threshold)),
        Box::new(TvlDelta::new(config.delta_period, config.delta_threshold)),
    ]
}
