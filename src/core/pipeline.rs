//! End-to-end `GetSignal` entry point: aggregate, record, compute, score.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{info, instrument};

use crate::config::EngineConfig;
use crate::core::aggregator::Aggregator;
use crate::core::history::SnapshotHistory;
use crate::error::EngineResult;
use crate::indicators::engine::IndicatorEngine;
use crate::models::signal::TradingSignal;
use crate::services::registry::ProviderRegistry;
use crate::signals::signal_generator::SignalGenerator;

pub struct SignalPipeline {
    aggregator: Aggregator,
    warmup_days: u32,
    history: SnapshotHistory,
    indicators: IndicatorEngine,
    generator: SignalGenerator,
}

impl SignalPipeline {
    /// Validates `config` and wires the stages around `registry`
    pub fn new(config: EngineConfig, registry: Arc<ProviderRegistry>) -> EngineResult<Self> {
        config.validate()?;
        Ok(Self {
            aggregator: Aggregator::new(config.aggregator, registry),
            warmup_days: config.history.warmup_days,
            history: SnapshotHistory::new(config.history.capacity),
            indicators: IndicatorEngine::new(config.indicators),
            generator: SignalGenerator::new(config.signal),
        })
    }

    pub fn aggregator(&self) -> &Aggregator {
        &self.aggregator
    }

    pub fn history(&self) -> &SnapshotHistory {
        &self.history
    }

    pub fn registry(&self) -> &Arc<ProviderRegistry> {
        self.aggregator.registry()
    }

    /// Seed the history of `symbol` with daily snapshots covering the
    /// configured warm-up period, so trend indicators are valid on the first
    /// `get_signal`. Returns how many snapshots were stored.
    #[instrument(skip(self, metrics), fields(metrics = metrics.len()))]
    pub async fn warm_up(
        &self,
        symbol: &str,
        metrics: &[String],
        deadline: Duration,
    ) -> EngineResult<usize> {
        let end = Utc::now();
        let start = end - chrono::Duration::days(i64::from(self.warmup_days));
        let snapshots = self
            .aggregator
            .backfill(symbol, metrics, start, end, deadline)
            .await?;

        let stored = self.history.seed(snapshots).await;
        info!(stored, days = self.warmup_days, "history warmed up");
        Ok(stored)
    }

    /// Produce a signal for `symbol` from `metrics`, bounded by `deadline`.
    ///
    /// Errors: `Configuration` for a bad request, `InsufficientData` when no
    /// provider delivered anything, `InsufficientIndicators` when the history
    /// is too short for every indicator (no signal, as opposed to `hold`).
    #[instrument(skip(self, metrics), fields(metrics = metrics.len()))]
    pub async fn get_signal(
        &self,
        symbol: &str,
        metrics: &[String],
        deadline: Duration,
    ) -> EngineResult<TradingSignal> {
        let (_, requested) = self.aggregator.validate_request(symbol, metrics)?;
        let snapshot = self.aggregator.aggregate(symbol, &requested, deadline).await?;

        let window = self.history.append(snapshot.clone()).await;
        let indicators = self.indicators.compute(&window, &requested);
        let signal = self.generator.generate(&snapshot, &requested, &indicators)?;

        info!(
            symbol = %signal.symbol,
            direction = ?signal.direction,
            strength = signal.strength,
            confidence = signal.confidence,
            window = window.len(),
            "signal generated"
        );

        Ok(signal)
    }
}
