use tracing::debug;

use crate::config::SignalConfig;
use crate::error::{EngineError, EngineResult};
use crate::models::indicators::Indicator;
use crate::models::signal::{SignalDirection, SignalStrength, TradingSignal};
use crate::models::snapshot::MarketSnapshot;
use crate::signals::aggregation::{CategoryBreakdown, IndicatorScore};
use crate::signals::scoring::{
    calculate_confidence, contested_penalty, direction_of, fraction, metric_coverage, strength,
    weighted_vote,
};

/// Combines indicator votes into one `TradingSignal`
pub struct SignalGenerator {
    config: SignalConfig,
}

impl SignalGenerator {
    pub fn new(config: SignalConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SignalConfig {
        &self.config
    }

    /// Score `indicators` against `snapshot`.
    ///
    /// `requested` is the metric set the caller asked for; missing ones
    /// lower confidence. Fails with `InsufficientIndicators` when none of the
    /// indicators is valid.
    pub fn generate(
        &self,
        snapshot: &MarketSnapshot,
        requested: &[String],
        indicators: &[Indicator],
    ) -> EngineResult<TradingSignal> {
        let valid: Vec<&Indicator> = indicators.iter().filter(|i| i.valid).collect();
        if valid.is_empty() {
            return Err(EngineError::InsufficientIndicators {
                symbol: snapshot.symbol().to_string(),
                computed: indicators.len(),
            });
        }

        let scores: Vec<IndicatorScore> = valid
            .iter()
            .map(|indicator| IndicatorScore {
                name: indicator.name.clone(),
                score: indicator.vote.as_f64(),
                category: indicator.category,
                weight: self.config.weight_for(&indicator.name),
            })
            .collect();

        let votes: Vec<(f64, f64)> = scores.iter().map(|s| (s.weight, s.score)).collect();
        let (weighted_sum, total_weight) = weighted_vote(&votes);
        let strength = strength(weighted_sum, total_weight);

        let coverage = metric_coverage(requested, snapshot);
        let validity = fraction(valid.len(), indicators.len());
        let contested = requested.iter().filter(|m| snapshot.is_contested(m)).count();
        let penalty = contested_penalty(contested, self.config.contested_penalty);
        let confidence = calculate_confidence(coverage, validity, penalty);

        let mut direction = direction_of(weighted_sum);
        if direction != SignalDirection::Hold
            && (confidence < self.config.min_confidence || strength < self.config.min_strength)
        {
            debug!(
                symbol = snapshot.symbol(),
                strength,
                confidence,
                "below threshold, forcing hold"
            );
            direction = SignalDirection::Hold;
        }

        debug!(
            symbol = snapshot.symbol(),
            weighted_sum,
            total_weight,
            coverage,
            validity,
            contested,
            "scored indicators"
        );

        let category_scores = CategoryBreakdown::aggregate_by_category(&scores);
        let reasons = CategoryBreakdown::generate_reasons(&scores, &category_scores);

        Ok(TradingSignal {
            symbol: snapshot.symbol().to_string(),
            timestamp: snapshot.timestamp(),
            direction,
            strength,
            confidence,
            strength_label: SignalStrength::from_strength(strength),
            indicators: valid.into_iter().cloned().collect(),
            snapshot: snapshot.clone(),
            reasons,
        })
    }
}
