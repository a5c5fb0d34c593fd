//! Category-based breakdown of indicator votes for explainability

use std::collections::BTreeMap;

use crate::models::indicators::IndicatorCategory;
use crate::models::signal::SignalReason;

/// Indicator vote with metadata
#[derive(Debug, Clone)]
pub struct IndicatorScore {
    pub name: String,
    /// Vote as -1, 0 or +1
    pub score: f64,
    pub category: IndicatorCategory,
    pub weight: f64,
}

pub struct CategoryBreakdown;

impl CategoryBreakdown {
    /// Weighted mean vote per category, in category order
    pub fn aggregate_by_category(scores: &[IndicatorScore]) -> Vec<(IndicatorCategory, f64)> {
        let mut category_scores: BTreeMap<IndicatorCategory, (f64, f64)> = BTreeMap::new();

        for score in scores {
            let entry = category_scores.entry(score.category).or_insert((0.0, 0.0));
            entry.0 += score.score * score.weight;
            entry.1 += score.weight;
        }

        category_scores
            .into_iter()
            .map(|(category, (sum, weight))| {
                let avg = if weight > 0.0 { sum / weight } else { 0.0 };
                (category, avg)
            })
            .collect()
    }

    /// Category-level reasons followed by the top 3 indicator contributors
    pub fn generate_reasons(
        indicator_scores: &[IndicatorScore],
        category_scores: &[(IndicatorCategory, f64)],
    ) -> Vec<SignalReason> {
        let mut reasons: Vec<SignalReason> = category_scores
            .iter()
            .map(|(category, score)| SignalReason {
                description: format!("{}: {:+.2}", category.label(), score),
                weight: score.abs(),
            })
            .collect();

        let mut indicator_reasons: Vec<SignalReason> = indicator_scores
            .iter()
            .filter(|s| s.score != 0.0)
            .map(|s| SignalReason {
                description: format!(
                    "{} votes {}",
                    s.name,
                    if s.score > 0.0 { "bullish" } else { "bearish" }
                ),
                weight: s.weight * s.score.abs(),
            })
            .collect();
        indicator_reasons.sort_by(|a, b| {
            b.weight
                .total_cmp(&a.weight)
                .then_with(|| a.description.cmp(&b.description))
        });

        reasons.extend(indicator_reasons.into_iter().take(3));
        reasons
    }
}
