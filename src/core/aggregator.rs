use crate::core::scoring::DimensionOutcome;
use crate::models::{Breakdown, Dimension, DimensionScore, QualityTier};

/// A dimension outcome placed on its (possibly rescaled) scale
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredDimension {
    pub dimension: Dimension,
    pub raw: f64,
    pub max: f64,
    pub insight: Option<String>,
    pub warning: Option<String>,
}

impl ScoredDimension {
    /// Multiply both `raw` and `max` by `factor`
    pub fn from_outcome(dimension: Dimension, outcome: DimensionOutcome, max: f64, factor: f64) -> Self {
        Self {
            dimension,
            raw: outcome.raw * factor,
            max: max * factor,
            insight: outcome.insight,
            warning: outcome.warning,
        }
    }
}

/// `round(Σ raw)` clamped to `[0, 100]`
pub fn total_score(dimensions: &[ScoredDimension]) -> u8 {
    let sum: f64 = dimensions.iter().map(|d| d.raw).sum();
    sum.round().clamp(0.0, 100.0) as u8
}

pub fn quality_tier(score: u8) -> QualityTier {
    QualityTier::from_score(score)
}

pub fn breakdown(dimensions: &[ScoredDimension]) -> Breakdown {
    let mut breakdown = Breakdown::default();
    for d in dimensions {
        breakdown.set(d.dimension, DimensionScore { raw: d.raw, max: d.max });
    }
    breakdown
}
