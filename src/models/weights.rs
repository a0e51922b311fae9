use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::reverse::{reverse_dimensions, REVERSE_RESCALE};

/// Tolerance for comparing configured floating point sums
const SUM_TOLERANCE: f64 = 1e-9;

/// One of the six independent scoring axes, in declaration order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    Budget,
    Location,
    Lifestyle,
    Features,
    Timing,
    Duration,
}

impl Dimension {
    pub const ALL: [Dimension; 6] = [
        Dimension::Budget,
        Dimension::Location,
        Dimension::Lifestyle,
        Dimension::Features,
        Dimension::Timing,
        Dimension::Duration,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Dimension::Budget => "budget",
            Dimension::Location => "location",
            Dimension::Lifestyle => "lifestyle",
            Dimension::Features => "features",
            Dimension::Timing => "timing",
            Dimension::Duration => "duration",
        }
    }

    /// Position in declaration order, used as the insight tie-breaker
    pub fn ordinal(&self) -> usize {
        *self as usize
    }
}

/// Maximum points per dimension. Must sum to exactly 100.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DimensionWeights {
    #[serde(default = "default_budget_weight")]
    pub budget: f64,
    #[serde(default = "default_location_weight")]
    pub location: f64,
    #[serde(default = "default_lifestyle_weight")]
    pub lifestyle: f64,
    #[serde(default = "default_features_weight")]
    pub features: f64,
    #[serde(default = "default_timing_weight")]
    pub timing: f64,
    #[serde(default = "default_duration_weight")]
    pub duration: f64,
}

fn default_budget_weight() -> f64 { 25.0 }
fn default_location_weight() -> f64 { 20.0 }
fn default_lifestyle_weight() -> f64 { 20.0 }
fn default_features_weight() -> f64 { 15.0 }
fn default_timing_weight() -> f64 { 10.0 }
fn default_duration_weight() -> f64 { 10.0 }

impl Default for DimensionWeights {
    fn default() -> Self {
        Self {
            budget: default_budget_weight(),
            location: default_location_weight(),
            lifestyle: default_lifestyle_weight(),
            features: default_features_weight(),
            timing: default_timing_weight(),
            duration: default_duration_weight(),
        }
    }
}

impl DimensionWeights {
    pub fn max_for(&self, dimension: Dimension) -> f64 {
        match dimension {
            Dimension::Budget => self.budget,
            Dimension::Location => self.location,
            Dimension::Lifestyle => self.lifestyle,
            Dimension::Features => self.features,
            Dimension::Timing => self.timing,
            Dimension::Duration => self.duration,
        }
    }

    pub fn sum(&self) -> f64 {
        Dimension::ALL.iter().map(|d| self.max_for(*d)).sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BudgetTuning {
    /// Overage ratio at which the budget score reaches zero
    pub overage_cutoff: f64,
    /// Underage ratio still awarded full points
    pub underage_tolerance: f64,
    /// Largest deduction for a listing far below the budget floor
    pub underage_max_penalty: f64,
}

impl Default for BudgetTuning {
    fn default() -> Self {
        Self {
            overage_cutoff: 0.5,
            underage_tolerance: 0.3,
            underage_max_penalty: 5.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationTuning {
    /// Geo score reaches zero at `radius * decay_radius_multiplier`
    pub decay_radius_multiplier: f64,
}

impl Default for LocationTuning {
    fn default() -> Self {
        Self { decay_radius_multiplier: 2.0 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LifestyleTuning {
    pub cleanliness_weight: f64,
    pub sociability_weight: f64,
    pub schedule_weight: f64,
    pub noise_weight: f64,
    pub diet_weight: f64,
    /// Ceiling applied when a single hard constraint is violated
    pub hard_constraint_cap: f64,
    /// Share of the maximum needed for the "compatible" insight
    pub compatible_ratio: f64,
    /// Soft factor used when a listing has no resident summary
    pub neutral_factor: f64,
}

impl Default for LifestyleTuning {
    fn default() -> Self {
        Self {
            cleanliness_weight: 0.30,
            sociability_weight: 0.25,
            schedule_weight: 0.20,
            noise_weight: 0.15,
            diet_weight: 0.10,
            hard_constraint_cap: 2.0,
            compatible_ratio: 0.8,
            neutral_factor: 0.5,
        }
    }
}

impl LifestyleTuning {
    pub fn sub_factor_sum(&self) -> f64 {
        self.cleanliness_weight
            + self.sociability_weight
            + self.schedule_weight
            + self.noise_weight
            + self.diet_weight
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeaturesTuning {
    pub insight_coverage: f64,
}

impl Default for FeaturesTuning {
    fn default() -> Self {
        Self { insight_coverage: 0.8 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingTuning {
    /// Days outside the move-in window at which the timing score reaches zero
    pub decay_days: f64,
    /// Timing scores below this raise a warning
    pub warning_threshold: f64,
}

impl Default for TimingTuning {
    fn default() -> Self {
        Self {
            decay_days: 30.0,
            warning_threshold: 5.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InsightLimits {
    pub max_insights: usize,
    pub max_warnings: usize,
}

impl Default for InsightLimits {
    fn default() -> Self {
        Self {
            max_insights: 5,
            max_warnings: 5,
        }
    }
}

/// Values the normalizer substitutes for missing fields
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizerDefaults {
    pub neutral_cleanliness: f64,
    /// Radius assumed when a searcher gives a point but no radius
    pub search_radius_km: f64,
}

impl Default for NormalizerDefaults {
    fn default() -> Self {
        Self {
            neutral_cleanliness: 5.0,
            search_radius_km: 10.0,
        }
    }
}

/// Every weight, decay constant, threshold and default used by the engine.
///
/// Loaded from the `[scoring]` settings section; anything omitted falls back
/// to the built-in values. [`ScoringTable::validate`] runs once at startup.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ScoringTable {
    #[serde(default)]
    pub weights: DimensionWeights,
    #[serde(default)]
    pub budget: BudgetTuning,
    #[serde(default)]
    pub location: LocationTuning,
    #[serde(default)]
    pub lifestyle: LifestyleTuning,
    #[serde(default)]
    pub features: FeaturesTuning,
    #[serde(default)]
    pub timing: TimingTuning,
    #[serde(default)]
    pub insights: InsightLimits,
    #[serde(default)]
    pub defaults: NormalizerDefaults,
}

/// Misconfiguration of the scoring table, fatal at startup
#[derive(Debug, Error, PartialEq)]
pub enum ScoringConfigError {
    #[error("dimension weights must sum to 100, got {0}")]
    WeightSum(f64),

    #[error("{name} must be positive, got {value}")]
    NotPositive { name: &'static str, value: f64 },

    #[error("{name} must lie within [0, 1], got {value}")]
    NotARatio { name: &'static str, value: f64 },

    #[error("lifestyle sub-factor weights must sum to 1, got {0}")]
    SubFactorSum(f64),

    #[error("reverse rescale factor {configured} does not match 100 / surviving weights = {expected}")]
    ReverseRescale { configured: f64, expected: f64 },
}

impl ScoringTable {
    pub fn validate(&self) -> Result<(), ScoringConfigError> {
        let sum = self.weights.sum();
        if (sum - 100.0).abs() > SUM_TOLERANCE {
            return Err(ScoringConfigError::WeightSum(sum));
        }

        for dimension in Dimension::ALL {
            let value = self.weights.max_for(dimension);
            if value <= 0.0 {
                return Err(ScoringConfigError::NotPositive {
                    name: dimension.as_str(),
                    value,
                });
            }
        }

        let positives = [
            ("budget.overage_cutoff", self.budget.overage_cutoff),
            ("location.decay_radius_multiplier", self.location.decay_radius_multiplier),
            ("timing.decay_days", self.timing.decay_days),
            ("defaults.search_radius_km", self.defaults.search_radius_km),
        ];
        for (name, value) in positives {
            // `!(x > 0)` also rejects NaN
            if !(value > 0.0) {
                return Err(ScoringConfigError::NotPositive { name, value });
            }
        }

        let ratios = [
            ("budget.underage_tolerance", self.budget.underage_tolerance),
            ("lifestyle.compatible_ratio", self.lifestyle.compatible_ratio),
            ("lifestyle.neutral_factor", self.lifestyle.neutral_factor),
            ("features.insight_coverage", self.features.insight_coverage),
        ];
        for (name, value) in ratios {
            if !(0.0..=1.0).contains(&value) {
                return Err(ScoringConfigError::NotARatio { name, value });
            }
        }

        let sub_factors = self.lifestyle.sub_factor_sum();
        if (sub_factors - 1.0).abs() > SUM_TOLERANCE {
            return Err(ScoringConfigError::SubFactorSum(sub_factors));
        }

        let surviving: f64 = reverse_dimensions()
            .map(|d| self.weights.max_for(d))
            .sum();
        let expected = 100.0 / surviving;
        if (expected - REVERSE_RESCALE).abs() > SUM_TOLERANCE {
            return Err(ScoringConfigError::ReverseRescale {
                configured: REVERSE_RESCALE,
                expected,
            });
        }

        Ok(())
    }
}
