use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

use crate::models::domain::MatchMode;
use crate::models::weights::Dimension;

/// Discrete label for a total score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum QualityTier {
    Poor,
    Fair,
    Good,
    Great,
    Excellent,
}

impl QualityTier {
    /// Tiers in ascending order; their bounds partition 0..=100
    pub const ALL: [QualityTier; 5] = [
        QualityTier::Poor,
        QualityTier::Fair,
        QualityTier::Good,
        QualityTier::Great,
        QualityTier::Excellent,
    ];

    pub fn bounds(&self) -> RangeInclusive<u8> {
        match self {
            QualityTier::Poor => 0..=39,
            QualityTier::Fair => 40..=54,
            QualityTier::Good => 55..=69,
            QualityTier::Great => 70..=84,
            QualityTier::Excellent => 85..=100,
        }
    }

    pub fn from_score(score: u8) -> Self {
        match score {
            0..=39 => QualityTier::Poor,
            40..=54 => QualityTier::Fair,
            55..=69 => QualityTier::Good,
            70..=84 => QualityTier::Great,
            _ => QualityTier::Excellent,
        }
    }
}

/// A dimension's contribution to the total
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DimensionScore {
    pub raw: f64,
    pub max: f64,
}

/// Per-dimension scores. Dimensions not evaluated in a mode are omitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Breakdown {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget: Option<DimensionScore>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<DimensionScore>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lifestyle: Option<DimensionScore>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub features: Option<DimensionScore>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timing: Option<DimensionScore>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<DimensionScore>,
}

impl Breakdown {
    fn slot_mut(&mut self, dimension: Dimension) -> &mut Option<DimensionScore> {
        match dimension {
            Dimension::Budget => &mut self.budget,
            Dimension::Location => &mut self.location,
            Dimension::Lifestyle => &mut self.lifestyle,
            Dimension::Features => &mut self.features,
            Dimension::Timing => &mut self.timing,
            Dimension::Duration => &mut self.duration,
        }
    }

    pub fn get(&self, dimension: Dimension) -> Option<DimensionScore> {
        match dimension {
            Dimension::Budget => self.budget,
            Dimension::Location => self.location,
            Dimension::Lifestyle => self.lifestyle,
            Dimension::Features => self.features,
            Dimension::Timing => self.timing,
            Dimension::Duration => self.duration,
        }
    }

    pub fn set(&mut self, dimension: Dimension, score: DimensionScore) {
        *self.slot_mut(dimension) = Some(score);
    }

    /// Evaluated dimensions in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (Dimension, DimensionScore)> + '_ {
        Dimension::ALL
            .into_iter()
            .filter_map(|d| self.get(d).map(|score| (d, score)))
    }
}

/// Compatibility of one searcher/listing pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub score: u8,
    pub breakdown: Breakdown,
    pub insights: Vec<String>,
    pub warnings: Vec<String>,
    pub quality_tier: QualityTier,
    pub mode: MatchMode,
}

impl MatchResult {
    /// Placeholder for a pair that could not be scored
    pub fn unscored(mode: MatchMode) -> Self {
        Self {
            score: 0,
            breakdown: Breakdown::default(),
            insights: vec![],
            warnings: vec![],
            quality_tier: QualityTier::Poor,
            mode,
        }
    }
}

/// One ranked entry of a batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchEntry {
    pub candidate_id: String,
    #[serde(flatten)]
    pub result: MatchResult,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BatchEntry {
    pub fn failed(candidate_id: String, mode: MatchMode, reason: String) -> Self {
        Self {
            candidate_id,
            result: MatchResult::unscored(mode),
            error: Some(reason),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Response for the batch match endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchMatchResponse {
    pub batch_id: String,
    pub results: Vec<BatchEntry>,
    /// Set when the batch was cancelled before every candidate was dispatched
    pub truncated: bool,
    pub total_candidates: usize,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_bounds_partition_score_range() {
        let mut expected_start = 0u16;
        for tier in QualityTier::ALL {
            let bounds = tier.bounds();
            assert_eq!(*bounds.start() as u16, expected_start, "gap before {:?}", tier);
            assert!(bounds.start() <= bounds.end());
            expected_start = *bounds.end() as u16 + 1;
        }
        assert_eq!(expected_start, 101);
    }

    #[test]
    fn test_from_score_agrees_with_bounds() {
        for score in 0..=100u8 {
            let tier = QualityTier::from_score(score);
            assert!(tier.bounds().contains(&score), "{} mapped to {:?}", score, tier);
        }
    }

    #[test]
    fn test_breakdown_skips_unevaluated_dimensions() {
        let mut breakdown = Breakdown::default();
        breakdown.set(Dimension::Lifestyle, DimensionScore { raw: 10.0, max: 20.0 });

        let json = serde_json::to_value(&breakdown).unwrap();
        assert_eq!(json, serde_json::json!({ "lifestyle": { "raw": 10.0, "max": 20.0 } }));
        assert_eq!(breakdown.iter().count(), 1);
    }

    #[test]
    fn test_failed_entry_serializes_error() {
        let entry = BatchEntry::failed("c-1".to_string(), MatchMode::Forward, "bad".to_string());
        let json = serde_json::to_value(&entry).unwrap();

        assert_eq!(json["candidate_id"], "c-1");
        assert_eq!(json["score"], 0);
        assert_eq!(json["quality_tier"], "Poor");
        assert_eq!(json["error"], "bad");
    }
}
