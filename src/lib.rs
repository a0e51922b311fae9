//! Nestmatch - compatibility scoring for shared housing
//!
//! Scores how well a searcher fits a listing across six weighted dimensions
//! (budget, location, lifestyle, features, timing, duration) and ranks many
//! candidates at once on a bounded worker pool. The same engine reviews
//! applicants from the owner's side in reverse mode.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;

// Re-export commonly used types
pub use core::{BatchMatcher, BatchOptions, BatchOutcome, Matcher, NormalizeError};
pub use models::{
    BatchCandidate, Dimension, MatchMode, MatchResult, QualityTier, ScoringTable,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        let matcher = Matcher::default();
        let result = matcher
            .match_records(&serde_json::json!({}), &serde_json::json!({}), MatchMode::Forward)
            .unwrap();
        assert!(result.score <= 100);
        assert_eq!(result.quality_tier, QualityTier::from_score(result.score));
    }
}
