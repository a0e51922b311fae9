//! Owner-side applicant review
//!
//! The listing's residents, amenities and stay rules play the listing role;
//! the applicant plays the searcher role. Price, place and move-in date were
//! settled before the application, so those dimensions are not evaluated and
//! the remaining ones are stretched back onto a 0–100 scale.

use crate::models::{Dimension, ListingProfile, MatchMode, MatchResult, SearcherCriteria};

use super::matcher::Matcher;

/// Dimensions left out of reverse matching
pub const REVERSE_EXCLUDED: [Dimension; 3] = [Dimension::Budget, Dimension::Location, Dimension::Timing];

/// 100 / (Lifestyle 20 + Features 15 + Duration 10)
pub const REVERSE_RESCALE: f64 = 100.0 / 45.0;

/// Dimensions evaluated in reverse mode, in declaration order
pub fn reverse_dimensions() -> impl Iterator<Item = Dimension> {
    Dimension::ALL
        .into_iter()
        .filter(|d| !REVERSE_EXCLUDED.contains(d))
}

/// Dimensions to evaluate and the factor applied to each of them
pub fn dimension_plan(mode: MatchMode) -> (Vec<Dimension>, f64) {
    match mode {
        MatchMode::Forward => (Dimension::ALL.to_vec(), 1.0),
        MatchMode::Reverse => (reverse_dimensions().collect(), REVERSE_RESCALE),
    }
}

/// Score an applicant against a listing's current household
pub fn review_applicant(
    matcher: &Matcher,
    listing: &ListingProfile,
    applicant: &SearcherCriteria,
) -> MatchResult {
    matcher.score(applicant, listing, MatchMode::Reverse)
}
