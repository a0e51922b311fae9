// Core algorithm exports
pub mod aggregator;
pub mod batch;
pub mod distance;
pub mod insights;
pub mod matcher;
pub mod normalizer;
pub mod reverse;
pub mod scoring;

pub use batch::{BatchMatcher, BatchOptions, BatchOutcome};
pub use distance::{distance_between, haversine_distance};
pub use matcher::{MatchProfile, Matcher};
pub use normalizer::{normalize_listing, normalize_searcher, NormalizeError};
pub use reverse::review_applicant;
pub use scoring::score_dimension;
