// Model exports
pub mod domain;
pub mod requests;
pub mod responses;
pub mod weights;

pub use domain::{
    BudgetRange, Diet, GeoPoint, LifestyleProfile, ListingProfile, MatchMode, MonthlyCost,
    MoveInWindow, NoiseTolerance, RawLifestyle, RawListingProfile, RawSearcherCriteria, RoomType,
    Schedule, SearchArea, SearcherCriteria, Sociability, StayRange,
};
pub use requests::{BatchCandidate, BatchMatchRequest, MatchRequest};
pub use responses::{
    BatchEntry, BatchMatchResponse, Breakdown, DimensionScore, ErrorResponse, HealthResponse,
    MatchResult, QualityTier,
};
pub use weights::{
    Dimension, DimensionWeights, InsightLimits, NormalizerDefaults, ScoringConfigError, ScoringTable,
};
