use serde_json::Value;
use std::sync::Arc;

use crate::core::{
    aggregator::{breakdown, quality_tier, total_score, ScoredDimension},
    insights::collect_messages,
    normalizer::{normalize_listing, normalize_searcher, NormalizeError},
    reverse::{dimension_plan, review_applicant},
    scoring::score_dimension,
};
use crate::models::{
    ListingProfile, MatchMode, MatchResult, ScoringConfigError, ScoringTable, SearcherCriteria,
};

/// The fixed side of a one-to-many match, already normalized
#[derive(Debug, Clone)]
pub enum MatchProfile {
    /// Forward mode: candidates are listings
    Searcher(Arc<SearcherCriteria>),
    /// Reverse mode: candidates are applicants
    Listing(Arc<ListingProfile>),
}

impl MatchProfile {
    pub fn mode(&self) -> MatchMode {
        match self {
            MatchProfile::Searcher(_) => MatchMode::Forward,
            MatchProfile::Listing(_) => MatchMode::Reverse,
        }
    }
}

/// Compatibility scorer
///
/// # Pipeline
/// 1. Normalize both records
/// 2. Run the dimension scorers selected by the match mode
/// 3. Aggregate into a total score and quality tier
/// 4. Merge insights and warnings
///
/// Holds only the validated scoring table, so clones are cheap and can be
/// shared freely between workers.
#[derive(Debug, Clone)]
pub struct Matcher {
    table: Arc<ScoringTable>,
}

impl Matcher {
    pub fn new(table: ScoringTable) -> Result<Self, ScoringConfigError> {
        table.validate()?;
        Ok(Self { table: Arc::new(table) })
    }

    pub fn with_default_table() -> Self {
        let table = ScoringTable::default();
        debug_assert!(table.validate().is_ok());
        Self { table: Arc::new(table) }
    }

    pub fn table(&self) -> &ScoringTable {
        &self.table
    }

    /// Score a normalized pair
    pub fn score(
        &self,
        searcher: &SearcherCriteria,
        listing: &ListingProfile,
        mode: MatchMode,
    ) -> MatchResult {
        let table = self.table.as_ref();
        let (dimensions, factor) = dimension_plan(mode);

        let scored: Vec<ScoredDimension> = dimensions
            .into_iter()
            .map(|dimension| {
                let outcome = score_dimension(dimension, searcher, listing, table);
                ScoredDimension::from_outcome(dimension, outcome, table.weights.max_for(dimension), factor)
            })
            .collect();

        let score = total_score(&scored);
        let messages = collect_messages(&scored, &table.weights, &table.insights);

        MatchResult {
            score,
            breakdown: breakdown(&scored),
            insights: messages.insights,
            warnings: messages.warnings,
            quality_tier: quality_tier(score),
            mode,
        }
    }

    /// Normalize and score a pair of raw records
    pub fn match_records(
        &self,
        searcher: &Value,
        listing: &Value,
        mode: MatchMode,
    ) -> Result<MatchResult, NormalizeError> {
        let defaults = &self.table.defaults;
        let searcher = normalize_searcher(searcher, defaults)?;
        let listing = normalize_listing(listing, defaults)?;
        Ok(self.score(&searcher, &listing, mode))
    }

    /// Normalize the fixed side of a batch
    pub fn prepare(&self, profile: &Value, mode: MatchMode) -> Result<MatchProfile, NormalizeError> {
        let defaults = &self.table.defaults;
        Ok(match mode {
            MatchMode::Forward => MatchProfile::Searcher(Arc::new(normalize_searcher(profile, defaults)?)),
            MatchMode::Reverse => MatchProfile::Listing(Arc::new(normalize_listing(profile, defaults)?)),
        })
    }

    /// Score one raw candidate against a prepared profile
    pub fn match_one(&self, profile: &MatchProfile, candidate: &Value) -> Result<MatchResult, NormalizeError> {
        let defaults = &self.table.defaults;
        match profile {
            MatchProfile::Searcher(searcher) => {
                let listing = normalize_listing(candidate, defaults)?;
                Ok(self.score(searcher, &listing, MatchMode::Forward))
            }
            MatchProfile::Listing(listing) => {
                let applicant = normalize_searcher(candidate, defaults)?;
                Ok(review_applicant(self, listing, &applicant))
            }
        }
    }
}

impl Default for Matcher {
    fn default() -> Self {
        Self::with_default_table()
    }
}
