use std::cmp::Ordering;
use std::collections::HashSet;

use crate::core::aggregator::ScoredDimension;
use crate::models::weights::{DimensionWeights, InsightLimits};

/// Merged, ordered and bounded messages for one match
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Messages {
    pub insights: Vec<String>,
    pub warnings: Vec<String>,
}

/// Merge the messages of every scored dimension.
///
/// Messages are ordered by their dimension's weight, heaviest first, with
/// declaration order breaking ties. Exact duplicates keep their first
/// occurrence.
pub fn collect_messages(
    dimensions: &[ScoredDimension],
    weights: &DimensionWeights,
    limits: &InsightLimits,
) -> Messages {
    let mut ordered: Vec<&ScoredDimension> = dimensions.iter().collect();
    ordered.sort_by(|a, b| {
        weights
            .max_for(b.dimension)
            .partial_cmp(&weights.max_for(a.dimension))
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.dimension.ordinal().cmp(&b.dimension.ordinal()))
    });

    Messages {
        insights: merge(ordered.iter().filter_map(|d| d.insight.as_deref()), limits.max_insights),
        warnings: merge(ordered.iter().filter_map(|d| d.warning.as_deref()), limits.max_warnings),
    }
}

fn merge<'a>(messages: impl Iterator<Item = &'a str>, limit: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    messages
        .filter(|m| !m.trim().is_empty())
        .filter(|m| seen.insert(*m))
        .take(limit)
        .map(str::to_string)
        .collect()
}
