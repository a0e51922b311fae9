use crate::core::distance::distance_between;
use crate::models::{
    Diet, Dimension, LifestyleProfile, ListingProfile, MonthlyCost, NoiseTolerance, Schedule,
    ScoringTable, SearcherCriteria, Sociability,
};

/// Absorbs float noise such as `14.999999999999998` before flooring
const FLOOR_EPSILON: f64 = 1e-9;

pub const INSIGHT_WITHIN_BUDGET: &str = "Within budget";
pub const INSIGHT_PREFERRED_AREA: &str = "In your preferred area";
pub const INSIGHT_WITHIN_RADIUS: &str = "Within your search radius";
pub const INSIGHT_COMPATIBLE_LIFESTYLES: &str = "Compatible lifestyles";
pub const INSIGHT_MOST_FEATURES: &str = "Has most of what you want";
pub const WARNING_PETS: &str = "Pets not allowed";
pub const WARNING_SMOKING: &str = "Smoking not allowed";
pub const WARNING_TIMING: &str = "Availability doesn't match your timeline";
pub const WARNING_DURATION: &str = "Minimum stay requirements don't match";

/// What a single dimension scorer produced
#[derive(Debug, Clone, PartialEq)]
pub struct DimensionOutcome {
    /// Whole points, `0 <= raw <= max`
    pub raw: f64,
    pub insight: Option<String>,
    pub warning: Option<String>,
}

impl DimensionOutcome {
    fn points(raw: f64) -> Self {
        Self { raw, insight: None, warning: None }
    }

    fn with_insight(mut self, insight: &str) -> Self {
        self.insight = Some(insight.to_string());
        self
    }

    fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warning = Some(warning.into());
        self
    }
}

/// Dimension-level rounding: floor to whole points, bounded by `[0, max]`
#[inline]
fn whole_points(value: f64, max: f64) -> f64 {
    (value + FLOOR_EPSILON).floor().clamp(0.0, max)
}

/// Run the scorer for `dimension`
pub fn score_dimension(
    dimension: Dimension,
    searcher: &SearcherCriteria,
    listing: &ListingProfile,
    table: &ScoringTable,
) -> DimensionOutcome {
    match dimension {
        Dimension::Budget => score_budget(searcher, listing, table),
        Dimension::Location => score_location(searcher, listing, table),
        Dimension::Lifestyle => score_lifestyle(searcher, listing, table),
        Dimension::Features => score_features(searcher, listing, table),
        Dimension::Timing => score_timing(searcher, listing, table),
        Dimension::Duration => score_duration(searcher, listing, table),
    }
}

/// Budget: full points inside `[min, max]`, linear decay above the ceiling,
/// a capped deduction far below the floor
pub fn score_budget(
    searcher: &SearcherCriteria,
    listing: &ListingProfile,
    table: &ScoringTable,
) -> DimensionOutcome {
    let max_points = table.weights.budget;
    let tuning = &table.budget;

    let cost = match listing.monthly_cost {
        MonthlyCost::Known(cost) => cost,
        MonthlyCost::Unknown => return DimensionOutcome::points(whole_points(max_points / 2.0, max_points)),
        MonthlyCost::Invalid => return DimensionOutcome::points(0.0),
    };
    let (min, max) = (searcher.budget.min, searcher.budget.max);

    if cost > max {
        let overage = (cost - max) / max;
        let raw = whole_points(max_points * (1.0 - overage / tuning.overage_cutoff), max_points);
        let outcome = DimensionOutcome::points(raw);
        if raw < max_points {
            let percent = ((overage * 100.0).round() as u64).max(1);
            return outcome.with_warning(format!("Above budget by {}%", percent));
        }
        return outcome;
    }

    if cost < min {
        let underage = (min - cost) / min;
        if underage <= tuning.underage_tolerance {
            return DimensionOutcome::points(max_points);
        }
        // Never flagged: being cheap is only capped, not a concern
        let penalty = tuning.underage_max_penalty.min(max_points * underage);
        return DimensionOutcome::points(whole_points(max_points - penalty, max_points));
    }

    DimensionOutcome::points(max_points).with_insight(INSIGHT_WITHIN_BUDGET)
}

/// Location: preferred area match, or linear decay with great-circle distance
pub fn score_location(
    searcher: &SearcherCriteria,
    listing: &ListingProfile,
    table: &ScoringTable,
) -> DimensionOutcome {
    let max_points = table.weights.location;

    let area_match = match &listing.area_id {
        Some(area) if !searcher.preferred_locations.is_empty() => {
            Some(searcher.preferred_locations.contains(area))
        }
        _ => None,
    };

    let geo = match (&searcher.search_area, &listing.location) {
        (Some(area), Some(point)) => {
            let distance = distance_between(&area.center, point);
            let reach = area.radius_km * table.location.decay_radius_multiplier;
            let raw = whole_points(max_points * (1.0 - distance / reach).max(0.0), max_points);
            Some((raw, distance <= area.radius_km))
        }
        _ => None,
    };

    match (area_match, geo) {
        (None, None) => DimensionOutcome::points(whole_points(max_points / 2.0, max_points)),
        (Some(true), _) => DimensionOutcome::points(max_points).with_insight(INSIGHT_PREFERRED_AREA),
        // A missed area with no distance to fall back on scores below the no-data case
        (Some(false), None) => DimensionOutcome::points(0.0),
        (_, Some((raw, within_radius))) => {
            let outcome = DimensionOutcome::points(raw);
            if within_radius {
                outcome.with_insight(INSIGHT_WITHIN_RADIUS)
            } else {
                outcome
            }
        }
    }
}

/// Lifestyle: weighted soft compatibility, overridden by pet and smoking rules
pub fn score_lifestyle(
    searcher: &SearcherCriteria,
    listing: &ListingProfile,
    table: &ScoringTable,
) -> DimensionOutcome {
    let max_points = table.weights.lifestyle;
    let tuning = &table.lifestyle;

    let soft = match &listing.residents {
        Some(residents) => lifestyle_compatibility(&searcher.lifestyle, residents, table),
        None => tuning.neutral_factor,
    };
    let mut raw = whole_points(max_points * soft, max_points);

    let pets_blocked = searcher.has_pets && !listing.pets_allowed;
    let smoking_blocked = searcher.smoker && !listing.smoking_allowed;

    if pets_blocked && smoking_blocked {
        raw = 0.0;
    } else if pets_blocked || smoking_blocked {
        raw = raw.min(tuning.hard_constraint_cap);
    }

    let outcome = DimensionOutcome::points(raw);
    // One warning per dimension; pets take precedence
    if pets_blocked {
        return outcome.with_warning(WARNING_PETS);
    }
    if smoking_blocked {
        return outcome.with_warning(WARNING_SMOKING);
    }
    if raw >= max_points * tuning.compatible_ratio {
        return outcome.with_insight(INSIGHT_COMPATIBLE_LIFESTYLES);
    }
    outcome
}

/// Weighted average of the soft sub-factors, in `[0, 1]`
pub fn lifestyle_compatibility(
    searcher: &LifestyleProfile,
    residents: &LifestyleProfile,
    table: &ScoringTable,
) -> f64 {
    let tuning = &table.lifestyle;

    let cleanliness = 1.0 - (searcher.cleanliness - residents.cleanliness).abs() / 9.0;
    let sociability = sociability_match(searcher.sociability, residents.sociability);
    let schedule = ordinal_proximity(schedule_rank(searcher.schedule), schedule_rank(residents.schedule));
    let noise = ordinal_proximity(
        noise_rank(searcher.noise_tolerance),
        noise_rank(residents.noise_tolerance),
    );
    let diet = diet_match(searcher.diet, residents.diet);

    let total = cleanliness * tuning.cleanliness_weight
        + sociability * tuning.sociability_weight
        + schedule * tuning.schedule_weight
        + noise * tuning.noise_weight
        + diet * tuning.diet_weight;

    total.clamp(0.0, 1.0)
}

fn sociability_match(a: Sociability, b: Sociability) -> f64 {
    use Sociability::*;
    match (a, b) {
        (Reserved, Reserved) | (Balanced, Balanced) | (Outgoing, Outgoing) => 1.0,
        (Balanced, _) | (_, Balanced) => 0.6,
        (Reserved, Outgoing) | (Outgoing, Reserved) => 0.2,
    }
}

fn diet_match(a: Diet, b: Diet) -> f64 {
    use Diet::*;
    match (a, b) {
        (NoPreference, _) | (_, NoPreference) => 1.0,
        (x, y) if x == y => 1.0,
        (Vegetarian, Vegan) | (Vegan, Vegetarian) => 0.8,
        (Omnivore, Vegetarian) | (Vegetarian, Omnivore) => 0.6,
        _ => 0.4,
    }
}

fn schedule_rank(schedule: Schedule) -> u8 {
    match schedule {
        Schedule::EarlyBird => 0,
        Schedule::Regular => 1,
        Schedule::NightOwl => 2,
    }
}

fn noise_rank(noise: NoiseTolerance) -> u8 {
    match noise {
        NoiseTolerance::Low => 0,
        NoiseTolerance::Moderate => 1,
        NoiseTolerance::High => 2,
    }
}

/// 1.0 for identical ranks on a three-step scale, 0.0 for opposite ends
fn ordinal_proximity(a: u8, b: u8) -> f64 {
    1.0 - (a as f64 - b as f64).abs() / 2.0
}

/// Features: share of desired amenities the listing offers
pub fn score_features(
    searcher: &SearcherCriteria,
    listing: &ListingProfile,
    table: &ScoringTable,
) -> DimensionOutcome {
    let max_points = table.weights.features;

    if searcher.desired_features.is_empty() {
        return DimensionOutcome::points(max_points);
    }

    let desired = searcher.desired_features.len() as f64;
    let matched = searcher
        .desired_features
        .intersection(&listing.amenities)
        .count() as f64;

    let outcome = DimensionOutcome::points(whole_points(max_points * matched / desired, max_points));
    if matched / desired >= table.features.insight_coverage {
        outcome.with_insight(INSIGHT_MOST_FEATURES)
    } else {
        outcome
    }
}

/// Timing: linear decay with days between availability and the move-in window
pub fn score_timing(
    searcher: &SearcherCriteria,
    listing: &ListingProfile,
    table: &ScoringTable,
) -> DimensionOutcome {
    let max_points = table.weights.timing;
    let tuning = &table.timing;

    let Some(available_from) = listing.available_from else {
        return DimensionOutcome::points(whole_points(max_points / 2.0, max_points));
    };

    let days_outside = searcher.move_in.days_outside(available_from) as f64;
    let raw = whole_points(max_points * (1.0 - days_outside / tuning.decay_days).max(0.0), max_points);

    let outcome = DimensionOutcome::points(raw);
    if raw < tuning.warning_threshold {
        outcome.with_warning(WARNING_TIMING)
    } else {
        outcome
    }
}

/// Duration: all or nothing on overlapping stay ranges
pub fn score_duration(
    searcher: &SearcherCriteria,
    listing: &ListingProfile,
    table: &ScoringTable,
) -> DimensionOutcome {
    if searcher.stay.overlaps(&listing.stay) {
        DimensionOutcome::points(table.weights.duration)
    } else {
        DimensionOutcome::points(0.0).with_warning(WARNING_DURATION)
    }
}
