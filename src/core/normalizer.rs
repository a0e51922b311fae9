//! Profile normalization
//!
//! Turns raw, partially populated records into the canonical structs the
//! scorers operate on. This is the only place where missing or garbage
//! field values are handled.

use serde::Deserialize;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

use crate::models::domain::{
    BudgetRange, GeoPoint, LifestyleProfile, ListingProfile, MonthlyCost, MoveInWindow,
    RawLifestyle, RawListingProfile, RawSearcherCriteria, RoomType, SearchArea, SearcherCriteria,
    StayRange,
};
use crate::models::weights::NormalizerDefaults;

const MIN_CLEANLINESS: f64 = 1.0;
const MAX_CLEANLINESS: f64 = 10.0;

/// A record whose shape cannot be interpreted
#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("invalid {role} record: {source}")]
    Malformed {
        role: &'static str,
        source: serde_json::Error,
    },
    #[error("invalid {role} record: expected a JSON object, got {found}")]
    NotAnObject {
        role: &'static str,
        found: &'static str,
    },
}

fn require_object(value: &Value, role: &'static str) -> Result<(), NormalizeError> {
    let found = match value {
        Value::Object(_) => return Ok(()),
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
    };
    Err(NormalizeError::NotAnObject { role, found })
}

/// Normalize a searcher record supplied as JSON
pub fn normalize_searcher(
    value: &Value,
    defaults: &NormalizerDefaults,
) -> Result<SearcherCriteria, NormalizeError> {
    require_object(value, "searcher")?;
    let raw = RawSearcherCriteria::deserialize(value).map_err(|source| {
        NormalizeError::Malformed { role: "searcher", source }
    })?;
    Ok(searcher_from_raw(raw, defaults))
}

/// Normalize a listing record supplied as JSON
pub fn normalize_listing(
    value: &Value,
    defaults: &NormalizerDefaults,
) -> Result<ListingProfile, NormalizeError> {
    require_object(value, "listing")?;
    let raw = RawListingProfile::deserialize(value).map_err(|source| {
        NormalizeError::Malformed { role: "listing", source }
    })?;
    Ok(listing_from_raw(raw, defaults))
}

pub fn searcher_from_raw(raw: RawSearcherCriteria, defaults: &NormalizerDefaults) -> SearcherCriteria {
    let mut desired_features = tag_set(raw.desired_features);
    if let Some(tag) = raw.room_type.and_then(|r| r.feature_tag()) {
        desired_features.insert(tag.to_string());
    }

    let search_area = geo_point(raw.latitude, raw.longitude).map(|center| SearchArea {
        center,
        radius_km: raw
            .radius_km
            .filter(|r| r.is_finite() && *r > 0.0)
            .unwrap_or(defaults.search_radius_km),
    });

    let mut move_in = MoveInWindow {
        earliest: raw.move_in_earliest,
        latest: raw.move_in_latest,
    };
    if let (Some(earliest), Some(latest)) = (move_in.earliest, move_in.latest) {
        if earliest > latest {
            move_in = MoveInWindow { earliest: Some(latest), latest: Some(earliest) };
        }
    }

    SearcherCriteria {
        budget: budget_range(raw.budget_min, raw.budget_max),
        preferred_locations: tag_set(raw.preferred_locations),
        search_area,
        move_in,
        stay: stay_range(raw.min_stay_months, raw.max_stay_months),
        lifestyle: lifestyle(raw.lifestyle.as_ref(), defaults),
        smoker: raw.smoker.unwrap_or(false),
        has_pets: raw.has_pets.unwrap_or(false),
        desired_features,
    }
}

pub fn listing_from_raw(raw: RawListingProfile, defaults: &NormalizerDefaults) -> ListingProfile {
    let monthly_cost = monthly_cost(&raw);
    let mut amenities = tag_set(raw.amenities);
    if let Some(tag) = raw.room_type.unwrap_or(RoomType::Any).feature_tag() {
        amenities.insert(tag.to_string());
    }

    let residents = match (&raw.resident_lifestyle, &raw.residents) {
        (Some(summary), _) => Some(lifestyle(Some(summary), defaults)),
        (None, Some(people)) if !people.is_empty() => Some(summarize_residents(people, defaults)),
        _ => None,
    };

    ListingProfile {
        monthly_cost,
        area_id: raw
            .area_id
            .map(|a| a.trim().to_lowercase())
            .filter(|a| !a.is_empty()),
        location: geo_point(raw.latitude, raw.longitude),
        available_from: raw.available_from,
        stay: stay_range(raw.min_stay_months, raw.max_stay_months),
        amenities,
        // An unknown house rule never fires a hard constraint
        pets_allowed: raw.pets_allowed.unwrap_or(true),
        smoking_allowed: raw.smoking_allowed.unwrap_or(true),
        residents,
    }
}

fn monthly_cost(raw: &RawListingProfile) -> MonthlyCost {
    let amount = match (raw.total_monthly_cost, raw.rent) {
        (Some(total), _) => total,
        (None, Some(rent)) => rent + raw.charges.unwrap_or(0.0),
        (None, None) => return MonthlyCost::Unknown,
    };

    if amount.is_finite() && amount >= 0.0 {
        MonthlyCost::Known(amount)
    } else {
        tracing::debug!("Listing cost {} is not a valid amount, scoring as worst case", amount);
        MonthlyCost::Invalid
    }
}

fn budget_range(min: Option<f64>, max: Option<f64>) -> BudgetRange {
    let min = min.filter(|v| v.is_finite() && *v > 0.0).unwrap_or(0.0);
    // A zero or negative ceiling is indistinguishable from an unset form field
    let max = max.filter(|v| v.is_finite() && *v > 0.0).unwrap_or(f64::INFINITY);

    if min > max {
        BudgetRange { min: max, max: min }
    } else {
        BudgetRange { min, max }
    }
}

fn stay_range(min: Option<i64>, max: Option<i64>) -> StayRange {
    let min_months = min.map(clamp_months).unwrap_or(0);
    let max_months = max.filter(|m| *m > 0).map(clamp_months);

    match max_months {
        Some(max) if min_months > max => StayRange { min_months: max, max_months: Some(min_months) },
        _ => StayRange { min_months, max_months },
    }
}

fn clamp_months(months: i64) -> u32 {
    months.clamp(0, u32::MAX as i64) as u32
}

fn geo_point(latitude: Option<f64>, longitude: Option<f64>) -> Option<GeoPoint> {
    let (latitude, longitude) = (latitude?, longitude?);
    let valid = latitude.is_finite()
        && longitude.is_finite()
        && (-90.0..=90.0).contains(&latitude)
        && (-180.0..=180.0).contains(&longitude);

    valid.then_some(GeoPoint { latitude, longitude })
}

/// Trimmed, lowercased, non-empty tags
fn tag_set(tags: Option<Vec<String>>) -> BTreeSet<String> {
    tags.unwrap_or_default()
        .into_iter()
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

fn cleanliness(value: Option<f64>, defaults: &NormalizerDefaults) -> f64 {
    match value {
        Some(v) if v.is_finite() => v.clamp(MIN_CLEANLINESS, MAX_CLEANLINESS),
        _ => defaults.neutral_cleanliness,
    }
}

fn lifestyle(raw: Option<&RawLifestyle>, defaults: &NormalizerDefaults) -> LifestyleProfile {
    let raw = raw.cloned().unwrap_or_default();
    LifestyleProfile {
        cleanliness: cleanliness(raw.cleanliness, defaults),
        sociability: raw.sociability.unwrap_or_default(),
        schedule: raw.schedule.unwrap_or_default(),
        noise_tolerance: raw.noise_tolerance.unwrap_or_default(),
        diet: raw.diet.unwrap_or_default(),
    }
}

/// Average cleanliness and the most common value of every categorical attribute
fn summarize_residents(people: &[RawLifestyle], defaults: &NormalizerDefaults) -> LifestyleProfile {
    let scores: Vec<f64> = people
        .iter()
        .filter_map(|p| p.cleanliness)
        .filter(|v| v.is_finite())
        .map(|v| v.clamp(MIN_CLEANLINESS, MAX_CLEANLINESS))
        .collect();
    let cleanliness = if scores.is_empty() {
        defaults.neutral_cleanliness
    } else {
        scores.iter().sum::<f64>() / scores.len() as f64
    };

    LifestyleProfile {
        cleanliness,
        sociability: most_common(people.iter().filter_map(|p| p.sociability)).unwrap_or_default(),
        schedule: most_common(people.iter().filter_map(|p| p.schedule)).unwrap_or_default(),
        noise_tolerance: most_common(people.iter().filter_map(|p| p.noise_tolerance))
            .unwrap_or_default(),
        diet: most_common(people.iter().filter_map(|p| p.diet)).unwrap_or_default(),
    }
}

/// Mode of the values; ties go to the earliest variant
fn most_common<T: Copy + Ord>(values: impl Iterator<Item = T>) -> Option<T> {
    let mut counts: BTreeMap<T, usize> = BTreeMap::new();
    for value in values {
        *counts.entry(value).or_insert(0) += 1;
    }

    let mut best: Option<(T, usize)> = None;
    for (value, count) in counts {
        match best {
            Some((_, best_count)) if best_count >= count => {}
            _ => best = Some((value, count)),
        }
    }
    best.map(|(value, _)| value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::domain::{Diet, NoiseTolerance, Schedule, Sociability};
    use serde_json::json;

    fn defaults() -> NormalizerDefaults {
        NormalizerDefaults::default()
    }

    #[test]
    fn test_empty_searcher_gets_neutral_defaults() {
        let searcher = normalize_searcher(&json!({}), &defaults()).unwrap();

        assert_eq!(searcher.budget.min, 0.0);
        assert!(searcher.budget.max.is_infinite());
        assert_eq!(searcher.lifestyle.cleanliness, 5.0);
        assert_eq!(searcher.lifestyle.sociability, Sociability::Balanced);
        assert_eq!(searcher.lifestyle.schedule, Schedule::Regular);
        assert_eq!(searcher.lifestyle.noise_tolerance, NoiseTolerance::Moderate);
        assert_eq!(searcher.lifestyle.diet, Diet::NoPreference);
        assert!(searcher.search_area.is_none());
        assert!(searcher.desired_features.is_empty());
        assert!(!searcher.has_pets && !searcher.smoker);
    }

    #[test]
    fn test_empty_listing_gets_neutral_defaults() {
        let listing = normalize_listing(&json!({}), &defaults()).unwrap();

        assert_eq!(listing.monthly_cost, MonthlyCost::Unknown);
        assert!(listing.location.is_none());
        assert!(listing.amenities.is_empty());
        assert!(listing.pets_allowed && listing.smoking_allowed);
        assert!(listing.residents.is_none());
    }

    #[test]
    fn test_wrong_type_is_rejected() {
        let err = normalize_listing(&json!({ "total_monthly_cost": "cheap" }), &defaults())
            .unwrap_err();
        assert!(err.to_string().starts_with("invalid listing record"));

        assert!(normalize_searcher(&json!("not an object"), &defaults()).is_err());
        assert!(normalize_searcher(&json!({ "lifestyle": { "diet": "carnivore" } }), &defaults()).is_err());
    }

    #[test]
    fn test_non_object_records_are_rejected() {
        for value in [json!(null), json!([]), json!(42), json!("listing")] {
            let err = normalize_listing(&value, &defaults()).unwrap_err();
            assert!(matches!(err, NormalizeError::NotAnObject { role: "listing", .. }));
        }

        let err = normalize_searcher(&Value::Null, &defaults()).unwrap_err();
        assert_eq!(err.to_string(), "invalid searcher record: expected a JSON object, got null");
    }

    #[test]
    fn test_camel_case_aliases() {
        let searcher = normalize_searcher(
            &json!({ "budgetMin": 500, "budgetMax": 800, "hasPets": true }),
            &defaults(),
        )
        .unwrap();

        assert_eq!(searcher.budget, BudgetRange { min: 500.0, max: 800.0 });
        assert!(searcher.has_pets);
    }

    #[test]
    fn test_garbage_numbers_are_clamped() {
        let searcher = normalize_searcher(
            &json!({ "budget_min": -100, "budget_max": 0, "min_stay_months": -3,
                     "lifestyle": { "cleanliness": 42 } }),
            &defaults(),
        )
        .unwrap();
        assert_eq!(searcher.budget.min, 0.0);
        assert!(searcher.budget.max.is_infinite());
        assert_eq!(searcher.stay.min_months, 0);
        assert_eq!(searcher.lifestyle.cleanliness, 10.0);

        let listing = normalize_listing(&json!({ "total_monthly_cost": -5 }), &defaults()).unwrap();
        assert_eq!(listing.monthly_cost, MonthlyCost::Invalid);
    }

    #[test]
    fn test_inverted_ranges_are_swapped() {
        let searcher = normalize_searcher(
            &json!({ "budget_min": 900, "budget_max": 600,
                     "min_stay_months": 12, "max_stay_months": 3,
                     "move_in_earliest": "2025-06-01", "move_in_latest": "2025-05-01" }),
            &defaults(),
        )
        .unwrap();

        assert_eq!(searcher.budget, BudgetRange { min: 600.0, max: 900.0 });
        assert_eq!(searcher.stay, StayRange { min_months: 3, max_months: Some(12) });
        assert!(searcher.move_in.earliest < searcher.move_in.latest);
    }

    #[test]
    fn test_rent_plus_charges() {
        let listing = normalize_listing(&json!({ "rent": 650, "charges": 80 }), &defaults()).unwrap();
        assert_eq!(listing.monthly_cost, MonthlyCost::Known(730.0));

        let listing = normalize_listing(
            &json!({ "total_monthly_cost": 700, "rent": 650, "charges": 80 }),
            &defaults(),
        )
        .unwrap();
        assert_eq!(listing.monthly_cost, MonthlyCost::Known(700.0));
    }

    #[test]
    fn test_cost_and_amenities_from_same_record() {
        let listing = normalize_listing(
            &json!({ "rent": 600, "charges": 50, "amenities": ["Wifi", "balcony"], "room_type": "studio" }),
            &defaults(),
        )
        .unwrap();

        assert_eq!(listing.monthly_cost, MonthlyCost::Known(650.0));
        let expected: BTreeSet<String> =
            ["wifi", "balcony", "room:studio"].iter().map(|s| s.to_string()).collect();
        assert_eq!(listing.amenities, expected);
    }

    #[test]
    fn test_geo_point_requires_both_valid_coordinates() {
        let searcher = normalize_searcher(&json!({ "latitude": 48.85 }), &defaults()).unwrap();
        assert!(searcher.search_area.is_none());

        let searcher =
            normalize_searcher(&json!({ "latitude": 123.0, "longitude": 2.35 }), &defaults()).unwrap();
        assert!(searcher.search_area.is_none());

        let searcher =
            normalize_searcher(&json!({ "latitude": 48.85, "longitude": 2.35 }), &defaults()).unwrap();
        assert_eq!(searcher.search_area.unwrap().radius_km, 10.0);
    }

    #[test]
    fn test_tags_and_room_type() {
        let searcher = normalize_searcher(
            &json!({ "desired_features": [" WiFi ", "washer", ""], "room_type": "private_room" }),
            &defaults(),
        )
        .unwrap();
        let expected: BTreeSet<String> =
            ["wifi", "washer", "room:private_room"].iter().map(|s| s.to_string()).collect();
        assert_eq!(searcher.desired_features, expected);

        let listing = normalize_listing(&json!({ "room_type": "any" }), &defaults()).unwrap();
        assert!(listing.amenities.is_empty());
    }

    #[test]
    fn test_residents_are_summarized() {
        let listing = normalize_listing(
            &json!({ "residents": [
                { "cleanliness": 8, "sociability": "outgoing", "schedule": "night_owl" },
                { "cleanliness": 6, "sociability": "outgoing" },
                { "sociability": "reserved", "diet": "vegan" },
            ] }),
            &defaults(),
        )
        .unwrap();

        let residents = listing.residents.unwrap();
        assert_eq!(residents.cleanliness, 7.0);
        assert_eq!(residents.sociability, Sociability::Outgoing);
        assert_eq!(residents.schedule, Schedule::NightOwl);
        assert_eq!(residents.noise_tolerance, NoiseTolerance::Moderate);
        assert_eq!(residents.diet, Diet::Vegan);
    }

    #[test]
    fn test_precomputed_summary_wins_over_residents() {
        let listing = normalize_listing(
            &json!({ "resident_lifestyle": { "cleanliness": 9 },
                     "residents": [{ "cleanliness": 2 }] }),
            &defaults(),
        )
        .unwrap();
        assert_eq!(listing.residents.unwrap().cleanliness, 9.0);
    }

    #[test]
    fn test_most_common_breaks_ties_by_declaration_order() {
        let mode = most_common([Schedule::NightOwl, Schedule::EarlyBird].into_iter());
        assert_eq!(mode, Some(Schedule::EarlyBird));
        assert_eq!(most_common(std::iter::empty::<Schedule>()), None);
    }
}
