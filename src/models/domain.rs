use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Which side of the marketplace is being scored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// A searcher evaluating a listing
    #[default]
    Forward,
    /// A listing's residents evaluating an applicant
    Reverse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sociability {
    #[serde(alias = "introvert", alias = "quiet")]
    Reserved,
    #[default]
    #[serde(alias = "ambivert")]
    Balanced,
    #[serde(alias = "extrovert", alias = "social")]
    Outgoing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Schedule {
    #[serde(alias = "early")]
    EarlyBird,
    #[default]
    Regular,
    #[serde(alias = "late")]
    NightOwl,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoiseTolerance {
    Low,
    #[default]
    #[serde(alias = "medium")]
    Moderate,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Diet {
    #[default]
    #[serde(alias = "any", alias = "none")]
    NoPreference,
    Omnivore,
    Vegetarian,
    Vegan,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomType {
    #[default]
    Any,
    #[serde(alias = "private")]
    PrivateRoom,
    #[serde(alias = "shared")]
    SharedRoom,
    Studio,
    #[serde(alias = "entire")]
    EntirePlace,
}

impl RoomType {
    /// Tag under which a concrete room type takes part in feature matching
    pub fn feature_tag(&self) -> Option<&'static str> {
        match self {
            RoomType::Any => None,
            RoomType::PrivateRoom => Some("room:private_room"),
            RoomType::SharedRoom => Some("room:shared_room"),
            RoomType::Studio => Some("room:studio"),
            RoomType::EntirePlace => Some("room:entire_place"),
        }
    }
}

// ---------------------------------------------------------------------------
// Raw records, as supplied by the profile store. Every field may be absent.
// ---------------------------------------------------------------------------

/// Lifestyle attributes of one person, or an aggregate of several
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawLifestyle {
    #[serde(default)]
    pub cleanliness: Option<f64>,
    #[serde(default)]
    pub sociability: Option<Sociability>,
    #[serde(default)]
    pub schedule: Option<Schedule>,
    #[serde(default, alias = "noiseTolerance")]
    pub noise_tolerance: Option<NoiseTolerance>,
    #[serde(default)]
    pub diet: Option<Diet>,
}

/// Searcher criteria as captured by onboarding
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawSearcherCriteria {
    #[serde(default, alias = "budgetMin")]
    pub budget_min: Option<f64>,
    #[serde(default, alias = "budgetMax")]
    pub budget_max: Option<f64>,
    #[serde(default, alias = "preferredLocations")]
    pub preferred_locations: Option<Vec<String>>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default, alias = "radiusKm")]
    pub radius_km: Option<f64>,
    #[serde(default, alias = "moveInEarliest")]
    pub move_in_earliest: Option<NaiveDate>,
    #[serde(default, alias = "moveInLatest")]
    pub move_in_latest: Option<NaiveDate>,
    #[serde(default, alias = "minStayMonths")]
    pub min_stay_months: Option<i64>,
    #[serde(default, alias = "maxStayMonths")]
    pub max_stay_months: Option<i64>,
    #[serde(default)]
    pub lifestyle: Option<RawLifestyle>,
    #[serde(default)]
    pub smoker: Option<bool>,
    #[serde(default, alias = "hasPets")]
    pub has_pets: Option<bool>,
    #[serde(default, alias = "desiredFeatures")]
    pub desired_features: Option<Vec<String>>,
    #[serde(default, alias = "roomType")]
    pub room_type: Option<RoomType>,
}

/// Listing profile as published by an owner
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawListingProfile {
    /// Rent plus mandatory charges. Takes precedence over `rent` + `charges`.
    #[serde(default, alias = "totalMonthlyCost")]
    pub total_monthly_cost: Option<f64>,
    #[serde(default)]
    pub rent: Option<f64>,
    #[serde(default)]
    pub charges: Option<f64>,
    #[serde(default, alias = "areaId")]
    pub area_id: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default, alias = "availableFrom")]
    pub available_from: Option<NaiveDate>,
    #[serde(default, alias = "minStayMonths")]
    pub min_stay_months: Option<i64>,
    #[serde(default, alias = "maxStayMonths")]
    pub max_stay_months: Option<i64>,
    #[serde(default)]
    pub amenities: Option<Vec<String>>,
    #[serde(default, alias = "petsAllowed")]
    pub pets_allowed: Option<bool>,
    #[serde(default, alias = "smokingAllowed")]
    pub smoking_allowed: Option<bool>,
    /// Pre-computed summary of the current residents
    #[serde(default, alias = "residentLifestyle")]
    pub resident_lifestyle: Option<RawLifestyle>,
    /// Individual residents, summarised when no pre-computed aggregate is given
    #[serde(default)]
    pub residents: Option<Vec<RawLifestyle>>,
    #[serde(default, alias = "roomType")]
    pub room_type: Option<RoomType>,
}

// ---------------------------------------------------------------------------
// Canonical representation produced by the normalizer
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchArea {
    pub center: GeoPoint,
    pub radius_km: f64,
}

/// Monthly budget. An unset ceiling is `f64::INFINITY`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BudgetRange {
    pub min: f64,
    pub max: f64,
}

/// Move-in window; either end may be open
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MoveInWindow {
    pub earliest: Option<NaiveDate>,
    pub latest: Option<NaiveDate>,
}

impl MoveInWindow {
    /// Days between `date` and the nearest edge of the window, 0 when inside
    pub fn days_outside(&self, date: NaiveDate) -> i64 {
        if let Some(earliest) = self.earliest {
            if date < earliest {
                return (earliest - date).num_days();
            }
        }
        if let Some(latest) = self.latest {
            if date > latest {
                return (date - latest).num_days();
            }
        }
        0
    }
}

/// Closed interval of months; `max_months: None` is unbounded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StayRange {
    pub min_months: u32,
    pub max_months: Option<u32>,
}

impl StayRange {
    pub fn overlaps(&self, other: &StayRange) -> bool {
        let self_max = self.max_months.unwrap_or(u32::MAX);
        let other_max = other.max_months.unwrap_or(u32::MAX);
        self.min_months <= other_max && other.min_months <= self_max
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LifestyleProfile {
    /// 1.0 to 10.0; fractional for resident averages
    pub cleanliness: f64,
    pub sociability: Sociability,
    pub schedule: Schedule,
    pub noise_tolerance: NoiseTolerance,
    pub diet: Diet,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MonthlyCost {
    Known(f64),
    /// Not published
    Unknown,
    /// Garbage value (negative, NaN); scored as the worst admissible cost
    Invalid,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearcherCriteria {
    pub budget: BudgetRange,
    pub preferred_locations: BTreeSet<String>,
    pub search_area: Option<SearchArea>,
    pub move_in: MoveInWindow,
    pub stay: StayRange,
    pub lifestyle: LifestyleProfile,
    pub smoker: bool,
    pub has_pets: bool,
    /// Includes the `room:` tag of a concrete room type preference
    pub desired_features: BTreeSet<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListingProfile {
    pub monthly_cost: MonthlyCost,
    pub area_id: Option<String>,
    pub location: Option<GeoPoint>,
    pub available_from: Option<NaiveDate>,
    pub stay: StayRange,
    /// Includes the `room:` tag of the listing's room type
    pub amenities: BTreeSet<String>,
    pub pets_allowed: bool,
    pub smoking_allowed: bool,
    pub residents: Option<LifestyleProfile>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_days_outside_window() {
        let window = MoveInWindow {
            earliest: Some(date(2025, 3, 1)),
            latest: Some(date(2025, 3, 31)),
        };

        assert_eq!(window.days_outside(date(2025, 3, 15)), 0);
        assert_eq!(window.days_outside(date(2025, 2, 19)), 10);
        assert_eq!(window.days_outside(date(2025, 4, 5)), 5);
    }

    #[test]
    fn test_open_window_contains_everything() {
        let window = MoveInWindow::default();
        assert_eq!(window.days_outside(date(1999, 1, 1)), 0);
    }

    #[test]
    fn test_stay_ranges_overlap_on_shared_edge() {
        let searcher = StayRange { min_months: 3, max_months: Some(6) };
        let listing = StayRange { min_months: 6, max_months: None };
        let too_long = StayRange { min_months: 7, max_months: Some(12) };

        assert!(searcher.overlaps(&listing));
        assert!(!searcher.overlaps(&too_long));
    }

    #[test]
    fn test_mode_deserializes_lowercase() {
        let mode: MatchMode = serde_json::from_str("\"reverse\"").unwrap();
        assert_eq!(mode, MatchMode::Reverse);
        assert_eq!(MatchMode::default(), MatchMode::Forward);
    }

    #[test]
    fn test_enum_aliases() {
        let s: Sociability = serde_json::from_str("\"extrovert\"").unwrap();
        assert_eq!(s, Sociability::Outgoing);
        let n: NoiseTolerance = serde_json::from_str("\"medium\"").unwrap();
        assert_eq!(n, NoiseTolerance::Moderate);
    }
}
