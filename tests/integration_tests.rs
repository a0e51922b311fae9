// Integration tests for nestmatch

use std::collections::HashSet;

use nestmatch::{BatchCandidate, BatchMatcher, BatchOptions, Dimension, MatchMode, Matcher, QualityTier};
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;

fn create_test_searcher() -> Value {
    json!({
        "budgetMin": 450,
        "budgetMax": 750,
        "preferredLocations": ["Guillotiere"],
        "latitude": 45.7530,
        "longitude": 4.8420,
        "radiusKm": 3,
        "moveInEarliest": "2025-09-01",
        "moveInLatest": "2025-09-20",
        "minStayMonths": 6,
        "lifestyle": {
            "cleanliness": 8,
            "sociability": "outgoing",
            "schedule": "night_owl",
            "noise_tolerance": "high",
        },
        "hasPets": false,
        "smoker": false,
        "desiredFeatures": ["wifi", "washer", "balcony"],
    })
}

fn create_test_listing(index: usize) -> Value {
    let residents = [
        json!([{ "cleanliness": 8, "sociability": "outgoing", "schedule": "night_owl" }]),
        json!([{ "cleanliness": 3, "sociability": "reserved", "schedule": "early_bird" }]),
        json!([
            { "cleanliness": 6, "sociability": "balanced" },
            { "cleanliness": 9, "sociability": "outgoing" },
        ]),
        json!([]),
    ];
    let amenities = [json!(["wifi", "washer", "balcony"]), json!(["wifi"]), json!([])];
    let area = if index % 3 == 0 { "guillotiere" } else { "part-dieu" };
    let available_from = format!("2025-{:02}-{:02}", 8 + index % 4, 1 + index % 28);

    json!({
        "totalMonthlyCost": 400 + (index * 13) % 700,
        "areaId": area,
        "latitude": 45.75 + (index % 10) as f64 * 0.01,
        "longitude": 4.84,
        "availableFrom": available_from,
        "minStayMonths": index % 12,
        "amenities": amenities[index % amenities.len()],
        "petsAllowed": index % 5 != 0,
        "residents": residents[index % residents.len()],
    })
}

fn candidates(count: usize) -> Vec<BatchCandidate> {
    (0..count)
        .map(|i| BatchCandidate::new(format!("listing-{:03}", i), create_test_listing(i)))
        .collect()
}

#[test]
fn test_integration_end_to_end_matching() {
    let matcher = Matcher::default();
    let result = matcher
        .match_records(&create_test_searcher(), &create_test_listing(0), MatchMode::Forward)
        .unwrap();

    assert!(result.score <= 100);
    assert_eq!(result.quality_tier, QualityTier::from_score(result.score));
    assert_eq!(result.breakdown.iter().count(), 6);
    assert!(result.insights.contains(&"In your preferred area".to_string()));

    let sum: f64 = result.breakdown.iter().map(|(_, s)| s.raw).sum();
    assert_eq!(result.score as f64, sum.round());
    for (dimension, score) in result.breakdown.iter() {
        assert!(score.raw >= 0.0 && score.raw <= score.max, "{:?} out of range", dimension);
    }
}

#[test]
fn test_integration_scores_stay_in_range() {
    let matcher = Matcher::default();
    let searcher = create_test_searcher();

    for i in 0..50 {
        let result = matcher
            .match_records(&searcher, &create_test_listing(i), MatchMode::Forward)
            .unwrap();
        assert!(result.score <= 100);
        assert!(result.insights.len() <= 5);
        assert!(result.warnings.len() <= 5);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_integration_batch_of_100() {
    let batch = BatchMatcher::new(Matcher::default(), None);
    let options = BatchOptions { top_k: None, concurrency: Some(8) };

    let outcome = batch
        .match_many(
            &create_test_searcher(),
            MatchMode::Forward,
            candidates(100),
            options,
            CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(outcome.entries.len(), 100);
    assert_eq!(outcome.total_candidates, 100);
    assert!(!outcome.truncated);

    let ids: HashSet<&str> = outcome.entries.iter().map(|e| e.candidate_id.as_str()).collect();
    assert_eq!(ids.len(), 100);

    for pair in outcome.entries.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        assert!(a.result.score >= b.result.score);
        if a.result.score == b.result.score {
            assert!(a.candidate_id < b.candidate_id);
        }
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_integration_batch_matches_single_scoring() {
    let matcher = Matcher::default();
    let batch = BatchMatcher::new(matcher.clone(), Some(4));
    let searcher = create_test_searcher();

    let outcome = batch
        .match_many(&searcher, MatchMode::Forward, candidates(20), BatchOptions::default(), CancellationToken::new())
        .await
        .unwrap();

    for entry in &outcome.entries {
        let index: usize = entry.candidate_id.trim_start_matches("listing-").parse().unwrap();
        let single = matcher
            .match_records(&searcher, &create_test_listing(index), MatchMode::Forward)
            .unwrap();
        assert_eq!(entry.result, single);
    }
}

#[tokio::test]
async fn test_integration_malformed_candidate_does_not_abort_batch() {
    let batch = BatchMatcher::new(Matcher::default(), Some(2));
    let mut list = candidates(5);
    list.push(BatchCandidate::new("broken", json!({ "amenities": "wifi" })));

    let outcome = batch
        .match_many(&create_test_searcher(), MatchMode::Forward, list, BatchOptions::default(), CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(outcome.entries.len(), 6);
    let broken = outcome.entries.iter().find(|e| e.candidate_id == "broken").unwrap();
    assert!(broken.is_error());
    assert_eq!(broken.result.score, 0);
    assert_eq!(outcome.entries.iter().filter(|e| e.is_error()).count(), 1);
}

#[test]
fn test_integration_reverse_scores_in_range() {
    let matcher = Matcher::default();
    let listing = create_test_listing(2);

    let applicants = [
        create_test_searcher(),
        json!({}),
        json!({ "hasPets": true, "smoker": true, "lifestyle": { "cleanliness": 1 } }),
        json!({ "desiredFeatures": ["pool", "gym"], "minStayMonths": 24, "maxStayMonths": 36 }),
    ];

    for applicant in &applicants {
        let result = matcher.match_records(applicant, &listing, MatchMode::Reverse).unwrap();
        assert!(result.score <= 100);
        assert_eq!(result.mode, MatchMode::Reverse);
        assert!(result.breakdown.get(Dimension::Budget).is_none());
        assert!(result.breakdown.get(Dimension::Location).is_none());
        assert!(result.breakdown.get(Dimension::Timing).is_none());
        assert_eq!(result.breakdown.iter().count(), 3);

        let max: f64 = result.breakdown.iter().map(|(_, s)| s.max).sum();
        assert!((max - 100.0).abs() < 1e-9);
    }
}

#[tokio::test]
async fn test_integration_reverse_batch_ranks_applicants() {
    let batch = BatchMatcher::new(Matcher::default(), Some(2));
    let applicants = vec![
        BatchCandidate::new(
            "tidy",
            json!({
                "lifestyle": { "cleanliness": 8, "sociability": "outgoing", "schedule": "night_owl" },
                "desiredFeatures": ["wifi"],
            }),
        ),
        BatchCandidate::new(
            "messy",
            json!({
                "lifestyle": { "cleanliness": 1, "sociability": "reserved", "schedule": "early_bird" },
                "desiredFeatures": ["pool"],
                "hasPets": true,
            }),
        ),
    ];
    let listing = json!({
        "petsAllowed": false,
        "amenities": ["wifi"],
        "residents": [{ "cleanliness": 8, "sociability": "outgoing", "schedule": "night_owl" }],
    });

    let outcome = batch
        .match_many(&listing, MatchMode::Reverse, applicants, BatchOptions::default(), CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(outcome.entries[0].candidate_id, "tidy");
    assert_eq!(outcome.entries[0].result.score, 100);
    assert!(outcome.entries[1].result.warnings.contains(&"Pets not allowed".to_string()));
}

#[tokio::test]
async fn test_integration_cancelled_batch_is_truncated() {
    let batch = BatchMatcher::new(Matcher::default(), Some(4));
    let cancel = CancellationToken::new();
    cancel.cancel();

    let outcome = batch
        .match_many(&create_test_searcher(), MatchMode::Forward, candidates(10), BatchOptions::default(), cancel)
        .await
        .unwrap();

    assert!(outcome.truncated);
    assert_eq!(outcome.total_candidates, 10);
    assert!(outcome.entries.len() < 10);
}
