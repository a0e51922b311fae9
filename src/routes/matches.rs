use actix_web::{web, HttpResponse, Responder};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use validator::Validate;

use crate::config::MatchingSettings;
use crate::core::{BatchMatcher, BatchOptions, Matcher};
use crate::models::{BatchMatchRequest, BatchMatchResponse, ErrorResponse, HealthResponse, MatchRequest};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub matcher: Matcher,
    pub batch: BatchMatcher,
    pub matching: MatchingSettings,
}

impl AppState {
    pub fn new(matcher: Matcher, matching: MatchingSettings) -> Self {
        let batch = BatchMatcher::new(matcher.clone(), matching.concurrency);
        Self { matcher, batch, matching }
    }
}

/// Configure all match-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/match", web::post().to(match_pair))
        .route("/match/batch", web::post().to(match_batch));
}

/// Health check endpoint
async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Score a single pair
///
/// POST /api/v1/match
///
/// Request body:
/// ```json
/// {
///   "searcher": { "budget_min": 500, "budget_max": 800 },
///   "listing": { "total_monthly_cost": 700 },
///   "mode": "forward"
/// }
/// ```
async fn match_pair(state: web::Data<AppState>, req: web::Json<MatchRequest>) -> impl Responder {
    let req = req.into_inner();

    match state.matcher.match_records(&req.searcher, &req.listing, req.mode) {
        Ok(result) => {
            tracing::debug!("Scored pair in {:?} mode: {}", req.mode, result.score);
            HttpResponse::Ok().json(result)
        }
        Err(e) => {
            tracing::info!("Rejected match request: {}", e);
            HttpResponse::BadRequest().json(ErrorResponse {
                error: "Invalid record".to_string(),
                message: e.to_string(),
                status_code: 400,
            })
        }
    }
}

/// Rank many candidates against one profile
///
/// POST /api/v1/match/batch
///
/// Request body:
/// ```json
/// {
///   "profile": { "budget_max": 800 },
///   "mode": "forward",
///   "candidates": [{ "candidate_id": "l-1", "record": { "total_monthly_cost": 700 } }],
///   "top_k": 20,
///   "concurrency": 8
/// }
/// ```
async fn match_batch(state: web::Data<AppState>, req: web::Json<BatchMatchRequest>) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for batch request: field_errors={:?}", errors);
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Validation failed".to_string(),
            message: errors.to_string(),
            status_code: 400,
        });
    }

    let req = req.into_inner();
    let max_batch_size = state.matching.max_batch_size;
    if req.candidates.len() > max_batch_size {
        return HttpResponse::PayloadTooLarge().json(ErrorResponse {
            error: "Batch too large".to_string(),
            message: format!(
                "{} candidates submitted, at most {} are accepted",
                req.candidates.len(),
                max_batch_size
            ),
            status_code: 413,
        });
    }

    let batch_id = uuid::Uuid::new_v4().to_string();
    tracing::info!(
        "Batch {}: ranking {} candidates in {:?} mode",
        batch_id,
        req.candidates.len(),
        req.mode
    );

    let cancel = CancellationToken::new();
    let deadline = arm_deadline(state.matching.batch_timeout_ms, &cancel);

    let options = BatchOptions {
        top_k: req.top_k,
        concurrency: req.concurrency,
    };
    let outcome = state
        .batch
        .match_many(&req.profile, req.mode, req.candidates, options, cancel)
        .await;

    if let Some(deadline) = deadline {
        deadline.abort();
    }

    match outcome {
        Ok(outcome) => {
            tracing::info!(
                "Batch {}: returning {} of {} candidates (truncated: {})",
                batch_id,
                outcome.entries.len(),
                outcome.total_candidates,
                outcome.truncated
            );

            HttpResponse::Ok().json(BatchMatchResponse {
                batch_id,
                results: outcome.entries,
                truncated: outcome.truncated,
                total_candidates: outcome.total_candidates,
            })
        }
        Err(e) => {
            tracing::info!("Batch {}: rejected profile: {}", batch_id, e);
            HttpResponse::BadRequest().json(ErrorResponse {
                error: "Invalid profile".to_string(),
                message: e.to_string(),
                status_code: 400,
            })
        }
    }
}

/// Cancel `token` once `timeout_ms` elapses. `0` leaves the batch unbounded.
fn arm_deadline(timeout_ms: u64, token: &CancellationToken) -> Option<tokio::task::JoinHandle<()>> {
    if timeout_ms == 0 {
        return None;
    }

    let token = token.clone();
    Some(tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(timeout_ms)).await;
        tracing::warn!("Batch deadline of {}ms reached, cancelling dispatch", timeout_ms);
        token.cancel();
    }))
}
