use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::core::matcher::{MatchProfile, Matcher};
use crate::core::normalizer::NormalizeError;
use crate::models::{BatchCandidate, BatchEntry, MatchMode};

/// Per-call batch controls
#[derive(Debug, Clone, Copy, Default)]
pub struct BatchOptions {
    /// Keep only the best `top_k` entries
    pub top_k: Option<usize>,
    /// Upper bound on concurrently scored pairs
    pub concurrency: Option<usize>,
}

/// Ranked output of a batch
#[derive(Debug, Clone)]
pub struct BatchOutcome {
    pub entries: Vec<BatchEntry>,
    /// Set when cancellation stopped dispatch before every candidate was scored
    pub truncated: bool,
    /// Distinct candidates received
    pub total_candidates: usize,
}

/// Scores one profile against many candidates on a bounded worker pool
#[derive(Debug, Clone)]
pub struct BatchMatcher {
    matcher: Matcher,
    default_concurrency: usize,
}

impl BatchMatcher {
    /// `default_concurrency` falls back to the number of CPU cores
    pub fn new(matcher: Matcher, default_concurrency: Option<usize>) -> Self {
        Self {
            matcher,
            default_concurrency: default_concurrency.unwrap_or_else(num_cpus::get).max(1),
        }
    }

    /// Rank `candidates` against `profile`.
    ///
    /// Fails only when `profile` itself cannot be normalized. A malformed
    /// candidate becomes a zero-score entry carrying the reason. Once `cancel`
    /// fires no further candidates are dispatched; pairs already running are
    /// awaited and the partial ranking is returned with `truncated` set.
    pub async fn match_many(
        &self,
        profile: &serde_json::Value,
        mode: MatchMode,
        candidates: Vec<BatchCandidate>,
        options: BatchOptions,
        cancel: CancellationToken,
    ) -> Result<BatchOutcome, NormalizeError> {
        let profile = self.matcher.prepare(profile, mode)?;
        let matcher = self.matcher.clone();
        let score = move |candidate: BatchCandidate| score_candidate(&matcher, &profile, candidate);

        Ok(self.rank(mode, candidates, options, cancel, score).await)
    }

    async fn rank<F>(
        &self,
        mode: MatchMode,
        candidates: Vec<BatchCandidate>,
        options: BatchOptions,
        cancel: CancellationToken,
        score: F,
    ) -> BatchOutcome
    where
        F: Fn(BatchCandidate) -> BatchEntry + Send + Sync + 'static,
    {
        let candidates = dedupe(label_anonymous(candidates));
        let total_candidates = candidates.len();
        let concurrency = options.concurrency.unwrap_or(self.default_concurrency).max(1);

        tracing::debug!(
            "Scoring {} candidates in {:?} mode with concurrency {}",
            total_candidates,
            mode,
            concurrency
        );

        let (ids, mut slots) = dispatch(Arc::new(score), candidates, concurrency, &cancel).await;
        let dispatched = ids.len();

        let mut entries: Vec<BatchEntry> = ids
            .into_iter()
            .zip(slots.iter_mut())
            .map(|(id, slot)| {
                slot.take().unwrap_or_else(|| {
                    BatchEntry::failed(id, mode, "worker stopped before producing a result".to_string())
                })
            })
            .collect();

        sort_entries(&mut entries);
        if let Some(k) = options.top_k {
            entries.truncate(k);
        }

        let truncated = dispatched < total_candidates;
        if truncated {
            tracing::info!(
                "Batch cancelled after dispatching {} of {} candidates",
                dispatched,
                total_candidates
            );
        }

        BatchOutcome {
            entries,
            truncated,
            total_candidates,
        }
    }
}

/// Spawn one blocking task per candidate, at most `concurrency` at a time.
/// Returns the ids of dispatched candidates and their result slots.
async fn dispatch<F>(
    score: Arc<F>,
    candidates: Vec<BatchCandidate>,
    concurrency: usize,
    cancel: &CancellationToken,
) -> (Vec<String>, Vec<Option<BatchEntry>>)
where
    F: Fn(BatchCandidate) -> BatchEntry + Send + Sync + 'static,
{
    let permits = Arc::new(Semaphore::new(concurrency));
    let mut workers = JoinSet::new();
    let mut ids = Vec::with_capacity(candidates.len());

    for (slot, candidate) in candidates.into_iter().enumerate() {
        let permit = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            permit = permits.clone().acquire_owned() => match permit {
                Ok(permit) => permit,
                Err(_) => break,
            },
        };

        ids.push(candidate.candidate_id.clone());
        let score = score.clone();

        workers.spawn_blocking(move || {
            let _permit = permit;
            (slot, score(candidate))
        });
    }

    let mut slots: Vec<Option<BatchEntry>> = vec![None; ids.len()];
    while let Some(joined) = workers.join_next().await {
        match joined {
            Ok((slot, entry)) => slots[slot] = Some(entry),
            Err(e) => tracing::error!("Match worker failed: {}", e),
        }
    }

    (ids, slots)
}

fn score_candidate(matcher: &Matcher, profile: &MatchProfile, candidate: BatchCandidate) -> BatchEntry {
    let mode = profile.mode();
    if let Some(reason) = candidate.defect {
        tracing::debug!("Candidate {} rejected: {}", candidate.candidate_id, reason);
        return BatchEntry::failed(candidate.candidate_id, mode, reason);
    }

    match matcher.match_one(profile, &candidate.record) {
        Ok(result) => BatchEntry {
            candidate_id: candidate.candidate_id,
            result,
            error: None,
        },
        Err(e) => {
            tracing::debug!("Candidate {} rejected: {}", candidate.candidate_id, e);
            BatchEntry::failed(candidate.candidate_id, mode, e.to_string())
        }
    }
}

/// Entries without a usable id are named after their position in the request
fn label_anonymous(mut candidates: Vec<BatchCandidate>) -> Vec<BatchCandidate> {
    for (position, candidate) in candidates.iter_mut().enumerate() {
        if candidate.candidate_id.is_empty() {
            candidate.candidate_id = format!("#{}", position);
        }
    }
    candidates
}

/// Drop repeated candidate ids, keeping the first occurrence
fn dedupe(candidates: Vec<BatchCandidate>) -> Vec<BatchCandidate> {
    let mut seen = HashSet::new();
    candidates
        .into_iter()
        .filter(|c| {
            let fresh = seen.insert(c.candidate_id.clone());
            if !fresh {
                tracing::warn!("Ignoring duplicate candidate id {}", c.candidate_id);
            }
            fresh
        })
        .collect()
}

/// Score descending, scored before failed, then candidate id ascending
fn sort_entries(entries: &mut [BatchEntry]) {
    entries.sort_by(|a, b| {
        b.result
            .score
            .cmp(&a.result.score)
            .then_with(|| a.is_error().cmp(&b.is_error()))
            .then_with(|| a.candidate_id.cmp(&b.candidate_id))
    });
}
