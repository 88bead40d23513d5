//! EnhancementQueue: selecting and batching suggestions for AI rewrite
//!
//! Eligible suggestions accumulate until a quiet period elapses (or a size
//! cap forces dispatch), then go out as one batch per category. Responses
//! merge back by id, idempotently; failed batches fall back to their pre-AI
//! fixes and are dropped from the queue, never retried in a loop.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::cache::{batch_cache_key, TtlCache};
use super::protocol::{EnhancementRequest, EnhancementResult};
use crate::analysis::suggestion::{Category, Suggestion};
use crate::analyzers::spelling::is_confusable_word;
use crate::analyzers::DocumentMetadata;

/// Quiet period before a pending batch dispatches. New arrivals reset it,
/// coalescing edit bursts into one dispatch.
pub const QUIET_PERIOD_MS: f64 = 1000.0;
/// Dispatch immediately once this many suggestions are pending.
pub const DISPATCH_CAP: usize = 16;
/// Upper bound on suggestions per batch request.
pub const MAX_BATCH_SIZE: usize = 8;

// =============================================================================
// Eligibility
// =============================================================================

/// Decide whether a suggestion merits an enhancement call.
pub fn should_enhance(suggestion: &Suggestion) -> bool {
    if suggestion.enhancement.is_some() {
        return false;
    }
    if suggestion.is_document_wide() && suggestion.match_text.is_empty() {
        // Nothing for the model to rewrite
        return false;
    }
    if suggestion.category == Category::Spelling
        && is_confusable_word(&suggestion.original_text)
    {
        return true;
    }
    if matches!(suggestion.category, Category::Style | Category::Seo) {
        return true;
    }
    if suggestion.primary_fix().is_none() {
        return true;
    }
    // A direct dictionary-grade fix needs no rewrite
    false
}

// =============================================================================
// Queue
// =============================================================================

/// Why a batch failed. Rate limiting additionally blocks dispatch until the
/// host resets the quota.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailureKind {
    Network,
    MalformedResponse,
    RateLimited,
}

#[derive(Debug, Clone)]
struct InflightBatch {
    suggestion_ids: Vec<String>,
    cache_key: String,
}

/// Output of one queue poll.
#[derive(Debug, Default)]
pub struct PollOutcome {
    /// Batches the host should send to the service.
    pub requests: Vec<EnhancementRequest>,
    /// Results served straight from the cache, ready to merge.
    pub cached_results: Vec<EnhancementResult>,
}

/// Outcome of a completed or failed batch, for the conductor to merge.
#[derive(Debug, Default)]
pub struct BatchResolution {
    pub suggestion_ids: Vec<String>,
    pub results: Vec<EnhancementResult>,
    pub failed: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueueStats {
    pub enqueued: u64,
    pub batches_sent: u64,
    pub batches_completed: u64,
    pub batches_failed: u64,
    pub stale_responses: u64,
    pub quota_blocked: bool,
}

pub struct EnhancementQueue {
    pending: Vec<Suggestion>,
    quiet_deadline: Option<f64>,
    batch_seq: u64,
    inflight: HashMap<u64, InflightBatch>,
    cache: TtlCache,
    quota_blocked: bool,
    stats: QueueStats,
}

impl Default for EnhancementQueue {
    fn default() -> Self {
        Self::new(TtlCache::default())
    }
}

impl EnhancementQueue {
    /// The cache is constructed by the caller and injected, never ambient.
    pub fn new(cache: TtlCache) -> Self {
        Self {
            pending: Vec::new(),
            quiet_deadline: None,
            batch_seq: 0,
            inflight: HashMap::new(),
            cache,
            quota_blocked: false,
            stats: QueueStats::default(),
        }
    }

    /// Offer a fresh suggestion set. Eligible entries not already pending or
    /// in flight join the queue; any new arrival restarts the quiet period.
    pub fn offer(&mut self, suggestions: &[Suggestion], now_ms: f64) {
        let mut added = false;
        for suggestion in suggestions {
            if !should_enhance(suggestion) {
                continue;
            }
            if self.pending.iter().any(|p| p.id == suggestion.id) {
                continue;
            }
            if self
                .inflight
                .values()
                .any(|b| b.suggestion_ids.contains(&suggestion.id))
            {
                continue;
            }
            self.pending.push(suggestion.clone());
            self.stats.enqueued += 1;
            added = true;
        }
        if added {
            self.quiet_deadline = Some(if self.pending.len() >= DISPATCH_CAP {
                now_ms
            } else {
                now_ms + QUIET_PERIOD_MS
            });
        }
    }

    /// Dispatch pending suggestions if the quiet period has elapsed.
    /// Batches are one per category, size-capped, and checked against the
    /// response cache first.
    pub fn poll(
        &mut self,
        now_ms: f64,
        document_snapshot: &str,
        metadata: &DocumentMetadata,
        context_hash: u64,
    ) -> PollOutcome {
        let mut outcome = PollOutcome::default();
        if self.quota_blocked || self.pending.is_empty() {
            return outcome;
        }
        match self.quiet_deadline {
            Some(deadline) if deadline <= now_ms => {}
            _ => return outcome,
        }
        self.quiet_deadline = None;

        let mut by_category: HashMap<Category, Vec<Suggestion>> = HashMap::new();
        for suggestion in self.pending.drain(..) {
            by_category
                .entry(suggestion.category)
                .or_default()
                .push(suggestion);
        }

        for (category, suggestions) in by_category {
            for chunk in suggestions.chunks(MAX_BATCH_SIZE) {
                let ids: Vec<String> = chunk.iter().map(|s| s.id.clone()).collect();
                let cache_key = batch_cache_key(&ids, context_hash);

                if let Some(results) = self.cache.get(&cache_key, now_ms) {
                    outcome.cached_results.extend(results);
                    continue;
                }

                self.batch_seq += 1;
                self.inflight.insert(
                    self.batch_seq,
                    InflightBatch {
                        suggestion_ids: ids.clone(),
                        cache_key,
                    },
                );
                self.stats.batches_sent += 1;
                outcome.requests.push(EnhancementRequest {
                    batch_id: self.batch_seq,
                    category: category.as_str().to_string(),
                    target_suggestion_ids: ids,
                    document_snapshot: document_snapshot.to_string(),
                    metadata: metadata.clone(),
                });
            }
        }
        outcome
    }

    /// Merge a completed batch. Unknown batch ids (duplicate or superseded
    /// responses) resolve to an empty result, which makes re-delivery a
    /// no-op.
    pub fn complete(
        &mut self,
        batch_id: u64,
        results: Vec<EnhancementResult>,
        now_ms: f64,
    ) -> BatchResolution {
        let Some(batch) = self.inflight.remove(&batch_id) else {
            self.stats.stale_responses += 1;
            return BatchResolution::default();
        };
        self.stats.batches_completed += 1;
        self.cache.insert(&batch.cache_key, results.clone(), now_ms);
        BatchResolution {
            suggestion_ids: batch.suggestion_ids,
            results,
            failed: false,
        }
    }

    /// Fail a batch. Its suggestions fall back to their pre-AI fixes and
    /// leave the queue for good; rate limiting additionally stops all
    /// dispatch until the host resets the quota.
    pub fn fail(&mut self, batch_id: u64, kind: FailureKind) -> BatchResolution {
        let Some(batch) = self.inflight.remove(&batch_id) else {
            self.stats.stale_responses += 1;
            return BatchResolution::default();
        };
        self.stats.batches_failed += 1;
        if kind == FailureKind::RateLimited {
            self.quota_blocked = true;
            self.stats.quota_blocked = true;
        }
        BatchResolution {
            suggestion_ids: batch.suggestion_ids,
            results: Vec::new(),
            failed: true,
        }
    }

    /// Re-enable dispatch after the host's quota window reset.
    pub fn reset_quota(&mut self) {
        self.quota_blocked = false;
        self.stats.quota_blocked = false;
    }

    pub fn is_quota_blocked(&self) -> bool {
        self.quota_blocked
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn inflight_len(&self) -> usize {
        self.inflight.len()
    }

    pub fn stats(&self) -> &QueueStats {
        &self.stats
    }
}

// =============================================================================
// Tests
// =============================================================================
