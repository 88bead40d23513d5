//! TierScheduler: debounce windows and run versioning per analysis tier
//!
//! The host event loop owns the clock: it reports document changes with
//! `note_change(hash, now_ms)` and polls `due(now_ms)` on its timer ticks.
//! Runs are versioned so overlapping in-flight work resolves
//! last-started-wins; tiers never block one another, and a tier whose
//! snapshot hash matches its last applied run is skipped outright.

use serde::{Deserialize, Serialize};

use crate::analysis::change::ChangeDetector;
use crate::analysis::suggestion::Category;

// =============================================================================
// Tiers
// =============================================================================

/// Latency class of one analysis pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnalysisTier {
    Instant,
    Fast,
    Deep,
    AiEnhance,
}

impl AnalysisTier {
    /// The three tiers the scheduler debounces. AiEnhance is driven by the
    /// enhancement queue's own quiet period.
    pub const SCHEDULED: [AnalysisTier; 3] =
        [AnalysisTier::Instant, AnalysisTier::Fast, AnalysisTier::Deep];

    pub fn debounce_ms(&self) -> f64 {
        match self {
            AnalysisTier::Instant => 0.0,
            AnalysisTier::Fast => 600.0,
            AnalysisTier::Deep => 2000.0,
            AnalysisTier::AiEnhance => 2000.0,
        }
    }

    /// Categories this tier owns. Tier replacement removes exactly the
    /// suggestions in these categories, which is equivalent to removing ids
    /// with this tier's prefix set since every id starts with its category.
    pub fn categories(&self) -> &'static [Category] {
        match self {
            AnalysisTier::Instant => &[Category::Spelling],
            AnalysisTier::Fast => &[Category::Grammar, Category::Style],
            AnalysisTier::Deep => &[Category::Seo, Category::Readability],
            AnalysisTier::AiEnhance => &[],
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisTier::Instant => "instant",
            AnalysisTier::Fast => "fast",
            AnalysisTier::Deep => "deep",
            AnalysisTier::AiEnhance => "ai-enhance",
        }
    }

    fn index(&self) -> usize {
        match self {
            AnalysisTier::Instant => 0,
            AnalysisTier::Fast => 1,
            AnalysisTier::Deep => 2,
            AnalysisTier::AiEnhance => usize::MAX,
        }
    }
}

// =============================================================================
// Scheduler state
// =============================================================================

#[derive(Debug, Clone, Copy)]
struct PendingWindow {
    deadline_ms: f64,
    hash: u64,
}

#[derive(Debug, Default)]
struct TierState {
    pending: Option<PendingWindow>,
    /// Newest started run id; completions for older ids are stale.
    latest_run: u64,
    detector: ChangeDetector,
    runs_started: u64,
    runs_applied: u64,
    runs_discarded: u64,
    runs_skipped: u64,
    runs_failed: u64,
}

/// A run the host should execute now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledRun {
    pub tier: AnalysisTier,
    pub run_id: u64,
    pub hash: u64,
}

/// Aggregate counters, serialized into conductor status output.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TierStats {
    pub tier: String,
    pub runs_started: u64,
    pub runs_applied: u64,
    pub runs_discarded: u64,
    pub runs_skipped: u64,
    pub runs_failed: u64,
}

#[derive(Debug, Default)]
pub struct TierScheduler {
    tiers: [TierState; 3],
    run_seq: u64,
}

impl TierScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a document change at `now_ms`. Every tier's debounce window
    /// restarts from this change; the latest snapshot hash supersedes any
    /// pending one.
    pub fn note_change(&mut self, hash: u64, now_ms: f64) {
        for tier in AnalysisTier::SCHEDULED {
            let state = &mut self.tiers[tier.index()];
            state.pending = Some(PendingWindow {
                deadline_ms: now_ms + tier.debounce_ms(),
                hash,
            });
        }
    }

    /// Collect tiers whose debounce deadline has passed. Unchanged snapshots
    /// are skipped without starting a run.
    pub fn due(&mut self, now_ms: f64) -> Vec<ScheduledRun> {
        let mut runs = Vec::new();
        for tier in AnalysisTier::SCHEDULED {
            let state = &mut self.tiers[tier.index()];
            let Some(window) = state.pending else { continue };
            if window.deadline_ms > now_ms {
                continue;
            }
            state.pending = None;
            if state.detector.last_hash() == Some(window.hash) {
                state.runs_skipped += 1;
                continue;
            }
            self.run_seq += 1;
            state.latest_run = self.run_seq;
            state.runs_started += 1;
            runs.push(ScheduledRun {
                tier,
                run_id: self.run_seq,
                hash: window.hash,
            });
        }
        runs
    }

    /// Decide whether a completed run may be applied. Only the newest
    /// started run per tier wins; anything older is discarded on arrival.
    pub fn try_apply(&mut self, run: ScheduledRun) -> bool {
        let state = &mut self.tiers[run.tier.index()];
        if run.run_id == state.latest_run {
            state.detector.record(run.hash);
            state.runs_applied += 1;
            true
        } else {
            state.runs_discarded += 1;
            false
        }
    }

    /// Record a failed run. The tier's previous results stay authoritative
    /// and the next debounced change retries naturally, so the last applied
    /// hash is left untouched.
    pub fn note_failure(&mut self, run: ScheduledRun) {
        self.tiers[run.tier.index()].runs_failed += 1;
    }

    /// True when any tier has a pending window at or before `now_ms + horizon`.
    pub fn has_pending(&self) -> bool {
        self.tiers.iter().any(|t| t.pending.is_some())
    }

    /// Earliest pending deadline, for host timer scheduling.
    pub fn next_deadline(&self) -> Option<f64> {
        self.tiers
            .iter()
            .filter_map(|t| t.pending.map(|w| w.deadline_ms))
            .min_by(|a, b| a.partial_cmp(b).expect("deadlines are finite"))
    }

    pub fn stats(&self) -> Vec<TierStats> {
        AnalysisTier::SCHEDULED
            .iter()
            .map(|tier| {
                let state = &self.tiers[tier.index()];
                TierStats {
                    tier: tier.as_str().to_string(),
                    runs_started: state.runs_started,
                    runs_applied: state.runs_applied,
                    runs_discarded: state.runs_discarded,
                    runs_skipped: state.runs_skipped,
                    runs_failed: state.runs_failed,
                }
            })
            .collect()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::change::content_hash;

    fn tiers_of(runs: &[ScheduledRun]) -> Vec<AnalysisTier> {
        runs.iter().map(|r| r.tier).collect()
    }

    #[test]
    fn test_instant_fires_immediately() {
        let mut scheduler = TierScheduler::new();
        scheduler.note_change(content_hash("a"), 1000.0);
        let runs = scheduler.due(1000.0);
        assert_eq!(tiers_of(&runs), vec![AnalysisTier::Instant]);
    }

    #[test]
    fn test_fast_waits_for_debounce() {
        let mut scheduler = TierScheduler::new();
        scheduler.note_change(content_hash("a"), 1000.0);
        scheduler.due(1000.0);
        assert!(scheduler.due(1500.0).is_empty());
        let runs = scheduler.due(1600.0);
        assert_eq!(tiers_of(&runs), vec![AnalysisTier::Fast]);
    }

    #[test]
    fn test_deep_fires_last() {
        let mut scheduler = TierScheduler::new();
        scheduler.note_change(content_hash("a"), 0.0);
        scheduler.due(0.0);
        scheduler.due(600.0);
        let runs = scheduler.due(2000.0);
        assert_eq!(tiers_of(&runs), vec![AnalysisTier::Deep]);
    }

    #[test]
    fn test_new_change_pushes_deadline() {
        let mut scheduler = TierScheduler::new();
        scheduler.note_change(content_hash("a"), 0.0);
        scheduler.due(0.0);
        // A second change before the fast window fires restarts it
        scheduler.note_change(content_hash("ab"), 500.0);
        assert!(scheduler.due(600.0).iter().all(|r| r.tier != AnalysisTier::Fast));
        let runs = scheduler.due(1100.0);
        assert!(tiers_of(&runs).contains(&AnalysisTier::Fast));
    }

    #[test]
    fn test_unchanged_hash_is_skipped() {
        let mut scheduler = TierScheduler::new();
        let hash = content_hash("same");
        scheduler.note_change(hash, 0.0);
        for run in scheduler.due(0.0) {
            assert!(scheduler.try_apply(run));
        }
        // Same content again: instant tier must not start a second run
        scheduler.note_change(hash, 10.0);
        assert!(scheduler.due(10.0).is_empty());
        assert_eq!(scheduler.stats()[0].runs_skipped, 1);
    }

    #[test]
    fn test_last_started_wins() {
        let mut scheduler = TierScheduler::new();
        scheduler.note_change(content_hash("a"), 0.0);
        let first = scheduler.due(0.0)[0];
        scheduler.note_change(content_hash("ab"), 1.0);
        let second = scheduler.due(1.0)[0];
        assert_eq!(first.tier, second.tier);

        // The newer run resolves first; the older one is stale on arrival
        assert!(scheduler.try_apply(second));
        assert!(!scheduler.try_apply(first));
        let stats = &scheduler.stats()[0];
        assert_eq!(stats.runs_applied, 1);
        assert_eq!(stats.runs_discarded, 1);
    }

    #[test]
    fn test_failure_leaves_hash_unrecorded() {
        let mut scheduler = TierScheduler::new();
        let hash = content_hash("a");
        scheduler.note_change(hash, 0.0);
        let run = scheduler.due(0.0)[0];
        scheduler.note_failure(run);
        // The same content schedules again: the failed run never recorded
        // its hash, so the retry is not skipped
        scheduler.note_change(hash, 10.0);
        assert_eq!(scheduler.due(10.0).len(), 1);
    }

    #[test]
    fn test_tiers_run_independently() {
        let mut scheduler = TierScheduler::new();
        scheduler.note_change(content_hash("a"), 0.0);
        let runs = scheduler.due(5000.0);
        assert_eq!(
            tiers_of(&runs),
            vec![AnalysisTier::Instant, AnalysisTier::Fast, AnalysisTier::Deep]
        );
    }

    #[test]
    fn test_next_deadline() {
        let mut scheduler = TierScheduler::new();
        assert!(scheduler.next_deadline().is_none());
        scheduler.note_change(content_hash("a"), 100.0);
        assert_eq!(scheduler.next_deadline(), Some(100.0));
    }

    #[test]
    fn test_tier_category_ownership_is_disjoint() {
        let mut seen = std::collections::HashSet::new();
        for tier in AnalysisTier::SCHEDULED {
            for category in tier.categories() {
                assert!(seen.insert(*category), "category owned twice");
            }
        }
        assert_eq!(seen.len(), 5);
    }
}
