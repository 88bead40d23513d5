//! AnalysisConductor: single coordinator for the analysis pipeline
//!
//! # Design Principles
//! 1. State machine: Uninitialized -> Ready; entry points reject before init
//! 2. One `tick()` drives every due tier and the enhancement queue
//! 3. The host owns the clock, the fetches, and the editing surface; the
//!    conductor owns every piece of analysis state
//!
//! # Usage
//! ```rust,ignore
//! let mut conductor = AnalysisConductor::new();
//! conductor.init();
//! conductor.set_document(&doc, now_ms);
//! let outcome = conductor.tick(now_ms);        // due tiers run here
//! for request in outcome.requests { /* host fetches, then completes */ }
//! let decorations = conductor.decorations();   // render
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

use crate::analysis::change::content_hash;
use crate::analysis::decorations::{decoration_plan, Decoration};
use crate::analysis::dedup::SuggestionMerger;
use crate::analysis::factory::create_suggestions;
use crate::analysis::scheduler::{AnalysisTier, ScheduledRun, TierScheduler, TierStats};
use crate::analysis::suggestion::{ActionKind, AiEnhancement, Suggestion};
use crate::analysis::tracker::{SuggestionTracker, TrackerStats};
use crate::analyzers::{AnalyzerRegistry, DocumentMetadata};
use crate::document::edit::EditDelta;
use crate::document::extract::{extract, Snapshot};
use crate::document::tree::DocTree;
use crate::enhance::protocol::{validate_response, EnhancementRequest, EnhancementResponse};
use crate::enhance::queue::{BatchResolution, EnhancementQueue, FailureKind, QueueStats};

// =============================================================================
// Types
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Fresh instance, not yet accepting documents
    Uninitialized,
    /// Accepting documents and ticks
    Ready,
}

/// Non-fatal pipeline notice (failed analyzer, failed batch, rate limit).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notice {
    pub phase: String,
    pub message: String,
}

/// What one tick did.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct TickOutcome {
    pub suggestions_changed: bool,
    /// Enhancement batches the host should dispatch.
    pub requests: Vec<EnhancementRequest>,
}

/// A replace-at-range instruction for the host's document engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextReplacement {
    pub from: usize,
    pub to: usize,
    pub value: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConductorStats {
    pub tiers: Vec<TierStats>,
    pub tracker: TrackerStats,
    pub queue: QueueStats,
}

// =============================================================================
// AnalysisConductor
// =============================================================================

#[wasm_bindgen]
pub struct AnalysisConductor {
    state: State,
    registry: AnalyzerRegistry,
    scheduler: TierScheduler,
    merger: SuggestionMerger,
    tracker: SuggestionTracker,
    queue: EnhancementQueue,
    metadata: DocumentMetadata,
    doc: DocTree,
    snapshot: Snapshot,
    // Per-source suggestion buckets feeding the merger
    instant_results: Vec<Suggestion>,
    fast_results: Vec<Suggestion>,
    deep_results: Vec<Suggestion>,
    /// AI enrichment by suggestion id, attached at merge time.
    enhancements: HashMap<String, AiEnhancement>,
    notices: Vec<Notice>,
}

impl Default for AnalysisConductor {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalysisConductor {
    pub fn new() -> Self {
        Self::with_parts(
            AnalyzerRegistry::with_defaults(),
            SuggestionMerger::default(),
            EnhancementQueue::default(),
        )
    }

    /// Construct with injected collaborators (custom analyzers, conflict
    /// policy, cache configuration).
    pub fn with_parts(
        registry: AnalyzerRegistry,
        merger: SuggestionMerger,
        queue: EnhancementQueue,
    ) -> Self {
        Self {
            state: State::Uninitialized,
            registry,
            scheduler: TierScheduler::new(),
            merger,
            tracker: SuggestionTracker::new(),
            queue,
            metadata: DocumentMetadata::default(),
            doc: DocTree::default(),
            snapshot: Snapshot::default(),
            instant_results: Vec::new(),
            fast_results: Vec::new(),
            deep_results: Vec::new(),
            enhancements: HashMap::new(),
            notices: Vec::new(),
        }
    }

    /// Idempotent; must run before documents are accepted.
    pub fn init(&mut self) {
        if self.state == State::Uninitialized {
            self.state = State::Ready;
        }
    }

    pub fn is_ready(&self) -> bool {
        self.state == State::Ready
    }

    pub fn state_name(&self) -> &'static str {
        match self.state {
            State::Uninitialized => "uninitialized",
            State::Ready => "ready",
        }
    }

    /// Set document metadata. Auto-initializes, and re-debounces every tier
    /// because deep-tier output depends on it.
    pub fn hydrate_metadata(&mut self, metadata: DocumentMetadata, now_ms: f64) {
        if self.state == State::Uninitialized {
            self.init();
        }
        self.metadata = metadata;
        let hash = self.context_hash();
        self.scheduler.note_change(hash, now_ms);
    }

    /// Report a new document state (a content change). Rejected before
    /// `init()`.
    pub fn set_document(&mut self, doc: &DocTree, now_ms: f64) -> bool {
        if self.state != State::Ready {
            return false;
        }
        self.doc = doc.clone();
        self.snapshot = extract(&self.doc);
        let hash = self.context_hash();
        self.scheduler.note_change(hash, now_ms);
        true
    }

    /// Report an edit transaction. Tracked positions remap synchronously on
    /// this path so highlights never visibly drift; analysis re-debounces.
    pub fn apply_edit(&mut self, delta: &EditDelta, doc: &DocTree, now_ms: f64) -> bool {
        if self.state != State::Ready {
            return false;
        }
        self.tracker.update_positions(delta, doc);
        self.set_document(doc, now_ms)
    }

    /// Run every due tier, rebuild the merged view if anything changed, and
    /// drain the enhancement queue.
    pub fn tick(&mut self, now_ms: f64) -> TickOutcome {
        let mut outcome = TickOutcome::default();
        if self.state != State::Ready {
            return outcome;
        }

        let mut changed = false;
        for run in self.scheduler.due(now_ms) {
            if self.run_tier(run) {
                changed = true;
            }
        }

        if changed {
            self.rebuild(now_ms);
            outcome.suggestions_changed = true;
        }

        let poll = self.queue.poll(
            now_ms,
            &self.snapshot.text,
            &self.metadata,
            self.context_hash(),
        );
        if !poll.cached_results.is_empty() {
            let ids = poll.cached_results.iter().map(|r| r.id.clone()).collect();
            self.apply_resolution(BatchResolution {
                suggestion_ids: ids,
                results: poll.cached_results,
                failed: false,
            });
            self.rebuild(now_ms);
            outcome.suggestions_changed = true;
        }
        outcome.requests = poll.requests;
        outcome
    }

    /// Execute one scheduled tier run. Returns true when the tier's bucket
    /// was replaced.
    fn run_tier(&mut self, run: ScheduledRun) -> bool {
        let output = self
            .registry
            .run_tier(run.tier, &self.snapshot.text, &self.metadata);

        for failure in &output.failures {
            self.notices.push(Notice {
                phase: format!("{}:{}", run.tier.as_str(), failure.analyzer),
                message: failure.message.clone(),
            });
        }

        // Every analyzer in the tier failing is a tier failure: keep the
        // prior bucket instead of destructively clearing it
        let tier_size = self.registry.tier_len(run.tier);
        if tier_size > 0 && output.failures.len() == tier_size {
            self.scheduler.note_failure(run);
            return false;
        }

        if !self.scheduler.try_apply(run) {
            // A newer run for this tier already started; discard on arrival
            return false;
        }

        let owned = run.tier.categories();
        let findings = output
            .findings
            .into_iter()
            .filter(|f| owned.contains(&f.category))
            .collect();
        let batch = create_suggestions(findings, &self.snapshot.text);

        match run.tier {
            AnalysisTier::Instant => self.instant_results = batch,
            AnalysisTier::Fast => self.fast_results = batch,
            AnalysisTier::Deep => self.deep_results = batch,
            AnalysisTier::AiEnhance => {}
        }
        true
    }

    /// Merge the source buckets, re-track positions, and feed the
    /// enhancement queue from the merged view.
    fn rebuild(&mut self, now_ms: f64) {
        let client: Vec<Suggestion> = self
            .instant_results
            .iter()
            .chain(self.fast_results.iter())
            .cloned()
            .collect();
        let server = self.deep_results.clone();

        let ai: Vec<Suggestion> = client
            .iter()
            .chain(server.iter())
            .filter_map(|s| {
                self.enhancements.get(&s.id).map(|e| {
                    let mut enhanced = s.clone();
                    enhanced.enhancement = Some(e.clone());
                    enhanced
                })
            })
            .collect();

        // Enrichment for ids no longer present died with its suggestion
        let live_ids: std::collections::HashSet<&String> =
            client.iter().chain(server.iter()).map(|s| &s.id).collect();
        self.enhancements.retain(|id, _| live_ids.contains(id));

        let merged = self.merger.merge(&client, &server, &ai);
        self.queue.offer(&merged, now_ms);
        self.tracker.add_suggestions(merged, &self.doc);
    }

    // =========================================================================
    // Enhancement results
    // =========================================================================

    /// Merge a completed enhancement batch. A schema-invalid response fails
    /// the whole batch; its suggestions keep their pre-AI fixes.
    pub fn complete_enhancement(
        &mut self,
        batch_id: u64,
        response: EnhancementResponse,
        now_ms: f64,
    ) -> bool {
        if let Err(message) = validate_response(&response) {
            self.notices.push(Notice {
                phase: "ai-enhance".to_string(),
                message,
            });
            let resolution = self.queue.fail(batch_id, FailureKind::MalformedResponse);
            self.apply_resolution(resolution);
            self.rebuild(now_ms);
            return false;
        }

        let resolution = self.queue.complete(batch_id, response.suggestions, now_ms);
        if resolution.suggestion_ids.is_empty() {
            // Duplicate or superseded batch: idempotent no-op
            return false;
        }
        self.apply_resolution(resolution);
        self.rebuild(now_ms);
        true
    }

    /// Fail an enhancement batch (network error, rate limit). Prior fixes
    /// stay authoritative.
    pub fn fail_enhancement(&mut self, batch_id: u64, kind: FailureKind, now_ms: f64) {
        let message = match kind {
            FailureKind::RateLimited => {
                "AI enhancement paused: rate limit reached".to_string()
            }
            FailureKind::Network => "AI enhancement unavailable".to_string(),
            FailureKind::MalformedResponse => {
                "AI enhancement returned an unusable response".to_string()
            }
        };
        self.notices.push(Notice {
            phase: "ai-enhance".to_string(),
            message,
        });
        let resolution = self.queue.fail(batch_id, kind);
        self.apply_resolution(resolution);
        self.rebuild(now_ms);
    }

    /// Re-enable AI dispatch after the host's quota window reset.
    pub fn reset_quota(&mut self) {
        self.queue.reset_quota();
    }

    fn apply_resolution(&mut self, resolution: BatchResolution) {
        if resolution.failed {
            for id in resolution.suggestion_ids {
                self.enhancements.insert(
                    id,
                    AiEnhancement {
                        fix: None,
                        confidence: 0.0,
                        reasoning: String::new(),
                        should_replace: false,
                        alternative_fixes: Vec::new(),
                        error: true,
                    },
                );
            }
            return;
        }
        for result in resolution.results {
            // Ids with no response entry are simply left unenhanced
            self.enhancements.insert(
                result.id.clone(),
                AiEnhancement {
                    fix: result.enhanced_fix,
                    confidence: result.confidence,
                    reasoning: result.reasoning,
                    should_replace: result.should_replace,
                    alternative_fixes: result.alternative_fixes,
                    error: false,
                },
            );
        }
    }

    // =========================================================================
    // Read access
    // =========================================================================

    /// Merged suggestions in display order.
    pub fn suggestions(&self) -> Vec<Suggestion> {
        self.tracker.suggestions().into_iter().cloned().collect()
    }

    /// Current highlight plan.
    pub fn decorations(&self) -> Vec<Decoration> {
        decoration_plan(&self.tracker)
    }

    /// The suggestion whose highlight covers a live position.
    pub fn suggestion_at(&self, pos: usize) -> Option<Suggestion> {
        self.tracker.suggestion_at(pos).cloned()
    }

    /// Build the replace-at-range instruction for applying a fix. With no
    /// action index, prefers a replacing AI fix and falls back to the first
    /// direct fix action.
    pub fn apply_fix(&self, id: &str, action_index: Option<usize>) -> Option<TextReplacement> {
        let suggestion = self.tracker.get_suggestion(id)?;
        let position = self.tracker.get_position(id)?;

        let value = match action_index {
            Some(index) => {
                let action = suggestion.actions.get(index)?;
                match action.kind {
                    ActionKind::Fix | ActionKind::AiFix => action.value.clone(),
                    _ => return None,
                }
            }
            None => match &suggestion.enhancement {
                Some(e) if !e.error && e.should_replace => match &e.fix {
                    Some(fix) => fix.clone(),
                    None => suggestion.primary_fix()?.value.clone(),
                },
                _ => suggestion.primary_fix()?.value.clone(),
            },
        };

        Some(TextReplacement {
            from: position.from,
            to: position.to,
            value,
        })
    }

    /// Drain accumulated notices.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// Earliest pending debounce deadline, for host timer scheduling.
    pub fn next_deadline(&self) -> Option<f64> {
        self.scheduler.next_deadline()
    }

    pub fn stats(&self) -> ConductorStats {
        ConductorStats {
            tiers: self.scheduler.stats(),
            tracker: self.tracker.stats(),
            queue: self.queue.stats().clone(),
        }
    }

    /// Hash of everything a tier run depends on: the snapshot text plus the
    /// metadata the deep tier reads.
    fn context_hash(&self) -> u64 {
        content_hash(&format!(
            "{}\u{1f}{}\u{1f}{}\u{1f}{}\u{1f}{}",
            self.snapshot.text,
            self.metadata.title,
            self.metadata.meta_description,
            self.metadata.target_keyword,
            self.metadata.keywords.join(","),
        ))
    }
}

// =============================================================================
// WASM Bindings
// =============================================================================

#[wasm_bindgen]
impl AnalysisConductor {
    /// Create a new conductor (JS binding)
    #[wasm_bindgen(constructor)]
    pub fn js_new() -> Self {
        Self::new()
    }

    /// Initialize (JS binding)
    #[wasm_bindgen(js_name = "init")]
    pub fn js_init(&mut self) {
        self.init();
    }

    /// Check readiness (JS binding)
    #[wasm_bindgen(js_name = "isReady")]
    pub fn js_is_ready(&self) -> bool {
        self.is_ready()
    }

    /// Hydrate document metadata (JS binding)
    /// Expects { title, meta_description, target_keyword, keywords }
    #[wasm_bindgen(js_name = "hydrateMetadata")]
    pub fn js_hydrate_metadata(&mut self, metadata: JsValue, now_ms: f64) -> Result<(), JsValue> {
        let metadata: DocumentMetadata = serde_wasm_bindgen::from_value(metadata)
            .map_err(|e| JsValue::from_str(&format!("Failed to parse metadata: {}", e)))?;
        self.hydrate_metadata(metadata, now_ms);
        Ok(())
    }

    /// Report a document change (JS binding)
    /// Expects { blocks: [{ runs: [string] }] }
    #[wasm_bindgen(js_name = "setDocument")]
    pub fn js_set_document(&mut self, doc: JsValue, now_ms: f64) -> Result<bool, JsValue> {
        let doc: DocTree = serde_wasm_bindgen::from_value(doc)
            .map_err(|e| JsValue::from_str(&format!("Failed to parse document: {}", e)))?;
        Ok(self.set_document(&doc, now_ms))
    }

    /// Report an edit transaction (JS binding)
    /// Delta shape: { changes: [{ start, old_len, new_len }] }
    #[wasm_bindgen(js_name = "applyEdit")]
    pub fn js_apply_edit(
        &mut self,
        delta: JsValue,
        doc: JsValue,
        now_ms: f64,
    ) -> Result<bool, JsValue> {
        let delta: EditDelta = serde_wasm_bindgen::from_value(delta)
            .map_err(|e| JsValue::from_str(&format!("Failed to parse delta: {}", e)))?;
        let doc: DocTree = serde_wasm_bindgen::from_value(doc)
            .map_err(|e| JsValue::from_str(&format!("Failed to parse document: {}", e)))?;
        Ok(self.apply_edit(&delta, &doc, now_ms))
    }

    /// Drive the pipeline (JS binding). Returns { suggestions_changed,
    /// requests } or null on serialization failure.
    #[wasm_bindgen(js_name = "tick")]
    pub fn js_tick(&mut self, now_ms: f64) -> JsValue {
        let outcome = self.tick(now_ms);
        match serde_wasm_bindgen::to_value(&outcome) {
            Ok(v) => v,
            Err(e) => {
                crate::log_warn(&format!("[AnalysisConductor] Serialization failed: {:?}", e));
                JsValue::NULL
            }
        }
    }

    /// Drive the pipeline on the host clock (JS binding)
    #[wasm_bindgen(js_name = "tickNow")]
    pub fn js_tick_now(&mut self) -> JsValue {
        self.js_tick(js_sys::Date::now())
    }

    /// Current merged suggestions (JS binding)
    #[wasm_bindgen(js_name = "suggestions")]
    pub fn js_suggestions(&self) -> JsValue {
        serde_wasm_bindgen::to_value(&self.suggestions()).unwrap_or(JsValue::NULL)
    }

    /// Current decoration plan (JS binding)
    #[wasm_bindgen(js_name = "decorations")]
    pub fn js_decorations(&self) -> JsValue {
        serde_wasm_bindgen::to_value(&self.decorations()).unwrap_or(JsValue::NULL)
    }

    /// Suggestion covering a live position (JS binding)
    #[wasm_bindgen(js_name = "suggestionAt")]
    pub fn js_suggestion_at(&self, pos: usize) -> JsValue {
        match self.suggestion_at(pos) {
            Some(s) => serde_wasm_bindgen::to_value(&s).unwrap_or(JsValue::NULL),
            None => JsValue::NULL,
        }
    }

    /// Merge a completed enhancement batch (JS binding). The body is the
    /// raw response text; schema violations fail the batch.
    #[wasm_bindgen(js_name = "completeEnhancement")]
    pub fn js_complete_enhancement(&mut self, batch_id: u64, body: &str, now_ms: f64) -> bool {
        match crate::enhance::protocol::parse_response(body) {
            Ok(response) => self.complete_enhancement(batch_id, response, now_ms),
            Err(message) => {
                crate::log_warn(&format!("[AnalysisConductor] {}", message));
                self.fail_enhancement(batch_id, FailureKind::MalformedResponse, now_ms);
                false
            }
        }
    }

    /// Fail an enhancement batch (JS binding). Kind is one of "network",
    /// "malformed-response", "rate-limited".
    #[wasm_bindgen(js_name = "failEnhancement")]
    pub fn js_fail_enhancement(&mut self, batch_id: u64, kind: &str, now_ms: f64) {
        let kind = match kind {
            "rate-limited" => FailureKind::RateLimited,
            "malformed-response" => FailureKind::MalformedResponse,
            _ => FailureKind::Network,
        };
        self.fail_enhancement(batch_id, kind, now_ms);
    }

    /// Reset the AI quota gate (JS binding)
    #[wasm_bindgen(js_name = "resetQuota")]
    pub fn js_reset_quota(&mut self) {
        self.reset_quota();
    }

    /// Replace-at-range instruction for a fix (JS binding). Negative
    /// action_index means "best available".
    #[wasm_bindgen(js_name = "applyFix")]
    pub fn js_apply_fix(&self, id: &str, action_index: i32) -> JsValue {
        let index = usize::try_from(action_index).ok();
        match self.apply_fix(id, index) {
            Some(replacement) => {
                serde_wasm_bindgen::to_value(&replacement).unwrap_or(JsValue::NULL)
            }
            None => JsValue::NULL,
        }
    }

    /// Drain notices (JS binding)
    #[wasm_bindgen(js_name = "takeNotices")]
    pub fn js_take_notices(&mut self) -> JsValue {
        serde_wasm_bindgen::to_value(&self.take_notices()).unwrap_or(JsValue::NULL)
    }

    /// Earliest pending deadline in ms, or -1 (JS binding)
    #[wasm_bindgen(js_name = "nextDeadline")]
    pub fn js_next_deadline(&self) -> f64 {
        self.next_deadline().unwrap_or(-1.0)
    }

    /// Pipeline status (JS binding)
    #[wasm_bindgen(js_name = "getStatus")]
    pub fn js_get_status(&self) -> JsValue {
        let stats = self.stats();
        let status = serde_json::json!({
            "state": self.state_name(),
            "suggestion_count": stats.tracker.suggestions,
            "tracked_count": stats.tracker.tracked,
            "quota_blocked": stats.queue.quota_blocked,
            "tiers": stats.tiers,
            "queue": stats.queue,
        });
        JsValue::from_str(&status.to_string())
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::suggestion::{Category, Severity};
    use crate::enhance::protocol::EnhancementResult;

    fn ready_conductor(text: &str) -> AnalysisConductor {
        let mut conductor = AnalysisConductor::new();
        conductor.init();
        conductor.set_document(&DocTree::from_paragraphs(&[text]), 0.0);
        conductor
    }

    /// Advance far enough that every analysis tier has fired.
    fn settle(conductor: &mut AnalysisConductor, start_ms: f64) {
        conductor.tick(start_ms);
        conductor.tick(start_ms + 600.0);
        conductor.tick(start_ms + 2000.0);
    }

    #[test]
    fn test_rejects_documents_before_init() {
        let mut conductor = AnalysisConductor::new();
        assert!(!conductor.set_document(&DocTree::from_paragraphs(&["x"]), 0.0));
        conductor.init();
        assert!(conductor.set_document(&DocTree::from_paragraphs(&["x"]), 0.0));
    }

    #[test]
    fn test_end_to_end_grammar_scenario() {
        let mut conductor = ready_conductor("Their is a problem");
        conductor.tick(600.0);

        let suggestions = conductor.suggestions();
        let confusion = suggestions
            .iter()
            .find(|s| s.rule_id == "grammar/common-confusion")
            .expect("grammar finding present");
        assert_eq!(
            confusion.id,
            "grammar:common-confusion:grammar/common-confusion:0"
        );
        assert_eq!(confusion.severity, Severity::Warning);
        assert_eq!(confusion.actions.len(), 1);
        assert_eq!(confusion.actions[0].value, "There");
        assert_eq!(confusion.actions[0].kind, ActionKind::Fix);
    }

    #[test]
    fn test_end_to_end_seo_scenario() {
        let mut conductor = AnalysisConductor::new();
        conductor.init();
        conductor.hydrate_metadata(
            DocumentMetadata {
                title: "Exactly twenty-nine chars ti".to_string() + "t",
                ..Default::default()
            },
            0.0,
        );
        conductor.set_document(&DocTree::from_paragraphs(&["Some body text."]), 0.0);
        settle(&mut conductor, 0.0);

        let suggestions = conductor.suggestions();
        let title_short = suggestions
            .iter()
            .find(|s| s.rule_id == "seo/title-too-short")
            .expect("title finding");
        let meta_missing = suggestions
            .iter()
            .find(|s| s.rule_id == "seo/meta-missing")
            .expect("meta finding");
        assert!(title_short.position.is_none());
        assert!(meta_missing.position.is_none());
    }

    #[test]
    fn test_spelling_highlight_tracks_and_applies() {
        let mut conductor = ready_conductor("please fix teh bug");
        conductor.tick(0.0);

        let decorations = conductor.decorations();
        assert_eq!(decorations.len(), 1);
        let id = decorations[0].suggestion_id.clone();

        let replacement = conductor.apply_fix(&id, None).expect("fix available");
        assert_eq!((replacement.from, replacement.to), (12, 15));
        assert_eq!(replacement.value, "the");
    }

    #[test]
    fn test_tier_rerun_with_clean_text_clears_tier() {
        let mut conductor = ready_conductor("please fix teh bug");
        conductor.tick(0.0);
        assert_eq!(conductor.suggestions().len(), 1);

        // The misspelling is fixed; instant tier re-runs with zero findings
        conductor.set_document(&DocTree::from_paragraphs(&["please fix the bug"]), 100.0);
        conductor.tick(100.0);
        assert!(conductor
            .suggestions()
            .iter()
            .all(|s| s.category != Category::Spelling));
    }

    #[test]
    fn test_tier_replacement_does_not_touch_other_tiers() {
        let mut conductor = ready_conductor("Their is a teh problem");
        settle(&mut conductor, 0.0);
        let had_grammar = conductor
            .suggestions()
            .iter()
            .any(|s| s.category == Category::Grammar);
        assert!(had_grammar);

        // Fix only the misspelling; grammar results must survive the
        // instant tier's re-run untouched
        conductor.set_document(&DocTree::from_paragraphs(&["Their is a the problem"]), 5000.0);
        conductor.tick(5000.0);
        let suggestions = conductor.suggestions();
        assert!(suggestions.iter().all(|s| s.category != Category::Spelling));
        assert!(suggestions.iter().any(|s| s.category == Category::Grammar));
    }

    #[test]
    fn test_edit_remaps_highlight_synchronously() {
        let mut conductor = ready_conductor("please fix teh bug");
        conductor.tick(0.0);
        let before = conductor.decorations()[0].clone();

        // Insert five characters at the front of the block text
        let edited = DocTree::from_paragraphs(&["12345please fix teh bug"]);
        conductor.apply_edit(&EditDelta::insertion(1, 5), &edited, 50.0);

        let after = &conductor.decorations()[0];
        assert_eq!(after.from, before.from + 5);
        assert_eq!(after.to, before.to + 5);
    }

    #[test]
    fn test_enhancement_flow() {
        let mut conductor = ready_conductor("We met in order to plan the work");
        conductor.tick(600.0);

        // The style suggestion is eligible; the queue dispatches after its
        // quiet period
        let outcome = conductor.tick(2000.0);
        assert_eq!(outcome.requests.len(), 1);
        let request = &outcome.requests[0];
        assert_eq!(request.category, "style");

        let target = request.target_suggestion_ids[0].clone();
        let response = EnhancementResponse {
            suggestions: vec![EnhancementResult {
                id: target.clone(),
                enhanced_fix: Some("to".to_string()),
                confidence: 0.93,
                reasoning: "tighter".to_string(),
                should_replace: true,
                alternative_fixes: vec![],
            }],
        };
        assert!(conductor.complete_enhancement(request.batch_id, response, 2100.0));

        let enhanced = conductor
            .suggestions()
            .into_iter()
            .find(|s| s.id == target)
            .unwrap();
        assert!(enhanced.ai_enhanced());
        assert_eq!(
            enhanced.enhancement.as_ref().unwrap().fix.as_deref(),
            Some("to")
        );
    }

    #[test]
    fn test_failed_enhancement_marks_error_and_keeps_fixes() {
        let mut conductor = ready_conductor("We met in order to plan the work");
        conductor.tick(600.0);
        let outcome = conductor.tick(2000.0);
        let request = &outcome.requests[0];
        let target = request.target_suggestion_ids[0].clone();

        conductor.fail_enhancement(request.batch_id, FailureKind::Network, 2100.0);

        let suggestion = conductor
            .suggestions()
            .into_iter()
            .find(|s| s.id == target)
            .unwrap();
        assert!(!suggestion.ai_enhanced());
        assert!(suggestion.enhancement.as_ref().unwrap().error);
        // The analyzer's own fix is still there to fall back on
        assert!(suggestion.primary_fix().is_some());

        let notices = conductor.take_notices();
        assert!(notices.iter().any(|n| n.phase == "ai-enhance"));
    }

    #[test]
    fn test_rate_limit_surfaces_distinct_notice() {
        let mut conductor = ready_conductor("We met in order to plan the work");
        conductor.tick(600.0);
        let outcome = conductor.tick(2000.0);
        conductor.fail_enhancement(
            outcome.requests[0].batch_id,
            FailureKind::RateLimited,
            2100.0,
        );
        assert!(conductor.stats().queue.quota_blocked);
        let notices = conductor.take_notices();
        assert!(notices.iter().any(|n| n.message.contains("rate limit")));

        conductor.reset_quota();
        assert!(!conductor.stats().queue.quota_blocked);
    }

    #[test]
    fn test_unchanged_text_does_not_rerun() {
        let mut conductor = ready_conductor("please fix teh bug");
        conductor.tick(0.0);
        // Same content reported again
        conductor.set_document(&DocTree::from_paragraphs(&["please fix teh bug"]), 100.0);
        conductor.tick(100.0);
        assert_eq!(conductor.stats().tiers[0].runs_skipped, 1);
    }

    #[test]
    fn test_positioned_sort_before_document_wide_in_output() {
        let mut conductor = AnalysisConductor::new();
        conductor.init();
        conductor.hydrate_metadata(
            DocumentMetadata {
                title: "short".to_string(),
                ..Default::default()
            },
            0.0,
        );
        conductor.set_document(&DocTree::from_paragraphs(&["please fix teh bug"]), 0.0);
        settle(&mut conductor, 0.0);

        let suggestions = conductor.suggestions();
        let first_wide = suggestions.iter().position(|s| s.position.is_none());
        let last_positioned = suggestions.iter().rposition(|s| s.position.is_some());
        if let (Some(first_wide), Some(last_positioned)) = (first_wide, last_positioned) {
            assert!(last_positioned < first_wide);
        } else {
            panic!("expected both positioned and document-wide suggestions");
        }
    }

    #[test]
    fn test_metadata_change_reruns_deep_tier() {
        let mut conductor = AnalysisConductor::new();
        conductor.init();
        conductor.set_document(&DocTree::from_paragraphs(&["Some body text."]), 0.0);
        settle(&mut conductor, 0.0);
        let deep_applied = conductor.stats().tiers[2].runs_applied;

        conductor.hydrate_metadata(
            DocumentMetadata {
                title: "A different title".to_string(),
                ..Default::default()
            },
            3000.0,
        );
        conductor.tick(6000.0);
        assert_eq!(conductor.stats().tiers[2].runs_applied, deep_applied + 1);
    }
}
