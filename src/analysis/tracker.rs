//! SuggestionTracker: live-document spans for suggestions
//!
//! The tracker is the only owner of live coordinates. Suggestions carry
//! plain-text-origin spans; this module binds them to live positions and
//! keeps those bindings honest as the user types:
//! - rebinding on every analysis pass is a full replace, preferring a
//!   previously tracked span whose text still matches, then falling back to
//!   occurrence-indexed search
//! - every edit transaction remaps synchronously, then re-reads the text at
//!   the mapped span; a mismatch drops the binding rather than letting the
//!   highlight drift onto unrelated text

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::analysis::factory::position_key_of;
use crate::analysis::suggestion::Suggestion;
use crate::document::edit::EditDelta;
use crate::document::extract::extract;
use crate::document::tree::DocTree;

// =============================================================================
// Types
// =============================================================================

/// Live-coordinate span currently believed to correspond to a suggestion.
/// Constructed only inside this module.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackedPosition {
    pub suggestion_id: String,
    pub from: usize,
    pub to: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrackerStats {
    pub suggestions: usize,
    pub tracked: usize,
    pub unattached: usize,
}

#[derive(Debug, Default)]
pub struct SuggestionTracker {
    suggestions: HashMap<String, Suggestion>,
    positions: HashMap<String, TrackedPosition>,
    /// Merged display order of suggestion ids.
    order: Vec<String>,
}

// =============================================================================
// SuggestionTracker
// =============================================================================

impl SuggestionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Full replace of both maps. Prior positions are consulted only as
    /// recovery hints for suggestions that reappear with the same id.
    pub fn add_suggestions(&mut self, new_suggestions: Vec<Suggestion>, doc: &DocTree) {
        let old_positions = std::mem::take(&mut self.positions);
        self.suggestions.clear();
        self.order.clear();

        let snapshot = extract(doc);
        let live_len = doc.live_len();

        // Spans claimed per match text, to keep two suggestions for the
        // same text off one occurrence (overlaps across different texts
        // are legitimate and stay untouched)
        let mut claimed: HashMap<String, Vec<(usize, usize)>> = HashMap::new();
        let mut unlocated: Vec<String> = Vec::new();

        for suggestion in new_suggestions {
            let id = suggestion.id.clone();
            let locatable =
                suggestion.position.is_some() && !suggestion.original_text.is_empty();

            if locatable {
                // Recovery (a): the previously tracked span, if its text
                // still matches exactly
                let reused = old_positions.get(&id).and_then(|old| {
                    let in_bounds = old.from < old.to && old.to <= live_len;
                    (in_bounds && doc.text_between(old.from, old.to) == suggestion.original_text)
                        .then(|| (old.from, old.to))
                });
                if let Some((from, to)) = reused {
                    claimed
                        .entry(suggestion.match_text.clone())
                        .or_default()
                        .push((from, to));
                    self.positions.insert(
                        id.clone(),
                        TrackedPosition {
                            suggestion_id: id.clone(),
                            from,
                            to,
                        },
                    );
                } else {
                    unlocated.push(id.clone());
                }
            }

            self.order.push(id.clone());
            self.suggestions.insert(id, suggestion);
        }

        // Recovery (b): occurrence-indexed scan, grouped by match text so
        // the Nth suggestion binds the Nth free occurrence
        let mut groups: HashMap<String, Vec<String>> = HashMap::new();
        for id in unlocated {
            let match_text = self.suggestions[&id].match_text.clone();
            if match_text.is_empty() {
                continue;
            }
            groups.entry(match_text).or_default().push(id);
        }

        for (match_text, mut ids) in groups {
            ids.sort_by_key(|id| occurrence_order_key(self.suggestions.get(id), id));

            let group_claims = claimed.entry(match_text.clone()).or_default();
            let mut free_occurrences = Vec::new();
            for (plain_start, _) in snapshot.text.match_indices(&match_text) {
                let plain_end = plain_start + match_text.len();
                let Some((from, to)) = snapshot.map.span_to_live(plain_start, plain_end) else {
                    continue;
                };
                if group_claims.iter().any(|(cf, ct)| from < *ct && *cf < to) {
                    continue;
                }
                free_occurrences.push((plain_start, from, to));
            }

            for (id, (plain_start, from, to)) in ids.iter().zip(free_occurrences) {
                let suggestion = &self.suggestions[id];
                let (from, to) = match narrow_to_original(
                    &match_text,
                    &suggestion.original_text,
                    plain_start,
                    &snapshot,
                ) {
                    Some(narrowed) => narrowed,
                    None => (from, to),
                };
                group_claims.push((from, to));
                self.positions.insert(
                    id.clone(),
                    TrackedPosition {
                        suggestion_id: id.clone(),
                        from,
                        to,
                    },
                );
            }
            // Suggestions past the last free occurrence stay unattached;
            // they remain in the list view without a highlight
        }
    }

    /// Remap every tracked span through an edit transaction. Runs
    /// synchronously on the document-update path; spans whose mapped text
    /// no longer matches the suggestion are dropped, never clamped.
    pub fn update_positions(&mut self, delta: &EditDelta, doc: &DocTree) {
        let live_len = doc.live_len();
        let suggestions = &self.suggestions;
        self.positions.retain(|id, tracked| {
            let Some((from, to)) = delta.map_span(tracked.from, tracked.to) else {
                return false;
            };
            if to > live_len {
                return false;
            }
            let Some(suggestion) = suggestions.get(id) else {
                return false;
            };
            if doc.text_between(from, to) != suggestion.original_text {
                return false;
            }
            tracked.from = from;
            tracked.to = to;
            true
        });
    }

    pub fn get_suggestion(&self, id: &str) -> Option<&Suggestion> {
        self.suggestions.get(id)
    }

    pub fn get_position(&self, id: &str) -> Option<&TrackedPosition> {
        self.positions.get(id)
    }

    /// All tracked positions, ascending by span start.
    pub fn get_positions(&self) -> Vec<&TrackedPosition> {
        let mut positions: Vec<&TrackedPosition> = self.positions.values().collect();
        positions.sort_by_key(|p| (p.from, p.to));
        positions
    }

    /// Suggestions in merged display order.
    pub fn suggestions(&self) -> Vec<&Suggestion> {
        self.order
            .iter()
            .filter_map(|id| self.suggestions.get(id))
            .collect()
    }

    /// The suggestion whose tracked span covers the given live position.
    pub fn suggestion_at(&self, pos: usize) -> Option<&Suggestion> {
        self.positions
            .values()
            .filter(|p| p.from <= pos && pos < p.to)
            .min_by_key(|p| p.to - p.from)
            .and_then(|p| self.suggestions.get(&p.suggestion_id))
    }

    pub fn stats(&self) -> TrackerStats {
        TrackerStats {
            suggestions: self.suggestions.len(),
            tracked: self.positions.len(),
            unattached: self.suggestions.len() - self.positions.len(),
        }
    }

    pub fn clear(&mut self) {
        self.suggestions.clear();
        self.positions.clear();
        self.order.clear();
    }
}

/// Ordering key for occurrence assignment: the id's numeric position key,
/// falling back to the plain-text span start.
fn occurrence_order_key(suggestion: Option<&Suggestion>, id: &str) -> usize {
    position_key_of(id)
        .or_else(|| suggestion.and_then(|s| s.position.map(|p| p.start)))
        .unwrap_or(usize::MAX)
}

/// When the original text is a strict substring of the located match
/// window, narrow the live span down to the original's slice of it.
fn narrow_to_original(
    match_text: &str,
    original_text: &str,
    plain_start: usize,
    snapshot: &crate::document::extract::Snapshot,
) -> Option<(usize, usize)> {
    if original_text.is_empty() || original_text == match_text {
        return None;
    }
    let offset = match_text.find(original_text)?;
    let inner_start = plain_start + offset;
    snapshot
        .map
        .span_to_live(inner_start, inner_start + original_text.len())
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::factory::make_id;
    use crate::analysis::suggestion::{Category, PlainSpan, Severity, SuggestionAction};

    fn spelling(position_key: usize, match_text: &str, original: &str) -> Suggestion {
        Suggestion {
            id: make_id(
                Category::Spelling,
                "misspelling",
                "spelling/misspelling",
                Some(position_key),
            ),
            category: Category::Spelling,
            sub_category: "misspelling".to_string(),
            rule_id: "spelling/misspelling".to_string(),
            severity: Severity::Error,
            title: "Possible misspelling".to_string(),
            message: String::new(),
            match_text: match_text.to_string(),
            original_text: original.to_string(),
            position: Some(PlainSpan::new(position_key, position_key + original.len())),
            actions: vec![SuggestionAction::fix("Fix", "receive")],
            enhancement: None,
        }
    }

    #[test]
    fn test_locates_single_occurrence() {
        let doc = DocTree::from_paragraphs(&["please fix teh bug"]);
        let mut tracker = SuggestionTracker::new();
        tracker.add_suggestions(vec![spelling(11, "teh", "teh")], &doc);

        let pos = tracker
            .get_position("spelling:misspelling:spelling/misspelling:11")
            .unwrap();
        assert_eq!((pos.from, pos.to), (12, 15));
        assert_eq!(doc.text_between(pos.from, pos.to), "teh");
    }

    #[test]
    fn test_two_occurrences_bind_in_order() {
        let doc = DocTree::from_paragraphs(&["recieve one then recieve two"]);
        let mut tracker = SuggestionTracker::new();
        tracker.add_suggestions(
            vec![spelling(0, "recieve", "recieve"), spelling(1, "recieve", "recieve")],
            &doc,
        );

        let first = tracker
            .get_position("spelling:misspelling:spelling/misspelling:0")
            .unwrap();
        let second = tracker
            .get_position("spelling:misspelling:spelling/misspelling:1")
            .unwrap();
        // Plain offsets 0 and 17, live offsets shifted by the block open
        assert_eq!((first.from, first.to), (1, 8));
        assert_eq!((second.from, second.to), (18, 25));
        assert_ne!((first.from, first.to), (second.from, second.to));
    }

    #[test]
    fn test_contextual_match_narrows_to_original() {
        let doc = DocTree::from_paragraphs(&["please fix teh bug now"]);
        let mut tracker = SuggestionTracker::new();
        tracker.add_suggestions(vec![spelling(11, "fix teh bug", "teh")], &doc);

        let pos = tracker
            .get_position("spelling:misspelling:spelling/misspelling:11")
            .unwrap();
        assert_eq!(doc.text_between(pos.from, pos.to), "teh");
    }

    #[test]
    fn test_missing_occurrence_keeps_suggestion_without_position() {
        let doc = DocTree::from_paragraphs(&["nothing to see"]);
        let mut tracker = SuggestionTracker::new();
        tracker.add_suggestions(vec![spelling(0, "recieve", "recieve")], &doc);

        let id = "spelling:misspelling:spelling/misspelling:0";
        assert!(tracker.get_suggestion(id).is_some());
        assert!(tracker.get_position(id).is_none());
        assert_eq!(tracker.stats().unattached, 1);
    }

    #[test]
    fn test_document_wide_suggestion_never_tracked() {
        let doc = DocTree::from_paragraphs(&["body"]);
        let mut tracker = SuggestionTracker::new();
        let wide = Suggestion {
            id: "seo:meta:seo/meta-missing:global".to_string(),
            category: Category::Seo,
            sub_category: "meta".to_string(),
            rule_id: "seo/meta-missing".to_string(),
            severity: Severity::Warning,
            title: "Missing meta description".to_string(),
            message: String::new(),
            match_text: String::new(),
            original_text: String::new(),
            position: None,
            actions: vec![],
            enhancement: None,
        };
        tracker.add_suggestions(vec![wide], &doc);
        assert!(tracker.get_position("seo:meta:seo/meta-missing:global").is_none());
        assert_eq!(tracker.suggestions().len(), 1);
    }

    #[test]
    fn test_insert_before_span_shifts_it() {
        let doc = DocTree::from_paragraphs(&["please fix teh bug"]);
        let mut tracker = SuggestionTracker::new();
        tracker.add_suggestions(vec![spelling(11, "teh", "teh")], &doc);

        // Insert 5 characters at the start of the block text
        let edited = DocTree::from_paragraphs(&["12345please fix teh bug"]);
        tracker.update_positions(&EditDelta::insertion(1, 5), &edited);

        let pos = tracker
            .get_position("spelling:misspelling:spelling/misspelling:11")
            .unwrap();
        assert_eq!((pos.from, pos.to), (17, 20));
        assert_eq!(edited.text_between(pos.from, pos.to), "teh");
    }

    #[test]
    fn test_edit_inside_span_drops_position() {
        let doc = DocTree::from_paragraphs(&["please fix teh bug"]);
        let mut tracker = SuggestionTracker::new();
        tracker.add_suggestions(vec![spelling(11, "teh", "teh")], &doc);

        // Replace the "e" inside "teh": text at the span no longer matches
        let edited = DocTree::from_paragraphs(&["please fix tXh bug"]);
        tracker.update_positions(&EditDelta::replacement(13, 1, 1), &edited);

        let id = "spelling:misspelling:spelling/misspelling:11";
        assert!(tracker.get_position(id).is_none());
        // The suggestion itself stays listed until the next analysis pass
        assert!(tracker.get_suggestion(id).is_some());
    }

    #[test]
    fn test_deleting_span_drops_position() {
        let doc = DocTree::from_paragraphs(&["please fix teh bug"]);
        let mut tracker = SuggestionTracker::new();
        tracker.add_suggestions(vec![spelling(11, "teh", "teh")], &doc);

        let edited = DocTree::from_paragraphs(&["please fix  bug"]);
        tracker.update_positions(&EditDelta::deletion(12, 3), &edited);
        assert!(tracker
            .get_position("spelling:misspelling:spelling/misspelling:11")
            .is_none());
    }

    #[test]
    fn test_rebind_prefers_previous_exact_span() {
        // Two identical words; the suggestion was tracked on the second one
        let doc = DocTree::from_paragraphs(&["teh alpha teh beta"]);
        let mut tracker = SuggestionTracker::new();

        // First bind: keys 0 and 10 take occurrences one and two
        tracker.add_suggestions(
            vec![spelling(0, "teh", "teh"), spelling(10, "teh", "teh")],
            &doc,
        );
        let second_span = {
            let p = tracker
                .get_position("spelling:misspelling:spelling/misspelling:10")
                .unwrap();
            (p.from, p.to)
        };
        assert_eq!(doc.text_between(second_span.0, second_span.1), "teh");

        // Re-analysis returns only the second suggestion; its old span still
        // matches, so it must rebind there instead of occurrence one
        tracker.add_suggestions(vec![spelling(10, "teh", "teh")], &doc);
        let rebound = tracker
            .get_position("spelling:misspelling:spelling/misspelling:10")
            .unwrap();
        assert_eq!((rebound.from, rebound.to), second_span);
    }

    #[test]
    fn test_suggestion_at_position() {
        let doc = DocTree::from_paragraphs(&["please fix teh bug"]);
        let mut tracker = SuggestionTracker::new();
        tracker.add_suggestions(vec![spelling(11, "teh", "teh")], &doc);

        assert!(tracker.suggestion_at(13).is_some());
        assert!(tracker.suggestion_at(2).is_none());
    }

    #[test]
    fn test_positions_sorted() {
        let doc = DocTree::from_paragraphs(&["recieve one then recieve two"]);
        let mut tracker = SuggestionTracker::new();
        tracker.add_suggestions(
            vec![spelling(1, "recieve", "recieve"), spelling(0, "recieve", "recieve")],
            &doc,
        );
        let positions = tracker.get_positions();
        assert_eq!(positions.len(), 2);
        assert!(positions[0].from < positions[1].from);
    }
}
