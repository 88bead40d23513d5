//! Decoration projection: tracked suggestions as renderable highlights
//!
//! The core stays renderer-agnostic: it emits plain decoration records and
//! the host's adapter (an editor plugin, a canvas overlay, a test double)
//! implements `DecorationSink` to draw them and to route click and hover
//! events back by suggestion id.

use serde::{Deserialize, Serialize};

use crate::analysis::suggestion::{Category, Severity};
use crate::analysis::tracker::SuggestionTracker;

// =============================================================================
// Types
// =============================================================================

/// One highlight over a live-document range.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Decoration {
    pub from: usize,
    pub to: usize,
    pub suggestion_id: String,
    pub category: Category,
    pub severity: Severity,
    /// True once the backing suggestion carries a successful AI enrichment.
    pub ai_enhanced: bool,
}

/// Rendering adapter implemented by the host.
pub trait DecorationSink {
    fn render(&mut self, decorations: &[Decoration]);
}

// =============================================================================
// Projection
// =============================================================================

/// Project the tracker's current bindings into decoration records,
/// ascending by span start. Unattached suggestions produce no decoration.
pub fn decoration_plan(tracker: &SuggestionTracker) -> Vec<Decoration> {
    tracker
        .get_positions()
        .into_iter()
        .filter_map(|position| {
            let suggestion = tracker.get_suggestion(&position.suggestion_id)?;
            Some(Decoration {
                from: position.from,
                to: position.to,
                suggestion_id: position.suggestion_id.clone(),
                category: suggestion.category,
                severity: suggestion.severity,
                ai_enhanced: suggestion.ai_enhanced(),
            })
        })
        .collect()
}

// =============================================================================
// Tests
// =============================================================================
