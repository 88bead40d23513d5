//! SuggestionFactory: normalizes raw findings into canonical suggestions
//!
//! The id scheme is the load-bearing part: `category:subCategory:ruleId:
//! positionKey`, where the position key is the plain-text start offset or
//! the literal `global` for document-wide findings. The same rule firing at
//! the same location in two different tiers therefore produces the same id,
//! which is what makes tier replacement swap suggestions instead of
//! duplicating them. A rule firing twice at the same start with different
//! ends overwrites; last write wins.

use crate::analysis::suggestion::{PlainSpan, Suggestion, SuggestionAction};
use crate::analyzers::Finding;

/// Position key token for suggestions with no span.
pub const GLOBAL_POSITION_KEY: &str = "global";

/// Short matched text is widened to a word-boundary context window so the
/// tracker can find it unambiguously.
const MIN_UNIQUE_MATCH_LEN: usize = 5;

/// Maximum candidate fixes carried on one suggestion.
const MAX_ACTIONS: usize = 3;

// =============================================================================
// Id derivation
// =============================================================================

/// Deterministic suggestion id.
pub fn make_id(
    category: crate::analysis::suggestion::Category,
    sub_category: &str,
    rule_id: &str,
    position: Option<usize>,
) -> String {
    let position_key = match position {
        Some(start) => start.to_string(),
        None => GLOBAL_POSITION_KEY.to_string(),
    };
    format!(
        "{}:{}:{}:{}",
        category.as_str(),
        sub_category,
        rule_id,
        position_key
    )
}

/// Parse the numeric position key back out of an id. `None` for
/// document-wide ids.
pub fn position_key_of(id: &str) -> Option<usize> {
    id.rsplit(':').next().and_then(|tail| tail.parse().ok())
}

// =============================================================================
// Context windows
// =============================================================================

/// Widen `[start, end)` to word boundaries with one extra word of context on
/// each side. Deterministic for a given text and span.
fn context_window(text: &str, start: usize, end: usize) -> (usize, usize) {
    let mut lo = start;
    // Back up over the word containing/preceding start
    let mut seen_gap = false;
    for (i, c) in text[..start].char_indices().rev() {
        if c.is_whitespace() {
            if seen_gap {
                lo = i + c.len_utf8();
                break;
            }
            seen_gap = true;
            lo = i;
        } else {
            lo = i;
        }
        if i == 0 {
            lo = 0;
        }
    }

    let mut hi = end;
    let mut seen_gap = false;
    for (i, c) in text[end..].char_indices() {
        if c.is_whitespace() {
            if seen_gap {
                break;
            }
            seen_gap = true;
        }
        hi = end + i + c.len_utf8();
    }

    (lo, hi)
}

// =============================================================================
// Factory
// =============================================================================

/// Build a canonical suggestion from one analyzer finding against the text
/// snapshot it was produced from.
pub fn create_suggestion(finding: Finding, text: &str) -> Suggestion {
    let span = finding
        .span
        .filter(|(start, end)| start < end && *end <= text.len());

    let (original_text, match_text, position) = match span {
        Some((start, end)) => {
            let original = text[start..end].to_string();
            let matched = if original.len() < MIN_UNIQUE_MATCH_LEN {
                let (lo, hi) = context_window(text, start, end);
                text[lo..hi].to_string()
            } else {
                original.clone()
            };
            (original, matched, Some(PlainSpan::new(start, end)))
        }
        None => (String::new(), String::new(), None),
    };

    let actions: Vec<SuggestionAction> = finding
        .replacements
        .iter()
        .take(MAX_ACTIONS)
        .map(|value| SuggestionAction::fix(format!("Replace with \"{}\"", value), value.clone()))
        .collect();

    Suggestion {
        id: make_id(
            finding.category,
            &finding.sub_category,
            &finding.rule_id,
            span.map(|(start, _)| start),
        ),
        category: finding.category,
        sub_category: finding.sub_category,
        rule_id: finding.rule_id,
        severity: finding.severity,
        title: finding.title,
        message: finding.message,
        match_text,
        original_text,
        position,
        actions,
        enhancement: None,
    }
}

/// Convert a batch of findings. Same-id collisions resolve last-write-wins.
pub fn create_suggestions(findings: Vec<Finding>, text: &str) -> Vec<Suggestion> {
    let mut out: Vec<Suggestion> = Vec::with_capacity(findings.len());
    for finding in findings {
        let suggestion = create_suggestion(finding, text);
        if let Some(existing) = out.iter_mut().find(|s| s.id == suggestion.id) {
            *existing = suggestion;
        } else {
            out.push(suggestion);
        }
    }
    out
}

// =============================================================================
// Tests
// =============================================================================
