//! Suggestion data model
//!
//! The canonical unit of feedback shown to the user. Suggestions carry only
//! plain-text-origin coordinates; live coordinates belong exclusively to the
//! tracker so the two spaces can never drift apart.

use serde::{Deserialize, Serialize};

// =============================================================================
// Category / Severity
// =============================================================================

/// Closed set of feedback categories. The string form is the leading
/// component of every suggestion id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Spelling,
    Grammar,
    Style,
    Seo,
    Readability,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Spelling => "spelling",
            Category::Grammar => "grammar",
            Category::Style => "style",
            Category::Seo => "seo",
            Category::Readability => "readability",
        }
    }
}

/// Three-level severity ranking. Analyzer sources that emit `info` normalize
/// to `Suggestion`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Suggestion,
}

impl Severity {
    /// Ordinal rank: higher is more severe.
    pub fn rank(&self) -> u8 {
        match self {
            Severity::Error => 2,
            Severity::Warning => 1,
            Severity::Suggestion => 0,
        }
    }
}

// =============================================================================
// Actions
// =============================================================================

/// What applying an action does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActionKind {
    Fix,
    AiFix,
    Ignore,
    Highlight,
    Navigate,
}

/// One candidate fix (or auxiliary action) attached to a suggestion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuggestionAction {
    pub label: String,
    pub value: String,
    pub kind: ActionKind,
}

impl SuggestionAction {
    pub fn fix(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            kind: ActionKind::Fix,
        }
    }
}

// =============================================================================
// AI enrichment
// =============================================================================

/// Enrichment record added by the AI tier. Modeled as a tagged variant on
/// the suggestion rather than loose optional fields: consumers match on
/// presence of the whole record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiEnhancement {
    /// Rewrite produced by the model, if it offered one.
    pub fix: Option<String>,
    /// Model confidence in [0, 1].
    pub confidence: f64,
    pub reasoning: String,
    /// Whether the model's fix should replace the analyzer's fixes.
    pub should_replace: bool,
    #[serde(default)]
    pub alternative_fixes: Vec<String>,
    /// Set when the batch carrying this suggestion failed; pre-AI fixes
    /// remain authoritative.
    #[serde(default)]
    pub error: bool,
}

// =============================================================================
// Suggestion
// =============================================================================

/// Plain-text span at time of creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlainSpan {
    pub start: usize,
    pub end: usize,
}

impl PlainSpan {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn intersects(&self, other: &PlainSpan) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// Canonicalized unit of feedback.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Suggestion {
    /// Deterministic id: `category:subCategory:ruleId:positionKey`.
    pub id: String,
    pub category: Category,
    pub sub_category: String,
    pub rule_id: String,
    pub severity: Severity,
    pub title: String,
    pub message: String,
    /// Search window used to locate the suggestion in the live document.
    /// May be wider than `original_text` when the exact text alone is
    /// ambiguous.
    pub match_text: String,
    /// The exact text the suggestion refers to.
    pub original_text: String,
    /// Absent for document-wide suggestions.
    pub position: Option<PlainSpan>,
    pub actions: Vec<SuggestionAction>,
    /// Present once the AI tier has processed this suggestion.
    pub enhancement: Option<AiEnhancement>,
}

impl Suggestion {
    /// True when AI enrichment succeeded for this suggestion.
    pub fn ai_enhanced(&self) -> bool {
        matches!(&self.enhancement, Some(e) if !e.error)
    }

    /// True for suggestions not anchored to any text span.
    pub fn is_document_wide(&self) -> bool {
        self.position.is_none()
    }

    /// The first direct fix action, if any.
    pub fn primary_fix(&self) -> Option<&SuggestionAction> {
        self.actions
            .iter()
            .find(|a| matches!(a.kind, ActionKind::Fix | ActionKind::AiFix))
    }

    /// Key used to deduplicate document-wide suggestions, independent of
    /// position logic.
    pub fn rule_key(&self) -> String {
        format!("{}:{}:{}", self.category.as_str(), self.sub_category, self.rule_id)
    }
}

// =============================================================================
// Tests
// =============================================================================
