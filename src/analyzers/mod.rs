//! Analyzer set: pluggable checkers over plain text
//!
//! Each analyzer is a pure function of `(text, metadata)` returning raw
//! findings in plain-text coordinates. Analyzers never share mutable state,
//! so a tier can run its subset in any order and memoize by content hash.
//! A failing analyzer contributes zero findings and a logged notice; it can
//! never abort its siblings.
//!
//! - `spelling.rs` - misspelling dictionary scan (Aho-Corasick)
//! - `grammar.rs` - compiled-regex grammar rules
//! - `style.rs` - wordy phrases, passive voice, intensifiers, cliches
//! - `seo.rs` - title/meta/keyword checks (mostly document-wide)
//! - `readability.rs` - Flesch score and long-sentence detection

pub mod grammar;
pub mod readability;
pub mod seo;
pub mod spelling;
pub mod style;

use serde::{Deserialize, Serialize};

use crate::analysis::suggestion::{Category, Severity};

pub use grammar::GrammarAnalyzer;
pub use readability::ReadabilityAnalyzer;
pub use seo::SeoAnalyzer;
pub use spelling::SpellingAnalyzer;
pub use style::StyleAnalyzer;

// =============================================================================
// Types
// =============================================================================

/// Document metadata passed by value into deep-tier analyzers and AI
/// prompts. Empty strings mean "not provided".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentMetadata {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub meta_description: String,
    #[serde(default)]
    pub target_keyword: String,
    #[serde(default)]
    pub keywords: Vec<String>,
}

/// Raw analyzer output before normalization into a Suggestion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Finding {
    /// Rule identity, `<category>/<rule-name>`.
    pub rule_id: String,
    pub sub_category: String,
    pub category: Category,
    /// Plain-text span; absent for document-wide findings.
    pub span: Option<(usize, usize)>,
    pub title: String,
    pub message: String,
    /// Candidate replacement values, best first.
    pub replacements: Vec<String>,
    pub severity: Severity,
}

impl Finding {
    /// Positioned finding builder.
    pub fn at(
        rule_id: &str,
        sub_category: &str,
        category: Category,
        span: (usize, usize),
        title: &str,
        message: String,
        replacements: Vec<String>,
        severity: Severity,
    ) -> Self {
        Self {
            rule_id: rule_id.to_string(),
            sub_category: sub_category.to_string(),
            category,
            span: Some(span),
            title: title.to_string(),
            message,
            replacements,
            severity,
        }
    }

    /// Document-wide finding builder.
    pub fn document_wide(
        rule_id: &str,
        sub_category: &str,
        category: Category,
        title: &str,
        message: String,
        severity: Severity,
    ) -> Self {
        Self {
            rule_id: rule_id.to_string(),
            sub_category: sub_category.to_string(),
            category,
            span: None,
            title: title.to_string(),
            message,
            replacements: Vec::new(),
            severity,
        }
    }
}

/// A pluggable checker. Implementations must be pure: no interior
/// mutability, no shared state, deterministic output for a given input.
pub trait Analyzer {
    fn name(&self) -> &'static str;
    fn run(&self, text: &str, meta: &DocumentMetadata) -> Result<Vec<Finding>, String>;
}

/// One analyzer's failure during a tier run (non-fatal).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzerFailure {
    pub analyzer: String,
    pub message: String,
}

/// Per-analyzer timing for a tier run, microseconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzerTiming {
    pub analyzer: String,
    pub elapsed_us: u64,
}

/// Combined output of running one tier's analyzer subset.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TierRunOutput {
    pub findings: Vec<Finding>,
    pub failures: Vec<AnalyzerFailure>,
    pub timings: Vec<AnalyzerTiming>,
}

// =============================================================================
// Registry
// =============================================================================

/// Holds the analyzer subset for each analysis tier.
pub struct AnalyzerRegistry {
    instant: Vec<Box<dyn Analyzer>>,
    fast: Vec<Box<dyn Analyzer>>,
    deep: Vec<Box<dyn Analyzer>>,
}

impl Default for AnalyzerRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl AnalyzerRegistry {
    /// Empty registry; analyzers are added per tier.
    pub fn empty() -> Self {
        Self {
            instant: Vec::new(),
            fast: Vec::new(),
            deep: Vec::new(),
        }
    }

    /// The standard tier layout: instant spelling, fast grammar and style,
    /// deep SEO and readability.
    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();
        registry.instant.push(Box::new(SpellingAnalyzer::new()));
        registry.fast.push(Box::new(GrammarAnalyzer::new()));
        registry.fast.push(Box::new(StyleAnalyzer::new()));
        registry.deep.push(Box::new(SeoAnalyzer::new()));
        registry.deep.push(Box::new(ReadabilityAnalyzer::new()));
        registry
    }

    pub fn add_instant(&mut self, analyzer: Box<dyn Analyzer>) {
        self.instant.push(analyzer);
    }

    pub fn add_fast(&mut self, analyzer: Box<dyn Analyzer>) {
        self.fast.push(analyzer);
    }

    pub fn add_deep(&mut self, analyzer: Box<dyn Analyzer>) {
        self.deep.push(analyzer);
    }

    fn subset(&self, tier: crate::analysis::scheduler::AnalysisTier) -> &[Box<dyn Analyzer>] {
        use crate::analysis::scheduler::AnalysisTier;
        match tier {
            AnalysisTier::Instant => &self.instant,
            AnalysisTier::Fast => &self.fast,
            AnalysisTier::Deep => &self.deep,
            AnalysisTier::AiEnhance => &[],
        }
    }

    /// Number of analyzers registered for a tier.
    pub fn tier_len(&self, tier: crate::analysis::scheduler::AnalysisTier) -> usize {
        self.subset(tier).len()
    }

    /// Run a tier's analyzer subset with per-analyzer failure isolation.
    /// Results are combined into a single batch so no partial-tier output
    /// is ever observable.
    pub fn run_tier(
        &self,
        tier: crate::analysis::scheduler::AnalysisTier,
        text: &str,
        meta: &DocumentMetadata,
    ) -> TierRunOutput {
        let mut output = TierRunOutput::default();
        for analyzer in self.subset(tier) {
            let started = instant::Instant::now();
            match analyzer.run(text, meta) {
                Ok(mut findings) => output.findings.append(&mut findings),
                Err(message) => {
                    crate::log_warn(&format!(
                        "[AnalyzerRegistry] {} failed: {}",
                        analyzer.name(),
                        message
                    ));
                    output.failures.push(AnalyzerFailure {
                        analyzer: analyzer.name().to_string(),
                        message,
                    });
                }
            }
            output.timings.push(AnalyzerTiming {
                analyzer: analyzer.name().to_string(),
                elapsed_us: started.elapsed().as_micros() as u64,
            });
        }
        output
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::scheduler::AnalysisTier;

    struct FailingAnalyzer;

    impl Analyzer for FailingAnalyzer {
        fn name(&self) -> &'static str {
            "failing"
        }
        fn run(&self, _text: &str, _meta: &DocumentMetadata) -> Result<Vec<Finding>, String> {
            Err("boom".to_string())
        }
    }

    struct OneFindingAnalyzer;

    impl Analyzer for OneFindingAnalyzer {
        fn name(&self) -> &'static str {
            "one-finding"
        }
        fn run(&self, _text: &str, _meta: &DocumentMetadata) -> Result<Vec<Finding>, String> {
            Ok(vec![Finding::document_wide(
                "seo/meta-missing",
                "meta",
                Category::Seo,
                "Missing meta description",
                "Add a meta description".to_string(),
                Severity::Warning,
            )])
        }
    }

    #[test]
    fn test_failing_analyzer_is_isolated() {
        let mut registry = AnalyzerRegistry::empty();
        registry.add_deep(Box::new(FailingAnalyzer));
        registry.add_deep(Box::new(OneFindingAnalyzer));

        let output = registry.run_tier(AnalysisTier::Deep, "text", &DocumentMetadata::default());

        // The sibling analyzer's findings survive the failure
        assert_eq!(output.findings.len(), 1);
        assert_eq!(output.failures.len(), 1);
        assert_eq!(output.failures[0].analyzer, "failing");
    }

    #[test]
    fn test_empty_tier_produces_nothing() {
        let registry = AnalyzerRegistry::empty();
        let output =
            registry.run_tier(AnalysisTier::Instant, "text", &DocumentMetadata::default());
        assert!(output.findings.is_empty());
        assert!(output.failures.is_empty());
    }

    #[test]
    fn test_default_registry_tier_layout() {
        let registry = AnalyzerRegistry::with_defaults();
        assert_eq!(registry.instant.len(), 1);
        assert_eq!(registry.fast.len(), 2);
        assert_eq!(registry.deep.len(), 2);
    }

    #[test]
    fn test_timings_recorded_per_analyzer() {
        let registry = AnalyzerRegistry::with_defaults();
        let output = registry.run_tier(
            AnalysisTier::Fast,
            "Some text to look at.",
            &DocumentMetadata::default(),
        );
        assert_eq!(output.timings.len(), 2);
    }
}
