//! SeoAnalyzer: title, meta description, and keyword checks
//!
//! Mostly document-wide findings driven by metadata thresholds; keyword
//! stuffing is the one positioned rule. Thresholds follow common search
//! listing limits.

use unicode_segmentation::UnicodeSegmentation;

use super::{Analyzer, DocumentMetadata, Finding};
use crate::analysis::suggestion::{Category, Severity};

// =============================================================================
// Thresholds
// =============================================================================

const TITLE_MIN: usize = 30;
const TITLE_MAX: usize = 60;
const META_MIN: usize = 50;
const META_MAX: usize = 160;
const MIN_CONTENT_WORDS: usize = 300;
/// Keyword density above this ratio reads as stuffing.
const STUFFING_DENSITY: f64 = 0.03;
/// Density only matters once the keyword actually repeats.
const STUFFING_MIN_OCCURRENCES: usize = 3;
/// Window the target keyword should appear in early.
const INTRO_WORDS: usize = 100;
/// Upper bound on positioned stuffing findings per run.
const MAX_STUFFING_FINDINGS: usize = 20;

// =============================================================================
// SeoAnalyzer
// =============================================================================

#[derive(Default)]
pub struct SeoAnalyzer;

impl SeoAnalyzer {
    pub fn new() -> Self {
        Self
    }

    fn check_title(&self, meta: &DocumentMetadata, findings: &mut Vec<Finding>) {
        let title = meta.title.trim();
        if title.is_empty() {
            findings.push(Finding::document_wide(
                "seo/title-missing",
                "title",
                Category::Seo,
                "Missing title",
                "The document has no title; search listings need one".to_string(),
                Severity::Warning,
            ));
            return;
        }
        let len = title.chars().count();
        if len < TITLE_MIN {
            findings.push(Finding::document_wide(
                "seo/title-too-short",
                "title",
                Category::Seo,
                "Title too short",
                format!(
                    "The title is {} characters; aim for {} to {}",
                    len, TITLE_MIN, TITLE_MAX
                ),
                Severity::Warning,
            ));
        } else if len > TITLE_MAX {
            findings.push(Finding::document_wide(
                "seo/title-too-long",
                "title",
                Category::Seo,
                "Title too long",
                format!(
                    "The title is {} characters and may be truncated; aim for {} to {}",
                    len, TITLE_MIN, TITLE_MAX
                ),
                Severity::Warning,
            ));
        }
    }

    fn check_meta_description(&self, meta: &DocumentMetadata, findings: &mut Vec<Finding>) {
        let description = meta.meta_description.trim();
        if description.is_empty() {
            findings.push(Finding::document_wide(
                "seo/meta-missing",
                "meta",
                Category::Seo,
                "Missing meta description",
                "Add a meta description so search results show your summary".to_string(),
                Severity::Warning,
            ));
            return;
        }
        let len = description.chars().count();
        if len < META_MIN {
            findings.push(Finding::document_wide(
                "seo/meta-too-short",
                "meta",
                Category::Seo,
                "Meta description too short",
                format!(
                    "The meta description is {} characters; aim for {} to {}",
                    len, META_MIN, META_MAX
                ),
                Severity::Suggestion,
            ));
        } else if len > META_MAX {
            findings.push(Finding::document_wide(
                "seo/meta-too-long",
                "meta",
                Category::Seo,
                "Meta description too long",
                format!(
                    "The meta description is {} characters and will be truncated",
                    len
                ),
                Severity::Suggestion,
            ));
        }
    }

    fn check_keyword(&self, text: &str, meta: &DocumentMetadata, findings: &mut Vec<Finding>) {
        let keyword = meta.target_keyword.trim();
        if keyword.is_empty() {
            return;
        }
        let keyword_lower = keyword.to_lowercase();
        let text_lower = text.to_lowercase();

        if !meta.title.to_lowercase().contains(&keyword_lower) {
            findings.push(Finding::document_wide(
                "seo/keyword-not-in-title",
                "keyword",
                Category::Seo,
                "Keyword missing from title",
                format!("The target keyword \"{}\" does not appear in the title", keyword),
                Severity::Suggestion,
            ));
        }

        let occurrences: Vec<usize> = text_lower
            .match_indices(&keyword_lower)
            .map(|(i, _)| i)
            .collect();

        if occurrences.is_empty() {
            findings.push(Finding::document_wide(
                "seo/keyword-missing",
                "keyword",
                Category::Seo,
                "Keyword missing from body",
                format!(
                    "The target keyword \"{}\" does not appear in the document",
                    keyword
                ),
                Severity::Warning,
            ));
            return;
        }

        // Early placement: the keyword should show up near the top
        let intro_end = text
            .unicode_word_indices()
            .nth(INTRO_WORDS)
            .map(|(i, _)| i)
            .unwrap_or(text.len());
        if occurrences[0] >= intro_end {
            findings.push(Finding::document_wide(
                "seo/keyword-not-in-intro",
                "keyword",
                Category::Seo,
                "Keyword appears late",
                format!(
                    "The target keyword \"{}\" first appears after the opening of the document",
                    keyword
                ),
                Severity::Suggestion,
            ));
        }

        let word_count = text.unicode_words().count();
        if word_count > 0 {
            let density = occurrences.len() as f64 / word_count as f64;
            if density > STUFFING_DENSITY && occurrences.len() >= STUFFING_MIN_OCCURRENCES {
                for start in occurrences.iter().take(MAX_STUFFING_FINDINGS) {
                    findings.push(Finding::at(
                        "seo/keyword-stuffing",
                        "keyword",
                        Category::Seo,
                        (*start, *start + keyword.len()),
                        "Keyword stuffing",
                        format!(
                            "\"{}\" appears {} times ({:.1}% of the text); vary the wording",
                            keyword,
                            occurrences.len(),
                            density * 100.0
                        ),
                        Vec::new(),
                        Severity::Warning,
                    ));
                }
            }
        }
    }

    fn check_content_length(&self, text: &str, findings: &mut Vec<Finding>) {
        let word_count = text.unicode_words().count();
        if word_count > 0 && word_count < MIN_CONTENT_WORDS {
            findings.push(Finding::document_wide(
                "seo/content-too-short",
                "content",
                Category::Seo,
                "Thin content",
                format!(
                    "The document has {} words; search engines favor at least {}",
                    word_count, MIN_CONTENT_WORDS
                ),
                Severity::Suggestion,
            ));
        }
    }
}

impl Analyzer for SeoAnalyzer {
    fn name(&self) -> &'static str {
        "seo"
    }

    fn run(&self, text: &str, meta: &DocumentMetadata) -> Result<Vec<Finding>, String> {
        let mut findings = Vec::new();
        self.check_title(meta, &mut findings);
        self.check_meta_description(meta, &mut findings);
        self.check_keyword(text, meta, &mut findings);
        self.check_content_length(text, &mut findings);
        Ok(findings)
    }
}

// =============================================================================
// Tests
// =============================================================================
