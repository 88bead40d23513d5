//! ReadabilityAnalyzer: Flesch reading ease and long sentences
//!
//! Sentence segmentation via unicode-segmentation, syllables via a
//! vowel-group estimate. The Flesch score is a document-wide metric
//! suggestion; long sentences are positioned so they can be highlighted.

use unicode_segmentation::UnicodeSegmentation;

use super::{Analyzer, DocumentMetadata, Finding};
use crate::analysis::suggestion::{Category, Severity};

// =============================================================================
// Thresholds
// =============================================================================

/// Flesch reading ease below this is flagged.
const FLESCH_FLOOR: f64 = 50.0;
/// Sentences longer than this many words are flagged.
const LONG_SENTENCE_WORDS: usize = 30;
/// Too little text makes the score meaningless.
const MIN_WORDS_FOR_SCORE: usize = 40;

// =============================================================================
// Syllable estimation
// =============================================================================

/// Estimate syllables by counting vowel groups, discounting a silent
/// trailing "e". Always at least 1 for a word with letters.
fn estimate_syllables(word: &str) -> usize {
    let lower = word.to_lowercase();
    let mut count = 0usize;
    let mut prev_vowel = false;
    for c in lower.chars() {
        let vowel = matches!(c, 'a' | 'e' | 'i' | 'o' | 'u' | 'y');
        if vowel && !prev_vowel {
            count += 1;
        }
        prev_vowel = vowel;
    }
    if lower.ends_with('e') && !lower.ends_with("le") && count > 1 {
        count -= 1;
    }
    count.max(1)
}

/// Flesch reading ease for the given text, or `None` when the sample is too
/// small to score.
pub fn flesch_reading_ease(text: &str) -> Option<f64> {
    let words: Vec<&str> = text.unicode_words().collect();
    if words.len() < MIN_WORDS_FOR_SCORE {
        return None;
    }
    let sentences = text.unicode_sentences().count().max(1);
    let syllables: usize = words.iter().map(|w| estimate_syllables(w)).sum();
    let words_per_sentence = words.len() as f64 / sentences as f64;
    let syllables_per_word = syllables as f64 / words.len() as f64;
    Some(206.835 - 1.015 * words_per_sentence - 84.6 * syllables_per_word)
}

// =============================================================================
// ReadabilityAnalyzer
// =============================================================================

#[derive(Default)]
pub struct ReadabilityAnalyzer;

impl ReadabilityAnalyzer {
    pub fn new() -> Self {
        Self
    }
}

impl Analyzer for ReadabilityAnalyzer {
    fn name(&self) -> &'static str {
        "readability"
    }

    fn run(&self, text: &str, _meta: &DocumentMetadata) -> Result<Vec<Finding>, String> {
        let mut findings = Vec::new();

        for (offset, sentence) in text.split_sentence_bound_indices() {
            let word_count = sentence.unicode_words().count();
            if word_count > LONG_SENTENCE_WORDS {
                let trimmed = sentence.trim_end();
                findings.push(Finding::at(
                    "readability/long-sentence",
                    "sentence",
                    Category::Readability,
                    (offset, offset + trimmed.len()),
                    "Long sentence",
                    format!(
                        "This sentence has {} words; consider splitting it",
                        word_count
                    ),
                    Vec::new(),
                    Severity::Suggestion,
                ));
            }
        }

        if let Some(score) = flesch_reading_ease(text) {
            if score < FLESCH_FLOOR {
                findings.push(Finding::document_wide(
                    "readability/flesch-low",
                    "metric",
                    Category::Readability,
                    "Hard to read",
                    format!(
                        "Flesch reading ease is {:.0}; shorter sentences and simpler words raise it",
                        score
                    ),
                    Severity::Suggestion,
                ));
            }
        }

        Ok(findings)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn run(text: &str) -> Vec<Finding> {
        ReadabilityAnalyzer::new()
            .run(text, &DocumentMetadata::default())
            .unwrap()
    }

    #[test]
    fn test_syllable_estimates() {
        assert_eq!(estimate_syllables("cat"), 1);
        assert_eq!(estimate_syllables("water"), 2);
        assert_eq!(estimate_syllables("beautiful"), 3);
        // Silent e
        assert_eq!(estimate_syllables("house"), 1);
        assert_eq!(estimate_syllables("a"), 1);
    }

    #[test]
    fn test_long_sentence_flagged_with_position() {
        let long = "this sentence just keeps going on and on with more and more words than \
                    anyone would ever want to read in a single breath because it never stops \
                    to take a pause at all.";
        let findings = run(long);
        let hits: Vec<_> = findings
            .iter()
            .filter(|f| f.rule_id == "readability/long-sentence")
            .collect();
        assert_eq!(hits.len(), 1);
        let (start, end) = hits[0].span.unwrap();
        assert_eq!(start, 0);
        assert_eq!(end, long.len());
    }

    #[test]
    fn test_short_sentences_pass() {
        let findings = run("This is short. So is this one. Nothing to flag here.");
        assert!(findings
            .iter()
            .all(|f| f.rule_id != "readability/long-sentence"));
    }

    #[test]
    fn test_flesch_low_on_dense_prose() {
        // Long, polysyllabic, single-sentence prose scores very low
        let dense = "organizational transformation necessitates comprehensive reevaluation \
                     of institutional methodologies alongside systematic reconsideration of \
                     administrative infrastructure particularly when multidisciplinary \
                     collaboration determines overarching developmental trajectories \
                     throughout contemporary professional environments requiring \
                     sophisticated analytical capabilities and interdepartmental \
                     communication strategies spanning heterogeneous organizational \
                     boundaries continuously alongside sustainable governance frameworks";
        let findings = run(dense);
        assert!(findings.iter().any(|f| f.rule_id == "readability/flesch-low"));
    }

    #[test]
    fn test_simple_prose_not_flagged() {
        let simple = "The cat sat on the mat. The dog ran to the park. We like to walk. \
                      The sun is out now. It is a good day. We eat lunch at noon. \
                      The kids play ball. Then we go home. We read a book at night. \
                      Sleep comes fast.";
        let findings = run(simple);
        assert!(findings.iter().all(|f| f.rule_id != "readability/flesch-low"));
    }

    #[test]
    fn test_tiny_sample_has_no_score() {
        assert!(flesch_reading_ease("Too short to score.").is_none());
    }
}
