//! StyleAnalyzer: wordiness, passive voice, intensifiers, cliches
//!
//! Dictionary-driven regex scans in the same shape as the grammar rules.
//! Style findings are advisory (`Severity::Suggestion`) and several carry no
//! replacement, which makes them natural candidates for AI enhancement.

use regex::Regex;

use super::{Analyzer, DocumentMetadata, Finding};
use crate::analysis::suggestion::{Category, Severity};

// =============================================================================
// Dictionaries
// =============================================================================

/// Wordy phrases with tighter replacements.
const WORDY_PHRASES: &[(&str, &str)] = &[
    ("in order to", "to"),
    ("due to the fact that", "because"),
    ("at this point in time", "now"),
    ("in the event that", "if"),
    ("for the purpose of", "for"),
    ("with regard to", "about"),
    ("in spite of the fact that", "although"),
    ("on a daily basis", "daily"),
    ("in the near future", "soon"),
    ("a large number of", "many"),
    ("the vast majority of", "most"),
];

/// Intensifiers that usually weaken the sentence.
const INTENSIFIERS: &[&str] = &["very", "really", "extremely", "basically", "literally"];

/// Stock phrases worth rewriting.
const CLICHES: &[&str] = &[
    "at the end of the day",
    "think outside the box",
    "low-hanging fruit",
    "the fact of the matter",
    "in this day and age",
    "all walks of life",
    "easier said than done",
];

/// Irregular past participles the `-ed` passive pattern misses.
const IRREGULAR_PARTICIPLES: &[&str] = &[
    "made", "done", "given", "taken", "written", "seen", "known", "found", "told", "shown",
    "built", "sent", "kept", "held", "brought", "thought", "caught", "bought", "chosen", "broken",
];

// =============================================================================
// StyleAnalyzer
// =============================================================================

pub struct StyleAnalyzer {
    wordy_re: Regex,
    intensifier_re: Regex,
    cliche_re: Regex,
    passive_re: Regex,
}

impl Default for StyleAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

fn alternation(words: &[&str]) -> String {
    words
        .iter()
        .map(|w| regex::escape(w))
        .collect::<Vec<_>>()
        .join("|")
}

impl StyleAnalyzer {
    pub fn new() -> Self {
        let wordy_phrases: Vec<&str> = WORDY_PHRASES.iter().map(|(p, _)| *p).collect();
        let wordy_re =
            Regex::new(&format!(r"(?i)\b({})\b", alternation(&wordy_phrases))).unwrap();
        let intensifier_re =
            Regex::new(&format!(r"(?i)\b({})\b", alternation(INTENSIFIERS))).unwrap();
        let cliche_re = Regex::new(&format!(r"(?i)\b({})\b", alternation(CLICHES))).unwrap();
        let passive_re = Regex::new(&format!(
            r"(?i)\b(?:is|are|was|were|been|being|be)\s+(\w+ed|{})\b",
            alternation(IRREGULAR_PARTICIPLES)
        ))
        .unwrap();

        Self {
            wordy_re,
            intensifier_re,
            cliche_re,
            passive_re,
        }
    }
}

impl Analyzer for StyleAnalyzer {
    fn name(&self) -> &'static str {
        "style"
    }

    fn run(&self, text: &str, _meta: &DocumentMetadata) -> Result<Vec<Finding>, String> {
        let mut findings = Vec::new();

        for m in self.wordy_re.find_iter(text) {
            let matched_lower = m.as_str().to_lowercase();
            let replacement = WORDY_PHRASES
                .iter()
                .find(|(p, _)| *p == matched_lower)
                .map(|(_, r)| r.to_string());
            findings.push(Finding::at(
                "style/wordy-phrase",
                "wordiness",
                Category::Style,
                (m.start(), m.end()),
                "Wordy phrase",
                format!("\"{}\" can usually be tightened", m.as_str()),
                replacement.into_iter().collect(),
                Severity::Suggestion,
            ));
        }

        for m in self.intensifier_re.find_iter(text) {
            findings.push(Finding::at(
                "style/weak-intensifier",
                "wordiness",
                Category::Style,
                (m.start(), m.end()),
                "Weak intensifier",
                format!(
                    "\"{}\" rarely adds meaning; consider removing it",
                    m.as_str()
                ),
                Vec::new(),
                Severity::Suggestion,
            ));
        }

        for m in self.cliche_re.find_iter(text) {
            findings.push(Finding::at(
                "style/cliche",
                "cliche",
                Category::Style,
                (m.start(), m.end()),
                "Cliche",
                format!("\"{}\" is a stock phrase; try a fresher wording", m.as_str()),
                Vec::new(),
                Severity::Suggestion,
            ));
        }

        for m in self.passive_re.find_iter(text) {
            findings.push(Finding::at(
                "style/passive-voice",
                "passive-voice",
                Category::Style,
                (m.start(), m.end()),
                "Passive voice",
                "Consider an active construction".to_string(),
                Vec::new(),
                Severity::Suggestion,
            ));
        }

        Ok(findings)
    }
}

// =============================================================================
// Tests
// =============================================================================
