//! SpellingAnalyzer: misspelling dictionary scan
//!
//! Aho-Corasick over a table of common misspellings, whole-word matches
//! only, leftmost-longest so "definately" wins over any embedded pattern.
//! Also owns the confusable-word set (their/there, your/you're, ...) that
//! the AI eligibility predicate consults.

use aho_corasick::{AhoCorasick, AhoCorasickBuilder, MatchKind};

use super::{Analyzer, DocumentMetadata, Finding};
use crate::analysis::suggestion::{Category, Severity};

// =============================================================================
// Dictionaries
// =============================================================================

/// Common misspellings with their corrections. Matched case-insensitively.
const MISSPELLINGS: &[(&str, &str)] = &[
    ("teh", "the"),
    ("recieve", "receive"),
    ("recieved", "received"),
    ("seperate", "separate"),
    ("definately", "definitely"),
    ("occured", "occurred"),
    ("occurence", "occurrence"),
    ("wierd", "weird"),
    ("untill", "until"),
    ("alot", "a lot"),
    ("adress", "address"),
    ("accomodate", "accommodate"),
    ("acheive", "achieve"),
    ("beleive", "believe"),
    ("calender", "calendar"),
    ("concious", "conscious"),
    ("embarass", "embarrass"),
    ("enviroment", "environment"),
    ("existance", "existence"),
    ("foriegn", "foreign"),
    ("goverment", "government"),
    ("gaurd", "guard"),
    ("happend", "happened"),
    ("immediatly", "immediately"),
    ("independant", "independent"),
    ("neccessary", "necessary"),
    ("noticable", "noticeable"),
    ("publically", "publicly"),
    ("realy", "really"),
    ("recomend", "recommend"),
    ("refered", "referred"),
    ("relevent", "relevant"),
    ("succesful", "successful"),
    ("tommorow", "tomorrow"),
    ("truely", "truly"),
    ("wich", "which"),
];

/// Words whose misuse is contextual rather than orthographic. Spelled
/// correctly in isolation, so the dictionary scan never flags them; the AI
/// tier is the only checker that can judge them in context.
const CONFUSABLES: &[&str] = &[
    "their", "there", "theyre", "they're", "your", "you're", "youre", "its", "it's", "affect",
    "effect", "then", "than", "to", "too", "loose", "lose", "whose", "who's", "accept", "except",
    "weather", "whether",
];

/// True when `word` belongs to the commonly-confused contextual set.
pub fn is_confusable_word(word: &str) -> bool {
    let lower = word.to_lowercase();
    CONFUSABLES.iter().any(|c| *c == lower)
}

// =============================================================================
// SpellingAnalyzer
// =============================================================================

pub struct SpellingAnalyzer {
    automaton: AhoCorasick,
}

impl Default for SpellingAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl SpellingAnalyzer {
    pub fn new() -> Self {
        let patterns: Vec<&str> = MISSPELLINGS.iter().map(|(wrong, _)| *wrong).collect();
        // Infallible for this fixed table; a bad table is a programming error
        let automaton = AhoCorasickBuilder::new()
            .ascii_case_insensitive(true)
            .match_kind(MatchKind::LeftmostLongest)
            .build(&patterns)
            .expect("misspelling table builds");
        Self { automaton }
    }
}

/// Carry the matched text's initial capitalization over to the correction.
fn match_case(matched: &str, correction: &str) -> String {
    let starts_upper = matched.chars().next().is_some_and(|c| c.is_uppercase());
    if starts_upper {
        let mut chars = correction.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
            None => String::new(),
        }
    } else {
        correction.to_string()
    }
}

/// Whole-word check: the bytes around the span must not be alphanumeric.
fn is_word_bounded(text: &str, start: usize, end: usize) -> bool {
    let before_ok = start == 0
        || text[..start]
            .chars()
            .next_back()
            .map_or(true, |c| !c.is_alphanumeric());
    let after_ok = end == text.len()
        || text[end..]
            .chars()
            .next()
            .map_or(true, |c| !c.is_alphanumeric());
    before_ok && after_ok
}

impl Analyzer for SpellingAnalyzer {
    fn name(&self) -> &'static str {
        "spelling"
    }

    fn run(&self, text: &str, _meta: &DocumentMetadata) -> Result<Vec<Finding>, String> {
        let mut findings = Vec::new();
        for m in self.automaton.find_iter(text) {
            if !is_word_bounded(text, m.start(), m.end()) {
                continue;
            }
            let matched = &text[m.start()..m.end()];
            let correction = MISSPELLINGS[m.pattern().as_usize()].1;
            let replacement = match_case(matched, correction);
            findings.push(Finding::at(
                "spelling/misspelling",
                "misspelling",
                Category::Spelling,
                (m.start(), m.end()),
                "Possible misspelling",
                format!("\"{}\" may be misspelled", matched),
                vec![replacement],
                Severity::Error,
            ));
        }
        Ok(findings)
    }
}

// =============================================================================
// Tests
// =============================================================================
