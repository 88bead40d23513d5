//! GrammarAnalyzer: compiled-regex grammar rules
//!
//! All patterns are compiled once in the constructor. Rules that rewrite a
//! single confused word capture it in group 1 so the finding spans just that
//! word, not the whole matched context.

use regex::Regex;
use unicode_segmentation::UnicodeSegmentation;

use super::{Analyzer, DocumentMetadata, Finding};
use crate::analysis::suggestion::{Category, Severity};

// =============================================================================
// Confusion table
// =============================================================================

/// Common-confusion contexts. Pattern group 1 is the confused word; the
/// replacement substitutes that word only.
const CONFUSIONS: &[(&str, &str, &str)] = &[
    // (pattern, replacement for group 1, explanation)
    (
        r"(?i)\b(their)\s+(?:is|are|was|were)\b",
        "There",
        "\"Their\" is possessive; before a verb of being you usually want \"There\"",
    ),
    (
        r"(?i)\b(your)\s+(?:welcome|right|wrong|kidding)\b",
        "You're",
        "\"Your\" is possessive; this context takes the contraction \"You're\"",
    ),
    (
        r"(?i)\b(its)\s+(?:a|an|the)\b",
        "It's",
        "\"Its\" is possessive; before an article you usually want \"It's\"",
    ),
    (
        r"(?i)\b(?:would|could|should)\s+(of)\b",
        "have",
        "\"of\" here should be the auxiliary \"have\"",
    ),
    (
        r"(?i)\b(then)\s+(?:i|we|he|she|they|you)\s+(?:am|is|are|was|were)\b",
        "than",
        "Comparisons take \"than\", sequences take \"then\"",
    ),
];

/// Words beginning with a vowel letter but a consonant sound.
const VOWEL_LETTER_CONSONANT_SOUND: &[&str] = &[
    "user", "users", "unique", "united", "unit", "university", "one", "once", "european", "uniform",
];

/// Words beginning with a consonant letter but a vowel sound.
const CONSONANT_LETTER_VOWEL_SOUND: &[&str] =
    &["hour", "hours", "honest", "honor", "heir", "herb"];

// =============================================================================
// GrammarAnalyzer
// =============================================================================

pub struct GrammarAnalyzer {
    confusions: Vec<(Regex, &'static str, &'static str)>,
    article_re: Regex,
    sentence_start_re: Regex,
    lone_i_re: Regex,
    repeated_punct_re: Regex,
    space_before_punct_re: Regex,
    double_space_re: Regex,
}

impl Default for GrammarAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl GrammarAnalyzer {
    pub fn new() -> Self {
        let confusions = CONFUSIONS
            .iter()
            .map(|(pattern, replacement, message)| {
                (Regex::new(pattern).unwrap(), *replacement, *message)
            })
            .collect();

        // "a" or "an" followed by the next word (group 2)
        let article_re = Regex::new(r"(?i)\b(an?)\s+([a-z]+)").unwrap();

        // Lowercase letter opening a sentence
        let sentence_start_re = Regex::new(r"[.!?]\s+([a-z])").unwrap();

        // Standalone lowercase "i" as a pronoun
        let lone_i_re = Regex::new(r"(?:^|[\s(])\b(i)\b(?:[\s.,!?;:)]|$)").unwrap();

        // Doubled terminal punctuation or commas ("!!", "??", ",,").
        // The regex crate has no backreferences; enumerate per-char runs,
        // which matches the same strings as `([!?,])\1+`.
        let repeated_punct_re = Regex::new(r"!{2,}|\?{2,}|,{2,}").unwrap();

        let space_before_punct_re = Regex::new(r"\s+([,.!?;:])").unwrap();

        let double_space_re = Regex::new(r"[^\S\r\n]{2,}").unwrap();

        Self {
            confusions,
            article_re,
            sentence_start_re,
            lone_i_re,
            repeated_punct_re,
            space_before_punct_re,
            double_space_re,
        }
    }

    fn check_confusions(&self, text: &str, findings: &mut Vec<Finding>) {
        for (re, replacement, message) in &self.confusions {
            for cap in re.captures_iter(text) {
                let word = cap.get(1).unwrap();
                let fix = carry_case(word.as_str(), replacement);
                findings.push(Finding::at(
                    "grammar/common-confusion",
                    "common-confusion",
                    Category::Grammar,
                    (word.start(), word.end()),
                    "Commonly confused word",
                    message.to_string(),
                    vec![fix],
                    Severity::Warning,
                ));
            }
        }
    }

    fn check_doubled_words(&self, text: &str, findings: &mut Vec<Finding>) {
        // The regex crate has no backreferences; walk word pairs instead
        let words: Vec<(usize, &str)> = text.unicode_word_indices().collect();
        for pair in words.windows(2) {
            let (first_start, first) = pair[0];
            let (second_start, second) = pair[1];
            if first.eq_ignore_ascii_case(second)
                && !first.chars().all(|c| c.is_numeric())
                // Only flag truly adjacent repeats, not across punctuation
                && text[first_start + first.len()..second_start]
                    .chars()
                    .all(char::is_whitespace)
            {
                let span = (first_start, second_start + second.len());
                findings.push(Finding::at(
                    "grammar/doubled-word",
                    "doubled-word",
                    Category::Grammar,
                    span,
                    "Doubled word",
                    format!("The word \"{}\" is repeated", first),
                    vec![first.to_string()],
                    Severity::Warning,
                ));
            }
        }
    }

    fn check_articles(&self, text: &str, findings: &mut Vec<Finding>) {
        for cap in self.article_re.captures_iter(text) {
            let article = cap.get(1).unwrap();
            let word = cap.get(2).unwrap();
            let word_lower = word.as_str().to_lowercase();
            let wants_an = starts_with_vowel_sound(&word_lower);
            let is_an = article.as_str().eq_ignore_ascii_case("an");
            if wants_an == is_an {
                continue;
            }
            let fix = carry_case(article.as_str(), if wants_an { "an" } else { "a" });
            findings.push(Finding::at(
                "grammar/article-agreement",
                "article",
                Category::Grammar,
                (article.start(), article.end()),
                "Article disagreement",
                format!(
                    "Use \"{}\" before \"{}\"",
                    if wants_an { "an" } else { "a" },
                    word.as_str()
                ),
                vec![fix],
                Severity::Warning,
            ));
        }
    }

    fn check_capitalization(&self, text: &str, findings: &mut Vec<Finding>) {
        for cap in self.sentence_start_re.captures_iter(text) {
            let letter = cap.get(1).unwrap();
            findings.push(Finding::at(
                "grammar/sentence-capitalization",
                "capitalization",
                Category::Grammar,
                (letter.start(), letter.end()),
                "Sentence should start with a capital",
                "Capitalize the first word of a sentence".to_string(),
                vec![letter.as_str().to_uppercase()],
                Severity::Warning,
            ));
        }
        for cap in self.lone_i_re.captures_iter(text) {
            let letter = cap.get(1).unwrap();
            // Skip abbreviations like "i.e."
            if text[letter.end()..].starts_with('.')
                && text[letter.end()..]
                    .chars()
                    .nth(1)
                    .map_or(false, |c| c.is_alphabetic())
            {
                continue;
            }
            findings.push(Finding::at(
                "grammar/capitalize-i",
                "capitalization",
                Category::Grammar,
                (letter.start(), letter.end()),
                "Capitalize \"I\"",
                "The pronoun \"I\" is always capitalized".to_string(),
                vec!["I".to_string()],
                Severity::Warning,
            ));
        }
    }

    fn check_punctuation(&self, text: &str, findings: &mut Vec<Finding>) {
        for m in self.repeated_punct_re.find_iter(text) {
            let single = text[m.start()..].chars().next().unwrap().to_string();
            findings.push(Finding::at(
                "grammar/repeated-punctuation",
                "punctuation",
                Category::Grammar,
                (m.start(), m.end()),
                "Repeated punctuation",
                "Use a single punctuation mark".to_string(),
                vec![single],
                Severity::Warning,
            ));
        }
        for cap in self.space_before_punct_re.captures_iter(text) {
            let whole = cap.get(0).unwrap();
            let punct = cap.get(1).unwrap();
            findings.push(Finding::at(
                "grammar/space-before-punctuation",
                "punctuation",
                Category::Grammar,
                (whole.start(), whole.end()),
                "Space before punctuation",
                "Remove the space before this punctuation mark".to_string(),
                vec![punct.as_str().to_string()],
                Severity::Warning,
            ));
        }
        for m in self.double_space_re.find_iter(text) {
            findings.push(Finding::at(
                "grammar/double-space",
                "punctuation",
                Category::Grammar,
                (m.start(), m.end()),
                "Multiple spaces",
                "Use a single space".to_string(),
                vec![" ".to_string()],
                Severity::Warning,
            ));
        }
    }
}

/// Carry the source word's initial capitalization over to the replacement.
fn carry_case(source: &str, replacement: &str) -> String {
    let starts_upper = source.chars().next().is_some_and(|c| c.is_uppercase());
    if starts_upper {
        let mut chars = replacement.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
            None => String::new(),
        }
    } else {
        replacement.to_lowercase()
    }
}

fn starts_with_vowel_sound(word_lower: &str) -> bool {
    if VOWEL_LETTER_CONSONANT_SOUND
        .iter()
        .any(|w| word_lower == *w)
    {
        return false;
    }
    if CONSONANT_LETTER_VOWEL_SOUND
        .iter()
        .any(|w| word_lower == *w)
    {
        return true;
    }
    matches!(
        word_lower.chars().next(),
        Some('a') | Some('e') | Some('i') | Some('o') | Some('u')
    )
}

impl Analyzer for GrammarAnalyzer {
    fn name(&self) -> &'static str {
        "grammar"
    }

    fn run(&self, text: &str, _meta: &DocumentMetadata) -> Result<Vec<Finding>, String> {
        let mut findings = Vec::new();
        self.check_confusions(text, &mut findings);
        self.check_doubled_words(text, &mut findings);
        self.check_articles(text, &mut findings);
        self.check_capitalization(text, &mut findings);
        self.check_punctuation(text, &mut findings);
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
        GrammarAnalyzer::new()
            .run(text, &DocumentMetadata::default())
            .unwrap()
    }

    fn by_rule<'a>(findings: &'a [Finding], rule: &str) -> Vec<&'a Finding> {
        findings.iter().filter(|f| f.rule_id == rule).collect()
    }

    #[test]
    fn test_their_is_confusion() {
        let findings = run("Their is a problem");
        let hits = by_rule(&findings, "grammar/common-confusion");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].span, Some((0, 5)));
        assert_eq!(hits[0].replacements, vec!["There".to_string()]);
        assert_eq!(hits[0].severity, Severity::Warning);
    }

    #[test]
    fn test_confusion_case_carried() {
        let findings = run("because their is nothing left");
        let hits = by_rule(&findings, "grammar/common-confusion");
        assert_eq!(hits[0].replacements, vec!["there".to_string()]);
    }

    #[test]
    fn test_would_of() {
        let findings = run("He would of gone home");
        let hits = by_rule(&findings, "grammar/common-confusion");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].replacements, vec!["have".to_string()]);
        // Span covers only "of"
        assert_eq!(hits[0].span, Some((9, 11)));
    }

    #[test]
    fn test_doubled_word() {
        let findings = run("we went to the the store");
        let hits = by_rule(&findings, "grammar/doubled-word");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].span, Some((11, 18)));
        assert_eq!(hits[0].replacements, vec!["the".to_string()]);
    }

    #[test]
    fn test_doubled_word_not_across_punctuation() {
        let findings = run("that was that. That said, fine.");
        assert!(by_rule(&findings, "grammar/doubled-word").is_empty());
    }

    #[test]
    fn test_article_a_before_vowel() {
        let findings = run("she saw a elephant");
        let hits = by_rule(&findings, "grammar/article-agreement");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].replacements, vec!["an".to_string()]);
    }

    #[test]
    fn test_article_exceptions() {
        // Vowel letter, consonant sound
        assert!(by_rule(&run("a user logged in"), "grammar/article-agreement").is_empty());
        // Consonant letter, vowel sound
        let findings = run("it took a hour");
        assert_eq!(by_rule(&findings, "grammar/article-agreement").len(), 1);
    }

    #[test]
    fn test_sentence_capitalization() {
        let findings = run("It works. but not always.");
        let hits = by_rule(&findings, "grammar/sentence-capitalization");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].replacements, vec!["B".to_string()]);
    }

    #[test]
    fn test_lone_lowercase_i() {
        let findings = run("yesterday i went home");
        let hits = by_rule(&findings, "grammar/capitalize-i");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].replacements, vec!["I".to_string()]);
    }

    #[test]
    fn test_repeated_punctuation() {
        let findings = run("Stop!! Now");
        let hits = by_rule(&findings, "grammar/repeated-punctuation");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].replacements, vec!["!".to_string()]);
    }

    #[test]
    fn test_space_before_punctuation() {
        let findings = run("Hello , world");
        let hits = by_rule(&findings, "grammar/space-before-punctuation");
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn test_double_space() {
        let findings = run("Hello  world");
        let hits = by_rule(&findings, "grammar/double-space");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].span, Some((5, 7)));
    }

    #[test]
    fn test_clean_sentence() {
        assert!(run("There is a problem with the report.").is_empty());
    }
}
