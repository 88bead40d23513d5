//! SuggestionMerger: cross-tier deduplication and conflict resolution
//!
//! Three sources feed the merged view: client tiers (instant/fast), the
//! server/deep tier, and AI-enhanced versions, in ascending priority.
//! Positioned suggestions deduplicate through a character index over their
//! spans; document-wide suggestions deduplicate by rule key alone. Which
//! categories may coexist at the same span is policy data, not code.

use std::collections::{HashMap, HashSet};

use crate::analysis::suggestion::{Category, PlainSpan, Suggestion};

// =============================================================================
// Conflict policy
// =============================================================================

/// Pairs of categories that cannot both claim the same span. Symmetric.
#[derive(Debug, Clone)]
pub struct CategoryConflictPolicy {
    pairs: HashSet<(Category, Category)>,
}

impl Default for CategoryConflictPolicy {
    fn default() -> Self {
        Self::from_pairs(&[
            (Category::Spelling, Category::Grammar),
            (Category::Grammar, Category::Style),
        ])
    }
}

impl CategoryConflictPolicy {
    pub fn from_pairs(pairs: &[(Category, Category)]) -> Self {
        let mut set = HashSet::new();
        for (a, b) in pairs {
            set.insert((*a, *b));
            set.insert((*b, *a));
        }
        Self { pairs: set }
    }

    /// Everything conflicts with everything (strictest possible policy).
    pub fn all_conflict() -> Self {
        let categories = [
            Category::Spelling,
            Category::Grammar,
            Category::Style,
            Category::Seo,
            Category::Readability,
        ];
        let mut set = HashSet::new();
        for a in categories {
            for b in categories {
                if a != b {
                    set.insert((a, b));
                }
            }
        }
        Self { pairs: set }
    }

    pub fn conflicts(&self, a: Category, b: Category) -> bool {
        self.pairs.contains(&(a, b))
    }
}

// =============================================================================
// Merger
// =============================================================================

/// Source priority in ascending order of trust.
const PRIORITY_CLIENT: u8 = 1;
const PRIORITY_SERVER: u8 = 2;
const PRIORITY_AI: u8 = 3;

struct Accumulated {
    suggestion: Suggestion,
    priority: u8,
    alive: bool,
}

#[derive(Debug, Clone, Default)]
pub struct SuggestionMerger {
    policy: CategoryConflictPolicy,
}

impl SuggestionMerger {
    pub fn new(policy: CategoryConflictPolicy) -> Self {
        Self { policy }
    }

    /// Merge the three sources into the final ordered suggestion list.
    pub fn merge(
        &self,
        client: &[Suggestion],
        server: &[Suggestion],
        ai: &[Suggestion],
    ) -> Vec<Suggestion> {
        let mut positioned: Vec<Accumulated> = Vec::new();
        // Character offset -> indices of positioned suggestions covering it
        let mut char_index: HashMap<usize, Vec<usize>> = HashMap::new();
        // Rule key -> accumulated document-wide suggestion
        let mut document_wide: HashMap<String, (Suggestion, u8)> = HashMap::new();

        for (batch, priority) in [
            (client, PRIORITY_CLIENT),
            (server, PRIORITY_SERVER),
            (ai, PRIORITY_AI),
        ] {
            for suggestion in batch {
                match suggestion.position {
                    Some(span) => self.insert_positioned(
                        suggestion.clone(),
                        span,
                        priority,
                        &mut positioned,
                        &mut char_index,
                    ),
                    None => {
                        let key = suggestion.rule_key();
                        match document_wide.get(&key) {
                            // Equal priority: newest batch entry wins
                            Some((_, existing)) if *existing > priority => {}
                            _ => {
                                document_wide.insert(key, (suggestion.clone(), priority));
                            }
                        }
                    }
                }
            }
        }

        let mut output: Vec<Suggestion> = positioned
            .into_iter()
            .filter(|a| a.alive)
            .map(|a| a.suggestion)
            .collect();
        output.sort_by(|a, b| {
            let a_pos = a.position.expect("positioned");
            let b_pos = b.position.expect("positioned");
            a_pos
                .start
                .cmp(&b_pos.start)
                .then(a_pos.end.cmp(&b_pos.end))
                .then(a.id.cmp(&b.id))
        });

        let mut wide: Vec<Suggestion> =
            document_wide.into_values().map(|(s, _)| s).collect();
        wide.sort_by(|a, b| a.id.cmp(&b.id));
        output.extend(wide);
        output
    }

    fn insert_positioned(
        &self,
        suggestion: Suggestion,
        span: PlainSpan,
        priority: u8,
        positioned: &mut Vec<Accumulated>,
        char_index: &mut HashMap<usize, Vec<usize>>,
    ) {
        // Collect live suggestions whose spans intersect the new one
        let mut overlapping: Vec<usize> = Vec::new();
        for offset in span.start..span.end {
            if let Some(indices) = char_index.get(&offset) {
                for &idx in indices {
                    if positioned[idx].alive && !overlapping.contains(&idx) {
                        overlapping.push(idx);
                    }
                }
            }
        }

        let mut keep_new = true;
        for idx in overlapping {
            let existing = &mut positioned[idx];
            let existing_span = existing.suggestion.position.expect("positioned");
            let exact_duplicate = existing_span == span
                && existing.suggestion.match_text == suggestion.match_text;

            if exact_duplicate {
                // Identical claim: the higher-priority source wins, ties go
                // to the newer batch
                if priority >= existing.priority {
                    existing.alive = false;
                } else {
                    keep_new = false;
                }
                continue;
            }

            if existing.suggestion.category == suggestion.category {
                // Same category overlapping: the newest tier's view of this
                // region replaces the old one
                existing.alive = false;
                continue;
            }

            if self
                .policy
                .conflicts(existing.suggestion.category, suggestion.category)
            {
                if self.outranks(&suggestion, priority, &existing.suggestion, existing.priority) {
                    existing.alive = false;
                } else {
                    keep_new = false;
                }
            }
            // Non-conflicting categories coexist
        }

        if keep_new {
            let idx = positioned.len();
            for offset in span.start..span.end {
                char_index.entry(offset).or_default().push(idx);
            }
            positioned.push(Accumulated {
                suggestion,
                priority,
                alive: true,
            });
        }
    }

    /// Deterministic winner for a category conflict: source priority, then
    /// severity, then category declaration order.
    fn outranks(
        &self,
        new: &Suggestion,
        new_priority: u8,
        existing: &Suggestion,
        existing_priority: u8,
    ) -> bool {
        if new_priority != existing_priority {
            return new_priority > existing_priority;
        }
        if new.severity.rank() != existing.severity.rank() {
            return new.severity.rank() > existing.severity.rank();
        }
        category_rank(new.category) >= category_rank(existing.category)
    }
}

/// Fixed tie-break order between categories in a conflict: spelling beats
/// grammar beats style beats the document-level categories.
fn category_rank(category: Category) -> u8 {
    match category {
        Category::Spelling => 4,
        Category::Grammar => 3,
        Category::Style => 2,
        Category::Seo => 1,
        Category::Readability => 0,
    }
}

// =============================================================================
// Tests
// =============================================================================
