//! ChangeDetector: content-addressable skip detection
//!
//! Hashes the plain-text snapshot so unchanged text never re-runs a tier.
//! One detector per tier; the scheduler consults it when a debounce window
//! fires.

use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Compute the content hash of a snapshot.
pub fn content_hash(text: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    text.hash(&mut hasher);
    hasher.finish()
}

/// Result of a change check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeResult {
    pub has_changed: bool,
    pub content_hash: u64,
    pub previous_hash: Option<u64>,
}

/// Tracks the last-seen content hash plus skip statistics.
#[derive(Debug, Clone, Default)]
pub struct ChangeDetector {
    last_hash: Option<u64>,
    check_count: u64,
    skip_count: u64,
}

impl ChangeDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check whether `text` differs from the previous check. The first check
    /// always counts as changed.
    pub fn check(&mut self, text: &str) -> ChangeResult {
        self.check_count += 1;
        let current_hash = content_hash(text);
        let previous_hash = self.last_hash;

        let has_changed = match previous_hash {
            None => true,
            Some(prev) => prev != current_hash,
        };
        if !has_changed {
            self.skip_count += 1;
        }
        self.last_hash = Some(current_hash);

        ChangeResult {
            has_changed,
            content_hash: current_hash,
            previous_hash,
        }
    }

    /// Record a hash applied through some other path (a completed run).
    pub fn record(&mut self, hash: u64) {
        self.last_hash = Some(hash);
    }

    pub fn last_hash(&self) -> Option<u64> {
        self.last_hash
    }

    /// Share of checks that were skippable, as a percentage.
    pub fn skip_rate(&self) -> f64 {
        if self.check_count == 0 {
            return 0.0;
        }
        (self.skip_count as f64 / self.check_count as f64) * 100.0
    }

    pub fn check_count(&self) -> u64 {
        self.check_count
    }

    pub fn skip_count(&self) -> u64 {
        self.skip_count
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_check_is_changed() {
        let mut detector = ChangeDetector::new();
        assert!(detector.check("Hello world").has_changed);
    }

    #[test]
    fn test_same_content_is_skipped() {
        let mut detector = ChangeDetector::new();
        detector.check("Hello world");
        assert!(!detector.check("Hello world").has_changed);
        assert_eq!(detector.skip_count(), 1);
    }

    #[test]
    fn test_different_content_is_changed() {
        let mut detector = ChangeDetector::new();
        detector.check("Hello world");
        assert!(detector.check("Hello universe").has_changed);
    }

    #[test]
    fn test_hash_is_deterministic() {
        assert_eq!(content_hash("The quick brown fox"), content_hash("The quick brown fox"));
        assert_ne!(content_hash("a"), content_hash("b"));
    }

    #[test]
    fn test_skip_rate() {
        let mut detector = ChangeDetector::new();
        detector.check("A");
        detector.check("A");
        detector.check("A");
        detector.check("A");
        assert!((detector.skip_rate() - 75.0).abs() < 0.01);
    }

    #[test]
    fn test_record_marks_hash_as_seen() {
        let mut detector = ChangeDetector::new();
        detector.record(content_hash("Hello"));
        assert!(!detector.check("Hello").has_changed);
    }

    #[test]
    fn test_reset() {
        let mut detector = ChangeDetector::new();
        detector.check("Hello");
        detector.reset();
        assert!(detector.last_hash().is_none());
        assert!(detector.check("Hello").has_changed);
    }
}
