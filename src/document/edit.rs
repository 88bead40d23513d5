//! EditDelta: mapping live positions through document edits
//!
//! The host reports each edit transaction as a set of replaced ranges in
//! pre-edit live coordinates. Positions downstream of a change shift by the
//! change's net size difference; positions inside a replaced range are
//! deleted rather than clamped, so a stale highlight can never survive an
//! edit that destroyed its text.

use serde::{Deserialize, Serialize};

// =============================================================================
// Types
// =============================================================================

/// One replaced range: `old_len` live slots starting at `start` were replaced
/// by `new_len` slots. A pure insertion has `old_len == 0`, a pure deletion
/// has `new_len == 0`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SpanChange {
    pub start: usize,
    pub old_len: usize,
    pub new_len: usize,
}

impl SpanChange {
    /// Net coordinate shift caused by this change.
    pub fn shift(&self) -> i64 {
        self.new_len as i64 - self.old_len as i64
    }
}

/// Side a mapped position associates with when an insertion lands exactly
/// on it. `After` lets inserted text push the position right (span starts),
/// `Before` keeps the position left of the insertion (span ends).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assoc {
    Before,
    After,
}

/// An edit transaction's position map. Changes are kept sorted by start and
/// must not overlap; all starts are pre-edit coordinates.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EditDelta {
    changes: Vec<SpanChange>,
}

impl EditDelta {
    pub fn new(mut changes: Vec<SpanChange>) -> Self {
        changes.sort_by_key(|c| c.start);
        Self { changes }
    }

    /// Insertion of `len` slots at `at`.
    pub fn insertion(at: usize, len: usize) -> Self {
        Self::new(vec![SpanChange {
            start: at,
            old_len: 0,
            new_len: len,
        }])
    }

    /// Deletion of `len` slots starting at `at`.
    pub fn deletion(at: usize, len: usize) -> Self {
        Self::new(vec![SpanChange {
            start: at,
            old_len: len,
            new_len: 0,
        }])
    }

    /// Replacement of `old_len` slots at `at` with `new_len` slots.
    pub fn replacement(at: usize, old_len: usize, new_len: usize) -> Self {
        Self::new(vec![SpanChange {
            start: at,
            old_len,
            new_len,
        }])
    }

    pub fn changes(&self) -> &[SpanChange] {
        &self.changes
    }

    /// Map a single position through the delta. Returns `None` when the
    /// position fell strictly inside a replaced range.
    pub fn map_pos(&self, pos: usize, assoc: Assoc) -> Option<usize> {
        let mut diff = 0i64;
        for change in &self.changes {
            let end = change.start + change.old_len;
            if end < pos || (end == pos && change.old_len > 0) {
                // Change fully before the position (or a deletion ending
                // exactly on it): position rides the shift
                diff += change.shift();
                continue;
            }
            if change.start > pos {
                break;
            }
            if change.start == pos {
                // Pure insertion exactly at the position
                if change.old_len == 0 && assoc == Assoc::After {
                    diff += change.new_len as i64;
                }
                continue;
            }
            // start < pos < end: the position's slot was replaced
            return None;
        }
        let mapped = pos as i64 + diff;
        debug_assert!(mapped >= 0);
        Some(mapped as usize)
    }

    /// Map a span, associating its start after insertions and its end before
    /// them. Returns `None` when either endpoint was deleted or the span
    /// collapsed.
    pub fn map_span(&self, from: usize, to: usize) -> Option<(usize, usize)> {
        let from = self.map_pos(from, Assoc::After)?;
        let to = self.map_pos(to, Assoc::Before)?;
        if from < to {
            Some((from, to))
        } else {
            None
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
