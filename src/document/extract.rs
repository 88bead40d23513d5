//! Plain-text extraction and the plain-to-live position map
//!
//! Analyzers see a flat string; the editor sees a tree. Extraction produces
//! both the flat snapshot and the table translating between the two
//! coordinate spaces. Block boundaries contribute no plain-text bytes but do
//! consume live slots, so the map is a list of monotone segments with gaps
//! at every structural boundary. Maps are regenerated on every extraction
//! and never reused across edits.

use serde::{Deserialize, Serialize};

use super::tree::DocTree;

// =============================================================================
// Types
// =============================================================================

/// One contiguous text run shared by both coordinate spaces.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct Segment {
    plain_start: usize,
    live_start: usize,
    len: usize,
}

impl Segment {
    fn plain_end(&self) -> usize {
        self.plain_start + self.len
    }

    fn live_end(&self) -> usize {
        self.live_start + self.len
    }
}

/// Translation table from plain-text offsets to live coordinates.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PositionMap {
    segments: Vec<Segment>,
    plain_len: usize,
}

/// Extraction output: the flat text plus its position map.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub text: String,
    pub map: PositionMap,
}

// =============================================================================
// Extraction
// =============================================================================

/// Produce the plain-text snapshot and position map for a document tree.
pub fn extract(doc: &DocTree) -> Snapshot {
    let mut text = String::new();
    let mut segments = Vec::with_capacity(doc.blocks.len());
    let mut live = 0usize;

    for block in &doc.blocks {
        let block_text = block.text();
        if !block_text.is_empty() {
            segments.push(Segment {
                plain_start: text.len(),
                live_start: live + 1,
                len: block_text.len(),
            });
            text.push_str(&block_text);
        }
        live += block_text.len() + 2;
    }

    let plain_len = text.len();
    Snapshot {
        text,
        map: PositionMap {
            segments,
            plain_len,
        },
    }
}

// =============================================================================
// PositionMap
// =============================================================================

impl PositionMap {
    /// Total plain-text length this map covers.
    pub fn plain_len(&self) -> usize {
        self.plain_len
    }

    /// Map a plain offset to its live coordinate. A plain offset names the
    /// position before the byte at that offset; the mapping is unique except
    /// when the offset falls exactly on the gap between two segments, where
    /// both the end of one block and the start of the next are candidates.
    /// Those gap offsets return `None` (unmappable).
    pub fn plain_to_live(&self, offset: usize) -> Option<usize> {
        if self.segments.is_empty() || offset > self.plain_len {
            return None;
        }
        if offset == 0 {
            return Some(self.segments[0].live_start);
        }
        if offset == self.plain_len {
            return Some(self.segments.last()?.live_end());
        }
        let idx = self.segment_index(offset);
        let seg = &self.segments[idx];
        if offset == seg.plain_start {
            // Exactly on the boundary gap between two segments
            return None;
        }
        Some(seg.live_start + (offset - seg.plain_start))
    }

    /// Map a plain span to live coordinates, resolving boundary offsets with
    /// forward bias at the start and backward bias at the end. Returns `None`
    /// for empty, inverted, or out-of-range spans.
    pub fn span_to_live(&self, start: usize, end: usize) -> Option<(usize, usize)> {
        if start >= end || end > self.plain_len {
            return None;
        }
        let from = self.plain_to_live_biased(start, true)?;
        let to = self.plain_to_live_biased(end, false)?;
        if from < to {
            Some((from, to))
        } else {
            None
        }
    }

    /// Biased mapping: `forward` resolves a boundary offset to the start of
    /// the following segment, otherwise to the end of the preceding one.
    fn plain_to_live_biased(&self, offset: usize, forward: bool) -> Option<usize> {
        if self.segments.is_empty() || offset > self.plain_len {
            return None;
        }
        if forward {
            if offset == self.plain_len {
                return None;
            }
            let seg = &self.segments[self.segment_index(offset)];
            Some(seg.live_start + (offset - seg.plain_start))
        } else {
            if offset == 0 {
                return None;
            }
            // Segment whose text contains the byte just before the offset
            let seg = &self.segments[self.segment_index(offset - 1)];
            Some(seg.live_start + (offset - seg.plain_start))
        }
    }

    /// Index of the segment containing the byte at `offset`.
    /// Caller guarantees `offset < plain_len`.
    fn segment_index(&self, offset: usize) -> usize {
        match self
            .segments
            .binary_search_by(|seg| {
                if offset < seg.plain_start {
                    std::cmp::Ordering::Greater
                } else if offset >= seg.plain_end() {
                    std::cmp::Ordering::Less
                } else {
                    std::cmp::Ordering::Equal
                }
            }) {
            Ok(idx) => idx,
            // Unreachable for in-range offsets since segments tile the text
            Err(idx) => idx.min(self.segments.len().saturating_sub(1)),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
