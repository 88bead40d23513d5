//! DocTree: minimal model of the host editor's document tree
//!
//! The host serializes its rich-text document into blocks of plain text runs.
//! Live coordinates are structural: position 0 sits before the first block,
//! entering a block consumes one slot, every UTF-8 byte of run text consumes
//! one slot, and leaving a block consumes one slot. This mirrors the position
//! space of tree-based editors, where block boundaries occupy coordinate
//! slots that plain text does not.

use serde::{Deserialize, Serialize};

// =============================================================================
// Types
// =============================================================================

/// One block-level node. Inline formatting does not affect coordinates, so
/// runs are stored as bare strings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocBlock {
    #[serde(default)]
    pub runs: Vec<String>,
}

impl DocBlock {
    pub fn from_text(text: &str) -> Self {
        Self {
            runs: vec![text.to_string()],
        }
    }

    /// Concatenated run text of this block.
    pub fn text(&self) -> String {
        self.runs.concat()
    }

    /// Byte length of the block's text.
    pub fn text_len(&self) -> usize {
        self.runs.iter().map(|r| r.len()).sum()
    }
}

/// Snapshot of the live document tree.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocTree {
    #[serde(default)]
    pub blocks: Vec<DocBlock>,
}

impl DocTree {
    pub fn new(blocks: Vec<DocBlock>) -> Self {
        Self { blocks }
    }

    /// Build a tree with one block per input paragraph.
    pub fn from_paragraphs(paragraphs: &[&str]) -> Self {
        Self {
            blocks: paragraphs.iter().map(|p| DocBlock::from_text(p)).collect(),
        }
    }

    /// Total size of the live coordinate space. Each block costs its text
    /// length plus two structural slots.
    pub fn live_len(&self) -> usize {
        self.blocks.iter().map(|b| b.text_len() + 2).sum()
    }

    /// True if `pos` lies within the live coordinate space.
    pub fn contains_pos(&self, pos: usize) -> bool {
        pos <= self.live_len()
    }

    /// Extract the run text covered by the live range `[from, to)`,
    /// skipping structural slots. Partial overlaps are clamped to
    /// character boundaries so multi-byte text never splits mid-character.
    pub fn text_between(&self, from: usize, to: usize) -> String {
        let mut out = String::new();
        if from >= to {
            return out;
        }
        let mut cursor = 0usize;
        for block in &self.blocks {
            let text = block.text();
            let text_start = cursor + 1;
            let text_end = text_start + text.len();
            cursor = text_end + 1;
            if text_end <= from {
                continue;
            }
            if text_start >= to {
                break;
            }
            let lo = from.max(text_start) - text_start;
            let hi = to.min(text_end) - text_start;
            let lo = floor_char_boundary(&text, lo);
            let hi = floor_char_boundary(&text, hi);
            if lo < hi {
                out.push_str(&text[lo..hi]);
            }
        }
        out
    }
}

/// Largest char boundary at or below `index`.
fn floor_char_boundary(s: &str, index: usize) -> usize {
    let mut i = index.min(s.len());
    while i > 0 && !s.is_char_boundary(i) {
        i -= 1;
    }
    i
}

// =============================================================================
// Tests
// =============================================================================
