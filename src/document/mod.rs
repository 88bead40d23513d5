//! Document model: live tree, coordinate mapping, plain-text extraction
//!
//! The editing surface itself lives in the host. This module models just
//! enough of its document tree to reason about positions:
//! - `tree.rs` - DocTree: blocks of text runs, live coordinate space
//! - `edit.rs` - EditDelta: mapping live positions through edits
//! - `extract.rs` - plain-text snapshot + plain-to-live position map

pub mod edit;
pub mod extract;
pub mod tree;

pub use edit::{Assoc, EditDelta, SpanChange};
pub use extract::{PositionMap, Snapshot};
pub use tree::{DocBlock, DocTree};
