//! Analysis orchestration core
//!
//! - `suggestion.rs` - canonical data model
//! - `factory.rs` - deterministic suggestion ids
//! - `change.rs` - content-hash skip detection
//! - `scheduler.rs` - tier debounce windows and run versioning
//! - `dedup.rs` - cross-tier merge and conflict policy
//! - `tracker.rs` - live-position ownership
//! - `decorations.rs` - render-agnostic highlight projection
//! - `conductor.rs` - the facade the host drives

pub mod change;
pub mod conductor;
pub mod decorations;
pub mod dedup;
pub mod factory;
pub mod scheduler;
pub mod suggestion;
pub mod tracker;

pub use conductor::{AnalysisConductor, Notice, TextReplacement, TickOutcome};
pub use decorations::{decoration_plan, Decoration, DecorationSink};
pub use dedup::{CategoryConflictPolicy, SuggestionMerger};
pub use scheduler::{AnalysisTier, ScheduledRun, TierScheduler};
pub use suggestion::{
    ActionKind, AiEnhancement, Category, PlainSpan, Severity, Suggestion, SuggestionAction,
};
pub use tracker::{SuggestionTracker, TrackedPosition};
