//! ScribeCore: Incremental Writing-Analysis Engine
//!
//! A Rust/WASM implementation of the ScribeClouds editor analysis pipeline.
//!
//! # Architecture
//!
//! ## Document model
//! - `document/tree.rs` - DocTree: blocks of text runs, live coordinate space
//! - `document/edit.rs` - EditDelta: position mapping through edits
//! - `document/extract.rs` - plain-text snapshot + plain-to-live map
//!
//! ## Analysis core
//! - `analysis/conductor.rs` - AnalysisConductor: **single entry point** for
//!   the whole pipeline (document changes in, suggestions and decorations out)
//! - `analysis/scheduler.rs` - TierScheduler: instant/fast/deep debounce
//!   windows, last-started-wins run versioning
//! - `analysis/factory.rs` - deterministic suggestion ids
//! - `analysis/dedup.rs` - cross-tier merge with a configurable conflict policy
//! - `analysis/tracker.rs` - SuggestionTracker: live highlight spans kept
//!   valid across edits
//!
//! ## Analyzers
//! - `analyzers/` - spelling (Aho-Corasick), grammar and style (regex rules),
//!   SEO and readability (threshold metrics)
//!
//! ## AI enhancement
//! - `enhance/` - eligibility, quiet-period batching, TTL response cache;
//!   sans-IO (the host performs the fetches)
//!
//! # Usage (WASM)
//! ```javascript,ignore
//! import init, { AnalysisConductor } from 'scribecore';
//!
//! await init();
//!
//! const conductor = new AnalysisConductor();
//! conductor.init();
//! conductor.hydrateMetadata({ title, meta_description, target_keyword }, Date.now());
//!
//! // On every editor transaction:
//! conductor.applyEdit(delta, doc, Date.now());
//!
//! // On a timer (and after edits):
//! const outcome = conductor.tick(Date.now());
//! for (const request of outcome.requests) {
//!   const body = await fetch(AI_ENDPOINT, { body: JSON.stringify(request) });
//!   conductor.completeEnhancement(request.batch_id, await body.text(), Date.now());
//! }
//!
//! render(conductor.decorations());
//! ```

pub mod analysis;
pub mod analyzers;
pub mod document;
pub mod enhance;

// Public exports - pipeline
pub use analysis::*;
pub use document::*;

use wasm_bindgen::prelude::*;

// When the `wee_alloc` feature is enabled, use `wee_alloc` as the global
// allocator for smaller WASM bundle size.
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

/// Initialize panic hook for better error messages in browser console
#[wasm_bindgen(start)]
pub fn main() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Get version information
#[wasm_bindgen]
pub fn version() -> String {
    format!("scribecore v{}", env!("CARGO_PKG_VERSION"))
}

/// Log a warning to the host console (browser console on wasm, stderr on
/// native test builds).
pub(crate) fn log_warn(message: &str) {
    #[cfg(target_arch = "wasm32")]
    web_sys::console::warn_1(&message.into());
    #[cfg(not(target_arch = "wasm32"))]
    eprintln!("{}", message);
}
