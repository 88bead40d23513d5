//! AI enhancement tier: batching, caching, and merge-back
//!
//! Sans-IO by design. The queue decides which suggestions merit a rewrite
//! call and emits batch requests; the host performs the fetch and feeds the
//! response (or failure) back. Stale and duplicate responses are tolerated
//! through idempotent merging.
//!
//! - `protocol.rs` - request/response schema and validation
//! - `cache.rs` - bounded TTL cache with a pluggable persistent store
//! - `queue.rs` - eligibility, quiet-period batching, failure handling

pub mod cache;
pub mod protocol;
pub mod queue;

pub use cache::{CacheStore, MemoryStore, TtlCache};
pub use protocol::{EnhancementRequest, EnhancementResponse, EnhancementResult};
pub use queue::{EnhancementQueue, FailureKind, PollOutcome};
