//! In-memory cache for enriched search results.
//!
//! Entries are keyed by the raw query string and live for the process
//! lifetime. Nothing is persisted to disk.
//!
//! - Bounded by a fixed entry capacity
//! - Evicts strictly in insertion order (reads never refresh an entry)
//! - Keys are not normalized: `"Rust"` and `"rust"` are distinct entries

mod ordered;

pub use ordered::ResultCache;
