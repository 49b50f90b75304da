//! Set-associative cache indexing and block replacement engine.
//!
//! This crate decides *where* blocks live in a set-associative cache and
//! *which* block leaves when a set is full. It provides:
//! 1. **Indexing:** Address to (set, tag) mapping and candidate enumeration.
//! 2. **Storage:** A fixed table of tagged entries grouped into sets.
//! 3. **Replacement:** LRU, tree pseudo-LRU and bimodal RRIP policies behind one trait.
//! 4. **Orchestration:** The [`Cache`] type exposing `lookup`/`fill` to a timing model.
//!
//! Latency, bus timing, coherence and statistics belong to the caller; the
//! engine only reports hits, misses and evicted tags.

/// Shared error types.
pub mod common;
/// Construction configuration (defaults, policy selection, validation).
pub mod config;
/// Cache orchestrator, address indexer, entry table and replacement policies.
pub mod cache;

/// Orchestrator and its operation results.
pub use crate::cache::{Access, Cache, Fill, Lookup};
/// Errors raised at construction and by internal invariant checks.
pub use crate::common::error::{CacheError, ConfigError};
/// Root configuration type; use `CacheConfig::default()` or deserialize from JSON.
pub use crate::config::{BrripConfig, CacheConfig, PolicyKind};
