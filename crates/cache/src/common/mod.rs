//! Common types shared across the cache engine.
//!
//! Currently this is the error vocabulary: configuration failures raised at
//! construction and invariant violations raised by the orchestrator.

/// Error types for configuration and internal invariant checks.
pub mod error;

pub use error::{CacheError, ConfigError};
