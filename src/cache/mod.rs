//! In-memory caching layer for documents fetched during one run.
//!
//! This module provides a source-agnostic cache that:
//! - Holds one immutable entry per key for the lifetime of the cache
//! - Runs at most one fetch per key at a time, sharing the result with
//!   every caller waiting on it
//! - Leaves the key empty when a fetch fails, so a later caller tries again

mod layer;
mod traits;

pub use layer::CacheLayer;
pub use traits::CacheSource;
