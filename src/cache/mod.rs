//! Cache Module
//!
//! Keyed in-memory storage whose reads enforce a caller-supplied max age.

mod entry;
mod stats;
mod store;


// Re-export public types
pub use entry::CacheEntry;
pub use stats::CacheStats;
pub use store::TtlCache;
