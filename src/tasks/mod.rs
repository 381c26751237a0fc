//! Background Tasks Module
//!
//! Long-running tasks that keep session state tidy.
//!
//! # Tasks
//! - Cache sweep: evicts stale history series that were never read again

mod sweep;

pub use sweep::spawn_cache_sweep_task;
