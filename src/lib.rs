//! Stock Sync - client-side synchronization layer for a stock-analysis service
//!
//! Resource controllers that fetch, cancel and auto-refresh remote data, plus
//! a shared store holding TTL-bound caches, a bounded comparison set, the
//! watchlist's optimistic mutation protocol and transient notifications.

pub mod api;
pub mod cache;
pub mod clock;
pub mod config;
pub mod controller;
pub mod error;
pub mod models;
pub mod store;
pub mod tasks;

pub use api::{AnalysisApi, HttpApi, SharedApi};
pub use config::Config;
pub use controller::{ControllerOptions, ControllerState, SyncContext};
pub use error::{Result, SyncError};
pub use store::AppStore;
pub use tasks::spawn_cache_sweep_task;
