//! Controller Module
//!
//! Per-resource controllers binding views to remote data.
//!
//! # Controllers
//! - Watchlist: optimistic add/remove on top of the canonical list
//! - Sector stats: parameterized by lookback window
//! - Stock history: parameterized by symbol, read through the history cache
//! - System metrics: polled

pub mod guard;
pub mod history;
pub mod resource;
pub mod sectors;
pub mod state;
pub mod system;
pub mod watchlist;

use std::time::Duration;

use crate::api::SharedApi;
use crate::config::Config;
use crate::store::{AppStore, HISTORY_MAX_AGE};

pub use guard::{RequestGuard, Ticket};
pub use history::{HistoryParams, StockHistoryController, StockHistoryResource};
pub use resource::{ControllerOptions, FetchReason, Resource, ResourceController};
pub use sectors::{SectorStatsController, SectorStatsResource};
pub use state::{ControllerState, Phase};
pub use system::{SystemMetricsController, SystemMetricsResource};
pub use watchlist::{WatchlistController, WatchlistResource};

/// Everything a controller needs to mount: the remote API and the store.
#[derive(Clone)]
pub struct SyncContext {
    pub api: SharedApi,
    pub store: AppStore,
    /// Max age of cached history series served to history controllers
    pub history_max_age: Duration,
}

impl SyncContext {
    pub fn new(api: SharedApi, store: AppStore) -> Self {
        Self {
            api,
            store,
            history_max_age: HISTORY_MAX_AGE,
        }
    }

    pub fn from_config(api: SharedApi, store: AppStore, config: &Config) -> Self {
        Self {
            history_max_age: config.history_max_age(),
            ..Self::new(api, store)
        }
    }
}

impl std::fmt::Debug for SyncContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncContext")
            .field("store", &self.store)
            .field("history_max_age", &self.history_max_age)
            .finish()
    }
}
