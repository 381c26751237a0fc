//! Store Module
//!
//! Session-wide client state shared by every controller: the history cache,
//! the comparison set, the selected stock and the notification queue.
//!
//! The store is an explicit handle rather than a global, so tests build
//! isolated instances. Internal collections are never exposed mutably.

pub mod comparison;
pub mod notifications;


use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::info;

use crate::cache::{CacheStats, TtlCache};
use crate::clock::{SharedClock, SystemClock};
use crate::config::Config;
use crate::error::Result;
use crate::models::{StockHistory, Symbol};

pub use comparison::{ComparisonSet, MAX_COMPARISON};
pub use notifications::{
    Notification, NotificationKind, NotificationQueue, DEFAULT_NOTIFICATION_DURATION,
};

/// Default max age for cached history series (15 minutes).
pub const HISTORY_MAX_AGE: Duration = Duration::from_secs(15 * 60);

struct StoreInner {
    history: Mutex<TtlCache<StockHistory>>,
    comparison: Mutex<ComparisonSet>,
    selected: Mutex<Option<Symbol>>,
    notifications: NotificationQueue,
    clock: SharedClock,
}

// == App Store ==
/// Cloneable handle to the shared client state.
#[derive(Clone)]
pub struct AppStore {
    inner: Arc<StoreInner>,
}

impl AppStore {
    // == Constructors ==
    pub fn new(clock: SharedClock, notification_duration: Duration) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                history: Mutex::new(TtlCache::new(clock.clone())),
                comparison: Mutex::new(ComparisonSet::new()),
                selected: Mutex::new(None),
                notifications: NotificationQueue::new(clock.clone(), notification_duration),
                clock,
            }),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(Arc::new(SystemClock), config.notification_duration())
    }

    pub fn clock(&self) -> SharedClock {
        self.inner.clock.clone()
    }

    // == History Cache ==
    /// Stores a history series under `key`, stamped with the current time.
    pub fn cache_historical_data(&self, key: &str, data: StockHistory) {
        self.inner.history.lock().set(key, data);
    }

    /// Returns the series cached under `key` unless it is older than `max_age`.
    /// Stale entries are evicted by the read.
    pub fn get_historical_data(&self, key: &str, max_age: Duration) -> Option<StockHistory> {
        self.inner.history.lock().get(key, max_age)
    }

    pub fn has_historical_data(&self, key: &str) -> bool {
        self.inner.history.lock().contains_key(key)
    }

    /// Evicts every history series older than `max_age`.
    pub fn sweep_stale_history(&self, max_age: Duration) -> usize {
        self.inner.history.lock().sweep(max_age)
    }

    pub fn clear_cache(&self) {
        self.inner.history.lock().clear();
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.inner.history.lock().stats()
    }

    // == Comparison Set ==
    pub fn add_to_comparison(&self, raw: &str) -> bool {
        self.inner.comparison.lock().add(raw)
    }

    pub fn remove_from_comparison(&self, raw: &str) -> bool {
        self.inner.comparison.lock().remove(raw)
    }

    pub fn clear_comparison(&self) {
        self.inner.comparison.lock().clear();
    }

    pub fn can_add_to_comparison(&self) -> bool {
        self.inner.comparison.lock().can_add()
    }

    pub fn comparison(&self) -> Vec<Symbol> {
        self.inner.comparison.lock().symbols().to_vec()
    }

    // == Selection ==
    pub fn select_stock(&self, raw: &str) -> Result<Symbol> {
        let symbol = Symbol::parse(raw)?;
        *self.inner.selected.lock() = Some(symbol.clone());
        Ok(symbol)
    }

    pub fn selected_stock(&self) -> Option<Symbol> {
        self.inner.selected.lock().clone()
    }

    pub fn clear_selection(&self) {
        *self.inner.selected.lock() = None;
    }

    // == Notifications ==
    pub fn notifications(&self) -> &NotificationQueue {
        &self.inner.notifications
    }

    pub fn notify(&self, kind: NotificationKind, message: impl Into<String>) -> u64 {
        self.inner.notifications.push(kind, message, None)
    }

    // == Reset ==
    /// Clears all session state, as on logout.
    pub fn reset(&self) {
        self.clear_cache();
        self.clear_comparison();
        self.clear_selection();
        self.inner.notifications.clear();
        info!("store reset");
    }
}

impl std::fmt::Debug for AppStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppStore")
            .field("history", &*self.inner.history.lock())
            .field("comparison", &*self.inner.comparison.lock())
            .field("selected", &*self.inner.selected.lock())
            .field("notifications", &self.inner.notifications)
            .finish()
    }
}
