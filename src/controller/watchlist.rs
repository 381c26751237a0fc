//! Watchlist Controller
//!
//! Resource controller for `GET /watchlist` plus optimistic mutations:
//! apply locally, call the service, then reconcile or roll back.

use async_trait::async_trait;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::api::SharedApi;
use crate::clock::SharedClock;
use crate::controller::resource::{ControllerOptions, FetchReason, Resource, ResourceController};
use crate::controller::state::ControllerState;
use crate::controller::SyncContext;
use crate::error::{Result, SyncError};
use crate::models::{MutationResponse, Symbol, WatchlistItem};
use crate::store::NotificationQueue;

// == Resource ==
pub struct WatchlistResource {
    api: SharedApi,
}

#[async_trait]
impl Resource for WatchlistResource {
    type Params = ();
    type Output = Vec<WatchlistItem>;

    fn name(&self) -> &'static str {
        "watchlist"
    }

    async fn fetch(&self, _params: &(), _reason: FetchReason) -> Result<Vec<WatchlistItem>> {
        let response = self.api.get_watchlist().await?;
        Ok(dedupe(response.watchlist))
    }
}

/// Keeps the first item for each canonical symbol.
fn dedupe(items: Vec<WatchlistItem>) -> Vec<WatchlistItem> {
    let mut seen = std::collections::HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.symbol.clone()))
        .collect()
}

fn acknowledged(response: Result<MutationResponse>) -> Result<()> {
    match response {
        Ok(ack) if ack.success => Ok(()),
        Ok(ack) => Err(SyncError::Rejected(
            ack.message
                .unwrap_or_else(|| "service reported failure".to_string()),
        )),
        Err(err) => Err(err),
    }
}

// == Watchlist Controller ==
pub struct WatchlistController {
    controller: ResourceController<WatchlistResource>,
    api: SharedApi,
    clock: SharedClock,
    notifications: Option<NotificationQueue>,
}

impl WatchlistController {
    /// Mounts the controller and starts the initial fetch.
    pub fn mount(ctx: &SyncContext, options: ControllerOptions) -> Self {
        let clock = ctx.store.clock();
        let resource = WatchlistResource {
            api: ctx.api.clone(),
        };
        Self {
            controller: ResourceController::new(resource, (), options, clock.clone()),
            api: ctx.api.clone(),
            clock,
            notifications: None,
        }
    }

    /// Reports mutation outcomes as transient notifications.
    pub fn with_notifications(mut self, queue: NotificationQueue) -> Self {
        self.notifications = Some(queue);
        self
    }

    // == Reads ==
    pub fn state(&self) -> ControllerState<Vec<WatchlistItem>> {
        self.controller.state()
    }

    pub fn subscribe(&self) -> watch::Receiver<ControllerState<Vec<WatchlistItem>>> {
        self.controller.subscribe()
    }

    pub fn items(&self) -> Vec<WatchlistItem> {
        self.controller.data().unwrap_or_default()
    }

    pub fn count(&self) -> usize {
        self.controller.state().data.map_or(0, |items| items.len())
    }

    pub fn error(&self) -> Option<SyncError> {
        self.controller.error()
    }

    /// Membership against the visible list, optimistic changes included.
    pub fn is_in_watchlist(&self, raw: &str) -> bool {
        let Ok(symbol) = Symbol::parse(raw) else {
            return false;
        };
        self.controller
            .state()
            .data
            .is_some_and(|items| items.iter().any(|item| item.symbol == symbol))
    }

    pub fn controller(&self) -> &ResourceController<WatchlistResource> {
        &self.controller
    }

    // == Refetch ==
    pub fn refetch(&self) {
        self.controller.refetch();
    }

    pub async fn refresh(&self) -> bool {
        self.controller.refresh().await
    }

    pub fn dispose(&self) {
        self.controller.dispose();
    }

    // == Add ==
    /// Optimistically adds `raw` to the watchlist.
    ///
    /// The local item shows up immediately without a score. On success the
    /// whole list is replaced by the service's canonical one; on failure the
    /// local item is removed again. Returns whether the service accepted it.
    pub async fn add(&self, raw: &str, notes: Option<&str>) -> bool {
        let symbol = match Symbol::parse(raw) {
            Ok(symbol) => symbol,
            Err(err) => return self.fail("add", err),
        };
        if self.is_in_watchlist(symbol.as_str()) {
            return self.fail("add", SyncError::Duplicate(symbol.to_string()));
        }

        // A list fetched before this mutation must not overwrite it
        let interrupted = self.controller.cancel_in_flight();
        let was_loaded = self.controller.data().is_some();
        let pending = WatchlistItem::pending(
            symbol.clone(),
            self.clock.now(),
            notes.map(str::to_string),
        );
        self.controller
            .update_data(|data| data.get_or_insert_with(Vec::new).push(pending));

        let outcome = acknowledged(self.api.add_to_watchlist(&symbol, notes).await);
        match outcome {
            Ok(()) => {
                info!(%symbol, "added to watchlist");
                self.controller.set_error(None);
                self.notify_success(format!("{symbol} added to watchlist"));
                // A failed reconcile keeps the optimistic item and records the error
                self.controller.refresh().await;
                true
            }
            Err(err) => {
                self.controller.update_data(|data| {
                    if !was_loaded {
                        *data = None;
                    } else if let Some(items) = data {
                        items.retain(|item| item.symbol != symbol);
                    }
                });
                let failed = self.fail("add", err);
                self.resume(interrupted);
                failed
            }
        }
    }

    // == Remove ==
    /// Optimistically removes `raw` from the watchlist.
    ///
    /// On failure the list captured before the removal is restored.
    pub async fn remove(&self, raw: &str) -> bool {
        let symbol = match Symbol::parse(raw) {
            Ok(symbol) => symbol,
            Err(err) => return self.fail("remove", err),
        };

        let interrupted = self.controller.cancel_in_flight();
        let snapshot = self.controller.data();
        self.controller.update_data(|data| {
            if let Some(items) = data {
                items.retain(|item| item.symbol != symbol);
            }
        });

        let outcome = acknowledged(self.api.remove_from_watchlist(&symbol).await);
        let removed = match outcome {
            Ok(()) => {
                info!(%symbol, "removed from watchlist");
                self.controller.set_error(None);
                self.notify_success(format!("{symbol} removed from watchlist"));
                true
            }
            Err(err) => {
                self.controller.update_data(|data| *data = snapshot);
                self.fail("remove", err)
            }
        };
        self.resume(interrupted);
        removed
    }

    /// Re-issues a list fetch that a mutation cancelled before it landed.
    fn resume(&self, interrupted: bool) {
        if interrupted {
            debug!("reloading watchlist after interrupted fetch");
            self.controller.refetch();
        }
    }

    // == Failure Reporting ==
    fn fail(&self, action: &str, err: SyncError) -> bool {
        warn!(action, error = %err, "watchlist mutation failed");
        if let Some(queue) = &self.notifications {
            queue.error(format!("Failed to {action}: {err}"));
        }
        self.controller.set_error(Some(err));
        false
    }

    fn notify_success(&self, message: String) {
        if let Some(queue) = &self.notifications {
            queue.success(message);
        }
    }
}

impl std::fmt::Debug for WatchlistController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatchlistController")
            .field("controller", &self.controller)
            .field("notifications", &self.notifications.is_some())
            .finish()
    }
}
