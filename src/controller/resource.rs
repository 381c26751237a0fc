//! Resource Controller
//!
//! Binds one view to one remote resource: fetch on mount, refetch when
//! parameters change, optional periodic refresh, and publication of
//! `{data, loading, error, last_updated}` over a watch channel.
//!
//! Every fetch goes through the instance's [`RequestGuard`], so only the most
//! recently issued fetch can land. Failures keep the previous data.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::AbortHandle;
use tracing::{debug, warn};

use crate::clock::SharedClock;
use crate::controller::guard::{RequestGuard, Ticket};
use crate::controller::state::ControllerState;
use crate::error::{Result, SyncError};

/// Why a fetch was issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchReason {
    Initial,
    ParamsChanged,
    Manual,
    AutoRefresh,
}

// == Resource Trait ==
/// A remote resource a controller can load.
#[async_trait]
pub trait Resource: Send + Sync + 'static {
    type Params: Clone + PartialEq + fmt::Debug + Send + Sync + 'static;
    type Output: Clone + Send + Sync + 'static;

    /// Short name used in log events.
    fn name(&self) -> &'static str;

    async fn fetch(&self, params: &Self::Params, reason: FetchReason) -> Result<Self::Output>;
}

// == Options ==
#[derive(Debug, Clone, PartialEq)]
pub struct ControllerOptions {
    /// When false, nothing is fetched until the controller is enabled
    pub enabled: bool,
    /// Period of the auto-refresh timer, if any
    pub refresh_interval: Option<Duration>,
    /// Flag data as stale while an auto-refresh is running
    pub mark_stale_on_refresh: bool,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            refresh_interval: None,
            mark_stale_on_refresh: false,
        }
    }
}

impl ControllerOptions {
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn auto_refresh(mut self, interval: Duration) -> Self {
        self.refresh_interval = Some(interval);
        self
    }

    pub fn mark_stale(mut self, mark: bool) -> Self {
        self.mark_stale_on_refresh = mark;
        self
    }
}

// == Shared Core ==
struct Shared<R: Resource> {
    resource: R,
    params: Mutex<R::Params>,
    enabled: AtomicBool,
    mark_stale: bool,
    guard: RequestGuard,
    state: watch::Sender<ControllerState<R::Output>>,
    clock: SharedClock,
}

impl<R: Resource> Shared<R> {
    fn begin(&self, reason: FetchReason) -> Ticket {
        let ticket = self.guard.begin();
        let stale = reason == FetchReason::AutoRefresh && self.mark_stale;
        self.state.send_modify(|state| {
            state.loading = true;
            if stale {
                state.is_stale = true;
            }
        });
        debug!(resource = self.resource.name(), ?reason, "fetch started");
        ticket
    }

    /// Issues a fetch on its own task.
    fn start(self: &Arc<Self>, reason: FetchReason) {
        let ticket = self.begin(reason);
        let params = self.params.lock().clone();
        let shared = Arc::clone(self);
        let task = tokio::spawn(async move {
            let result = shared.resource.fetch(&params, reason).await;
            shared.settle(ticket, result);
        });
        self.guard.attach(ticket, task.abort_handle());
    }

    /// Issues a fetch and waits for it on the caller's task.
    ///
    /// Dropping the returned future before it settles cancels the fetch.
    async fn run(&self, reason: FetchReason) -> bool {
        let ticket = self.begin(reason);
        let inline = InlineFetch {
            shared: self,
            ticket,
            armed: true,
        };
        let params = self.params.lock().clone();
        let result = self.resource.fetch(&params, reason).await;
        inline.disarm();
        self.settle(ticket, result)
    }

    /// Cancels `ticket` if it is still the outstanding fetch.
    fn abandon(&self, ticket: Ticket) {
        if self.guard.cancel_ticket(ticket) {
            self.state.send_modify(|state| state.loading = false);
            debug!(resource = self.resource.name(), "inline fetch abandoned");
        }
    }

    /// Applies a fetch outcome if its ticket is still current.
    ///
    /// Returns true if fresh data was applied.
    fn settle(&self, ticket: Ticket, result: Result<R::Output>) -> bool {
        let name = self.resource.name();
        let now = self.clock.now();
        let mut applied = false;

        self.state.send_if_modified(|state| {
            if !self.guard.is_current(ticket) {
                debug!(resource = name, "discarding superseded result");
                return false;
            }
            state.loading = false;
            match result {
                Ok(data) => {
                    state.data = Some(data);
                    state.error = None;
                    state.last_updated = Some(now);
                    state.is_stale = false;
                    applied = true;
                }
                Err(err) if err.is_cancellation() => {}
                Err(err) => {
                    warn!(resource = name, error = %err, "fetch failed");
                    state.error = Some(err);
                }
            }
            true
        });

        self.guard.finish(ticket);
        applied
    }

    fn cancel_in_flight(&self) -> bool {
        let cancelled = self.guard.cancel();
        if cancelled {
            self.state.send_modify(|state| state.loading = false);
            debug!(resource = self.resource.name(), "in-flight fetch cancelled");
        }
        cancelled
    }
}

/// Cancels an inline fetch whose future is dropped before it settles.
struct InlineFetch<'a, R: Resource> {
    shared: &'a Shared<R>,
    ticket: Ticket,
    armed: bool,
}

impl<R: Resource> InlineFetch<'_, R> {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl<R: Resource> Drop for InlineFetch<'_, R> {
    fn drop(&mut self) {
        if self.armed {
            self.shared.abandon(self.ticket);
        }
    }
}

// == Resource Controller ==
/// Per-view controller for a remote resource.
///
/// Must be created inside a tokio runtime. Dropping the controller cancels
/// its in-flight fetch and its refresh timer.
pub struct ResourceController<R: Resource> {
    shared: Arc<Shared<R>>,
    refresh_timer: Mutex<Option<AbortHandle>>,
}

impl<R: Resource> ResourceController<R> {
    // == Constructor ==
    /// Mounts the controller. Fetches immediately unless disabled.
    pub fn new(resource: R, params: R::Params, options: ControllerOptions, clock: SharedClock) -> Self {
        let (state, _) = watch::channel(ControllerState::default());
        let controller = Self {
            shared: Arc::new(Shared {
                resource,
                params: Mutex::new(params),
                enabled: AtomicBool::new(options.enabled),
                mark_stale: options.mark_stale_on_refresh,
                guard: RequestGuard::new(),
                state,
                clock,
            }),
            refresh_timer: Mutex::new(None),
        };

        if options.enabled {
            controller.shared.start(FetchReason::Initial);
        }
        if options.refresh_interval.is_some() {
            controller.set_auto_refresh(options.refresh_interval);
        }
        controller
    }

    // == Reads ==
    pub fn state(&self) -> ControllerState<R::Output> {
        self.shared.state.borrow().clone()
    }

    pub fn data(&self) -> Option<R::Output> {
        self.shared.state.borrow().data.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.shared.state.borrow().loading
    }

    pub fn error(&self) -> Option<SyncError> {
        self.shared.state.borrow().error.clone()
    }

    /// Receiver that observes every state change.
    pub fn subscribe(&self) -> watch::Receiver<ControllerState<R::Output>> {
        self.shared.state.subscribe()
    }

    pub fn params(&self) -> R::Params {
        self.shared.params.lock().clone()
    }

    pub fn is_enabled(&self) -> bool {
        self.shared.enabled.load(Ordering::SeqCst)
    }

    pub fn resource(&self) -> &R {
        &self.shared.resource
    }

    // == Refetch ==
    /// Starts a fetch in the background, superseding any in flight.
    pub fn refetch(&self) {
        self.shared.start(FetchReason::Manual);
    }

    /// Fetches and waits. Returns true if fresh data landed.
    pub async fn refresh(&self) -> bool {
        self.shared.run(FetchReason::Manual).await
    }

    // == Parameters ==
    /// Replaces the parameters and refetches if they changed.
    ///
    /// Returns true if the parameters changed.
    pub fn set_params(&self, params: R::Params) -> bool {
        {
            let mut current = self.shared.params.lock();
            if *current == params {
                return false;
            }
            debug!(resource = self.shared.resource.name(), ?params, "parameters changed");
            *current = params;
        }

        if self.is_enabled() {
            self.shared.start(FetchReason::ParamsChanged);
        } else {
            self.shared.cancel_in_flight();
        }
        true
    }

    pub fn set_enabled(&self, enabled: bool) {
        let was = self.shared.enabled.swap(enabled, Ordering::SeqCst);
        match (was, enabled) {
            (false, true) => self.shared.start(FetchReason::Initial),
            (true, false) => {
                self.shared.cancel_in_flight();
            }
            _ => {}
        }
    }

    // == Auto Refresh ==
    /// Starts, restarts or (with `None`) stops the periodic refresh.
    pub fn set_auto_refresh(&self, interval: Option<Duration>) {
        let mut timer = self.refresh_timer.lock();
        if let Some(old) = timer.take() {
            old.abort();
        }

        let Some(interval) = interval.filter(|i| !i.is_zero()) else {
            return;
        };
        let weak = Arc::downgrade(&self.shared);
        let task = tokio::spawn(async move {
            loop {
                tokio::time::sleep(interval).await;
                let Some(shared) = weak.upgrade() else {
                    break;
                };
                if shared.enabled.load(Ordering::SeqCst) {
                    shared.start(FetchReason::AutoRefresh);
                }
            }
        });
        *timer = Some(task.abort_handle());
    }

    pub fn is_auto_refreshing(&self) -> bool {
        self.refresh_timer.lock().is_some()
    }

    // == Teardown ==
    /// Stops the timer and cancels any in-flight fetch. Idempotent.
    pub fn dispose(&self) {
        if let Some(timer) = self.refresh_timer.lock().take() {
            timer.abort();
        }
        self.shared.enabled.store(false, Ordering::SeqCst);
        self.shared.cancel_in_flight();
    }

    // == Local Mutation ==
    /// Edits the published data in place, for optimistic updates.
    pub(crate) fn update_data(&self, edit: impl FnOnce(&mut Option<R::Output>)) {
        self.shared.state.send_modify(|state| edit(&mut state.data));
    }

    pub(crate) fn set_error(&self, error: Option<SyncError>) {
        self.shared.state.send_modify(|state| state.error = error);
    }

    /// Cancels the in-flight fetch without tearing the controller down.
    ///
    /// Returns true if a fetch was actually cancelled.
    pub(crate) fn cancel_in_flight(&self) -> bool {
        self.shared.cancel_in_flight()
    }
}

impl<R: Resource> Drop for ResourceController<R> {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl<R: Resource> fmt::Debug for ResourceController<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.shared.state.borrow();
        f.debug_struct("ResourceController")
            .field("resource", &self.shared.resource.name())
            .field("params", &*self.shared.params.lock())
            .field("loading", &state.loading)
            .field("has_data", &state.data.is_some())
            .field("error", &state.error)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use std::sync::atomic::AtomicUsize;

    /// Echoes its parameter after a parameter-specific delay.
    struct Echo {
        calls: AtomicUsize,
        fail: AtomicBool,
    }

    impl Echo {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail: AtomicBool::new(false),
            }
        }
    }

    #[async_trait]
    impl Resource for Echo {
        type Params = (String, u64);
        type Output = String;

        fn name(&self) -> &'static str {
            "echo"
        }

        async fn fetch(&self, params: &(String, u64), _reason: FetchReason) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(params.1)).await;
            if self.fail.load(Ordering::SeqCst) {
                return Err(SyncError::Network("connection reset".to_string()));
            }
            Ok(params.0.clone())
        }
    }

    fn mount(param: &str, delay_ms: u64, options: ControllerOptions) -> ResourceController<Echo> {
        ResourceController::new(
            Echo::new(),
            (param.to_string(), delay_ms),
            options,
            Arc::new(ManualClock::new(1_700_000_000_000)),
        )
    }

    async fn settle(ms: u64) {
        tokio::time::sleep(Duration::from_millis(ms)).await;
        tokio::task::yield_now().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_initial_fetch() {
        let controller = mount("A", 10, ControllerOptions::default());
        assert!(controller.is_loading());

        settle(20).await;

        let state = controller.state();
        assert_eq!(state.data.as_deref(), Some("A"));
        assert!(!state.loading);
        assert!(state.error.is_none());
        assert!(state.last_updated.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_disabled_stays_idle() {
        let controller = mount("A", 0, ControllerOptions::default().enabled(false));
        settle(50).await;

        assert_eq!(controller.state(), ControllerState::default());
        assert_eq!(controller.resource().calls.load(Ordering::SeqCst), 0);

        controller.set_enabled(true);
        settle(1).await;
        assert_eq!(controller.data().as_deref(), Some("A"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_latest_params_win_over_slow_earlier_fetch() {
        // A resolves at t=200, B at t=60
        let controller = mount("A", 200, ControllerOptions::default());
        settle(10).await;
        assert!(controller.set_params(("B".to_string(), 50)));

        settle(300).await;

        assert_eq!(controller.data().as_deref(), Some("B"));
        assert!(!controller.is_loading());
    }

    #[tokio::test(start_paused = true)]
    async fn test_same_params_do_not_refetch() {
        let controller = mount("A", 0, ControllerOptions::default());
        settle(1).await;

        assert!(!controller.set_params(("A".to_string(), 0)));
        settle(1).await;
        assert_eq!(controller.resource().calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_keeps_last_good_data() {
        let controller = mount("A", 0, ControllerOptions::default());
        settle(1).await;

        controller.resource().fail.store(true, Ordering::SeqCst);
        assert!(!controller.refresh().await);

        let state = controller.state();
        assert_eq!(state.data.as_deref(), Some("A"));
        assert!(matches!(state.error, Some(SyncError::Network(_))));
        assert!(!state.loading);

        controller.resource().fail.store(false, Ordering::SeqCst);
        assert!(controller.refresh().await);
        assert!(controller.error().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_auto_refresh_marks_stale() {
        let options = ControllerOptions::default()
            .auto_refresh(Duration::from_secs(30))
            .mark_stale(true);
        let controller = mount("A", 100, options);
        settle(200).await;
        assert!(!controller.state().is_stale);

        // Timer fires at 30s; fetch takes 100ms
        settle(30_000 - 200 + 10).await;
        let during = controller.state();
        assert!(during.is_stale);
        assert!(during.loading);
        assert_eq!(during.data.as_deref(), Some("A"));

        settle(100).await;
        assert!(!controller.state().is_stale);
        assert_eq!(controller.resource().calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_auto_refresh_can_be_stopped() {
        let controller = mount("A", 0, ControllerOptions::default().auto_refresh(Duration::from_secs(1)));
        settle(3_500).await;
        let calls = controller.resource().calls.load(Ordering::SeqCst);
        assert_eq!(calls, 4);

        controller.set_auto_refresh(None);
        assert!(!controller.is_auto_refreshing());
        settle(5_000).await;
        assert_eq!(controller.resource().calls.load(Ordering::SeqCst), calls);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dispose_cancels_in_flight_and_timer() {
        let controller = mount("A", 1_000, ControllerOptions::default().auto_refresh(Duration::from_secs(2)));
        settle(10).await;

        controller.dispose();
        assert!(!controller.is_loading());

        settle(10_000).await;
        let state = controller.state();
        assert!(state.data.is_none(), "cancelled result must not land");
        assert_eq!(controller.resource().calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_subscribers_see_transitions() {
        let controller = mount("A", 10, ControllerOptions::default());
        let mut rx = controller.subscribe();
        assert!(rx.borrow_and_update().loading);

        rx.changed().await.unwrap();
        let state = rx.borrow_and_update().clone();
        assert_eq!(state.data.as_deref(), Some("A"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_refresh_clears_loading() {
        let controller = mount("A", 1_000, ControllerOptions::default().enabled(false));

        let timed_out = tokio::time::timeout(Duration::from_millis(10), controller.refresh()).await;
        assert!(timed_out.is_err());

        assert!(!controller.is_loading());
        assert!(!controller.shared.guard.is_outstanding());
        assert!(controller.data().is_none());

        assert!(controller.refresh().await);
        assert_eq!(controller.data().as_deref(), Some("A"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_refresh_leaves_newer_fetch_alone() {
        let controller = mount("A", 1_000, ControllerOptions::default().enabled(false));
        {
            let refresh = controller.refresh();
            tokio::pin!(refresh);
            assert!(tokio::time::timeout(Duration::from_millis(10), &mut refresh).await.is_err());
            // A background refetch supersedes the inline one before it is dropped
            controller.refetch();
        }

        assert!(controller.is_loading());
        settle(1_100).await;
        assert_eq!(controller.data().as_deref(), Some("A"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_manual_refetch_supersedes_running_fetch() {
        let controller = mount("A", 100, ControllerOptions::default());
        settle(50).await;
        controller.refetch();
        settle(60).await;

        // The first fetch would have landed at t=100; only the refetch lands
        assert!(controller.is_loading());
        settle(100).await;
        assert_eq!(controller.data().as_deref(), Some("A"));
        assert_eq!(controller.resource().calls.load(Ordering::SeqCst), 2);
    }
}
