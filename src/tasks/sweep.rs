//! History Cache Sweep Task
//!
//! Reads already evict stale entries lazily; this task bounds memory for
//! series that are cached and then never read again.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::store::AppStore;

/// Spawns a task that evicts history series older than `max_age` every
/// `interval`.
///
/// # Returns
/// A JoinHandle to abort during shutdown.
///
/// # Example
/// ```ignore
/// let handle = spawn_cache_sweep_task(store.clone(), Duration::from_secs(60), HISTORY_MAX_AGE);
/// // Later, during shutdown:
/// handle.abort();
/// ```
pub fn spawn_cache_sweep_task(
    store: AppStore,
    interval: Duration,
    max_age: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(
            "Starting history cache sweep with interval of {:?}",
            interval
        );

        loop {
            tokio::time::sleep(interval).await;

            let removed = store.sweep_stale_history(max_age);
            if removed > 0 {
                info!("History sweep: removed {} stale series", removed);
            } else {
                debug!("History sweep: nothing stale");
            }
        }
    })
}
