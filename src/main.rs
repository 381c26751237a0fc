//! Stock Sync - headless client for the stock-analysis service
//!
//! Mounts the sector, system metrics and watchlist controllers against a live
//! service and logs every state change until interrupted.

use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tokio::sync::watch;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use stock_sync::controller::{
    ControllerState, SectorStatsController, SystemMetricsController, WatchlistController,
};
use stock_sync::{spawn_cache_sweep_task, AppStore, Config, ControllerOptions, HttpApi, SyncContext};

/// Main entry point.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Create the HTTP client and the store
/// 4. Start the background cache sweep
/// 5. Mount controllers and log their updates
/// 6. Tear everything down on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stock_sync=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Stock Sync client");

    let config = Config::from_env();
    info!(
        "Configuration loaded: api={}, history_ttl={}s, sector_refresh={}s, system_refresh={}s",
        config.api_base_url,
        config.history_cache_ttl,
        config.sector_refresh_interval,
        config.system_refresh_interval
    );

    let api = HttpApi::from_config(&config).context("failed to build HTTP client")?;
    let store = AppStore::from_config(&config);
    let ctx = SyncContext::from_config(Arc::new(api), store.clone(), &config);

    let sweep_handle =
        spawn_cache_sweep_task(store.clone(), config.cache_sweep(), config.history_max_age());
    info!("Background cache sweep started");

    let sectors = SectorStatsController::mount(
        &ctx,
        config.sector_lookback_days,
        ControllerOptions::default()
            .auto_refresh(config.sector_refresh())
            .mark_stale(true),
    );
    let system = SystemMetricsController::mount(
        &ctx,
        ControllerOptions::default()
            .auto_refresh(config.system_refresh())
            .mark_stale(true),
    );
    let watchlist = WatchlistController::mount(&ctx, ControllerOptions::default())
        .with_notifications(store.notifications().clone());

    let mut sector_rx = sectors.subscribe();
    let mut system_rx = system.subscribe();
    let mut watchlist_rx = watchlist.subscribe();

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            Ok(()) = sector_rx.changed() => {
                log_state("sectors", &sector_rx, |data| {
                    let top: Vec<String> = sectors
                        .get_top_sectors(3)
                        .into_iter()
                        .map(|s| format!("{} ({:.1})", s.sector, s.avg_score))
                        .collect();
                    format!("{} sectors, top: {}", data.total_sectors, top.join(", "))
                });
            }
            Ok(()) = system_rx.changed() => {
                log_state("system", &system_rx, |data| format!("{} metrics", data.fields.len()));
            }
            Ok(()) = watchlist_rx.changed() => {
                log_state("watchlist", &watchlist_rx, |data| format!("{} symbols", data.len()));
            }
        }
    }

    watchlist.dispose();
    system.dispose();
    sectors.dispose();
    sweep_handle.abort();
    warn!("Cache sweep aborted");

    info!("Shutdown complete");
    Ok(())
}

fn log_state<T: Clone>(
    name: &str,
    rx: &watch::Receiver<ControllerState<T>>,
    summarize: impl FnOnce(&T) -> String,
) {
    // Summaries may read the controller again, so release the borrow first
    let state = rx.borrow().clone();
    if state.loading {
        return;
    }
    match (&state.error, &state.data) {
        (Some(err), _) => warn!(resource = name, error = %err, stale = state.is_stale, "update failed"),
        (None, Some(data)) => info!(resource = name, "{}", summarize(data)),
        (None, None) => {}
    }
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                warn!("Failed to install SIGTERM handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }
}
