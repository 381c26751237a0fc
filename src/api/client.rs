//! Analysis service seam
//!
//! Controllers talk to the remote service only through this trait so tests
//! can substitute a scripted implementation.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{
    MutationResponse, SectorStatsResponse, StockHistory, Symbol, SystemMetrics,
    WatchlistResponse,
};

/// Remote operations consumed by the synchronization layer.
///
/// Cancellation is expressed by dropping the returned future: every fetch
/// runs inside its own task and the controller aborts that task.
#[async_trait]
pub trait AnalysisApi: Send + Sync + 'static {
    async fn get_watchlist(&self) -> Result<WatchlistResponse>;

    async fn add_to_watchlist(
        &self,
        symbol: &Symbol,
        notes: Option<&str>,
    ) -> Result<MutationResponse>;

    async fn remove_from_watchlist(&self, symbol: &Symbol) -> Result<MutationResponse>;

    async fn get_sector_stats(&self, days: u32) -> Result<SectorStatsResponse>;

    async fn get_stock_history(
        &self,
        symbol: &Symbol,
        days: u32,
        include_price: bool,
    ) -> Result<StockHistory>;

    async fn get_system_metrics(&self) -> Result<SystemMetrics>;
}

/// Shared, type-erased API handle.
pub type SharedApi = Arc<dyn AnalysisApi>;
