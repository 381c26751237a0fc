//! Scripted in-memory `AnalysisApi` for unit tests.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use parking_lot::Mutex;
use serde_json::{json, Map};

use crate::api::AnalysisApi;
use crate::error::{Result, SyncError};
use crate::models::{
    MutationResponse, SectorStat, SectorStatsResponse, StockHistory, Symbol, SystemMetrics,
    WatchlistItem, WatchlistResponse,
};

#[derive(Default)]
pub struct MockApi {
    /// Server-side watchlist
    pub watchlist: Mutex<Vec<WatchlistItem>>,
    pub watchlist_error: Mutex<Option<SyncError>>,
    pub add_error: Mutex<Option<SyncError>>,
    pub remove_error: Mutex<Option<SyncError>>,
    /// Score the server assigns to newly added symbols
    pub score_on_add: Mutex<Option<f64>>,
    pub mutation_delay: Mutex<Duration>,
    pub sectors: Mutex<Vec<SectorStat>>,
    pub sector_delays: Mutex<HashMap<u32, Duration>>,
    pub sector_error: Mutex<Option<SyncError>>,
    pub history_delay: Mutex<Duration>,
    pub history_error: Mutex<Option<SyncError>>,
    pub calls: Mutex<HashMap<&'static str, usize>>,
}

impl MockApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self, endpoint: &'static str) -> usize {
        self.calls.lock().get(endpoint).copied().unwrap_or(0)
    }

    pub fn with_watchlist(self, symbols: &[&str]) -> Self {
        *self.watchlist.lock() = symbols.iter().map(|s| item(s, Some(50.0))).collect();
        self
    }

    pub fn with_sectors(self, sectors: &[(&str, f64)]) -> Self {
        *self.sectors.lock() = sectors
            .iter()
            .map(|(name, score)| SectorStat {
                sector: name.to_string(),
                avg_score: *score,
                stock_count: 10,
                extra: Map::new(),
            })
            .collect();
        self
    }

    fn record(&self, endpoint: &'static str) {
        *self.calls.lock().entry(endpoint).or_insert(0) += 1;
    }
}

pub fn item(symbol: &str, score: Option<f64>) -> WatchlistItem {
    WatchlistItem {
        symbol: Symbol::parse(symbol).unwrap(),
        added_at: Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap(),
        notes: None,
        latest_score: score,
        latest_recommendation: score.map(|_| "HOLD".to_string()),
    }
}

async fn pause(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

#[async_trait]
impl AnalysisApi for MockApi {
    async fn get_watchlist(&self) -> Result<WatchlistResponse> {
        self.record("get_watchlist");
        if let Some(err) = self.watchlist_error.lock().clone() {
            return Err(err);
        }
        let watchlist = self.watchlist.lock().clone();
        Ok(WatchlistResponse {
            count: watchlist.len(),
            watchlist,
        })
    }

    async fn add_to_watchlist(
        &self,
        symbol: &Symbol,
        notes: Option<&str>,
    ) -> Result<MutationResponse> {
        self.record("add_to_watchlist");
        let delay = *self.mutation_delay.lock();
        pause(delay).await;
        if let Some(err) = self.add_error.lock().clone() {
            return Err(err);
        }
        let mut server = item(symbol.as_str(), *self.score_on_add.lock());
        server.notes = notes.map(str::to_string);
        self.watchlist.lock().push(server);
        Ok(MutationResponse::ok())
    }

    async fn remove_from_watchlist(&self, symbol: &Symbol) -> Result<MutationResponse> {
        self.record("remove_from_watchlist");
        let delay = *self.mutation_delay.lock();
        pause(delay).await;
        if let Some(err) = self.remove_error.lock().clone() {
            return Err(err);
        }
        self.watchlist.lock().retain(|i| &i.symbol != symbol);
        Ok(MutationResponse::ok())
    }

    async fn get_sector_stats(&self, days: u32) -> Result<SectorStatsResponse> {
        self.record("get_sector_stats");
        let delay = self
            .sector_delays
            .lock()
            .get(&days)
            .copied()
            .unwrap_or_default();
        pause(delay).await;
        if let Some(err) = self.sector_error.lock().clone() {
            return Err(err);
        }
        let sectors = self.sectors.lock().clone();
        Ok(SectorStatsResponse {
            total_sectors: sectors.len(),
            sectors,
            timestamp: Some(format!("days={days}")),
        })
    }

    async fn get_stock_history(
        &self,
        symbol: &Symbol,
        days: u32,
        include_price: bool,
    ) -> Result<StockHistory> {
        self.record("get_stock_history");
        let delay = *self.history_delay.lock();
        pause(delay).await;
        if let Some(err) = self.history_error.lock().clone() {
            return Err(err);
        }
        Ok(StockHistory {
            symbol: symbol.to_string(),
            history: (0..days.min(3))
                .map(|day| json!({ "day": day, "price": include_price }))
                .collect(),
            trend: Some(json!({ "direction": "up" })),
            statistics: None,
        })
    }

    async fn get_system_metrics(&self) -> Result<SystemMetrics> {
        self.record("get_system_metrics");
        let count = self.calls("get_system_metrics");
        let mut fields = Map::new();
        fields.insert("poll".to_string(), json!(count));
        Ok(SystemMetrics { fields })
    }
}
