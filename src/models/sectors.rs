//! Sector statistics models
//!
//! `GET /analytics/sectors?days=N` response body.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Aggregated statistics for one sector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectorStat {
    pub sector: String,
    #[serde(default)]
    pub avg_score: f64,
    #[serde(default)]
    pub stock_count: u32,
    /// Fields the layer passes through untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectorStatsResponse {
    pub sectors: Vec<SectorStat>,
    #[serde(default)]
    pub total_sectors: usize,
    #[serde(default)]
    pub timestamp: Option<String>,
}
