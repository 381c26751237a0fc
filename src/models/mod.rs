//! Data models for the analysis service
//!
//! Canonical symbols plus the JSON shapes consumed from and sent to the
//! remote service. Payloads the layer never interprets stay as raw JSON.

pub mod history;
pub mod sectors;
pub mod symbol;
pub mod system;
pub mod watchlist;

// Re-export commonly used types
pub use history::StockHistory;
pub use sectors::{SectorStat, SectorStatsResponse};
pub use symbol::Symbol;
pub use system::SystemMetrics;
pub use watchlist::{AddWatchlistRequest, MutationResponse, WatchlistItem, WatchlistResponse};
