//! API Module
//!
//! Client side of the analysis service REST API.
//!
//! # Endpoints
//! - `GET /watchlist` - Canonical watchlist
//! - `POST /watchlist` - Add a symbol
//! - `DELETE /watchlist/{symbol}` - Remove a symbol
//! - `GET /analytics/sectors?days=N` - Sector statistics
//! - `GET /history/stock/{symbol}?days=N&include_price=bool` - History series
//! - `GET /analytics/system` - System metrics

pub mod client;
pub mod http;

#[cfg(test)]
pub(crate) mod mock;

pub use client::{AnalysisApi, SharedApi};
pub use http::HttpApi;
