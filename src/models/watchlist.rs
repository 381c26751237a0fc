//! Watchlist models
//!
//! `GET /watchlist`, `POST /watchlist` and `DELETE /watchlist/{symbol}` bodies.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::warn;

use super::Symbol;

/// One watched stock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchlistItem {
    pub symbol: Symbol,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub added_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_recommendation: Option<String>,
}

impl WatchlistItem {
    /// Builds a locally constructed item that has not been scored yet.
    pub fn pending(symbol: Symbol, added_at: DateTime<Utc>, notes: Option<String>) -> Self {
        Self {
            symbol,
            added_at,
            notes,
            latest_score: None,
            latest_recommendation: None,
        }
    }
}

/// Response body of `GET /watchlist`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchlistResponse {
    #[serde(deserialize_with = "deserialize_items")]
    pub watchlist: Vec<WatchlistItem>,
    #[serde(default)]
    pub count: usize,
}

/// Request body of `POST /watchlist`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddWatchlistRequest {
    pub symbol: Symbol,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Acknowledgement returned by watchlist mutations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MutationResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl MutationResponse {
    pub fn ok() -> Self {
        Self {
            success: true,
            message: None,
        }
    }
}

// == Lenient Decoding ==
/// Parses RFC 3339 timestamps, reading zoneless ones as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|naive| naive.and_utc())
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw).ok_or_else(|| de::Error::custom(format!("invalid timestamp {raw:?}")))
}

/// Decodes each item on its own; malformed items are logged and dropped.
fn deserialize_items<'de, D>(deserializer: D) -> Result<Vec<WatchlistItem>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Vec::<Value>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .filter_map(|value| match serde_json::from_value::<WatchlistItem>(value) {
            Ok(item) => Some(item),
            Err(err) => {
                warn!(error = %err, "skipping malformed watchlist item");
                None
            }
        })
        .collect())
}
