//! Stock history models
//!
//! `GET /history/stock/{symbol}` response body. Series points, trend and
//! statistics are computed remotely and kept opaque.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockHistory {
    pub symbol: String,
    #[serde(default)]
    pub history: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trend: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statistics: Option<Value>,
}

impl StockHistory {
    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_minimal_body() {
        let history: StockHistory = serde_json::from_str(r#"{"symbol": "TCS"}"#).unwrap();
        assert!(history.is_empty());
        assert!(history.trend.is_none());
    }

    #[test]
    fn test_history_keeps_payloads_opaque() {
        let json = r#"{
            "symbol": "TCS",
            "history": [{"date": "2024-03-01", "score": 70.1}, {"date": "2024-03-02", "score": 71.0}],
            "trend": {"direction": "up"},
            "statistics": {"avg_score": 70.55}
        }"#;
        let history: StockHistory = serde_json::from_str(json).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history.trend.unwrap()["direction"], "up");
    }
}
