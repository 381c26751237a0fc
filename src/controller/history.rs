//! Stock History Controller
//!
//! `GET /history/stock/{symbol}`, read through the store's history cache.
//! Automatic fetches serve a cached series while it is fresh; a manual
//! refetch always goes to the service and refreshes the cache.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::api::SharedApi;
use crate::controller::resource::{ControllerOptions, FetchReason, Resource, ResourceController};
use crate::controller::SyncContext;
use crate::error::{Result, SyncError};
use crate::models::{StockHistory, Symbol};
use crate::store::AppStore;

/// Default lookback window in days.
pub const DEFAULT_HISTORY_DAYS: u32 = 30;

// == Parameters ==
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryParams {
    /// No symbol means nothing to load
    pub symbol: Option<Symbol>,
    pub days: u32,
    pub include_price: bool,
}

impl HistoryParams {
    pub fn new(symbol: &str, days: u32, include_price: bool) -> Result<Self> {
        Ok(Self {
            symbol: Some(Symbol::parse(symbol)?),
            days,
            include_price,
        })
    }

    pub fn empty() -> Self {
        Self {
            symbol: None,
            days: DEFAULT_HISTORY_DAYS,
            include_price: false,
        }
    }

    /// Cache key for this parameter tuple.
    pub fn cache_key(&self) -> Option<String> {
        self.symbol
            .as_ref()
            .map(|symbol| format!("{symbol}:{}:{}", self.days, self.include_price))
    }
}

// == Resource ==
pub struct StockHistoryResource {
    api: SharedApi,
    store: AppStore,
    max_age: Duration,
}

#[async_trait]
impl Resource for StockHistoryResource {
    type Params = HistoryParams;
    type Output = StockHistory;

    fn name(&self) -> &'static str {
        "stock_history"
    }

    async fn fetch(&self, params: &HistoryParams, reason: FetchReason) -> Result<StockHistory> {
        let (Some(symbol), Some(key)) = (&params.symbol, params.cache_key()) else {
            return Err(SyncError::InvalidSymbol(String::new()));
        };

        if reason != FetchReason::Manual {
            if let Some(cached) = self.store.get_historical_data(&key, self.max_age) {
                debug!(%key, "history served from cache");
                return Ok(cached);
            }
        }

        let history = self
            .api
            .get_stock_history(symbol, params.days, params.include_price)
            .await?;
        self.store.cache_historical_data(&key, history.clone());
        Ok(history)
    }
}

pub type StockHistoryController = ResourceController<StockHistoryResource>;

impl ResourceController<StockHistoryResource> {
    /// Mounts the controller. Without a symbol it stays idle.
    pub fn mount(ctx: &SyncContext, params: HistoryParams, options: ControllerOptions) -> Self {
        let options = ControllerOptions {
            enabled: options.enabled && params.symbol.is_some(),
            ..options
        };
        let resource = StockHistoryResource {
            api: ctx.api.clone(),
            store: ctx.store.clone(),
            max_age: ctx.history_max_age,
        };
        Self::new(resource, params, options, ctx.store.clock())
    }

    /// Switches to another symbol; an empty string clears it and idles.
    ///
    /// Returns true if the parameters changed.
    pub fn set_symbol(&self, raw: &str) -> Result<bool> {
        let symbol = if raw.trim().is_empty() {
            None
        } else {
            Some(Symbol::parse(raw)?)
        };
        let has_symbol = symbol.is_some();
        let params = HistoryParams {
            symbol,
            ..self.params()
        };

        if !has_symbol {
            self.set_enabled(false);
            return Ok(self.set_params(params));
        }
        if self.is_enabled() {
            Ok(self.set_params(params))
        } else {
            let changed = self.set_params(params);
            self.set_enabled(true);
            Ok(changed)
        }
    }

    pub fn set_days(&self, days: u32) -> bool {
        self.set_params(HistoryParams {
            days,
            ..self.params()
        })
    }

    pub fn set_include_price(&self, include_price: bool) -> bool {
        self.set_params(HistoryParams {
            include_price,
            ..self.params()
        })
    }
}
