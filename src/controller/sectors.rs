//! Sector Statistics Controller
//!
//! `GET /analytics/sectors?days=N`, refetched whenever the window changes.

use async_trait::async_trait;

use crate::api::SharedApi;
use crate::controller::resource::{ControllerOptions, FetchReason, Resource, ResourceController};
use crate::controller::SyncContext;
use crate::error::Result;
use crate::models::{SectorStat, SectorStatsResponse};

pub struct SectorStatsResource {
    api: SharedApi,
}

#[async_trait]
impl Resource for SectorStatsResource {
    /// Lookback window in days
    type Params = u32;
    type Output = SectorStatsResponse;

    fn name(&self) -> &'static str {
        "sector_stats"
    }

    async fn fetch(&self, days: &u32, _reason: FetchReason) -> Result<SectorStatsResponse> {
        self.api.get_sector_stats(*days).await
    }
}

pub type SectorStatsController = ResourceController<SectorStatsResource>;

impl ResourceController<SectorStatsResource> {
    pub fn mount(ctx: &SyncContext, days: u32, options: ControllerOptions) -> Self {
        let resource = SectorStatsResource {
            api: ctx.api.clone(),
        };
        Self::new(resource, days, options, ctx.store.clock())
    }

    pub fn set_days(&self, days: u32) -> bool {
        self.set_params(days)
    }

    pub fn sectors(&self) -> Vec<SectorStat> {
        self.data().map(|response| response.sectors).unwrap_or_default()
    }

    /// Case-insensitive lookup by sector name.
    pub fn get_sector_by_name(&self, name: &str) -> Option<SectorStat> {
        let name = name.trim();
        self.sectors()
            .into_iter()
            .find(|sector| sector.sector.eq_ignore_ascii_case(name))
    }

    /// The `n` sectors with the highest average score, best first.
    pub fn get_top_sectors(&self, n: usize) -> Vec<SectorStat> {
        let mut sectors = self.sectors();
        sectors.sort_by(|a, b| b.avg_score.total_cmp(&a.avg_score));
        sectors.truncate(n);
        sectors
    }
}
