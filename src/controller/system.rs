//! System Metrics Controller
//!
//! `GET /analytics/system`, usually polled with staleness marking.

use async_trait::async_trait;

use crate::api::SharedApi;
use crate::controller::resource::{ControllerOptions, FetchReason, Resource, ResourceController};
use crate::controller::SyncContext;
use crate::error::Result;
use crate::models::SystemMetrics;

pub struct SystemMetricsResource {
    api: SharedApi,
}

#[async_trait]
impl Resource for SystemMetricsResource {
    type Params = ();
    type Output = SystemMetrics;

    fn name(&self) -> &'static str {
        "system_metrics"
    }

    async fn fetch(&self, _params: &(), _reason: FetchReason) -> Result<SystemMetrics> {
        self.api.get_system_metrics().await
    }
}

pub type SystemMetricsController = ResourceController<SystemMetricsResource>;

impl ResourceController<SystemMetricsResource> {
    pub fn mount(ctx: &SyncContext, options: ControllerOptions) -> Self {
        let resource = SystemMetricsResource {
            api: ctx.api.clone(),
        };
        Self::new(resource, (), options, ctx.store.clock())
    }

    pub fn metric(&self, name: &str) -> Option<serde_json::Value> {
        self.data().and_then(|metrics| metrics.get(name).cloned())
    }
}
