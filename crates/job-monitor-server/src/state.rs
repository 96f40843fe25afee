use job_metrics::MetricsError;

use crate::config::ServerConfig;
use crate::dashboard_service::DashboardService;

pub struct AppState {
    pub dashboard: DashboardService,
}

impl AppState {
    pub fn new(dashboard: DashboardService) -> Self {
        Self { dashboard }
    }

    pub fn from_config(config: &ServerConfig) -> Result<Self, MetricsError> {
        log::info!(
            "Initializing dashboard state (cache ttl {:?}, {} synthetic jobs, offset {})",
            config.cache.ttl,
            config.synthetic_jobs,
            config.utc_offset
        );
        Ok(Self::new(DashboardService::from_config(config)?))
    }
}
