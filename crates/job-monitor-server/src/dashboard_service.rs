use std::sync::Arc;

use job_metrics::{
    mock_connectivity, AggregatingProvider, CachingProvider, ConnectivityGraph, DashboardSnapshot,
    DataOrigin, MetricsError, SnapshotProvider, SyntheticSource, UpstreamSource,
};
use log::{error, info, warn};

use crate::config::ServerConfig;

/// Chooses between live and demo data and applies the fallback policy.
#[derive(Clone)]
pub struct DashboardService {
    live: Option<Arc<dyn SnapshotProvider>>,
    demo: Arc<dyn SnapshotProvider>,
}

impl DashboardService {
    pub fn new(live: Option<Arc<dyn SnapshotProvider>>, demo: Arc<dyn SnapshotProvider>) -> Self {
        Self { live, demo }
    }

    pub fn from_config(config: &ServerConfig) -> Result<Self, MetricsError> {
        let live: Option<Arc<dyn SnapshotProvider>> = match &config.upstream_url {
            Some(url) => {
                info!("Live job data from {}", url);
                let source = UpstreamSource::new(url.as_str(), config.job_limit)?;
                Some(Arc::new(AggregatingProvider::new(
                    source,
                    config.utc_offset,
                    DataOrigin::Live,
                )))
            }
            None => {
                warn!("No upstream job tracker configured, live requests will use mock data");
                None
            }
        };

        let demo = CachingProvider::new(
            AggregatingProvider::new(
                SyntheticSource::new(config.synthetic_jobs),
                config.utc_offset,
                DataOrigin::Synthetic,
            ),
            config.cache,
        );

        Ok(Self::new(live, Arc::new(demo)))
    }

    pub async fn dashboard(&self, demo: bool, force: bool) -> Result<DashboardSnapshot, MetricsError> {
        if demo {
            warn!("Using mock data (demo mode)");
            return self.demo.snapshot(force).await;
        }

        let Some(live) = &self.live else {
            return self.fallback("no upstream job tracker configured").await;
        };

        info!("Fetching live job data");
        match live.snapshot(force).await {
            Ok(snapshot) => Ok(snapshot),
            Err(err) => {
                error!("Error fetching live job data: {}", err);
                self.fallback(&err.to_string()).await
            }
        }
    }

    pub fn connectivity(&self, backend: &str) -> ConnectivityGraph {
        info!("Generating mock connectivity for {}", backend);
        mock_connectivity(backend)
    }

    async fn fallback(&self, reason: &str) -> Result<DashboardSnapshot, MetricsError> {
        let snapshot = self.demo.snapshot(false).await?;
        Ok(snapshot.with_note(format!(
            "Could not connect to the real backend: {reason}. Displaying mock data instead."
        )))
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use chrono::Utc;
    use job_metrics::{build_snapshot, MetricsResult, SourceBatch};

    use super::*;

    struct FixedProvider(DataOrigin);

    #[async_trait]
    impl SnapshotProvider for FixedProvider {
        async fn snapshot(&self, _force: bool) -> MetricsResult<DashboardSnapshot> {
            Ok(build_snapshot(SourceBatch::default(), Utc::now(), &Utc, self.0))
        }
    }

    struct FailingProvider;

    #[async_trait]
    impl SnapshotProvider for FailingProvider {
        async fn snapshot(&self, _force: bool) -> MetricsResult<DashboardSnapshot> {
            Err(MetricsError::Upstream {
                endpoint: "/api/jobs".to_string(),
                status: 503,
            })
        }
    }

    fn demo() -> Arc<dyn SnapshotProvider> {
        Arc::new(FixedProvider(DataOrigin::Synthetic))
    }

    #[tokio::test]
    async fn demo_requests_never_touch_live_provider() {
        let service = DashboardService::new(Some(Arc::new(FailingProvider)), demo());
        let snapshot = service.dashboard(true, false).await.unwrap();
        assert_eq!(snapshot.source, "mock");
        assert!(snapshot.note.is_none());
    }

    #[tokio::test]
    async fn live_success_is_labelled_real() {
        let service =
            DashboardService::new(Some(Arc::new(FixedProvider(DataOrigin::Live))), demo());
        let snapshot = service.dashboard(false, false).await.unwrap();
        assert_eq!(snapshot.source, "real");
        assert!(snapshot.note.is_none());
    }

    #[tokio::test]
    async fn live_failure_falls_back_with_note() {
        let service = DashboardService::new(Some(Arc::new(FailingProvider)), demo());
        let snapshot = service.dashboard(false, false).await.unwrap();
        assert_eq!(snapshot.source, "mock");
        let note = snapshot.note.unwrap();
        assert!(note.starts_with("Could not connect to the real backend: "));
        assert!(note.contains("503"));
        assert!(note.ends_with("Displaying mock data instead."));
    }

    #[tokio::test]
    async fn missing_upstream_falls_back_with_note() {
        let service = DashboardService::new(None, demo());
        let snapshot = service.dashboard(false, false).await.unwrap();
        assert!(snapshot
            .note
            .unwrap()
            .contains("no upstream job tracker configured"));
    }

    #[test]
    fn from_config_without_upstream_has_no_live_provider() {
        let service = DashboardService::from_config(&ServerConfig::default()).unwrap();
        assert!(service.live.is_none());
    }

    #[test]
    fn connectivity_sizes_graph_by_backend() {
        let service = DashboardService::new(None, demo());
        assert_eq!(service.connectivity("ibm_kyoto").nodes.len(), 127);
    }
}
