use async_trait::async_trait;
use thiserror::Error;

use crate::types::{BackendRecord, JobRecord, OperationalMetrics};

pub type MetricsResult<T> = Result<T, MetricsError>;

#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{endpoint} returned {status}")]
    Upstream { endpoint: String, status: u16 },

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid job status: {0}")]
    InvalidStatus(String),

    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("job source unavailable: {0}")]
    SourceUnavailable(String),
}

/// One fetch worth of telemetry, ready for aggregation.
#[derive(Debug, Clone, Default)]
pub struct SourceBatch {
    pub jobs: Vec<JobRecord>,
    pub backends: Vec<BackendRecord>,
    pub operational: OperationalMetrics,
}

#[async_trait]
pub trait JobSource: Send + Sync {
    async fn fetch(&self) -> MetricsResult<SourceBatch>;
}
