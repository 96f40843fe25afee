pub mod aggregator;
pub mod connectivity;
pub mod provider;
pub mod snapshot;
pub mod source;
pub mod synthetic;
pub mod types;
pub mod upstream;

pub use aggregator::{
    average_wait_time, daily_summary, hourly_histogram, monthly_rollup, periodic_report,
    success_rate, summary_metrics, weekly_rollup,
};
pub use connectivity::{mock_connectivity, ConnectivityGraph, QubitGroup, QubitLink, QubitNode};
pub use provider::{AggregatingProvider, CacheConfig, CachingProvider, SnapshotProvider};
pub use snapshot::{build_snapshot, DashboardSnapshot, DataOrigin};
pub use source::{JobSource, MetricsError, MetricsResult, SourceBatch};
pub use synthetic::SyntheticSource;
pub use types::{
    BackendRecord, BackendSlice, BackendStatus, DailySummary, HourlyBucket, JobRecord, JobStatus,
    Metrics, OperationalMetrics, PeriodBucket, PeriodicReport, StatusCounts, StatusEntry,
};
pub use upstream::UpstreamSource;
