use std::fmt::Display;

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::aggregator::{daily_summary, hourly_histogram, periodic_report, summary_metrics};
use crate::source::SourceBatch;
use crate::types::{
    BackendRecord, DailySummary, HourlyBucket, JobRecord, Metrics, PeriodicReport,
};

/// Where the jobs behind a snapshot came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DataOrigin {
    #[default]
    Live,
    Synthetic,
}

impl DataOrigin {
    pub fn label(self, cached: bool) -> &'static str {
        match (self, cached) {
            (Self::Live, _) => "real",
            (Self::Synthetic, false) => "mock",
            (Self::Synthetic, true) => "mock (cached)",
        }
    }
}

/// Everything the dashboard renders, computed from a single batch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    pub jobs: Vec<JobRecord>,
    pub backends: Vec<BackendRecord>,
    pub metrics: Metrics,
    pub chart_data: Vec<HourlyBucket>,
    pub daily_summary: DailySummary,
    pub periodic_report_data: PeriodicReport,
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub generated_at: DateTime<Utc>,
    #[serde(skip)]
    pub origin: DataOrigin,
}

impl DashboardSnapshot {
    /// Relabels a snapshot that is being served again from a cache.
    pub fn mark_cached(&mut self) {
        self.source = self.origin.label(true).to_string();
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

/// Runs every report over `batch` as seen at `now` from the `tz` calendar.
///
/// Jobs come back sorted newest submission first; the reports themselves do
/// not depend on input order apart from the daily palette assignment, which
/// therefore follows that sorted order.
pub fn build_snapshot<Tz>(
    batch: SourceBatch,
    now: DateTime<Utc>,
    tz: &Tz,
    origin: DataOrigin,
) -> DashboardSnapshot
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let SourceBatch {
        mut jobs,
        backends,
        operational,
    } = batch;
    jobs.sort_by(|a, b| b.submitted.cmp(&a.submitted));

    let today = now.with_timezone(tz).date_naive();

    DashboardSnapshot {
        metrics: summary_metrics(&jobs, now, operational),
        chart_data: hourly_histogram(&jobs, now, tz),
        daily_summary: daily_summary(&jobs, today, tz),
        periodic_report_data: periodic_report(&jobs, now, tz),
        jobs,
        backends,
        source: origin.label(false).to_string(),
        note: None,
        generated_at: now,
        origin,
    }
}
