use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::source::MetricsError;

/// Number of distinct chart colors a daily summary cycles through.
pub const PALETTE_SIZE: usize = 5;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    Queued,
    Running,
    Completed,
    Error,
    Cancelled,
}

impl JobStatus {
    /// Statuses tracked by the weekly, monthly and hourly rollups.
    pub const TRACKED: [JobStatus; 4] = [
        JobStatus::Completed,
        JobStatus::Running,
        JobStatus::Queued,
        JobStatus::Error,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Queued => "QUEUED",
            Self::Running => "RUNNING",
            Self::Completed => "COMPLETED",
            Self::Error => "ERROR",
            Self::Cancelled => "CANCELLED",
        }
    }

    pub fn is_live(self) -> bool {
        matches!(self, Self::Queued | Self::Running)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses the status spellings used by the upstream tracker.
///
/// Matching is case-insensitive. The runtime reports finished jobs as `DONE`
/// and uses the American `CANCELED`; pre-queue states count as queued.
impl FromStr for JobStatus {
    type Err = MetricsError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().rsplit('.').next().unwrap_or("").to_ascii_uppercase();
        match normalized.as_str() {
            "QUEUED" | "INITIALIZING" | "VALIDATING" => Ok(Self::Queued),
            "RUNNING" => Ok(Self::Running),
            "COMPLETED" | "DONE" => Ok(Self::Completed),
            "ERROR" => Ok(Self::Error),
            "CANCELLED" | "CANCELED" => Ok(Self::Cancelled),
            _ => Err(MetricsError::InvalidStatus(value.to_string())),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StatusEntry {
    pub status: JobStatus,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JobRecord {
    pub id: String,
    pub status: JobStatus,
    pub backend: String,
    pub submitted: DateTime<Utc>,
    /// Seconds spent executing; zero until the job starts running.
    pub elapsed_time: f64,
    pub status_history: Vec<StatusEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(default)]
    pub qpu_seconds: f64,
}

impl JobRecord {
    /// First recorded transition into `status`, if any.
    pub fn first_transition(&self, status: JobStatus) -> Option<DateTime<Utc>> {
        self.status_history
            .iter()
            .find(|entry| entry.status == status)
            .map(|entry| entry.timestamp)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BackendStatus {
    Active,
    Inactive,
    Maintenance,
}

impl BackendStatus {
    /// Anything the upstream reports that is not active or under maintenance
    /// is shown as inactive.
    pub fn from_upstream(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "active" => Self::Active,
            "maintenance" => Self::Maintenance,
            _ => Self::Inactive,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BackendRecord {
    pub name: String,
    pub status: BackendStatus,
    pub qubit_count: u32,
    pub queue_depth: u32,
    pub error_rate: f64,
}

/// Per-status counts for one rollup bucket. CANCELLED is never counted.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusCounts {
    #[serde(rename = "COMPLETED")]
    pub completed: u32,
    #[serde(rename = "RUNNING")]
    pub running: u32,
    #[serde(rename = "QUEUED")]
    pub queued: u32,
    #[serde(rename = "ERROR")]
    pub error: u32,
}

impl StatusCounts {
    pub fn record(&mut self, status: JobStatus) {
        match status {
            JobStatus::Completed => self.completed += 1,
            JobStatus::Running => self.running += 1,
            JobStatus::Queued => self.queued += 1,
            JobStatus::Error => self.error += 1,
            JobStatus::Cancelled => {}
        }
    }

    pub fn get(&self, status: JobStatus) -> u32 {
        match status {
            JobStatus::Completed => self.completed,
            JobStatus::Running => self.running,
            JobStatus::Queued => self.queued,
            JobStatus::Error => self.error,
            JobStatus::Cancelled => 0,
        }
    }

    pub fn total(&self) -> u32 {
        JobStatus::TRACKED
            .iter()
            .map(|status| self.get(*status))
            .sum()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BackendSlice {
    pub name: String,
    pub value: u32,
    /// Chart CSS color, e.g. `hsl(var(--chart-1))`.
    pub fill: String,
    #[serde(skip)]
    pub palette_slot: usize,
}

impl BackendSlice {
    pub fn new(name: String, value: u32, position: usize) -> Self {
        let palette_slot = position % PALETTE_SIZE;
        Self {
            name,
            value,
            fill: format!("hsl(var(--chart-{}))", palette_slot + 1),
            palette_slot,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DailySummary {
    /// Start of the summarized day in the observer's calendar.
    pub date: DateTime<Utc>,
    pub total_completed: u32,
    pub completed_by_backend: Vec<BackendSlice>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PeriodBucket {
    #[serde(rename = "date")]
    pub label: String,
    pub start: DateTime<Utc>,
    /// Last instant covered by the bucket (inclusive).
    pub end: DateTime<Utc>,
    #[serde(flatten)]
    pub counts: StatusCounts,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PeriodicReport {
    pub weekly: Vec<PeriodBucket>,
    pub monthly: Vec<PeriodBucket>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HourlyBucket {
    /// Bucket start as `HH:MM`.
    pub time: String,
    pub start: DateTime<Utc>,
    #[serde(flatten)]
    pub counts: StatusCounts,
}

/// Figures the aggregator passes through untouched.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct OperationalMetrics {
    pub open_sessions: u32,
    /// Round-trip latency of the data fetch in milliseconds.
    pub api_speed_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Metrics {
    pub total_jobs: u64,
    pub live_jobs: u64,
    #[serde(rename = "avg_wait_time")]
    pub avg_wait_time_seconds: f64,
    #[serde(rename = "success_rate")]
    pub success_rate_percent: f64,
    pub open_sessions: u32,
    #[serde(rename = "api_speed")]
    pub api_speed_ms: u64,
}
