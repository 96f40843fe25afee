//! Live telemetry from the upstream job tracker.
//!
//! The tracker exposes `/api/backends`, `/api/jobs` and `/api/metrics`. Its
//! records are loosely typed (status spellings vary, timestamps come in two
//! shapes, history entries may be partial) so they are decoded into raw
//! structs first and normalised into [`JobRecord`]s here. Records that cannot
//! be normalised are dropped with a warning instead of failing the fetch.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::source::{JobSource, MetricsError, MetricsResult, SourceBatch};
use crate::types::{
    BackendRecord, BackendStatus, JobRecord, JobStatus, OperationalMetrics, StatusEntry,
};

pub const DEFAULT_UPSTREAM_URL: &str = "http://localhost:8000";
pub const DEFAULT_JOB_LIMIT: u32 = 5000;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const NAIVE_TIMESTAMP_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
];

#[derive(Debug, Deserialize)]
struct RawBackend {
    name: String,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    qubit_count: Option<u32>,
    #[serde(default, alias = "pending_jobs")]
    queue_depth: Option<u32>,
    #[serde(default)]
    error_rate: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawJob {
    #[serde(default, alias = "job_id")]
    id: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    backend: Option<String>,
    #[serde(default)]
    submitted: Option<String>,
    #[serde(default)]
    elapsed_time: Option<f64>,
    #[serde(default)]
    user: Option<String>,
    #[serde(default)]
    qpu_seconds: Option<f64>,
    #[serde(default)]
    status_history: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct RawStatusEntry {
    status: String,
    #[serde(alias = "datetime")]
    timestamp: String,
}

#[derive(Debug, Default, Deserialize)]
struct RawMetrics {
    #[serde(default)]
    open_sessions: Option<u32>,
}

pub struct UpstreamSource {
    client: reqwest::Client,
    base_url: String,
    job_limit: u32,
}

impl UpstreamSource {
    pub fn new(base_url: impl Into<String>, job_limit: u32) -> MetricsResult<Self> {
        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            job_limit,
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, endpoint: &str) -> MetricsResult<T> {
        let url = format!("{}{}", self.base_url, endpoint);
        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(MetricsError::Upstream {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
            });
        }
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

#[async_trait]
impl JobSource for UpstreamSource {
    async fn fetch(&self) -> MetricsResult<SourceBatch> {
        let jobs_endpoint = format!("/api/jobs?limit={}", self.job_limit);
        let started = Instant::now();
        let (raw_backends, raw_jobs, raw_metrics) = tokio::try_join!(
            self.get_json::<Vec<RawBackend>>("/api/backends"),
            self.get_json::<Vec<RawJob>>(&jobs_endpoint),
            self.get_json::<RawMetrics>("/api/metrics"),
        )?;
        let api_speed_ms = started.elapsed().as_millis() as u64;

        let received = raw_jobs.len();
        let jobs: Vec<JobRecord> = raw_jobs
            .into_iter()
            .filter_map(|raw| match normalize_job(raw) {
                Ok(job) => Some(job),
                Err(error) => {
                    warn!("dropping upstream job: {}", error);
                    None
                }
            })
            .collect();
        debug!(
            "fetched {} of {} upstream jobs in {} ms",
            jobs.len(),
            received,
            api_speed_ms
        );

        Ok(SourceBatch {
            jobs,
            backends: raw_backends.into_iter().map(normalize_backend).collect(),
            operational: OperationalMetrics {
                open_sessions: raw_metrics.open_sessions.unwrap_or(0),
                api_speed_ms,
            },
        })
    }
}

/// Accepts RFC 3339 or a naive `YYYY-MM-DD HH:MM:SS` taken to be UTC.
pub fn parse_timestamp(raw: &str) -> MetricsResult<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(raw) {
        return Ok(timestamp.with_timezone(&Utc));
    }

    NAIVE_TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|naive| naive.and_utc())
        .ok_or_else(|| MetricsError::InvalidTimestamp(raw.to_string()))
}

fn normalize_job(raw: RawJob) -> MetricsResult<JobRecord> {
    let id = raw.id.unwrap_or_default();
    let status: JobStatus = raw
        .status
        .as_deref()
        .unwrap_or_default()
        .parse()
        .map_err(|error| annotate(&id, error))?;
    let submitted = parse_timestamp(raw.submitted.as_deref().unwrap_or_default())
        .map_err(|error| annotate(&id, error))?;

    let status_history = raw
        .status_history
        .into_iter()
        .filter_map(|value| serde_json::from_value::<RawStatusEntry>(value).ok())
        .filter_map(|entry| {
            Some(StatusEntry {
                status: entry.status.parse().ok()?,
                timestamp: parse_timestamp(&entry.timestamp).ok()?,
            })
        })
        .collect();

    Ok(JobRecord {
        id,
        status,
        backend: raw.backend.unwrap_or_else(|| "Unknown".to_string()),
        submitted,
        elapsed_time: raw.elapsed_time.unwrap_or(0.0).max(0.0),
        status_history,
        user: raw.user,
        qpu_seconds: raw.qpu_seconds.unwrap_or(0.0).max(0.0),
    })
}

fn normalize_backend(raw: RawBackend) -> BackendRecord {
    BackendRecord {
        status: BackendStatus::from_upstream(raw.status.as_deref().unwrap_or_default()),
        qubit_count: raw.qubit_count.unwrap_or(0),
        queue_depth: raw.queue_depth.unwrap_or(0),
        error_rate: raw.error_rate.unwrap_or(0.0).clamp(0.0, 1.0),
        name: raw.name,
    }
}

fn annotate(id: &str, error: MetricsError) -> MetricsError {
    match error {
        MetricsError::InvalidStatus(value) => {
            MetricsError::InvalidStatus(format!("{value:?} on job {id}"))
        }
        MetricsError::InvalidTimestamp(value) => {
            MetricsError::InvalidTimestamp(format!("{value:?} on job {id}"))
        }
        other => other,
    }
}
