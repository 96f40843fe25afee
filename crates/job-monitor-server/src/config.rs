//! Server configuration.
//!
//! Values come from the command line or the environment (see `main.rs`) and
//! are collected here so the rest of the server never reads globals.

use std::time::Duration;

use chrono::{FixedOffset, Offset, Utc};
use job_metrics::provider::{CacheConfig, DEFAULT_CACHE_TTL};
use job_metrics::synthetic::DEFAULT_SYNTHETIC_JOBS;
use job_metrics::upstream::DEFAULT_JOB_LIMIT;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 9002;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Base URL of the upstream job tracker. Without one every live request
    /// falls back to demo data.
    pub upstream_url: Option<String>,
    pub job_limit: u32,
    pub cache: CacheConfig,
    pub synthetic_jobs: usize,
    /// Calendar used for daily, weekly and monthly boundaries.
    pub utc_offset: FixedOffset,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            upstream_url: None,
            job_limit: DEFAULT_JOB_LIMIT,
            cache: CacheConfig {
                ttl: DEFAULT_CACHE_TTL,
            },
            synthetic_jobs: DEFAULT_SYNTHETIC_JOBS,
            utc_offset: Utc.fix(),
        }
    }
}

impl ServerConfig {
    pub fn with_cache_ttl_secs(mut self, secs: u64) -> Self {
        self.cache = CacheConfig {
            ttl: Duration::from_secs(secs),
        };
        self
    }
}

/// Offsets beyond a day in either direction are rejected.
pub fn utc_offset_from_minutes(minutes: i32) -> anyhow::Result<FixedOffset> {
    minutes
        .checked_mul(60)
        .and_then(FixedOffset::east_opt)
        .ok_or_else(|| anyhow::anyhow!("invalid UTC offset: {minutes} minutes"))
}
