use std::time::Duration;

use async_trait::async_trait;
use chrono::{FixedOffset, Utc};
use log::{debug, info};
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::snapshot::{build_snapshot, DashboardSnapshot, DataOrigin};
use crate::source::{JobSource, MetricsResult};

pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(60);

/// Anything that can hand out a dashboard snapshot.
///
/// `force` asks implementations that keep state (such as a cache) to skip it
/// and compute a fresh snapshot.
#[async_trait]
pub trait SnapshotProvider: Send + Sync {
    async fn snapshot(&self, force: bool) -> MetricsResult<DashboardSnapshot>;
}

/// Fetches a batch from a [`JobSource`] and aggregates it at the current time.
pub struct AggregatingProvider<S: JobSource> {
    source: S,
    offset: FixedOffset,
    origin: DataOrigin,
}

impl<S: JobSource> AggregatingProvider<S> {
    pub fn new(source: S, offset: FixedOffset, origin: DataOrigin) -> Self {
        Self {
            source,
            offset,
            origin,
        }
    }
}

#[async_trait]
impl<S: JobSource> SnapshotProvider for AggregatingProvider<S> {
    async fn snapshot(&self, _force: bool) -> MetricsResult<DashboardSnapshot> {
        let batch = self.source.fetch().await?;
        Ok(build_snapshot(batch, Utc::now(), &self.offset, self.origin))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    /// How long a computed snapshot is served before it is recomputed.
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: DEFAULT_CACHE_TTL,
        }
    }
}

struct CacheEntry {
    snapshot: DashboardSnapshot,
    stored_at: Instant,
}

/// A decorator that keeps the last snapshot of the wrapped provider for the
/// configured freshness window.
///
/// Concurrent callers share one refresh. Failed refreshes are not cached and
/// leave the previous entry untouched.
pub struct CachingProvider<P: SnapshotProvider> {
    inner: P,
    config: CacheConfig,
    entry: Mutex<Option<CacheEntry>>,
}

impl<P: SnapshotProvider> CachingProvider<P> {
    pub fn new(inner: P, config: CacheConfig) -> Self {
        Self {
            inner,
            config,
            entry: Mutex::new(None),
        }
    }

    pub async fn invalidate(&self) {
        self.entry.lock().await.take();
    }
}

#[async_trait]
impl<P: SnapshotProvider> SnapshotProvider for CachingProvider<P> {
    async fn snapshot(&self, force: bool) -> MetricsResult<DashboardSnapshot> {
        let mut entry = self.entry.lock().await;

        if !force {
            if let Some(cached) = entry.as_ref() {
                if cached.stored_at.elapsed() < self.config.ttl {
                    debug!(
                        "serving cached snapshot generated at {}",
                        cached.snapshot.generated_at
                    );
                    let mut snapshot = cached.snapshot.clone();
                    snapshot.mark_cached();
                    return Ok(snapshot);
                }
            }
        }

        let snapshot = self.inner.snapshot(force).await?;
        info!(
            "refreshed snapshot cache ({} jobs, force: {})",
            snapshot.jobs.len(),
            force
        );
        *entry = Some(CacheEntry {
            snapshot: snapshot.clone(),
            stored_at: Instant::now(),
        });
        Ok(snapshot)
    }
}
