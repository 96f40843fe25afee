//! Demo telemetry generator.
//!
//! Produces a job population that looks like a busy multi-backend queue: half
//! of the jobs arrived during the last day, the rest are spread over half a
//! year so the weekly and monthly reports have something to show. Every job's
//! status history is derived from its queue and run times relative to `now`,
//! so the history invariants hold for generated data too.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::source::{JobSource, MetricsResult, SourceBatch};
use crate::types::{
    BackendRecord, BackendStatus, JobRecord, JobStatus, OperationalMetrics, StatusEntry,
};

pub const DEFAULT_SYNTHETIC_JOBS: usize = 200;

/// Backends the demo population is spread over, with their qubit counts.
pub const KNOWN_BACKENDS: [(&str, u32); 6] = [
    ("ibm_brisbane", 127),
    ("ibm_kyoto", 127),
    ("ibm_osaka", 127),
    ("ibmq_kolkata", 27),
    ("ibmq_mumbai", 27),
    ("ibmq_auckland", 27),
];

const USERS: [&str; 5] = ["Alice", "Bob", "Charlie", "David", "Eve"];
const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const HISTORY_DAYS: i64 = 180;

pub struct SyntheticSource {
    job_count: usize,
    seed: Option<u64>,
}

impl SyntheticSource {
    pub fn new(job_count: usize) -> Self {
        Self {
            job_count,
            seed: None,
        }
    }

    /// Same seed, same population (relative to the fetch time).
    pub fn with_seed(job_count: usize, seed: u64) -> Self {
        Self {
            job_count,
            seed: Some(seed),
        }
    }
}

impl Default for SyntheticSource {
    fn default() -> Self {
        Self::new(DEFAULT_SYNTHETIC_JOBS)
    }
}

#[async_trait]
impl JobSource for SyntheticSource {
    async fn fetch(&self) -> MetricsResult<SourceBatch> {
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(generate_batch(&mut rng, Utc::now(), self.job_count))
    }
}

pub fn generate_batch<R: Rng + ?Sized>(
    rng: &mut R,
    now: DateTime<Utc>,
    job_count: usize,
) -> SourceBatch {
    let backends = generate_backends(rng);
    let jobs = (0..job_count)
        .map(|index| generate_job(rng, now, index, index < job_count / 2, &backends))
        .collect();

    SourceBatch {
        jobs,
        backends,
        operational: OperationalMetrics {
            open_sessions: rng.gen_range(1..=5),
            api_speed_ms: rng.gen_range(50..=250),
        },
    }
}

fn generate_backends<R: Rng + ?Sized>(rng: &mut R) -> Vec<BackendRecord> {
    KNOWN_BACKENDS
        .iter()
        .map(|&(name, qubit_count)| {
            let (status, queue_depth, error_rate) = match name {
                "ibm_brisbane" => (BackendStatus::Active, rng.gen_range(0..10), 0.012),
                "ibm_kyoto" => (BackendStatus::Active, rng.gen_range(0..10), 0.015),
                "ibm_osaka" => (BackendStatus::Active, rng.gen_range(0..10), 0.011),
                "ibmq_kolkata" => {
                    let status = if rng.gen_bool(0.2) {
                        BackendStatus::Maintenance
                    } else {
                        BackendStatus::Active
                    };
                    (status, 0, 0.025)
                }
                "ibmq_mumbai" => (BackendStatus::Active, rng.gen_range(0..5), 0.021),
                _ => {
                    let status = if rng.gen_bool(0.1) {
                        BackendStatus::Inactive
                    } else {
                        BackendStatus::Active
                    };
                    (status, 0, 0.033)
                }
            };
            BackendRecord {
                name: name.to_string(),
                status,
                qubit_count,
                queue_depth,
                error_rate,
            }
        })
        .collect()
}

fn generate_job<R: Rng + ?Sized>(
    rng: &mut R,
    now: DateTime<Utc>,
    index: usize,
    recent: bool,
    backends: &[BackendRecord],
) -> JobRecord {
    let picked = *[
        JobStatus::Completed,
        JobStatus::Running,
        JobStatus::Queued,
        JobStatus::Error,
        JobStatus::Cancelled,
    ]
    .choose(rng)
    .unwrap_or(&JobStatus::Queued);
    let backend = backends
        .choose(rng)
        .map(|backend| backend.name.clone())
        .unwrap_or_default();

    let submitted = if recent {
        now - Duration::milliseconds(rng.gen_range(0..24 * 3_600_000))
    } else {
        now - Duration::days(rng.gen_range(0..HISTORY_DAYS))
    };
    let run_time = Duration::minutes(rng.gen_range(1..=10));
    let started = submitted + Duration::minutes(rng.gen_range(0..30));
    let mut finished = started + run_time;

    // make a share of today's completions land in the last twelve hours
    if recent && picked == JobStatus::Completed && rng.gen_bool(0.5) {
        finished = now - Duration::milliseconds(rng.gen_range(0..12 * 3_600_000));
        if finished < started {
            finished = started + run_time;
        }
    }

    let mut history = vec![StatusEntry {
        status: JobStatus::Queued,
        timestamp: submitted,
    }];
    let mut status = JobStatus::Queued;

    if now > started {
        history.push(StatusEntry {
            status: JobStatus::Running,
            timestamp: started,
        });
        status = JobStatus::Running;
    }

    let terminal = matches!(
        picked,
        JobStatus::Completed | JobStatus::Error | JobStatus::Cancelled
    );
    if terminal && now > finished {
        history.push(StatusEntry {
            status: picked,
            timestamp: finished,
        });
        status = picked;
    } else if status == JobStatus::Running && now > finished {
        history.push(StatusEntry {
            status: JobStatus::Completed,
            timestamp: finished,
        });
        status = JobStatus::Completed;
    }

    let elapsed = match status {
        JobStatus::Completed | JobStatus::Error | JobStatus::Cancelled => finished - started,
        JobStatus::Running => now - started,
        JobStatus::Queued => Duration::zero(),
    };

    JobRecord {
        id: format!("c{}q{}", random_token(rng, 9), index),
        status,
        backend,
        submitted,
        elapsed_time: (elapsed.num_milliseconds() as f64 / 1000.0).max(0.0),
        status_history: history,
        user: Some(USERS[index % USERS.len()].to_string()),
        qpu_seconds: if status == JobStatus::Completed {
            rng.gen_range(0.0..10.0)
        } else {
            0.0
        },
    }
}

fn random_token<R: Rng + ?Sized>(rng: &mut R, len: usize) -> String {
    (0..len)
        .map(|_| ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())] as char)
        .collect()
}
