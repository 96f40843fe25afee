//! Time-bucketed reporting over a batch of job records.
//!
//! Every function here is pure: the same jobs, reference instant and time
//! zone always produce the same output. Calendar boundaries (days, weeks,
//! months, `HH:MM` labels) are evaluated in the observer's time zone while all
//! comparisons happen on UTC instants.

use chrono::{
    DateTime, Datelike, Duration, Months, NaiveDate, NaiveTime, Offset, TimeZone, Utc, Weekday,
};

use crate::types::{
    BackendSlice, DailySummary, HourlyBucket, JobRecord, JobStatus, Metrics, OperationalMetrics,
    PeriodBucket, PeriodicReport, StatusCounts,
};

pub const WEEKS_IN_REPORT: u32 = 4;
pub const MONTHS_IN_REPORT: u32 = 6;
pub const HOURS_IN_HISTOGRAM: i64 = 12;

/// Completed jobs per backend for the calendar day `day`.
///
/// A job counts on the day of its first COMPLETED history entry; completed
/// jobs without one are skipped. Backends keep the order in which they were
/// first seen, which also decides their palette slot.
pub fn daily_summary<Tz: TimeZone>(jobs: &[JobRecord], day: NaiveDate, tz: &Tz) -> DailySummary {
    let mut groups: Vec<(String, u32)> = Vec::new();
    let mut total_completed = 0;

    for job in jobs.iter().filter(|job| job.status == JobStatus::Completed) {
        let Some(completed_at) = job.first_transition(JobStatus::Completed) else {
            continue;
        };
        if completed_at.with_timezone(tz).date_naive() != day {
            continue;
        }

        total_completed += 1;
        match groups.iter_mut().find(|(backend, _)| *backend == job.backend) {
            Some((_, count)) => *count += 1,
            None => groups.push((job.backend.clone(), 1)),
        }
    }

    let completed_by_backend = groups
        .into_iter()
        .enumerate()
        .map(|(position, (name, value))| BackendSlice::new(name, value, position))
        .collect();

    DailySummary {
        date: start_of_day(tz, day),
        total_completed,
        completed_by_backend,
    }
}

pub fn periodic_report<Tz: TimeZone>(
    jobs: &[JobRecord],
    now: DateTime<Utc>,
    tz: &Tz,
) -> PeriodicReport {
    PeriodicReport {
        weekly: weekly_rollup(jobs, now, tz),
        monthly: monthly_rollup(jobs, now, tz),
    }
}

/// Status counts for the four Monday-based weeks ending with the week that
/// contains `now`, oldest first. Jobs are placed by `submitted`.
///
/// The partial week that would start 28 days before `now` is dropped.
pub fn weekly_rollup<Tz: TimeZone>(
    jobs: &[JobRecord],
    now: DateTime<Utc>,
    tz: &Tz,
) -> Vec<PeriodBucket> {
    let current_week = start_of_week(now.with_timezone(tz).date_naive());

    (0..i64::from(WEEKS_IN_REPORT))
        .rev()
        .map(|weeks_back| {
            let week_start = current_week - Duration::weeks(weeks_back);
            let next_week = week_start + Duration::weeks(1);
            period_bucket(
                jobs,
                week_start.format("%b %-d").to_string(),
                start_of_day(tz, week_start),
                start_of_day(tz, next_week),
            )
        })
        .collect()
}

/// Status counts for the six calendar months ending with the month that
/// contains `now`, oldest first. Empty months still produce a bucket.
pub fn monthly_rollup<Tz: TimeZone>(
    jobs: &[JobRecord],
    now: DateTime<Utc>,
    tz: &Tz,
) -> Vec<PeriodBucket> {
    let current_month = start_of_month(now.with_timezone(tz).date_naive());

    (0..MONTHS_IN_REPORT)
        .rev()
        .map(|months_back| {
            let month_start = current_month
                .checked_sub_months(Months::new(months_back))
                .expect("six months back from a valid date is representable");
            let next_month = month_start
                .checked_add_months(Months::new(1))
                .expect("one month ahead of a valid date is representable");
            period_bucket(
                jobs,
                month_start.format("%b").to_string(),
                start_of_day(tz, month_start),
                start_of_day(tz, next_month),
            )
        })
        .collect()
}

/// Twelve one-hour buckets covering `[now - 12h, now)`, oldest first.
///
/// Buckets are half-open: a job submitted exactly at a bucket's end belongs
/// to the following bucket.
pub fn hourly_histogram<Tz: TimeZone>(
    jobs: &[JobRecord],
    now: DateTime<Utc>,
    tz: &Tz,
) -> Vec<HourlyBucket>
where
    Tz::Offset: std::fmt::Display,
{
    (0..HOURS_IN_HISTOGRAM)
        .map(|index| {
            let start = now - Duration::hours(HOURS_IN_HISTOGRAM - index);
            let end = start + Duration::hours(1);
            HourlyBucket {
                time: start.with_timezone(tz).format("%H:%M").to_string(),
                start,
                counts: count_statuses(jobs, |submitted| submitted >= start && submitted < end),
            }
        })
        .collect()
}

/// Mean queueing delay in seconds.
///
/// The wait of a job that started running is the gap between its first
/// QUEUED and first RUNNING entries; a job still queued has waited until
/// `now`. Every other job is ignored. Non-positive gaps are counted but add
/// nothing to the total.
pub fn average_wait_time(jobs: &[JobRecord], now: DateTime<Utc>) -> f64 {
    let mut total_wait_ms: i64 = 0;
    let mut counted_jobs: u64 = 0;

    for job in jobs {
        let Some(queued_at) = job.first_transition(JobStatus::Queued) else {
            continue;
        };

        let wait = match job.first_transition(JobStatus::Running) {
            Some(running_at) => running_at - queued_at,
            None if job.status == JobStatus::Queued => now - queued_at,
            None => continue,
        };

        counted_jobs += 1;
        if wait > Duration::zero() {
            total_wait_ms = total_wait_ms.saturating_add(wait.num_milliseconds());
        }
    }

    if counted_jobs == 0 {
        return 0.0;
    }

    (total_wait_ms as f64 / counted_jobs as f64 / 1000.0).max(0.0)
}

/// Percentage of finished jobs that completed; 100 when nothing has finished.
pub fn success_rate(jobs: &[JobRecord]) -> f64 {
    let completed = jobs
        .iter()
        .filter(|job| job.status == JobStatus::Completed)
        .count();
    let errored = jobs
        .iter()
        .filter(|job| job.status == JobStatus::Error)
        .count();

    let finished = completed + errored;
    if finished == 0 {
        100.0
    } else {
        completed as f64 / finished as f64 * 100.0
    }
}

pub fn summary_metrics(
    jobs: &[JobRecord],
    now: DateTime<Utc>,
    operational: OperationalMetrics,
) -> Metrics {
    Metrics {
        total_jobs: jobs.len() as u64,
        live_jobs: jobs.iter().filter(|job| job.status.is_live()).count() as u64,
        avg_wait_time_seconds: average_wait_time(jobs, now),
        success_rate_percent: success_rate(jobs),
        open_sessions: operational.open_sessions,
        api_speed_ms: operational.api_speed_ms,
    }
}

fn period_bucket(
    jobs: &[JobRecord],
    label: String,
    start: DateTime<Utc>,
    next_start: DateTime<Utc>,
) -> PeriodBucket {
    let end = next_start - Duration::milliseconds(1);
    PeriodBucket {
        label,
        start,
        end,
        counts: count_statuses(jobs, |submitted| submitted >= start && submitted <= end),
    }
}

fn count_statuses<F>(jobs: &[JobRecord], in_window: F) -> StatusCounts
where
    F: Fn(DateTime<Utc>) -> bool,
{
    let mut counts = StatusCounts::default();
    for job in jobs.iter().filter(|job| in_window(job.submitted)) {
        counts.record(job.status);
    }
    counts
}

/// Midnight of `date` in `tz`, as a UTC instant.
pub fn start_of_day<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> DateTime<Utc> {
    let midnight = date.and_time(NaiveTime::MIN);
    match tz.from_local_datetime(&midnight).earliest() {
        Some(local) => local.with_timezone(&Utc),
        // midnight skipped by a DST jump: read it with the offset in effect
        // before the jump, which lands on the first instant of the day
        None => {
            let before = tz
                .offset_from_utc_datetime(&(midnight - Duration::days(1)))
                .fix();
            Utc.from_utc_datetime(&(midnight - Duration::seconds(before.local_minus_utc().into())))
        }
    }
}

fn start_of_week(date: NaiveDate) -> NaiveDate {
    let weekday = match date.weekday() {
        Weekday::Mon => 0,
        Weekday::Tue => 1,
        Weekday::Wed => 2,
        Weekday::Thu => 3,
        Weekday::Fri => 4,
        Weekday::Sat => 5,
        Weekday::Sun => 6,
    };

    date - Duration::days(weekday)
}

fn start_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1)
        .expect("day one should always be valid for a date")
}
