//! Scheduler background loop.
//!
//! Holds the table of daily jobs behind a shared lock and spawns a tokio task
//! that polls it for due jobs. Due callbacks are collected under the lock and
//! invoked after it is released, so a slow callback never blocks
//! registration from the turn loop.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::{Local, NaiveDateTime};
use tracing::{debug, error, info, warn};

use crate::scheduler::tasks::{DailyJob, FireRecord, JobId, ScheduleError, TimeOfDay};

/// Default poll interval of the background loop.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Number of fire-history entries to keep.
const DEFAULT_HISTORY_LIMIT: usize = 200;

/// Callback invoked when a job fires.
pub type JobCallback = Arc<dyn Fn() + Send + Sync>;

struct Registered {
    job: DailyJob,
    callback: JobCallback,
}

struct SchedulerInner {
    /// Registration order is firing order for jobs due at the same tick.
    jobs: Vec<Registered>,
    history: Vec<FireRecord>,
    next_id: u64,
    max_history_entries: usize,
}

/// Shared table of daily callbacks.
///
/// Cloning yields another handle onto the same table: the turn loop keeps one
/// for registration while the background task polls another.
#[derive(Clone)]
pub struct Scheduler {
    inner: Arc<Mutex<SchedulerInner>>,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("jobs", &self.len())
            .finish_non_exhaustive()
    }
}

impl Scheduler {
    /// Create an empty scheduler.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(SchedulerInner {
                jobs: Vec::new(),
                history: Vec::new(),
                next_id: 1,
                max_history_entries: DEFAULT_HISTORY_LIMIT,
            })),
        }
    }

    /// Override the fire-history limit.
    pub fn with_history_limit(self, max_entries: usize) -> Self {
        if let Ok(mut inner) = self.lock() {
            inner.max_history_entries = max_entries.max(1);
            trim_history(&mut inner);
        }
        self
    }

    fn lock(&self) -> Result<MutexGuard<'_, SchedulerInner>, ScheduleError> {
        self.inner.lock().map_err(|_| ScheduleError::LockPoisoned)
    }

    /// Register `callback` to fire every day at `time_spec` (local time).
    ///
    /// A time already passed today first fires tomorrow.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::InvalidTime`] if `time_spec` does not parse.
    pub fn schedule_daily<F>(
        &self,
        time_spec: &str,
        label: impl Into<String>,
        callback: F,
    ) -> Result<JobId, ScheduleError>
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.schedule_daily_at(local_now(), time_spec, label, callback)
    }

    /// Register as if the current instant were `now`.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::InvalidTime`] if `time_spec` does not parse.
    pub fn schedule_daily_at<F>(
        &self,
        now: NaiveDateTime,
        time_spec: &str,
        label: impl Into<String>,
        callback: F,
    ) -> Result<JobId, ScheduleError>
    where
        F: Fn() + Send + Sync + 'static,
    {
        let time = TimeOfDay::parse(time_spec)?;
        self.schedule_at(now, time, label, callback)
    }

    /// Register an already-parsed time of day as if the current instant were
    /// `now`.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::LockPoisoned`] if the table is unusable.
    pub fn schedule_at<F>(
        &self,
        now: NaiveDateTime,
        time: TimeOfDay,
        label: impl Into<String>,
        callback: F,
    ) -> Result<JobId, ScheduleError>
    where
        F: Fn() + Send + Sync + 'static,
    {
        let mut inner = self.lock()?;

        let id = JobId(inner.next_id);
        inner.next_id += 1;

        let job = DailyJob::new(id, label, time, now);
        info!("scheduled {id} daily at {time}, first firing {}", job.next_fire);
        inner.jobs.push(Registered {
            job,
            callback: Arc::new(callback),
        });
        Ok(id)
    }

    /// Fire every job due at the current local time.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::LockPoisoned`] if the table is unusable.
    pub fn tick(&self) -> Result<usize, ScheduleError> {
        self.tick_at(local_now())
    }

    /// Fire every job due at `now`, in registration order. Returns the number
    /// of callbacks invoked.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::LockPoisoned`] if the table is unusable.
    pub fn tick_at(&self, now: NaiveDateTime) -> Result<usize, ScheduleError> {
        let due: Vec<(JobId, JobCallback)> = {
            let mut inner = self.lock()?;
            let mut due = Vec::new();
            let mut fired = Vec::new();
            for entry in inner.jobs.iter_mut().filter(|e| e.job.is_due(now)) {
                entry.job.mark_fired(now);
                due.push((entry.job.id, Arc::clone(&entry.callback)));
                fired.push(FireRecord {
                    job_id: entry.job.id,
                    label: entry.job.label.clone(),
                    fired_at: now,
                });
            }
            inner.history.extend(fired);
            trim_history(&mut inner);
            due
        };

        for (id, callback) in &due {
            debug!("firing {id}");
            if catch_unwind(AssertUnwindSafe(|| callback())).is_err() {
                warn!("callback for {id} panicked");
            }
        }
        Ok(due.len())
    }

    /// Snapshot of registered jobs in registration order.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::LockPoisoned`] if the table is unusable.
    pub fn jobs(&self) -> Result<Vec<DailyJob>, ScheduleError> {
        Ok(self.lock()?.jobs.iter().map(|e| e.job.clone()).collect())
    }

    /// Recent firings, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::LockPoisoned`] if the table is unusable.
    pub fn history(&self) -> Result<Vec<FireRecord>, ScheduleError> {
        Ok(self.lock()?.history.clone())
    }

    /// Number of registered jobs.
    pub fn len(&self) -> usize {
        self.lock().map(|inner| inner.jobs.len()).unwrap_or(0)
    }

    /// Returns `true` if no jobs are registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Start the background poll loop.
    ///
    /// Each tick runs on the blocking pool since callbacks may speak.
    pub fn run(self, poll_interval: Duration) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            info!(
                "scheduler started with {} jobs, polling every {:?}",
                self.len(),
                poll_interval
            );
            let mut interval = tokio::time::interval(poll_interval);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

            loop {
                interval.tick().await;
                let handle = self.clone();
                match tokio::task::spawn_blocking(move || handle.tick()).await {
                    Ok(Ok(_)) => {}
                    Ok(Err(e)) => {
                        error!("scheduler stopped: {e}");
                        return;
                    }
                    Err(e) => {
                        error!("scheduler tick task failed: {e}");
                        return;
                    }
                }
            }
        })
    }
}

fn trim_history(inner: &mut SchedulerInner) {
    if inner.history.len() <= inner.max_history_entries {
        return;
    }
    let drop_count = inner.history.len() - inner.max_history_entries;
    inner.history.drain(0..drop_count);
}

fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;
    use chrono::NaiveDate;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn at(day: u32, hour: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, day)
            .unwrap()
            .and_hms_opt(hour, min, 0)
            .unwrap()
    }

    fn counter() -> (Arc<AtomicUsize>, impl Fn() + Send + Sync + 'static) {
        let count = Arc::new(AtomicUsize::new(0));
        let inner = Arc::clone(&count);
        (count, move || {
            inner.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn new_scheduler_has_no_jobs() {
        let scheduler = Scheduler::new();
        assert!(scheduler.is_empty());
        assert_eq!(scheduler.tick_at(at(12, 12, 0)).unwrap(), 0);
    }

    #[test]
    fn invalid_time_is_rejected_at_registration() {
        let scheduler = Scheduler::new();
        let err = scheduler
            .schedule_daily_at(at(12, 8, 0), "half past never", "x", || {})
            .unwrap_err();
        assert_eq!(err, ScheduleError::InvalidTime("half past never".to_owned()));
        assert!(scheduler.is_empty());
    }

    #[test]
    fn passed_time_fires_tomorrow_not_now() {
        let scheduler = Scheduler::new();
        let (count, cb) = counter();
        scheduler
            .schedule_daily_at(at(12, 16, 0), "3 pm", "late", cb)
            .unwrap();

        assert_eq!(scheduler.tick_at(at(12, 16, 0)).unwrap(), 0);
        assert_eq!(scheduler.tick_at(at(13, 14, 59)).unwrap(), 0);
        assert_eq!(scheduler.tick_at(at(13, 15, 0)).unwrap(), 1);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn fires_once_per_day() {
        let scheduler = Scheduler::new();
        let (count, cb) = counter();
        scheduler
            .schedule_daily_at(at(12, 8, 0), "15:00", "daily", cb)
            .unwrap();

        scheduler.tick_at(at(12, 15, 0)).unwrap();
        scheduler.tick_at(at(12, 15, 0)).unwrap();
        scheduler.tick_at(at(12, 15, 1)).unwrap();
        assert_eq!(count.load(Ordering::SeqCst), 1);

        scheduler.tick_at(at(13, 15, 0)).unwrap();
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn same_time_jobs_fire_in_registration_order() {
        let scheduler = Scheduler::new();
        let order = Arc::new(Mutex::new(Vec::new()));
        for label in ["first", "second", "third"] {
            let order = Arc::clone(&order);
            scheduler
                .schedule_daily_at(at(12, 8, 0), "9 am", label, move || {
                    order.lock().unwrap().push(label);
                })
                .unwrap();
        }

        assert_eq!(scheduler.tick_at(at(13, 9, 0)).unwrap(), 3);
        assert_eq!(*order.lock().unwrap(), vec!["first", "second", "third"]);
    }

    #[test]
    fn callback_may_register_another_job() {
        let scheduler = Scheduler::new();
        let handle = scheduler.clone();
        scheduler
            .schedule_daily_at(at(12, 8, 0), "9 am", "outer", move || {
                handle
                    .schedule_daily_at(at(12, 9, 0), "10 am", "inner", || {})
                    .unwrap();
            })
            .unwrap();

        scheduler.tick_at(at(12, 9, 0)).unwrap();
        assert_eq!(scheduler.len(), 2);
    }

    #[test]
    fn panicking_callback_does_not_stop_later_jobs() {
        let scheduler = Scheduler::new();
        let (count, cb) = counter();
        scheduler
            .schedule_daily_at(at(12, 8, 0), "9 am", "boom", || panic!("boom"))
            .unwrap();
        scheduler
            .schedule_daily_at(at(12, 8, 0), "9 am", "ok", cb)
            .unwrap();

        assert_eq!(scheduler.tick_at(at(12, 9, 0)).unwrap(), 2);
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert!(scheduler.jobs().is_ok());
    }

    #[test]
    fn history_records_firings_and_is_bounded() {
        let scheduler = Scheduler::new().with_history_limit(2);
        scheduler
            .schedule_daily_at(at(1, 8, 0), "9 am", "walk", || {})
            .unwrap();

        for day in 1..=4 {
            scheduler.tick_at(at(day, 9, 0)).unwrap();
        }

        let history = scheduler.history().unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].fired_at, at(3, 9, 0));
        assert_eq!(history[1].fired_at, at(4, 9, 0));
        assert_eq!(history[1].label, "walk");
    }

    #[test]
    fn jobs_snapshot_reflects_state() {
        let scheduler = Scheduler::new();
        let id = scheduler
            .schedule_daily_at(at(12, 8, 0), "3:30 pm", "tea", || {})
            .unwrap();
        scheduler.tick_at(at(12, 15, 30)).unwrap();

        let jobs = scheduler.jobs().unwrap();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].id, id);
        assert_eq!(jobs[0].fire_count, 1);
        assert_eq!(jobs[0].next_fire, at(13, 15, 30));
    }

    #[tokio::test]
    async fn run_loop_fires_overdue_job_once() {
        let scheduler = Scheduler::new();
        let (count, cb) = counter();
        let two_days_ago = local_now() - chrono::Duration::days(2);
        scheduler
            .schedule_daily_at(two_days_ago, "00:00", "overdue", cb)
            .unwrap();

        let handle = scheduler.clone().run(Duration::from_millis(10));
        tokio::time::sleep(Duration::from_millis(150)).await;
        handle.abort();

        assert_eq!(count.load(Ordering::SeqCst), 1);
    }
}
