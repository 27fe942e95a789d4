//! # Background Job Manager
//!
//! Owns one recurring loop per resource key (a subreddit name). Each loop runs its
//! [`JobTask`] strictly sequentially, sleeps for the configured interval plus jitter, and
//! keeps going until an explicit `stop`. Failed iterations are logged and counted, never
//! fatal to the job.
//!
//! The job table lives behind a single mutex; `start` checks and inserts under one lock
//! acquisition, so concurrent starts for the same key produce exactly one loop.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use futures::future::{BoxFuture, FutureExt, Shared};
use tokio::sync::Mutex;
use tokio::task::{AbortHandle, JoinHandle};
use tokio_util::sync::CancellationToken;

use crate::domain::error::{Failure, ServiceResult};

/// The unit of work repeated by a job.
#[async_trait]
pub trait JobTask: Send + Sync {
    /// Runs one iteration, returning a short summary for the log.
    async fn run_once(&self) -> ServiceResult<String>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Running,
    Stopped,
}

#[derive(Debug, Default)]
struct JobStats {
    runs: u64,
    consecutive_failures: u32,
    last_run: Option<DateTime<Utc>>,
    last_success: Option<DateTime<Utc>>,
    last_error: Option<Failure>,
}

/// Point-in-time view of a job, safe to hand out of the manager.
#[derive(Debug, Clone, PartialEq)]
pub struct JobSnapshot {
    pub key: String,
    pub status: JobStatus,
    pub interval: Duration,
    pub started_at: DateTime<Utc>,
    pub runs: u64,
    pub consecutive_failures: u32,
    pub last_run: Option<DateTime<Utc>>,
    pub last_success: Option<DateTime<Utc>>,
    pub last_error: Option<Failure>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StartOutcome {
    Started(JobSnapshot),
    /// A live job already owns the key; nothing was spawned.
    AlreadyRunning(JobSnapshot),
}

impl StartOutcome {
    pub fn snapshot(&self) -> &JobSnapshot {
        match self {
            StartOutcome::Started(s) | StartOutcome::AlreadyRunning(s) => s,
        }
    }
}

struct JobEntry {
    interval: Duration,
    started_at: DateTime<Utc>,
    stats: Arc<Mutex<JobStats>>,
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl JobEntry {
    fn is_live(&self) -> bool {
        !self.cancel.is_cancelled() && !self.handle.is_finished()
    }

    async fn snapshot(&self, key: &str, status: JobStatus) -> JobSnapshot {
        let stats = self.stats.lock().await;
        JobSnapshot {
            key: key.to_string(),
            status,
            interval: self.interval,
            started_at: self.started_at,
            runs: stats.runs,
            consecutive_failures: stats.consecutive_failures,
            last_run: stats.last_run,
            last_success: stats.last_success,
            last_error: stats.last_error.clone(),
        }
    }
}

/// A cancelled loop that may still be inside an iteration.
struct Draining {
    done: Shared<BoxFuture<'static, ()>>,
    abort: AbortHandle,
}

impl Draining {
    fn new(handle: JoinHandle<()>) -> Self {
        Self {
            abort: handle.abort_handle(),
            done: handle.map(|_| ()).boxed().shared(),
        }
    }
}

#[derive(Default)]
struct JobTable {
    live: HashMap<String, JobEntry>,
    draining: HashMap<String, Draining>,
}

const DEFAULT_DRAIN_TIMEOUT: Duration = Duration::from_secs(30);

pub struct JobManager {
    jobs: Mutex<JobTable>,
    jitter: Duration,
    drain_timeout: Duration,
}

impl JobManager {
    /// `jitter` bounds the random delay added to every sleep so jobs sharing an
    /// interval drift apart.
    pub fn new(jitter: Duration) -> Self {
        Self {
            jobs: Mutex::new(JobTable::default()),
            jitter,
            drain_timeout: DEFAULT_DRAIN_TIMEOUT,
        }
    }

    /// How long `start` waits for a stopped loop on the same key to finish its
    /// iteration before aborting it.
    pub fn with_drain_timeout(mut self, timeout: Duration) -> Self {
        self.drain_timeout = timeout;
        self
    }

    /// Starts a loop for `key` unless a live one exists.
    ///
    /// If a loop for `key` was stopped but is still inside an iteration, waits for it
    /// first, so two iterations never run against the same key.
    pub async fn start(
        &self,
        key: &str,
        interval: Duration,
        task: Arc<dyn JobTask>,
    ) -> StartOutcome {
        loop {
            let (done, abort) = {
                let mut jobs = self.jobs.lock().await;

                if let Some(existing) = jobs.live.get(key)
                    && existing.is_live()
                {
                    return StartOutcome::AlreadyRunning(
                        existing.snapshot(key, JobStatus::Running).await,
                    );
                }

                let pending = jobs
                    .draining
                    .get(key)
                    .filter(|draining| !draining.abort.is_finished())
                    .map(|draining| (draining.done.clone(), draining.abort.clone()));
                match pending {
                    Some(pending) => pending,
                    None => {
                        jobs.draining.remove(key);
                        return self.spawn(&mut jobs, key, interval, task);
                    }
                }
            };

            self.drain(key, done, abort).await;
        }
    }

    fn spawn(
        &self,
        jobs: &mut JobTable,
        key: &str,
        interval: Duration,
        task: Arc<dyn JobTask>,
    ) -> StartOutcome {
        let stats = Arc::new(Mutex::new(JobStats::default()));
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(run_loop(
            key.to_string(),
            interval,
            self.jitter,
            task,
            stats.clone(),
            cancel.clone(),
        ));

        let started_at = Utc::now();
        let snapshot = JobSnapshot {
            key: key.to_string(),
            status: JobStatus::Running,
            interval,
            started_at,
            runs: 0,
            consecutive_failures: 0,
            last_run: None,
            last_success: None,
            last_error: None,
        };
        jobs.live.insert(
            key.to_string(),
            JobEntry {
                interval,
                started_at,
                stats,
                cancel,
                handle,
            },
        );

        tracing::info!(job = %key, interval_secs = interval.as_secs(), "Job started");
        StartOutcome::Started(snapshot)
    }

    async fn drain(&self, key: &str, done: Shared<BoxFuture<'static, ()>>, abort: AbortHandle) {
        tracing::info!(job = %key, "Waiting for stopped job to finish its iteration");
        if tokio::time::timeout(self.drain_timeout, done.clone()).await.is_err() {
            tracing::warn!(job = %key, "Stopped job still busy, aborting");
            abort.abort();
            done.await;
        }
    }

    /// Cancels the live job for `key` and removes it from the table.
    ///
    /// An in-flight iteration is allowed to finish; the loop exits at its next
    /// cancellation check. Until then a new `start` for `key` waits for it.
    pub async fn stop(&self, key: &str) -> ServiceResult<JobSnapshot> {
        let mut jobs = self.jobs.lock().await;

        match jobs.live.get(key) {
            Some(entry) if entry.is_live() => {}
            _ => return Err(Failure::no_such_job(key)),
        }

        let entry = jobs
            .live
            .remove(key)
            .ok_or_else(|| Failure::no_such_job(key))?;
        entry.cancel.cancel();
        let snapshot = entry.snapshot(key, JobStatus::Stopped).await;
        if !entry.handle.is_finished() {
            jobs.draining.insert(key.to_string(), Draining::new(entry.handle));
        }

        tracing::info!(job = %key, runs = snapshot.runs, "Job stopped");
        Ok(snapshot)
    }

    pub async fn status(&self, key: &str) -> Option<JobSnapshot> {
        let jobs = self.jobs.lock().await;
        match jobs.live.get(key) {
            Some(entry) if entry.is_live() => Some(entry.snapshot(key, JobStatus::Running).await),
            _ => None,
        }
    }

    /// Live jobs, sorted by key.
    pub async fn list(&self) -> Vec<JobSnapshot> {
        let jobs = self.jobs.lock().await;
        let mut out = Vec::with_capacity(jobs.live.len());
        for (key, entry) in jobs.live.iter() {
            if entry.is_live() {
                out.push(entry.snapshot(key, JobStatus::Running).await);
            }
        }
        out.sort_by(|a, b| a.key.cmp(&b.key));
        out
    }

    /// Cancels every job and waits up to `grace` for in-flight iterations before
    /// aborting the stragglers.
    pub async fn shutdown(&self, grace: Duration) {
        let pending: Vec<(String, Draining)> = {
            let mut jobs = self.jobs.lock().await;
            let mut pending: Vec<_> = jobs.draining.drain().collect();
            for (key, entry) in jobs.live.drain() {
                entry.cancel.cancel();
                pending.push((key, Draining::new(entry.handle)));
            }
            pending
        };

        let waits = pending.into_iter().map(|(key, draining)| async move {
            if tokio::time::timeout(grace, draining.done).await.is_err() {
                tracing::warn!(job = %key, "Job did not stop within grace period, aborting");
                draining.abort.abort();
            }
        });
        futures::future::join_all(waits).await;
        tracing::info!("All background jobs stopped");
    }
}

fn jittered(interval: Duration, jitter: Duration) -> Duration {
    if jitter.is_zero() {
        return interval;
    }
    interval + jitter.mul_f64(rand::random::<f64>())
}

async fn run_loop(
    key: String,
    interval: Duration,
    jitter: Duration,
    task: Arc<dyn JobTask>,
    stats: Arc<Mutex<JobStats>>,
    cancel: CancellationToken,
) {
    loop {
        if cancel.is_cancelled() {
            break;
        }

        let outcome = task.run_once().await;
        let now = Utc::now();

        {
            let mut stats = stats.lock().await;
            stats.runs += 1;
            stats.last_run = Some(now);
            match outcome {
                Ok(summary) => {
                    stats.consecutive_failures = 0;
                    stats.last_success = Some(now);
                    stats.last_error = None;
                    tracing::info!(job = %key, "{}", summary);
                }
                Err(failure) => {
                    stats.consecutive_failures += 1;
                    tracing::warn!(
                        job = %key,
                        kind = %failure.kind,
                        consecutive_failures = stats.consecutive_failures,
                        "Job iteration failed: {}",
                        failure.message
                    );
                    stats.last_error = Some(failure);
                }
            }
        }

        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(jittered(interval, jitter)) => {}
        }
    }
    tracing::debug!(job = %key, "Job loop exited");
}
