//! Bounded-concurrency batch controller
//!
//! Dispatches files in list order, keeps at most `parallel` jobs running,
//! and reports exactly once when every file has reached a terminal state.
//! Jobs run as tasks in a [`JoinSet`]; the controller is the only place that
//! touches batch counters, statistics and the cache index, so none of them
//! need locking even though jobs finish in any order.
//!
//! On the first failure no further files are dispatched. Jobs already
//! running are awaited (their processes are not killed) and successful ones
//! are still applied, but the cache index is not saved and the first error
//! is returned.

use crate::error::{AppmakeError, AppmakeResult};
use crate::optimize::cache::CacheStore;
use crate::optimize::stats::Stats;
use crate::optimize::transform::{
    finish_job, run_job, CacheProbe, CandidateFile, JobOutcome, Transformer,
};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::task::{Id, JoinSet};
use tracing::{debug, info, warn};

/// Per-file status, held only for the duration of a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Pending,
    Running,
    Done,
    Failed,
}

/// A completed job, as seen by a [`ProgressObserver`]
#[derive(Debug, Clone)]
pub struct JobReport {
    pub path: PathBuf,
    pub from_cache: bool,
    /// Optimizer stdout, when echoing is enabled and it is non-empty
    pub stdout: Option<String>,
    /// Optimizer stderr, when echoing is enabled and it is non-empty
    pub stderr: Option<String>,
}

/// Receives a callback each time a file completes
pub trait ProgressObserver {
    fn job_done(&mut self, done: usize, total: usize, report: &JobReport);
}

impl ProgressObserver for () {
    fn job_done(&mut self, _done: usize, _total: usize, _report: &JobReport) {}
}

/// Controller-owned batch counters
#[derive(Debug)]
struct Batch {
    states: Vec<JobState>,
    next: usize,
    in_flight: usize,
    completed: usize,
    stats: Stats,
}

impl Batch {
    fn new(total: usize) -> Self {
        Self {
            states: vec![JobState::Pending; total],
            next: 0,
            in_flight: 0,
            completed: 0,
            stats: Stats::new(total),
        }
    }

    fn total(&self) -> usize {
        self.states.len()
    }
}

/// Runs one batch of files through a [`Transformer`]
pub struct Scheduler<'a> {
    transformer: Arc<dyn Transformer>,
    parallel: usize,
    cache: Option<&'a mut CacheStore>,
    show_stdout: bool,
    show_stderr: bool,
}

impl<'a> Scheduler<'a> {
    /// Create a scheduler running at most `parallel` jobs at once
    pub fn new(transformer: Arc<dyn Transformer>, parallel: usize) -> Self {
        Self {
            transformer,
            parallel: parallel.max(1),
            cache: None,
            show_stdout: false,
            show_stderr: false,
        }
    }

    /// Consult and update `cache`; it is flushed once the batch succeeds
    pub fn with_cache(mut self, cache: &'a mut CacheStore) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Forward optimizer stdout/stderr in job reports
    pub fn with_output(mut self, show_stdout: bool, show_stderr: bool) -> Self {
        self.show_stdout = show_stdout;
        self.show_stderr = show_stderr;
        self
    }

    /// Run the batch to completion
    pub async fn run(
        self,
        files: Vec<PathBuf>,
        observer: &mut dyn ProgressObserver,
    ) -> AppmakeResult<Stats> {
        let Scheduler {
            transformer,
            parallel,
            mut cache,
            show_stdout,
            show_stderr,
        } = self;

        if let Some(store) = cache.as_deref() {
            store.ensure_dir().await?;
        }

        let candidates: Vec<CandidateFile> = files
            .into_iter()
            .map(|path| {
                let key = cache.as_deref().map(|store| store.key_for(&path));
                CandidateFile::new(path, key)
            })
            .collect();

        let mut batch = Batch::new(candidates.len());
        let mut jobs: JoinSet<(usize, AppmakeResult<JobOutcome>)> = JoinSet::new();
        // Identifies the file of a job that panicked or was cancelled
        let mut task_files: HashMap<Id, usize> = HashMap::new();
        let mut failure: Option<AppmakeError> = None;

        info!(total = batch.total(), parallel, "Starting optimization batch");

        loop {
            while failure.is_none() && batch.in_flight < parallel && batch.next < batch.total() {
                let index = batch.next;
                let file = candidates[index].clone();
                let probe = cache.as_deref().map(|store| CacheProbe {
                    recorded: file
                        .key
                        .as_deref()
                        .and_then(|key| store.lookup(key))
                        .map(str::to_string),
                    blob_dir: store.dir().to_path_buf(),
                });
                let transformer = Arc::clone(&transformer);

                debug!("Dispatching {}", file.path.display());
                let handle =
                    jobs.spawn(async move { (index, run_job(transformer, file, probe).await) });
                task_files.insert(handle.id(), index);

                batch.states[index] = JobState::Running;
                batch.next += 1;
                batch.in_flight += 1;
            }

            let Some(joined) = jobs.join_next_with_id().await else {
                break;
            };
            batch.in_flight -= 1;

            let (index, result) = match joined {
                Ok((id, (index, result))) => {
                    task_files.remove(&id);
                    (index, result)
                }
                Err(e) => match task_files.remove(&e.id()) {
                    Some(index) => {
                        let aborted = AppmakeError::JobAborted {
                            path: candidates[index].path.clone(),
                            reason: e.to_string(),
                        };
                        (index, Err(aborted))
                    }
                    None => {
                        debug!("Join error for an untracked task: {}", e);
                        continue;
                    }
                },
            };

            let file = &candidates[index];
            let finished = match result {
                Ok(outcome) => {
                    apply_outcome(file, outcome, cache.as_deref_mut(), &mut batch.stats).await
                }
                Err(e) => Err(e),
            };

            match finished {
                Ok(mut report) => {
                    batch.states[index] = JobState::Done;
                    batch.completed += 1;
                    if !show_stdout {
                        report.stdout = None;
                    }
                    if !show_stderr {
                        report.stderr = None;
                    }
                    observer.job_done(batch.completed, batch.total(), &report);
                }
                Err(e) => {
                    batch.states[index] = JobState::Failed;
                    record_failure(&mut failure, e);
                }
            }
        }

        if let Some(err) = failure {
            let count = |state: JobState| batch.states.iter().filter(|s| **s == state).count();
            warn!(
                "Batch aborted: {}/{} files done, {} failed, {} not started; cache index not saved",
                batch.completed,
                batch.total(),
                count(JobState::Failed),
                count(JobState::Pending)
            );
            return Err(err);
        }

        if let Some(store) = cache.as_deref() {
            store.flush().await?;
            info!("Saved cache index to {}", store.index_path().display());
        }

        Ok(batch.stats)
    }
}

fn record_failure(failure: &mut Option<AppmakeError>, err: AppmakeError) {
    match failure {
        None => *failure = Some(err),
        Some(_) => debug!("Additional failure after abort: {}", err),
    }
}

async fn apply_outcome(
    file: &CandidateFile,
    outcome: JobOutcome,
    cache: Option<&mut CacheStore>,
    stats: &mut Stats,
) -> AppmakeResult<JobReport> {
    match outcome {
        JobOutcome::Cached => {
            stats.record_cache_hit();
            Ok(JobReport {
                path: file.path.clone(),
                from_cache: true,
                stdout: None,
                stderr: None,
            })
        }
        JobOutcome::Transformed { hash, output } => {
            finish_job(file, hash.as_deref(), cache).await?;
            stats.record_optimized();
            Ok(JobReport {
                path: file.path.clone(),
                from_cache: false,
                stdout: Some(output.stdout).filter(|s| !s.trim().is_empty()),
                stderr: Some(output.stderr).filter(|s| !s.trim().is_empty()),
            })
        }
    }
}
