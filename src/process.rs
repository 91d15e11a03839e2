//! Batch conversion engine.
//!
//! Turns a set of input paths into converted images using any
//! [`ImageConverter`], running at most `concurrency` conversions at a time
//! and reporting every per-item failure instead of stopping at the first.
//!
//! ## Entry points
//!
//! | Function | Input | Per-item failures |
//! |---|---|---|
//! | [`convert_one`] | one path | returned as the error |
//! | [`convert_many`] | explicit list | aggregated into [`BatchError::Partial`] |
//! | [`convert_serialized_list`] | JSON array of paths | same as `convert_many` |
//! | [`convert_directory`] | directory, worker pool | logged, listed in [`DirectorySummary`] |
//! | [`convert_directory_sync`] | directory, inline | logged, listed in [`DirectorySummary`] |
//!
//! List conversion fails the call when any item fails, but the error always
//! carries the paths that did convert. Directory conversion only fails when
//! enumeration fails; a bad file never aborts the pass.
//!
//! ## Worker pool
//!
//! Each batch builds its own pool and tears it down before returning:
//!
//! ```text
//! jobs ──► [job conduit, sized to the batch, closed once filled]
//!                 │        │        │
//!              worker 0  worker 1 … worker N-1   (N = concurrency)
//!                 │        │        │
//!          [outcome conduit] ──► drained after every worker has exited
//! ```
//!
//! Workers race for jobs, so the order of outputs and failures is not
//! stable between runs. Every submitted job produces exactly one outcome.

use crate::imaging::{ConvertOptions, ImageConverter};
use crate::scan::{self, ScanError};
use crate::types::{BatchResult, ConversionOutcome, DirectorySummary, ItemFailure};
use crossbeam::channel::{Receiver, Sender, bounded};
use log::{debug, info, warn};
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Worker count used when the caller asks for zero or fewer.
pub const DEFAULT_CONCURRENCY: usize = 4;

#[derive(Error, Debug)]
pub enum BatchError {
    #[error("Enumeration failed: {0}")]
    Scan(#[from] ScanError),
    #[error("Invalid path list: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Worker pool failed to start: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),
    #[error("Job queue closed before all jobs were submitted")]
    Queue,
    #[error("{0}")]
    Partial(PartialFailure),
}

/// Some or all items of a list conversion failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartialFailure {
    /// Outputs of the items that did convert.
    pub succeeded: Vec<PathBuf>,
    pub failures: Vec<ItemFailure>,
}

impl From<PartialFailure> for BatchResult {
    fn from(partial: PartialFailure) -> Self {
        BatchResult {
            succeeded: partial.succeeded,
            failures: partial.failures,
        }
    }
}

impl fmt::Display for PartialFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<String> = self.failures.iter().map(ToString::to_string).collect();
        f.write_str(&messages.join("; "))
    }
}

/// Number of workers in a batch. Always at least one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Concurrency(usize);

impl Concurrency {
    /// Any value `<= 0` becomes [`DEFAULT_CONCURRENCY`].
    pub fn new(requested: i64) -> Self {
        if requested <= 0 {
            Self(DEFAULT_CONCURRENCY)
        } else {
            Self(usize::try_from(requested).unwrap_or(DEFAULT_CONCURRENCY))
        }
    }

    pub fn get(self) -> usize {
        self.0
    }
}

impl Default for Concurrency {
    fn default() -> Self {
        Self(DEFAULT_CONCURRENCY)
    }
}

/// One source path plus the batch's shared options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionJob {
    pub source: PathBuf,
    pub options: ConvertOptions,
}

fn jobs_for(paths: Vec<PathBuf>, options: &ConvertOptions) -> Vec<ConversionJob> {
    paths
        .into_iter()
        .map(|source| ConversionJob {
            source,
            options: *options,
        })
        .collect()
}

fn run_job<C: ImageConverter + ?Sized>(converter: &C, job: ConversionJob) -> ConversionOutcome {
    match converter.convert(&job.source, &job.options) {
        Ok(output) => ConversionOutcome::Converted {
            source: job.source,
            output,
        },
        Err(e) => ConversionOutcome::Failed(ItemFailure {
            source: job.source,
            cause: e.to_string(),
        }),
    }
}

fn worker_loop<C: ImageConverter + ?Sized>(
    worker_id: usize,
    converter: &C,
    jobs: Receiver<ConversionJob>,
    outcomes: Sender<ConversionOutcome>,
) {
    // Ends once the conduit is both closed and drained
    while let Ok(job) = jobs.recv() {
        debug!("worker {worker_id}: {}", job.source.display());
        if outcomes.send(run_job(converter, job)).is_err() {
            break;
        }
    }
}

/// Run `jobs` on a fresh pool of `concurrency` workers and return one
/// outcome per job, in completion order.
///
/// An empty job list returns immediately without building a pool.
pub fn run_pool<C: ImageConverter + ?Sized>(
    converter: &C,
    jobs: Vec<ConversionJob>,
    concurrency: Concurrency,
) -> Result<Vec<ConversionOutcome>, BatchError> {
    if jobs.is_empty() {
        return Ok(Vec::new());
    }

    let total = jobs.len();
    let workers = concurrency.get();
    let (job_tx, job_rx) = bounded::<ConversionJob>(total);
    let (outcome_tx, outcome_rx) = bounded::<ConversionOutcome>(total);

    for job in jobs {
        job_tx.send(job).map_err(|_| BatchError::Queue)?;
    }
    drop(job_tx);

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|i| format!("pixbatch-worker-{i}"))
        .build()?;

    pool.scope(|s| {
        for worker_id in 0..workers {
            let job_rx = job_rx.clone();
            let outcome_tx = outcome_tx.clone();
            s.spawn(move |_| worker_loop(worker_id, converter, job_rx, outcome_tx));
        }
    });
    drop(outcome_tx);

    let outcomes: Vec<ConversionOutcome> = outcome_rx.iter().collect();
    debug_assert_eq!(outcomes.len(), total);
    Ok(outcomes)
}

/// Run a batch and fold its outcomes.
pub fn run_batch<C: ImageConverter + ?Sized>(
    converter: &C,
    paths: Vec<PathBuf>,
    options: &ConvertOptions,
    concurrency: Concurrency,
) -> Result<BatchResult, BatchError> {
    let submitted = paths.len();
    info!(
        "Converting {submitted} image(s) to {} with {} worker(s)",
        options.format,
        concurrency.get()
    );

    let outcomes = run_pool(converter, jobs_for(paths, options), concurrency)?;
    let result = BatchResult::from_outcomes(outcomes);

    info!(
        "Batch finished: {} converted, {} failed",
        result.succeeded.len(),
        result.failures.len()
    );
    Ok(result)
}

fn into_outputs(result: BatchResult) -> Result<Vec<PathBuf>, BatchError> {
    if result.failures.is_empty() {
        Ok(result.succeeded)
    } else {
        Err(BatchError::Partial(PartialFailure {
            succeeded: result.succeeded,
            failures: result.failures,
        }))
    }
}

/// Convert a single file without building a pool.
pub fn convert_one<C: ImageConverter + ?Sized>(
    converter: &C,
    path: &Path,
    options: &ConvertOptions,
) -> Result<PathBuf, BatchError> {
    let job = ConversionJob {
        source: path.to_path_buf(),
        options: *options,
    };
    let result = BatchResult::from_outcomes([run_job(converter, job)]);
    into_outputs(result).map(|mut outputs| outputs.remove(0))
}

/// Convert an explicit list of paths.
///
/// Returns every output path when all items convert. Otherwise returns
/// [`BatchError::Partial`], whose message joins each
/// `processing <path> failed: <cause>` with `"; "` and which still carries
/// the outputs that succeeded.
pub fn convert_many<C, I, P>(
    converter: &C,
    paths: I,
    options: &ConvertOptions,
    concurrency: Concurrency,
) -> Result<Vec<PathBuf>, BatchError>
where
    C: ImageConverter + ?Sized,
    I: IntoIterator<Item = P>,
    P: Into<PathBuf>,
{
    let paths: Vec<PathBuf> = paths.into_iter().map(Into::into).collect();
    if paths.is_empty() {
        return Ok(Vec::new());
    }
    into_outputs(run_batch(converter, paths, options, concurrency)?)
}

/// Convert paths given as a JSON array of strings.
///
/// A malformed payload fails before any conversion starts.
pub fn convert_serialized_list<C: ImageConverter + ?Sized>(
    converter: &C,
    payload: &str,
    options: &ConvertOptions,
    concurrency: Concurrency,
) -> Result<Vec<PathBuf>, BatchError> {
    let paths: Vec<PathBuf> = serde_json::from_str(payload)?;
    convert_many(converter, paths, options, concurrency)
}

fn record(summary: &mut DirectorySummary, outcome: ConversionOutcome) {
    summary.attempted += 1;
    match outcome {
        ConversionOutcome::Converted { .. } => summary.succeeded += 1,
        ConversionOutcome::Failed(failure) => {
            warn!("{failure}");
            summary.failures.push(failure);
        }
    }
}

/// Convert every eligible image under `dir`, one at a time on the calling
/// thread.
///
/// Candidates are converted as the walk finds them. A walk error aborts the
/// pass; conversion failures are logged and the pass continues.
pub fn convert_directory_sync<C: ImageConverter + ?Sized>(
    converter: &C,
    dir: &Path,
    recursive: bool,
    options: &ConvertOptions,
) -> Result<DirectorySummary, BatchError> {
    info!(
        "Converting {} ({}) to {}",
        dir.display(),
        if recursive { "recursive" } else { "flat" },
        options.format
    );

    let mut summary = DirectorySummary::default();
    for candidate in scan::candidates(dir, recursive)? {
        let job = ConversionJob {
            source: candidate?,
            options: *options,
        };
        record(&mut summary, run_job(converter, job));
    }

    info!(
        "{}: {} processed, {} converted",
        dir.display(),
        summary.attempted,
        summary.succeeded
    );
    Ok(summary)
}

/// Convert every eligible image under `dir` on a worker pool.
///
/// The full candidate list is collected first; an enumeration error aborts
/// before any conversion. Conversion failures are logged and listed in the
/// summary. Counting happens here, after the pool has joined.
pub fn convert_directory<C: ImageConverter + ?Sized>(
    converter: &C,
    dir: &Path,
    recursive: bool,
    options: &ConvertOptions,
    concurrency: Concurrency,
) -> Result<DirectorySummary, BatchError> {
    let paths = scan::enumerate(dir, recursive)?;
    info!("Found {} candidate(s) in {}", paths.len(), dir.display());

    let outcomes = run_pool(converter, jobs_for(paths, options), concurrency)?;

    let mut summary = DirectorySummary::default();
    for outcome in outcomes {
        record(&mut summary, outcome);
    }

    info!(
        "{}: {} processed, {} converted",
        dir.display(),
        summary.attempted,
        summary.succeeded
    );
    Ok(summary)
}
