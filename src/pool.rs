//! Batched worker pool.
//!
//! Files are taken in batches of at most the configured parallelism; each
//! batch fans out onto scoped OS threads, one self-contained job per
//! thread, and the dispatcher joins the whole batch before admitting the
//! next. Jobs share nothing mutable, so completion order inside a batch is
//! unobservable; outcomes are handed back in input order.
use std::path::PathBuf;

use tracing::debug;

use crate::config::ConvertConfig;
use crate::report::{JobLog, JobOutcome, RunTotals};

/// Degree of parallelism: detected hardware threads, floor 2.
pub fn detected_parallelism() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(2)
        .max(2)
}

/// Convert every file in `files`, at most `parallelism` at a time.
///
/// `on_batch` runs on the dispatcher thread after each batch joins, with
/// that batch's outcomes in input order; that is the place to write stdout
/// lines and log paragraphs without mutual exclusion. Returns the aggregate
/// counters. Per-job failures are data, not control flow: the run always
/// visits every file.
pub fn convert_all<F>(
    files: &[PathBuf],
    cfg: &ConvertConfig,
    parallelism: usize,
    mut on_batch: F,
) -> RunTotals
where
    F: FnMut(&[JobOutcome]),
{
    let batch_size = parallelism.max(1);
    let mut totals = RunTotals::default();

    for batch in files.chunks(batch_size) {
        debug!(files = batch.len(), "starting conversion batch");

        let outcomes: Vec<JobOutcome> = std::thread::scope(|scope| {
            let handles: Vec<_> = batch
                .iter()
                .map(|path| {
                    scope.spawn(move || {
                        let mut log = JobLog::new();
                        let result = crate::convert_file(path, cfg, &mut log);
                        JobOutcome {
                            path: path.clone(),
                            result,
                            log,
                        }
                    })
                })
                .collect();

            handles
                .into_iter()
                .map(|h| match h.join() {
                    Ok(outcome) => outcome,
                    // A panicking job is a bug in the pipeline, not a
                    // per-file failure; surface it on the dispatcher.
                    Err(payload) => std::panic::resume_unwind(payload),
                })
                .collect()
        });

        for outcome in &outcomes {
            totals.record(outcome);
        }
        on_batch(&outcomes);
    }
    totals
}
