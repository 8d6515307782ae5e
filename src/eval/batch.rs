//! Batch processing of a file list under one pipeline.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use log::info;
use rayon::prelude::*;

use crate::error::{Error, Result};
use crate::eval::processor::process_file;
use crate::eval::report::AnalyzeResult;
use crate::metrics::MetricConfig;
use crate::pipeline::Pipeline;

/// Receives progress events from a running batch.
///
/// Callbacks run on worker threads, possibly concurrently.
pub trait BatchObserver: Send + Sync {
    /// A strategy is about to process `files` files.
    fn on_batch_start(&self, _strategy: &str, _files: usize) {}

    /// One file finished successfully.
    fn on_file_done(&self, _strategy: &str, _result: &AnalyzeResult) {}
}

/// Observer that ignores every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl BatchObserver for NoopObserver {}

/// Reject file lists where two sources would share a destination.
///
/// Outputs keep the source's base name and may change extension, so any two
/// sources with the same file stem can land on one path.
pub fn check_destinations(files: &[PathBuf]) -> Result<()> {
    let mut seen: HashMap<&std::ffi::OsStr, &Path> = HashMap::new();
    for source in files {
        let Some(stem) = source.file_stem() else {
            continue;
        };
        if let Some(first) = seen.insert(stem, source) {
            return Err(Error::Configuration(format!(
                "{} and {} would write the same output file",
                first.display(),
                source.display()
            )));
        }
    }
    Ok(())
}

/// Process every file with `pipeline`, writing into `output_dir`.
///
/// Files are processed in parallel on the current rayon pool. Results come
/// back in the order of `files`. The first failure fails the whole batch.
/// Colliding destinations are rejected before anything is written.
pub fn run_batch(
    strategy: &str,
    files: &[PathBuf],
    output_dir: &Path,
    pipeline: &Pipeline,
    metrics: &MetricConfig,
    observer: &dyn BatchObserver,
) -> Result<Vec<AnalyzeResult>> {
    info!(
        "{strategy}: processing {} files with {:?} into {}",
        files.len(),
        pipeline.stage_names(),
        output_dir.display()
    );
    check_destinations(files)?;
    observer.on_batch_start(strategy, files.len());

    let results = files
        .par_iter()
        .map(|source| {
            let result = process_file(source, output_dir, pipeline, metrics)?;
            observer.on_file_done(strategy, &result);
            Ok(result)
        })
        .collect::<Result<Vec<_>>>()?;

    info!("{strategy}: done, {} files", results.len());
    Ok(results)
}
