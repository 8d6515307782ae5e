//! Per-file processing: read, transform, guard, analyze, write.

use std::io::Write;
use std::path::{Path, PathBuf};

use log::debug;

use crate::buffer::{ImageBuffer, ImageFormat};
use crate::error::{Error, Result};
use crate::eval::analyze::analyze;
use crate::eval::report::AnalyzeResult;
use crate::metrics::MetricConfig;
use crate::pipeline::{Pipeline, keep_smaller};

/// Optimize one file into `output_dir` and report what happened.
///
/// Any failure is returned as [`Error::File`] carrying `source`'s path.
pub fn process_file(
    source: &Path,
    output_dir: &Path,
    pipeline: &Pipeline,
    metrics: &MetricConfig,
) -> Result<AnalyzeResult> {
    process_file_inner(source, output_dir, pipeline, metrics).map_err(|e| e.in_file(source))
}

fn process_file_inner(
    source: &Path,
    output_dir: &Path,
    pipeline: &Pipeline,
    metrics: &MetricConfig,
) -> Result<AnalyzeResult> {
    let original = ImageBuffer::new(std::fs::read(source)?);
    let candidate = pipeline.apply(&original)?;

    let kept = keep_smaller(&original, &candidate);
    debug!(
        "{}: original {} bytes, candidate {} bytes, kept {}",
        source.display(),
        original.len(),
        candidate.len(),
        if kept.optimized { "candidate" } else { "original" }
    );

    let analysis = analyze(&original, kept.buffer, metrics)?;

    let dest = resolve_destination(source, output_dir, kept.buffer.format())?;
    write_output(&dest, kept.buffer.as_bytes())?;

    Ok(AnalyzeResult {
        source: source.to_path_buf(),
        dest,
        format: kept.buffer.format(),
        optimized: kept.optimized,
        analysis,
    })
}

/// Destination for `source` inside `output_dir`.
///
/// Keeps the base name; when `format` is a known container whose extensions
/// don't include the source's, the extension is replaced with the
/// container's canonical one.
pub fn resolve_destination(source: &Path, output_dir: &Path, format: ImageFormat) -> Result<PathBuf> {
    let file_name = source.file_name().ok_or_else(|| {
        Error::Configuration(format!("input path has no file name: {}", source.display()))
    })?;

    let mut dest = output_dir.join(file_name);

    if let Some(canonical) = format.extension() {
        let current = dest.extension().and_then(|e| e.to_str()).unwrap_or("");
        if !format.matches_extension(current) {
            dest.set_extension(canonical);
        }
    }

    Ok(dest)
}

/// Write `bytes` to `dest`, creating parent directories.
///
/// Data goes to a temporary file in the destination directory which is then
/// renamed over `dest`, so an interrupted run never leaves a truncated file.
pub fn write_output(dest: &Path, bytes: &[u8]) -> Result<()> {
    let dir = match dest.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.persist(dest).map_err(|e| Error::Io(e.error))?;
    Ok(())
}
