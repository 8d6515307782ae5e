//! Error types for imgopt-eval operations.

use std::path::PathBuf;
use thiserror::Error;

use crate::buffer::ImageFormat;

/// Result type alias for imgopt-eval operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while optimizing and evaluating images.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// Malformed configuration (strategy list, pattern list, stage spec).
    ///
    /// Raised before any file I/O happens.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The buffer's content does not match any supported image format.
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// The format was recognized but the content could not be decoded.
    #[error("Decode failed ({format}): {message}")]
    Decode {
        /// Sniffed format of the buffer.
        format: ImageFormat,
        /// Message from the decoder.
        message: String,
    },

    /// A pipeline stage failed.
    #[error("Transform stage #{index} ({stage}) failed: {message}")]
    Transform {
        /// Position of the stage in the pipeline.
        index: usize,
        /// Stage name.
        stage: String,
        /// Message from the stage.
        message: String,
    },

    /// Image dimensions don't match between reference and test images.
    #[error("Dimension mismatch: expected {expected:?}, got {actual:?}")]
    DimensionMismatch {
        /// Expected dimensions (width, height).
        expected: (usize, usize),
        /// Actual dimensions (width, height).
        actual: (usize, usize),
    },

    /// Failed to calculate a quality metric.
    #[error("Metric calculation failed: {metric}: {reason}")]
    MetricCalculation {
        /// Name of the metric that failed.
        metric: String,
        /// Reason for the failure.
        reason: String,
    },

    /// Failure while processing one file, annotated with its path.
    #[error("Error in file: {}\n\n{source}", path.display())]
    File {
        /// Source file that failed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: Box<Error>,
    },

    /// I/O error wrapper.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl Error {
    /// Wrap this error with the path of the file being processed.
    #[must_use]
    pub fn in_file(self, path: impl Into<PathBuf>) -> Self {
        Self::File {
            path: path.into(),
            source: Box::new(self),
        }
    }

    /// Path of the file that failed, if this error carries one.
    #[must_use]
    pub fn file_path(&self) -> Option<&std::path::Path> {
        match self {
            Self::File { path, .. } => Some(path),
            _ => None,
        }
    }

    /// The innermost error, skipping file annotations.
    #[must_use]
    pub fn root_cause(&self) -> &Self {
        match self {
            Self::File { source, .. } => source.root_cause(),
            other => other,
        }
    }
}
