//! # imgopt-eval
//!
//! Image optimization benchmarking library.
//!
//! Runs named compression strategies over a set of JPEG/WebP files, keeps
//! each result only when it is strictly smaller than the input, measures how
//! much structural similarity was lost, and compares the strategies by total
//! size and average similarity.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use imgopt_eval::{BenchConfig, BenchSession, Pipeline, StageSpec};
//!
//! let config = BenchConfig::builder().output_dir("./out").build()?;
//!
//! let mut session = BenchSession::new(config);
//! session.add_strategy("jpeg", Pipeline::from_specs(&[StageSpec::Jpeg { quality: 84 }])?);
//! session.add_strategy("webp", Pipeline::from_specs(&[StageSpec::Webp { quality: 80 }])?);
//!
//! let report = session.run(&["images/*.jpg"])?;
//! for comparison in report.comparisons()? {
//!     println!("smaller: {}, better: {}", comparison.size.winner, comparison.quality.winner);
//! }
//! ```
//!
//! ## Modules
//!
//! - [`error`]: Error types for the library
//! - [`buffer`]: Encoded buffers and format sniffing
//! - [`decode`]: Decoding to RGBA bitmaps
//! - [`metrics`]: Similarity metrics (SSIM, DSSIM, PSNR)
//! - [`pipeline`]: Transform stages, pipelines and the size guard
//! - [`discovery`]: Input pattern expansion
//! - [`eval`]: File processing, batches, sessions and reports
//! - [`stats`]: Aggregation and strategy comparison
//! - [`config`]: Run configuration files

pub mod buffer;
pub mod config;
pub mod decode;
pub mod discovery;
pub mod error;
pub mod eval;
pub mod metrics;
pub mod pipeline;
pub mod stats;

#[cfg(test)]
pub(crate) mod fixtures;

// Re-export commonly used types
pub use buffer::{ImageBuffer, ImageFormat};
pub use config::{RunConfig, StrategySpec, default_strategies};
pub use decode::{PixelBitmap, decode};
pub use error::{Error, Result};
pub use eval::{
    AnalyzeResult, BatchObserver, BenchConfig, BenchReport, BenchSession, NoopObserver,
    analyze::Analysis,
};
pub use metrics::{MetricConfig, MetricScores, PerceptionLevel};
pub use pipeline::{Pipeline, StageSpec, Transform, TransformFn, keep_smaller};
pub use stats::{AggregateStats, StrategyComparison, Summary};
