//! Benchmark execution and report generation.
//!
//! - [`analyze`]: size and similarity of an original/optimized pair
//! - [`processor`]: one file from read to write
//! - [`batch`]: a file list under one pipeline, with progress observation
//! - [`session::BenchSession`]: named strategies over one input set
//! - [`report`]: report types, JSON and CSV output

pub mod analyze;
pub mod batch;
pub mod processor;
pub mod report;
pub mod session;

pub use analyze::{Analysis, analyze};
pub use batch::{BatchObserver, NoopObserver, run_batch};
pub use processor::{process_file, resolve_destination};
pub use report::{AnalyzeResult, BenchReport};
pub use session::{BenchConfig, BenchConfigBuilder, BenchSession};
