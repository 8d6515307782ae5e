//! Benchmark session running named strategies over one input set.
//!
//! [`BenchSession`] is the main entry point: register one [`Pipeline`] per
//! strategy, then [`BenchSession::run`] expands the input patterns, processes
//! every file under every strategy and writes the report.

use std::collections::HashSet;
use std::path::PathBuf;

use log::info;
use rayon::prelude::*;

use crate::discovery::expand_patterns;
use crate::error::{Error, Result};
use crate::eval::batch::{BatchObserver, NoopObserver, check_destinations, run_batch};
use crate::eval::report::BenchReport;
use crate::metrics::MetricConfig;
use crate::pipeline::Pipeline;

/// Configuration for a benchmark session.
#[derive(Debug, Clone)]
pub struct BenchConfig {
    /// Root output directory. Each strategy writes into a subdirectory named
    /// after it; the report lands here.
    pub output_dir: PathBuf,

    /// Worker threads; 0 lets rayon choose.
    pub threads: usize,

    /// Which metrics to calculate besides SSIM.
    pub metrics: MetricConfig,

    /// Report base name, without extension.
    pub report_name: String,
}

impl BenchConfig {
    /// Create a new configuration builder.
    #[must_use]
    pub fn builder() -> BenchConfigBuilder {
        BenchConfigBuilder::default()
    }
}

/// Builder for [`BenchConfig`].
#[derive(Debug, Default)]
pub struct BenchConfigBuilder {
    output_dir: Option<PathBuf>,
    threads: Option<usize>,
    metrics: Option<MetricConfig>,
    report_name: Option<String>,
}

impl BenchConfigBuilder {
    /// Set the output directory.
    #[must_use]
    pub fn output_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(path.into());
        self
    }

    /// Set the number of worker threads.
    #[must_use]
    pub fn threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads);
        self
    }

    /// Set which metrics to calculate.
    #[must_use]
    pub fn metrics(mut self, metrics: MetricConfig) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Set the report base name.
    #[must_use]
    pub fn report_name(mut self, name: impl Into<String>) -> Self {
        self.report_name = Some(name.into());
        self
    }

    /// Build the configuration.
    ///
    /// Fails if `output_dir` is not set or the report name is empty.
    pub fn build(self) -> Result<BenchConfig> {
        let output_dir = self
            .output_dir
            .ok_or_else(|| Error::Configuration("output_dir is required".to_string()))?;

        let report_name = self.report_name.unwrap_or_else(|| "result".to_string());
        if report_name.trim().is_empty() {
            return Err(Error::Configuration("report name must not be empty".to_string()));
        }

        Ok(BenchConfig {
            output_dir,
            threads: self.threads.unwrap_or(0),
            metrics: self.metrics.unwrap_or_default(),
            report_name,
        })
    }
}

struct Strategy {
    name: String,
    pipeline: Pipeline,
}

/// Benchmark session.
///
/// # Example
///
/// ```rust,ignore
/// use imgopt_eval::{BenchConfig, BenchSession, Pipeline, StageSpec};
///
/// let config = BenchConfig::builder().output_dir("./out").build()?;
/// let mut session = BenchSession::new(config);
/// session.add_strategy("jpeg", Pipeline::from_specs(&[StageSpec::Jpeg { quality: 84 }])?);
/// session.add_strategy("webp", Pipeline::from_specs(&[StageSpec::Webp { quality: 80 }])?);
///
/// let report = session.run(&["images/*.jpg"])?;
/// ```
pub struct BenchSession {
    config: BenchConfig,
    strategies: Vec<Strategy>,
    observer: Box<dyn BatchObserver>,
}

impl BenchSession {
    /// Create a session with no strategies.
    #[must_use]
    pub fn new(config: BenchConfig) -> Self {
        Self {
            config,
            strategies: Vec::new(),
            observer: Box::new(NoopObserver),
        }
    }

    /// Session configuration.
    #[must_use]
    pub fn config(&self) -> &BenchConfig {
        &self.config
    }

    /// Register a strategy. The first registered strategy is the baseline.
    pub fn add_strategy(&mut self, name: impl Into<String>, pipeline: Pipeline) -> &mut Self {
        self.strategies.push(Strategy {
            name: name.into(),
            pipeline,
        });
        self
    }

    /// Receive progress events during [`BenchSession::run`].
    pub fn set_observer(&mut self, observer: Box<dyn BatchObserver>) -> &mut Self {
        self.observer = observer;
        self
    }

    /// Registered strategy names, in order.
    #[must_use]
    pub fn strategy_names(&self) -> Vec<&str> {
        self.strategies.iter().map(|s| s.name.as_str()).collect()
    }

    /// Check the strategy set without touching the filesystem.
    pub fn validate(&self) -> Result<()> {
        if self.strategies.is_empty() {
            return Err(Error::Configuration("no strategies configured".to_string()));
        }

        let mut seen = HashSet::new();
        for strategy in &self.strategies {
            let name = strategy.name.as_str();
            if name.trim().is_empty() {
                return Err(Error::Configuration("strategy name must not be empty".to_string()));
            }
            if name == "." || name == ".." || name.contains(['/', '\\']) {
                return Err(Error::Configuration(format!(
                    "strategy name `{name}` cannot be used as a directory name"
                )));
            }
            if !seen.insert(name) {
                return Err(Error::Configuration(format!("duplicate strategy `{name}`")));
            }
        }

        Ok(())
    }

    /// Process every file matched by `patterns` under every strategy.
    ///
    /// Strategies run concurrently on one bounded pool. On success the report
    /// is written to the output directory and returned. If any file fails
    /// under any strategy, the run fails and no report is written.
    pub fn run<S: AsRef<str>>(&self, patterns: &[S]) -> Result<BenchReport> {
        self.validate()?;

        let files = expand_patterns(patterns)?;
        check_destinations(&files)?;
        info!(
            "{} files, strategies {:?}",
            files.len(),
            self.strategy_names()
        );

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.threads)
            .build()
            .map_err(|e| Error::Configuration(format!("failed to build thread pool: {e}")))?;

        let observer = self.observer.as_ref();
        let results = pool.install(|| {
            self.strategies
                .par_iter()
                .map(|strategy| {
                    let output_dir = self.config.output_dir.join(&strategy.name);
                    run_batch(
                        &strategy.name,
                        &files,
                        &output_dir,
                        &strategy.pipeline,
                        &self.config.metrics,
                        observer,
                    )
                    .map(|results| (strategy.name.clone(), results))
                })
                .collect::<Result<Vec<_>>>()
        })?;

        let report = BenchReport::from_results(results);
        let path = report.write(&self.config.output_dir, &self.config.report_name)?;
        info!("report written to {}", path.display());

        Ok(report)
    }
}

impl std::fmt::Debug for BenchSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BenchSession")
            .field("config", &self.config)
            .field("strategies", &self.strategy_names())
            .finish_non_exhaustive()
    }
}
