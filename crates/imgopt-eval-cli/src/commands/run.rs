//! Run command.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use imgopt_eval::{AnalyzeResult, BatchObserver, RunConfig, StrategySpec};

use super::summary::print_report;

pub struct RunArgs {
    pub input: Vec<String>,
    pub output: Option<PathBuf>,
    pub strategies: Vec<String>,
    pub config: Option<PathBuf>,
    pub threads: Option<usize>,
    pub dssim: bool,
    pub psnr: bool,
}

/// Prints one line per finished file.
struct ConsoleObserver;

impl BatchObserver for ConsoleObserver {
    fn on_file_done(&self, strategy: &str, result: &AnalyzeResult) {
        let a = &result.analysis;
        if result.optimized {
            println!(
                "[{strategy}] {}: saved {:.1}% ({} -> {} bytes), ssim {:.4}",
                result.dest_name(),
                a.percent,
                a.original_size,
                a.optimized_size,
                a.ssim
            );
        } else {
            println!("[{strategy}] {}: already optimized", result.dest_name());
        }
    }
}

pub fn run(args: RunArgs) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => RunConfig::load(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => RunConfig::default(),
    };

    if !args.input.is_empty() {
        config.input = args.input;
    }
    if args.output.is_some() {
        config.output = args.output;
    }
    if args.threads.is_some() {
        config.threads = args.threads;
    }
    if args.dssim || args.psnr {
        let mut metrics = config.metrics.unwrap_or_default();
        metrics.dssim |= args.dssim;
        metrics.psnr |= args.psnr;
        config.metrics = Some(metrics);
    }
    if !args.strategies.is_empty() {
        config.strategies = args
            .strategies
            .iter()
            .map(|s| StrategySpec::parse(s))
            .collect::<imgopt_eval::Result<Vec<_>>>()
            .context("Invalid --strategy")?;
    }

    if config.input.is_empty() {
        bail!("No input patterns given (use --input or a config file)");
    }

    let mut session = config.session().context("Invalid configuration")?;
    session.set_observer(Box::new(ConsoleObserver));

    let report = session.run(&config.input)?;

    println!();
    print_report(&report, false)?;
    println!();
    println!(
        "Report written to {}",
        session
            .config()
            .output_dir
            .join(format!("{}.json", session.config().report_name))
            .display()
    );

    Ok(())
}
