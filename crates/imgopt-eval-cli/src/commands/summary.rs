//! Summary command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use imgopt_eval::stats::Summary;
use imgopt_eval::{AggregateStats, BenchReport, StrategyComparison};

pub fn run(input: PathBuf, distribution: bool, verbose: bool) -> Result<()> {
    if verbose {
        eprintln!("Loading report from: {}", input.display());
    }

    let report = BenchReport::load(&input)
        .with_context(|| format!("Failed to load report: {}", input.display()))?;

    println!("Report from {}", report.timestamp.to_rfc3339());
    println!();
    print_report(&report, distribution)
}

/// Per-strategy totals followed by verdicts against the baseline.
pub fn print_report(report: &BenchReport, distribution: bool) -> Result<()> {
    println!("Totals:");
    println!("{:-<78}", "");
    println!(
        "{:<15} {:>6} {:>12} {:>12} {:>12} {:>8} {:>8}",
        "Strategy", "Files", "Original", "Optimized", "Saved", "Saved%", "SSIM"
    );
    println!("{:-<78}", "");

    for strategy in &report.strategies {
        match report.aggregate(strategy)? {
            Some(total) => print_totals(strategy, total),
            None => println!("{strategy:<15} {:>6}", 0),
        }
    }

    if distribution {
        for strategy in &report.strategies {
            println!();
            print_distribution(strategy, report)?;
        }
    }

    let comparisons = report.comparisons()?;
    if !comparisons.is_empty() {
        println!();
        println!("Comparison:");
        println!("{:-<78}", "");
        for comparison in &comparisons {
            print_comparison(comparison);
        }
    }

    Ok(())
}

fn print_totals(strategy: &str, total: &AggregateStats) {
    println!(
        "{:<15} {:>6} {:>12} {:>12} {:>12} {:>7.2}% {:>8.4}",
        strategy,
        total.file_count,
        total.total_original_size,
        total.total_optimized_size,
        total.total_saved,
        total.average_percent_saved,
        total.average_similarity
    );
    if let Some(dssim) = total.average_dssim {
        println!("{:<15} avg DSSIM {:.6}", "", dssim);
    }
}

fn print_distribution(strategy: &str, report: &BenchReport) -> Result<()> {
    let results = report.results(strategy)?;
    println!("{strategy}:");

    let ssim: Vec<f64> = results.iter().map(|r| r.analysis.ssim).collect();
    if let Some(summary) = Summary::compute(&ssim) {
        println!("  SSIM:");
        println!("    Mean: {:.4}, Median: {:.4}", summary.mean, summary.median);
        println!("    Min: {:.4}, Max: {:.4}", summary.min, summary.max);
        println!("    P5: {:.4}, P95: {:.4}", summary.p5, summary.p95);
    }

    let saved: Vec<f64> = results.iter().map(|r| r.analysis.percent).collect();
    if let Some(summary) = Summary::compute(&saved) {
        println!("  Saved (%):");
        println!("    Mean: {:.2}, Median: {:.2}", summary.mean, summary.median);
        println!("    Min: {:.2}, Max: {:.2}", summary.min, summary.max);
        println!("    StdDev: {:.2}", summary.std_dev);
    }

    if ssim.is_empty() {
        println!("  no files");
    }

    Ok(())
}

fn print_comparison(comparison: &StrategyComparison) {
    let size = &comparison.size;
    println!(
        "Smaller: {} is {} bytes ({:.2}%) smaller than {}",
        size.winner, size.bytes, size.percent, size.runner_up
    );

    let quality = &comparison.quality;
    println!(
        "Better quality: {} is {:.6} ({:.2}%) more similar than {}",
        quality.winner, quality.similarity, quality.percent, quality.runner_up
    );
}
