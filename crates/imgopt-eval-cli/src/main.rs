//! imgopt-eval CLI - image optimization benchmark tool

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use log::LevelFilter;

mod commands;

/// Optimize images under competing strategies and compare the results.
#[derive(Parser)]
#[command(name = "imgopt-eval")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run strategies over a set of images and write a report
    Run {
        /// Input glob pattern (repeatable)
        #[arg(short, long)]
        input: Vec<String>,

        /// Output directory
        #[arg(short, long, env = "IMGOPT_OUTPUT")]
        output: Option<PathBuf>,

        /// Strategy as name=stage+stage, e.g. `webp=webp:80` (repeatable;
        /// the first one is the baseline)
        #[arg(short, long = "strategy")]
        strategies: Vec<String>,

        /// JSON run configuration; command-line flags override it
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Worker threads (0 = one per core)
        #[arg(short, long, env = "IMGOPT_THREADS")]
        threads: Option<usize>,

        /// Also compute DSSIM
        #[arg(long)]
        dssim: bool,

        /// Also compute PSNR
        #[arg(long)]
        psnr: bool,
    },

    /// Summarize a previously written report
    Summary {
        /// Report JSON file
        #[arg(short, long)]
        input: PathBuf,

        /// Show similarity and saving distributions
        #[arg(long)]
        distribution: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(if cli.verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        })
        .parse_default_env()
        .init();

    match cli.command {
        Commands::Run {
            input,
            output,
            strategies,
            config,
            threads,
            dssim,
            psnr,
        } => commands::run::run(commands::run::RunArgs {
            input,
            output,
            strategies,
            config,
            threads,
            dssim,
            psnr,
        }),
        Commands::Summary { input, distribution } => {
            commands::summary::run(input, distribution, cli.verbose)
        }
    }
}
