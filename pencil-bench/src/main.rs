//! Command-line driver and benchmarks for pencil-core.

mod derivative_check;
mod matparser;
mod report;
mod test_problems;

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::{Args, Parser, Subcommand};
use pencil_core::SolverSettings;

use crate::report::{print_results_table, print_summary, run_case, BenchReport};

#[derive(Parser, Debug)]
#[command(name = "pencil-bench", about = "Nearest stable matrix pencil: driver and benchmarks")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    common: CommonArgs,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Solve random complex Gaussian pencils
    Random {
        /// Pencil size
        #[arg(long, default_value_t = 6)]
        n: usize,
        /// Number of pencils
        #[arg(long, default_value_t = 5)]
        count: usize,
        /// Seed of the first pencil; later pencils use seed + i
        #[arg(long, default_value_t = 12345)]
        seed: u64,
    },
    /// Solve a pencil stored in a MATLAB v5 .mat file
    Mat {
        file: PathBuf,
        /// Array holding the constant coefficient A
        #[arg(long, default_value = "A")]
        a_name: String,
        /// Array holding the linear coefficient B
        #[arg(long, default_value = "B")]
        b_name: String,
    },
    /// Solve the built-in synthetic pencils
    Suite,
    /// Finite-difference checks of the gradient and Hessian
    Check {
        #[arg(long, default_value_t = 4)]
        n: usize,
        #[arg(long, default_value_t = 1)]
        seed: u64,
        /// Random points to check at
        #[arg(long, default_value_t = 5)]
        points: usize,
    },
}

#[derive(Args, Debug)]
struct CommonArgs {
    /// Maximum outer iterations
    #[arg(long, global = true)]
    max_iter: Option<usize>,
    /// Riemannian gradient norm tolerance
    #[arg(long, global = true)]
    tol_grad: Option<f64>,
    /// Time limit per solve, in seconds
    #[arg(long, global = true)]
    time_limit: Option<f64>,
    /// 0 = silent, 1 = summaries, 2 = per-iteration rows, 3 = inner solver detail
    #[arg(short, long, global = true, default_value_t = 0)]
    verbosity: u8,
    /// Seed of the random initial point
    #[arg(long, global = true)]
    start_seed: Option<u64>,
    /// Write a JSON report to this path
    #[arg(long, global = true)]
    json: Option<PathBuf>,
}

impl CommonArgs {
    fn settings(&self) -> SolverSettings {
        let mut settings = SolverSettings::default().with_verbosity(self.verbosity);
        if let Some(max_iter) = self.max_iter {
            settings = settings.with_max_iter(max_iter);
        }
        if let Some(tol) = self.tol_grad {
            settings = settings.with_tol_grad(tol);
        }
        if let Some(seconds) = self.time_limit {
            settings = settings.with_time_limit(seconds);
        }
        if let Some(seed) = self.start_seed {
            settings = settings.with_seed(seed);
        }
        settings
    }

    fn log_level(&self) -> log::LevelFilter {
        match self.verbosity {
            0 => log::LevelFilter::Warn,
            1 | 2 => log::LevelFilter::Info,
            _ => log::LevelFilter::Debug,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    env_logger::Builder::new()
        .filter_level(cli.common.log_level())
        .parse_default_env()
        .init();

    let settings = cli.common.settings();
    settings.validate()?;

    match &cli.command {
        Command::Random { n, count, seed } => {
            if *n == 0 {
                bail!("--n must be positive");
            }
            let records: Vec<_> = (0..*count as u64)
                .map(|i| {
                    let name = format!("RANDOM_{}_{}", n, seed + i);
                    let pencil = test_problems::random_pencil(*n, seed + i);
                    run_case(&name, &pencil, &settings)
                })
                .collect();
            finish(records, cli.common.json.as_ref())
        }
        Command::Mat { file, a_name, b_name } => {
            let loaded = matparser::parse_mat(file, a_name, b_name)?;
            log::info!("loaded {} (n={}) from {}", loaded.name, loaded.pencil.dim(), file.display());
            let record = run_case(&loaded.name, &loaded.pencil, &settings);
            finish(vec![record], cli.common.json.as_ref())
        }
        Command::Suite => {
            let records = test_problems::synthetic_test_pencils()
                .iter()
                .map(|tp| run_case(tp.name, &(tp.builder)(), &settings))
                .collect();
            finish(records, cli.common.json.as_ref())
        }
        Command::Check { n, seed, points } => {
            if *n == 0 {
                bail!("--n must be positive");
            }
            let pencil = test_problems::random_pencil(*n, *seed);
            let records = derivative_check::run_checks(&pencil, *points, seed.wrapping_add(1));
            derivative_check::print_check_table(&records);

            if let Some(path) = &cli.common.json {
                let file = std::fs::File::create(path)?;
                serde_json::to_writer_pretty(std::io::BufWriter::new(file), &records)?;
                println!("\nWrote {}", path.display());
            }
            let failed = records.iter().filter(|r| !r.passed).count();
            if failed > 0 {
                bail!("{} of {} derivative checks failed", failed, records.len());
            }
            Ok(())
        }
    }
}

fn finish(records: Vec<report::RunRecord>, json: Option<&PathBuf>) -> Result<()> {
    print_results_table(&records);
    let report = BenchReport::new(records);
    print_summary(&report.summary);
    if let Some(path) = json {
        report.save_json(path)?;
        println!("Wrote {}", path.display());
    }
    Ok(())
}
