//! Run records, summary statistics and JSON reports.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use anyhow::{Context, Result};
use pencil_core::{Pencil, PencilError, SolveStatus, SolverSettings};
use serde::{Deserialize, Serialize};

/// Outcome of solving one pencil.
///
/// Numeric fields are zero when `error` is set; JSON has no NaN.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRecord {
    /// Problem name
    pub name: String,
    /// Pencil size
    pub n: usize,
    /// Solve status, as displayed by [`SolveStatus`]
    pub status: String,
    /// Outer trust-region iterations
    pub iterations: usize,
    /// Truncated-CG iterations
    pub inner_iterations: usize,
    /// `‖A − PA‖² + ‖B − PB‖²`
    pub cost: f64,
    /// Distance relative to `‖[A|B]‖_F`
    pub rel_distance: f64,
    /// Final Riemannian gradient norm (scaled units)
    pub grad_norm: f64,
    /// Diagonal indices moved by the projection
    pub moved: usize,
    /// Largest finite eigenvalue modulus of the nearest pencil
    pub max_modulus: Option<f64>,
    /// Solve time in milliseconds
    pub solve_time_ms: f64,
    /// Error message if any
    pub error: Option<String>,
}

impl RunRecord {
    fn failed(name: &str, n: usize, status: &str, error: String, solve_time_ms: f64) -> Self {
        Self {
            name: name.to_string(),
            n,
            status: status.to_string(),
            iterations: 0,
            inner_iterations: 0,
            cost: 0.0,
            rel_distance: 0.0,
            grad_norm: 0.0,
            moved: 0,
            max_modulus: None,
            solve_time_ms,
            error: Some(error),
        }
    }

    pub fn is_converged(&self) -> bool {
        self.error.is_none() && self.status == SolveStatus::Converged.to_string()
    }
}

/// Solve one pencil and record the outcome.
pub fn run_case(name: &str, pencil: &Pencil, settings: &SolverSettings) -> RunRecord {
    let n = pencil.dim();
    let start = std::time::Instant::now();
    let outcome = pencil_core::solve(pencil, settings);
    let solve_time_ms = start.elapsed().as_secs_f64() * 1000.0;

    let res = match outcome {
        Ok(res) => res,
        Err(PencilError::Inconsistent { report, result }) => {
            log::warn!("{}: solver cost and reassembled distance disagree", name);
            return RunRecord::failed(
                name,
                n,
                &result.status.to_string(),
                format!("consistency gap {:.3e} > {:.1e}", report.gap, report.tolerance),
                solve_time_ms,
            );
        }
        Err(e) => return RunRecord::failed(name, n, "Error", e.to_string(), solve_time_ms),
    };

    let norm = pencil.frobenius_norm();
    let max_modulus = res
        .finite_eigenvalues()
        .iter()
        .map(|z| z.norm())
        .fold(None, |acc: Option<f64>, r| Some(acc.map_or(r, |m| m.max(r))));

    RunRecord {
        name: name.to_string(),
        n,
        status: res.status.to_string(),
        iterations: res.info.iters,
        inner_iterations: res.info.inner_iters,
        cost: res.cost,
        rel_distance: if norm > 0.0 { res.distance / norm } else { 0.0 },
        grad_norm: res.info.grad_norm,
        moved: res.info.unstable_count,
        max_modulus,
        solve_time_ms,
        error: None,
    }
}

/// Summary statistics for a batch of runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub total: usize,
    pub converged: usize,
    pub errors: usize,
    pub total_time_s: f64,
    /// Shifted geometric mean of solve times over error-free runs
    pub geom_mean_time_ms: f64,
    /// Geometric mean of outer iterations over converged runs
    pub geom_mean_iters: f64,
}

pub fn compute_summary(records: &[RunRecord]) -> RunSummary {
    let mut converged = 0;
    let mut errors = 0;
    let mut total_time_s = 0.0;
    let mut iter_log_sum = 0.0;
    let mut iter_count = 0;
    let mut times = Vec::new();

    for r in records {
        total_time_s += r.solve_time_ms / 1000.0;
        if r.error.is_some() {
            errors += 1;
            continue;
        }
        times.push(r.solve_time_ms);
        if r.is_converged() {
            converged += 1;
            if r.iterations > 0 {
                iter_log_sum += (r.iterations as f64).ln();
                iter_count += 1;
            }
        }
    }

    let geom_mean_iters = if iter_count > 0 {
        (iter_log_sum / iter_count as f64).exp()
    } else {
        0.0
    };

    RunSummary {
        total: records.len(),
        converged,
        errors,
        total_time_s,
        geom_mean_time_ms: shifted_geom_mean(&times),
        geom_mean_iters,
    }
}

/// Shifted geometric mean, `exp(mean(ln(t + 1))) − 1`.
fn shifted_geom_mean(times: &[f64]) -> f64 {
    if times.is_empty() {
        return 0.0;
    }
    let log_sum: f64 = times.iter().map(|&t| (t + 1.0).ln()).sum();
    (log_sum / times.len() as f64).exp() - 1.0
}

/// Records plus their summary, as written by `--json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchReport {
    pub records: Vec<RunRecord>,
    pub summary: RunSummary,
}

impl BenchReport {
    pub fn new(records: Vec<RunRecord>) -> Self {
        let summary = compute_summary(&records);
        Self { records, summary }
    }

    /// Save to JSON file
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path.as_ref())
            .with_context(|| format!("Failed to create file {}", path.as_ref().display()))?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)
            .with_context(|| format!("Failed to write JSON to {}", path.as_ref().display()))?;
        Ok(())
    }
}

pub fn print_results_table(records: &[RunRecord]) {
    println!(
        "\n{:<18} {:>4} {:>15} {:>6} {:>7} {:>12} {:>10} {:>6} {:>9} {:>10}",
        "Problem", "n", "Status", "Iters", "Inner", "Cost", "RelDist", "Moved", "max|λ|", "Time(ms)"
    );
    println!("{}", "-".repeat(108));

    for r in records {
        if let Some(err) = &r.error {
            println!("{:<18} {:>4} {:>15}  {}", r.name, r.n, "Error", err);
            continue;
        }
        let modulus = r.max_modulus.map_or_else(|| "-".to_string(), |m| format!("{:.6}", m));
        println!(
            "{:<18} {:>4} {:>15} {:>6} {:>7} {:>12.4e} {:>10.3e} {:>6} {:>9} {:>10.1}",
            r.name,
            r.n,
            r.status,
            r.iterations,
            r.inner_iterations,
            r.cost,
            r.rel_distance,
            r.moved,
            modulus,
            r.solve_time_ms
        );
    }
}

pub fn print_summary(summary: &RunSummary) {
    println!("\n{}", "=".repeat(60));
    println!("Total:              {}", summary.total);
    println!("Converged:          {}", summary.converged);
    println!("Errors:             {}", summary.errors);
    println!("Total time:         {:.3} s", summary.total_time_s);
    println!("Geom mean time:     {:.2} ms", summary.geom_mean_time_ms);
    println!("Geom mean iters:    {:.1}", summary.geom_mean_iters);
    println!("{}", "=".repeat(60));
}
