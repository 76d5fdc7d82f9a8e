//! Dual simplex.
//!
//! Restores primal feasibility of a tableau whose right-hand side has
//! gone negative, e.g. after a Gomory cut or an out-of-range edit. The
//! leaving row is the most negative right-hand side; the entering
//! column minimizes `|obj entry / pivot candidate|` over the negative
//! entries of that row, which keeps the objective row non-negative.

use crate::config::SolverConfig;
use crate::error::SolverError;
use crate::model::Model;
use crate::primal::{self, PrimalOutcome};
use crate::solution::{Solution, SolveReport, SolveStatus};
use crate::standard::standardize;
use crate::tableau::Tableau;
use crate::trace::Trace;

/// Outcome of a dual run over an existing tableau.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DualOutcome {
    /// All right-hand sides are non-negative
    Feasible,
    Infeasible,
    IterationLimit,
}

fn leaving_row(tableau: &Tableau, eps: f64) -> Option<usize> {
    match tableau.most_negative_rhs() {
        Some((row, rhs)) if rhs < -eps => Some(row),
        _ => None,
    }
}

fn entering_column(tableau: &Tableau, row: usize, eps: f64) -> Option<usize> {
    let obj = tableau.objective_row();
    let mut best: Option<(usize, f64)> = None;
    for j in 0..tableau.num_cols() {
        let entry = tableau.get(row, j);
        if entry < -eps {
            let ratio = (tableau.get(obj, j) / entry).abs();
            if best.map_or(true, |(_, r)| ratio < r) {
                best = Some((j, ratio));
            }
        }
    }
    best.map(|(j, _)| j)
}

/// Iterate until the right-hand side is non-negative.
pub fn run(tableau: &mut Tableau, trace: &mut Trace, config: &SolverConfig) -> DualOutcome {
    for iteration in 0..config.max_simplex_iterations {
        let Some(row) = leaving_row(tableau, config.eps) else {
            trace.push(format!("dual: feasible after {iteration} pivots"));
            return DualOutcome::Feasible;
        };
        let Some(col) = entering_column(tableau, row, config.eps) else {
            trace.push(format!(
                "dual: row {} has no negative entry, infeasible",
                row + 1
            ));
            return DualOutcome::Infeasible;
        };
        let leaving = tableau.basis()[row];
        tableau.pivot(row, col);
        tableau.set_basis(row, col);
        trace.push(format!(
            "dual pivot {}: {} enters, {} leaves (row {}, col {})",
            iteration + 1,
            tableau.col_name(col),
            tableau.col_name(leaving),
            row + 1,
            col + 1
        ));
    }
    trace.push(format!(
        "dual: iteration cap {} reached",
        config.max_simplex_iterations
    ));
    DualOutcome::IterationLimit
}

/// Solve a `<=`-form model: dual simplex to feasibility, then the
/// primal to optimality.
pub fn solve(model: &Model, config: &SolverConfig) -> Result<SolveReport, SolverError> {
    let std = standardize(model)?;
    let mut tableau = Tableau::from_standard(&std, config);
    let mut trace = Trace::new();
    log::info!(
        "dual simplex: {} rows, {} structural columns",
        std.num_rows(),
        std.num_cols()
    );

    let solution = match run(&mut tableau, &mut trace, config) {
        DualOutcome::Infeasible => Solution::infeasible(),
        DualOutcome::IterationLimit => {
            primal::capped_solution(SolveStatus::IterationLimit, &std, &tableau)
        }
        DualOutcome::Feasible => {
            trace.push("dual: handing feasible tableau to the primal simplex");
            match primal::run(&mut tableau, &mut trace, config) {
                PrimalOutcome::Optimal => primal::extract_solution(&std, &tableau),
                PrimalOutcome::Unbounded => Solution::unbounded(),
                PrimalOutcome::IterationLimit => {
                    primal::capped_solution(SolveStatus::IterationLimit, &std, &tableau)
                }
            }
        }
    };
    Ok(SolveReport { solution, trace })
}
