//! Primal simplex with Dantzig pricing.

use crate::config::SolverConfig;
use crate::error::SolverError;
use crate::model::Model;
use crate::solution::{Solution, SolveReport, SolveStatus};
use crate::standard::{standardize, StandardModel};
use crate::tableau::Tableau;
use crate::trace::Trace;

/// Outcome of a primal run over an existing tableau.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimalOutcome {
    Optimal,
    Unbounded,
    IterationLimit,
}

/// Entering column: most negative objective-row entry below `-eps`.
/// Ties keep the smaller column index.
fn entering_column(tableau: &Tableau, eps: f64) -> Option<usize> {
    let obj = tableau.objective_row();
    let mut best: Option<(usize, f64)> = None;
    for j in 0..tableau.num_cols() {
        let value = tableau.get(obj, j);
        if value < -eps && best.map_or(true, |(_, v)| value < v) {
            best = Some((j, value));
        }
    }
    best.map(|(j, _)| j)
}

/// Leaving row: minimum ratio `rhs / entry` over rows with a positive
/// entry in the entering column. Ties keep the smaller row index.
fn leaving_row(tableau: &Tableau, col: usize, eps: f64) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for i in 0..tableau.num_rows() {
        let entry = tableau.get(i, col);
        if entry > eps {
            let ratio = tableau.rhs(i) / entry;
            if best.map_or(true, |(_, r)| ratio < r) {
                best = Some((i, ratio));
            }
        }
    }
    best.map(|(i, _)| i)
}

/// Iterate to optimality, recording one trace entry per pivot.
pub fn run(tableau: &mut Tableau, trace: &mut Trace, config: &SolverConfig) -> PrimalOutcome {
    for iteration in 0..config.max_simplex_iterations {
        let Some(col) = entering_column(tableau, config.eps) else {
            trace.push(format!(
                "primal: optimal after {iteration} pivots, z = {:.6}",
                tableau.z()
            ));
            return PrimalOutcome::Optimal;
        };
        let Some(row) = leaving_row(tableau, col, config.eps) else {
            trace.push(format!(
                "primal: column {} has no positive entry, unbounded",
                tableau.col_name(col)
            ));
            return PrimalOutcome::Unbounded;
        };
        let leaving = tableau.basis()[row];
        tableau.pivot(row, col);
        tableau.set_basis(row, col);
        trace.push(format!(
            "primal pivot {}: {} enters, {} leaves (row {}, col {})",
            iteration + 1,
            tableau.col_name(col),
            tableau.col_name(leaving),
            row + 1,
            col + 1
        ));
    }
    trace.push(format!(
        "primal: iteration cap {} reached",
        config.max_simplex_iterations
    ));
    PrimalOutcome::IterationLimit
}

/// Read the solution of an optimal tableau back into original variables.
pub(crate) fn extract_solution(std: &StandardModel, tableau: &Tableau) -> Solution {
    let values = tableau.basic_solution();
    let origin = std.original_solution(&values[..std.num_cols()]);
    Solution::optimal(std.original_objective(tableau.z()), origin)
}

pub(crate) fn capped_solution(
    status: SolveStatus,
    std: &StandardModel,
    tableau: &Tableau,
) -> Solution {
    let values = tableau.basic_solution();
    let origin = std.original_solution(&values[..std.num_cols()]);
    Solution::capped(status, std.original_objective(tableau.z()), origin)
}

/// Solve a `<=`-form model with the primal simplex.
pub fn solve(model: &Model, config: &SolverConfig) -> Result<SolveReport, SolverError> {
    let std = standardize(model)?;
    let mut tableau = Tableau::from_standard(&std, config);
    let mut trace = Trace::new();
    log::info!(
        "primal simplex: {} rows, {} structural columns",
        std.num_rows(),
        std.num_cols()
    );
    let solution = match run(&mut tableau, &mut trace, config) {
        PrimalOutcome::Optimal => extract_solution(&std, &tableau),
        PrimalOutcome::Unbounded => Solution::unbounded(),
        PrimalOutcome::IterationLimit => {
            capped_solution(SolveStatus::IterationLimit, &std, &tableau)
        }
    };
    Ok(SolveReport { solution, trace })
}
