//! Phase-1 repair without artificial variables.
//!
//! When a flipped `>=` row leaves a negative right-hand side, the
//! repair loop pivots on the most negative row until the tableau is
//! primal feasible, then hands over to the primal simplex.

use crate::config::SolverConfig;
use crate::error::SolverError;
use crate::model::Model;
use crate::primal::{self, PrimalOutcome};
use crate::solution::{Solution, SolveReport, SolveStatus};
use crate::standard::standardize_flipping;
use crate::tableau::Tableau;
use crate::trace::Trace;

/// Outcome of the repair loop over an existing tableau.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepairOutcome {
    /// All right-hand sides are non-negative
    Repaired,
    Infeasible,
    IterationLimit,
}

/// Column choice for the repair pivot: among negative entries of the
/// selected row, minimize `|obj_entry / row_entry|`.
fn repair_column(tableau: &Tableau, row: usize, eps: f64) -> Option<usize> {
    let obj = tableau.objective_row();
    let mut best: Option<(usize, f64)> = None;
    for j in 0..tableau.num_cols() {
        let entry = tableau.get(row, j);
        if entry < -eps {
            let score = (tableau.get(obj, j) / entry).abs();
            if best.map_or(true, |(_, s)| score < s) {
                best = Some((j, score));
            }
        }
    }
    best.map(|(j, _)| j)
}

/// Pivot negative right-hand sides away.
pub fn repair(tableau: &mut Tableau, trace: &mut Trace, config: &SolverConfig) -> RepairOutcome {
    for iteration in 0..config.max_repair_iterations {
        let Some((row, rhs)) = tableau.most_negative_rhs() else {
            return RepairOutcome::Repaired;
        };
        if rhs >= -config.eps {
            trace.push(format!("phase 1: feasible after {iteration} pivots"));
            return RepairOutcome::Repaired;
        }
        let Some(col) = repair_column(tableau, row, config.eps) else {
            trace.push(format!(
                "phase 1: row {} has no admissible column, infeasible",
                row + 1
            ));
            return RepairOutcome::Infeasible;
        };
        let leaving = tableau.basis()[row];
        tableau.pivot(row, col);
        tableau.set_basis(row, col);
        trace.push(format!(
            "phase 1 pivot {}: {} enters, {} leaves (row {}, rhs {:.6})",
            iteration + 1,
            tableau.col_name(col),
            tableau.col_name(leaving),
            row + 1,
            rhs
        ));
    }
    trace.push(format!(
        "phase 1: iteration cap {} reached",
        config.max_repair_iterations
    ));
    RepairOutcome::IterationLimit
}

/// Solve a model that may carry `>=` rows: flip them, repair the
/// negative right-hand sides, then run the primal simplex.
pub fn solve(model: &Model, config: &SolverConfig) -> Result<SolveReport, SolverError> {
    let std = standardize_flipping(model)?;
    let mut tableau = Tableau::from_standard(&std, config);
    let mut trace = Trace::new();
    log::info!(
        "two-phase: {} rows, {} structural columns",
        std.num_rows(),
        std.num_cols()
    );

    if tableau
        .most_negative_rhs()
        .map_or(false, |(_, rhs)| rhs < -config.eps)
    {
        match repair(&mut tableau, &mut trace, config) {
            RepairOutcome::Repaired => {}
            RepairOutcome::Infeasible => {
                return Ok(SolveReport {
                    solution: Solution::infeasible(),
                    trace,
                })
            }
            RepairOutcome::IterationLimit => {
                return Ok(SolveReport {
                    solution: primal::capped_solution(
                        SolveStatus::IterationLimit,
                        &std,
                        &tableau,
                    ),
                    trace,
                })
            }
        }
    } else {
        trace.push("phase 1: not needed, right-hand side already non-negative");
    }

    let solution = match primal::run(&mut tableau, &mut trace, config) {
        PrimalOutcome::Optimal => primal::extract_solution(&std, &tableau),
        PrimalOutcome::Unbounded => Solution::unbounded(),
        PrimalOutcome::IterationLimit => {
            primal::capped_solution(SolveStatus::IterationLimit, &std, &tableau)
        }
    };
    Ok(SolveReport { solution, trace })
}
