//! Gomory fractional cutting planes.
//!
//! Repeatedly cuts the fractional relaxation optimum away: a basic
//! integer column with fractional value donates its row, the fractional
//! parts of that row become a new `<=` constraint with its own slack,
//! and the dual simplex restores feasibility before the primal
//! re-optimizes.

use crate::config::SolverConfig;
use crate::dual::{self, DualOutcome};
use crate::error::SolverError;
use crate::model::Model;
use crate::primal::{self, PrimalOutcome};
use crate::report;
use crate::solution::{Solution, SolveReport, SolveStatus};
use crate::standard::{standardize, StandardModel};
use crate::tableau::Tableau;
use crate::trace::Trace;

/// Fractional part clamped into `[0, 1)`: values within `clamp` of an
/// integer count as whole.
fn fractional_part(value: f64, clamp: f64) -> f64 {
    let frac = value - value.floor();
    if frac < clamp || frac > 1.0 - clamp {
        0.0
    } else {
        frac
    }
}

/// Row of the basic integer column whose value is closest to half-way
/// between integers. `None` when every basic integer column is whole.
fn cut_row(tableau: &Tableau, std: &StandardModel, config: &SolverConfig) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (row, &col) in tableau.basis().iter().enumerate() {
        if col >= std.num_cols() || !std.cols[col].is_integer {
            continue;
        }
        let frac = fractional_part(tableau.rhs(row), config.frac_clamp);
        if frac <= config.frac_eps || frac >= 1.0 - config.frac_eps {
            continue;
        }
        let score = (frac - 0.5).abs();
        if best.map_or(true, |(_, s)| score < s) {
            best = Some((row, score));
        }
    }
    best.map(|(row, _)| row)
}

/// Graft the Gomory cut of `row` onto the tableau as a fresh buffer.
///
/// The new row holds `-frac(T[row, j])` per existing column, `+1` in
/// the new slack column, and `-frac(rhs)` on the right: dual feasible,
/// primal infeasible by construction.
fn apply_cut(tableau: &Tableau, row: usize, index: usize, config: &SolverConfig) -> Tableau {
    let entries: Vec<f64> = (0..tableau.num_cols())
        .map(|j| -fractional_part(tableau.get(row, j), config.frac_clamp))
        .collect();
    let rhs = -fractional_part(tableau.rhs(row), config.frac_clamp);
    tableau.with_appended_row_and_column(&entries, rhs, format!("SC{index}"))
}

/// Whether every integral original variable is whole at the current
/// basic solution.
fn is_integral(tableau: &Tableau, std: &StandardModel, config: &SolverConfig) -> bool {
    let values = tableau.basic_solution();
    let origin = std.original_solution(&values[..std.num_cols()]);
    std.fractional_originals(&origin, config.frac_eps).is_empty()
}

/// Solve an integer model by pure cutting planes.
pub fn solve(model: &Model, config: &SolverConfig) -> Result<SolveReport, SolverError> {
    let std = standardize(model)?;
    let mut tableau = Tableau::from_standard(&std, config);
    let mut trace = Trace::new();
    log::info!(
        "cutting planes: {} rows, {} structural columns, cut cap {}",
        std.num_rows(),
        std.num_cols(),
        config.max_cuts
    );

    match primal::run(&mut tableau, &mut trace, config) {
        PrimalOutcome::Optimal => {}
        PrimalOutcome::Unbounded => {
            return finish(model, Solution::unbounded(), trace, config)
        }
        PrimalOutcome::IterationLimit => {
            return finish(
                model,
                primal::capped_solution(SolveStatus::IterationLimit, &std, &tableau),
                trace,
                config,
            )
        }
    }

    let mut status = SolveStatus::CutLimit;
    let mut separation_failed = false;
    for cut_index in 1..=config.max_cuts {
        if is_integral(&tableau, &std, config) {
            trace.push(format!(
                "all integer variables whole after {} cuts",
                cut_index - 1
            ));
            status = SolveStatus::Optimal;
            break;
        }

        let Some(row) = cut_row(&tableau, &std, config) else {
            trace.push("no suitable cut row");
            separation_failed = true;
            break;
        };
        let frac = fractional_part(tableau.rhs(row), config.frac_clamp);
        trace.push(format!(
            "cut SC{cut_index}: from row {} ({} basic, fractional part {:.6})",
            row + 1,
            tableau.col_name(tableau.basis()[row]),
            frac
        ));
        tableau = apply_cut(&tableau, row, cut_index, config);

        match dual::run(&mut tableau, &mut trace, config) {
            DualOutcome::Feasible => {}
            DualOutcome::Infeasible => {
                return finish(model, Solution::infeasible(), trace, config)
            }
            DualOutcome::IterationLimit => {
                return finish(
                    model,
                    primal::capped_solution(SolveStatus::IterationLimit, &std, &tableau),
                    trace,
                    config,
                )
            }
        }
        match primal::run(&mut tableau, &mut trace, config) {
            PrimalOutcome::Optimal => {}
            PrimalOutcome::Unbounded => {
                return finish(model, Solution::unbounded(), trace, config)
            }
            PrimalOutcome::IterationLimit => {
                return finish(
                    model,
                    primal::capped_solution(SolveStatus::IterationLimit, &std, &tableau),
                    trace,
                    config,
                )
            }
        }
    }

    if status == SolveStatus::CutLimit && is_integral(&tableau, &std, config) {
        status = SolveStatus::Optimal;
    }
    if status == SolveStatus::CutLimit && !separation_failed {
        trace.push(format!(
            "fractional variables remain after {} cuts",
            config.max_cuts
        ));
    }

    let values = tableau.basic_solution();
    let origin = std.original_solution(&values[..std.num_cols()]);
    let z = std.original_objective(tableau.z());
    let solution = match status {
        SolveStatus::Optimal => Solution::optimal(z, origin),
        other => Solution::capped(other, z, origin),
    };
    finish(model, solution, trace, config)
}

fn finish(
    model: &Model,
    solution: Solution,
    mut trace: Trace,
    config: &SolverConfig,
) -> Result<SolveReport, SolverError> {
    if let Some(dir) = &config.result_dir {
        report::write_result_file(
            "CuttingPlane",
            dir,
            model,
            &solution,
            "Gomory fractional cuts over the simplex relaxation",
            &mut trace,
        );
    }
    Ok(SolveReport { solution, trace })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Relation, Sense, SignRestriction};

    fn knapsack_model() -> Model {
        // max 5x + 4y s.t. 6x + 4y <= 24, x + 2y <= 6, x and y integer.
        let mut model = Model::with_default_labels(
            Sense::Max,
            vec![5.0, 4.0],
            vec![SignRestriction::Integer; 2],
        )
        .unwrap();
        model
            .add_constraint(vec![6.0, 4.0], Relation::Le, 24.0)
            .unwrap();
        model
            .add_constraint(vec![1.0, 2.0], Relation::Le, 6.0)
            .unwrap();
        model
    }

    #[test]
    fn fractional_part_clamps_near_integers() {
        assert_eq!(fractional_part(3.0 - 1e-14, 1e-12), 0.0);
        assert_eq!(fractional_part(3.0 + 1e-14, 1e-12), 0.0);
        assert!((fractional_part(2.75, 1e-12) - 0.75).abs() < 1e-12);
        assert!((fractional_part(-1.25, 1e-12) - 0.75).abs() < 1e-12);
    }

    #[test]
    fn cuts_reach_the_integer_optimum() {
        let report = solve(&knapsack_model(), &SolverConfig::default()).unwrap();
        let solution = report.solution;
        assert_eq!(solution.status, SolveStatus::Optimal);
        assert!((solution.z - 20.0).abs() < 1e-4);
        for value in solution.values.values() {
            assert!((value - value.round()).abs() < 1e-4);
        }
        assert!(report
            .trace
            .entries()
            .iter()
            .any(|e| e.starts_with("cut SC1")));
    }

    #[test]
    fn every_cut_rejects_the_current_fractional_optimum() {
        // The first cut row must be violated by the relaxation optimum:
        // its right-hand side starts negative by construction.
        let config = SolverConfig::default();
        let std = standardize(&knapsack_model()).unwrap();
        let mut tableau = Tableau::from_standard(&std, &config);
        let mut trace = Trace::new();
        assert_eq!(
            primal::run(&mut tableau, &mut trace, &config),
            PrimalOutcome::Optimal
        );
        let row = cut_row(&tableau, &std, &config).expect("fractional optimum");
        let grown = apply_cut(&tableau, row, 1, &config);
        let cut_rhs = grown.rhs(grown.num_rows() - 1);
        assert!(cut_rhs < -config.eps);
    }

    #[test]
    fn already_integral_models_need_no_cuts() {
        let mut model = Model::with_default_labels(
            Sense::Max,
            vec![1.0],
            vec![SignRestriction::Integer],
        )
        .unwrap();
        model.add_constraint(vec![1.0], Relation::Le, 3.0).unwrap();

        let report = solve(&model, &SolverConfig::default()).unwrap();
        assert_eq!(report.solution.status, SolveStatus::Optimal);
        assert!((report.solution.z - 3.0).abs() < 1e-9);
        assert!(report
            .trace
            .entries()
            .iter()
            .any(|e| e.contains("after 0 cuts")));
    }

    #[test]
    fn cut_cap_is_a_terminal_status() {
        let config = SolverConfig::default().with_max_cuts(0);
        let solution = solve(&knapsack_model(), &config).unwrap().solution;
        assert_eq!(solution.status, SolveStatus::CutLimit);
    }
}
