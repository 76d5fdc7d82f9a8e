//! Best-first branch-and-bound over the simplex relaxation.

use std::collections::BTreeMap;
use std::collections::BinaryHeap;

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

/// One expanded node of the search tree.
///
/// Immutable once the relaxation bound is set; dropped when popped and
/// pruned.
#[derive(Debug, Clone)]
struct Node {
    std: StandardModel,
    /// Dotted path into the tree, e.g. `p1.2.1`
    label: String,
    /// The bound added on the way here, e.g. `X2 >= 2`
    branch_header: Option<String>,
    /// Objective of the relaxation, maximization form
    lp_bound: f64,
    /// Relaxation optimum mapped back to the original variables
    origin: BTreeMap<String, f64>,
}

/// Heap entry ordered by relaxation bound (best first).
struct Ranked(Node);

impl PartialEq for Ranked {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == std::cmp::Ordering::Equal
    }
}
impl Eq for Ranked {}
impl PartialOrd for Ranked {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for Ranked {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.lp_bound.total_cmp(&other.0.lp_bound)
    }
}

enum Relaxation {
    Optimal { z_std: f64, std_values: Vec<f64> },
    Infeasible,
    Unbounded,
    IterationLimit,
}

/// Solve a node's relaxation: primal first, with a dual-then-primal
/// pass when a right-hand side is (or goes) negative.
fn solve_relaxation(std: &StandardModel, trace: &mut Trace, config: &SolverConfig) -> Relaxation {
    let mut tableau = Tableau::from_standard(std, config);

    if tableau
        .most_negative_rhs()
        .map_or(false, |(_, rhs)| rhs < -config.eps)
    {
        match dual::run(&mut tableau, trace, config) {
            DualOutcome::Feasible => {}
            DualOutcome::Infeasible => return Relaxation::Infeasible,
            DualOutcome::IterationLimit => return Relaxation::IterationLimit,
        }
    }

    match primal::run(&mut tableau, trace, config) {
        PrimalOutcome::Optimal => Relaxation::Optimal {
            z_std: tableau.z(),
            std_values: tableau.basic_solution()[..std.num_cols()].to_vec(),
        },
        PrimalOutcome::Unbounded => Relaxation::Unbounded,
        PrimalOutcome::IterationLimit => Relaxation::IterationLimit,
    }
}

/// Fractional variable closest to one half: minimize `|frac(x) - 0.5|`.
/// Ties keep the smaller variable index.
fn branch_variable(fractional: &[(usize, f64)]) -> (usize, f64) {
    let mut best = fractional[0];
    let mut best_score = f64::INFINITY;
    for &(j, value) in fractional {
        let frac = value - value.floor();
        let score = (frac - 0.5).abs();
        if score < best_score {
            best_score = score;
            best = (j, value);
        }
    }
    best
}

/// Solve an integer or binary model by best-first branch-and-bound.
pub fn solve(model: &Model, config: &SolverConfig) -> Result<SolveReport, SolverError> {
    let std_root = standardize(model)?;
    let mut trace = Trace::new();
    log::info!(
        "branch and bound: {} integer variables, node cap {}",
        model.signs.iter().filter(|s| s.is_integer()).count(),
        config.max_nodes
    );

    let root = match solve_relaxation(&std_root, &mut trace, config) {
        Relaxation::Optimal { z_std, std_values } => {
            let origin = std_root.original_solution(&std_values);
            trace.push(format!("node p1: relaxation bound {z_std:.6}"));
            Node {
                std: std_root.clone(),
                label: "p1".to_string(),
                branch_header: None,
                lp_bound: z_std,
                origin,
            }
        }
        Relaxation::Infeasible => {
            trace.push("node p1: relaxation infeasible");
            return finish(model, Solution::infeasible(), trace, config);
        }
        Relaxation::Unbounded => {
            trace.push("node p1: relaxation unbounded");
            return finish(model, Solution::unbounded(), trace, config);
        }
        Relaxation::IterationLimit => {
            trace.push("node p1: relaxation hit the iteration cap");
            return finish(
                model,
                Solution::capped(SolveStatus::IterationLimit, f64::NAN, BTreeMap::new()),
                trace,
                config,
            );
        }
    };

    let mut heap: BinaryHeap<Ranked> = BinaryHeap::new();
    heap.push(Ranked(root));

    let mut incumbent: Option<(f64, BTreeMap<String, f64>)> = None;
    let mut explored = 0usize;

    while let Some(Ranked(node)) = heap.pop() {
        explored += 1;
        if explored > config.max_nodes {
            trace.push(format!("node cap {} reached", config.max_nodes));
            let solution = match &incumbent {
                Some((z_std, origin)) => Solution::capped(
                    SolveStatus::NodeLimit,
                    std_root.original_objective(*z_std),
                    origin.clone(),
                ),
                None => Solution::capped(SolveStatus::NodeLimit, f64::NAN, BTreeMap::new()),
            };
            return finish(model, solution, trace, config);
        }

        if let Some((z_star, _)) = &incumbent {
            if node.lp_bound <= z_star + config.bound_eps {
                trace.push(format!(
                    "prune {}: bound {:.6} <= incumbent {:.6}",
                    node.label, node.lp_bound, z_star
                ));
                continue;
            }
        }

        if let Some(header) = &node.branch_header {
            trace.push(format!(
                "expand {} ({header}): bound {:.6}",
                node.label, node.lp_bound
            ));
        }

        let fractional = node.std.fractional_originals(&node.origin, config.frac_eps);
        if fractional.is_empty() {
            let improved = incumbent
                .as_ref()
                .map_or(true, |(z_star, _)| node.lp_bound > z_star + config.bound_eps);
            if improved {
                trace.push(format!(
                    "node {}: integer feasible, incumbent z = {:.6}",
                    node.label,
                    std_root.original_objective(node.lp_bound)
                ));
                incumbent = Some((node.lp_bound, node.origin.clone()));
            } else {
                trace.push(format!(
                    "node {}: integer feasible but no improvement",
                    node.label
                ));
            }
            continue;
        }

        let (j, value) = branch_variable(&fractional);
        let label = &model.labels[j];
        let row = node.std.expansion_row(j);
        let floor = value.floor();
        let ceil = value.ceil();

        // Left child: X_j <= floor(v); right child: X_j >= ceil(v),
        // encoded as -X_j <= -ceil(v).
        let children = [
            (
                format!("{}.1", node.label),
                format!("{label} <= {floor}"),
                row.clone(),
                floor,
            ),
            (
                format!("{}.2", node.label),
                format!("{label} >= {ceil}"),
                row.iter().map(|&v| -v).collect::<Vec<f64>>(),
                -ceil,
            ),
        ];

        for (child_label, header, child_row, child_rhs) in children {
            if node.std.has_duplicate_row(&child_row, child_rhs, config.eps) {
                trace.push(format!(
                    "reject {child_label} ({header}): duplicates an existing row"
                ));
                continue;
            }
            let child_std = node.std.with_row(child_row, child_rhs);
            match solve_relaxation(&child_std, &mut trace, config) {
                Relaxation::Optimal { z_std, std_values } => {
                    let origin = child_std.original_solution(&std_values);
                    trace.push(format!(
                        "node {child_label} ({header}): relaxation bound {z_std:.6}"
                    ));
                    heap.push(Ranked(Node {
                        std: child_std,
                        label: child_label,
                        branch_header: Some(header),
                        lp_bound: z_std,
                        origin,
                    }));
                }
                Relaxation::Infeasible => {
                    trace.push(format!("node {child_label} ({header}): infeasible"));
                }
                Relaxation::Unbounded => {
                    trace.push(format!("node {child_label} ({header}): unbounded"));
                    return finish(model, Solution::unbounded(), trace, config);
                }
                Relaxation::IterationLimit => {
                    trace.push(format!(
                        "node {child_label} ({header}): relaxation hit the iteration cap"
                    ));
                    return finish(
                        model,
                        Solution::capped(SolveStatus::IterationLimit, f64::NAN, BTreeMap::new()),
                        trace,
                        config,
                    );
                }
            }
        }
    }

    let solution = match incumbent {
        Some((z_std, origin)) => {
            Solution::optimal(std_root.original_objective(z_std), origin)
        }
        None => Solution::infeasible(),
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
            "BranchAndBound",
            dir,
            model,
            &solution,
            "best-first search over the simplex relaxation",
            &mut trace,
        );
    }
    Ok(SolveReport { solution, trace })
}
