//! Revised simplex, phase 2 only.
//!
//! Works on the slack-augmented matrix `[A | I]` in basis-inverse form:
//! each iteration rebuilds `B⁻¹` by Gauss-Jordan, prices the non-basic
//! columns through `y = c_B B⁻¹`, and ratio-tests the entering
//! direction `d = B⁻¹ A_j`. There is no phase 1 here; a starting
//! identity basis must already be present in the matrix.

use std::collections::BTreeMap;

use crate::config::SolverConfig;
use crate::error::SolverError;
use crate::model::Model;
use crate::solution::{Solution, SolveReport, SolveStatus};
use crate::standard::{standardize, StandardModel};
use crate::trace::Trace;

/// Invert a square matrix by Gauss-Jordan with partial pivoting.
/// `None` when the matrix is singular within `eps`.
fn invert(matrix: &[Vec<f64>], eps: f64) -> Option<Vec<Vec<f64>>> {
    let n = matrix.len();
    let mut work: Vec<Vec<f64>> = matrix
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let mut extended = row.clone();
            extended.extend((0..n).map(|j| if i == j { 1.0 } else { 0.0 }));
            extended
        })
        .collect();

    for col in 0..n {
        let pivot_row = (col..n).max_by(|&a, &b| {
            work[a][col].abs().total_cmp(&work[b][col].abs())
        })?;
        if work[pivot_row][col].abs() < eps {
            return None;
        }
        work.swap(col, pivot_row);
        let pivot = work[col][col];
        for j in 0..2 * n {
            work[col][j] /= pivot;
        }
        for i in 0..n {
            if i == col {
                continue;
            }
            let factor = work[i][col];
            if factor == 0.0 {
                continue;
            }
            for j in 0..2 * n {
                work[i][j] -= factor * work[col][j];
            }
        }
    }

    Some(work.into_iter().map(|mut row| row.split_off(n)).collect())
}

fn mat_vec(matrix: &[Vec<f64>], vector: &[f64]) -> Vec<f64> {
    matrix
        .iter()
        .map(|row| row.iter().zip(vector.iter()).map(|(&a, &x)| a * x).sum())
        .collect()
}

/// Column `j` of the slack-augmented matrix.
fn augmented_column(std: &StandardModel, j: usize) -> Vec<f64> {
    let n = std.num_cols();
    (0..std.num_rows())
        .map(|i| {
            if j < n {
                std.a[i][j]
            } else if j - n == i {
                1.0
            } else {
                0.0
            }
        })
        .collect()
}

fn augmented_cost(std: &StandardModel, j: usize) -> f64 {
    if j < std.num_cols() {
        std.c[j]
    } else {
        0.0
    }
}

fn column_name(std: &StandardModel, j: usize) -> String {
    if j < std.num_cols() {
        std.cols[j].name.clone()
    } else {
        format!("S{}", j - std.num_cols() + 1)
    }
}

/// Starting basis: one unit column per row of `[A | I]`.
fn identity_basis(std: &StandardModel, eps: f64) -> Result<Vec<usize>, SolverError> {
    let m = std.num_rows();
    let total = std.num_cols() + m;
    let mut basis = Vec::with_capacity(m);
    for row in 0..m {
        let found = (0..total).find(|&j| {
            let col = augmented_column(std, j);
            (col[row] - 1.0).abs() <= eps
                && col
                    .iter()
                    .enumerate()
                    .all(|(i, &v)| i == row || v.abs() <= eps)
        });
        match found {
            Some(j) => basis.push(j),
            None => {
                return Err(SolverError::NoIdentityBasis(format!(
                    "row {} has no unit column; run a phase-1 method first",
                    row + 1
                )))
            }
        }
    }
    Ok(basis)
}

/// Solve a `<=`-form model in basis-inverse form.
pub fn solve(model: &Model, config: &SolverConfig) -> Result<SolveReport, SolverError> {
    let std = standardize(model)?;
    let m = std.num_rows();
    let total = std.num_cols() + m;
    let mut trace = Trace::new();
    log::info!("revised simplex: {} rows, {} columns", m, total);

    let mut basis = identity_basis(&std, config.basis_eps)?;
    trace.push(format!(
        "revised: starting basis [{}]",
        basis
            .iter()
            .map(|&j| column_name(&std, j))
            .collect::<Vec<_>>()
            .join(", ")
    ));

    for iteration in 0..config.max_revised_iterations {
        let b_matrix: Vec<Vec<f64>> = (0..m)
            .map(|i| basis.iter().map(|&j| augmented_column(&std, j)[i]).collect())
            .collect();
        let b_inv = invert(&b_matrix, config.eps).ok_or_else(|| {
            SolverError::NumericallyDegenerate(format!(
                "basis matrix singular at iteration {iteration}"
            ))
        })?;
        let x_b = mat_vec(&b_inv, &std.b);
        let c_b: Vec<f64> = basis.iter().map(|&j| augmented_cost(&std, j)).collect();
        // y = c_B B⁻¹
        let y: Vec<f64> = (0..m)
            .map(|i| (0..m).map(|k| c_b[k] * b_inv[k][i]).sum())
            .collect();

        // Price the non-basic columns; the largest positive reduced cost
        // enters.
        let mut entering: Option<(usize, f64)> = None;
        for j in 0..total {
            if basis.contains(&j) {
                continue;
            }
            let col = augmented_column(&std, j);
            let reduced: f64 = augmented_cost(&std, j)
                - y.iter().zip(col.iter()).map(|(&yi, &ai)| yi * ai).sum::<f64>();
            if reduced > config.eps && entering.map_or(true, |(_, r)| reduced > r) {
                entering = Some((j, reduced));
            }
        }
        let Some((enter, reduced)) = entering else {
            let z_std: f64 = c_b.iter().zip(x_b.iter()).map(|(&c, &x)| c * x).sum();
            trace.push(format!(
                "revised: optimal after {iteration} iterations, z = {z_std:.6}"
            ));
            let mut std_values = vec![0.0; std.num_cols()];
            for (&j, &value) in basis.iter().zip(x_b.iter()) {
                if j < std.num_cols() {
                    std_values[j] = value;
                }
            }
            let origin = std.original_solution(&std_values);
            return Ok(SolveReport {
                solution: Solution::optimal(std.original_objective(z_std), origin),
                trace,
            });
        };

        let direction = mat_vec(&b_inv, &augmented_column(&std, enter));
        let mut leaving: Option<(usize, f64)> = None;
        for (i, &d_i) in direction.iter().enumerate() {
            if d_i > config.eps {
                let ratio = x_b[i] / d_i;
                if leaving.map_or(true, |(_, r)| ratio < r) {
                    leaving = Some((i, ratio));
                }
            }
        }
        let Some((leave, ratio)) = leaving else {
            trace.push(format!(
                "revised: {} has no positive direction entry, unbounded",
                column_name(&std, enter)
            ));
            return Ok(SolveReport {
                solution: Solution::unbounded(),
                trace,
            });
        };

        trace.push(format!(
            "revised iteration {}: {} enters (reduced cost {:.6}), {} leaves (ratio {:.6})",
            iteration + 1,
            column_name(&std, enter),
            reduced,
            column_name(&std, basis[leave]),
            ratio
        ));
        basis[leave] = enter;
    }

    trace.push(format!(
        "revised: iteration cap {} reached",
        config.max_revised_iterations
    ));
    Ok(SolveReport {
        solution: Solution::capped(SolveStatus::IterationLimit, f64::NAN, BTreeMap::new()),
        trace,
    })
}
