//! Ranging and shadow-price analysis on an optimal tableau.
//!
//! A target cell is addressed by `(row name, column name)`: the
//! objective row is `Z`, constraint rows are `R1..Rm`, columns carry
//! the tableau column names, and the right-hand side column is `RHS`.

use crate::config::SolverConfig;
use crate::error::SolverError;
use crate::standard::StandardModel;
use crate::tableau::Tableau;
use crate::trace::Trace;

pub const OBJECTIVE_ROW: &str = "Z";
pub const RHS_COLUMN: &str = "RHS";

/// What kind of cell a coordinate landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeKind {
    ObjectiveNonBasic,
    ObjectiveBasic,
    RightHandSide,
    ConstraintCoefficient,
}

/// Allowable-change report for one cell.
///
/// `allowable_decrease`/`allowable_increase` are non-negative amounts in
/// standard-form space; `f64::INFINITY` means unlimited.
#[derive(Debug, Clone)]
pub struct RangeReport {
    pub row_name: String,
    pub col_name: String,
    pub kind: RangeKind,
    /// Current standard-form value of the addressed quantity
    pub current: f64,
    pub allowable_decrease: f64,
    pub allowable_increase: f64,
    /// Shadow price, for right-hand-side cells
    pub shadow_price: Option<f64>,
    pub note: Option<String>,
}

impl RangeReport {
    /// Whether `candidate` stays inside the allowable range.
    pub fn contains(&self, candidate: f64, eps: f64) -> bool {
        let low = self.current - self.allowable_decrease;
        let high = self.current + self.allowable_increase;
        candidate >= low - eps && candidate <= high + eps
    }
}

/// Column acting as the basis vector of each constraint row, found by
/// scanning for a unit column rather than trusting the recorded basis.
pub fn basic_variables(tableau: &Tableau, config: &SolverConfig) -> Vec<Option<usize>> {
    (0..tableau.num_rows())
        .map(|row| tableau.basic_column_for_row(row, config.basis_eps))
        .collect()
}

/// Parse a constraint-row name `R<i>` into its zero-based index.
fn constraint_row(name: &str, rows: usize) -> Option<usize> {
    let index: usize = name.strip_prefix('R')?.parse().ok()?;
    (1..=rows).contains(&index).then(|| index - 1)
}

/// Range the cell at `(row_name, col_name)` of an optimal tableau.
pub fn range_for(
    std: &StandardModel,
    tableau: &Tableau,
    row_name: &str,
    col_name: &str,
    config: &SolverConfig,
    trace: &mut Trace,
) -> Result<RangeReport, SolverError> {
    if row_name == OBJECTIVE_ROW {
        let col = tableau.col_index(col_name).ok_or_else(|| {
            SolverError::MalformedModel(format!("unknown column {col_name}"))
        })?;
        if col >= std.num_cols() {
            return Err(SolverError::MalformedModel(format!(
                "{col_name} is a slack column; its objective coefficient is fixed"
            )));
        }
        return Ok(objective_range(std, tableau, col, config, trace));
    }

    let row = constraint_row(row_name, tableau.num_rows()).ok_or_else(|| {
        SolverError::MalformedModel(format!("unknown row {row_name}"))
    })?;

    if col_name == RHS_COLUMN {
        return Ok(rhs_range(std, tableau, row, row_name, config, trace));
    }

    let col = tableau.col_index(col_name).ok_or_else(|| {
        SolverError::MalformedModel(format!("unknown column {col_name}"))
    })?;
    if col >= std.num_cols() {
        return Err(SolverError::MalformedModel(format!(
            "{col_name} is a slack column; its constraint coefficient is fixed"
        )));
    }
    trace.push(format!(
        "range {row_name}/{col_name}: constraint coefficient, full range needs a re-solve"
    ));
    Ok(RangeReport {
        row_name: row_name.to_string(),
        col_name: col_name.to_string(),
        kind: RangeKind::ConstraintCoefficient,
        current: std.a[row][col],
        allowable_decrease: 0.0,
        allowable_increase: 0.0,
        shadow_price: None,
        note: Some("full range requires re-solving after perturbation".to_string()),
    })
}

fn objective_range(
    std: &StandardModel,
    tableau: &Tableau,
    col: usize,
    config: &SolverConfig,
    trace: &mut Trace,
) -> RangeReport {
    let basics = basic_variables(tableau, config);
    let basic_row = basics.iter().position(|&b| b == Some(col));
    let obj = tableau.objective_row();
    let col_name = tableau.col_name(col).to_string();

    match basic_row {
        None => {
            let reduced = tableau.get(obj, col);
            let decrease = if reduced > config.eps {
                reduced
            } else {
                f64::INFINITY
            };
            let increase = if reduced < -config.eps {
                -reduced
            } else {
                f64::INFINITY
            };
            trace.push(format!(
                "range Z/{col_name}: non-basic, reduced cost {reduced:.6}"
            ));
            RangeReport {
                row_name: OBJECTIVE_ROW.to_string(),
                col_name,
                kind: RangeKind::ObjectiveNonBasic,
                current: std.c[col],
                allowable_decrease: decrease,
                allowable_increase: increase,
                shadow_price: None,
                note: None,
            }
        }
        Some(row) => {
            // Ratios -obj_k / row_k over the other columns bound how far
            // the coefficient can move before another column prices in.
            let mut largest_negative = f64::NEG_INFINITY;
            let mut smallest_positive = f64::INFINITY;
            for k in 0..tableau.num_cols() {
                if k == col {
                    continue;
                }
                let denom = tableau.get(row, k);
                if denom.abs() <= config.eps {
                    continue;
                }
                let ratio = -tableau.get(obj, k) / denom;
                if ratio < -config.eps && ratio > largest_negative {
                    largest_negative = ratio;
                } else if ratio > config.eps && ratio < smallest_positive {
                    smallest_positive = ratio;
                }
            }
            let decrease = if largest_negative.is_finite() {
                -largest_negative
            } else {
                f64::INFINITY
            };
            trace.push(format!(
                "range Z/{col_name}: basic in row {}, decrease {decrease:.6}, increase {smallest_positive:.6}",
                row + 1
            ));
            RangeReport {
                row_name: OBJECTIVE_ROW.to_string(),
                col_name,
                kind: RangeKind::ObjectiveBasic,
                current: std.c[col],
                allowable_decrease: decrease,
                allowable_increase: smallest_positive,
                shadow_price: None,
                note: None,
            }
        }
    }
}

fn rhs_range(
    std: &StandardModel,
    tableau: &Tableau,
    row: usize,
    row_name: &str,
    config: &SolverConfig,
    trace: &mut Trace,
) -> RangeReport {
    let slack_col = std.num_cols() + row;
    let shadow = tableau.get(tableau.objective_row(), slack_col);
    let current = std.b[row];
    trace.push(format!(
        "range {row_name}/RHS: shadow price {shadow:.6}, simplified closed form"
    ));
    RangeReport {
        row_name: row_name.to_string(),
        col_name: RHS_COLUMN.to_string(),
        kind: RangeKind::RightHandSide,
        current,
        allowable_decrease: current,
        allowable_increase: f64::INFINITY,
        shadow_price: Some(shadow),
        note: Some("simplified".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Model, Relation, Sense, SignRestriction};
    use crate::primal::{self, PrimalOutcome};
    use crate::standard::standardize;

    fn optimal_classic() -> (StandardModel, Tableau, SolverConfig) {
        // max 3x + 5y s.t. x <= 4, 2y <= 12, 3x + 2y <= 18.
        let mut model = Model::with_default_labels(
            Sense::Max,
            vec![3.0, 5.0],
            vec![SignRestriction::NonNegative; 2],
        )
        .unwrap();
        model
            .add_constraint(vec![1.0, 0.0], Relation::Le, 4.0)
            .unwrap();
        model
            .add_constraint(vec![0.0, 2.0], Relation::Le, 12.0)
            .unwrap();
        model
            .add_constraint(vec![3.0, 2.0], Relation::Le, 18.0)
            .unwrap();
        let config = SolverConfig::default();
        let std = standardize(&model).unwrap();
        let mut tableau = Tableau::from_standard(&std, &config);
        let mut trace = Trace::new();
        assert_eq!(
            primal::run(&mut tableau, &mut trace, &config),
            PrimalOutcome::Optimal
        );
        (std, tableau, config)
    }

    #[test]
    fn scan_matches_recorded_basis() {
        let (_, tableau, config) = optimal_classic();
        let basics = basic_variables(&tableau, &config);
        for (row, &col) in tableau.basis().iter().enumerate() {
            assert_eq!(basics[row], Some(col));
        }
    }

    #[test]
    fn basic_objective_coefficient_range() {
        let (std, tableau, config) = optimal_classic();
        let mut trace = Trace::new();
        let range =
            range_for(&std, &tableau, "Z", "X1", &config, &mut trace).unwrap();
        assert_eq!(range.kind, RangeKind::ObjectiveBasic);
        assert_eq!(range.current, 3.0);
        // Classic ranging: c1 may move inside [0, 7.5].
        assert!((range.allowable_decrease - 3.0).abs() < 1e-9);
        assert!((range.allowable_increase - 4.5).abs() < 1e-9);
        assert!(range.contains(4.0, config.eps));
        assert!(!range.contains(8.0, config.eps));
    }

    #[test]
    fn nonbasic_objective_coefficient_range() {
        // max x + 3y s.t. x + y <= 4: y enters, x stays non-basic with
        // reduced cost 2.
        let mut model = Model::with_default_labels(
            Sense::Max,
            vec![1.0, 3.0],
            vec![SignRestriction::NonNegative; 2],
        )
        .unwrap();
        model
            .add_constraint(vec![1.0, 1.0], Relation::Le, 4.0)
            .unwrap();
        let config = SolverConfig::default();
        let std = standardize(&model).unwrap();
        let mut tableau = Tableau::from_standard(&std, &config);
        let mut trace = Trace::new();
        assert_eq!(
            primal::run(&mut tableau, &mut trace, &config),
            PrimalOutcome::Optimal
        );

        let range = range_for(&std, &tableau, "Z", "X1", &config, &mut trace).unwrap();
        assert_eq!(range.kind, RangeKind::ObjectiveNonBasic);
        assert!((range.allowable_decrease - 2.0).abs() < 1e-9);
        assert!(range.allowable_increase.is_infinite());
    }

    #[test]
    fn shadow_prices_come_from_the_slack_columns() {
        let (std, tableau, config) = optimal_classic();
        let mut trace = Trace::new();
        let r2 = range_for(&std, &tableau, "R2", "RHS", &config, &mut trace).unwrap();
        assert_eq!(r2.kind, RangeKind::RightHandSide);
        assert!((r2.shadow_price.unwrap() - 1.5).abs() < 1e-9);
        // Simplified closed form: the decrease equals the current RHS.
        assert_eq!(r2.allowable_decrease, 12.0);
        assert_eq!(r2.note.as_deref(), Some("simplified"));

        let r1 = range_for(&std, &tableau, "R1", "RHS", &config, &mut trace).unwrap();
        assert!(r1.shadow_price.unwrap().abs() < 1e-9);
    }

    #[test]
    fn constraint_coefficients_only_report_their_value() {
        let (std, tableau, config) = optimal_classic();
        let mut trace = Trace::new();
        let range =
            range_for(&std, &tableau, "R3", "X1", &config, &mut trace).unwrap();
        assert_eq!(range.kind, RangeKind::ConstraintCoefficient);
        assert_eq!(range.current, 3.0);
        assert_eq!(range.allowable_decrease, 0.0);
        assert!(range.contains(3.0, config.eps));
        assert!(!range.contains(3.1, config.eps));
    }

    #[test]
    fn unknown_coordinates_are_rejected() {
        let (std, tableau, config) = optimal_classic();
        let mut trace = Trace::new();
        assert!(range_for(&std, &tableau, "Z", "X9", &config, &mut trace).is_err());
        assert!(range_for(&std, &tableau, "R9", "RHS", &config, &mut trace).is_err());
        assert!(range_for(&std, &tableau, "Q1", "X1", &config, &mut trace).is_err());
    }
}
