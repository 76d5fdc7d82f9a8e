//! Canonical-form builder.
//!
//! Rewrites a [`Model`] into <=-only standard form: every variable
//! non-negative, the objective maximized, and a recorded back-mapping
//! from standard columns to the original variables.

use std::collections::BTreeMap;

use crate::error::SolverError;
use crate::model::{Model, Relation, Sense, SignRestriction};

/// How a standard column relates to its original variable.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnPart {
    /// Column carries the variable directly
    Plus,
    /// Negative half of an unrestricted split, `x = x+ - x-`
    Minus,
    /// Substitution `y = -x` for a non-positive variable
    Flipped,
}

impl ColumnPart {
    /// Contribution sign of this column in the back-map.
    pub fn sign(&self) -> f64 {
        match self {
            ColumnPart::Plus => 1.0,
            ColumnPart::Minus | ColumnPart::Flipped => -1.0,
        }
    }
}

/// One column of the standard form and its provenance.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone)]
pub struct StdColumn {
    /// Display name, e.g. `X2`, `X2~`, `X2+`, `X2-`
    pub name: String,
    /// Index of the original variable this column came from
    pub orig_index: usize,
    pub part: ColumnPart,
    pub is_integer: bool,
    pub is_binary: bool,
}

/// The <=-only, maximization standard form of a model.
#[derive(Debug, Clone)]
pub struct StandardModel {
    /// Constraint matrix, one row per <= constraint
    pub a: Vec<Vec<f64>>,
    /// Right-hand sides
    pub b: Vec<f64>,
    /// Maximization objective over the standard columns
    pub c: Vec<f64>,
    /// Column provenance, in column order
    pub cols: Vec<StdColumn>,
    /// Original optimization sense, for reporting
    pub sense: Sense,
    /// Original variable labels, in original order
    pub labels: Vec<String>,
    /// Original sign restrictions, in original order
    pub signs: Vec<SignRestriction>,
}

impl StandardModel {
    pub fn num_rows(&self) -> usize {
        self.b.len()
    }

    pub fn num_cols(&self) -> usize {
        self.cols.len()
    }

    /// Map a point in standard space back to the original variables.
    ///
    /// `std_values` holds one value per standard column.
    pub fn original_solution(&self, std_values: &[f64]) -> BTreeMap<String, f64> {
        let mut out: BTreeMap<String, f64> = self
            .labels
            .iter()
            .map(|label| (label.clone(), 0.0))
            .collect();
        for (col, &value) in self.cols.iter().zip(std_values.iter()) {
            let entry = out
                .get_mut(&self.labels[col.orig_index])
                .expect("column refers to a known label");
            *entry += col.part.sign() * value;
        }
        out
    }

    /// Convert a maximization-form objective value back to the original
    /// sense.
    pub fn original_objective(&self, z_std: f64) -> f64 {
        match self.sense {
            Sense::Max => z_std,
            Sense::Min => -z_std,
        }
    }

    /// Standard-space row expressing the original variable `orig_index`
    /// with coefficient `+1`, via the part-to-sign map.
    pub fn expansion_row(&self, orig_index: usize) -> Vec<f64> {
        self.cols
            .iter()
            .map(|col| {
                if col.orig_index == orig_index {
                    col.part.sign()
                } else {
                    0.0
                }
            })
            .collect()
    }

    /// A copy of this model with one extra <= row appended.
    pub fn with_row(&self, row: Vec<f64>, rhs: f64) -> StandardModel {
        let mut out = self.clone();
        out.a.push(row);
        out.b.push(rhs);
        out
    }

    /// Whether `row <= rhs` duplicates an existing row component-wise
    /// within `eps`.
    pub fn has_duplicate_row(&self, row: &[f64], rhs: f64, eps: f64) -> bool {
        self.a.iter().zip(self.b.iter()).any(|(a_row, &b_i)| {
            (b_i - rhs).abs() <= eps
                && a_row
                    .iter()
                    .zip(row.iter())
                    .all(|(&x, &y)| (x - y).abs() <= eps)
        })
    }

    /// Original variables with an integrality requirement whose mapped
    /// value is not integral within `frac_eps`, with their values.
    pub fn fractional_originals(
        &self,
        origin: &BTreeMap<String, f64>,
        frac_eps: f64,
    ) -> Vec<(usize, f64)> {
        self.signs
            .iter()
            .enumerate()
            .filter(|(_, sign)| sign.is_integer())
            .filter_map(|(j, _)| {
                let value = origin[&self.labels[j]];
                let frac = value - value.floor();
                if frac.min(1.0 - frac) > frac_eps {
                    Some((j, value))
                } else {
                    None
                }
            })
            .collect()
    }
}

/// Strict standardization: only `<=` constraints with non-negative
/// right-hand sides are accepted.
pub fn standardize(model: &Model) -> Result<StandardModel, SolverError> {
    build(model, false)
}

/// Relaxed standardization for the two-phase, duality and editor
/// re-solve paths: `>=` rows are flipped to `<=` by negating both
/// sides, and negative right-hand sides are allowed through for the
/// repair loop to fix.
pub fn standardize_flipping(model: &Model) -> Result<StandardModel, SolverError> {
    build(model, true)
}

fn build(model: &Model, flip_ge: bool) -> Result<StandardModel, SolverError> {
    let mut cols = Vec::new();
    for (j, sign) in model.signs.iter().enumerate() {
        let label = &model.labels[j];
        match sign {
            SignRestriction::NonNegative
            | SignRestriction::Integer
            | SignRestriction::Binary => cols.push(StdColumn {
                name: label.clone(),
                orig_index: j,
                part: ColumnPart::Plus,
                is_integer: sign.is_integer(),
                is_binary: *sign == SignRestriction::Binary,
            }),
            SignRestriction::NonPositive => cols.push(StdColumn {
                name: format!("{label}~"),
                orig_index: j,
                part: ColumnPart::Flipped,
                is_integer: false,
                is_binary: false,
            }),
            SignRestriction::Unrestricted => {
                cols.push(StdColumn {
                    name: format!("{label}+"),
                    orig_index: j,
                    part: ColumnPart::Plus,
                    is_integer: false,
                    is_binary: false,
                });
                cols.push(StdColumn {
                    name: format!("{label}-"),
                    orig_index: j,
                    part: ColumnPart::Minus,
                    is_integer: false,
                    is_binary: false,
                });
            }
        }
    }

    let sense_factor = match model.sense {
        Sense::Max => 1.0,
        Sense::Min => -1.0,
    };
    let c: Vec<f64> = cols
        .iter()
        .map(|col| sense_factor * model.objective[col.orig_index] * col.part.sign())
        .collect();

    let mut a = Vec::with_capacity(model.num_constraints());
    let mut b = Vec::with_capacity(model.num_constraints());
    for (i, constraint) in model.constraints.iter().enumerate() {
        let flip = match constraint.relation {
            Relation::Le => false,
            Relation::Ge if flip_ge => true,
            Relation::Ge | Relation::Eq => {
                return Err(SolverError::UnsupportedForm(format!(
                    "constraint {} is `{}`; only `<=` rows are supported",
                    i + 1,
                    constraint.relation.as_str()
                )));
            }
        };
        let row_sign = if flip { -1.0 } else { 1.0 };
        let row: Vec<f64> = cols
            .iter()
            .map(|col| row_sign * constraint.coefficients[col.orig_index] * col.part.sign())
            .collect();
        let rhs = row_sign * constraint.rhs;
        if rhs < 0.0 && !flip_ge {
            return Err(SolverError::UnsupportedForm(format!(
                "constraint {} has negative right-hand side {}",
                i + 1,
                constraint.rhs
            )));
        }
        a.push(row);
        b.push(rhs);
    }

    // One `x_k <= 1` row per binary column.
    for (k, col) in cols.iter().enumerate() {
        if col.is_binary {
            let mut row = vec![0.0; cols.len()];
            row[k] = 1.0;
            a.push(row);
            b.push(1.0);
        }
    }

    Ok(StandardModel {
        a,
        b,
        c,
        cols,
        sense: model.sense,
        labels: model.labels.clone(),
        signs: model.signs.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Model, Relation, Sense, SignRestriction};

    fn model(
        sense: Sense,
        objective: Vec<f64>,
        signs: Vec<SignRestriction>,
        rows: Vec<(Vec<f64>, Relation, f64)>,
    ) -> Model {
        let mut m = Model::with_default_labels(sense, objective, signs).unwrap();
        for (coefficients, relation, rhs) in rows {
            m.add_constraint(coefficients, relation, rhs).unwrap();
        }
        m
    }

    #[test]
    fn nonnegative_variables_map_one_to_one() {
        let m = model(
            Sense::Max,
            vec![3.0, 5.0],
            vec![SignRestriction::NonNegative; 2],
            vec![(vec![1.0, 0.0], Relation::Le, 4.0)],
        );
        let std = standardize(&m).unwrap();
        assert_eq!(std.num_cols(), 2);
        assert_eq!(std.c, vec![3.0, 5.0]);
        assert_eq!(std.a, vec![vec![1.0, 0.0]]);
        assert_eq!(std.cols[0].name, "X1");
    }

    #[test]
    fn min_objective_is_negated() {
        let m = model(
            Sense::Min,
            vec![4.0, 1.0],
            vec![SignRestriction::NonNegative; 2],
            vec![(vec![1.0, 2.0], Relation::Le, 4.0)],
        );
        let std = standardize(&m).unwrap();
        assert_eq!(std.c, vec![-4.0, -1.0]);
        assert_eq!(std.original_objective(-7.0), 7.0);
    }

    #[test]
    fn unrestricted_variable_splits_in_two() {
        let m = model(
            Sense::Max,
            vec![2.0],
            vec![SignRestriction::Unrestricted],
            vec![(vec![1.0], Relation::Le, 3.0)],
        );
        let std = standardize(&m).unwrap();
        assert_eq!(std.num_cols(), 2);
        assert_eq!(std.cols[0].name, "X1+");
        assert_eq!(std.cols[1].name, "X1-");
        assert_eq!(std.c, vec![2.0, -2.0]);
        assert_eq!(std.a, vec![vec![1.0, -1.0]]);

        let origin = std.original_solution(&[1.5, 4.0]);
        assert!((origin["X1"] - (-2.5)).abs() < 1e-12);
    }

    #[test]
    fn nonpositive_variable_is_flipped() {
        let m = model(
            Sense::Max,
            vec![2.0],
            vec![SignRestriction::NonPositive],
            vec![(vec![3.0], Relation::Le, 6.0)],
        );
        let std = standardize(&m).unwrap();
        assert_eq!(std.cols[0].name, "X1~");
        assert_eq!(std.c, vec![-2.0]);
        assert_eq!(std.a, vec![vec![-3.0]]);
        let origin = std.original_solution(&[2.0]);
        assert!((origin["X1"] + 2.0).abs() < 1e-12);
    }

    #[test]
    fn binary_columns_get_upper_bound_rows() {
        let m = model(
            Sense::Max,
            vec![2.0, 3.0],
            vec![SignRestriction::NonNegative, SignRestriction::Binary],
            vec![(vec![1.0, 1.0], Relation::Le, 5.0)],
        );
        let std = standardize(&m).unwrap();
        assert_eq!(std.num_rows(), 2);
        assert_eq!(std.a[1], vec![0.0, 1.0]);
        assert_eq!(std.b[1], 1.0);
        assert!(std.cols[1].is_binary && std.cols[1].is_integer);
    }

    #[test]
    fn ge_and_eq_rows_are_rejected_strictly() {
        let m = model(
            Sense::Min,
            vec![4.0, 1.0],
            vec![SignRestriction::NonNegative; 2],
            vec![(vec![3.0, 1.0], Relation::Eq, 3.0)],
        );
        assert!(matches!(
            standardize(&m),
            Err(SolverError::UnsupportedForm(_))
        ));

        let m = model(
            Sense::Min,
            vec![4.0, 1.0],
            vec![SignRestriction::NonNegative; 2],
            vec![(vec![4.0, 3.0], Relation::Ge, 6.0)],
        );
        assert!(matches!(
            standardize(&m),
            Err(SolverError::UnsupportedForm(_))
        ));
    }

    #[test]
    fn negative_rhs_is_rejected_strictly() {
        let m = model(
            Sense::Max,
            vec![1.0],
            vec![SignRestriction::NonNegative],
            vec![(vec![1.0], Relation::Le, -2.0)],
        );
        assert!(matches!(
            standardize(&m),
            Err(SolverError::UnsupportedForm(_))
        ));
    }

    #[test]
    fn flipping_standardization_negates_ge_rows() {
        let m = model(
            Sense::Min,
            vec![4.0, 12.0],
            vec![SignRestriction::NonNegative; 2],
            vec![(vec![1.0, 3.0], Relation::Ge, 3.0)],
        );
        let std = standardize_flipping(&m).unwrap();
        assert_eq!(std.a, vec![vec![-1.0, -3.0]]);
        assert_eq!(std.b, vec![-3.0]);
    }

    #[test]
    fn duplicate_row_detection_uses_tolerance() {
        let m = model(
            Sense::Max,
            vec![1.0, 1.0],
            vec![SignRestriction::NonNegative; 2],
            vec![(vec![1.0, 0.0], Relation::Le, 3.0)],
        );
        let std = standardize(&m).unwrap();
        assert!(std.has_duplicate_row(&[1.0 + 1e-12, 0.0], 3.0, 1e-9));
        assert!(!std.has_duplicate_row(&[1.0, 0.0], 4.0, 1e-9));
    }
}
