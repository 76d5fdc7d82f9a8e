//! Guarded model edits on an optimal tableau.
//!
//! An edit is first ranged through the sensitivity module. Inside the
//! allowable range the stored tableau cell is rewritten in place and
//! the current basis declared still optimal; outside it the model is
//! re-standardized and re-solved, with a dual-simplex pass when the new
//! tableau starts with a negative right-hand side.

use std::fmt::Write as _;

use crate::config::SolverConfig;
use crate::dual::{self, DualOutcome};
use crate::error::SolverError;
use crate::model::{Model, Relation, Sense, SignRestriction};
use crate::primal::{self, PrimalOutcome};
use crate::report;
use crate::sensitivity::{self, RangeKind, RangeReport, OBJECTIVE_ROW, RHS_COLUMN};
use crate::solution::{Solution, SolveStatus};
use crate::standard::{standardize, standardize_flipping, StandardModel};
use crate::tableau::Tableau;
use crate::trace::Trace;

/// How an edit was absorbed.
#[derive(Debug, Clone)]
pub enum EditOutcome {
    /// The new value stayed inside the allowable range; the tableau was
    /// patched in place and the basis kept.
    InRange {
        solution: Solution,
        range: RangeReport,
    },
    /// The new value left the range; the model was re-solved.
    Reoptimized {
        solution: Solution,
        range: RangeReport,
    },
}

impl EditOutcome {
    pub fn solution(&self) -> &Solution {
        match self {
            EditOutcome::InRange { solution, .. } => solution,
            EditOutcome::Reoptimized { solution, .. } => solution,
        }
    }
}

/// Holds a model together with its optimal tableau and applies edits.
pub struct Editor {
    model: Model,
    config: SolverConfig,
    std: StandardModel,
    tableau: Tableau,
    status: SolveStatus,
    trace: Trace,
}

impl Editor {
    /// Solve the model to optimality and keep the tableau for editing.
    pub fn new(model: Model, config: SolverConfig) -> Result<Self, SolverError> {
        let std = standardize(&model)?;
        let mut tableau = Tableau::from_standard(&std, &config);
        let mut trace = Trace::new();
        match primal::run(&mut tableau, &mut trace, &config) {
            PrimalOutcome::Optimal => {}
            PrimalOutcome::Unbounded => {
                return Err(SolverError::UnsupportedForm(
                    "editing needs an optimal tableau; the model is unbounded".to_string(),
                ))
            }
            PrimalOutcome::IterationLimit => {
                return Err(SolverError::UnsupportedForm(
                    "editing needs an optimal tableau; the iteration cap was hit".to_string(),
                ))
            }
        }
        Ok(Self {
            model,
            config,
            std,
            tableau,
            status: SolveStatus::Optimal,
            trace,
        })
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn tableau(&self) -> &Tableau {
        &self.tableau
    }

    pub fn standard(&self) -> &StandardModel {
        &self.std
    }

    pub fn trace(&self) -> &Trace {
        &self.trace
    }

    /// Current solution read off the stored tableau.
    pub fn solution(&self) -> Solution {
        match self.status {
            SolveStatus::Optimal => self.model_space_solution(),
            SolveStatus::Infeasible => Solution::infeasible(),
            SolveStatus::Unbounded => Solution::unbounded(),
            other => {
                let base = self.model_space_solution();
                Solution::capped(other, base.z, base.values)
            }
        }
    }

    /// Solution with `z` recomputed from the (possibly edited) model
    /// coefficients at the current basic point.
    fn model_space_solution(&self) -> Solution {
        let values = self.tableau.basic_solution();
        let origin = self.std.original_solution(&values[..self.std.num_cols()]);
        let point: Vec<f64> = self
            .model
            .labels
            .iter()
            .map(|label| origin[label])
            .collect();
        Solution::optimal(self.model.objective_value(&point), origin)
    }

    /// Apply `new_value` at `(row_name, col_name)`.
    pub fn edit(
        &mut self,
        row_name: &str,
        col_name: &str,
        new_value: f64,
    ) -> Result<EditOutcome, SolverError> {
        let range = sensitivity::range_for(
            &self.std,
            &self.tableau,
            row_name,
            col_name,
            &self.config,
            &mut self.trace,
        )?;
        let old_value = range.current;
        let new_std_value = self.update_model(&range, col_name, new_value)?;

        let outcome = if range.contains(new_std_value, self.config.eps) {
            let (row, col) = self.cell_of(&range)?;
            self.tableau.set(row, col, new_std_value);
            self.trace.push(format!(
                "edit {row_name}/{col_name}: {old_value:.6} -> {new_std_value:.6} in range, basis kept"
            ));
            EditOutcome::InRange {
                solution: self.solution(),
                range: range.clone(),
            }
        } else {
            self.trace.push(format!(
                "edit {row_name}/{col_name}: {old_value:.6} -> {new_std_value:.6} out of range, re-solving"
            ));
            let solution = self.resolve()?;
            EditOutcome::Reoptimized {
                solution,
                range: range.clone(),
            }
        };

        self.log_edit(&range, old_value, new_value);
        Ok(outcome)
    }

    /// Append a constraint and re-solve.
    pub fn add_constraint(
        &mut self,
        coefficients: Vec<f64>,
        relation: Relation,
        rhs: f64,
    ) -> Result<Solution, SolverError> {
        self.model.add_constraint(coefficients, relation, rhs)?;
        self.trace.push(format!(
            "add constraint R{}: re-solving",
            self.model.num_constraints()
        ));
        self.resolve()
    }

    /// Append a variable (objective entry, one column of coefficients,
    /// sign restriction) and re-solve.
    pub fn add_variable(
        &mut self,
        label: impl Into<String>,
        objective: f64,
        column: Vec<f64>,
        sign: SignRestriction,
    ) -> Result<Solution, SolverError> {
        if column.len() != self.model.num_constraints() {
            return Err(SolverError::MalformedModel(format!(
                "variable column has {} entries, expected {}",
                column.len(),
                self.model.num_constraints()
            )));
        }
        let label = label.into();
        self.model.objective.push(objective);
        for (constraint, coefficient) in self.model.constraints.iter_mut().zip(column) {
            constraint.coefficients.push(coefficient);
        }
        self.model.signs.push(sign);
        self.model.labels.push(label.clone());
        self.trace.push(format!("add variable {label}: re-solving"));
        self.resolve()
    }

    /// Push the edit into the model and return the edited quantity in
    /// standard-form space for the range test.
    fn update_model(
        &mut self,
        range: &RangeReport,
        col_name: &str,
        new_value: f64,
    ) -> Result<f64, SolverError> {
        match range.kind {
            RangeKind::ObjectiveNonBasic | RangeKind::ObjectiveBasic => {
                let col = self
                    .tableau
                    .col_index(col_name)
                    .expect("ranged column exists");
                let std_col = &self.std.cols[col];
                self.model.objective[std_col.orig_index] = new_value;
                let sense_factor = match self.model.sense {
                    Sense::Max => 1.0,
                    Sense::Min => -1.0,
                };
                Ok(sense_factor * new_value * std_col.part.sign())
            }
            RangeKind::RightHandSide => {
                let row = self.constraint_index(&range.row_name)?;
                let relation = self.model.constraints[row].relation;
                self.model.constraints[row].rhs = new_value;
                Ok(match relation {
                    Relation::Ge => -new_value,
                    _ => new_value,
                })
            }
            RangeKind::ConstraintCoefficient => {
                let row = self.constraint_index(&range.row_name)?;
                let col = self
                    .tableau
                    .col_index(col_name)
                    .expect("ranged column exists");
                let std_col = &self.std.cols[col];
                self.model.constraints[row].coefficients[std_col.orig_index] = new_value;
                let relation = self.model.constraints[row].relation;
                let row_sign = if relation == Relation::Ge { -1.0 } else { 1.0 };
                Ok(row_sign * new_value * std_col.part.sign())
            }
        }
    }

    /// Map a ranged row name onto the model's constraint index,
    /// rejecting the generated binary bound rows.
    fn constraint_index(&self, row_name: &str) -> Result<usize, SolverError> {
        let index: usize = row_name
            .strip_prefix('R')
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| {
                SolverError::MalformedModel(format!("unknown row {row_name}"))
            })?;
        if index == 0 || index > self.model.num_constraints() {
            return Err(SolverError::MalformedModel(format!(
                "row {row_name} is not an editable model constraint"
            )));
        }
        Ok(index - 1)
    }

    /// Tableau cell addressed by a range report.
    fn cell_of(&self, range: &RangeReport) -> Result<(usize, usize), SolverError> {
        if range.row_name == OBJECTIVE_ROW {
            let col = self
                .tableau
                .col_index(&range.col_name)
                .expect("ranged column exists");
            return Ok((self.tableau.objective_row(), col));
        }
        let row = self.constraint_index(&range.row_name)?;
        if range.col_name == RHS_COLUMN {
            return Ok((row, self.tableau.rhs_col()));
        }
        let col = self
            .tableau
            .col_index(&range.col_name)
            .expect("ranged column exists");
        Ok((row, col))
    }

    /// Re-standardize the edited model and solve it again.
    fn resolve(&mut self) -> Result<Solution, SolverError> {
        let std = standardize_flipping(&self.model)?;
        let mut tableau = Tableau::from_standard(&std, &self.config);

        let mut status = SolveStatus::Optimal;
        if tableau
            .most_negative_rhs()
            .map_or(false, |(_, rhs)| rhs < -self.config.eps)
        {
            self.trace
                .push("re-solve: negative right-hand side, dual simplex first");
            match dual::run(&mut tableau, &mut self.trace, &self.config) {
                DualOutcome::Feasible => {}
                DualOutcome::Infeasible => status = SolveStatus::Infeasible,
                DualOutcome::IterationLimit => status = SolveStatus::IterationLimit,
            }
        }
        if status == SolveStatus::Optimal {
            match primal::run(&mut tableau, &mut self.trace, &self.config) {
                PrimalOutcome::Optimal => {}
                PrimalOutcome::Unbounded => status = SolveStatus::Unbounded,
                PrimalOutcome::IterationLimit => status = SolveStatus::IterationLimit,
            }
        }

        self.std = std;
        self.tableau = tableau;
        self.status = status;
        Ok(self.solution())
    }

    /// Append the edit to the sensitivity log when file output is on.
    fn log_edit(&mut self, range: &RangeReport, old_value: f64, new_value: f64) {
        let Some(dir) = self.config.result_dir.clone() else {
            return;
        };
        let mut entry = String::new();
        let _ = writeln!(
            entry,
            "edit {}/{}: {} -> {} (allowable decrease {}, increase {})",
            range.row_name,
            range.col_name,
            old_value,
            new_value,
            range.allowable_decrease,
            range.allowable_increase
        );
        let _ = write!(entry, "{}", report::render_tableau(&self.tableau));
        report::append_sensitivity_log(&dir, &entry, &mut self.trace);
    }
}
