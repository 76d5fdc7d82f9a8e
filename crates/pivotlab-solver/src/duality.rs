//! Primal-dual construction and strong-duality verification.

use crate::config::SolverConfig;
use crate::error::SolverError;
use crate::model::{Model, Relation, Sense, SignRestriction};
use crate::primal;
use crate::solution::Solution;
use crate::trace::Trace;
use crate::two_phase;

/// Outcome of solving a model next to its dual.
#[derive(Debug, Clone)]
pub struct DualityReport {
    /// The constructed dual model
    pub dual: Model,
    pub primal_solution: Solution,
    pub dual_solution: Solution,
    /// Whether both optima matched within tolerance
    pub strong: bool,
}

/// Build the dual: swap `b` with `c`, transpose `A`, flip the sense.
///
/// Dual variables are non-negative and the dual rows are `>=` for a
/// `max` primal, `<=` for a `min` primal. Only continuous non-negative
/// primal variables have this textbook transformation.
pub fn dual_model(model: &Model) -> Result<Model, SolverError> {
    if model
        .signs
        .iter()
        .any(|s| *s != SignRestriction::NonNegative)
    {
        return Err(SolverError::UnsupportedForm(
            "dual construction requires non-negative continuous variables".to_string(),
        ));
    }
    if model
        .constraints
        .iter()
        .any(|c| c.relation != Relation::Le)
    {
        return Err(SolverError::UnsupportedForm(
            "dual construction requires a <=-only primal".to_string(),
        ));
    }

    let (sense, relation) = match model.sense {
        Sense::Max => (Sense::Min, Relation::Ge),
        Sense::Min => (Sense::Max, Relation::Le),
    };
    let m = model.num_constraints();
    let labels = (1..=m).map(|i| format!("Y{i}")).collect();
    let objective = model.constraints.iter().map(|c| c.rhs).collect();
    let mut dual = Model::new(
        sense,
        objective,
        vec![SignRestriction::NonNegative; m],
        labels,
    )?;
    for (j, &c_j) in model.objective.iter().enumerate() {
        let row = model
            .constraints
            .iter()
            .map(|c| c.coefficients[j])
            .collect();
        dual.add_constraint(row, relation, c_j)?;
    }
    Ok(dual)
}

/// Solve the model and its dual, and compare the optima.
pub fn verify(model: &Model, config: &SolverConfig) -> Result<(DualityReport, Trace), SolverError> {
    let dual = dual_model(model)?;
    let mut trace = Trace::new();
    trace.push(format!(
        "dual model: {} variables, {} constraints, sense {}",
        dual.num_variables(),
        dual.num_constraints(),
        dual.sense.as_str()
    ));

    let mut primal_report = primal::solve(model, config)?;
    trace.append(&mut primal_report.trace);
    // The dual of a max primal carries >= rows, so it goes through the
    // flip-and-repair pipeline.
    let mut dual_report = two_phase::solve(&dual, config)?;
    trace.append(&mut dual_report.trace);

    let primal_solution = primal_report.solution;
    let dual_solution = dual_report.solution;
    let strong = primal_solution.status.is_optimal()
        && dual_solution.status.is_optimal()
        && (primal_solution.z - dual_solution.z).abs() < config.duality_eps;
    trace.push(if strong {
        format!(
            "strong duality: both optima at {:.6}",
            primal_solution.z
        )
    } else {
        format!(
            "weak duality only: primal {:.6}, dual {:.6}",
            primal_solution.z, dual_solution.z
        )
    });

    Ok((
        DualityReport {
            dual,
            primal_solution,
            dual_solution,
            strong,
        },
        trace,
    ))
}
