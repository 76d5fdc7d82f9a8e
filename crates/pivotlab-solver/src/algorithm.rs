use std::str::FromStr;

use crate::branch_bound;
use crate::config::SolverConfig;
use crate::cutting;
use crate::dual;
use crate::error::SolverError;
use crate::model::Model;
use crate::primal;
use crate::revised;
use crate::solution::SolveReport;

/// The closed set of solving strategies.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Algorithm {
    Primal,
    Dual,
    Revised,
    BranchAndBound,
    CuttingPlane,
}

impl Algorithm {
    /// Run the chosen driver over the model.
    pub fn solve(&self, model: &Model, config: &SolverConfig) -> Result<SolveReport, SolverError> {
        match self {
            Algorithm::Primal => primal::solve(model, config),
            Algorithm::Dual => dual::solve(model, config),
            Algorithm::Revised => revised::solve(model, config),
            Algorithm::BranchAndBound => branch_bound::solve(model, config),
            Algorithm::CuttingPlane => cutting::solve(model, config),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Algorithm::Primal => "primal",
            Algorithm::Dual => "dual",
            Algorithm::Revised => "revised",
            Algorithm::BranchAndBound => "bnb",
            Algorithm::CuttingPlane => "cut",
        }
    }
}

impl FromStr for Algorithm {
    type Err = SolverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "primal" => Ok(Algorithm::Primal),
            "dual" => Ok(Algorithm::Dual),
            "revised" => Ok(Algorithm::Revised),
            "bnb" | "branch-and-bound" => Ok(Algorithm::BranchAndBound),
            "cut" | "cutting-plane" => Ok(Algorithm::CuttingPlane),
            other => Err(SolverError::MalformedModel(format!(
                "unknown algorithm `{other}`; expected primal, dual, revised, bnb or cut"
            ))),
        }
    }
}
