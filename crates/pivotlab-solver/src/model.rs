use crate::error::SolverError;

/// Optimization direction of the objective.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sense {
    Max,
    Min,
}

impl Sense {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sense::Max => "max",
            Sense::Min => "min",
        }
    }
}

/// Comparison operator of a constraint.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    /// Less than or equal (<=)
    Le,
    /// Greater than or equal (>=)
    Ge,
    /// Equal (=)
    Eq,
}

impl Relation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Relation::Le => "<=",
            Relation::Ge => ">=",
            Relation::Eq => "=",
        }
    }
}

/// Per-variable domain restriction.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignRestriction {
    /// x >= 0
    NonNegative,
    /// x <= 0
    NonPositive,
    /// Unrestricted in sign
    Unrestricted,
    /// x >= 0 and integral
    Integer,
    /// x in {0, 1}
    Binary,
}

impl SignRestriction {
    /// Whether the variable carries an integrality requirement.
    pub fn is_integer(&self) -> bool {
        matches!(self, SignRestriction::Integer | SignRestriction::Binary)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SignRestriction::NonNegative => "+",
            SignRestriction::NonPositive => "-",
            SignRestriction::Unrestricted => "urs",
            SignRestriction::Integer => "int",
            SignRestriction::Binary => "bin",
        }
    }
}

/// A single linear constraint.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    /// Coefficients for each variable, in variable order
    pub coefficients: Vec<f64>,
    /// Comparison operator
    pub relation: Relation,
    /// Right-hand side value
    pub rhs: f64,
}

/// A linear (or mixed-integer) programming model.
///
/// Every coefficient row has the same length as the objective, and every
/// variable has exactly one sign restriction and one label.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    /// Optimization direction
    pub sense: Sense,
    /// Objective coefficients, in variable order
    pub objective: Vec<f64>,
    /// Constraints, in input order
    pub constraints: Vec<Constraint>,
    /// Sign restriction per variable
    pub signs: Vec<SignRestriction>,
    /// Display label per variable, e.g. `X1..Xn`
    pub labels: Vec<String>,
}

impl Model {
    pub fn new(
        sense: Sense,
        objective: Vec<f64>,
        signs: Vec<SignRestriction>,
        labels: Vec<String>,
    ) -> Result<Self, SolverError> {
        if signs.len() != objective.len() {
            return Err(SolverError::MalformedModel(format!(
                "{} sign restrictions for {} variables",
                signs.len(),
                objective.len()
            )));
        }
        if labels.len() != objective.len() {
            return Err(SolverError::MalformedModel(format!(
                "{} labels for {} variables",
                labels.len(),
                objective.len()
            )));
        }
        Ok(Self {
            sense,
            objective,
            constraints: Vec::new(),
            signs,
            labels,
        })
    }

    /// Convenience constructor labelling the variables `X1..Xn`.
    pub fn with_default_labels(
        sense: Sense,
        objective: Vec<f64>,
        signs: Vec<SignRestriction>,
    ) -> Result<Self, SolverError> {
        let labels = (1..=objective.len()).map(|i| format!("X{i}")).collect();
        Self::new(sense, objective, signs, labels)
    }

    pub fn add_constraint(
        &mut self,
        coefficients: Vec<f64>,
        relation: Relation,
        rhs: f64,
    ) -> Result<(), SolverError> {
        if coefficients.len() != self.num_variables() {
            return Err(SolverError::MalformedModel(format!(
                "constraint has {} coefficients, expected {}",
                coefficients.len(),
                self.num_variables()
            )));
        }
        self.constraints.push(Constraint {
            coefficients,
            relation,
            rhs,
        });
        Ok(())
    }

    pub fn num_variables(&self) -> usize {
        self.objective.len()
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    /// Whether any variable carries an integrality requirement.
    pub fn has_integer_variables(&self) -> bool {
        self.signs.iter().any(|s| s.is_integer())
    }

    /// Evaluate the objective at a point given in variable order.
    pub fn objective_value(&self, x: &[f64]) -> f64 {
        self.objective
            .iter()
            .zip(x.iter())
            .map(|(&c, &v)| c * v)
            .sum()
    }
}
