use thiserror::Error;

/// Failures surfaced as `Err` values.
///
/// Terminal solver verdicts (infeasible, unbounded, iteration/node/cut
/// limits) are reported as a [`crate::SolveStatus`] on the solution
/// instead; only conditions that prevent a solve from producing a
/// solution at all land here.
#[derive(Error, Debug, Clone)]
pub enum SolverError {
    /// The model cannot be brought into <=-only standard form.
    #[error("unsupported form: {0}")]
    UnsupportedForm(String),

    /// A length invariant on the model was violated.
    #[error("malformed model: {0}")]
    MalformedModel(String),

    /// A pivot or basis inversion stayed under tolerance after clamping.
    #[error("numerically degenerate: {0}")]
    NumericallyDegenerate(String),

    /// The revised simplex could not locate an identity basis and has no
    /// phase-1 of its own.
    #[error("no identity basis: {0}")]
    NoIdentityBasis(String),
}

pub type SolverResult<T> = Result<T, SolverError>;
