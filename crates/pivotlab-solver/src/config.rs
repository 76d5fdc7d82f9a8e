use std::path::PathBuf;

/// Tolerances and iteration caps shared by every driver.
///
/// All numerical tuning lives here; the drivers take the configuration
/// by reference and keep no global state.
#[derive(Debug, Clone)]
pub struct SolverConfig {
    /// Matrix tolerance; entries within `eps` of zero count as zero.
    pub eps: f64,
    /// Integrality tolerance for branch-and-bound and cutting planes.
    pub frac_eps: f64,
    /// Tolerance when scanning for identity basis columns.
    pub basis_eps: f64,
    /// Fractional parts this close to 0 or 1 are clamped to zero when a
    /// Gomory cut row is built.
    pub frac_clamp: f64,
    /// Incumbent-improvement and bound-pruning epsilon.
    pub bound_eps: f64,
    /// Strong-duality comparison tolerance.
    pub duality_eps: f64,
    /// Primal and dual simplex iteration cap.
    pub max_simplex_iterations: usize,
    /// Phase-1 repair loop iteration cap.
    pub max_repair_iterations: usize,
    /// Revised simplex iteration cap.
    pub max_revised_iterations: usize,
    /// Gomory cut cap.
    pub max_cuts: usize,
    /// Branch-and-bound node cap.
    pub max_nodes: usize,
    /// When set, the branch-and-bound and cutting-plane drivers write a
    /// result file here and the editor appends to the sensitivity log.
    /// `None` disables all file output.
    pub result_dir: Option<PathBuf>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            eps: 1e-9,
            frac_eps: 1e-6,
            basis_eps: 1e-10,
            frac_clamp: 1e-12,
            bound_eps: 1e-9,
            duality_eps: 1e-6,
            max_simplex_iterations: 2000,
            max_repair_iterations: 1000,
            max_revised_iterations: 500,
            max_cuts: 50,
            max_nodes: 2000,
            result_dir: None,
        }
    }
}

impl SolverConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_simplex_iterations(mut self, max: usize) -> Self {
        self.max_simplex_iterations = max;
        self
    }

    pub fn with_max_nodes(mut self, max: usize) -> Self {
        self.max_nodes = max;
        self
    }

    pub fn with_max_cuts(mut self, max: usize) -> Self {
        self.max_cuts = max;
        self
    }

    pub fn with_result_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.result_dir = Some(dir.into());
        self
    }
}
