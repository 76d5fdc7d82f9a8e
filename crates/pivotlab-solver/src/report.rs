//! Result files and the sensitivity log.
//!
//! File writes never fail a solve: any I/O error becomes a final trace
//! line and the in-memory result stands.

use std::fmt::Write as _;
use std::fs;
use std::io::Write as _;
use std::path::Path;

use crate::model::Model;
use crate::solution::Solution;
use crate::tableau::Tableau;
use crate::trace::Trace;

/// Render a tableau as a fixed-width table with row and column headers.
pub fn render_tableau(tableau: &Tableau) -> String {
    let mut out = String::new();
    let _ = write!(out, "{:>10}", "");
    for name in tableau.col_names() {
        let _ = write!(out, " {name:>10}");
    }
    let _ = writeln!(out, " {:>10}", "RHS");
    for i in 0..tableau.num_rows() {
        let _ = write!(out, "{:>10}", format!("R{}", i + 1));
        for j in 0..=tableau.num_cols() {
            let _ = write!(out, " {:>10.4}", tableau.get(i, j));
        }
        let _ = writeln!(out);
    }
    let obj = tableau.objective_row();
    let _ = write!(out, "{:>10}", "Z");
    for j in 0..=tableau.num_cols() {
        let _ = write!(out, " {:>10.4}", tableau.get(obj, j));
    }
    let _ = writeln!(out);
    out
}

fn result_body(model: &Model, solution: &Solution, note: &str, trace: &Trace) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Status: {}", solution.status.as_str());
    let _ = writeln!(out, "Sense: {}", model.sense.as_str());
    let _ = writeln!(out, "Z = {:.6}", solution.z);
    let _ = writeln!(out);
    for (label, value) in &solution.values {
        let _ = writeln!(out, "  {label:<12} {value:>12.6}");
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "Note: {note}");
    let _ = writeln!(out);
    let _ = writeln!(out, "Steps:");
    for entry in trace.entries() {
        let _ = writeln!(out, "  {entry}");
    }
    out
}

/// Write `<driver>_Result_<timestamp>.txt` under `dir`.
///
/// Success and failure both leave a final trace line.
pub fn write_result_file(
    driver: &str,
    dir: &Path,
    model: &Model,
    solution: &Solution,
    note: &str,
    trace: &mut Trace,
) {
    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    let path = dir.join(format!("{driver}_Result_{timestamp}.txt"));
    let body = result_body(model, solution, note, trace);
    match fs::write(&path, body) {
        Ok(()) => trace.push(format!("result file: {}", path.display())),
        Err(err) => trace.push(format!("result file write failed: {err}")),
    }
}

/// Append one edit record to `sensitivity_analysis_log.txt` under `dir`.
pub fn append_sensitivity_log(dir: &Path, entry: &str, trace: &mut Trace) {
    let path = dir.join("sensitivity_analysis_log.txt");
    let result = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .and_then(|mut file| writeln!(file, "{entry}"));
    match result {
        Ok(()) => trace.push(format!("sensitivity log: {}", path.display())),
        Err(err) => trace.push(format!("sensitivity log write failed: {err}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SolverConfig;
    use crate::model::{Relation, Sense, SignRestriction};
    use crate::standard::standardize;

    #[test]
    fn tableau_rendering_lists_every_column() {
        let mut model = Model::with_default_labels(
            Sense::Max,
            vec![3.0, 5.0],
            vec![SignRestriction::NonNegative; 2],
        )
        .unwrap();
        model
            .add_constraint(vec![1.0, 0.0], Relation::Le, 4.0)
            .unwrap();
        let std = standardize(&model).unwrap();
        let tableau = Tableau::from_standard(&std, &SolverConfig::default());

        let rendered = render_tableau(&tableau);
        assert!(rendered.contains("X1"));
        assert!(rendered.contains("S1"));
        assert!(rendered.contains("RHS"));
        assert!(rendered.lines().count() == 3);
    }

    #[test]
    fn write_failure_is_a_trace_line_not_an_error() {
        let model = Model::with_default_labels(
            Sense::Max,
            vec![1.0],
            vec![SignRestriction::NonNegative],
        )
        .unwrap();
        let solution = Solution::infeasible();
        let mut trace = Trace::new();
        write_result_file(
            "BranchAndBound",
            Path::new("/nonexistent-pivotlab-dir"),
            &model,
            &solution,
            "note",
            &mut trace,
        );
        assert!(trace
            .entries()
            .last()
            .unwrap()
            .contains("result file write failed"));
    }
}
