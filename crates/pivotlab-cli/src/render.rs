//! Console rendering of models, solutions and ranging reports.

use pivotlab_solver::{
    editor::Editor, sensitivity, Model, SolveReport, SolverConfig, SolveStatus, Tableau,
};

pub fn print_model(model: &Model) {
    let objective = model
        .objective
        .iter()
        .zip(model.labels.iter())
        .map(|(c, label)| format!("{c:+} {label}"))
        .collect::<Vec<_>>()
        .join(" ");
    println!("{} {objective}", model.sense.as_str());
    for (i, constraint) in model.constraints.iter().enumerate() {
        let lhs = constraint
            .coefficients
            .iter()
            .zip(model.labels.iter())
            .map(|(c, label)| format!("{c:+} {label}"))
            .collect::<Vec<_>>()
            .join(" ");
        println!(
            "R{}: {lhs} {} {}",
            i + 1,
            constraint.relation.as_str(),
            constraint.rhs
        );
    }
    let signs = model
        .signs
        .iter()
        .map(|s| s.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    println!("signs: {signs}");
}

pub fn print_solution(model: &Model, report: &SolveReport) {
    let solution = &report.solution;
    println!("Status: {}", solution.status.as_str());
    match solution.status {
        SolveStatus::Infeasible => {
            println!("No point satisfies every constraint.");
        }
        SolveStatus::Unbounded => {
            println!("The objective can be improved without bound.");
        }
        _ => {
            println!("{} Z = {:.4}", model.sense.as_str(), solution.z);
            println!();
            for (label, value) in &solution.values {
                println!("  {label:<12} {value:>12.4}");
            }
        }
    }
}

/// Ranging for every objective coefficient and every right-hand side,
/// computed on a fresh optimal tableau of the model.
pub fn print_analysis(model: &Model, config: &SolverConfig) {
    let editor = match Editor::new(model.clone(), config.clone()) {
        Ok(editor) => editor,
        Err(e) => {
            println!();
            println!("Analysis unavailable: {e}");
            return;
        }
    };
    let tableau: &Tableau = editor.tableau();

    println!();
    println!("Objective ranging:");
    println!(
        "  {:<12} {:>12} {:>14} {:>14}",
        "variable", "current", "decrease", "increase"
    );
    for label in &model.labels {
        let mut scratch = pivotlab_solver::Trace::new();
        if let Ok(range) = sensitivity::range_for(
            editor.standard(),
            tableau,
            sensitivity::OBJECTIVE_ROW,
            label,
            config,
            &mut scratch,
        ) {
            println!(
                "  {label:<12} {:>12.4} {:>14.4} {:>14.4}",
                range.current, range.allowable_decrease, range.allowable_increase
            );
        }
    }

    println!();
    println!("Right-hand side ranging:");
    println!(
        "  {:<12} {:>12} {:>14} {:>14}",
        "row", "shadow", "current", "decrease"
    );
    for i in 1..=model.num_constraints() {
        let mut scratch = pivotlab_solver::Trace::new();
        let row = format!("R{i}");
        if let Ok(range) = sensitivity::range_for(
            editor.standard(),
            tableau,
            &row,
            sensitivity::RHS_COLUMN,
            config,
            &mut scratch,
        ) {
            println!(
                "  {row:<12} {:>12.4} {:>14.4} {:>14.4}",
                range.shadow_price.unwrap_or(0.0),
                range.current,
                range.allowable_decrease
            );
        }
    }
}
