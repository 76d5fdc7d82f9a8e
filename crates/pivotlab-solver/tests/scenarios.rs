//! End-to-end driver scenarios over the public API.

use pivotlab_solver::{
    editor::{EditOutcome, Editor},
    Algorithm, Model, Relation, Sense, SignRestriction, SolverConfig, SolverError, SolveStatus,
};

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
fn production_planning_reaches_the_known_optimum() {
    // max 3x + 5y s.t. x <= 4, 2y <= 12, 3x + 2y <= 18.
    let m = model(
        Sense::Max,
        vec![3.0, 5.0],
        vec![SignRestriction::NonNegative; 2],
        vec![
            (vec![1.0, 0.0], Relation::Le, 4.0),
            (vec![0.0, 2.0], Relation::Le, 12.0),
            (vec![3.0, 2.0], Relation::Le, 18.0),
        ],
    );

    for algorithm in [Algorithm::Primal, Algorithm::Dual, Algorithm::Revised] {
        let report = algorithm.solve(&m, &SolverConfig::default()).unwrap();
        assert_eq!(report.solution.status, SolveStatus::Optimal);
        assert!((report.solution.z - 36.0).abs() < 1e-6);
        assert!((report.solution.values["X1"] - 2.0).abs() < 1e-6);
        assert!((report.solution.values["X2"] - 6.0).abs() < 1e-6);
        assert!(report
            .trace
            .entries()
            .iter()
            .any(|e| e.contains("optimal")));
    }
}

#[test]
fn mixed_binary_model_solves_by_branch_and_bound() {
    // max 2x + 3y s.t. x + y <= 5, 2x + y <= 8, y binary. Only y is
    // integral, so the optimum keeps x continuous at 3.5.
    let m = model(
        Sense::Max,
        vec![2.0, 3.0],
        vec![SignRestriction::NonNegative, SignRestriction::Binary],
        vec![
            (vec![1.0, 1.0], Relation::Le, 5.0),
            (vec![2.0, 1.0], Relation::Le, 8.0),
        ],
    );

    let report = Algorithm::BranchAndBound
        .solve(&m, &SolverConfig::default())
        .unwrap();
    assert_eq!(report.solution.status, SolveStatus::Optimal);
    assert!((report.solution.z - 10.0).abs() < 1e-6);
    assert!((report.solution.values["X1"] - 3.5).abs() < 1e-6);
    assert!((report.solution.values["X2"] - 1.0).abs() < 1e-6);
}

#[test]
fn equality_and_ge_rows_are_unsupported_at_standardization() {
    // min 4x + y s.t. 3x + y = 3, 4x + 3y >= 6, x + 2y <= 4.
    let m = model(
        Sense::Min,
        vec![4.0, 1.0],
        vec![SignRestriction::NonNegative; 2],
        vec![
            (vec![3.0, 1.0], Relation::Eq, 3.0),
            (vec![4.0, 3.0], Relation::Ge, 6.0),
            (vec![1.0, 2.0], Relation::Le, 4.0),
        ],
    );

    let result = Algorithm::Primal.solve(&m, &SolverConfig::default());
    assert!(matches!(result, Err(SolverError::UnsupportedForm(_))));
}

#[test]
fn open_rays_report_unbounded() {
    // max x + y s.t. x - y <= 1, -x + y <= 1.
    let m = model(
        Sense::Max,
        vec![1.0, 1.0],
        vec![SignRestriction::NonNegative; 2],
        vec![
            (vec![1.0, -1.0], Relation::Le, 1.0),
            (vec![-1.0, 1.0], Relation::Le, 1.0),
        ],
    );

    let report = Algorithm::Primal.solve(&m, &SolverConfig::default()).unwrap();
    assert_eq!(report.solution.status, SolveStatus::Unbounded);
}

#[test]
fn gomory_cuts_prove_the_integer_optimum() {
    // max 5x + 4y s.t. 6x + 4y <= 24, x + 2y <= 6, both integer. The
    // relaxation sits at (3, 1.5); cuts finish at the integer optimum
    // (4, 0) with z = 20 and no fractional integers left.
    let m = model(
        Sense::Max,
        vec![5.0, 4.0],
        vec![SignRestriction::Integer; 2],
        vec![
            (vec![6.0, 4.0], Relation::Le, 24.0),
            (vec![1.0, 2.0], Relation::Le, 6.0),
        ],
    );

    let report = Algorithm::CuttingPlane
        .solve(&m, &SolverConfig::default())
        .unwrap();
    assert_eq!(report.solution.status, SolveStatus::Optimal);
    assert!((report.solution.z - 20.0).abs() < 1e-4);
    for value in report.solution.values.values() {
        assert!((value - value.round()).abs() < 1e-4);
    }

    // Branch-and-bound agrees on the optimum.
    let bnb = Algorithm::BranchAndBound
        .solve(&m, &SolverConfig::default())
        .unwrap();
    assert!((bnb.solution.z - 20.0).abs() < 1e-6);
}

#[test]
fn in_range_objective_edit_keeps_the_basis_and_updates_z() {
    let m = model(
        Sense::Max,
        vec![3.0, 5.0],
        vec![SignRestriction::NonNegative; 2],
        vec![
            (vec![1.0, 0.0], Relation::Le, 4.0),
            (vec![0.0, 2.0], Relation::Le, 12.0),
            (vec![3.0, 2.0], Relation::Le, 18.0),
        ],
    );

    let mut editor = Editor::new(m, SolverConfig::default()).unwrap();
    let outcome = editor.edit("Z", "X1", 4.0).unwrap();
    let EditOutcome::InRange { solution, .. } = outcome else {
        panic!("raising the coefficient to 4 stays inside the range");
    };
    assert_eq!(solution.status, SolveStatus::Optimal);
    assert!((solution.z - 38.0).abs() < 1e-6);
    assert!((solution.values["X1"] - 2.0).abs() < 1e-6);
    assert!((solution.values["X2"] - 6.0).abs() < 1e-6);
}

#[test]
fn result_files_land_in_the_requested_directory() {
    let dir = std::env::temp_dir().join(format!(
        "pivotlab-scenario-{}",
        std::process::id()
    ));
    std::fs::create_dir_all(&dir).unwrap();

    let m = model(
        Sense::Max,
        vec![5.0, 4.0],
        vec![SignRestriction::Integer; 2],
        vec![
            (vec![6.0, 4.0], Relation::Le, 24.0),
            (vec![1.0, 2.0], Relation::Le, 6.0),
        ],
    );
    let config = SolverConfig::default().with_result_dir(&dir);
    let report = Algorithm::BranchAndBound.solve(&m, &config).unwrap();
    assert!(report
        .trace
        .entries()
        .last()
        .unwrap()
        .starts_with("result file:"));

    let written: Vec<_> = std::fs::read_dir(&dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    assert!(written
        .iter()
        .any(|name| name.starts_with("BranchAndBound_Result_") && name.ends_with(".txt")));

    std::fs::remove_dir_all(&dir).ok();
}
