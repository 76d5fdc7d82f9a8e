//! Dense simplex tableau.
//!
//! Layout: rows `0..m-1` are constraints, row `m` is the objective.
//! Columns `0..n'-1` are structural, `n'..n'+m-1` slacks, and the last
//! column is the right-hand side. The objective row holds `-c_j` per
//! structural column, so its right-hand side is the current objective
//! value.

use crate::config::SolverConfig;
use crate::standard::StandardModel;

#[derive(Debug, Clone)]
pub struct Tableau {
    data: Vec<Vec<f64>>,
    basis: Vec<usize>,
    col_names: Vec<String>,
    n_structural: usize,
    eps: f64,
}

impl Tableau {
    /// Initial tableau for a standard model: `[A | I | b]` with the
    /// slacks basic.
    pub fn from_standard(std: &StandardModel, config: &SolverConfig) -> Self {
        let m = std.num_rows();
        let n = std.num_cols();
        let width = n + m + 1;

        let mut data = Vec::with_capacity(m + 1);
        for i in 0..m {
            let mut row = vec![0.0; width];
            row[..n].copy_from_slice(&std.a[i]);
            row[n + i] = 1.0;
            row[width - 1] = std.b[i];
            data.push(row);
        }
        let mut obj = vec![0.0; width];
        for (j, &c_j) in std.c.iter().enumerate() {
            obj[j] = -c_j;
        }
        data.push(obj);

        let mut col_names: Vec<String> = std.cols.iter().map(|c| c.name.clone()).collect();
        col_names.extend((1..=m).map(|i| format!("S{i}")));

        Self {
            data,
            basis: (n..n + m).collect(),
            col_names,
            n_structural: n,
            eps: config.eps,
        }
    }

    /// Number of constraint rows.
    pub fn num_rows(&self) -> usize {
        self.data.len() - 1
    }

    /// Number of columns excluding the right-hand side.
    pub fn num_cols(&self) -> usize {
        self.col_names.len()
    }

    pub fn objective_row(&self) -> usize {
        self.data.len() - 1
    }

    pub fn rhs_col(&self) -> usize {
        self.col_names.len()
    }

    pub fn n_structural(&self) -> usize {
        self.n_structural
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[row][col]
    }

    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        self.data[row][col] = value;
    }

    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i]
    }

    pub fn rhs(&self, i: usize) -> f64 {
        self.data[i][self.rhs_col()]
    }

    /// Objective value of the current basic solution (maximization form).
    pub fn z(&self) -> f64 {
        self.data[self.objective_row()][self.rhs_col()]
    }

    pub fn basis(&self) -> &[usize] {
        &self.basis
    }

    pub fn set_basis(&mut self, row: usize, col: usize) {
        self.basis[row] = col;
    }

    pub fn col_name(&self, j: usize) -> &str {
        &self.col_names[j]
    }

    pub fn col_names(&self) -> &[String] {
        &self.col_names
    }

    /// Index of the column named `name`, if any.
    pub fn col_index(&self, name: &str) -> Option<usize> {
        self.col_names.iter().position(|n| n == name)
    }

    /// Smallest right-hand side over the constraint rows, with its row.
    pub fn most_negative_rhs(&self) -> Option<(usize, f64)> {
        (0..self.num_rows())
            .map(|i| (i, self.rhs(i)))
            .min_by(|a, b| a.1.total_cmp(&b.1))
    }

    /// Value taken by column `col` in the current basic solution.
    pub fn column_value(&self, col: usize) -> f64 {
        self.basis
            .iter()
            .position(|&b| b == col)
            .map(|row| self.rhs(row))
            .unwrap_or(0.0)
    }

    /// Current basic solution over every column (RHS excluded).
    pub fn basic_solution(&self) -> Vec<f64> {
        let mut values = vec![0.0; self.num_cols()];
        for (row, &col) in self.basis.iter().enumerate() {
            values[col] = self.rhs(row);
        }
        values
    }

    /// Gauss-Jordan pivot on `(row, col)`.
    ///
    /// A pivot element under tolerance is clamped to `±eps` before the
    /// elimination; this is the only mutation the simplex drivers use,
    /// and it keeps the basis columns an identity over the constraint
    /// rows.
    pub fn pivot(&mut self, row: usize, col: usize) {
        let mut pivot_val = self.data[row][col];
        if pivot_val.abs() < self.eps {
            pivot_val = if pivot_val < 0.0 { -self.eps } else { self.eps };
            self.data[row][col] = pivot_val;
        }
        let width = self.rhs_col() + 1;
        for j in 0..width {
            self.data[row][j] /= pivot_val;
        }
        for i in 0..self.data.len() {
            if i == row {
                continue;
            }
            let factor = self.data[i][col];
            if factor == 0.0 {
                continue;
            }
            for j in 0..width {
                self.data[i][j] -= factor * self.data[row][j];
            }
        }
    }

    /// Column acting as the basis vector for `row`: a `1` in that row
    /// and zeros elsewhere, within `tol`.
    pub fn basic_column_for_row(&self, row: usize, tol: f64) -> Option<usize> {
        (0..self.num_cols()).find(|&j| {
            (self.data[row][j] - 1.0).abs() <= tol
                && (0..self.num_rows())
                    .all(|i| i == row || self.data[i][j].abs() <= tol)
        })
    }

    /// Fresh tableau with one extra constraint row and one extra column
    /// inserted before the right-hand side.
    ///
    /// `row_entries` covers the existing columns; the new column holds
    /// `+1` in the new row and zeros elsewhere, and becomes basic in
    /// that row. Used to graft a cut row onto an optimal tableau.
    pub fn with_appended_row_and_column(
        &self,
        row_entries: &[f64],
        rhs: f64,
        col_name: String,
    ) -> Tableau {
        let old_width = self.num_cols();
        let new_col = old_width;

        let mut data = Vec::with_capacity(self.data.len() + 1);
        for (i, old_row) in self.data.iter().enumerate() {
            let mut row = Vec::with_capacity(old_width + 2);
            row.extend_from_slice(&old_row[..old_width]);
            row.push(0.0);
            row.push(old_row[old_width]);
            if i == self.objective_row() {
                // New constraint row goes in front of the objective.
                let mut cut = Vec::with_capacity(old_width + 2);
                cut.extend_from_slice(row_entries);
                cut.push(1.0);
                cut.push(rhs);
                data.push(cut);
            }
            data.push(row);
        }

        let mut basis = self.basis.clone();
        basis.push(new_col);
        let mut col_names = self.col_names.clone();
        col_names.push(col_name);

        Tableau {
            data,
            basis,
            col_names,
            n_structural: self.n_structural,
            eps: self.eps,
        }
    }
}
