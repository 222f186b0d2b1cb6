use rand::distributions::Open01;
use rand::Rng;
use std::fmt;

use crate::error::{NnError, Result};

/// Dense row-major container. Rows are samples, columns are features.
///
/// The shape is fixed once built and never empty; contents may change.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<Vec<f64>>,
}

impl Matrix {
    pub fn zeros(rows: usize, cols: usize) -> Result<Matrix> {
        Matrix::filled(rows, cols, 0.0)
    }

    pub fn filled(rows: usize, cols: usize, value: f64) -> Result<Matrix> {
        check_dims(rows, cols)?;
        Ok(Matrix {
            rows,
            cols,
            data: vec![vec![value; cols]; rows],
        })
    }

    /// Independent uniform draws from the open interval (-1, 1).
    pub fn random<R: Rng>(rows: usize, cols: usize, rng: &mut R) -> Result<Matrix> {
        let mut res = Matrix::zeros(rows, cols)?;

        for i in 0..rows {
            for j in 0..cols {
                let u: f64 = rng.sample(Open01);
                res.data[i][j] = u * 2.0 - 1.0;
            }
        }

        Ok(res)
    }

    /// Builds a matrix from rows, rejecting empty or ragged input.
    pub fn from_data(data: Vec<Vec<f64>>) -> Result<Matrix> {
        let rows = data.len();
        let cols = data.first().map_or(0, Vec::len);
        check_dims(rows, cols)?;

        if let Some((i, row)) = data.iter().enumerate().find(|(_, r)| r.len() != cols) {
            return Err(NnError::InvalidConstruction(format!(
                "row {i} has {} columns, expected {cols}",
                row.len()
            )));
        }

        Ok(Matrix { rows, cols, data })
    }

    /// Single-row matrix, the shape of one sample.
    pub fn row_vector(values: Vec<f64>) -> Result<Matrix> {
        Matrix::from_data(vec![values])
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Panics if the index is out of bounds, like slice indexing.
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[row][col]
    }

    /// Panics if the index is out of bounds, like slice indexing.
    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        self.data[row][col] = value;
    }

    pub fn row(&self, row: usize) -> &[f64] {
        &self.data[row]
    }

    pub fn data(&self) -> &[Vec<f64>] {
        &self.data
    }

    pub fn into_data(self) -> Vec<Vec<f64>> {
        self.data
    }

    pub fn transpose(&self) -> Matrix {
        let data = (0..self.cols)
            .map(|j| (0..self.rows).map(|i| self.data[i][j]).collect())
            .collect();

        Matrix {
            rows: self.cols,
            cols: self.rows,
            data,
        }
    }

    /// Applies `functor` to every element, returning a new matrix.
    pub fn map<F>(&self, functor: F) -> Matrix
    where
        F: Fn(f64) -> f64,
    {
        Matrix {
            rows: self.rows,
            cols: self.cols,
            data: self
                .data
                .iter()
                .map(|row| row.iter().map(|&x| functor(x)).collect())
                .collect(),
        }
    }

    /// Combines two same-shape matrices element by element.
    pub(crate) fn zip_with<F>(&self, other: &Matrix, op: &'static str, functor: F) -> Result<Matrix>
    where
        F: Fn(f64, f64) -> f64,
    {
        if self.shape() != other.shape() {
            return Err(NnError::shape(op, self.shape(), other.shape()));
        }

        let data = self
            .data
            .iter()
            .zip(other.data.iter())
            .map(|(row_a, row_b)| row_a.iter().zip(row_b.iter()).map(|(&a, &b)| functor(a, b)).collect())
            .collect();

        Ok(Matrix {
            rows: self.rows,
            cols: self.cols,
            data,
        })
    }
}

fn check_dims(rows: usize, cols: usize) -> Result<()> {
    if rows == 0 || cols == 0 {
        return Err(NnError::InvalidConstruction(format!(
            "matrix must have at least one row and column, got {rows}x{cols}"
        )));
    }
    Ok(())
}

/// Debug dump: a `R r C c` header followed by one comma-separated line per row.
impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} r {} c", self.rows, self.cols)?;
        for row in &self.data {
            let line: Vec<String> = row.iter().map(|x| x.to_string()).collect();
            writeln!(f, "{}", line.join(","))?;
        }
        Ok(())
    }
}
