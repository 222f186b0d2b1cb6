//! Stateless matrix primitives.
//!
//! Every function returns a fresh matrix; no operand is ever mutated, so
//! results can be cached by one layer and read by another without aliasing.
//! Shape preconditions are checked up front and reported as
//! [`NnError::ShapeMismatch`].

use crate::activation;
use crate::error::{NnError, Result};
use crate::math::matrix::Matrix;

/// Standard matrix product. Requires `a.cols == b.rows`.
pub fn multiply(a: &Matrix, b: &Matrix) -> Result<Matrix> {
    if a.cols() != b.rows() {
        return Err(NnError::shape("multiply", a.shape(), b.shape()));
    }

    let mut res = Matrix::zeros(a.rows(), b.cols())?;

    for i in 0..a.rows() {
        let row_a = a.row(i);
        for j in 0..b.cols() {
            let mut sum = 0.0;

            for (k, &x) in row_a.iter().enumerate() {
                sum += x * b.get(k, j);
            }

            res.set(i, j, sum);
        }
    }

    Ok(res)
}

pub fn transpose(a: &Matrix) -> Matrix {
    a.transpose()
}

/// Hadamard product. Requires identical shapes.
pub fn elementwise_multiply(a: &Matrix, b: &Matrix) -> Result<Matrix> {
    a.zip_with(b, "elementwise_multiply", |x, y| x * y)
}

/// Requires identical shapes.
pub fn subtract(a: &Matrix, b: &Matrix) -> Result<Matrix> {
    a.zip_with(b, "subtract", |x, y| x - y)
}

pub fn scale(a: &Matrix, s: f64) -> Matrix {
    a.map(|x| x * s)
}

/// Adds a `1 x a.cols` bias row to every row of `a`.
pub fn add_bias(a: &Matrix, bias: &Matrix) -> Result<Matrix> {
    if bias.rows() != 1 || bias.cols() != a.cols() {
        return Err(NnError::shape("add_bias", a.shape(), bias.shape()));
    }

    let mut res = a.clone();
    let b = bias.row(0);
    for i in 0..res.rows() {
        for (j, &bj) in b.iter().enumerate() {
            res.set(i, j, a.get(i, j) + bj);
        }
    }

    Ok(res)
}

pub fn sigmoid(a: &Matrix) -> Matrix {
    a.map(activation::sigmoid)
}

pub fn sigmoid_derivative(a: &Matrix) -> Matrix {
    a.map(activation::sigmoid_derivative)
}
