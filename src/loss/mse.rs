use crate::error::Result;
use crate::math::matrix::Matrix;
use crate::math::ops;

pub struct MseLoss;

impl MseLoss {
    /// Scalar MSE over every element: mean((predicted - expected)²)
    pub fn loss(predicted: &Matrix, expected: &Matrix) -> Result<f64> {
        let diff = ops::subtract(predicted, expected)?;
        let n = (diff.rows() * diff.cols()) as f64;
        let sum: f64 = diff.data().iter().flatten().map(|d| d * d).sum();
        Ok(sum / n)
    }

    /// Per-output gradient: predicted - expected
    pub fn derivative(predicted: &Matrix, expected: &Matrix) -> Result<Matrix> {
        ops::subtract(predicted, expected)
    }
}
