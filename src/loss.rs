//! Loss functions
//!
//! A [`Loss`] scores a batch of predictions against targets and produces the
//! gradient that seeds [`SequentialModel::backward`](crate::model::SequentialModel::backward).
//! Targets and predictions are laid out one sample per row.

use crate::error::NnResult;
use crate::linalg::{clamp, log, scalar, Matrix, Scalar};

/// Lower clamp bound applied to predictions before taking the logarithm.
pub const LOG_CLAMP_MIN: f64 = 1e-15;
/// Upper clamp bound applied to predictions before taking the logarithm.
pub const LOG_CLAMP_MAX: f64 = 1e15;

pub trait Loss<T: Scalar> {
    /// Scalar loss value for the batch.
    fn forward(&self, y_true: &Matrix<T>, y_pred: &Matrix<T>) -> NnResult<T>;

    /// Gradient of the loss with respect to `y_pred`.
    fn backward(&self, y_true: &Matrix<T>, y_pred: &Matrix<T>) -> NnResult<Matrix<T>>;
}

/// Mean squared error.
///
/// ```
/// use micro_nn::linalg::Matrix;
/// use micro_nn::loss::{Loss, Mse};
///
/// let y_true = Matrix::from_rows(vec![vec![1.0f64], vec![2.0]]).unwrap();
/// let y_pred = Matrix::from_rows(vec![vec![2.0], vec![4.0]]).unwrap();
/// assert_eq!(Mse.forward(&y_true, &y_pred).unwrap(), 2.5);
/// assert_eq!(Mse.backward(&y_true, &y_pred).unwrap().as_slice(), &[2.0, 4.0]);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Mse;

impl<T: Scalar> Loss<T> for Mse {
    fn forward(&self, y_true: &Matrix<T>, y_pred: &Matrix<T>) -> NnResult<T> {
        let diff = y_pred.try_sub(y_true)?;
        if diff.is_empty() {
            return Ok(T::zero());
        }
        let count: T = scalar(diff.len() as f64);
        Ok(diff.powi(2).sum() / count)
    }

    fn backward(&self, y_true: &Matrix<T>, y_pred: &Matrix<T>) -> NnResult<Matrix<T>> {
        Ok(y_pred.try_sub(y_true)?.scale(scalar(2.0)))
    }
}

/// Cross-entropy over probability rows, usually fed by a sigmoid or softmax.
///
/// The loss is summed over the whole batch. Its gradient `y_pred - y_true`
/// is the one for a softmax/cross-entropy pair, taken with respect to the
/// pre-activation values.
#[derive(Debug, Clone, Copy, Default)]
pub struct CrossEntropy;

impl<T: Scalar> Loss<T> for CrossEntropy {
    fn forward(&self, y_true: &Matrix<T>, y_pred: &Matrix<T>) -> NnResult<T> {
        let clamped = clamp(y_pred, scalar(LOG_CLAMP_MIN), scalar(LOG_CLAMP_MAX));
        let log_likelihood = y_true.elementwise_multiply(&log(&clamped))?;
        Ok(-log_likelihood.sum())
    }

    fn backward(&self, y_true: &Matrix<T>, y_pred: &Matrix<T>) -> NnResult<Matrix<T>> {
        y_pred.try_sub(y_true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NnError;
    use approx::assert_relative_eq;

    fn m(rows: Vec<Vec<f64>>) -> Matrix<f64> {
        Matrix::from_rows(rows).unwrap()
    }

    #[test]
    fn test_mse_perfect_prediction() {
        let y = m(vec![vec![1.0, 2.0], vec![3.0, 4.0]]);
        assert_eq!(Mse.forward(&y, &y).unwrap(), 0.0);
        assert!(Mse.backward(&y, &y).unwrap().iter().all(|&g| g == 0.0));
    }

    #[test]
    fn test_mse_value_and_gradient() {
        let y_true = m(vec![vec![0.0, 0.0]]);
        let y_pred = m(vec![vec![1.0, -3.0]]);
        assert_relative_eq!(Mse.forward(&y_true, &y_pred).unwrap(), 5.0);
        assert_eq!(Mse.backward(&y_true, &y_pred).unwrap(), m(vec![vec![2.0, -6.0]]));
    }

    #[test]
    fn test_mse_shape_mismatch() {
        let y_true = m(vec![vec![0.0, 0.0, 0.0]]);
        let y_pred = m(vec![vec![1.0, 1.0]]);
        assert!(matches!(
            Mse.forward(&y_true, &y_pred),
            Err(NnError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_cross_entropy_one_hot() {
        let y_true = m(vec![vec![0.0, 1.0, 0.0]]);
        let y_pred = m(vec![vec![0.2, 0.5, 0.3]]);
        assert_relative_eq!(
            CrossEntropy.forward(&y_true, &y_pred).unwrap(),
            -(0.5f64.ln()),
            epsilon = 1e-12
        );
        let grad = CrossEntropy.backward(&y_true, &y_pred).unwrap();
        assert_relative_eq!(grad.as_slice()[1], -0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_cross_entropy_clamps_zero_probability() {
        let y_true = m(vec![vec![1.0]]);
        let y_pred = m(vec![vec![0.0]]);
        let loss = CrossEntropy.forward(&y_true, &y_pred).unwrap();
        assert!(loss.is_finite());
        assert_relative_eq!(loss, -(1e-15f64.ln()), epsilon = 1e-9);
    }
}
