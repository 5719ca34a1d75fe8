//! Elementwise activation layers
//!
//! Activation layers have no parameters. Each caches what its backward pass
//! needs during forward and combines the local derivative with the incoming
//! gradient by elementwise multiplication.

use crate::error::NnResult;
use crate::layers::{Layer, LayerId};
use crate::linalg::{Matrix, Scalar};
use crate::utils::activations::{relu, sigmoid, sigmoid_derivative, tanh_derivative};

/// Rectified linear unit.
///
/// Backward zeroes the gradient wherever the cached input was ≤ 0.
#[derive(Debug, Clone)]
pub struct ReLU<T> {
    id: LayerId,
    input: Matrix<T>,
}

impl<T: Scalar> ReLU<T> {
    pub fn new() -> Self {
        Self {
            id: LayerId::next(),
            input: Matrix::default(),
        }
    }
}

impl<T: Scalar> Default for ReLU<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Scalar> Layer<T> for ReLU<T> {
    fn forward(&mut self, input: &Matrix<T>) -> NnResult<Matrix<T>> {
        self.input = input.clone();
        Ok(input.unary_expr(relu))
    }

    fn backward(&mut self, grad_output: &Matrix<T>) -> NnResult<Matrix<T>> {
        let mask = self
            .input
            .unary_expr(|x| if x > T::zero() { T::one() } else { T::zero() });
        grad_output.elementwise_multiply(&mask)
    }

    fn id(&self) -> LayerId {
        self.id
    }

    fn name(&self) -> &'static str {
        "relu"
    }
}

/// Logistic sigmoid.
///
/// Backward evaluates `g * (1 - g)` on the incoming gradient `g` itself, not on
/// the cached activation, and multiplies the result elementwise with `g`.
/// Training dynamics of existing models depend on this exact formula.
#[derive(Debug, Clone)]
pub struct Sigmoid<T> {
    id: LayerId,
    output: Matrix<T>,
}

impl<T: Scalar> Sigmoid<T> {
    pub fn new() -> Self {
        Self {
            id: LayerId::next(),
            output: Matrix::default(),
        }
    }

    /// Activation produced by the latest forward call.
    pub fn output(&self) -> &Matrix<T> {
        &self.output
    }
}

impl<T: Scalar> Default for Sigmoid<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Scalar> Layer<T> for Sigmoid<T> {
    fn forward(&mut self, input: &Matrix<T>) -> NnResult<Matrix<T>> {
        self.output = input.unary_expr(sigmoid);
        Ok(self.output.clone())
    }

    fn backward(&mut self, grad_output: &Matrix<T>) -> NnResult<Matrix<T>> {
        let local = grad_output.unary_expr(sigmoid_derivative);
        grad_output.elementwise_multiply(&local)
    }

    fn id(&self) -> LayerId {
        self.id
    }

    fn name(&self) -> &'static str {
        "sigmoid"
    }
}

/// Hyperbolic tangent.
#[derive(Debug, Clone)]
pub struct Tanh<T> {
    id: LayerId,
    output: Matrix<T>,
}

impl<T: Scalar> Tanh<T> {
    pub fn new() -> Self {
        Self {
            id: LayerId::next(),
            output: Matrix::default(),
        }
    }
}

impl<T: Scalar> Default for Tanh<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Scalar> Layer<T> for Tanh<T> {
    fn forward(&mut self, input: &Matrix<T>) -> NnResult<Matrix<T>> {
        self.output = input.unary_expr(|x| x.tanh());
        Ok(self.output.clone())
    }

    fn backward(&mut self, grad_output: &Matrix<T>) -> NnResult<Matrix<T>> {
        let local = self.output.unary_expr(tanh_derivative);
        grad_output.elementwise_multiply(&local)
    }

    fn id(&self) -> LayerId {
        self.id
    }

    fn name(&self) -> &'static str {
        "tanh"
    }
}
