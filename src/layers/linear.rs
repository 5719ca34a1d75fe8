//! Affine (fully connected) layer implementation
//!
//! This module provides a Linear layer (also known as Dense or Fully Connected)
//! that performs the transformation: output = input × weights + bias

use crate::error::NnResult;
use crate::layers::{Layer, LayerId, ParametricLayer};
use crate::linalg::{Matrix, Scalar};

/// How [`Linear::backward`] reduces the output gradient into a bias gradient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BiasReduction {
    /// Sum across each row (`rowwise_sum`), giving a `batch x 1` gradient.
    /// It matches a column bias (`out x 1`) whenever the batch size equals
    /// `out_features`, and a `1 x 1` bias for single-sample batches.
    #[default]
    Row,
    /// Sum over the batch dimension (`colwise_sum`), giving a `1 x out`
    /// gradient that matches the row bias created by [`Linear::new`].
    Batch,
}

/// Affine layer with a weight matrix and a bias.
///
/// Performs `Y = X·W + b` where X is the input (batch × in_features),
/// W is the weight matrix (in_features × out_features) and b is the bias,
/// broadcast across the batch.
///
/// Backward computes:
///
/// ```text
/// dW   = Xᵀ · dOut
/// db   = reduce(dOut)          (see BiasReduction)
/// dIn  = dOut · Wᵀ
/// ```
///
/// # Example
///
/// ```
/// use micro_nn::layers::{Layer, Linear, ParametricLayer};
/// use micro_nn::linalg::Matrix;
///
/// let mut layer = Linear::<f32>::new(2, 2);
/// layer.set_weights(
///     Matrix::from_rows(vec![vec![5.0, 6.0], vec![7.0, 8.0]]).unwrap(),
///     Matrix::from_rows(vec![vec![9.0], vec![10.0]]).unwrap(),
/// );
/// let x = Matrix::from_rows(vec![vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
/// let y = layer.forward(&x).unwrap();
/// assert_eq!(y.as_slice(), &[28.0, 31.0, 53.0, 60.0]);
/// ```
#[derive(Debug, Clone)]
pub struct Linear<T> {
    id: LayerId,
    weights: Matrix<T>,
    bias: Matrix<T>,
    d_weights: Matrix<T>,
    d_bias: Matrix<T>,
    input: Matrix<T>,
    bias_reduction: BiasReduction,
}

impl<T: Scalar> Linear<T> {
    /// Creates a layer with zero weights (`in_features x out_features`) and a
    /// zero `1 x out_features` bias.
    ///
    /// The bias gradient uses [`BiasReduction::Row`]. Training this row bias
    /// on batches of more than one sample needs
    /// `with_bias_reduction(BiasReduction::Batch)`; otherwise optimizers
    /// leave the bias unchanged and only update the weights.
    ///
    /// Use an initializer or [`ParametricLayer::set_weights`] to give it
    /// starting values.
    pub fn new(in_features: usize, out_features: usize) -> Self {
        Self::with_parameters(
            Matrix::zeros(in_features, out_features),
            Matrix::zeros(1, out_features),
        )
    }

    /// Creates a layer from explicit parameters.
    pub fn with_parameters(weights: Matrix<T>, bias: Matrix<T>) -> Self {
        Self {
            id: LayerId::next(),
            weights,
            bias,
            d_weights: Matrix::default(),
            d_bias: Matrix::default(),
            input: Matrix::default(),
            bias_reduction: BiasReduction::default(),
        }
    }

    /// Selects how the bias gradient is reduced.
    pub fn with_bias_reduction(mut self, bias_reduction: BiasReduction) -> Self {
        self.bias_reduction = bias_reduction;
        self
    }

    pub fn bias_reduction(&self) -> BiasReduction {
        self.bias_reduction
    }

    /// Number of input features (rows of W).
    pub fn in_features(&self) -> usize {
        self.weights.rows()
    }

    /// Number of output features (columns of W).
    pub fn out_features(&self) -> usize {
        self.weights.cols()
    }
}

impl<T: Scalar> Layer<T> for Linear<T> {
    fn forward(&mut self, input: &Matrix<T>) -> NnResult<Matrix<T>> {
        let output = input.matmul(&self.weights)?.try_add(&self.bias)?;
        self.input = input.clone();
        Ok(output)
    }

    fn backward(&mut self, grad_output: &Matrix<T>) -> NnResult<Matrix<T>> {
        let d_weights = self.input.transpose().matmul(grad_output)?;
        let d_input = grad_output.matmul(&self.weights.transpose())?;
        self.d_bias = match self.bias_reduction {
            BiasReduction::Batch => grad_output.colwise_sum(),
            BiasReduction::Row => grad_output.rowwise_sum(),
        };
        self.d_weights = d_weights;
        Ok(d_input)
    }

    fn id(&self) -> LayerId {
        self.id
    }

    fn name(&self) -> &'static str {
        "linear"
    }

    fn as_parametric(&self) -> Option<&dyn ParametricLayer<T>> {
        Some(self)
    }

    fn as_parametric_mut(&mut self) -> Option<&mut dyn ParametricLayer<T>> {
        Some(self)
    }
}

impl<T: Scalar> ParametricLayer<T> for Linear<T> {
    fn weights(&self) -> &Matrix<T> {
        &self.weights
    }

    fn bias(&self) -> &Matrix<T> {
        &self.bias
    }

    fn d_weights(&self) -> &Matrix<T> {
        &self.d_weights
    }

    fn d_bias(&self) -> &Matrix<T> {
        &self.d_bias
    }

    fn set_weights(&mut self, weights: Matrix<T>, bias: Matrix<T>) {
        self.weights = weights;
        self.bias = bias;
    }
}
