//! Layer trait definitions
//!
//! Every layer implements [`Layer`]. Layers with learnable parameters also
//! implement [`ParametricLayer`] and expose it through the
//! [`Layer::as_parametric`] capability query, so optimizers and initializers
//! can work on a heterogeneous `Vec<Box<dyn Layer<T>>>` without knowing the
//! concrete layer types.

use crate::error::NnResult;
use crate::layers::LayerId;
use crate::linalg::{Matrix, Scalar};

/// Core trait for neural network layers.
///
/// `forward` must cache whatever `backward` needs before returning. Callers
/// are expected to alternate forward and backward; calling `backward` first
/// works on the empty cached state and usually fails with a shape error.
///
/// # Example
///
/// ```
/// use micro_nn::layers::{Layer, ReLU};
/// use micro_nn::linalg::Matrix;
///
/// let mut relu = ReLU::<f32>::new();
/// let x = Matrix::from_rows(vec![vec![1.0, -2.0]]).unwrap();
/// let y = relu.forward(&x).unwrap();
/// let dx = relu.backward(&Matrix::from_rows(vec![vec![1.0, 1.0]]).unwrap()).unwrap();
/// assert_eq!(y.as_slice(), &[1.0, 0.0]);
/// assert_eq!(dx.as_slice(), &[1.0, 0.0]);
/// ```
pub trait Layer<T: Scalar> {
    /// Forward propagation through the layer.
    ///
    /// # Arguments
    ///
    /// * `input` - Batch of samples, one per row
    ///
    /// # Errors
    ///
    /// Fails with a shape mismatch if `input` does not fit the layer.
    fn forward(&mut self, input: &Matrix<T>) -> NnResult<Matrix<T>>;

    /// Backward propagation through the layer.
    ///
    /// Takes the gradient of the loss with respect to this layer's output and
    /// returns the gradient with respect to its input. Parametric layers also
    /// cache their parameter gradients as a side effect.
    fn backward(&mut self, grad_output: &Matrix<T>) -> NnResult<Matrix<T>>;

    /// Process-unique identity of this layer instance.
    fn id(&self) -> LayerId;

    /// Short human readable layer kind, used in logs.
    fn name(&self) -> &'static str;

    /// Returns the parametric view of this layer, if it has parameters.
    fn as_parametric(&self) -> Option<&dyn ParametricLayer<T>> {
        None
    }

    /// Mutable counterpart of [`Layer::as_parametric`].
    fn as_parametric_mut(&mut self) -> Option<&mut dyn ParametricLayer<T>> {
        None
    }
}

/// Extended capability set for layers holding a weight matrix and a bias.
///
/// The gradients returned by `d_weights` and `d_bias` are the ones computed
/// by the most recent `backward` call.
pub trait ParametricLayer<T: Scalar>: Layer<T> {
    fn weights(&self) -> &Matrix<T>;

    fn bias(&self) -> &Matrix<T>;

    fn d_weights(&self) -> &Matrix<T>;

    fn d_bias(&self) -> &Matrix<T>;

    /// Replaces both parameters. Shapes are not checked.
    fn set_weights(&mut self, weights: Matrix<T>, bias: Matrix<T>);

    /// Total count of weights and biases.
    fn parameter_count(&self) -> usize {
        self.weights().len() + self.bias().len()
    }
}
