//! Sequential model composition
//!
//! A [`SequentialModel`] owns an ordered, fixed list of boxed layers. It
//! chains their forward passes, runs backward in reverse order, and exposes the
//! layers so optimizers and initializers can reach the parametric ones.

use crate::error::NnResult;
use crate::layers::Layer;
use crate::linalg::{Matrix, Scalar};

/// Ordered pipeline of heterogeneous layers.
///
/// # Example
///
/// ```
/// use micro_nn::layers::{Linear, ParametricLayer, ReLU};
/// use micro_nn::linalg::Matrix;
/// use micro_nn::sequential;
///
/// let mut linear = Linear::<f32>::new(2, 2);
/// linear.set_weights(Matrix::identity(2), Matrix::zeros(1, 2));
/// let mut model = sequential![linear, ReLU::new()];
///
/// let x = Matrix::from_rows(vec![vec![1.0, -1.0], vec![-1.0, 1.0]]).unwrap();
/// assert_eq!(model.forward(&x).unwrap(), Matrix::identity(2));
/// ```
pub struct SequentialModel<T> {
    layers: Vec<Box<dyn Layer<T>>>,
}

impl<T: Scalar> SequentialModel<T> {
    pub fn new(layers: Vec<Box<dyn Layer<T>>>) -> Self {
        Self { layers }
    }

    /// Runs `input` through every layer in order.
    pub fn forward(&mut self, input: &Matrix<T>) -> NnResult<Matrix<T>> {
        self.layers
            .iter_mut()
            .try_fold(input.clone(), |x, layer| layer.forward(&x))
    }

    /// Propagates `grad_output` through every layer in reverse order and
    /// returns the gradient with respect to the model input.
    pub fn backward(&mut self, grad_output: &Matrix<T>) -> NnResult<Matrix<T>> {
        self.layers
            .iter_mut()
            .rev()
            .try_fold(grad_output.clone(), |grad, layer| layer.backward(&grad))
    }

    pub fn layers(&self) -> &[Box<dyn Layer<T>>] {
        &self.layers
    }

    /// Mutable access to the layers. The sequence itself cannot be resized.
    pub fn layers_mut(&mut self) -> &mut [Box<dyn Layer<T>>] {
        &mut self.layers
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Total number of learnable parameters across parametric layers.
    pub fn parameter_count(&self) -> usize {
        self.layers
            .iter()
            .filter_map(|layer| layer.as_parametric())
            .map(|layer| layer.parameter_count())
            .sum()
    }
}

/// Boxes a layer, taking the element type from the layer itself.
#[doc(hidden)]
pub fn boxed_layer<T: Scalar, L: Layer<T> + 'static>(layer: L) -> Box<dyn Layer<T>> {
    Box::new(layer)
}

/// Builds a [`SequentialModel`] from a list of layer values, boxing each one.
#[macro_export]
macro_rules! sequential {
    ($($layer:expr),* $(,)?) => {
        $crate::model::SequentialModel::new(vec![
            $($crate::model::boxed_layer($layer)),*
        ])
    };
}
