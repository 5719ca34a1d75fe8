//! Optimizer abstractions for neural network parameter updates
//!
//! Optimizers walk the layers of a [`SequentialModel`], pick out the
//! parametric ones and write updated weights and biases back through
//! [`ParametricLayer::set_weights`](crate::layers::ParametricLayer::set_weights).
//! Per-layer state (velocities, moment estimates) lives in a
//! [`TwoTableMap`](crate::data_structures::TwoTableMap) keyed by
//! [`LayerId`](crate::layers::LayerId) and is created lazily.
//!
//! # Available Optimizers
//!
//! - SGD: Stochastic gradient descent with momentum and weight decay
//! - Adam: Adaptive moment estimation with bias correction
//!
//! # Example
//!
//! ```
//! use micro_nn::layers::Linear;
//! use micro_nn::linalg::Matrix;
//! use micro_nn::optimizers::{Optimizer, SGDConfig, SGD};
//! use micro_nn::sequential;
//!
//! let mut model = sequential![Linear::<f32>::new(1, 1)];
//! let mut optimizer = SGD::new(SGDConfig { learning_rate: 0.1, ..Default::default() });
//!
//! let x = Matrix::from_scalar(1.0);
//! model.forward(&x).unwrap();
//! model.backward(&Matrix::from_scalar(-1.0)).unwrap();
//! optimizer.step(&mut model);
//! ```

pub mod adam;
pub mod sgd;

pub use adam::{Adam, AdamConfig};
pub use sgd::{SGDConfig, SGD};

use tracing::warn;

use crate::error::{NnError, NnResult};
use crate::layers::LayerId;
use crate::linalg::{Matrix, Scalar};
use crate::model::SequentialModel;

/// Core trait for neural network optimizers.
///
/// `step` never fails. Layers without parameters are skipped. Weights and
/// bias are updated independently: a parameter whose gradient does not match
/// its shape keeps its value and is reported with a warning, while the other
/// parameter of the same layer is still updated.
pub trait Optimizer<T: Scalar> {
    /// Applies one update to every parametric layer of `model`, using the
    /// gradients cached by the latest backward pass.
    fn step(&mut self, model: &mut SequentialModel<T>);

    /// Clears all per-layer state and counters.
    fn reset(&mut self);

    /// Get the learning rate for this optimizer.
    fn learning_rate(&self) -> T;

    /// Set the learning rate for this optimizer.
    ///
    /// Used by the solver to apply learning rate schedules.
    fn set_learning_rate(&mut self, lr: T);
}

/// Fails unless `gradient` has the same shape as `parameter`.
pub(crate) fn ensure_gradient_shape<T: Scalar>(
    name: &'static str,
    parameter: &Matrix<T>,
    gradient: &Matrix<T>,
) -> NnResult<()> {
    if parameter.shape() != gradient.shape() {
        return Err(NnError::shape(
            name,
            format!(
                "parameter is {}x{} but gradient is {}x{}",
                parameter.rows(),
                parameter.cols(),
                gradient.rows(),
                gradient.cols()
            ),
        ));
    }
    Ok(())
}

/// Returns `state` if it already matches `shape`, otherwise a zero matrix of
/// that shape. Fresh optimizer state is stored as the empty 0x0 matrix.
pub(crate) fn zeros_unless_shaped<T: Scalar>(state: &Matrix<T>, shape: (usize, usize)) -> Matrix<T> {
    if state.shape() == shape {
        state.clone()
    } else {
        Matrix::zeros(shape.0, shape.1)
    }
}

/// Splits the result of updating one parameter into the value to write back
/// and the new optimizer state. A failed update keeps `current` and yields no
/// state.
pub(crate) fn settle<T: Scalar, S>(
    update: NnResult<(Matrix<T>, S)>,
    current: &Matrix<T>,
    layer: LayerId,
    parameter: &'static str,
) -> (Matrix<T>, Option<S>) {
    match update {
        Ok((value, state)) => (value, Some(state)),
        Err(err) => {
            warn!(layer = %layer, parameter, %err, "skipping parameter update");
            (current.clone(), None)
        }
    }
}
