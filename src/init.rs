//! Weight initialisation
//!
//! Freshly constructed [`Linear`](crate::layers::Linear) layers start with
//! zero weights. An [`Initializer`] fills a matrix in place, and
//! [`init_model`] applies one to every parametric layer of a model.

use tracing::debug;

use crate::linalg::{scalar, Matrix, Scalar};
use crate::model::SequentialModel;
use crate::utils::SimpleRng;

pub trait Initializer<T: Scalar> {
    /// Overwrites every element of `matrix`, keeping its shape.
    fn init(&mut self, matrix: &mut Matrix<T>);
}

/// He/Kaiming normal initialisation.
///
/// Samples `N(0, sqrt(2 / fan_in))` with `fan_in = matrix.cols()`.
///
/// ```
/// use micro_nn::init::{Initializer, KaimingNormal};
/// use micro_nn::linalg::Matrix;
///
/// let mut weights = Matrix::<f32>::zeros(4, 8);
/// KaimingNormal::new(Some(7)).init(&mut weights);
/// assert!(weights.iter().any(|&w| w != 0.0));
/// ```
#[derive(Debug, Clone)]
pub struct KaimingNormal {
    rng: SimpleRng,
}

impl KaimingNormal {
    /// A fixed `seed` gives reproducible weights; `None` seeds from the clock.
    pub fn new(seed: Option<u64>) -> Self {
        Self {
            rng: SimpleRng::from_seed(seed),
        }
    }
}

impl<T: Scalar> Initializer<T> for KaimingNormal {
    fn init(&mut self, matrix: &mut Matrix<T>) {
        let fan_in = matrix.cols().max(1) as f64;
        let std_dev = (2.0 / fan_in).sqrt();
        let rng = &mut self.rng;
        matrix.unary_expr_inplace(|_| scalar(rng.next_normal(0.0, std_dev)));
    }
}

/// Re-initialises the weights of every parametric layer in `model`. Biases
/// are left untouched.
pub fn init_model<T: Scalar>(initializer: &mut dyn Initializer<T>, model: &mut SequentialModel<T>) {
    for layer in model.layers_mut() {
        let Some(parametric) = layer.as_parametric_mut() else {
            continue;
        };
        let mut weights = parametric.weights().clone();
        initializer.init(&mut weights);
        let bias = parametric.bias().clone();
        debug!(layer = %parametric.id(), rows = weights.rows(), cols = weights.cols(), "initialised weights");
        parametric.set_weights(weights, bias);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layers::{Linear, ReLU};
    use crate::sequential;
    use approx::assert_relative_eq;

    #[test]
    fn test_kaiming_statistics() {
        let mut matrix = Matrix::<f64>::zeros(100, 100);
        KaimingNormal::new(Some(42)).init(&mut matrix);

        let n = matrix.len() as f64;
        let mean = matrix.sum() / n;
        let variance = matrix.iter().map(|&x| (x - mean).powi(2)).sum::<f64>() / n;
        assert!(mean.abs() < 0.02);
        assert_relative_eq!(variance.sqrt(), (2.0f64 / 100.0).sqrt(), epsilon = 0.1);
    }

    #[test]
    fn test_seed_is_reproducible() {
        let mut a = Matrix::<f32>::zeros(3, 5);
        let mut b = Matrix::<f32>::zeros(3, 5);
        KaimingNormal::new(Some(9)).init(&mut a);
        KaimingNormal::new(Some(9)).init(&mut b);
        assert_eq!(a, b);
    }

    #[test]
    fn test_init_model_keeps_bias() {
        let bias = Matrix::from_rows(vec![vec![1.0f32, 2.0, 3.0]]).unwrap();
        let linear = Linear::with_parameters(Matrix::zeros(2, 3), bias.clone());
        let mut model = sequential![linear, ReLU::new()];

        init_model(&mut KaimingNormal::new(Some(1)), &mut model);

        let layer = model.layers()[0].as_parametric().unwrap();
        assert_eq!(layer.weights().shape(), (2, 3));
        assert!(layer.weights().iter().any(|&w| w != 0.0));
        assert_eq!(layer.bias(), &bias);
    }
}
