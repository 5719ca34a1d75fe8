//! Adam (Adaptive Moment Estimation) optimizer implementation
//!
//! This module provides the Adam optimizer, which combines momentum and
//! adaptive learning rates with bias correction for improved convergence.

use tracing::debug;

use crate::data_structures::TwoTableMap;
use crate::error::NnResult;
use crate::layers::{LayerId, ParametricLayer};
use crate::linalg::{scalar, Matrix, Scalar};
use crate::model::SequentialModel;
use crate::optimizers::{ensure_gradient_shape, settle, zeros_unless_shaped, Optimizer};

/// Hyperparameters for [`Adam`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdamConfig<T> {
    /// Step size (α)
    pub learning_rate: T,
    /// Exponential decay rate for first moment estimates
    pub beta1: T,
    /// Exponential decay rate for second moment estimates
    pub beta2: T,
    /// Small constant for numerical stability
    pub epsilon: T,
}

impl<T: Scalar> Default for AdamConfig<T> {
    fn default() -> Self {
        Self {
            learning_rate: scalar(0.001),
            beta1: scalar(0.9),
            beta2: scalar(0.999),
            epsilon: scalar(1e-8),
        }
    }
}

/// First and second moment estimates for one parameter matrix.
#[derive(Debug, Clone)]
struct Moments<T> {
    first: Matrix<T>,
    second: Matrix<T>,
}

// Written by hand: the derive would require `T: Default`.
impl<T> Default for Moments<T> {
    fn default() -> Self {
        Self {
            first: Matrix::default(),
            second: Matrix::default(),
        }
    }
}

/// Adam (Adaptive Moment Estimation) optimizer.
///
/// Adam combines ideas from momentum optimization and RMSprop to provide
/// adaptive learning rates for each parameter. The update rule is:
///
/// ```text
/// m_t = β1 * m_{t-1} + (1 - β1) * gradient
/// v_t = β2 * v_{t-1} + (1 - β2) * gradient²
/// m_hat = m_t / (1 - β1^t)
/// v_hat = v_t / (1 - β2^t)
/// parameter = parameter - α * m_hat / (√v_hat + ε)
/// ```
///
/// Weights and biases keep separate moment stores, keyed by layer id. The
/// step counter `t` is global: it advances once per [`Optimizer::step`], not
/// once per layer.
///
/// # Example
///
/// ```
/// use micro_nn::layers::Linear;
/// use micro_nn::linalg::Matrix;
/// use micro_nn::optimizers::{Adam, AdamConfig, Optimizer};
/// use micro_nn::sequential;
///
/// let linear = Linear::with_parameters(Matrix::from_scalar(1.0f64), Matrix::from_scalar(0.0));
/// let mut model = sequential![linear];
/// let mut optimizer = Adam::new(AdamConfig { learning_rate: 0.1, ..Default::default() });
///
/// model.forward(&Matrix::from_scalar(1.0)).unwrap();
/// model.backward(&Matrix::from_scalar(1.0)).unwrap();
/// optimizer.step(&mut model);
///
/// // The first bias-corrected step moves each parameter by about α
/// let w = model.layers()[0].as_parametric().unwrap().weights().as_slice()[0];
/// assert!((w - 0.9).abs() < 1e-6);
/// ```
///
/// # Reference
///
/// Kingma, D. P., & Ba, J. (2014). Adam: A method for stochastic optimization.
/// arXiv preprint arXiv:1412.6980.
pub struct Adam<T> {
    config: AdamConfig<T>,
    weight_moments: TwoTableMap<LayerId, Moments<T>>,
    bias_moments: TwoTableMap<LayerId, Moments<T>>,
    /// Time step counter for bias correction
    t: u64,
}

impl<T: Scalar> Adam<T> {
    pub fn new(config: AdamConfig<T>) -> Self {
        Self {
            config,
            weight_moments: TwoTableMap::new(),
            bias_moments: TwoTableMap::new(),
            t: 0,
        }
    }

    pub fn config(&self) -> &AdamConfig<T> {
        &self.config
    }

    /// Number of completed steps.
    pub fn timestep(&self) -> u64 {
        self.t
    }

    /// Number of layers with stored moment estimates.
    pub fn tracked_layers(&self) -> usize {
        self.weight_moments.len()
    }

    fn bias_corrections(&self) -> (T, T) {
        let t = i32::try_from(self.t).unwrap_or(i32::MAX);
        (
            T::one() - self.config.beta1.powi(t),
            T::one() - self.config.beta2.powi(t),
        )
    }

    /// Updates the weights and bias of one layer and returns how many of the
    /// two were written.
    fn update_layer(&mut self, layer: &mut dyn ParametricLayer<T>) -> usize {
        let id = layer.id();
        let corrections = self.bias_corrections();
        let config = self.config;

        let weights = adam_update(
            &config,
            corrections,
            "adam weights",
            layer.weights(),
            layer.d_weights(),
            self.weight_moments.get(&id),
        );
        let bias = adam_update(
            &config,
            corrections,
            "adam bias",
            layer.bias(),
            layer.d_bias(),
            self.bias_moments.get(&id),
        );
        let (weights, weight_state) = settle(weights, layer.weights(), id, "weights");
        let (bias, bias_state) = settle(bias, layer.bias(), id, "bias");

        let mut updated = 0;
        if let Some(state) = weight_state {
            *self.weight_moments.entry_or_default(id) = state;
            updated += 1;
        }
        if let Some(state) = bias_state {
            *self.bias_moments.entry_or_default(id) = state;
            updated += 1;
        }
        if updated > 0 {
            layer.set_weights(weights, bias);
        }
        updated
    }
}

/// Computes the updated parameter and moments without committing anything.
fn adam_update<T: Scalar>(
    config: &AdamConfig<T>,
    (correction1, correction2): (T, T),
    name: &'static str,
    parameter: &Matrix<T>,
    gradient: &Matrix<T>,
    previous: Option<&Moments<T>>,
) -> NnResult<(Matrix<T>, Moments<T>)> {
    ensure_gradient_shape(name, parameter, gradient)?;
    let shape = parameter.shape();
    let (first, second) = match previous {
        Some(moments) => (
            zeros_unless_shaped(&moments.first, shape),
            zeros_unless_shaped(&moments.second, shape),
        ),
        None => (Matrix::zeros(shape.0, shape.1), Matrix::zeros(shape.0, shape.1)),
    };

    let first = first
        .scale(config.beta1)
        .try_add(&gradient.scale(T::one() - config.beta1))?;
    let second = second
        .scale(config.beta2)
        .try_add(&gradient.powi(2).scale(T::one() - config.beta2))?;

    let first_hat = first.scale(T::one() / correction1);
    let second_hat = second.scale(T::one() / correction2);
    let step = first_hat
        .elementwise_divide(&second_hat.sqrt().add_scalar(config.epsilon))?
        .scale(config.learning_rate);

    let updated = parameter.try_sub(&step)?;
    Ok((updated, Moments { first, second }))
}

impl<T: Scalar> Optimizer<T> for Adam<T> {
    fn step(&mut self, model: &mut SequentialModel<T>) {
        self.t += 1;
        for layer in model.layers_mut() {
            let Some(parametric) = layer.as_parametric_mut() else {
                continue;
            };
            let updated = self.update_layer(parametric);
            debug!(layer = %parametric.id(), t = self.t, updated, "adam update");
        }
    }

    /// Clears both moment stores and the step counter.
    fn reset(&mut self) {
        self.weight_moments.clear();
        self.bias_moments.clear();
        self.t = 0;
    }

    fn learning_rate(&self) -> T {
        self.config.learning_rate
    }

    fn set_learning_rate(&mut self, lr: T) {
        self.config.learning_rate = lr;
    }
}
