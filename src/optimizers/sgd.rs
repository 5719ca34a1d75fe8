//! Stochastic Gradient Descent (SGD) optimizer implementation
//!
//! This module provides SGD with optional momentum and L2 weight decay:
//!
//! `g = ∇L/∂w + λw`
//! `v = μv - ηg`
//! `w = w + v`
//!
//! The bias follows the same rule without the decay term. Weights and bias
//! are updated independently of each other.

use tracing::debug;

use crate::data_structures::TwoTableMap;
use crate::error::NnResult;
use crate::layers::{LayerId, ParametricLayer};
use crate::linalg::{scalar, Matrix, Scalar};
use crate::model::SequentialModel;
use crate::optimizers::{ensure_gradient_shape, settle, zeros_unless_shaped, Optimizer};

/// Hyperparameters for [`SGD`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SGDConfig<T> {
    /// Step size (η)
    pub learning_rate: T,
    /// L2 penalty (λ) added to the weight gradient
    pub weight_decay: T,
    /// Velocity decay (μ), 0 disables momentum
    pub momentum: T,
}

impl<T: Scalar> Default for SGDConfig<T> {
    fn default() -> Self {
        Self {
            learning_rate: scalar(0.01),
            weight_decay: T::zero(),
            momentum: T::zero(),
        }
    }
}

#[derive(Debug, Clone)]
struct Velocity<T> {
    weights: Matrix<T>,
    bias: Matrix<T>,
}

impl<T> Default for Velocity<T> {
    fn default() -> Self {
        Self {
            weights: Matrix::default(),
            bias: Matrix::default(),
        }
    }
}

/// Stochastic Gradient Descent optimizer.
///
/// With `momentum` and `weight_decay` both zero this reduces to plain
/// gradient descent: `w = w - η * ∇L/∂w`.
///
/// # Example
///
/// ```
/// use micro_nn::layers::Linear;
/// use micro_nn::linalg::Matrix;
/// use micro_nn::optimizers::{Optimizer, SGDConfig, SGD};
/// use micro_nn::sequential;
///
/// let linear = Linear::with_parameters(Matrix::from_scalar(1.0f32), Matrix::from_scalar(0.0));
/// let mut model = sequential![linear];
/// let mut optimizer = SGD::new(SGDConfig { learning_rate: 0.5, ..Default::default() });
///
/// model.forward(&Matrix::from_scalar(1.0)).unwrap();
/// model.backward(&Matrix::from_scalar(1.0)).unwrap();
/// optimizer.step(&mut model);
///
/// let layer = model.layers()[0].as_parametric().unwrap();
/// assert_eq!(layer.weights().as_slice(), &[0.5]);
/// assert_eq!(layer.bias().as_slice(), &[-0.5]);
/// ```
pub struct SGD<T> {
    config: SGDConfig<T>,
    velocities: TwoTableMap<LayerId, Velocity<T>>,
}

impl<T: Scalar> SGD<T> {
    pub fn new(config: SGDConfig<T>) -> Self {
        Self {
            config,
            velocities: TwoTableMap::new(),
        }
    }

    pub fn config(&self) -> &SGDConfig<T> {
        &self.config
    }

    /// Number of layers with stored velocity.
    pub fn tracked_layers(&self) -> usize {
        self.velocities.len()
    }

    /// Updates the weights and bias of one layer and returns how many of the
    /// two were written.
    fn update_layer(&mut self, layer: &mut dyn ParametricLayer<T>) -> usize {
        let id = layer.id();
        let config = self.config;
        let previous = self.velocities.get(&id);

        let weights = velocity_update(
            &config,
            config.weight_decay,
            "sgd weights",
            layer.weights(),
            layer.d_weights(),
            previous.map(|velocity| &velocity.weights),
        );
        let bias = velocity_update(
            &config,
            T::zero(),
            "sgd bias",
            layer.bias(),
            layer.d_bias(),
            previous.map(|velocity| &velocity.bias),
        );
        let (weights, weight_velocity) = settle(weights, layer.weights(), id, "weights");
        let (bias, bias_velocity) = settle(bias, layer.bias(), id, "bias");

        let updated = usize::from(weight_velocity.is_some()) + usize::from(bias_velocity.is_some());
        if updated == 0 {
            return 0;
        }
        let velocity = self.velocities.entry_or_default(id);
        if let Some(v_weights) = weight_velocity {
            velocity.weights = v_weights;
        }
        if let Some(v_bias) = bias_velocity {
            velocity.bias = v_bias;
        }
        layer.set_weights(weights, bias);
        updated
    }
}

/// One momentum step for a single parameter matrix. Returns the updated
/// parameter and its new velocity.
fn velocity_update<T: Scalar>(
    config: &SGDConfig<T>,
    weight_decay: T,
    name: &'static str,
    parameter: &Matrix<T>,
    gradient: &Matrix<T>,
    previous: Option<&Matrix<T>>,
) -> NnResult<(Matrix<T>, Matrix<T>)> {
    ensure_gradient_shape(name, parameter, gradient)?;
    let (rows, cols) = parameter.shape();
    let velocity = match previous {
        Some(velocity) => zeros_unless_shaped(velocity, (rows, cols)),
        None => Matrix::zeros(rows, cols),
    };

    let effective = gradient.try_add(&parameter.scale(weight_decay))?;
    let velocity = velocity
        .scale(config.momentum)
        .try_sub(&effective.scale(config.learning_rate))?;
    let updated = parameter.try_add(&velocity)?;
    Ok((updated, velocity))
}

impl<T: Scalar> Optimizer<T> for SGD<T> {
    fn step(&mut self, model: &mut SequentialModel<T>) {
        for layer in model.layers_mut() {
            let Some(parametric) = layer.as_parametric_mut() else {
                continue;
            };
            let updated = self.update_layer(parametric);
            debug!(layer = %parametric.id(), name = parametric.name(), updated, "sgd update");
        }
    }

    /// Drops all stored velocities.
    fn reset(&mut self) {
        self.velocities.clear();
    }

    fn learning_rate(&self) -> T {
        self.config.learning_rate
    }

    fn set_learning_rate(&mut self, lr: T) {
        self.config.learning_rate = lr;
    }
}
