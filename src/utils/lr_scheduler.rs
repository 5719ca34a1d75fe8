//! Learning rate scheduler trait and implementations
//!
//! A scheduler maps the current epoch and learning rate to the learning rate
//! for that epoch. The solver asks once per epoch and installs the answer on
//! the optimizer, so decays compound over the run.

use crate::error::{NnError, NnResult};
use crate::linalg::Scalar;

/// Inputs to [`LRScheduler::get_lr`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LrParams<T> {
    /// 1-based epoch number.
    pub epoch: usize,
    /// Learning rate currently installed on the optimizer.
    pub lr: T,
}

/// Core trait for learning rate schedulers.
///
/// # Example
///
/// ```
/// use micro_nn::utils::lr_scheduler::{LRScheduler, LrParams, StepDecay, StepDecayConfig};
///
/// let scheduler = StepDecay::new(StepDecayConfig { epoch_count: 2, drop_factor: 0.1f32 }).unwrap();
/// assert_eq!(scheduler.get_lr(LrParams { epoch: 1, lr: 1.0 }), 1.0);
/// assert_eq!(scheduler.get_lr(LrParams { epoch: 2, lr: 1.0 }), 0.1);
/// ```
pub trait LRScheduler<T: Scalar> {
    /// Learning rate to use for `params.epoch`.
    fn get_lr(&self, params: LrParams<T>) -> T;
}

/// Keeps the learning rate unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConstantRate;

impl<T: Scalar> LRScheduler<T> for ConstantRate {
    fn get_lr(&self, params: LrParams<T>) -> T {
        params.lr
    }
}

/// Settings for [`StepDecay`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepDecayConfig<T> {
    /// Decay period in epochs, must be at least 1.
    pub epoch_count: usize,
    /// Multiplier applied at every period boundary.
    pub drop_factor: T,
}

/// Multiplies the learning rate by `drop_factor` on every epoch divisible by
/// `epoch_count`.
#[derive(Debug, Clone, Copy)]
pub struct StepDecay<T> {
    epoch_count: usize,
    drop_factor: T,
}

impl<T: Scalar> StepDecay<T> {
    /// Fails with [`NnError::Configuration`] when `epoch_count` is 0.
    pub fn new(config: StepDecayConfig<T>) -> NnResult<Self> {
        if config.epoch_count < 1 {
            return Err(NnError::config("epoch_count must be greater than 0"));
        }
        Ok(Self {
            epoch_count: config.epoch_count,
            drop_factor: config.drop_factor,
        })
    }
}

impl<T: Scalar> LRScheduler<T> for StepDecay<T> {
    fn get_lr(&self, params: LrParams<T>) -> T {
        if params.epoch % self.epoch_count == 0 {
            params.lr * self.drop_factor
        } else {
            params.lr
        }
    }
}
