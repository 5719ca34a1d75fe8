//! Shared utilities for neural network implementations
//!
//! This module provides common utilities like random number generation,
//! scalar activation functions and learning rate schedules.

pub mod activations;
pub mod lr_scheduler;
pub mod rng;

pub use lr_scheduler::{ConstantRate, LRScheduler, LrParams, StepDecay, StepDecayConfig};
pub use rng::SimpleRng;
