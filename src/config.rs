//! Configuration structures for training
//!
//! This module parses a JSON training configuration and turns it into the
//! optimizer, scheduler and data loader settings used by the
//! [`Solver`](crate::solver::Solver).
//!
//! # Example
//!
//! ```json
//! {
//!   "epochs": 100,
//!   "batch_size": 16,
//!   "shuffle": true,
//!   "seed": 42,
//!   "optimizer": { "type": "sgd", "learning_rate": 0.01, "momentum": 0.9 },
//!   "scheduler": { "type": "step_decay", "epoch_count": 10, "drop_factor": 0.5 }
//! }
//! ```
//!
//! Only `epochs` is required. Optimizer fields that are left out take the
//! optimizer's defaults.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::data::DataLoaderSettings;
use crate::error::{NnError, NnResult};
use crate::linalg::{scalar, Scalar};
use crate::optimizers::{Adam, AdamConfig, Optimizer, SGDConfig, SGD};
use crate::utils::{ConstantRate, LRScheduler, StepDecay, StepDecayConfig};

/// Hyper-parameters of the SGD optimizer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SgdSettings {
    pub learning_rate: f64,
    pub weight_decay: f64,
    pub momentum: f64,
}

impl Default for SgdSettings {
    fn default() -> Self {
        Self {
            learning_rate: 0.01,
            weight_decay: 0.0,
            momentum: 0.0,
        }
    }
}

/// Hyper-parameters of the Adam optimizer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdamSettings {
    pub learning_rate: f64,
    pub beta1: f64,
    pub beta2: f64,
    pub epsilon: f64,
}

impl Default for AdamSettings {
    fn default() -> Self {
        Self {
            learning_rate: 0.001,
            beta1: 0.9,
            beta2: 0.999,
            epsilon: 1e-8,
        }
    }
}

/// Optimizer selection, tagged by `"type"`: `"sgd"` or `"adam"`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OptimizerConfig {
    Sgd(SgdSettings),
    Adam(AdamSettings),
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self::Sgd(SgdSettings::default())
    }
}

/// Learning rate schedule, tagged by `"type"`: `"constant"` or `"step_decay"`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SchedulerConfig {
    #[default]
    Constant,
    StepDecay { epoch_count: usize, drop_factor: f64 },
}

/// Configuration for a training run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Number of passes over the data
    pub epochs: usize,

    /// Samples per batch; absent means one batch holding every sample
    #[serde(default)]
    pub batch_size: Option<usize>,

    /// Reshuffle samples every epoch
    #[serde(default)]
    pub shuffle: bool,

    /// Seed for shuffling and initialisation
    #[serde(default)]
    pub seed: Option<u64>,

    #[serde(default)]
    pub optimizer: OptimizerConfig,

    #[serde(default)]
    pub scheduler: SchedulerConfig,
}

impl TrainingConfig {
    /// Parses and validates a configuration held in memory.
    pub fn from_json_str(json: &str) -> NnResult<Self> {
        let config: TrainingConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks every value against the range its consumer accepts.
    pub fn validate(&self) -> NnResult<()> {
        if self.epochs == 0 {
            return Err(NnError::config("epochs must be greater than 0"));
        }
        if self.batch_size == Some(0) {
            return Err(NnError::config("batch_size must be greater than 0"));
        }

        match self.optimizer {
            OptimizerConfig::Sgd(sgd) => {
                ensure_positive("learning_rate", sgd.learning_rate)?;
                if !(0.0..).contains(&sgd.weight_decay) {
                    return Err(NnError::config("weight_decay must be non-negative"));
                }
                ensure_unit_interval("momentum", sgd.momentum)?;
            }
            OptimizerConfig::Adam(adam) => {
                ensure_positive("learning_rate", adam.learning_rate)?;
                ensure_unit_interval("beta1", adam.beta1)?;
                ensure_unit_interval("beta2", adam.beta2)?;
                ensure_positive("epsilon", adam.epsilon)?;
            }
        }

        if let SchedulerConfig::StepDecay { epoch_count, .. } = self.scheduler {
            if epoch_count == 0 {
                return Err(NnError::config("epoch_count must be greater than 0"));
            }
        }

        Ok(())
    }

    /// Data loader settings derived from `batch_size`, `shuffle` and `seed`.
    pub fn data_loader_settings(&self) -> DataLoaderSettings {
        DataLoaderSettings {
            batch_size: self.batch_size.unwrap_or(usize::MAX),
            shuffle: self.shuffle,
            seed: self.seed,
        }
    }

    /// Builds the configured optimizer for scalar type `T`.
    pub fn build_optimizer<T: Scalar>(&self) -> Box<dyn Optimizer<T>> {
        match self.optimizer {
            OptimizerConfig::Sgd(sgd) => Box::new(SGD::new(SGDConfig {
                learning_rate: scalar(sgd.learning_rate),
                weight_decay: scalar(sgd.weight_decay),
                momentum: scalar(sgd.momentum),
            })),
            OptimizerConfig::Adam(adam) => Box::new(Adam::new(AdamConfig {
                learning_rate: scalar(adam.learning_rate),
                beta1: scalar(adam.beta1),
                beta2: scalar(adam.beta2),
                epsilon: scalar(adam.epsilon),
            })),
        }
    }

    /// Builds the configured learning rate schedule for scalar type `T`.
    pub fn build_scheduler<T: Scalar>(&self) -> NnResult<Box<dyn LRScheduler<T>>> {
        Ok(match self.scheduler {
            SchedulerConfig::Constant => Box::new(ConstantRate),
            SchedulerConfig::StepDecay {
                epoch_count,
                drop_factor,
            } => Box::new(StepDecay::new(StepDecayConfig {
                epoch_count,
                drop_factor: scalar::<T>(drop_factor),
            })?),
        })
    }
}

fn ensure_positive(name: &str, value: f64) -> NnResult<()> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(NnError::config(format!("{name} must be positive, got {value}")))
    }
}

fn ensure_unit_interval(name: &str, value: f64) -> NnResult<()> {
    if (0.0..1.0).contains(&value) {
        Ok(())
    } else {
        Err(NnError::config(format!("{name} must be in [0, 1), got {value}")))
    }
}

/// Loads a training configuration from a JSON file.
///
/// Reads the file at `path`, deserializes it into a [`TrainingConfig`] and
/// validates it.
///
/// # Examples
///
/// ```no_run
/// use micro_nn::config::load_config;
///
/// let cfg = load_config("config/linear_regression_sgd.json").unwrap();
/// assert_eq!(cfg.epochs, 1000);
/// ```
pub fn load_config<P: AsRef<Path>>(path: P) -> NnResult<TrainingConfig> {
    let contents = fs::read_to_string(path)?;
    TrainingConfig::from_json_str(&contents)
}
