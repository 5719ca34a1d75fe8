//! Micro Neural Network Library
//!
//! A small differentiable-programming core: a dense matrix type, layers with
//! hand-written forward and backward passes, and optimizers that keep
//! per-layer state keyed by layer identity.
//!
//! # Modules
//!
//! - `linalg`: Generic dense matrix, broadcasting arithmetic, LU factorisation
//! - `data_structures`: Two-table map used for per-layer optimizer state
//! - `layers`: Layer traits and implementations (Linear, ReLU, Sigmoid, Tanh)
//! - `model`: Sequential composition of boxed layers
//! - `optimizers`: Optimizer trait and implementations (SGD, Adam)
//! - `loss`: Mean squared error and cross-entropy
//! - `init`: Weight initialisers
//! - `data`: Mini-batch data loading
//! - `solver`: Training loop driver
//! - `utils`: Shared utilities (RNG, activation functions, LR schedules)
//! - `config`: Training configuration structures
//! - `error`: Crate-wide error type

pub mod config;
pub mod data;
pub mod data_structures;
pub mod error;
pub mod init;
pub mod layers;
pub mod linalg;
pub mod loss;
pub mod model;
pub mod optimizers;
pub mod solver;
pub mod utils;

pub use error::{NnError, NnResult};
