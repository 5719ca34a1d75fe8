//! Layer abstractions for neural networks
//!
//! This module provides the Layer trait, the parametric capability trait and
//! the concrete layers: an affine `Linear` layer and elementwise activations.

mod r#trait;
pub mod activation;
pub mod id;
pub mod linear;

// Re-export the layer traits for convenience
pub use activation::{ReLU, Sigmoid, Tanh};
pub use id::LayerId;
pub use linear::{BiasReduction, Linear};
pub use r#trait::{Layer, ParametricLayer};
