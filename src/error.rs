//! Error types shared across the crate
//!
//! Every fallible operation returns [`NnResult`]. The store and the optimizers
//! never fail; everything else surfaces the first error to the caller.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type NnResult<T> = Result<T, NnError>;

/// Errors raised by matrix arithmetic, layers, data loading and configuration.
#[derive(Debug, Error)]
pub enum NnError {
    #[error("shape mismatch in {op}: {details}")]
    ShapeMismatch { op: &'static str, details: String },

    #[error("index ({row}, {col}) out of range for {rows}x{cols} matrix")]
    IndexOutOfRange {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    #[error("invalid configuration: {0}")]
    Configuration(String),

    #[error("zero pivot at row {0} during LU factorisation")]
    ZeroPivot(usize),

    #[error("no more batches available")]
    DataExhausted,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl NnError {
    pub(crate) fn shape(op: &'static str, details: impl Into<String>) -> Self {
        NnError::ShapeMismatch {
            op,
            details: details.into(),
        }
    }

    pub(crate) fn config(message: impl Into<String>) -> Self {
        NnError::Configuration(message.into())
    }
}
