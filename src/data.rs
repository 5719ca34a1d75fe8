//! Mini-batch iteration over in-memory samples
//!
//! Samples are stored as single-row matrices. A loader hands them out in
//! batches, stacked into `batch x features` matrices ready for
//! [`SequentialModel::forward`](crate::model::SequentialModel::forward).

use tracing::debug;

use crate::error::{NnError, NnResult};
use crate::linalg::{Matrix, Scalar};
use crate::utils::SimpleRng;

/// One stacked batch of inputs and targets.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch<T> {
    pub x: Matrix<T>,
    pub y: Matrix<T>,
}

pub trait DataLoader<T: Scalar> {
    /// Whether another batch is available before the next reset.
    fn has_next(&self) -> bool;

    /// Returns the next batch.
    ///
    /// # Errors
    ///
    /// [`NnError::DataExhausted`] once every sample of the pass was served.
    fn next_batch(&mut self) -> NnResult<Batch<T>>;

    /// Starts a new pass over the data.
    fn reset(&mut self);
}

/// Settings for [`SimpleDataLoader`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataLoaderSettings {
    /// Samples per batch. The last batch of a pass may be smaller.
    pub batch_size: usize,
    /// Reorder samples at construction and on every reset.
    pub shuffle: bool,
    /// Seed for shuffling; `None` seeds from the clock.
    pub seed: Option<u64>,
}

impl Default for DataLoaderSettings {
    /// One batch holding every sample, in order.
    fn default() -> Self {
        Self {
            batch_size: usize::MAX,
            shuffle: false,
            seed: None,
        }
    }
}

/// Loader over paired per-sample row matrices.
///
/// ```
/// use micro_nn::data::{DataLoader, DataLoaderSettings, SimpleDataLoader};
/// use micro_nn::linalg::Matrix;
///
/// let x = vec![Matrix::from_scalar(1.0f32), Matrix::from_scalar(2.0), Matrix::from_scalar(3.0)];
/// let y = x.clone();
/// let settings = DataLoaderSettings { batch_size: 2, ..Default::default() };
/// let mut loader = SimpleDataLoader::new(x, y, settings).unwrap();
///
/// assert_eq!(loader.next_batch().unwrap().x.rows(), 2);
/// assert_eq!(loader.next_batch().unwrap().x.rows(), 1);
/// assert!(!loader.has_next());
/// ```
#[derive(Debug, Clone)]
pub struct SimpleDataLoader<T> {
    x: Vec<Matrix<T>>,
    y: Vec<Matrix<T>>,
    settings: DataLoaderSettings,
    order: Vec<usize>,
    position: usize,
    rng: SimpleRng,
}

impl<T: Scalar> SimpleDataLoader<T> {
    /// # Errors
    ///
    /// [`NnError::Configuration`] when `x` and `y` hold different numbers of
    /// samples or `batch_size` is zero.
    pub fn new(x: Vec<Matrix<T>>, y: Vec<Matrix<T>>, settings: DataLoaderSettings) -> NnResult<Self> {
        if x.len() != y.len() {
            return Err(NnError::config(format!(
                "got {} input samples but {} targets",
                x.len(),
                y.len()
            )));
        }
        if settings.batch_size == 0 {
            return Err(NnError::config("batch_size must be greater than 0"));
        }

        let mut loader = Self {
            order: (0..x.len()).collect(),
            x,
            y,
            settings,
            position: 0,
            rng: SimpleRng::from_seed(settings.seed),
        };
        loader.shuffle_if_enabled();
        Ok(loader)
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    pub fn settings(&self) -> &DataLoaderSettings {
        &self.settings
    }

    fn shuffle_if_enabled(&mut self) {
        if self.settings.shuffle {
            self.rng.shuffle(&mut self.order);
        }
    }
}

impl<T: Scalar> DataLoader<T> for SimpleDataLoader<T> {
    fn has_next(&self) -> bool {
        self.position < self.order.len()
    }

    fn next_batch(&mut self) -> NnResult<Batch<T>> {
        if !self.has_next() {
            return Err(NnError::DataExhausted);
        }
        let end = self
            .position
            .saturating_add(self.settings.batch_size)
            .min(self.order.len());
        let indices = &self.order[self.position..end];

        let x: Vec<Matrix<T>> = indices.iter().map(|&i| self.x[i].clone()).collect();
        let y: Vec<Matrix<T>> = indices.iter().map(|&i| self.y[i].clone()).collect();
        let batch = Batch {
            x: Matrix::from_row_vectors(&x)?,
            y: Matrix::from_row_vectors(&y)?,
        };
        self.position = end;
        Ok(batch)
    }

    fn reset(&mut self) {
        self.position = 0;
        self.shuffle_if_enabled();
        debug!(samples = self.order.len(), shuffle = self.settings.shuffle, "data loader reset");
    }
}
