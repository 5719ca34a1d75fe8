//! Training loop driver
//!
//! The [`Solver`] ties a model, an optimizer, a loss and a data loader
//! together and runs them for a number of epochs.

use tracing::info;

use crate::data::DataLoader;
use crate::error::NnResult;
use crate::linalg::{scalar, Scalar};
use crate::loss::Loss;
use crate::model::SequentialModel;
use crate::optimizers::Optimizer;
use crate::utils::{ConstantRate, LRScheduler, LrParams};

/// Runs mini-batch training over borrowed components.
///
/// # Example
///
/// ```
/// use micro_nn::data::{DataLoaderSettings, SimpleDataLoader};
/// use micro_nn::layers::{BiasReduction, Linear};
/// use micro_nn::linalg::Matrix;
/// use micro_nn::loss::Mse;
/// use micro_nn::optimizers::{SGDConfig, SGD};
/// use micro_nn::sequential;
/// use micro_nn::solver::Solver;
///
/// let x: Vec<Matrix<f64>> = (0..4).map(|i| Matrix::from_scalar(i as f64)).collect();
/// let y: Vec<Matrix<f64>> = (0..4).map(|i| Matrix::from_scalar(3.0 * i as f64)).collect();
/// let mut loader = SimpleDataLoader::new(x, y, DataLoaderSettings::default()).unwrap();
/// let mut model = sequential![Linear::new(1, 1).with_bias_reduction(BiasReduction::Batch)];
/// let mut optimizer = SGD::new(SGDConfig { learning_rate: 0.05, ..Default::default() });
///
/// let losses = Solver::new(&mut model, &mut optimizer, &Mse, &mut loader).train(50).unwrap();
/// assert!(losses[49] < losses[0]);
/// ```
pub struct Solver<'a, T: Scalar> {
    model: &'a mut SequentialModel<T>,
    optimizer: &'a mut dyn Optimizer<T>,
    loss: &'a dyn Loss<T>,
    loader: &'a mut dyn DataLoader<T>,
    scheduler: Box<dyn LRScheduler<T>>,
}

impl<'a, T: Scalar> Solver<'a, T> {
    /// Creates a solver that keeps the optimizer's learning rate constant.
    pub fn new(
        model: &'a mut SequentialModel<T>,
        optimizer: &'a mut dyn Optimizer<T>,
        loss: &'a dyn Loss<T>,
        loader: &'a mut dyn DataLoader<T>,
    ) -> Self {
        Self {
            model,
            optimizer,
            loss,
            loader,
            scheduler: Box::new(ConstantRate),
        }
    }

    /// Replaces the learning rate schedule.
    pub fn with_scheduler(mut self, scheduler: Box<dyn LRScheduler<T>>) -> Self {
        self.scheduler = scheduler;
        self
    }

    /// Trains for `epochs` passes over the data and returns the mean batch
    /// loss of each epoch.
    ///
    /// # Errors
    ///
    /// Stops at the first forward, loss, backward or batching error.
    pub fn train(&mut self, epochs: usize) -> NnResult<Vec<T>> {
        let mut history = Vec::with_capacity(epochs);
        for epoch in 1..=epochs {
            let lr = self.scheduler.get_lr(LrParams {
                epoch,
                lr: self.optimizer.learning_rate(),
            });
            self.optimizer.set_learning_rate(lr);

            let mean_loss = self.run_epoch()?;
            self.loader.reset();

            info!(epoch, loss = %mean_loss, lr = %lr, "epoch complete");
            history.push(mean_loss);
        }
        Ok(history)
    }

    fn run_epoch(&mut self) -> NnResult<T> {
        let mut total = T::zero();
        let mut batches = 0usize;
        while self.loader.has_next() {
            let batch = self.loader.next_batch()?;
            let prediction = self.model.forward(&batch.x)?;
            total = total + self.loss.forward(&batch.y, &prediction)?;
            let grad = self.loss.backward(&batch.y, &prediction)?;
            self.model.backward(&grad)?;
            self.optimizer.step(self.model);
            batches += 1;
        }
        if batches == 0 {
            return Ok(T::zero());
        }
        Ok(total / scalar(batches as f64))
    }
}
