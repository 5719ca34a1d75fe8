//! End-to-end training tests
//!
//! This file trains small models through the Solver:
//! - Linear regression with momentum SGD
//! - Linear regression driven by a JSON configuration
//! - A small Tanh network with Adam and Kaiming initialisation

use approx::assert_relative_eq;
use micro_nn::config::load_config;
use micro_nn::data::{DataLoaderSettings, SimpleDataLoader};
use micro_nn::init::{init_model, KaimingNormal};
use micro_nn::layers::{BiasReduction, Linear, Tanh};
use micro_nn::linalg::Matrix;
use micro_nn::loss::Mse;
use micro_nn::model::SequentialModel;
use micro_nn::optimizers::{Adam, AdamConfig, SGDConfig, SGD};
use micro_nn::sequential;
use micro_nn::solver::Solver;

fn config_path(name: &str) -> String {
    format!("{}/config/{}", env!("CARGO_MANIFEST_DIR"), name)
}

/// Samples of `y = 2x + 1` at x = 1, 2, 3.
fn line_samples() -> (Vec<Matrix<f64>>, Vec<Matrix<f64>>) {
    let x: Vec<Matrix<f64>> = (1..=3).map(|i| Matrix::from_scalar(i as f64)).collect();
    let y: Vec<Matrix<f64>> = (1..=3)
        .map(|i| Matrix::from_scalar(2.0 * i as f64 + 1.0))
        .collect();
    (x, y)
}

fn start_line() -> SequentialModel<f64> {
    sequential![Linear::with_parameters(
        Matrix::from_scalar(0.9),
        Matrix::from_scalar(0.9)
    )
    .with_bias_reduction(BiasReduction::Batch)]
}

fn predict(model: &mut SequentialModel<f64>, x: f64) -> f64 {
    model.forward(&Matrix::from_scalar(x)).unwrap().as_slice()[0]
}

// ============================================================================
// Linear Regression Tests
// ============================================================================

mod linear_regression_tests {
    use super::*;

    #[test]
    fn test_momentum_sgd_learns_line() {
        let (x, y) = line_samples();
        let mut loader = SimpleDataLoader::new(x, y, DataLoaderSettings::default()).unwrap();
        let mut model = start_line();
        let mut optimizer = SGD::new(SGDConfig {
            learning_rate: 0.01,
            weight_decay: 0.0,
            momentum: 0.9,
        });

        let history = Solver::new(&mut model, &mut optimizer, &Mse, &mut loader)
            .train(1000)
            .unwrap();

        assert!(history[999] < history[0]);
        assert_relative_eq!(predict(&mut model, 5.0), 11.0, epsilon = 0.5);
    }

    #[test]
    fn test_config_driven_sgd() {
        let config = load_config(config_path("linear_regression_sgd.json")).unwrap();
        let (x, y) = line_samples();
        let mut loader = SimpleDataLoader::new(x, y, config.data_loader_settings()).unwrap();
        let mut model = start_line();
        let mut optimizer = config.build_optimizer::<f64>();

        Solver::new(&mut model, optimizer.as_mut(), &Mse, &mut loader)
            .with_scheduler(config.build_scheduler().unwrap())
            .train(config.epochs)
            .unwrap();

        assert_relative_eq!(predict(&mut model, 5.0), 11.0, epsilon = 0.5);
    }

    #[test]
    fn test_config_driven_adam_with_shuffled_batches() {
        let config = load_config(config_path("linear_regression_adam.json")).unwrap();
        let (x, y) = line_samples();
        let mut loader = SimpleDataLoader::new(x, y, config.data_loader_settings()).unwrap();
        let mut model = start_line();
        let mut optimizer = config.build_optimizer::<f64>();

        Solver::new(&mut model, optimizer.as_mut(), &Mse, &mut loader)
            .with_scheduler(config.build_scheduler().unwrap())
            .train(config.epochs)
            .unwrap();

        assert_relative_eq!(predict(&mut model, 5.0), 11.0, epsilon = 0.5);
    }
}

// ============================================================================
// Nonlinear Model Tests
// ============================================================================

mod nonlinear_tests {
    use super::*;

    #[test]
    fn test_tanh_network_reduces_loss() {
        let xs = [-1.0, -0.5, 0.0, 0.5, 1.0];
        let x: Vec<Matrix<f64>> = xs.iter().map(|&v| Matrix::from_scalar(v)).collect();
        let y: Vec<Matrix<f64>> = xs.iter().map(|&v| Matrix::from_scalar(v * v)).collect();
        let mut loader = SimpleDataLoader::new(
            x,
            y,
            DataLoaderSettings {
                batch_size: 5,
                shuffle: true,
                seed: Some(11),
            },
        )
        .unwrap();

        let mut model = sequential![
            Linear::new(1, 8).with_bias_reduction(BiasReduction::Batch),
            Tanh::new(),
            Linear::new(8, 1).with_bias_reduction(BiasReduction::Batch)
        ];
        init_model(&mut KaimingNormal::new(Some(5)), &mut model);
        let mut optimizer = Adam::new(AdamConfig {
            learning_rate: 0.01,
            ..Default::default()
        });

        let history = Solver::new(&mut model, &mut optimizer, &Mse, &mut loader)
            .train(300)
            .unwrap();

        assert_eq!(history.len(), 300);
        assert!(history[299] < history[0]);
        assert!(history.iter().all(|loss| loss.is_finite()));
    }
}
