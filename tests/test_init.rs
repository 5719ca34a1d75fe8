//! Tests for weight initialisation
//!
//! This file tests:
//! - KaimingNormal sample statistics
//! - Seeded reproducibility
//! - init_model over mixed layer sequences

use approx::assert_relative_eq;
use micro_nn::init::{init_model, Initializer, KaimingNormal};
use micro_nn::layers::{Linear, ReLU, Sigmoid};
use micro_nn::linalg::Matrix;
use micro_nn::sequential;

fn std_dev(matrix: &Matrix<f64>) -> f64 {
    let n = matrix.len() as f64;
    let mean = matrix.sum() / n;
    (matrix.iter().map(|&x| (x - mean).powi(2)).sum::<f64>() / n).sqrt()
}

// ============================================================================
// KaimingNormal Tests
// ============================================================================

mod kaiming_tests {
    use super::*;

    #[test]
    fn test_square_matrix_std_dev() {
        let mut matrix = Matrix::<f64>::zeros(100, 100);
        KaimingNormal::new(Some(1234)).init(&mut matrix);
        assert_relative_eq!(std_dev(&matrix), (2.0f64 / 100.0).sqrt(), epsilon = 0.1);
    }

    #[test]
    fn test_fan_in_is_column_count() {
        let mut narrow = Matrix::<f64>::zeros(400, 2);
        let mut wide = Matrix::<f64>::zeros(2, 400);
        let mut init = KaimingNormal::new(Some(99));
        init.init(&mut narrow);
        init.init(&mut wide);

        // sqrt(2/2) = 1 versus sqrt(2/400) ≈ 0.07
        assert_relative_eq!(std_dev(&narrow), 1.0, epsilon = 0.15);
        assert_relative_eq!(std_dev(&wide), (2.0f64 / 400.0).sqrt(), epsilon = 0.02);
    }

    #[test]
    fn test_different_seeds_differ() {
        let mut a = Matrix::<f64>::zeros(4, 4);
        let mut b = Matrix::<f64>::zeros(4, 4);
        KaimingNormal::new(Some(1)).init(&mut a);
        KaimingNormal::new(Some(2)).init(&mut b);
        assert_ne!(a, b);
    }

    #[test]
    fn test_shape_is_preserved() {
        let mut matrix = Matrix::<f32>::zeros(3, 7);
        KaimingNormal::new(None).init(&mut matrix);
        assert_eq!(matrix.shape(), (3, 7));
        assert!(matrix.iter().all(|x| x.is_finite()));
    }
}

// ============================================================================
// init_model Tests
// ============================================================================

mod init_model_tests {
    use super::*;

    #[test]
    fn test_every_parametric_layer_initialised() {
        let mut model = sequential![
            Linear::<f64>::new(4, 8),
            ReLU::new(),
            Linear::new(8, 8),
            Sigmoid::new(),
            Linear::new(8, 2)
        ];
        init_model(&mut KaimingNormal::new(Some(3)), &mut model);

        let mut parametric = 0;
        for layer in model.layers() {
            if let Some(layer) = layer.as_parametric() {
                parametric += 1;
                assert!(layer.weights().iter().any(|&w| w != 0.0));
                assert!(layer.bias().iter().all(|&b| b == 0.0));
            }
        }
        assert_eq!(parametric, 3);
    }
}
