//! Tests for backward propagation
//!
//! This file tests gradient computation in:
//! - Linear layers (weight, bias and input gradients)
//! - Both bias reduction modes, including column biases
//! - Activation layers, including the sigmoid gradient formula
//! - Reverse-order propagation through a model

use approx::assert_relative_eq;
use micro_nn::layers::{BiasReduction, Layer, Linear, ParametricLayer, ReLU, Sigmoid, Tanh};
use micro_nn::linalg::Matrix;
use micro_nn::sequential;

fn m(rows: Vec<Vec<f64>>) -> Matrix<f64> {
    Matrix::from_rows(rows).unwrap()
}

// ============================================================================
// Linear Layer Backward Tests
// ============================================================================

mod linear_backward_tests {
    use super::*;

    fn layer() -> Linear<f64> {
        Linear::with_parameters(
            m(vec![vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]]),
            m(vec![vec![0.0, 0.0]]),
        )
    }

    #[test]
    fn test_gradients_shapes_and_values() {
        let mut linear = layer();
        let x = m(vec![vec![1.0, 0.0, 2.0], vec![0.0, 1.0, 1.0]]);
        linear.forward(&x).unwrap();

        let grad = m(vec![vec![1.0, -1.0], vec![2.0, 0.5]]);
        let d_input = linear.backward(&grad).unwrap();

        // dW = Xᵀ · dOut
        assert_eq!(
            linear.d_weights(),
            &m(vec![vec![1.0, -1.0], vec![2.0, 0.5], vec![4.0, -1.5]])
        );
        // db sums across each row by default
        assert_eq!(linear.d_bias(), &m(vec![vec![0.0], vec![2.5]]));
        // dIn = dOut · Wᵀ
        assert_eq!(d_input, m(vec![vec![-1.0, -1.0, -1.0], vec![3.0, 8.0, 13.0]]));
    }

    #[test]
    fn test_batch_bias_reduction() {
        let mut linear = layer().with_bias_reduction(BiasReduction::Batch);
        assert_eq!(linear.bias_reduction(), BiasReduction::Batch);

        linear.forward(&m(vec![vec![1.0, 0.0, 2.0], vec![0.0, 1.0, 1.0]])).unwrap();
        linear.backward(&m(vec![vec![1.0, -1.0], vec![2.0, 0.5]])).unwrap();
        assert_eq!(linear.d_bias(), &m(vec![vec![3.0, -0.5]]));
    }

    #[test]
    fn test_column_bias_gets_matching_gradient() {
        let mut linear = Linear::with_parameters(
            m(vec![vec![5.0, 6.0], vec![7.0, 8.0]]),
            m(vec![vec![9.0], vec![10.0]]),
        );
        linear.forward(&m(vec![vec![1.0, 2.0], vec![3.0, 4.0]])).unwrap();
        linear.backward(&m(vec![vec![1.0, 1.0], vec![1.0, 1.0]])).unwrap();

        assert_eq!(linear.d_bias().shape(), linear.bias().shape());
        assert_eq!(linear.d_bias(), &m(vec![vec![2.0], vec![2.0]]));
    }

    #[test]
    fn test_backward_rejects_wrong_gradient() {
        let mut linear = layer();
        linear.forward(&m(vec![vec![1.0, 1.0, 1.0]])).unwrap();
        assert!(linear.backward(&m(vec![vec![1.0, 1.0, 1.0]])).is_err());
    }

    #[test]
    fn test_gradients_track_latest_backward() {
        let mut linear = layer();
        linear.forward(&m(vec![vec![1.0, 1.0, 1.0]])).unwrap();
        linear.backward(&m(vec![vec![1.0, 1.0]])).unwrap();
        linear.backward(&m(vec![vec![2.0, 2.0]])).unwrap();
        assert_eq!(linear.d_bias(), &m(vec![vec![4.0]]));
    }
}

// ============================================================================
// Activation Backward Tests
// ============================================================================

mod activation_backward_tests {
    use super::*;

    #[test]
    fn test_relu_backward_masks() {
        let mut relu = ReLU::new();
        relu.forward(&m(vec![vec![1.0, -2.0], vec![3.0, -4.0]])).unwrap();
        let d_input = relu.backward(&m(vec![vec![1.0, 1.0], vec![1.0, 1.0]])).unwrap();
        assert_eq!(d_input, m(vec![vec![1.0, 0.0], vec![1.0, 0.0]]));
    }

    #[test]
    fn test_sigmoid_backward_uses_incoming_gradient() {
        let mut sigmoid = Sigmoid::new();
        sigmoid.forward(&m(vec![vec![0.0, 0.0]])).unwrap();

        // g ⊙ (g ⊙ (1 - g))
        let d_input = sigmoid.backward(&m(vec![vec![0.5, 2.0]])).unwrap();
        assert_relative_eq!(d_input.as_slice()[0], 0.125);
        assert_relative_eq!(d_input.as_slice()[1], -4.0);
    }

    #[test]
    fn test_tanh_backward() {
        let mut tanh = Tanh::new();
        let y = tanh.forward(&m(vec![vec![0.0, 0.5]])).unwrap();
        let d_input = tanh.backward(&m(vec![vec![1.0, 2.0]])).unwrap();
        assert_relative_eq!(d_input.as_slice()[0], 1.0);
        let t = y.as_slice()[1];
        assert_relative_eq!(d_input.as_slice()[1], 2.0 * (1.0 - t * t));
    }
}

// ============================================================================
// Model Backward Tests
// ============================================================================

mod model_backward_tests {
    use super::*;

    #[test]
    fn test_gradient_flows_through_all_layers() {
        let first = Linear::with_parameters(m(vec![vec![1.0, -1.0]]), m(vec![vec![0.0, 0.0]]));
        let second = Linear::with_parameters(m(vec![vec![2.0], vec![3.0]]), m(vec![vec![0.0]]));
        let mut model = sequential![first, ReLU::new(), second];

        // hidden = [x, -x] -> relu keeps the first unit for x > 0
        model.forward(&m(vec![vec![2.0]])).unwrap();
        let d_input = model.backward(&m(vec![vec![1.0]])).unwrap();
        assert_eq!(d_input, m(vec![vec![2.0]]));

        let first = model.layers()[0].as_parametric().unwrap();
        assert_eq!(first.d_weights(), &m(vec![vec![4.0, 0.0]]));
        let second = model.layers()[2].as_parametric().unwrap();
        assert_eq!(second.d_weights(), &m(vec![vec![2.0], vec![0.0]]));
        assert_eq!(second.d_bias(), &m(vec![vec![1.0]]));
    }
}
