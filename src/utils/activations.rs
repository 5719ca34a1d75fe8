//! Scalar activation functions
//!
//! Elementwise building blocks for the activation layers. Each function works
//! on a single value and is lifted to matrices with `Matrix::unary_expr`.

use num_traits::Float;

/// Sigmoid activation function.
///
/// Returns the sigmoid of the input: 1 / (1 + exp(-x))
pub fn sigmoid<T: Float>(x: T) -> T {
    T::one() / (T::one() + (-x).exp())
}

/// Sigmoid derivative assuming x = sigmoid(z).
///
/// Returns the derivative: x * (1 - x)
pub fn sigmoid_derivative<T: Float>(x: T) -> T {
    x * (T::one() - x)
}

/// Rectified linear unit: max(0, x).
pub fn relu<T: Float>(x: T) -> T {
    if x > T::zero() {
        x
    } else {
        T::zero()
    }
}

/// Tanh derivative assuming y = tanh(z): 1 - y²
pub fn tanh_derivative<T: Float>(y: T) -> T {
    T::one() - y * y
}
