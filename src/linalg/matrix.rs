//! Dense row-major matrix
//!
//! [`Matrix`] is the only numeric container in the crate. Shapes are fixed at
//! construction; every operation returns a new matrix. Fallible operations
//! (shape checks, indexing) return [`NnResult`], while the `+`, `-` and `*`
//! operators between matrices are sugar over the checked methods and panic on
//! a shape mismatch.

use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

use num_traits::{Float, Num};

use crate::error::{NnError, NnResult};

/// Element type a [`Matrix`] can hold.
///
/// Any copyable numeric type qualifies: `f32`, `f64` and the primitive
/// integers all implement it through the blanket impl.
pub trait Element: Copy + Num + fmt::Debug {}

impl<T: Copy + Num + fmt::Debug> Element for T {}

/// Floating-point element type used by layers, losses and optimizers.
pub trait Scalar: Element + Float + fmt::Display + 'static {}

impl<T: Element + Float + fmt::Display + 'static> Scalar for T {}

/// Dense 2-D matrix stored in row-major order.
///
/// Invariant: `data.len() == rows * cols`.
///
/// # Example
///
/// ```
/// use micro_nn::linalg::Matrix;
///
/// let a = Matrix::from_rows(vec![vec![1, 2], vec![3, 4]]).unwrap();
/// let b = Matrix::<i32>::identity(2);
/// assert_eq!(a.matmul(&b).unwrap(), a);
/// ```
#[derive(Clone, PartialEq)]
pub struct Matrix<T> {
    rows: usize,
    cols: usize,
    data: Vec<T>,
}

impl<T> Default for Matrix<T> {
    /// The empty 0x0 matrix, used as the "not yet initialised" sentinel.
    fn default() -> Self {
        Self {
            rows: 0,
            cols: 0,
            data: Vec::new(),
        }
    }
}

impl<T: Element> Matrix<T> {
    /// Creates a zero-filled `rows x cols` matrix.
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![T::zero(); rows * cols],
        }
    }

    /// Alias of [`Matrix::new`] that reads better at call sites.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self::new(rows, cols)
    }

    /// Square identity matrix.
    pub fn identity(size: usize) -> Self {
        let mut matrix = Self::new(size, size);
        for i in 0..size {
            matrix.data[i * size + i] = T::one();
        }
        matrix
    }

    /// 1x1 matrix holding `value`.
    pub fn from_scalar(value: T) -> Self {
        Self {
            rows: 1,
            cols: 1,
            data: vec![value],
        }
    }

    /// Wraps a flat row-major buffer.
    ///
    /// Fails with [`NnError::ShapeMismatch`] if `data.len() != rows * cols`.
    pub fn from_vec(rows: usize, cols: usize, data: Vec<T>) -> NnResult<Self> {
        if data.len() != rows * cols {
            return Err(NnError::shape(
                "from_vec",
                format!("{} elements cannot form a {}x{} matrix", data.len(), rows, cols),
            ));
        }
        Ok(Self { rows, cols, data })
    }

    /// Builds a matrix from nested rows.
    ///
    /// Every row must have the same length as the first one. An empty input
    /// yields the 0x0 matrix.
    pub fn from_rows(rows: Vec<Vec<T>>) -> NnResult<Self> {
        let Some(first) = rows.first() else {
            return Ok(Self::default());
        };
        let cols = first.len();
        let mut data = Vec::with_capacity(rows.len() * cols);
        for (index, row) in rows.iter().enumerate() {
            if row.len() != cols {
                return Err(NnError::shape(
                    "from_rows",
                    format!(
                        "all rows must have the same number of columns: row {} has {}, expected {}",
                        index,
                        row.len(),
                        cols
                    ),
                ));
            }
            data.extend_from_slice(row);
        }
        Ok(Self {
            rows: rows.len(),
            cols,
            data,
        })
    }

    /// Stacks single-row matrices into one multi-row matrix.
    ///
    /// Each input must have exactly one row and the same column count as the
    /// first. An empty slice yields the 0x0 matrix.
    pub fn from_row_vectors(row_vectors: &[Matrix<T>]) -> NnResult<Self> {
        let Some(first) = row_vectors.first() else {
            return Ok(Self::default());
        };
        let cols = first.cols;
        let mut data = Vec::with_capacity(row_vectors.len() * cols);
        for (index, vector) in row_vectors.iter().enumerate() {
            if vector.rows != 1 || vector.cols != cols {
                return Err(NnError::shape(
                    "from_row_vectors",
                    format!(
                        "entry {} is {}x{}, expected 1x{}",
                        index, vector.rows, vector.cols, cols
                    ),
                ));
            }
            data.extend_from_slice(&vector.data);
        }
        Ok(Self {
            rows: row_vectors.len(),
            cols,
            data,
        })
    }

    /// Checked read access to a single element.
    pub fn at(&self, row: usize, col: usize) -> NnResult<&T> {
        let index = self.index_checked(row, col)?;
        Ok(&self.data[index])
    }

    /// Checked write access to a single element.
    pub fn at_mut(&mut self, row: usize, col: usize) -> NnResult<&mut T> {
        let index = self.index_checked(row, col)?;
        Ok(&mut self.data[index])
    }

    /// Copies row `row` into a `1 x cols` matrix.
    pub fn row(&self, row: usize) -> NnResult<Self> {
        if row >= self.rows {
            return Err(self.out_of_range(row, 0));
        }
        let start = row * self.cols;
        Ok(Self {
            rows: 1,
            cols: self.cols,
            data: self.data[start..start + self.cols].to_vec(),
        })
    }

    /// Copies column `col` into a `rows x 1` matrix.
    pub fn col(&self, col: usize) -> NnResult<Self> {
        if col >= self.cols {
            return Err(self.out_of_range(0, col));
        }
        let data = (0..self.rows).map(|row| self.data[self.index(row, col)]).collect();
        Ok(Self {
            rows: self.rows,
            cols: 1,
            data,
        })
    }

    /// Returns a new matrix with rows and columns swapped.
    pub fn transpose(&self) -> Self {
        let mut result = Self::new(self.cols, self.rows);
        for row in 0..self.rows {
            for col in 0..self.cols {
                result.data[col * self.rows + row] = self.data[self.index(row, col)];
            }
        }
        result
    }

    /// Applies `func` to every element and returns the result.
    ///
    /// All elementwise math in the crate (activations, scaling, clamping) is
    /// expressed through this method.
    pub fn unary_expr<F>(&self, func: F) -> Self
    where
        F: Fn(T) -> T,
    {
        Self {
            rows: self.rows,
            cols: self.cols,
            data: self.data.iter().map(|&x| func(x)).collect(),
        }
    }

    /// In-place variant of [`Matrix::unary_expr`].
    ///
    /// Takes `FnMut` so that stateful generators (random initialisers) can be
    /// used directly.
    pub fn unary_expr_inplace<F>(&mut self, mut func: F)
    where
        F: FnMut(T) -> T,
    {
        for value in &mut self.data {
            *value = func(*value);
        }
    }

    /// Elementwise sum with broadcasting.
    ///
    /// Either operand may supply the unit dimension, and on each axis the
    /// result takes the non-unit size, so `[1x3] + [2x1]` is `2x3`.
    pub fn try_add(&self, other: &Self) -> NnResult<Self> {
        self.broadcast_with(other, "add", |a, b| a + b)
    }

    /// Elementwise difference with broadcasting.
    pub fn try_sub(&self, other: &Self) -> NnResult<Self> {
        self.broadcast_with(other, "sub", |a, b| a - b)
    }

    /// Matrix product `self · other`.
    ///
    /// Fails unless `self.cols() == other.rows()`.
    pub fn matmul(&self, other: &Self) -> NnResult<Self> {
        if self.cols != other.rows {
            return Err(NnError::shape(
                "matmul",
                format!(
                    "{}x{} * {}x{}: inner dimensions {} and {} differ",
                    self.rows, self.cols, other.rows, other.cols, self.cols, other.rows
                ),
            ));
        }

        let mut result = Self::new(self.rows, other.cols);
        for row in 0..self.rows {
            for col in 0..other.cols {
                let mut sum = T::zero();
                for k in 0..self.cols {
                    sum = sum + self.data[self.index(row, k)] * other.data[other.index(k, col)];
                }
                result.data[row * other.cols + col] = sum;
            }
        }
        Ok(result)
    }

    /// Hadamard product. Shapes must be identical.
    pub fn elementwise_multiply(&self, other: &Self) -> NnResult<Self> {
        self.zip_with(other, "elementwise_multiply", |a, b| a * b)
    }

    /// Elementwise quotient. Shapes must be identical.
    pub fn elementwise_divide(&self, other: &Self) -> NnResult<Self> {
        self.zip_with(other, "elementwise_divide", |a, b| a / b)
    }

    /// Combines two identically shaped matrices element by element.
    pub fn zip_with<F>(&self, other: &Self, op: &'static str, func: F) -> NnResult<Self>
    where
        F: Fn(T, T) -> T,
    {
        if self.shape() != other.shape() {
            return Err(NnError::shape(
                op,
                format!("{}x{} vs {}x{}", self.rows, self.cols, other.rows, other.cols),
            ));
        }
        Ok(Self {
            rows: self.rows,
            cols: self.cols,
            data: self.data.iter().zip(&other.data).map(|(&a, &b)| func(a, b)).collect(),
        })
    }

    /// Adds `scalar` to every element.
    pub fn add_scalar(&self, scalar: T) -> Self {
        self.unary_expr(|x| x + scalar)
    }

    /// Multiplies every element by `scalar`.
    pub fn scale(&self, scalar: T) -> Self {
        self.unary_expr(|x| x * scalar)
    }

    /// Sum of all elements.
    pub fn sum(&self) -> T {
        self.data.iter().fold(T::zero(), |acc, &x| acc + x)
    }

    /// Sums across columns, one value per row (`rows x 1`).
    pub fn rowwise_sum(&self) -> Self {
        let mut sums = Self::new(self.rows, 1);
        if self.cols == 0 {
            return sums;
        }
        for (sum, chunk) in sums.data.iter_mut().zip(self.data.chunks_exact(self.cols)) {
            *sum = chunk.iter().fold(T::zero(), |acc, &x| acc + x);
        }
        sums
    }

    /// Sums across rows, one value per column (`1 x cols`).
    pub fn colwise_sum(&self) -> Self {
        let mut sums = Self::new(1, self.cols);
        if self.cols == 0 {
            return sums;
        }
        for chunk in self.data.chunks_exact(self.cols) {
            for (sum, &value) in sums.data.iter_mut().zip(chunk) {
                *sum = *sum + value;
            }
        }
        sums
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// `(rows, cols)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True for matrices with zero elements, including the 0x0 sentinel.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Row-major view of the underlying buffer.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Iterates over the elements in row-major order.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.data.iter()
    }

    fn index(&self, row: usize, col: usize) -> usize {
        row * self.cols + col
    }

    fn index_checked(&self, row: usize, col: usize) -> NnResult<usize> {
        if row >= self.rows || col >= self.cols {
            return Err(self.out_of_range(row, col));
        }
        Ok(self.index(row, col))
    }

    fn out_of_range(&self, row: usize, col: usize) -> NnError {
        NnError::IndexOutOfRange {
            row,
            col,
            rows: self.rows,
            cols: self.cols,
        }
    }

    /// Combines two matrices elementwise, replicating a unit dimension of
    /// either operand. The broadcast index into a unit axis is
    /// `min(index, dim - 1)`, i.e. always 0.
    fn broadcast_with<F>(&self, other: &Self, op: &'static str, func: F) -> NnResult<Self>
    where
        F: Fn(T, T) -> T,
    {
        let rows = broadcast_dim(self.rows, other.rows);
        let cols = broadcast_dim(self.cols, other.cols);
        let (Some(rows), Some(cols)) = (rows, cols) else {
            return Err(NnError::shape(
                op,
                format!(
                    "{}x{} and {}x{} cannot be broadcast",
                    self.rows, self.cols, other.rows, other.cols
                ),
            ));
        };

        let mut result = Self::new(rows, cols);
        for row in 0..rows {
            for col in 0..cols {
                let lhs = self.data[self.index(row.min(self.rows - 1), col.min(self.cols - 1))];
                let rhs = other.data[other.index(row.min(other.rows - 1), col.min(other.cols - 1))];
                result.data[row * cols + col] = func(lhs, rhs);
            }
        }
        Ok(result)
    }
}

fn broadcast_dim(lhs: usize, rhs: usize) -> Option<usize> {
    if lhs == rhs {
        Some(lhs)
    } else if rhs == 1 {
        Some(lhs)
    } else if lhs == 1 {
        Some(rhs)
    } else {
        None
    }
}

impl<T: Element + Float> Matrix<T> {
    /// Elementwise square root.
    pub fn sqrt(&self) -> Self {
        self.unary_expr(|x| x.sqrt())
    }

    /// Elementwise integer power.
    pub fn powi(&self, exponent: i32) -> Self {
        self.unary_expr(|x| x.powi(exponent))
    }
}

/// Converts an `f64` constant into the scalar type.
///
/// Lossless for `f32`/`f64` apart from ordinary rounding; yields NaN if the
/// value is not representable.
pub fn scalar<T: Scalar>(value: f64) -> T {
    <T as num_traits::NumCast>::from(value).unwrap_or_else(T::nan)
}

/// Elementwise natural logarithm.
pub fn log<T: Element + Float>(matrix: &Matrix<T>) -> Matrix<T> {
    matrix.unary_expr(|x| x.ln())
}

/// Clamps every element into `[min, max]`.
pub fn clamp<T: Element + PartialOrd>(matrix: &Matrix<T>, min: T, max: T) -> Matrix<T> {
    matrix.unary_expr(|x| {
        if x < min {
            min
        } else if x > max {
            max
        } else {
            x
        }
    })
}

impl<T: Element + fmt::Display> fmt::Display for Matrix<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for row in 0..self.rows {
            if row > 0 {
                write!(f, ",\n ")?;
            }
            write!(f, "[")?;
            for col in 0..self.cols {
                if col > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", self.data[self.index(row, col)])?;
            }
            write!(f, "]")?;
        }
        write!(f, "]")
    }
}

impl<T: fmt::Debug> fmt::Debug for Matrix<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Matrix")
            .field("rows", &self.rows)
            .field("cols", &self.cols)
            .field("data", &self.data)
            .finish()
    }
}

impl<T: Element + Neg<Output = T>> Neg for &Matrix<T> {
    type Output = Matrix<T>;

    fn neg(self) -> Matrix<T> {
        self.unary_expr(|x| -x)
    }
}

impl<T: Element + Neg<Output = T>> Neg for Matrix<T> {
    type Output = Matrix<T>;

    fn neg(self) -> Matrix<T> {
        -&self
    }
}

// Matrix-matrix operators. Each delegates to the checked method.
macro_rules! impl_matrix_op {
    ($trait:ident, $method:ident, $checked:ident) => {
        impl<T: Element> $trait<&Matrix<T>> for &Matrix<T> {
            type Output = Matrix<T>;

            /// # Panics
            ///
            /// Panics if the shapes are incompatible. Use the checked method
            /// to handle the error instead.
            fn $method(self, rhs: &Matrix<T>) -> Matrix<T> {
                match self.$checked(rhs) {
                    Ok(result) => result,
                    Err(err) => panic!("{}", err),
                }
            }
        }

        impl<T: Element> $trait<Matrix<T>> for Matrix<T> {
            type Output = Matrix<T>;

            fn $method(self, rhs: Matrix<T>) -> Matrix<T> {
                (&self).$method(&rhs)
            }
        }

        impl<T: Element> $trait<&Matrix<T>> for Matrix<T> {
            type Output = Matrix<T>;

            fn $method(self, rhs: &Matrix<T>) -> Matrix<T> {
                (&self).$method(rhs)
            }
        }
    };
}

impl_matrix_op!(Add, add, try_add);
impl_matrix_op!(Sub, sub, try_sub);
impl_matrix_op!(Mul, mul, matmul);

// Scalar operators, on either side, for the primitive element types.
macro_rules! impl_scalar_ops {
    ($($scalar:ty),*) => {
        $(
            impl Add<$scalar> for &Matrix<$scalar> {
                type Output = Matrix<$scalar>;

                fn add(self, rhs: $scalar) -> Matrix<$scalar> {
                    self.add_scalar(rhs)
                }
            }

            impl Sub<$scalar> for &Matrix<$scalar> {
                type Output = Matrix<$scalar>;

                fn sub(self, rhs: $scalar) -> Matrix<$scalar> {
                    self.unary_expr(|x| x - rhs)
                }
            }

            impl Mul<$scalar> for &Matrix<$scalar> {
                type Output = Matrix<$scalar>;

                fn mul(self, rhs: $scalar) -> Matrix<$scalar> {
                    self.scale(rhs)
                }
            }

            impl Div<$scalar> for &Matrix<$scalar> {
                type Output = Matrix<$scalar>;

                fn div(self, rhs: $scalar) -> Matrix<$scalar> {
                    self.unary_expr(|x| x / rhs)
                }
            }

            impl Add<$scalar> for Matrix<$scalar> {
                type Output = Matrix<$scalar>;

                fn add(self, rhs: $scalar) -> Matrix<$scalar> {
                    &self + rhs
                }
            }

            impl Sub<$scalar> for Matrix<$scalar> {
                type Output = Matrix<$scalar>;

                fn sub(self, rhs: $scalar) -> Matrix<$scalar> {
                    &self - rhs
                }
            }

            impl Mul<$scalar> for Matrix<$scalar> {
                type Output = Matrix<$scalar>;

                fn mul(self, rhs: $scalar) -> Matrix<$scalar> {
                    &self * rhs
                }
            }

            impl Div<$scalar> for Matrix<$scalar> {
                type Output = Matrix<$scalar>;

                fn div(self, rhs: $scalar) -> Matrix<$scalar> {
                    &self / rhs
                }
            }

            impl Mul<&Matrix<$scalar>> for $scalar {
                type Output = Matrix<$scalar>;

                fn mul(self, rhs: &Matrix<$scalar>) -> Matrix<$scalar> {
                    rhs.scale(self)
                }
            }

            impl Mul<Matrix<$scalar>> for $scalar {
                type Output = Matrix<$scalar>;

                fn mul(self, rhs: Matrix<$scalar>) -> Matrix<$scalar> {
                    rhs.scale(self)
                }
            }
        )*
    };
}

impl_scalar_ops!(f32, f64, i32, i64, u32, u64, usize);
