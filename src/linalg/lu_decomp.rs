//! LU factorisation without pivoting

use num_traits::Float;

use crate::error::{NnError, NnResult};
use crate::linalg::matrix::{Element, Matrix};

/// Lower/upper factors of a square matrix, `a = l · u`.
#[derive(Debug, Clone, PartialEq)]
pub struct LuDecomposition<T> {
    /// Unit lower-triangular factor.
    pub l: Matrix<T>,
    /// Upper-triangular factor.
    pub u: Matrix<T>,
}

/// Doolittle factorisation of a square matrix.
///
/// Rows are eliminated in order without row exchanges, so a zero pivot fails
/// with [`NnError::ZeroPivot`] even when the matrix is not singular.
///
/// # Example
///
/// ```
/// use micro_nn::linalg::{lu_factor, Matrix};
///
/// let a = Matrix::from_rows(vec![vec![4.0f64, 3.0], vec![6.0, 3.0]]).unwrap();
/// let lu = lu_factor(&a).unwrap();
/// assert_eq!(lu.l.matmul(&lu.u).unwrap(), a);
/// ```
pub fn lu_factor<T: Element + Float>(matrix: &Matrix<T>) -> NnResult<LuDecomposition<T>> {
    let (rows, cols) = matrix.shape();
    if rows != cols {
        return Err(NnError::shape(
            "lu_factor",
            format!("matrix must be square, got {}x{}", rows, cols),
        ));
    }

    let n = rows;
    let mut l = Matrix::identity(n);
    let mut u = matrix.clone();
    for pivot_row in 0..n {
        let pivot = *u.at(pivot_row, pivot_row)?;
        if pivot == T::zero() {
            return Err(NnError::ZeroPivot(pivot_row));
        }
        for target_row in pivot_row + 1..n {
            let factor = *u.at(target_row, pivot_row)? / pivot;
            *l.at_mut(target_row, pivot_row)? = factor;
            for col in pivot_row..n {
                let updated = *u.at(target_row, col)? - factor * *u.at(pivot_row, col)?;
                *u.at_mut(target_row, col)? = updated;
            }
        }
    }
    Ok(LuDecomposition { l, u })
}
