//! Dense column-major matrices with zero-copy faer views.
//!
//! Both blockpatch and faer store matrices in column-major (Fortran-style)
//! order, so handing a block to the eigensolver is a reinterpretation of the
//! same buffer, not a copy.

use faer::{MatMut, MatRef};

use crate::error::BlockError;
use crate::scalar::Scalar;

/// A dense rectangular matrix stored column-major.
///
/// # Example
///
/// ```
/// use blockpatch::DenseMatrix;
///
/// let mut m: DenseMatrix<f64> = DenseMatrix::zeros(2, 3);
/// m.set(0, 1, 5.0);
/// assert_eq!(m.get(0, 1), 5.0);
/// assert_eq!(m.get(1, 1), 0.0);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct DenseMatrix<T: Scalar> {
    rows: usize,
    cols: usize,
    data: Vec<T>,
}

impl<T: Scalar> DenseMatrix<T> {
    /// Create a zero-filled matrix.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![T::zero(); rows * cols],
        }
    }

    /// Create the `n x n` identity matrix.
    pub fn identity(n: usize) -> Self {
        let mut m = Self::zeros(n, n);
        for i in 0..n {
            m.set(i, i, T::one());
        }
        m
    }

    /// Create a matrix from a column-major buffer.
    pub fn from_vec(data: Vec<T>, rows: usize, cols: usize) -> Result<Self, BlockError> {
        if data.len() != rows * cols {
            return Err(BlockError::ShapeMismatch {
                expected: rows * cols,
                actual: data.len(),
            });
        }
        Ok(Self { rows, cols, data })
    }

    /// Number of rows.
    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// True for a 0x0 matrix.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    fn idx(&self, i: usize, j: usize) -> usize {
        debug_assert!(i < self.rows && j < self.cols, "index out of bounds");
        i + j * self.rows
    }

    /// Element access.
    #[inline]
    pub fn get(&self, i: usize, j: usize) -> T {
        self.data[self.idx(i, j)]
    }

    /// Element assignment.
    #[inline]
    pub fn set(&mut self, i: usize, j: usize, value: T) {
        let k = self.idx(i, j);
        self.data[k] = value;
    }

    /// The underlying column-major buffer.
    #[inline]
    pub fn data(&self) -> &[T] {
        &self.data
    }

    /// Column `j` as a contiguous slice.
    #[inline]
    pub fn column(&self, j: usize) -> &[T] {
        let start = j * self.rows;
        &self.data[start..start + self.rows]
    }

    /// Column `j` as a mutable contiguous slice.
    #[inline]
    pub fn column_mut(&mut self, j: usize) -> &mut [T] {
        let start = j * self.rows;
        &mut self.data[start..start + self.rows]
    }

    /// Accumulate `other` into the sub-block whose top-left corner is at
    /// `(row0, col0)`.
    ///
    /// Fails if `other` does not fit inside this matrix at that position.
    pub fn add_assign_at(
        &mut self,
        row0: usize,
        col0: usize,
        other: &DenseMatrix<T>,
    ) -> Result<(), BlockError> {
        if row0 + other.rows > self.rows || col0 + other.cols > self.cols {
            return Err(BlockError::DimensionMismatch {
                expected_rows: self.rows - row0.min(self.rows),
                expected_cols: self.cols - col0.min(self.cols),
                rows: other.rows,
                cols: other.cols,
            });
        }
        for j in 0..other.cols {
            for i in 0..other.rows {
                let k = self.idx(row0 + i, col0 + j);
                self.data[k] += other.get(i, j);
            }
        }
        Ok(())
    }

    /// View as an immutable faer matrix (zero-copy).
    pub fn as_faer_mat(&self) -> MatRef<'_, T> {
        MatRef::from_column_major_slice(&self.data, self.rows, self.cols)
    }

    /// View as a mutable faer matrix (zero-copy).
    pub fn as_faer_mat_mut(&mut self) -> MatMut<'_, T> {
        MatMut::from_column_major_slice_mut(&mut self.data, self.rows, self.cols)
    }

    /// Check whether the columns form an orthonormal set, i.e. V^H V = I
    /// within `tol`. Non-square matrices are never unitary.
    pub fn is_unitary(&self, tol: f64) -> bool {
        if self.rows != self.cols {
            return false;
        }
        let n = self.rows;
        for j in 0..n {
            for k in 0..n {
                let mut dot = T::zero();
                for i in 0..n {
                    dot += self.get(i, j).conjugate() * self.get(i, k);
                }
                let expected = if j == k { T::one() } else { T::zero() };
                if (dot - expected).modulus() > tol {
                    return false;
                }
            }
        }
        true
    }
}

impl<T: Scalar> std::fmt::Display for DenseMatrix<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}x{}", self.rows, self.cols)?;
        for i in 0..self.rows {
            for j in 0..self.cols {
                write!(f, "{:?} ", self.get(i, j))?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
