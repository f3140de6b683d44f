//! Dense-or-sparse sub-block cells.
//!
//! Each (row-patch, col-patch) pair of a partitioned matrix stores its
//! entries in whichever representation suits its fill ratio: a dense
//! column-major buffer when the block is well filled, compressed-row sparse
//! storage otherwise. The representation is chosen once at construction.

use crate::csr::CsrMatrix;
use crate::dense::DenseMatrix;
use crate::scalar::Scalar;

/// The fill-ratio classification rule.
///
/// A cell with `nnz` stored entries out of `rows * cols` positions is dense
/// iff `nnz >= threshold * rows * cols`. The boundary case, where the counts
/// are exactly equal, classifies dense.
#[inline]
pub fn is_dense_fill(nnz: usize, rows: usize, cols: usize, threshold: f64) -> bool {
    nnz as f64 >= threshold * ((rows * cols) as f64)
}

/// One sub-block of a patch-partitioned matrix, tagged dense or sparse.
///
/// Cells are created by the partitioner and immutable thereafter.
#[derive(Clone, Debug, PartialEq)]
pub enum BlockCell<T: Scalar> {
    Dense(DenseMatrix<T>),
    Sparse(CsrMatrix<T>),
}

impl<T: Scalar> BlockCell<T> {
    /// Number of rows (the row-patch size).
    pub fn rows(&self) -> usize {
        match self {
            BlockCell::Dense(m) => m.rows(),
            BlockCell::Sparse(m) => m.rows(),
        }
    }

    /// Number of columns (the col-patch size).
    pub fn cols(&self) -> usize {
        match self {
            BlockCell::Dense(m) => m.cols(),
            BlockCell::Sparse(m) => m.cols(),
        }
    }

    /// Stored entry count. For a dense cell this is the full extent.
    pub fn nnz(&self) -> usize {
        match self {
            BlockCell::Dense(m) => m.rows() * m.cols(),
            BlockCell::Sparse(m) => m.nnz(),
        }
    }

    /// Whether the cell holds a dense buffer.
    pub fn is_dense(&self) -> bool {
        matches!(self, BlockCell::Dense(_))
    }

    /// Element access in local (within-cell) coordinates.
    pub fn get(&self, i: usize, j: usize) -> T {
        match self {
            BlockCell::Dense(m) => m.get(i, j),
            BlockCell::Sparse(m) => m.get(i, j),
        }
    }

    /// The dense payload, if this cell is dense.
    pub fn as_dense(&self) -> Option<&DenseMatrix<T>> {
        match self {
            BlockCell::Dense(m) => Some(m),
            BlockCell::Sparse(_) => None,
        }
    }

    /// The sparse payload, if this cell is sparse.
    pub fn as_sparse(&self) -> Option<&CsrMatrix<T>> {
        match self {
            BlockCell::Dense(_) => None,
            BlockCell::Sparse(m) => Some(m),
        }
    }
}
