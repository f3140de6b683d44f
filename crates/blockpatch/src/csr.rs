//! Compressed-row sparse matrices.
//!
//! `CsrMatrix` is the wire format the patch partitioner consumes and the
//! serialization format block-diagonal matrices convert to: row-start
//! offsets, column indices, and values for the nonzero entries only.

use crate::scalar::Scalar;

/// A sparse matrix in compressed-row form.
///
/// `row_ptr` has length `rows + 1`; row `i` owns the entry range
/// `row_ptr[i]..row_ptr[i + 1]` of `col_ind` and `values`. Entries within a
/// row are stored in insertion order (the partitioner fills them in
/// column-sorted order).
///
/// # Example
///
/// ```
/// use blockpatch::CsrMatrix;
///
/// // [1 0]
/// // [0 2]
/// let m = CsrMatrix::from_dense(2, 2, &[1.0, 0.0, 0.0, 2.0]);
/// assert_eq!(m.nnz(), 2);
/// assert_eq!(m.get(0, 0), 1.0);
/// assert_eq!(m.get(0, 1), 0.0);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct CsrMatrix<T: Scalar> {
    rows: usize,
    cols: usize,
    row_ptr: Vec<usize>,
    col_ind: Vec<usize>,
    values: Vec<T>,
}

impl<T: Scalar> CsrMatrix<T> {
    /// Create an empty matrix with no stored entries.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            row_ptr: vec![0; rows + 1],
            col_ind: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Assemble a matrix from raw compressed-row parts.
    ///
    /// # Panics
    ///
    /// Panics if the parts are not a valid compressed-row layout. Malformed
    /// prefix sums indicate a bug in the caller, not a recoverable runtime
    /// condition.
    pub fn from_parts(
        rows: usize,
        cols: usize,
        row_ptr: Vec<usize>,
        col_ind: Vec<usize>,
        values: Vec<T>,
    ) -> Self {
        let m = Self {
            rows,
            cols,
            row_ptr,
            col_ind,
            values,
        };
        m.check_validity();
        m
    }

    /// Build from a row-major dense buffer, keeping only nonzero entries.
    ///
    /// # Panics
    ///
    /// Panics if `entries.len() != rows * cols`.
    pub fn from_dense(rows: usize, cols: usize, entries: &[T]) -> Self {
        assert_eq!(entries.len(), rows * cols, "dense buffer size mismatch");
        let mut row_ptr = Vec::with_capacity(rows + 1);
        let mut col_ind = Vec::new();
        let mut values = Vec::new();
        row_ptr.push(0);
        for i in 0..rows {
            for j in 0..cols {
                let v = entries[i * cols + j];
                if v != T::zero() {
                    col_ind.push(j);
                    values.push(v);
                }
            }
            row_ptr.push(col_ind.len());
        }
        Self {
            rows,
            cols,
            row_ptr,
            col_ind,
            values,
        }
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

    /// Number of stored entries.
    #[inline]
    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    /// The row-start offset table, length `rows + 1`.
    #[inline]
    pub fn row_ptr(&self) -> &[usize] {
        &self.row_ptr
    }

    /// The entry range belonging to row `i`.
    #[inline]
    pub fn row_range(&self, i: usize) -> std::ops::Range<usize> {
        self.row_ptr[i]..self.row_ptr[i + 1]
    }

    /// Column index of stored entry `k`.
    #[inline]
    pub fn col(&self, k: usize) -> usize {
        self.col_ind[k]
    }

    /// Value of stored entry `k`.
    #[inline]
    pub fn value(&self, k: usize) -> T {
        self.values[k]
    }

    /// Element access; returns zero for entries that are not stored.
    pub fn get(&self, i: usize, j: usize) -> T {
        assert!(i < self.rows && j < self.cols, "index out of bounds");
        for k in self.row_range(i) {
            if self.col_ind[k] == j {
                return self.values[k];
            }
        }
        T::zero()
    }

    /// Iterate over stored entries as `(row, col, value)` triplets in
    /// row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, T)> + '_ {
        (0..self.rows).flat_map(move |i| {
            self.row_range(i)
                .map(move |k| (i, self.col_ind[k], self.values[k]))
        })
    }

    /// Assert the structural invariants of the compressed-row layout.
    ///
    /// # Panics
    ///
    /// Panics if `row_ptr` is not monotone over `[0, nnz]`, or a column
    /// index is out of range, or the index/value arrays disagree in length.
    pub fn check_validity(&self) {
        assert_eq!(self.row_ptr.len(), self.rows + 1, "row_ptr length");
        assert_eq!(self.row_ptr[0], 0, "row_ptr must start at 0");
        for i in 0..self.rows {
            assert!(self.row_ptr[i] <= self.row_ptr[i + 1], "row_ptr not monotone");
        }
        assert_eq!(self.row_ptr[self.rows], self.col_ind.len(), "row_ptr end");
        assert_eq!(self.col_ind.len(), self.values.len(), "col/value length");
        for &j in &self.col_ind {
            assert!(j < self.cols, "column index {} out of range", j);
        }
    }
}
