//! Block-diagonal matrices.
//!
//! A block-diagonal matrix is an ordered sequence of independent square
//! dense blocks plus an offset table: block `m` occupies rows and columns
//! `offsets[m]..offsets[m + 1]` of the full matrix, and everything off the
//! blocks is implicitly zero. One is built fresh per renormalization step
//! (e.g. as a reduced density matrix), merged, diagonalized, and discarded.

use crate::csr::CsrMatrix;
use crate::dense::DenseMatrix;
use crate::error::BlockError;
use crate::scalar::Scalar;

/// A square matrix stored as independent dense diagonal blocks.
///
/// Invariants: `offsets` is strictly increasing, starts at zero, and ends at
/// `rank`; block `m` is square with dimension `offsets[m + 1] - offsets[m]`.
///
/// # Example
///
/// ```
/// use blockpatch::BlockDiagonalMatrix;
///
/// let m: BlockDiagonalMatrix<f64> = BlockDiagonalMatrix::identity(3);
/// assert_eq!(m.rank(), 3);
/// assert_eq!(m.blocks(), 3);
/// assert_eq!(m.block(1).get(0, 0), 1.0);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct BlockDiagonalMatrix<T: Scalar> {
    rank: usize,
    offsets: Vec<usize>,
    data: Vec<DenseMatrix<T>>,
}

impl<T: Scalar> BlockDiagonalMatrix<T> {
    /// Create a zero matrix with the block structure given by `offsets`
    /// (length `blocks + 1`, strictly increasing, starting at zero).
    pub fn new(offsets: Vec<usize>) -> Result<Self, BlockError> {
        if offsets.first() != Some(&0) {
            return Err(BlockError::InvalidOffsets {
                message: format!("offset table must start at 0, got {:?}", offsets.first()),
            });
        }
        for w in offsets.windows(2) {
            if w[0] >= w[1] {
                return Err(BlockError::InvalidOffsets {
                    message: format!("offsets not strictly increasing: {} then {}", w[0], w[1]),
                });
            }
        }
        let rank = *offsets.last().unwrap();
        let data = offsets
            .windows(2)
            .map(|w| DenseMatrix::zeros(w[1] - w[0], w[1] - w[0]))
            .collect();
        Ok(Self {
            rank,
            offsets,
            data,
        })
    }

    /// All blocks of size one holding `value`: a scalar multiple of the
    /// identity in block-diagonal form.
    pub fn scalar_diagonal(n: usize, value: T) -> Self {
        let mut data = Vec::with_capacity(n);
        for _ in 0..n {
            let mut b = DenseMatrix::zeros(1, 1);
            b.set(0, 0, value);
            data.push(b);
        }
        Self {
            rank: n,
            offsets: (0..=n).collect(),
            data,
        }
    }

    /// The `n x n` identity.
    pub fn identity(n: usize) -> Self {
        Self::scalar_diagonal(n, T::one())
    }

    /// The `n x n` zero matrix with unit block structure.
    pub fn zero(n: usize) -> Self {
        Self::scalar_diagonal(n, T::zero())
    }

    /// Total dimension of the full matrix.
    #[inline]
    pub fn rank(&self) -> usize {
        self.rank
    }

    /// Number of diagonal blocks.
    #[inline]
    pub fn blocks(&self) -> usize {
        self.data.len()
    }

    /// Start of block `m` in the full matrix; `offset(blocks()) == rank()`.
    #[inline]
    pub fn offset(&self, m: usize) -> usize {
        self.offsets[m]
    }

    /// Dimension of block `m`.
    #[inline]
    pub fn block_dim(&self, m: usize) -> usize {
        self.offsets[m + 1] - self.offsets[m]
    }

    /// Block `m`.
    #[inline]
    pub fn block(&self, m: usize) -> &DenseMatrix<T> {
        &self.data[m]
    }

    /// All blocks, mutable, in order. Each diagonalization task writes only
    /// to its own index.
    #[inline]
    pub(crate) fn blocks_mut(&mut self) -> &mut [DenseMatrix<T>] {
        &mut self.data
    }

    /// Replace block `m`. The block must be square with the slot's
    /// dimension.
    pub fn set_block(&mut self, m: usize, mat: DenseMatrix<T>) -> Result<(), BlockError> {
        self.check_block(m, &mat)?;
        self.data[m] = mat;
        Ok(())
    }

    /// Accumulate `mat` into block `m`.
    pub fn sum_block(&mut self, m: usize, mat: &DenseMatrix<T>) -> Result<(), BlockError> {
        self.check_block(m, mat)?;
        self.data[m].add_assign_at(0, 0, mat)
    }

    fn check_block(&self, m: usize, mat: &DenseMatrix<T>) -> Result<(), BlockError> {
        if m >= self.blocks() {
            return Err(BlockError::BlockIndexOutOfBounds {
                index: m,
                blocks: self.blocks(),
            });
        }
        let dim = self.block_dim(m);
        if mat.rows() != dim || mat.cols() != dim {
            return Err(BlockError::DimensionMismatch {
                expected_rows: dim,
                expected_cols: dim,
                rows: mat.rows(),
                cols: mat.cols(),
            });
        }
        Ok(())
    }

    /// Merge two block-diagonal matrices: `coarse + fine`, where every
    /// `fine` block must fall entirely inside one `coarse` block (the fine
    /// offset table refines the coarse one).
    ///
    /// The result carries the coarse block structure. A fine block that
    /// straddles a coarse boundary, or a cursor that cannot cover all
    /// blocks, breaks the containment precondition and fails with
    /// [`BlockError::OffsetContainment`]; the sum is never silently
    /// truncated.
    pub fn merge(coarse: &Self, fine: &Self) -> Result<Self, BlockError> {
        if coarse.rank != fine.rank {
            return Err(BlockError::RankMismatch {
                left: coarse.rank,
                right: fine.rank,
            });
        }
        let mut out = coarse.clone();
        let mut cursor = 0usize;
        for m in 0..coarse.blocks() {
            let a0 = coarse.offsets[m];
            let a1 = coarse.offsets[m + 1];
            while cursor < fine.blocks() && fine.offsets[cursor] < a1 {
                let b0 = fine.offsets[cursor];
                let b1 = fine.offsets[cursor + 1];
                if b0 < a0 || b1 > a1 {
                    return Err(BlockError::OffsetContainment {
                        message: format!(
                            "fine block {} spans {}..{}, outside coarse block {} spanning {}..{}",
                            cursor, b0, b1, m, a0, a1
                        ),
                    });
                }
                out.data[m].add_assign_at(b0 - a0, b0 - a0, fine.block(cursor))?;
                cursor += 1;
            }
        }
        if cursor != fine.blocks() {
            return Err(BlockError::OffsetContainment {
                message: format!(
                    "merge covered {} of {} fine blocks",
                    cursor,
                    fine.blocks()
                ),
            });
        }
        Ok(out)
    }

    /// In-place merge with `other`; the operand with fewer blocks supplies
    /// the (coarse) output structure.
    pub fn try_add_assign(&mut self, other: &Self) -> Result<(), BlockError> {
        let merged = if self.blocks() <= other.blocks() {
            Self::merge(self, other)?
        } else {
            Self::merge(other, self)?
        };
        *self = merged;
        Ok(())
    }

    /// Convert to a single compressed-row sparse matrix.
    ///
    /// Every position inside a block is stored, zeros included, matching
    /// what checkpoint serialization expects.
    pub fn to_sparse(&self) -> CsrMatrix<T> {
        let mut row_ptr = Vec::with_capacity(self.rank + 1);
        let mut col_ind = Vec::new();
        let mut values = Vec::new();
        row_ptr.push(0);
        for m in 0..self.blocks() {
            let start = self.offsets[m];
            let dim = self.block_dim(m);
            for i in 0..dim {
                for j in 0..dim {
                    col_ind.push(start + j);
                    values.push(self.data[m].get(i, j));
                }
                row_ptr.push(col_ind.len());
            }
        }
        CsrMatrix::from_parts(self.rank, self.rank, row_ptr, col_ind, values)
    }

    /// Check all blocks for unitarity within `tol`.
    pub fn is_unitary(&self, tol: f64) -> bool {
        self.data.iter().all(|b| b.is_unitary(tol))
    }
}

impl<T: Scalar> std::fmt::Display for BlockDiagonalMatrix<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for m in 0..self.blocks() {
            writeln!(f, "block number {} has rank {}", m, self.block_dim(m))?;
            write!(f, "{}", self.data[m])?;
        }
        Ok(())
    }
}
