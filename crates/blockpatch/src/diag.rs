//! Parallel diagonalization of block-diagonal matrices.
//!
//! One independent task per diagonal block: each task hands its block to
//! faer's self-adjoint eigensolver, canonicalizes the eigenvector phases,
//! and reports the block's eigenvalues. A gather step concatenates the
//! per-block eigenvalues in block order, so the result is deterministic
//! regardless of which worker finishes first.
//!
//! The worker degree is an explicit parameter. `workers <= 1` runs strictly
//! sequentially without building a pool, which is the configuration to use
//! when the underlying eigensolver path is not reentrant.

use faer::linalg::solvers::EvdError;
use log::debug;
use rayon::prelude::*;

use crate::blockdiag::BlockDiagonalMatrix;
use crate::dense::DenseMatrix;
use crate::error::BlockError;
use crate::scalar::Scalar;

/// Coefficients at or below this magnitude do not participate in picking
/// the canonical eigenvector sign.
pub const PHASE_TOLERANCE: f64 = 1e-6;

/// Whether a diagonalization also keeps eigenvectors.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DiagMode {
    /// Eigenvalues only; blocks are left untouched.
    EigenvaluesOnly,
    /// Eigenvalues and eigenvectors; each block is replaced in place by its
    /// eigenvector matrix (eigenvectors as columns).
    Full,
}

impl TryFrom<char> for DiagMode {
    type Error = BlockError;

    /// The conventional dense-eigensolver mode characters: `'N'` for values
    /// only, `'V'` for values and vectors.
    fn try_from(mode: char) -> Result<Self, BlockError> {
        match mode {
            'N' | 'n' => Ok(DiagMode::EigenvaluesOnly),
            'V' | 'v' => Ok(DiagMode::Full),
            _ => Err(BlockError::InvalidMode { mode }),
        }
    }
}

/// Remove the arbitrary sign/phase ambiguity of one eigenvector.
///
/// The first coefficient whose magnitude exceeds [`PHASE_TOLERANCE`] fixes
/// the sign: the whole vector is scaled so that coefficient's real part is
/// positive. A vector with no significant coefficient is left as is.
/// Applying this twice is a no-op.
pub fn canonicalize_phase<T: Scalar>(v: &mut [T]) {
    let mut sign = 1.0;
    for x in v.iter() {
        if x.modulus() > PHASE_TOLERANCE {
            sign = if x.re() > 0.0 { 1.0 } else { -1.0 };
            break;
        }
    }
    if sign < 0.0 {
        let s = T::from_f64(sign);
        for x in v.iter_mut() {
            *x *= s;
        }
    }
}

/// Diagonalize one block, returning its eigenvalues in nondecreasing order
/// and, in [`DiagMode::Full`], replacing the block with its
/// phase-canonicalized eigenvector matrix.
fn diagonalize_block<T: Scalar>(
    block: &mut DenseMatrix<T>,
    mode: DiagMode,
) -> Result<Vec<f64>, BlockError> {
    let n = block.rows();
    if n == 0 {
        // Degenerate block: nothing to solve.
        return Ok(Vec::new());
    }

    let solver_err = |e: EvdError| BlockError::EigenError {
        message: format!("self-adjoint eigendecomposition failed: {:?}", e),
    };
    let mat = block.as_faer_mat();

    if mode == DiagMode::EigenvaluesOnly {
        // Values-only solve; no eigenvector accumulation.
        return mat
            .self_adjoint_eigenvalues(faer::Side::Lower)
            .map_err(solver_err);
    }

    let evd = mat.self_adjoint_eigen(faer::Side::Lower).map_err(solver_err)?;

    let s = evd.S();
    let mut eigs = Vec::with_capacity(n);
    for i in 0..n {
        eigs.push(s[i].re());
    }

    let u = evd.U();
    let mut data: Vec<T> = Vec::with_capacity(n * n);
    for j in 0..n {
        for i in 0..n {
            data.push(u[(i, j)]);
        }
    }
    let mut vectors = DenseMatrix::from_vec(data, n, n)?;
    for j in 0..n {
        canonicalize_phase(vectors.column_mut(j));
    }
    *block = vectors;

    Ok(eigs)
}

/// Diagonalize every block of `matrix`, one task per block.
///
/// Returns the full eigenvalue sequence of length `matrix.rank()`, ordered
/// by block index with each block's eigenvalues at its offset range. In
/// [`DiagMode::Full`], every block is replaced in place by its eigenvector
/// matrix.
///
/// `workers >= 2` dispatches the blocks on a dedicated pool of exactly that
/// many threads; `workers <= 1` runs sequentially. A solver failure on any
/// block aborts the whole call; no partial result is produced.
///
/// # Example
///
/// ```
/// use blockpatch::{diagonalize, BlockDiagonalMatrix, DiagMode};
///
/// let mut m: BlockDiagonalMatrix<f64> = BlockDiagonalMatrix::identity(4);
/// let eigs = diagonalize(&mut m, DiagMode::EigenvaluesOnly, 1).unwrap();
/// assert_eq!(eigs, vec![1.0; 4]);
/// ```
pub fn diagonalize<T: Scalar>(
    matrix: &mut BlockDiagonalMatrix<T>,
    mode: DiagMode,
    workers: usize,
) -> Result<Vec<f64>, BlockError> {
    debug!(
        "diagonalizing {} blocks (rank {}) with {} workers, mode {:?}",
        matrix.blocks(),
        matrix.rank(),
        workers,
        mode
    );

    let per_block: Vec<Vec<f64>> = if workers <= 1 {
        matrix
            .blocks_mut()
            .iter_mut()
            .map(|b| diagonalize_block(b, mode))
            .collect::<Result<_, _>>()?
    } else {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .build()
            .map_err(|e| BlockError::ThreadPool {
                message: e.to_string(),
            })?;
        pool.install(|| {
            matrix
                .blocks_mut()
                .par_iter_mut()
                .map(|b| diagonalize_block(b, mode))
                .collect::<Result<_, _>>()
        })?
    };

    // Gather: concatenate per-block eigenvalues at their offset ranges,
    // in block index order.
    let mut eigs = Vec::with_capacity(matrix.rank());
    for (m, local) in per_block.iter().enumerate() {
        debug_assert_eq!(local.len(), matrix.offset(m + 1) - matrix.offset(m));
        debug_assert_eq!(eigs.len(), matrix.offset(m));
        eigs.extend_from_slice(local);
    }
    debug_assert_eq!(eigs.len(), matrix.rank());
    Ok(eigs)
}
