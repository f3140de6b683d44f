//! Error types for blockpatch.

use thiserror::Error;

/// Errors that can occur in block-matrix operations.
///
/// Structural and precondition violations (broken offset containment,
/// dimension mismatches) surface here; internal-consistency failures such as
/// a misused prefix-sum cursor are caller contract violations and are
/// guarded by assertions instead.
#[derive(Debug, Error)]
pub enum BlockError {
    /// Data length does not match the declared shape.
    #[error("shape mismatch: expected {expected} elements, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    /// A block's dimensions do not match the slot it is written into.
    #[error(
        "dimension mismatch: expected {expected_rows}x{expected_cols}, got {rows}x{cols}"
    )]
    DimensionMismatch {
        expected_rows: usize,
        expected_cols: usize,
        rows: usize,
        cols: usize,
    },

    /// Two block-diagonal matrices with different total dimension.
    #[error("rank mismatch: {left} vs {right}")]
    RankMismatch { left: usize, right: usize },

    /// Block index outside the block sequence.
    #[error("block index {index} out of bounds for {blocks} blocks")]
    BlockIndexOutOfBounds { index: usize, blocks: usize },

    /// Offset table is not strictly increasing or does not start at zero.
    #[error("invalid offset table: {message}")]
    InvalidOffsets { message: String },

    /// Merge precondition broken: one offset table does not refine the other.
    #[error("offset containment violated during merge: {message}")]
    OffsetContainment { message: String },

    /// The dense eigensolver failed to converge. Fatal for the call.
    #[error("eigendecomposition failed: {message}")]
    EigenError { message: String },

    /// Unknown diagonalization mode character.
    #[error("invalid diagonalization mode {mode:?}, expected 'N' or 'V'")]
    InvalidMode { mode: char },

    /// Worker pool construction failed.
    #[error("thread pool error: {message}")]
    ThreadPool { message: String },
}
