//! blockpatch - block-structured matrices over symmetry-sector patches.
//!
//! This crate provides the block linear algebra underneath a
//! renormalization-group simulation: partitioning a global sparse matrix
//! into per-(row-patch, col-patch) cells stored dense or sparse by fill
//! ratio, and maintaining block-diagonal matrices with a parallel,
//! phase-canonicalized eigendecomposition.
//!
//! # Architecture
//!
//! ```text
//! CsrMatrix + PatchSet (old, new)
//!     → PatchedMatrix::partition      two-pass count-then-fill
//!     → grid of BlockCell             dense or sparse per cell
//!
//! BlockDiagonalMatrix
//!     → merge / set_block / sum_block
//!     → diagonalize                   one task per block, ordered gather
//!     → to_sparse                     for checkpoint serialization
//! ```
//!
//! # Example
//!
//! ```
//! use blockpatch::{diagonalize, BlockDiagonalMatrix, DiagMode};
//!
//! let mut m: BlockDiagonalMatrix<f64> = BlockDiagonalMatrix::identity(4);
//! let eigs = diagonalize(&mut m, DiagMode::EigenvaluesOnly, 1).unwrap();
//! assert_eq!(eigs, vec![1.0; 4]);
//! ```

pub mod basis;
pub mod blockdiag;
pub mod cell;
pub mod csr;
pub mod dense;
pub mod diag;
pub mod error;
pub mod partition;
pub mod scalar;

pub use basis::{PatchSet, SectorBasis, Side, SuperBasis};
pub use blockdiag::BlockDiagonalMatrix;
pub use cell::{is_dense_fill, BlockCell};
pub use csr::CsrMatrix;
pub use dense::DenseMatrix;
pub use diag::{canonicalize_phase, diagonalize, DiagMode, PHASE_TOLERANCE};
pub use error::BlockError;
pub use partition::PatchedMatrix;
pub use scalar::{c64, Scalar};
