//! Block-diagonal merge and diagonalization, end to end: build a matrix
//! from merged pieces, diagonalize it, and verify the eigendecomposition
//! reconstructs each block.

use approx::assert_relative_eq;
use blockpatch::{diagonalize, BlockDiagonalMatrix, DenseMatrix, DiagMode};

fn symmetric_block(n: usize, scale: f64) -> DenseMatrix<f64> {
    let mut m = DenseMatrix::zeros(n, n);
    for i in 0..n {
        for j in 0..n {
            let v = scale * ((i * n + j) as f64 + 1.0);
            m.set(i, j, v);
            m.set(j, i, v);
        }
    }
    m
}

#[test]
fn merge_then_diagonalize_reconstructs_blocks() {
    // Coarse structure: blocks of dimension 3 and 2.
    let mut matrix: BlockDiagonalMatrix<f64> = BlockDiagonalMatrix::new(vec![0, 3, 5]).unwrap();
    matrix.set_block(0, symmetric_block(3, 0.5)).unwrap();
    matrix.set_block(1, symmetric_block(2, 2.0)).unwrap();

    // A finer correction with unit blocks merges in on top.
    let correction: BlockDiagonalMatrix<f64> = BlockDiagonalMatrix::scalar_diagonal(5, 0.25);
    matrix.try_add_assign(&correction).unwrap();
    let original = matrix.clone();

    let eigs = diagonalize(&mut matrix, DiagMode::Full, 2).unwrap();
    assert_eq!(eigs.len(), 5);
    assert!(matrix.is_unitary(1e-10));

    // Per block: A = V diag(lambda) V^T.
    for m in 0..original.blocks() {
        let a = original.block(m);
        let v = matrix.block(m);
        let n = a.rows();
        let local = &eigs[original.offset(m)..original.offset(m + 1)];
        for i in 0..n {
            for j in 0..n {
                let mut sum = 0.0;
                for k in 0..n {
                    sum += v.get(i, k) * local[k] * v.get(j, k);
                }
                assert_relative_eq!(sum, a.get(i, j), epsilon = 1e-9);
            }
        }
    }

    // Eigenvalues land at the offset ranges in block order; within a block
    // they are nondecreasing.
    for m in 0..original.blocks() {
        let local = &eigs[original.offset(m)..original.offset(m + 1)];
        for w in local.windows(2) {
            assert!(w[0] <= w[1]);
        }
    }
}

#[test]
fn to_sparse_after_merge_matches_block_entries() {
    let mut matrix: BlockDiagonalMatrix<f64> = BlockDiagonalMatrix::new(vec![0, 2, 5]).unwrap();
    matrix.set_block(0, symmetric_block(2, 1.0)).unwrap();
    matrix.set_block(1, symmetric_block(3, -1.0)).unwrap();

    let sparse = matrix.to_sparse();
    assert_eq!(sparse.rows(), 5);
    assert_eq!(sparse.cols(), 5);
    for i in 0..5 {
        for j in 0..5 {
            let expected = if i < 2 && j < 2 {
                matrix.block(0).get(i, j)
            } else if i >= 2 && j >= 2 {
                matrix.block(1).get(i - 2, j - 2)
            } else {
                0.0
            };
            assert_eq!(sparse.get(i, j), expected, "at ({}, {})", i, j);
        }
    }
}

#[test]
fn repeated_diagonalization_is_deterministic() {
    let build = || {
        let mut m: BlockDiagonalMatrix<f64> = BlockDiagonalMatrix::new(vec![0, 4, 6]).unwrap();
        m.set_block(0, symmetric_block(4, 0.3)).unwrap();
        m.set_block(1, symmetric_block(2, -0.7)).unwrap();
        m
    };

    for workers in [1usize, 2, 4] {
        let mut a = build();
        let mut b = build();
        let eigs_a = diagonalize(&mut a, DiagMode::Full, workers).unwrap();
        let eigs_b = diagonalize(&mut b, DiagMode::Full, workers).unwrap();
        assert_eq!(eigs_a, eigs_b, "workers = {}", workers);
        assert_eq!(a, b, "workers = {}", workers);
    }
}
