//! Partition round-trip: the cells of a patched matrix reassemble the
//! source restricted to the covered index set, at every threshold.

use blockpatch::{CsrMatrix, PatchSet, PatchedMatrix, SectorBasis, Side, SuperBasis};

/// Deterministic pseudo-random sparse matrix (row-major dense build).
fn sample_matrix(n: usize, seed: u64) -> CsrMatrix<f64> {
    let mut state = seed;
    let mut next = move || {
        // xorshift64
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        state
    };
    let entries: Vec<f64> = (0..n * n)
        .map(|_| {
            let r = next();
            if r % 3 == 0 {
                ((r % 17) as f64) - 8.0
            } else {
                0.0
            }
        })
        .collect();
    CsrMatrix::from_dense(n, n, &entries)
}

fn patch_set(boundaries: Vec<usize>, groups: Vec<usize>) -> PatchSet {
    let basis = SectorBasis::new(boundaries).unwrap();
    PatchSet::new(SuperBasis::new(basis.clone(), basis), groups.clone(), groups).unwrap()
}

fn reassemble(m: &PatchedMatrix<f64>, patches: &PatchSet, side: Side, n: usize) -> Vec<f64> {
    let mut full = vec![0.0; n * n];
    for (ip, jp, cell) in m.iter_cells() {
        let rows = patches.patch_range(side, ip);
        let cols = patches.patch_range(side, jp);
        assert_eq!(cell.rows(), rows.len());
        assert_eq!(cell.cols(), cols.len());
        for (li, gi) in rows.clone().enumerate() {
            for (lj, gj) in cols.clone().enumerate() {
                full[gi * n + gj] = cell.get(li, lj);
            }
        }
    }
    full
}

#[test]
fn roundtrip_full_cover_all_thresholds() {
    let n = 12;
    let source = sample_matrix(n, 0x5eed);
    let patches = patch_set(vec![0, 3, 7, 12], vec![0, 1, 2]);

    for &threshold in &[0.0, 0.25, 0.5, 1.0] {
        let m = PatchedMatrix::partition(&source, &patches, &patches, Side::Left, threshold, false);
        let full = reassemble(&m, &patches, Side::Left, n);
        for i in 0..n {
            for j in 0..n {
                assert_eq!(
                    full[i * n + j],
                    source.get(i, j),
                    "threshold {} at ({}, {})",
                    threshold,
                    i,
                    j
                );
            }
        }
    }
}

#[test]
fn roundtrip_right_side_with_distinct_bases() {
    let n = 12;
    let source = sample_matrix(n, 0xfeed);
    // The two sides partition differently; only the right table covers the
    // full source extents, so a side mix-up cannot go unnoticed.
    let left = SectorBasis::new(vec![0, 5, 9]).unwrap();
    let right = SectorBasis::new(vec![0, 4, 8, 12]).unwrap();
    let patches =
        PatchSet::new(SuperBasis::new(left, right), vec![0, 1], vec![0, 1, 2]).unwrap();

    let m = PatchedMatrix::partition(&source, &patches, &patches, Side::Right, 0.5, false);
    assert_eq!(m.row_patches(), 3);
    assert_eq!(m.col_patches(), 3);
    let full = reassemble(&m, &patches, Side::Right, n);
    for i in 0..n {
        for j in 0..n {
            assert_eq!(full[i * n + j], source.get(i, j), "at ({}, {})", i, j);
        }
    }
}

#[test]
fn roundtrip_partial_cover_restricts_to_patches() {
    let n = 12;
    let source = sample_matrix(n, 0xbeef);
    // Skip the middle sector: indices 3..7 are uncovered.
    let patches = patch_set(vec![0, 3, 7, 12], vec![0, 2]);

    let m = PatchedMatrix::partition(&source, &patches, &patches, Side::Left, 0.5, false);
    let full = reassemble(&m, &patches, Side::Left, n);
    let covered = |i: usize| i < 3 || i >= 7;
    for i in 0..n {
        for j in 0..n {
            let expected = if covered(i) && covered(j) {
                source.get(i, j)
            } else {
                0.0
            };
            assert_eq!(full[i * n + j], expected, "at ({}, {})", i, j);
        }
    }
}

#[test]
fn roundtrip_lower_triangle_of_patch_pairs() {
    let n = 12;
    let source = sample_matrix(n, 0xabcd);
    let patches = patch_set(vec![0, 3, 7, 12], vec![0, 1, 2]);

    let m = PatchedMatrix::partition(&source, &patches, &patches, Side::Left, 0.5, true);
    for ip in 0..3 {
        for jp in 0..3 {
            assert_eq!(m.cell(ip, jp).is_some(), ip >= jp, "cell ({}, {})", ip, jp);
        }
    }
    // Present cells still hold their source entries exactly.
    let full = reassemble(&m, &patches, Side::Left, n);
    let patch_of = |i: usize| if i < 3 { 0 } else if i < 7 { 1 } else { 2 };
    for i in 0..n {
        for j in 0..n {
            let expected = if patch_of(i) >= patch_of(j) {
                source.get(i, j)
            } else {
                0.0
            };
            assert_eq!(full[i * n + j], expected, "at ({}, {})", i, j);
        }
    }
}

#[test]
fn sparse_cells_store_exactly_the_counted_entries() {
    let n = 12;
    let source = sample_matrix(n, 0x1234);
    let patches = patch_set(vec![0, 3, 7, 12], vec![0, 1, 2]);

    // Force everything sparse, then total stored entries must equal the
    // source nonzero count (full cover, no triangle restriction).
    let m = PatchedMatrix::partition(&source, &patches, &patches, Side::Left, 1.1, false);
    let total: usize = m.iter_cells().map(|(_, _, c)| c.nnz()).sum();
    assert_eq!(total, source.nnz());
    for (_, _, cell) in m.iter_cells() {
        let sparse = cell.as_sparse().expect("all cells sparse at threshold > 1");
        sparse.check_validity();
    }
}
