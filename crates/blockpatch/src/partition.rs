//! Patch partitioning of a global sparse matrix.
//!
//! `PatchedMatrix::partition` re-buckets every nonzero of a compressed-row
//! source matrix into a 2D grid of per-(row-patch, col-patch) cells, each
//! stored dense or sparse depending on its fill ratio. The algorithm is the
//! classic two-pass count-then-fill: the first pass over the nonzeros sizes
//! each cell (per-local-row counters feeding a prefix sum), the second pass
//! writes the values through a cursor that preserves the row-major
//! compressed layout. The two passes share the cursor state, so the
//! partitioner is strictly sequential by design.

use log::debug;

use crate::basis::{PatchSet, Side};
use crate::cell::{is_dense_fill, BlockCell};
use crate::csr::CsrMatrix;
use crate::dense::DenseMatrix;
use crate::scalar::Scalar;

/// Marker for source rows/cols not covered by any requested patch. Entries
/// mapping to it are filtered out, which is intentional, not a defect.
const INVALID_PATCH: usize = usize::MAX;

/// In-flight storage for one cell between the allocation and fill passes.
enum CellSlot<T: Scalar> {
    Dense(DenseMatrix<T>),
    Sparse {
        rows: usize,
        cols: usize,
        row_ptr: Vec<usize>,
        /// Next free entry per local row; starts as `row_ptr[..rows]` and
        /// must end the fill pass equal to `row_ptr[1..]`.
        cursor: Vec<usize>,
        col_ind: Vec<usize>,
        values: Vec<T>,
    },
}

/// A block-structured matrix: a grid of dense-or-sparse cells, one per
/// (row-patch, col-patch) pair.
///
/// A cell is absent when the pair was excluded by the lower-triangle
/// restriction; all other pairs carry a cell, possibly with zero stored
/// entries. Row patches come from the new basis ordering, column patches
/// from the old one.
pub struct PatchedMatrix<T: Scalar> {
    row_patches: usize,
    col_patches: usize,
    cells: Vec<Option<BlockCell<T>>>,
}

impl<T: Scalar> PatchedMatrix<T> {
    /// Partition `source` over the patch orderings of one side.
    ///
    /// * `old` supplies the column patches, `new` the row patches.
    /// * `threshold` in `[0, 1]` is the dense/sparse fill-ratio cut; a cell
    ///   with `nnz >= threshold * rows * cols` stores a dense buffer.
    /// * `lower_only` drops every cell with `row_patch < col_patch`.
    ///
    /// Source rows/cols outside every requested patch range are skipped.
    ///
    /// # Panics
    ///
    /// Panics if a patch range exceeds the source matrix extents, or on an
    /// internal prefix-sum inconsistency.
    pub fn partition(
        source: &CsrMatrix<T>,
        old: &PatchSet,
        new: &PatchSet,
        side: Side,
        threshold: f64,
        lower_only: bool,
    ) -> Self {
        let row_patches = new.npatches(side);
        let col_patches = old.npatches(side);
        let ncells = row_patches * col_patches;
        let grid_idx = |ip: usize, jp: usize| ip + jp * row_patches;

        // Index setup: per-patch offsets/sizes and index -> patch lookups.
        let mut row_offset = vec![0usize; row_patches];
        let mut row_size = vec![0usize; row_patches];
        let mut index_to_row_patch = vec![INVALID_PATCH; source.rows()];
        for ip in 0..row_patches {
            let range = new.patch_range(side, ip);
            assert!(range.end <= source.rows(), "row patch exceeds source rows");
            row_offset[ip] = range.start;
            row_size[ip] = range.len();
            for i in range {
                index_to_row_patch[i] = ip;
            }
        }

        let mut col_offset = vec![0usize; col_patches];
        let mut col_size = vec![0usize; col_patches];
        let mut index_to_col_patch = vec![INVALID_PATCH; source.cols()];
        for jp in 0..col_patches {
            let range = old.patch_range(side, jp);
            assert!(range.end <= source.cols(), "col patch exceeds source cols");
            col_offset[jp] = range.start;
            col_size[jp] = range.len();
            for j in range {
                index_to_col_patch[j] = jp;
            }
        }

        // Count pass: per-cell totals and per-local-row counters.
        let mut row_counts: Vec<Vec<usize>> = (0..ncells)
            .map(|idx| vec![0usize; row_size[idx % row_patches]])
            .collect();
        let mut total_nz = vec![0usize; ncells];
        let mut accepted = 0usize;
        for irow in 0..source.rows() {
            let ip = index_to_row_patch[irow];
            if ip == INVALID_PATCH {
                continue;
            }
            for k in source.row_range(irow) {
                let jp = index_to_col_patch[source.col(k)];
                if jp == INVALID_PATCH {
                    continue;
                }
                if lower_only && ip < jp {
                    continue;
                }
                let idx = grid_idx(ip, jp);
                row_counts[idx][irow - row_offset[ip]] += 1;
                total_nz[idx] += 1;
                accepted += 1;
            }
        }

        // Allocation pass: classify each cell and pre-size its storage.
        // Sparse row starts come from a prefix sum over the row counters;
        // the cursor starts at the row starts and advances during the fill.
        let mut slots: Vec<Option<CellSlot<T>>> = Vec::with_capacity(ncells);
        let mut dense_cells = 0usize;
        for jp in 0..col_patches {
            for ip in 0..row_patches {
                if lower_only && ip < jp {
                    slots.push(None);
                    continue;
                }
                let idx = grid_idx(ip, jp);
                debug_assert_eq!(slots.len(), idx);
                let (rows, cols) = (row_size[ip], col_size[jp]);
                let nnz = total_nz[idx];
                debug_assert!(nnz <= rows * cols);
                if is_dense_fill(nnz, rows, cols, threshold) {
                    dense_cells += 1;
                    slots.push(Some(CellSlot::Dense(DenseMatrix::zeros(rows, cols))));
                } else {
                    let mut row_ptr = Vec::with_capacity(rows + 1);
                    row_ptr.push(0);
                    let mut acc = 0usize;
                    for &count in &row_counts[idx] {
                        acc += count;
                        row_ptr.push(acc);
                    }
                    debug_assert_eq!(acc, nnz);
                    let cursor = row_ptr[..rows].to_vec();
                    slots.push(Some(CellSlot::Sparse {
                        rows,
                        cols,
                        row_ptr,
                        cursor,
                        col_ind: vec![0; nnz],
                        values: vec![T::zero(); nnz],
                    }));
                }
            }
        }
        drop(row_counts);

        // Fill pass: identical walk, writing each accepted value at its
        // local position. Sparse slots are consumed in row-major order, so
        // each row stays column-sorted.
        for irow in 0..source.rows() {
            let ip = index_to_row_patch[irow];
            if ip == INVALID_PATCH {
                continue;
            }
            for k in source.row_range(irow) {
                let jcol = source.col(k);
                let jp = index_to_col_patch[jcol];
                if jp == INVALID_PATCH {
                    continue;
                }
                if lower_only && ip < jp {
                    continue;
                }
                let local_row = irow - row_offset[ip];
                let local_col = jcol - col_offset[jp];
                let value = source.value(k);
                match slots[grid_idx(ip, jp)]
                    .as_mut()
                    .expect("accepted entry maps to an allocated cell")
                {
                    CellSlot::Dense(m) => m.set(local_row, local_col, value),
                    CellSlot::Sparse {
                        cursor,
                        col_ind,
                        values,
                        ..
                    } => {
                        let p = cursor[local_row];
                        col_ind[p] = local_col;
                        values[p] = value;
                        cursor[local_row] += 1;
                    }
                }
            }
        }

        // Finalize: every sparse cursor must have consumed exactly the
        // entries the count pass promised.
        let cells: Vec<Option<BlockCell<T>>> = slots
            .into_iter()
            .map(|slot| {
                slot.map(|s| match s {
                    CellSlot::Dense(m) => BlockCell::Dense(m),
                    CellSlot::Sparse {
                        rows,
                        cols,
                        row_ptr,
                        cursor,
                        col_ind,
                        values,
                    } => {
                        for (i, &c) in cursor.iter().enumerate() {
                            assert_eq!(c, row_ptr[i + 1], "prefix-sum cursor misuse");
                        }
                        BlockCell::Sparse(CsrMatrix::from_parts(
                            rows, cols, row_ptr, col_ind, values,
                        ))
                    }
                })
            })
            .collect();

        debug!(
            "partitioned {}x{} sparse ({} nz) into {}x{} patches: {} dense, {} sparse cells, {} entries kept",
            source.rows(),
            source.cols(),
            source.nnz(),
            row_patches,
            col_patches,
            dense_cells,
            cells.iter().flatten().count() - dense_cells,
            accepted,
        );

        Self {
            row_patches,
            col_patches,
            cells,
        }
    }

    /// Number of row patches.
    #[inline]
    pub fn row_patches(&self) -> usize {
        self.row_patches
    }

    /// Number of column patches.
    #[inline]
    pub fn col_patches(&self) -> usize {
        self.col_patches
    }

    /// The cell at `(row_patch, col_patch)`, or `None` for an excluded pair.
    #[inline]
    pub fn cell(&self, ip: usize, jp: usize) -> Option<&BlockCell<T>> {
        assert!(ip < self.row_patches && jp < self.col_patches, "patch index out of bounds");
        self.cells[ip + jp * self.row_patches].as_ref()
    }

    /// Element access through patch coordinates: local `(i, j)` inside the
    /// cell at `(ip, jp)`. An excluded pair reads as zero.
    pub fn get(&self, ip: usize, jp: usize, i: usize, j: usize) -> T {
        match self.cell(ip, jp) {
            Some(cell) => cell.get(i, j),
            None => T::zero(),
        }
    }

    /// Iterate over present cells with their patch coordinates.
    pub fn iter_cells(&self) -> impl Iterator<Item = (usize, usize, &BlockCell<T>)> {
        (0..self.col_patches).flat_map(move |jp| {
            (0..self.row_patches).filter_map(move |ip| {
                self.cells[ip + jp * self.row_patches]
                    .as_ref()
                    .map(|c| (ip, jp, c))
            })
        })
    }
}
