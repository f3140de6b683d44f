//! Symmetry-sector bases and patch orderings.
//!
//! A basis partitions a contiguous index range into symmetry sectors; a
//! patch is the `[start, end)` range of one sector. The partitioner works
//! with two patch orderings (the old basis and the new basis), each of which
//! selects an ordered subset of the sector groups on one side (left or
//! right subsystem).

use std::ops::Range;

use crate::error::BlockError;

/// Which subsystem a patch ordering refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

/// Partition table of one basis: sector `g` spans
/// `boundaries[g]..boundaries[g + 1]`.
#[derive(Clone, Debug, PartialEq)]
pub struct SectorBasis {
    boundaries: Vec<usize>,
}

impl SectorBasis {
    /// Create a partition table from its boundary list.
    ///
    /// `boundaries` must be nondecreasing and contain at least one entry
    /// (the basis size alone describes zero sectors).
    pub fn new(boundaries: Vec<usize>) -> Result<Self, BlockError> {
        if boundaries.is_empty() {
            return Err(BlockError::InvalidOffsets {
                message: "partition table must not be empty".into(),
            });
        }
        for w in boundaries.windows(2) {
            if w[0] > w[1] {
                return Err(BlockError::InvalidOffsets {
                    message: format!("partition boundaries decrease: {} > {}", w[0], w[1]),
                });
            }
        }
        Ok(Self { boundaries })
    }

    /// Start index of sector `g` (also accepts `g == sectors()` for the
    /// one-past-the-end boundary).
    #[inline]
    pub fn partition(&self, g: usize) -> usize {
        self.boundaries[g]
    }

    /// The `[start, end)` index range of sector `g`.
    #[inline]
    pub fn sector_range(&self, g: usize) -> Range<usize> {
        self.boundaries[g]..self.boundaries[g + 1]
    }

    /// Number of sectors.
    #[inline]
    pub fn sectors(&self) -> usize {
        self.boundaries.len() - 1
    }

    /// Total basis size.
    #[inline]
    pub fn size(&self) -> usize {
        *self.boundaries.last().unwrap()
    }
}

/// The left and right subsystem bases of one superblock step.
#[derive(Clone, Debug, PartialEq)]
pub struct SuperBasis {
    pub left: SectorBasis,
    pub right: SectorBasis,
}

impl SuperBasis {
    pub fn new(left: SectorBasis, right: SectorBasis) -> Self {
        Self { left, right }
    }

    /// The basis for one side.
    #[inline]
    pub fn side(&self, side: Side) -> &SectorBasis {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }
}

/// An ordered selection of sector groups per side, over one `SuperBasis`.
///
/// The partitioner consumes two of these (old and new); the position of a
/// group in the ordering is its patch index.
///
/// # Example
///
/// ```
/// use blockpatch::{PatchSet, SectorBasis, Side, SuperBasis};
///
/// let basis = SuperBasis::new(
///     SectorBasis::new(vec![0, 2, 4]).unwrap(),
///     SectorBasis::new(vec![0, 1, 4]).unwrap(),
/// );
/// let patches = PatchSet::new(basis, vec![0, 1], vec![1]).unwrap();
/// assert_eq!(patches.npatches(Side::Left), 2);
/// assert_eq!(patches.patch_range(Side::Right, 0), 1..4);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct PatchSet {
    basis: SuperBasis,
    left_groups: Vec<usize>,
    right_groups: Vec<usize>,
}

impl PatchSet {
    /// Create a patch set; every group id must name a sector of its side's
    /// basis.
    pub fn new(
        basis: SuperBasis,
        left_groups: Vec<usize>,
        right_groups: Vec<usize>,
    ) -> Result<Self, BlockError> {
        for (&g, sectors) in left_groups
            .iter()
            .map(|g| (g, basis.left.sectors()))
            .chain(right_groups.iter().map(|g| (g, basis.right.sectors())))
        {
            if g >= sectors {
                return Err(BlockError::BlockIndexOutOfBounds {
                    index: g,
                    blocks: sectors,
                });
            }
        }
        Ok(Self {
            basis,
            left_groups,
            right_groups,
        })
    }

    /// The sector group ids selected on `side`, in patch order.
    #[inline]
    pub fn groups(&self, side: Side) -> &[usize] {
        match side {
            Side::Left => &self.left_groups,
            Side::Right => &self.right_groups,
        }
    }

    /// The partition table backing `side`.
    #[inline]
    pub fn basis(&self, side: Side) -> &SectorBasis {
        self.basis.side(side)
    }

    /// Number of patches on `side`.
    #[inline]
    pub fn npatches(&self, side: Side) -> usize {
        self.groups(side).len()
    }

    /// The index range of patch `p` on `side`.
    #[inline]
    pub fn patch_range(&self, side: Side, p: usize) -> Range<usize> {
        self.basis(side).sector_range(self.groups(side)[p])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sector_basis_ranges() {
        let b = SectorBasis::new(vec![0, 2, 5, 9]).unwrap();
        assert_eq!(b.sectors(), 3);
        assert_eq!(b.size(), 9);
        assert_eq!(b.sector_range(0), 0..2);
        assert_eq!(b.sector_range(2), 5..9);
        assert_eq!(b.partition(1), 2);
    }

    #[test]
    fn test_sector_basis_rejects_decreasing() {
        let r = SectorBasis::new(vec![0, 3, 2]);
        assert!(matches!(r, Err(BlockError::InvalidOffsets { .. })));
    }

    #[test]
    fn test_sector_basis_rejects_empty() {
        let r = SectorBasis::new(vec![]);
        assert!(matches!(r, Err(BlockError::InvalidOffsets { .. })));
    }

    #[test]
    fn test_patch_set_lookup() {
        let basis = SuperBasis::new(
            SectorBasis::new(vec![0, 2, 4, 6]).unwrap(),
            SectorBasis::new(vec![0, 3, 6]).unwrap(),
        );
        // Left patches reorder the sectors
        let p = PatchSet::new(basis, vec![2, 0], vec![0, 1]).unwrap();
        assert_eq!(p.npatches(Side::Left), 2);
        assert_eq!(p.patch_range(Side::Left, 0), 4..6);
        assert_eq!(p.patch_range(Side::Left, 1), 0..2);
        assert_eq!(p.patch_range(Side::Right, 1), 3..6);
        assert_eq!(p.groups(Side::Left), &[2, 0]);
    }

    #[test]
    fn test_patch_set_rejects_bad_group() {
        let basis = SuperBasis::new(
            SectorBasis::new(vec![0, 2]).unwrap(),
            SectorBasis::new(vec![0, 2]).unwrap(),
        );
        let r = PatchSet::new(basis, vec![1], vec![0]);
        assert!(matches!(r, Err(BlockError::BlockIndexOutOfBounds { .. })));
    }
}
