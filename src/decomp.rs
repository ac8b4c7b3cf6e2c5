//! Regular 3D mesh decomposition
//!
//! Maps an MPI rank onto a 3D processor grid and carves the global element
//! grid into per-rank local blocks. Rank order is i-fastest:
//! `rank = pi + pj*px + pk*px*py`, matching the vertical-neighbor
//! arithmetic the hydrostatic relay depends on.

use crate::error::{Error, Result};

/// Static description of the processor grid and global element grid
#[derive(Debug, Clone)]
pub struct Decomposition {
    /// Processor counts per axis: `[px, py, pz]`
    pub proc_counts: [usize; 3],
    /// Global element counts per axis
    pub element_counts: [usize; 3],
    /// Whether each axis is split across processes
    pub partitioned: [bool; 3],
}

impl Decomposition {
    /// Build a decomposition, requiring element counts to divide evenly
    /// across the processor layers of each axis.
    pub fn new(proc_counts: [usize; 3], element_counts: [usize; 3]) -> Result<Self> {
        for axis in 0..3 {
            if proc_counts[axis] == 0 {
                return Err(Error::Decomposition(format!(
                    "processor count on axis {} is zero",
                    axis
                )));
            }
            if element_counts[axis] % proc_counts[axis] != 0 {
                return Err(Error::Decomposition(format!(
                    "{} elements on axis {} do not divide across {} processor layers",
                    element_counts[axis], axis, proc_counts[axis]
                )));
            }
        }
        let partitioned = [proc_counts[0] > 1, proc_counts[1] > 1, proc_counts[2] > 1];
        Ok(Self { proc_counts, element_counts, partitioned })
    }

    pub fn num_ranks(&self) -> usize {
        self.proc_counts[0] * self.proc_counts[1] * self.proc_counts[2]
    }

    /// Decompose a rank into its 3D processor-grid coordinate
    pub fn rank_partition(&self, rank: usize) -> [usize; 3] {
        let [px, py, _] = self.proc_counts;
        let pk = rank / (px * py);
        let pj = (rank - pk * px * py) / px;
        let pi = rank - pk * px * py - pj * px;
        [pi, pj, pk]
    }

    /// Rank from a 3D processor-grid coordinate
    pub fn rank_of(&self, partition: [usize; 3]) -> usize {
        let [px, py, _] = self.proc_counts;
        partition[0] + partition[1] * px + partition[2] * px * py
    }

    /// Local element extents of a rank's block
    pub fn local_extents(&self, _rank: usize) -> [usize; 3] {
        [
            self.element_counts[0] / self.proc_counts[0],
            self.element_counts[1] / self.proc_counts[1],
            self.element_counts[2] / self.proc_counts[2],
        ]
    }

    /// Rank of the vertical neighbor above, if the vertical axis is
    /// partitioned and this rank is not on the top layer
    pub fn rank_above(&self, rank: usize) -> Option<usize> {
        let p = self.rank_partition(rank);
        if self.partitioned[1] && p[1] < self.proc_counts[1] - 1 {
            Some(self.rank_of([p[0], p[1] + 1, p[2]]))
        } else {
            None
        }
    }

    /// Rank of the vertical neighbor below, if any
    pub fn rank_below(&self, rank: usize) -> Option<usize> {
        let p = self.rank_partition(rank);
        if self.partitioned[1] && p[1] > 0 {
            Some(self.rank_of([p[0], p[1] - 1, p[2]]))
        } else {
            None
        }
    }

    /// Whether the rank sits on the bottom processor layer
    pub fn is_bottom_layer(&self, rank: usize) -> bool {
        self.rank_partition(rank)[1] == 0
    }

    /// Map a global element (i, j, k) to this rank's local dense index, or
    /// `None` when the element belongs to another rank.
    pub fn element_global_to_local(&self, rank: usize, global: [usize; 3]) -> Option<usize> {
        let part = self.rank_partition(rank);
        let ext = self.local_extents(rank);
        let mut local = [0usize; 3];
        for axis in 0..3 {
            let start = part[axis] * ext[axis];
            if global[axis] < start || global[axis] >= start + ext[axis] {
                return None;
            }
            local[axis] = global[axis] - start;
        }
        Some(local[0] + local[1] * ext[0] + local[2] * ext[0] * ext[1])
    }
}
