//! Process-local structured mesh block
//!
//! Each rank owns a dense block of hexahedral elements with a structured
//! `(elx+1) × (ely+1) × (elz+1)` node grid. Element and node indices are
//! process-local; the decomposition layer maps them to global coordinates.

use nalgebra::Point3;

use super::element::Element;

/// Extents and state of one rank's element block
#[derive(Debug, Clone)]
pub struct LocalBlock {
    /// Local element counts per axis: `[elx, ely, elz]`
    pub extents: [usize; 3],
    /// Node coordinates, indexed `i + j*(elx+1) + k*(elx+1)*(ely+1)`
    pub nodes: Vec<Point3<f64>>,
    /// Elements, indexed `i + j*elx + k*elx*ely`
    pub elements: Vec<Element>,
}

impl LocalBlock {
    /// Build a regular block: `origin` is the minimum corner, `spacing` the
    /// node spacing per axis. All elements get material index `material`.
    pub fn regular(extents: [usize; 3], origin: Point3<f64>, spacing: [f64; 3], material: usize) -> Self {
        let [elx, ely, elz] = extents;
        let (nx, ny, nz) = (elx + 1, ely + 1, elz + 1);
        let mut nodes = Vec::with_capacity(nx * ny * nz);
        for k in 0..nz {
            for j in 0..ny {
                for i in 0..nx {
                    nodes.push(Point3::new(
                        origin.x + i as f64 * spacing[0],
                        origin.y + j as f64 * spacing[1],
                        origin.z + k as f64 * spacing[2],
                    ));
                }
            }
        }
        let elements = (0..elx * ely * elz).map(|_| Element::new(material)).collect();
        Self { extents, nodes, elements }
    }

    pub fn num_elements(&self) -> usize {
        self.extents[0] * self.extents[1] * self.extents[2]
    }

    pub fn num_nodes(&self) -> usize {
        (self.extents[0] + 1) * (self.extents[1] + 1) * (self.extents[2] + 1)
    }

    /// Local element index from local (i, j, k)
    pub fn element_index(&self, i: usize, j: usize, k: usize) -> usize {
        let [elx, ely, _] = self.extents;
        i + j * elx + k * elx * ely
    }

    /// Local node index from local (i, j, k)
    pub fn node_index(&self, i: usize, j: usize, k: usize) -> usize {
        let nx = self.extents[0] + 1;
        let ny = self.extents[1] + 1;
        i + j * nx + k * nx * ny
    }

    /// Coordinate of corner `c` (0..8) of element (i, j, k)
    ///
    /// Corner bits select the high node on each axis: bit 0 = +x,
    /// bit 1 = +y, bit 2 = +z. The four vertical edges are therefore the
    /// corner pairs (0,2), (1,3), (4,6), (5,7).
    pub fn corner(&self, i: usize, j: usize, k: usize, c: usize) -> &Point3<f64> {
        debug_assert!(c < 8);
        let ni = i + (c & 1);
        let nj = j + ((c >> 1) & 1);
        let nk = k + ((c >> 2) & 1);
        &self.nodes[self.node_index(ni, nj, nk)]
    }

    pub fn element(&self, i: usize, j: usize, k: usize) -> &Element {
        &self.elements[self.element_index(i, j, k)]
    }

    pub fn element_mut(&mut self, i: usize, j: usize, k: usize) -> &mut Element {
        let idx = self.element_index(i, j, k);
        &mut self.elements[idx]
    }

    /// Set all elements in a horizontal slab `j0..j1` to a material index
    pub fn assign_material_layer(&mut self, j0: usize, j1: usize, material: usize) {
        let [elx, ely, elz] = self.extents;
        for k in 0..elz {
            for j in j0..j1.min(ely) {
                for i in 0..elx {
                    let idx = self.element_index(i, j, k);
                    self.elements[idx].material = material;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn regular_block_counts() {
        let block = LocalBlock::regular([2, 3, 4], Point3::origin(), [1.0, 1.0, 1.0], 0);
        assert_eq!(block.num_elements(), 24);
        assert_eq!(block.num_nodes(), 3 * 4 * 5);
        assert_eq!(block.elements.len(), 24);
        assert_eq!(block.nodes.len(), 60);
    }

    #[test]
    fn corner_convention_vertical_pairs() {
        let block = LocalBlock::regular([1, 1, 1], Point3::origin(), [2.0, 3.0, 4.0], 0);
        // Corner pairs (c, c|2) differ only in y
        for c in [0usize, 1, 4, 5] {
            let lo = block.corner(0, 0, 0, c);
            let hi = block.corner(0, 0, 0, c | 2);
            assert_eq!(lo.x, hi.x);
            assert_eq!(lo.z, hi.z);
            assert_eq!(hi.y - lo.y, 3.0);
        }
    }

    #[test]
    fn element_indexing_is_i_fastest() {
        let block = LocalBlock::regular([3, 2, 2], Point3::origin(), [1.0; 3], 0);
        assert_eq!(block.element_index(0, 0, 0), 0);
        assert_eq!(block.element_index(1, 0, 0), 1);
        assert_eq!(block.element_index(0, 1, 0), 3);
        assert_eq!(block.element_index(0, 0, 1), 6);
    }
}
