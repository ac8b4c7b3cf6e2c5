//! Heterogeneity geometry predicates
//!
//! Material heterogeneities (weak zones, dykes, inclusions) are described
//! by simple closed shapes tested against element centroids or node
//! coordinates. Each variant carries exactly the parameters it uses;
//! dispatch is a plain `match`.

use nalgebra::{Point3, Vector3};

use crate::mesh::LocalBlock;

/// Region of the domain occupied by one heterogeneity
#[derive(Debug, Clone)]
pub enum Shape {
    /// Slab of material within `half_width` of the plane through `origin`
    /// with unit normal `normal`
    Dyke {
        origin: Point3<f64>,
        normal: Vector3<f64>,
        half_width: f64,
    },
    Sphere {
        center: Point3<f64>,
        radius: f64,
    },
    /// Finite-radius cylinder around the line through `axis_point` with
    /// direction `axis_dir` (need not be normalized)
    Cylinder {
        axis_point: Point3<f64>,
        axis_dir: Vector3<f64>,
        radius: f64,
    },
    /// Everything above the given elevation
    UpperLimit { y: f64 },
    /// Everything below the given elevation
    LowerLimit { y: f64 },
    /// x ≤ limit
    LeftLimit { x: f64 },
    /// x ≥ limit
    RightLimit { x: f64 },
    /// z ≤ limit
    FrontLimit { z: f64 },
    /// z ≥ limit
    BackLimit { z: f64 },
}

impl Shape {
    /// Whether a coordinate lies inside the shape
    pub fn contains(&self, p: &Point3<f64>) -> bool {
        match self {
            Shape::Dyke { origin, normal, half_width } => {
                let n = normal.normalize();
                ((p - origin).dot(&n)).abs() <= *half_width
            }
            Shape::Sphere { center, radius } => (p - center).norm() <= *radius,
            Shape::Cylinder { axis_point, axis_dir, radius } => {
                let axis = axis_dir.normalize();
                let offset = p - axis_point;
                let radial = offset - offset.dot(&axis) * axis;
                radial.norm() <= *radius
            }
            Shape::UpperLimit { y } => p.y >= *y,
            Shape::LowerLimit { y } => p.y <= *y,
            Shape::LeftLimit { x } => p.x <= *x,
            Shape::RightLimit { x } => p.x >= *x,
            Shape::FrontLimit { z } => p.z <= *z,
            Shape::BackLimit { z } => p.z >= *z,
        }
    }
}

/// One heterogeneity: a shape and the material it stamps
#[derive(Debug, Clone)]
pub struct Heterogeneity {
    pub shape: Shape,
    /// Material table index assigned inside the shape
    pub material: usize,
}

/// Overwrite the material index of every element whose centroid falls
/// inside a region. Regions apply in order; later entries win overlaps.
pub fn apply_heterogeneities(block: &mut LocalBlock, regions: &[Heterogeneity]) {
    let [elx, ely, elz] = block.extents;
    for k in 0..elz {
        for j in 0..ely {
            for i in 0..elx {
                let mut centroid = Vector3::zeros();
                for c in 0..8 {
                    centroid += block.corner(i, j, k, c).coords;
                }
                let centroid = Point3::from(centroid / 8.0);
                for region in regions {
                    if region.shape.contains(&centroid) {
                        block.element_mut(i, j, k).material = region.material;
                    }
                }
            }
        }
    }
}
