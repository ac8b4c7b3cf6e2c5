//! Mohr-Coulomb plasticity with piecewise-linear softening
//!
//! The plastic update subsumes the elastic one: each tetrahedron first
//! accumulates the elastic stress increment, then its principal stresses
//! are checked against a composite shear/tensile yield criterion. On
//! failure the stress is returned to the yield surface along the plastic
//! flow direction and the accumulated plastic strain grows by the second
//! invariant of the plastic increment.

use nalgebra::{Matrix3, Vector3};

use crate::material::{Material, Rheology};
use crate::mechanics::elastic::elastic_increment;
use crate::mesh::{Element, Tensor};

const DEGRAD: f64 = std::f64::consts::PI / 180.0;

/// Principal stresses (ascending: most compressive first, compression
/// negative) and the matching principal directions as matrix columns
fn principal_stresses(stress: &Tensor) -> (Vector3<f64>, Matrix3<f64>) {
    let full = Matrix3::new(
        stress[0], stress[3], stress[5],
        stress[3], stress[1], stress[4],
        stress[5], stress[4], stress[2],
    );
    let eigen = full.symmetric_eigen();

    let mut order = [0usize, 1, 2];
    order.sort_by(|&a, &b| eigen.eigenvalues[a].total_cmp(&eigen.eigenvalues[b]));

    let mut values = Vector3::zeros();
    let mut directions = Matrix3::zeros();
    for (slot, &idx) in order.iter().enumerate() {
        values[slot] = eigen.eigenvalues[idx];
        directions.set_column(slot, &eigen.eigenvectors.column(idx));
    }
    (values, directions)
}

/// Rebuild the Voigt stress from principal values and directions
fn from_principal(values: &Vector3<f64>, directions: &Matrix3<f64>) -> Tensor {
    let mut full = Matrix3::zeros();
    for k in 0..3 {
        let v = directions.column(k);
        full += values[k] * v * v.transpose();
    }
    Tensor::from_column_slice(&[
        full[(0, 0)],
        full[(1, 1)],
        full[(2, 2)],
        full[(0, 1)],
        full[(1, 2)],
        full[(0, 2)],
    ])
}

/// Apply the elastic-plastic update to every sub-tetrahedron of an element
///
/// No-op unless the material carries the plastic rheology flag. Softened
/// cohesion, friction, and dilation are interpolated from the material
/// table at each tetrahedron's accumulated plastic strain before the yield
/// check. The element's `aps` is refreshed with the volume-weighted average
/// plastic strain.
pub fn apply_plastic(element: &mut Element, material: &Material) {
    if !material.rheology.contains(Rheology::PLASTIC) {
        return;
    }

    let a1 = material.lambda + 2.0 * material.mu;
    let a2 = material.lambda;

    let mut weighted_strain = 0.0;
    let mut total_volume = 0.0;

    for tetra in element.tetra.iter_mut() {
        let strain = tetra.strain;
        elastic_increment(&mut tetra.stress, &strain, material.lambda, material.mu);

        let (mut s, directions) = principal_stresses(&tetra.stress);

        let props = material.softened(tetra.plastic_strain);
        let sphi = (props.friction_angle * DEGRAD).sin();
        let spsi = (props.dilation_angle * DEGRAD).sin();
        let anphi = (1.0 + sphi) / (1.0 - sphi);
        let anpsi = (1.0 + spsi) / (1.0 - spsi);

        // Tensile cutoff, capped by the apex of the shear envelope
        let mut st = material.ten_off;
        if props.friction_angle > 0.0 {
            let apex = props.cohesion / (props.friction_angle * DEGRAD).tan();
            if apex < st {
                st = apex;
            }
        }

        // Composite yield criterion: shear on (s1, s3), tensile on s3
        let fs = s[0] - s[2] * anphi + 2.0 * props.cohesion * anphi.sqrt();
        let ft = s[2] - st;

        if fs < 0.0 || ft > 0.0 {
            let ap = (1.0 + anphi * anphi).sqrt() + anphi;
            let sp = st * anphi - 2.0 * props.cohesion * anphi.sqrt();
            let h = s[2] - st + ap * (s[0] - sp);

            let (dep1, dep3) = if h < 0.0 {
                // Shear failure: non-associated flow with dilation anpsi
                let alam = fs
                    / (a1 - a2 * anpsi + a1 * anphi * anpsi - a2 * anphi + props.hardening);
                s[0] -= alam * (a1 - a2 * anpsi);
                s[1] -= alam * a2 * (1.0 - anpsi);
                s[2] -= alam * (a2 - a1 * anpsi);
                (alam, -alam * anpsi)
            } else {
                // Tensile failure
                let alam = ft / a1;
                s[0] -= alam * a2;
                s[1] -= alam * a2;
                s[2] -= alam * a1;
                (0.0, alam)
            };

            // Second invariant of the plastic strain increment
            let depm = (dep1 + dep3) / 3.0;
            tetra.plastic_strain += (0.5
                * ((dep1 - depm) * (dep1 - depm)
                    + depm * depm
                    + (dep3 - depm) * (dep3 - depm)
                    + depm * depm))
                .sqrt();

            tetra.stress = from_principal(&s, &directions);
        }

        weighted_strain += tetra.plastic_strain * tetra.volume;
        total_volume += tetra.volume;
    }

    element.aps = weighted_strain / total_volume;
}
