//! Elastic constitutive update
//!
//! The common per-tetrahedron stress-increment contract every rheology
//! follows: given a symmetric strain increment and the material's Lamé
//! parameters, the stress tensor is *accumulated* in place. Adding a zero
//! increment changes nothing; repeated non-zero calls accumulate, which is
//! the expected semantics of an explicit time-stepping scheme.

use crate::material::{Material, Rheology};
use crate::mesh::{Element, Tensor};

/// Accumulate the linear elastic stress increment for one tetrahedron
///
/// σ_nn += 2μ ε_nn + λ tr(ε), σ_shear += 2μ ε_shear
pub fn elastic_increment(stress: &mut Tensor, strain: &Tensor, lambda: f64, mu: f64) {
    let trace = strain[0] + strain[1] + strain[2];
    let sh2 = 2.0 * mu;
    stress[0] += sh2 * strain[0] + lambda * trace;
    stress[1] += sh2 * strain[1] + lambda * trace;
    stress[2] += sh2 * strain[2] + lambda * trace;
    stress[3] += sh2 * strain[3];
    stress[4] += sh2 * strain[4];
    stress[5] += sh2 * strain[5];
}

/// Apply the elastic update to every sub-tetrahedron of an element
///
/// No-op unless the element's material carries the elastic rheology flag.
/// Purely local: no communication, no return value; the only observable
/// effect is the in-place tensor mutation.
pub fn apply_elastic(element: &mut Element, material: &Material) {
    if !material.rheology.contains(Rheology::ELASTIC) {
        return;
    }
    for tetra in element.tetra.iter_mut() {
        let strain = tetra.strain;
        elastic_increment(&mut tetra.stress, &strain, material.lambda, material.mu);
    }
}
