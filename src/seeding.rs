//! Weak-point seeding
//!
//! Inserts low-cohesion points into the mesh by forcing plastic strain at
//! a random fraction of elements inside a centered sub-domain, plus an
//! optional single trigger point at a fractional position. Every rank runs
//! the same seeded shuffle over the *global* element grid, so the selected
//! set is identical everywhere and each rank applies only the elements it
//! owns.

use log::info;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::decomp::Decomposition;
use crate::error::{Error, Result};
use crate::material::Material;
use crate::mesh::LocalBlock;

/// Seeding parameters, usually read from configuration
#[derive(Debug, Clone)]
pub struct SeedingPlan {
    /// Fraction of sub-domain elements to weaken, in [0, 1]
    pub fraction_weak_points: f64,
    /// Per-axis fraction of the global element grid forming the centered
    /// sub-domain (y measured down from the surface), each in [0, 1]
    pub subdomain_fraction: [f64; 3],
    /// Cohesion to impose at weak points (Pa), inverted through the
    /// material softening table
    pub weak_point_cohesion: f64,
    pub rng_seed: u64,
    pub trigger_point: Option<TriggerPoint>,
}

/// One deterministic low-cohesion element at a fractional position
#[derive(Debug, Clone, Copy)]
pub struct TriggerPoint {
    /// Fractional (x, y, z) position in the global element grid, each in
    /// [0, 1]; y is measured from the top surface downward, and 1.0 maps
    /// onto the last element of its axis
    pub position_fraction: [f64; 3],
    pub cohesion: f64,
}

/// Elements this rank actually weakened
#[derive(Debug, Clone, Default)]
pub struct SeedingReport {
    pub weak_points_local: usize,
    pub weak_points_global: usize,
    pub trigger_point_local: bool,
}

/// Seed weak points into this rank's block
///
/// The sub-domain is centered on x and z and anchored at the top surface on
/// y. Candidate elements are shuffled with a seeded RNG and the first
/// `fraction · count` become weak points: every tetrahedron's plastic
/// strain is set by inverting the weak-point cohesion through the softening
/// table.
pub fn create_weak_points(
    block: &mut LocalBlock,
    decomp: &Decomposition,
    rank: usize,
    materials: &[Material],
    plan: &SeedingPlan,
) -> Result<SeedingReport> {
    if !(0.0..=1.0).contains(&plan.fraction_weak_points) {
        return Err(Error::Config(format!(
            "fraction of weak points {} outside [0, 1]",
            plan.fraction_weak_points
        )));
    }
    for (axis, &fraction) in plan.subdomain_fraction.iter().enumerate() {
        if !(0.0..=1.0).contains(&fraction) {
            return Err(Error::Config(format!(
                "sub-domain fraction {} on axis {} outside [0, 1]",
                fraction, axis
            )));
        }
    }
    if let Some(trigger) = &plan.trigger_point {
        for (axis, &fraction) in trigger.position_fraction.iter().enumerate() {
            if !(0.0..=1.0).contains(&fraction) {
                return Err(Error::Config(format!(
                    "trigger-point fraction {} on axis {} outside [0, 1]",
                    fraction, axis
                )));
            }
        }
    }

    let [gx, gy, gz] = decomp.element_counts;
    let sub = [
        (gx as f64 * plan.subdomain_fraction[0]) as usize,
        (gy as f64 * plan.subdomain_fraction[1]) as usize,
        (gz as f64 * plan.subdomain_fraction[2]) as usize,
    ];
    let mut report = SeedingReport::default();

    if rank == 0 {
        info!(
            "weak-point seeding: sub-domain {:?} of {:?}, fraction {}, seed {}",
            sub, decomp.element_counts, plan.fraction_weak_points, plan.rng_seed
        );
    }

    // Candidate list over the centered sub-domain, in global coordinates
    let mut candidates = Vec::with_capacity(sub[0] * sub[1] * sub[2]);
    for si in 0..sub[0] {
        for sj in 0..sub[1] {
            for sk in 0..sub[2] {
                candidates.push([
                    si + (gx - sub[0]) / 2,
                    gy - 1 - sj,
                    sk + (gz - sub[2]) / 2,
                ]);
            }
        }
    }

    let count = (candidates.len() as f64 * plan.fraction_weak_points) as usize;
    let mut rng = StdRng::seed_from_u64(plan.rng_seed);
    candidates.shuffle(&mut rng);
    report.weak_points_global = count;

    for global in candidates.into_iter().take(count) {
        if let Some(local) = decomp.element_global_to_local(rank, global) {
            let element = &mut block.elements[local];
            let material = &materials[element.material];
            let plastic_strain = material.plastic_strain_from_cohesion(plan.weak_point_cohesion);
            for tetra in element.tetra.iter_mut() {
                tetra.plastic_strain = plastic_strain;
            }
            report.weak_points_local += 1;
        }
    }

    if let Some(trigger) = &plan.trigger_point {
        // Fraction 1.0 maps onto the last element of the axis, not past it
        let global = [
            ((gx as f64 * trigger.position_fraction[0]) as usize).min(gx - 1),
            gy - 1 - ((gy as f64 * trigger.position_fraction[1]) as usize).min(gy - 1),
            ((gz as f64 * trigger.position_fraction[2]) as usize).min(gz - 1),
        ];
        if let Some(local) = decomp.element_global_to_local(rank, global) {
            let element = &mut block.elements[local];
            let material = &materials[element.material];
            let plastic_strain = material.plastic_strain_from_cohesion(trigger.cohesion);
            for tetra in element.tetra.iter_mut() {
                tetra.plastic_strain = plastic_strain;
            }
            report.trigger_point_local = true;
            info!(
                "trigger point at global {:?} seeded with plastic strain {}",
                global, plastic_strain
            );
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::Rheology;
    use nalgebra::Point3;

    fn softening_material() -> Material {
        Material {
            lambda: 30e9,
            mu: 30e9,
            density: 2700.0,
            alpha: 0.0,
            beta: 0.0,
            ref_temp: 0.0,
            ten_off: 1e9,
            rheology: Rheology::ELASTIC.union(Rheology::PLASTIC),
            plstrain: vec![0.0, 0.1, 0.5],
            cohesion: vec![40e6, 20e6, 4e6],
            friction_angle: vec![30.0, 15.0, 15.0],
            dilation_angle: vec![0.0, 0.0, 0.0],
        }
    }

    fn plan(fraction: f64, seed: u64) -> SeedingPlan {
        SeedingPlan {
            fraction_weak_points: fraction,
            subdomain_fraction: [1.0, 0.5, 1.0],
            weak_point_cohesion: 30e6,
            rng_seed: seed,
            trigger_point: None,
        }
    }

    #[test]
    fn seeding_is_deterministic_for_a_seed() {
        let decomp = Decomposition::new([1, 1, 1], [4, 4, 4]).unwrap();
        let materials = [softening_material()];

        let seeded: Vec<Vec<usize>> = (0..2)
            .map(|_| {
                let mut block = LocalBlock::regular([4, 4, 4], Point3::origin(), [1.0; 3], 0);
                create_weak_points(&mut block, &decomp, 0, &materials, &plan(0.5, 42)).unwrap();
                block
                    .elements
                    .iter()
                    .enumerate()
                    .filter(|(_, e)| e.tetra[0].plastic_strain > 0.0)
                    .map(|(i, _)| i)
                    .collect()
            })
            .collect();
        assert_eq!(seeded[0], seeded[1]);
        assert!(!seeded[0].is_empty());
    }

    #[test]
    fn weak_points_restricted_to_subdomain() {
        let decomp = Decomposition::new([1, 1, 1], [4, 4, 4]).unwrap();
        let materials = [softening_material()];
        let mut block = LocalBlock::regular([4, 4, 4], Point3::origin(), [1.0; 3], 0);
        create_weak_points(&mut block, &decomp, 0, &materials, &plan(1.0, 7)).unwrap();

        // y sub-domain is the top half: j in {2, 3}
        for k in 0..4 {
            for j in 0..4 {
                for i in 0..4 {
                    let seeded = block.element(i, j, k).tetra[0].plastic_strain > 0.0;
                    assert_eq!(seeded, j >= 2, "element ({i},{j},{k})");
                }
            }
        }
    }

    #[test]
    fn seeded_strain_comes_from_cohesion_inversion() {
        let decomp = Decomposition::new([1, 1, 1], [2, 2, 2]).unwrap();
        let materials = [softening_material()];
        let mut block = LocalBlock::regular([2, 2, 2], Point3::origin(), [1.0; 3], 0);
        let mut p = plan(1.0, 1);
        p.subdomain_fraction = [1.0, 1.0, 1.0];
        create_weak_points(&mut block, &decomp, 0, &materials, &p).unwrap();

        let expected = materials[0].plastic_strain_from_cohesion(30e6);
        assert!(expected > 0.0 && expected < 0.1);
        for element in &block.elements {
            for tetra in &element.tetra {
                assert_eq!(tetra.plastic_strain, expected);
            }
        }
    }

    #[test]
    fn trigger_point_lands_once() {
        let decomp = Decomposition::new([1, 1, 1], [4, 4, 4]).unwrap();
        let materials = [softening_material()];
        let mut block = LocalBlock::regular([4, 4, 4], Point3::origin(), [1.0; 3], 0);
        let mut p = plan(0.0, 1);
        p.trigger_point = Some(TriggerPoint { position_fraction: [0.5, 0.0, 0.5], cohesion: 10e6 });
        let report = create_weak_points(&mut block, &decomp, 0, &materials, &p).unwrap();

        assert!(report.trigger_point_local);
        let seeded: usize = block
            .elements
            .iter()
            .filter(|e| e.tetra[0].plastic_strain > 0.0)
            .count();
        assert_eq!(seeded, 1);
        // y fraction 0.0 anchors at the top layer
        assert!(block.element(2, 3, 2).tetra[0].plastic_strain > 0.0);
    }

    #[test]
    fn trigger_point_at_fraction_one_lands_on_the_bottom_layer() {
        let decomp = Decomposition::new([1, 1, 1], [4, 4, 4]).unwrap();
        let materials = [softening_material()];
        let mut block = LocalBlock::regular([4, 4, 4], Point3::origin(), [1.0; 3], 0);
        let mut p = plan(0.0, 1);
        // y fraction 1.0 is the very bottom of the domain
        p.trigger_point = Some(TriggerPoint { position_fraction: [0.5, 1.0, 0.5], cohesion: 10e6 });
        let report = create_weak_points(&mut block, &decomp, 0, &materials, &p).unwrap();

        assert!(report.trigger_point_local);
        assert!(block.element(2, 0, 2).tetra[0].plastic_strain > 0.0);
    }

    #[test]
    fn invalid_fraction_is_rejected() {
        let decomp = Decomposition::new([1, 1, 1], [2, 2, 2]).unwrap();
        let materials = [softening_material()];
        let mut block = LocalBlock::regular([2, 2, 2], Point3::origin(), [1.0; 3], 0);
        assert!(create_weak_points(&mut block, &decomp, 0, &materials, &plan(1.5, 1)).is_err());

        let mut oversized = plan(0.5, 1);
        oversized.subdomain_fraction = [1.0, 1.25, 1.0];
        assert!(create_weak_points(&mut block, &decomp, 0, &materials, &oversized).is_err());

        let mut outside = plan(0.0, 1);
        outside.trigger_point =
            Some(TriggerPoint { position_fraction: [0.5, -0.1, 0.5], cohesion: 10e6 });
        assert!(create_weak_points(&mut block, &decomp, 0, &materials, &outside).is_err());
    }
}
