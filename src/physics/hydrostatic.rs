//! Hydrostatic initial condition
//!
//! Computes the depth- (or radius-) dependent isotropic pressure in every
//! element before the dynamic simulation begins, and uses it to seed the
//! initial stress state of all sub-tetrahedra.
//!
//! The integration runs strictly top to bottom. Within one rank each (i, k)
//! column is integrated independently; across ranks the accumulated
//! pressure plane is relayed downward through the processor grid, one
//! vertical layer at a time, so each rank's starting pressure reflects the
//! true weight of all material above it without a global reduction.

use log::info;
use nalgebra::Point3;

use crate::decomp::Decomposition;
use crate::error::{Error, Result};
use crate::material::Material;
use crate::mesh::{LocalBlock, TETRA_PER_ELEMENT};
use crate::physics::relay::RelayLink;

/// Vertical-distance convention for column integration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Geometry {
    /// Depth measured along the y axis
    Cartesian,
    /// Depth measured along the radial direction from the origin
    Spherical,
}

/// Immutable domain extents, passed by reference wherever the bottom
/// elevation or radial range is needed
#[derive(Debug, Clone, Copy)]
pub struct DomainBounds {
    pub min: Point3<f64>,
    pub max: Point3<f64>,
}

impl DomainBounds {
    /// Reference bottom elevation (`rzbo`)
    pub fn bottom_elevation(&self) -> f64 {
        self.min.y
    }
}

/// Inputs shared by every column of the sweep
#[derive(Debug, Clone, Copy)]
pub struct HydrostaticParams<'a> {
    pub materials: &'a [Material],
    /// Gravitational acceleration (m/s²)
    pub gravity: f64,
    pub geometry: Geometry,
    pub bounds: DomainBounds,
}

/// Outcome of integrating one rank's block
#[derive(Debug, Clone)]
pub struct LayerResult {
    /// Per-(i, k) pressure at the bottom of this rank's block, including
    /// the contribution received from above; indexed `i * elz + k`
    pub bottom: Vec<f64>,
    /// Isostatic reference pressure, captured only on the bottom processor
    /// layer at local column (0, 0)
    pub pisos: Option<f64>,
}

/// Summary returned to the caller after the full sweep
#[derive(Debug, Clone, Copy, Default)]
pub struct HydrostaticSummary {
    /// `Some` on the rank that owns the bottom-layer (0, 0) column
    pub pisos: Option<f64>,
}

/// Average element thickness along the integration direction
///
/// Mean of the four vertical-edge length differences: corner pairs
/// (0,2), (1,3), (4,6), (5,7) of the hexahedron. In the spherical variant
/// the y-difference is replaced by the difference of radial distances from
/// the origin at the same corner pairs.
fn element_thickness(block: &LocalBlock, i: usize, j: usize, k: usize, geometry: Geometry) -> f64 {
    let mut dh = 0.0;
    for c in [0usize, 1, 4, 5] {
        let lo = block.corner(i, j, k, c);
        let hi = block.corner(i, j, k, c | 2);
        dh += match geometry {
            Geometry::Cartesian => hi.y - lo.y,
            Geometry::Spherical => hi.coords.norm() - lo.coords.norm(),
        };
    }
    0.25 * dh
}

/// Integrate density-driven pressure down every (i, k) column of one
/// rank's block
///
/// `p_from_above` is the accumulated pressure plane handed down by the rank
/// above (all zeros on the top layer), indexed `i * elz + k`; its length
/// must equal `elx * elz`. Each element receives the signed midpoint
/// pressure in the three normal stress components of all its sub-tetrahedra
/// and in `hydro_pressure`; the returned plane carries the column totals
/// for the rank below.
pub fn integrate_block(
    block: &mut LocalBlock,
    params: &HydrostaticParams,
    p_from_above: &[f64],
    bottom_layer: bool,
) -> Result<LayerResult> {
    let [elx, ely, elz] = block.extents;
    if p_from_above.len() != elx * elz {
        return Err(Error::Decomposition(format!(
            "pressure plane has {} entries, block extents {:?} need {}",
            p_from_above.len(),
            block.extents,
            elx * elz
        )));
    }

    let mut bottom = vec![0.0; elx * elz];
    let mut pisos = None;

    for k in 0..elz {
        for i in 0..elx {
            let p_above = p_from_above[i * elz + k];
            // Pressure accumulated strictly within this column on this rank
            let mut rogh = 0.0;
            for j in (0..ely).rev() {
                let dh = element_thickness(block, i, j, k, params.geometry);
                let rzbo = params.bounds.bottom_elevation();
                let element = block.element_mut(i, j, k);
                let material = &params.materials[element.material];

                // Average temperature-adjusted density over the
                // tessellation; a uniform average, not an exact integral.
                // The spherical variant ignores the reference temperature.
                let mut dens_t = 0.0;
                for tetra in element.tetra.iter_mut() {
                    dens_t += match params.geometry {
                        Geometry::Cartesian => material.density_at(tetra.avg_temp),
                        Geometry::Spherical => {
                            material.density * (1.0 - material.alpha * tetra.avg_temp)
                        }
                    } / TETRA_PER_ELEMENT as f64;
                    // Strain rate is reset before the hydrostatic overwrite.
                    // Stress is not: the normal components are overwritten
                    // below, and any prior off-diagonal stress survives
                    // (deliberate, to carry deviatoric state across a
                    // restart).
                    tetra.strain_rate.fill(0.0);
                }

                element.stress = 0.0;
                element.strain_rate = 0.0;
                element.hydro_pressure = 0.0;
                element.rzbo = rzbo;

                // First-order compressibility correction on ρ g dh
                let dpt = dens_t * params.gravity * dh;
                let dp = dpt * (1.0 - material.beta * rogh) / (1.0 + material.beta / 2.0 * dpt);
                let p = -(rogh + 0.5 * dp + p_above);

                for tetra in element.tetra.iter_mut() {
                    tetra.stress[0] = p;
                    tetra.stress[1] = p;
                    tetra.stress[2] = p;
                }
                element.hydro_pressure = p;

                rogh += dp;
                element.bottom_pressure = rogh;
                if j == 0 {
                    bottom[i * elz + k] = rogh + p_above;
                    if i == 0 && k == 0 && bottom_layer {
                        pisos = Some(bottom[i * elz + k]);
                    }
                }
            }
        }
    }

    Ok(LayerResult { bottom, pisos })
}

/// Drive the full top-to-bottom hydrostatic sweep for one rank
///
/// The outer loop walks processor layers from the top of the vertical axis
/// to the bottom. On each iteration exactly the ranks of the current layer
/// receive from above, integrate, and send below; everyone else idles. The
/// collective barrier after every iteration keeps downstream ranks from
/// posting their sends ahead of their designated turn, since readiness is
/// expressed only by the blocking receive.
pub fn initialize_hydrostatic<L: RelayLink>(
    block: &mut LocalBlock,
    decomp: &Decomposition,
    rank: usize,
    params: &HydrostaticParams,
    link: &mut L,
) -> Result<HydrostaticSummary> {
    let [elx, _, elz] = block.extents;
    if block.extents != decomp.local_extents(rank) {
        return Err(Error::Decomposition(format!(
            "rank {} block extents {:?} disagree with decomposition {:?}",
            rank,
            block.extents,
            decomp.local_extents(rank)
        )));
    }

    if rank == 0 {
        info!(
            "hydrostatic initialization: sweeping {} processor layer(s), {} geometry",
            decomp.proc_counts[1],
            match params.geometry {
                Geometry::Cartesian => "cartesian",
                Geometry::Spherical => "spherical",
            }
        );
    }

    let partition = decomp.rank_partition(rank);
    let mut summary = HydrostaticSummary::default();

    for proc_j in (0..decomp.proc_counts[1]).rev() {
        if partition[1] == proc_j {
            let mut plane = vec![0.0; elx * elz];
            if decomp.rank_above(rank).is_some() {
                link.recv_plane_from_above(&mut plane)?;
            }
            let result = integrate_block(block, params, &plane, decomp.is_bottom_layer(rank))?;
            if decomp.rank_below(rank).is_some() {
                link.send_plane_below(&result.bottom)?;
            }
            summary.pisos = result.pisos;
        }
        link.barrier();
    }

    Ok(summary)
}
