//! Element-level state storage
//!
//! Each hexahedral element is tessellated into a fixed number of
//! constant-strain tetrahedra; all tensor state lives at the tetrahedron
//! level. Symmetric tensors use Voigt notation:
//! `[σ_xx, σ_yy, σ_zz, σ_xy, σ_yz, σ_xz]`.

use nalgebra::SMatrix;

/// Sub-tetrahedra per hexahedral element (two overlapping 5-tet
/// tessellations, averaged to remove mesh bias)
pub const TETRA_PER_ELEMENT: usize = 10;

/// Symmetric second-order tensor in Voigt notation
pub type Tensor = SMatrix<f64, 6, 1>;

/// One constant-strain tetrahedron of an element's tessellation
#[derive(Debug, Clone)]
pub struct Tetrahedron {
    /// Cauchy stress (Pa), Voigt. After hydrostatic initialization the
    /// three normal components are identical across all tetrahedra of the
    /// element; off-diagonal components carry whatever the constitutive
    /// update last left there.
    pub stress: Tensor,
    /// Strain increment for the current step, Voigt
    pub strain: Tensor,
    /// Strain rate, Voigt
    pub strain_rate: Tensor,
    /// Accumulated plastic strain (second-invariant measure)
    pub plastic_strain: f64,
    /// Temperature averaged over the tetrahedron's nodes (°C)
    pub avg_temp: f64,
    /// Current volume (m³)
    pub volume: f64,
}

impl Default for Tetrahedron {
    fn default() -> Self {
        Self {
            stress: Tensor::zeros(),
            strain: Tensor::zeros(),
            strain_rate: Tensor::zeros(),
            plastic_strain: 0.0,
            avg_temp: 0.0,
            volume: 1.0,
        }
    }
}

/// One hexahedral control volume of the local mesh block
#[derive(Debug, Clone)]
pub struct Element {
    /// Index into the global material table
    pub material: usize,
    pub tetra: [Tetrahedron; TETRA_PER_ELEMENT],
    /// Isotropic pressure from hydrostatic initialization (Pa, signed:
    /// compression is negative)
    pub hydro_pressure: f64,
    /// Pressure accumulated down to this element's bottom within the local
    /// column (unsigned running total)
    pub bottom_pressure: f64,
    /// Reference bottom elevation of the domain
    pub rzbo: f64,
    /// Aggregate stress magnitude, bookkeeping only
    pub stress: f64,
    /// Aggregate strain-rate magnitude, bookkeeping only
    pub strain_rate: f64,
    /// Volume-averaged accumulated plastic strain
    pub aps: f64,
}

impl Element {
    pub fn new(material: usize) -> Self {
        Self {
            material,
            tetra: std::array::from_fn(|_| Tetrahedron::default()),
            hydro_pressure: 0.0,
            bottom_pressure: 0.0,
            rzbo: 0.0,
            stress: 0.0,
            strain_rate: 0.0,
            aps: 0.0,
        }
    }

    /// Total tessellation volume
    pub fn total_volume(&self) -> f64 {
        self.tetra.iter().map(|t| t.volume).sum()
    }
}
