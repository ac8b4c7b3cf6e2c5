//! Material property records
//!
//! Each material is an immutable snapshot built once at setup: Lamé
//! parameters, a temperature-dependent density model, and (for plastic
//! rheologies) a piecewise-linear softening table mapping accumulated
//! plastic strain to cohesion, friction angle, and dilation angle.

use crate::error::{Error, Result};

/// Rheology selection bitmask
///
/// A material may carry several rheology flags at once (e.g. elastic +
/// plastic); each physics update tests for its own bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rheology(u32);

impl Rheology {
    pub const ELASTIC: Rheology = Rheology(1);
    pub const PLASTIC: Rheology = Rheology(1 << 1);
    /// Reserved: accepted from configuration, but no constitutive update
    /// reads this bit yet
    pub const VISCOUS: Rheology = Rheology(1 << 2);
    /// Reserved: accepted from configuration, but no constitutive update
    /// reads this bit yet
    pub const TEMPERATURE: Rheology = Rheology(1 << 3);

    pub fn contains(&self, flag: Rheology) -> bool {
        self.0 & flag.0 == flag.0
    }

    pub fn union(self, other: Rheology) -> Rheology {
        Rheology(self.0 | other.0)
    }
}

/// Softened plastic properties interpolated from the material table
#[derive(Debug, Clone, Copy)]
pub struct SoftenedProperties {
    pub cohesion: f64,
    /// Friction angle (degrees)
    pub friction_angle: f64,
    /// Dilation angle (degrees)
    pub dilation_angle: f64,
    /// Local cohesion-vs-plastic-strain slope, used as hardening modulus
    pub hardening: f64,
}

/// Per-material-type immutable record
///
/// The softening table holds `nsegments + 1` entries bounding `nsegments`
/// linear segments; `plstrain` must be non-decreasing. Validated once by
/// [`Material::validate`], read-only for the rest of the run.
#[derive(Debug, Clone)]
pub struct Material {
    /// First Lamé parameter λ (Pa)
    pub lambda: f64,
    /// Shear modulus μ (Pa)
    pub mu: f64,
    /// Reference density (kg/m³)
    pub density: f64,
    /// Thermal expansion coefficient (1/K)
    pub alpha: f64,
    /// Compressibility (1/Pa)
    pub beta: f64,
    /// Reference temperature for the density model (°C)
    pub ref_temp: f64,
    /// Tensile strength cutoff (Pa)
    pub ten_off: f64,
    pub rheology: Rheology,
    /// Plastic strain knots of the softening table, non-decreasing
    pub plstrain: Vec<f64>,
    /// Cohesion at each knot (Pa)
    pub cohesion: Vec<f64>,
    /// Friction angle at each knot (degrees)
    pub friction_angle: Vec<f64>,
    /// Dilation angle at each knot (degrees)
    pub dilation_angle: Vec<f64>,
}

impl Material {
    /// Number of linear segments in the softening table
    pub fn nsegments(&self) -> usize {
        self.plstrain.len().saturating_sub(1)
    }

    /// Check table invariants, returning the material for chaining
    pub fn validate(self) -> Result<Self> {
        if self.mu <= 0.0 {
            return Err(Error::MaterialTable("shear modulus must be positive".into()));
        }
        if self.rheology.contains(Rheology::PLASTIC) {
            if self.plstrain.len() < 2 {
                return Err(Error::MaterialTable(
                    "softening table needs at least one segment".into(),
                ));
            }
            let n = self.plstrain.len();
            if self.cohesion.len() != n
                || self.friction_angle.len() != n
                || self.dilation_angle.len() != n
            {
                return Err(Error::MaterialTable(
                    "softening table columns must have equal length".into(),
                ));
            }
            if self.plstrain.windows(2).any(|w| w[1] < w[0]) {
                return Err(Error::MaterialTable(
                    "plstrain knots must be non-decreasing".into(),
                ));
            }
            if self.friction_angle.iter().any(|&phi| phi < 0.0) {
                return Err(Error::MaterialTable(
                    "negative friction angle violates the yield model".into(),
                ));
            }
        }
        Ok(self)
    }

    /// Interpolate softened plastic properties at a given plastic strain
    ///
    /// Piecewise-linear interpolation over the table segments. Plastic
    /// strain beyond the last knot clamps to the last segment's end values
    /// (with the last segment's slope reported as hardening), preventing
    /// runaway softening at extreme strains.
    pub fn softened(&self, plastic_strain: f64) -> SoftenedProperties {
        let mut props = SoftenedProperties {
            cohesion: 0.0,
            friction_angle: 0.0,
            dilation_angle: 0.0,
            hardening: 0.0,
        };
        let n = self.nsegments();
        for i in 0..n {
            let pl1 = self.plstrain[i];
            let pl2 = self.plstrain[i + 1];
            if plastic_strain >= pl1 && plastic_strain <= pl2 {
                let tgf = (self.friction_angle[i + 1] - self.friction_angle[i]) / (pl2 - pl1);
                let tgd = (self.dilation_angle[i + 1] - self.dilation_angle[i]) / (pl2 - pl1);
                let tgc = (self.cohesion[i + 1] - self.cohesion[i]) / (pl2 - pl1);
                props.friction_angle = self.friction_angle[i] + tgf * (plastic_strain - pl1);
                props.dilation_angle = self.dilation_angle[i] + tgd * (plastic_strain - pl1);
                props.cohesion = self.cohesion[i] + tgc * (plastic_strain - pl1);
                props.hardening = tgc;
            } else if i == n - 1 && plastic_strain > pl2 {
                props.friction_angle = self.friction_angle[i];
                props.dilation_angle = self.dilation_angle[i];
                props.cohesion = self.cohesion[i];
                props.hardening = (self.cohesion[i + 1] - self.cohesion[i]) / (pl2 - pl1);
            }
        }
        props
    }

    /// Invert the softening table: plastic strain from a known cohesion
    ///
    /// Walks the segments and returns the first linearly inverted strain
    /// that lands inside its own segment. When no segment brackets the
    /// inversion the final table knot is returned, whether the requested
    /// cohesion fell above or below the table's range. That asymmetric
    /// fallback matches long-standing behavior that downstream seeding
    /// relies on; do not special-case it without renegotiating the contract.
    pub fn plastic_strain_from_cohesion(&self, cohesion: f64) -> f64 {
        for i in 0..self.nsegments() {
            let pl1 = self.plstrain[i];
            let pl2 = self.plstrain[i + 1];
            let coh1 = self.cohesion[i];
            let coh2 = self.cohesion[i + 1];
            let plastic_strain = pl1 + (pl2 - pl1) * ((cohesion - coh1) / (coh2 - coh1));
            if plastic_strain >= pl1 && plastic_strain <= pl2 {
                return plastic_strain;
            }
        }
        self.plstrain[self.nsegments()]
    }

    /// Temperature-adjusted density: ρ(T) = ρ₀ (1 − α (T − T_ref))
    pub fn density_at(&self, temp: f64) -> f64 {
        self.density * (1.0 - self.alpha * (temp - self.ref_temp))
    }
}
