//! Configuration management
//!
//! Reads TOML configuration files and turns them into validated runtime
//! objects: the material table, the mesh decomposition, domain bounds, and
//! the optional weak-point seeding plan.

use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::decomp::Decomposition;
use crate::error::{Error, Result};
use crate::geometry::{Heterogeneity, Shape};
use crate::material::{Material, Rheology};
use crate::physics::hydrostatic::{DomainBounds, Geometry};
use crate::seeding::{SeedingPlan, TriggerPoint};

/// Top-level simulation configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SimulationConfig {
    /// Gravitational acceleration (m/s²)
    pub gravity: f64,
    #[serde(default)]
    pub geometry: GeometryConfig,
    pub domain: DomainConfig,
    pub grid: GridConfig,
    pub materials: Vec<MaterialConfig>,
    #[serde(default)]
    pub seeding: Option<SeedingConfig>,
    #[serde(default)]
    pub heterogeneities: Vec<HeterogeneityConfig>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GeometryConfig {
    #[default]
    Cartesian,
    Spherical,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DomainConfig {
    /// Minimum domain corner (m)
    pub min: [f64; 3],
    /// Maximum domain corner (m)
    pub max: [f64; 3],
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GridConfig {
    /// Global element counts per axis
    pub elements: [usize; 3],
    /// Processor counts per axis
    pub processors: [usize; 3],
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MaterialConfig {
    pub lambda: f64,
    pub mu: f64,
    pub density: f64,
    #[serde(default)]
    pub alpha: f64,
    #[serde(default)]
    pub beta: f64,
    #[serde(default)]
    pub ref_temp: f64,
    #[serde(default = "default_ten_off")]
    pub ten_off: f64,
    /// Rheology flags: "elastic", "plastic", "viscous", "temperature".
    /// The last two are reserved; no update acts on them yet.
    pub rheology: Vec<String>,
    #[serde(default)]
    pub plstrain: Vec<f64>,
    #[serde(default)]
    pub cohesion: Vec<f64>,
    #[serde(default)]
    pub friction_angle: Vec<f64>,
    #[serde(default)]
    pub dilation_angle: Vec<f64>,
}

fn default_ten_off() -> f64 {
    1e9
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SeedingConfig {
    pub fraction_weak_points: f64,
    pub subdomain_fraction: [f64; 3],
    pub weak_point_cohesion: f64,
    #[serde(default)]
    pub rng_seed: u64,
    #[serde(default)]
    pub trigger_point: Option<TriggerPointConfig>,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct TriggerPointConfig {
    pub position_fraction: [f64; 3],
    pub cohesion: f64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HeterogeneityConfig {
    /// Material table index stamped inside the shape
    pub material: usize,
    #[serde(flatten)]
    pub shape: ShapeConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum ShapeConfig {
    Dyke { origin: [f64; 3], normal: [f64; 3], half_width: f64 },
    Sphere { center: [f64; 3], radius: f64 },
    Cylinder { axis_point: [f64; 3], axis_dir: [f64; 3], radius: f64 },
    UpperLimit { y: f64 },
    LowerLimit { y: f64 },
    LeftLimit { x: f64 },
    RightLimit { x: f64 },
    FrontLimit { z: f64 },
    BackLimit { z: f64 },
}

impl SimulationConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read config file: {}", e)))?;
        Self::from_str(&contents)
    }

    /// Parse configuration from a TOML string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(contents: &str) -> Result<Self> {
        toml::from_str(contents)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))
    }

    /// Build and validate the material table
    pub fn build_materials(&self) -> Result<Vec<Material>> {
        if self.materials.is_empty() {
            return Err(Error::Config("at least one material is required".into()));
        }
        self.materials
            .iter()
            .map(|m| {
                let mut rheology = Rheology::default();
                for flag in &m.rheology {
                    rheology = rheology.union(match flag.as_str() {
                        "elastic" => Rheology::ELASTIC,
                        "plastic" => Rheology::PLASTIC,
                        "viscous" => Rheology::VISCOUS,
                        "temperature" => Rheology::TEMPERATURE,
                        other => {
                            return Err(Error::Config(format!("unknown rheology '{}'", other)))
                        }
                    });
                }
                Material {
                    lambda: m.lambda,
                    mu: m.mu,
                    density: m.density,
                    alpha: m.alpha,
                    beta: m.beta,
                    ref_temp: m.ref_temp,
                    ten_off: m.ten_off,
                    rheology,
                    plstrain: m.plstrain.clone(),
                    cohesion: m.cohesion.clone(),
                    friction_angle: m.friction_angle.clone(),
                    dilation_angle: m.dilation_angle.clone(),
                }
                .validate()
            })
            .collect()
    }

    /// Build the mesh decomposition from the grid section
    pub fn decomposition(&self) -> Result<Decomposition> {
        Decomposition::new(self.grid.processors, self.grid.elements)
    }

    pub fn bounds(&self) -> DomainBounds {
        DomainBounds {
            min: Point3::from(self.domain.min),
            max: Point3::from(self.domain.max),
        }
    }

    pub fn hydro_geometry(&self) -> Geometry {
        match self.geometry {
            GeometryConfig::Cartesian => Geometry::Cartesian,
            GeometryConfig::Spherical => Geometry::Spherical,
        }
    }

    /// Heterogeneity regions, with material indices checked against the
    /// material table
    pub fn heterogeneities(&self) -> Result<Vec<Heterogeneity>> {
        self.heterogeneities
            .iter()
            .map(|h| {
                if h.material >= self.materials.len() {
                    return Err(Error::Config(format!(
                        "heterogeneity references material {} but only {} are defined",
                        h.material,
                        self.materials.len()
                    )));
                }
                let shape = match h.shape.clone() {
                    ShapeConfig::Dyke { origin, normal, half_width } => Shape::Dyke {
                        origin: Point3::from(origin),
                        normal: normal.into(),
                        half_width,
                    },
                    ShapeConfig::Sphere { center, radius } => {
                        Shape::Sphere { center: Point3::from(center), radius }
                    }
                    ShapeConfig::Cylinder { axis_point, axis_dir, radius } => Shape::Cylinder {
                        axis_point: Point3::from(axis_point),
                        axis_dir: axis_dir.into(),
                        radius,
                    },
                    ShapeConfig::UpperLimit { y } => Shape::UpperLimit { y },
                    ShapeConfig::LowerLimit { y } => Shape::LowerLimit { y },
                    ShapeConfig::LeftLimit { x } => Shape::LeftLimit { x },
                    ShapeConfig::RightLimit { x } => Shape::RightLimit { x },
                    ShapeConfig::FrontLimit { z } => Shape::FrontLimit { z },
                    ShapeConfig::BackLimit { z } => Shape::BackLimit { z },
                };
                Ok(Heterogeneity { shape, material: h.material })
            })
            .collect()
    }

    /// The seeding plan, when a seeding section is present
    pub fn seeding_plan(&self) -> Option<SeedingPlan> {
        self.seeding.as_ref().map(|s| SeedingPlan {
            fraction_weak_points: s.fraction_weak_points,
            subdomain_fraction: s.subdomain_fraction,
            weak_point_cohesion: s.weak_point_cohesion,
            rng_seed: s.rng_seed,
            trigger_point: s.trigger_point.map(|t| TriggerPoint {
                position_fraction: t.position_fraction,
                cohesion: t.cohesion,
            }),
        })
    }
}
