//! Parallel Lagrangian finite-element core for large-strain geodynamic
//! deformation.
//!
//! The crate centers on three pieces: the distributed hydrostatic
//! initial-condition pipeline (per-column pressure integration relayed
//! top-to-bottom across a 3D processor grid), the per-tetrahedron
//! constitutive update pattern shared by the rheology implementations, and
//! the element/tetrahedron state both of them mutate. Supporting modules
//! cover configuration, mesh decomposition, heterogeneity geometry,
//! weak-point seeding, equilibrium tracking, and binary state output.

pub mod config;
pub mod decomp;
pub mod error;
pub mod geometry;
pub mod material;
pub mod mechanics;
pub mod mesh;
pub mod output;
pub mod physics;
pub mod seeding;
pub mod track;

pub use config::SimulationConfig;
pub use decomp::Decomposition;
pub use error::{Error, Result};
pub use geometry::{apply_heterogeneities, Heterogeneity, Shape};
pub use material::{Material, Rheology, SoftenedProperties};
pub use mechanics::{apply_elastic, apply_plastic, elastic_increment};
pub use mesh::{Element, LocalBlock, Tensor, Tetrahedron, TETRA_PER_ELEMENT};
pub use output::StateWriter;
pub use physics::{
    initialize_hydrostatic, integrate_block, ChannelRelay, DomainBounds, Geometry,
    HydrostaticParams, HydrostaticSummary, LayerResult, RelayLink,
};
pub use seeding::{create_weak_points, SeedingPlan, SeedingReport, TriggerPoint};
pub use track::{EquilibriumTracker, TrackPhase};

#[cfg(feature = "mpi")]
pub use physics::MpiRelay;
