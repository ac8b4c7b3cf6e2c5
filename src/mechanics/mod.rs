//! Constitutive updates
//!
//! Per-tetrahedron stress-increment rules shared by the rheology plugins.
//! Every update is purely local to one element: no communication, in-place
//! tensor mutation only.

pub mod elastic;
pub mod plastic;

pub use elastic::{apply_elastic, elastic_increment};
pub use plastic::apply_plastic;
