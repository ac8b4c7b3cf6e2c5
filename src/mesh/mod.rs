//! Mesh data structures
//!
//! Process-local structured blocks of hexahedral elements, each tessellated
//! into constant-strain tetrahedra.

pub mod block;
pub mod element;

pub use block::LocalBlock;
pub use element::{Element, Tensor, Tetrahedron, TETRA_PER_ELEMENT};
