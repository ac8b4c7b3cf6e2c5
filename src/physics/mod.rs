//! Physics pipelines operating on mesh state
//!
//! The hydrostatic module owns the distributed initial-condition sweep; the
//! relay module owns the transport it runs over.

pub mod hydrostatic;
pub mod relay;

pub use hydrostatic::{
    initialize_hydrostatic, integrate_block, DomainBounds, Geometry, HydrostaticParams,
    HydrostaticSummary, LayerResult,
};
pub use relay::{ChannelRelay, RelayLink};

#[cfg(feature = "mpi")]
pub use relay::MpiRelay;
