//! Error type shared across the crate
//!
//! Configuration and validation failures are recoverable and flow through
//! `Error`. Only outright relay transport failures are represented; the
//! relay protocol is a tightly coupled collective sweep, and a peer that
//! never posts its matching send/receive hangs the job instead of erroring.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Malformed material definition (softening table, Lamé parameters, ...)
    #[error("bad material table: {0}")]
    MaterialTable(String),

    /// Processor grid and element counts are inconsistent
    #[error("decomposition mismatch: {0}")]
    Decomposition(String),

    /// Configuration file could not be read or parsed
    #[error("config error: {0}")]
    Config(String),

    /// The relay transport failed outright (closed channel, missing peer).
    /// Note a *hung* peer is not detected; a blocking receive with no
    /// matching send deadlocks the job, accepted as fatal.
    #[error("relay transport failure: {0}")]
    Relay(String),

    /// A stress record contained NaN or Inf and was not written
    #[error("non-finite stress in element {element}, tetrahedron {tetra}")]
    NonFiniteStress { element: usize, tetra: usize },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
