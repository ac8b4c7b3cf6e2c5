//! Pressure-plane relay transport
//!
//! The hydrostatic sweep passes one dense `elx × elz` plane of doubles
//! between vertically adjacent ranks: receive from the rank above,
//! integrate, send to the rank below. The transport is abstracted behind
//! [`RelayLink`] so the sweep logic runs unchanged over MPI or over
//! in-process channels in tests.

use std::sync::mpsc::{channel, Receiver, Sender};

use crate::error::{Error, Result};

/// Blocking point-to-point transport for one rank's vertical neighbors
///
/// All three operations mirror their MPI counterparts: the receive blocks
/// until the neighbor above has sent, the send completes the layer's work,
/// and the barrier is collective across every rank per sweep iteration.
pub trait RelayLink {
    /// Blocking receive of the accumulated pressure plane from the rank
    /// directly above. Only called when such a rank exists.
    fn recv_plane_from_above(&mut self, plane: &mut [f64]) -> Result<()>;

    /// Send this rank's bottom-pressure plane to the rank directly below.
    /// Only called when such a rank exists.
    fn send_plane_below(&mut self, plane: &[f64]) -> Result<()>;

    /// Collective barrier closing one iteration of the layer sweep
    fn barrier(&mut self);
}

/// In-process transport over `mpsc` channels
///
/// Used by tests and single-host demos. The channel send is buffered, so a
/// vertical stack of relays can be driven either from one thread (layers
/// executed top to bottom) or from one thread per rank. The barrier is a
/// no-op: ordering is already enforced by the blocking receive.
pub struct ChannelRelay {
    from_above: Option<Receiver<Vec<f64>>>,
    to_below: Option<Sender<Vec<f64>>>,
}

impl ChannelRelay {
    /// Build a vertical stack of `layers` linked relays, index 0 at the
    /// bottom, matching processor-layer coordinates.
    pub fn stack(layers: usize) -> Vec<ChannelRelay> {
        let mut relays: Vec<ChannelRelay> = (0..layers)
            .map(|_| ChannelRelay { from_above: None, to_below: None })
            .collect();
        for upper in (1..layers).rev() {
            let (tx, rx) = channel();
            relays[upper].to_below = Some(tx);
            relays[upper - 1].from_above = Some(rx);
        }
        relays
    }

    /// A relay with no vertical neighbors (single processor layer)
    pub fn solo() -> ChannelRelay {
        ChannelRelay { from_above: None, to_below: None }
    }
}

impl RelayLink for ChannelRelay {
    fn recv_plane_from_above(&mut self, plane: &mut [f64]) -> Result<()> {
        let rx = self
            .from_above
            .as_ref()
            .ok_or_else(|| Error::Relay("no link to the rank above".into()))?;
        let received = rx
            .recv()
            .map_err(|_| Error::Relay("rank above dropped its link".into()))?;
        if received.len() != plane.len() {
            return Err(Error::Relay(format!(
                "plane size mismatch: got {}, expected {}",
                received.len(),
                plane.len()
            )));
        }
        plane.copy_from_slice(&received);
        Ok(())
    }

    fn send_plane_below(&mut self, plane: &[f64]) -> Result<()> {
        let tx = self
            .to_below
            .as_ref()
            .ok_or_else(|| Error::Relay("no link to the rank below".into()))?;
        tx.send(plane.to_vec())
            .map_err(|_| Error::Relay("rank below dropped its link".into()))
    }

    fn barrier(&mut self) {}
}

/// MPI transport over the world communicator
///
/// One tagged message per vertically adjacent pair, blocking on both ends,
/// with `MPI_Barrier` closing each sweep iteration. Inconsistent
/// decomposition metadata deadlocks the job; there is no timeout.
#[cfg(feature = "mpi")]
pub use self::mpi_relay::MpiRelay;

#[cfg(feature = "mpi")]
mod mpi_relay {
    use mpi::topology::SimpleCommunicator;
    use mpi::traits::*;

    use super::RelayLink;
    use crate::error::Result;

    pub struct MpiRelay<'a> {
        world: &'a SimpleCommunicator,
        above: Option<i32>,
        below: Option<i32>,
    }

    impl<'a> MpiRelay<'a> {
        pub fn new(world: &'a SimpleCommunicator, above: Option<usize>, below: Option<usize>) -> Self {
            Self {
                world,
                above: above.map(|r| r as i32),
                below: below.map(|r| r as i32),
            }
        }
    }

    impl RelayLink for MpiRelay<'_> {
        fn recv_plane_from_above(&mut self, plane: &mut [f64]) -> Result<()> {
            if let Some(above) = self.above {
                self.world.process_at_rank(above).receive_into(plane);
            }
            Ok(())
        }

        fn send_plane_below(&mut self, plane: &[f64]) -> Result<()> {
            if let Some(below) = self.below {
                self.world.process_at_rank(below).send(plane);
            }
            Ok(())
        }

        fn barrier(&mut self) {
            self.world.barrier();
        }
    }
}
