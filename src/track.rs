//! Surface-motion tracking toward elastic equilibrium
//!
//! Watches one horizontal slice of node elevations across time steps and
//! reports when its motion has decayed enough to call the configuration
//! elastically stabilized. History lives in an explicit tracker struct
//! owned by the caller, with a documented phase progression instead of
//! first-call flags.

/// Where the tracker currently is in its progression
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackPhase {
    /// Collecting the first two elevation grids; no rates available yet
    Priming,
    /// Motion has not yet risen above the start threshold
    Watching,
    /// Motion peaked and is decaying
    Falling,
    /// Normalized motion fell below the stop threshold; tracking is done
    Stabilized,
}

/// Explicit tracking state threaded through the time loop
#[derive(Debug, Clone)]
pub struct EquilibriumTracker {
    start_threshold: f64,
    stop_threshold: f64,
    phase: TrackPhase,
    old: Vec<f64>,
    older: Vec<f64>,
    /// Normalizers captured from the first measurable rates
    unit_velocity: f64,
    unit_accel: f64,
    prev_max_velocity: f64,
}

impl EquilibriumTracker {
    /// `slice_len` is the number of nodes in the tracked slice
    pub fn new(slice_len: usize, start_threshold: f64, stop_threshold: f64) -> Self {
        Self {
            start_threshold,
            stop_threshold,
            phase: TrackPhase::Priming,
            old: vec![f64::NAN; slice_len],
            older: vec![f64::NAN; slice_len],
            unit_velocity: 0.0,
            unit_accel: 0.0,
            prev_max_velocity: 0.0,
        }
    }

    pub fn phase(&self) -> TrackPhase {
        self.phase
    }

    /// Feed one time step's slice elevations; returns the updated phase
    ///
    /// Velocity is the per-node elevation change since the last step,
    /// acceleration the change of that change. Both maxima are normalized
    /// by their first measured values, so thresholds are relative to the
    /// initial transient rather than absolute rates.
    pub fn observe(&mut self, elevations: &[f64]) -> TrackPhase {
        assert_eq!(elevations.len(), self.old.len(), "slice length changed");

        if self.phase == TrackPhase::Stabilized {
            return self.phase;
        }

        let have_old = self.old.iter().all(|v| v.is_finite());
        let have_older = self.older.iter().all(|v| v.is_finite());

        if have_old && have_older {
            let mut max_velocity = 0.0_f64;
            let mut max_accel = 0.0_f64;
            for ((&now, &old), &older) in
                elevations.iter().zip(&self.old).zip(&self.older)
            {
                let velocity = (now - old).abs();
                let accel = ((now - old) - (old - older)).abs();
                max_velocity = max_velocity.max(velocity);
                max_accel = max_accel.max(accel);
            }

            if self.unit_velocity == 0.0 && max_velocity > 0.0 {
                self.unit_velocity = max_velocity;
                self.unit_accel = max_accel.max(f64::MIN_POSITIVE);
            }

            if self.unit_velocity > 0.0 {
                let relative = max_velocity / self.unit_velocity;
                let relative_accel = max_accel / self.unit_accel;
                match self.phase {
                    TrackPhase::Priming => self.phase = TrackPhase::Watching,
                    TrackPhase::Watching => {
                        if relative >= self.start_threshold
                            && max_velocity < self.prev_max_velocity
                        {
                            self.phase = TrackPhase::Falling;
                        }
                    }
                    TrackPhase::Falling => {
                        // Both rates must settle; a still-accelerating slice
                        // with momentarily small velocity is not equilibrium
                        if relative < self.stop_threshold
                            && relative_accel < self.stop_threshold
                        {
                            self.phase = TrackPhase::Stabilized;
                        }
                    }
                    TrackPhase::Stabilized => {}
                }
                self.prev_max_velocity = max_velocity;
            }
        } else if have_old {
            // Second observation: rates become available next step
            self.phase = TrackPhase::Priming;
        }

        self.older.copy_from_slice(&self.old);
        self.old.copy_from_slice(elevations);
        self.phase
    }
}
