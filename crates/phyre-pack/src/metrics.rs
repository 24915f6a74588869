//! Wall-clock timing for batch calls.

use std::time::Instant;

/// Timing of one batch call, in seconds.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PackTimings {
    /// From call entry until the simulator returned. Includes decoding
    /// the task and merging user input.
    pub simulation_seconds: f64,
    /// Remaining time spent counting objects, rendering and featurizing.
    pub pack_seconds: f64,
}

/// Measures elapsed time from construction.
#[derive(Clone, Copy, Debug)]
pub struct Stopwatch {
    start: Instant,
}

impl Stopwatch {
    /// Start timing now.
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Seconds since [`Stopwatch::start`].
    pub fn elapsed_seconds(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }
}
