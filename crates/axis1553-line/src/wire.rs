use std::collections::VecDeque;

use crate::level::LineLevel;

/// A point-to-point link from a line driver to a line observer.
///
/// Each call to [`Wire::drive`] advances the wire by one clock tick. A level
/// driven at tick `t` becomes visible through [`Wire::sample`] at tick
/// `t + latency`. A latency of zero models a direct connection.
#[derive(Debug, Clone)]
pub struct Wire {
    stages: VecDeque<LineLevel>,
    latency: usize,
}

impl Wire {
    /// Create a direct (zero latency) wire.
    pub fn new() -> Self {
        Self::with_latency(0)
    }

    /// Create a wire that delays the driven level by `latency` ticks.
    pub fn with_latency(latency: usize) -> Self {
        Self {
            stages: std::iter::repeat_n(LineLevel::Idle, latency + 1).collect(),
            latency,
        }
    }

    /// Drive one tick's level onto the wire.
    pub fn drive(&mut self, level: LineLevel) {
        self.stages.pop_front();
        self.stages.push_back(level);
    }

    /// The level currently visible to the observer.
    pub fn sample(&self) -> LineLevel {
        self.stages.front().copied().unwrap_or_default()
    }

    /// Return every stage to idle.
    pub fn reset(&mut self) {
        self.stages.iter_mut().for_each(|stage| *stage = LineLevel::Idle);
    }

    /// Latency in ticks.
    pub fn latency(&self) -> usize {
        self.latency
    }
}

impl Default for Wire {
    fn default() -> Self {
        Self::new()
    }
}
