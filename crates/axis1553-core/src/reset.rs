//! Shared reset discipline.
//!
//! Reset (`arstn`, active low) asserts asynchronously and releases after a
//! fixed settle time counted in clock ticks. Without clock edges the core
//! never leaves reset.

/// Reset state of the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetPhase {
    /// Held in reset. `settle` edges with reset released remain before ACTIVE.
    InReset { settle: u64 },
    /// Running.
    Active,
}

/// Reset synchronizer shared by both pipelines.
#[derive(Debug, Clone)]
pub struct ResetSync {
    phase: ResetPhase,
    settle_ticks: u64,
}

impl ResetSync {
    /// Create a synchronizer that starts in reset.
    pub fn new(settle_ticks: u64) -> Self {
        Self {
            phase: ResetPhase::InReset {
                settle: settle_ticks,
            },
            settle_ticks,
        }
    }

    /// Assert reset. Takes effect immediately, clock or not.
    pub fn assert(&mut self) {
        self.phase = ResetPhase::InReset {
            settle: self.settle_ticks,
        };
    }

    /// Advance one clock edge with reset released.
    ///
    /// Returns true on the edge that enters ACTIVE.
    pub fn clock(&mut self) -> bool {
        match self.phase {
            ResetPhase::Active => false,
            ResetPhase::InReset { settle } if settle <= 1 => {
                self.phase = ResetPhase::Active;
                true
            }
            ResetPhase::InReset { settle } => {
                self.phase = ResetPhase::InReset { settle: settle - 1 };
                false
            }
        }
    }

    pub fn phase(&self) -> ResetPhase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        self.phase == ResetPhase::Active
    }
}
