/// Errors raised while validating or loading a [`CoreConfig`](crate::CoreConfig).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The clock cannot divide a 500 ns half-bit into whole ticks.
    #[error("clock {clock_hz} Hz is not a multiple of 2 MHz")]
    ClockNotMultiple { clock_hz: u64 },

    /// The clock is too slow to sample half-bit centres.
    #[error("clock {clock_hz} Hz is below the {min_hz} Hz minimum")]
    ClockTooSlow { clock_hz: u64, min_hz: u64 },

    /// The inter-word gap must be non-zero.
    #[error("inter-word gap must be greater than zero")]
    ZeroGap,

    /// A requested transmit delay must not undercut the gap floor.
    #[error("transmit delay {delay_ns} ns is shorter than the {gap_ns} ns gap")]
    DelayBelowGap { delay_ns: u64, gap_ns: u64 },

    /// A duration does not fit in a tick count at this clock.
    #[error("{field} is too large for a {clock_hz} Hz clock")]
    OutOfRange { field: &'static str, clock_hz: u64 },

    /// The receive buffer needs at least one entry.
    #[error("receive FIFO depth must be at least 1")]
    ZeroFifoDepth,

    /// The configuration document could not be parsed.
    #[error("invalid configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Errors that can occur in transceiver operations.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Configuration error.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// Word-level error.
    #[error("word error: {0}")]
    Word(#[from] axis1553_word::WordError),
}

pub type Result<T> = std::result::Result<T, CoreError>;
