use serde::{Deserialize, Serialize};

use axis1553_word::HALF_BITS_PER_WORD;

use crate::error::ConfigError;

/// Half-bit rate of a 1 Mbit/s Manchester line.
pub const HALF_BIT_RATE_HZ: u64 = 2_000_000;

/// Slowest clock that still places a sample strictly inside each half-bit.
pub const MIN_CLOCK_HZ: u64 = 2 * HALF_BIT_RATE_HZ;

const NS_PER_SECOND: u64 = 1_000_000_000;

/// Transceiver parameters.
///
/// Durations are in nanoseconds and are converted to clock ticks rounding
/// up, so every timed interval lasts at least its nominal duration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CoreConfig {
    /// Core clock frequency. Must be a multiple of 2 MHz. Default: 20 MHz.
    pub clock_hz: u64,
    /// Settle time from reset deassertion to ACTIVE. Default: 200 ns.
    pub reset_settle_ns: u64,
    /// Minimum inter-word gap. Default: 4 µs.
    pub gap_ns: u64,
    /// Hold applied before a word whose tag requests a delay. Default: 4 µs.
    pub tx_delay_ns: u64,
    /// Receive buffer depth while hold-enable is set. Default: 16.
    pub rx_fifo_depth: usize,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            clock_hz: 20_000_000,
            reset_settle_ns: 200,
            gap_ns: 4_000,
            tx_delay_ns: 4_000,
            rx_fifo_depth: 16,
        }
    }
}

impl CoreConfig {
    /// Parse a JSON configuration document. Missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Check the parameters and derive tick counts.
    pub fn timing(&self) -> Result<Timing, ConfigError> {
        if self.clock_hz % HALF_BIT_RATE_HZ != 0 {
            return Err(ConfigError::ClockNotMultiple {
                clock_hz: self.clock_hz,
            });
        }
        if self.clock_hz < MIN_CLOCK_HZ {
            return Err(ConfigError::ClockTooSlow {
                clock_hz: self.clock_hz,
                min_hz: MIN_CLOCK_HZ,
            });
        }
        if self.gap_ns == 0 {
            return Err(ConfigError::ZeroGap);
        }
        if self.tx_delay_ns < self.gap_ns {
            return Err(ConfigError::DelayBelowGap {
                delay_ns: self.tx_delay_ns,
                gap_ns: self.gap_ns,
            });
        }
        if self.rx_fifo_depth == 0 {
            return Err(ConfigError::ZeroFifoDepth);
        }

        let half_bit = self.clock_hz / HALF_BIT_RATE_HZ;
        Ok(Timing {
            clock_hz: self.clock_hz,
            half_bit,
            word: half_bit * HALF_BITS_PER_WORD as u64,
            gap: self.ns_to_ticks("gap_ns", self.gap_ns)?,
            tx_delay: self.ns_to_ticks("tx_delay_ns", self.tx_delay_ns)?,
            reset_settle: self.ns_to_ticks("reset_settle_ns", self.reset_settle_ns)?,
        })
    }

    fn ns_to_ticks(&self, field: &'static str, ns: u64) -> Result<u64, ConfigError> {
        ns.checked_mul(self.clock_hz)
            .map(|product| product.div_ceil(NS_PER_SECOND))
            .ok_or(ConfigError::OutOfRange {
                field,
                clock_hz: self.clock_hz,
            })
    }
}

/// Tick counts derived from a validated [`CoreConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    pub clock_hz: u64,
    /// Ticks per half-bit (500 ns).
    pub half_bit: u64,
    /// Ticks per bus word (20 µs).
    pub word: u64,
    pub gap: u64,
    pub tx_delay: u64,
    pub reset_settle: u64,
}

impl Timing {
    /// Convert a tick count to nanoseconds, saturating at `u64::MAX`.
    pub fn ticks_to_ns(&self, ticks: u64) -> u64 {
        let ns = u128::from(ticks) * u128::from(NS_PER_SECOND) / u128::from(self.clock_hz);
        u64::try_from(ns).unwrap_or(u64::MAX)
    }
}
