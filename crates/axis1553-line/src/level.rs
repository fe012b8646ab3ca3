//! Differential line levels.
//!
//! The encoding matches the `tx_diff` / `rx_diff` vectors of the core:
//! `0b10` positive, `0b01` negative, `0b00` idle (undriven bus).

use serde::{Deserialize, Serialize};

use crate::error::{LineError, Result};

/// Positive leg driven, negative leg released.
pub const DIFF_POSITIVE: u8 = 0b10;

/// Negative leg driven, positive leg released.
pub const DIFF_NEGATIVE: u8 = 0b01;

/// Neither leg driven.
pub const DIFF_IDLE: u8 = 0b00;

/// One sample of the differential bus line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineLevel {
    /// Bus not driven.
    #[default]
    Idle,
    /// Positive differential voltage.
    Positive,
    /// Negative differential voltage.
    Negative,
}

impl LineLevel {
    /// Decode a 2-bit differential vector.
    pub fn from_bits(bits: u8) -> Result<Self> {
        match bits {
            DIFF_IDLE => Ok(Self::Idle),
            DIFF_POSITIVE => Ok(Self::Positive),
            DIFF_NEGATIVE => Ok(Self::Negative),
            other => Err(LineError::InvalidLevel(other)),
        }
    }

    /// The 2-bit differential vector for this level.
    pub fn bits(self) -> u8 {
        match self {
            Self::Idle => DIFF_IDLE,
            Self::Positive => DIFF_POSITIVE,
            Self::Negative => DIFF_NEGATIVE,
        }
    }

    /// The opposite driven level. Idle stays idle.
    pub fn opposite(self) -> Self {
        match self {
            Self::Idle => Self::Idle,
            Self::Positive => Self::Negative,
            Self::Negative => Self::Positive,
        }
    }

    /// Returns true if either leg is driven.
    pub fn is_driven(self) -> bool {
        self != Self::Idle
    }

    /// Trace symbol for this level.
    pub fn symbol(self) -> char {
        match self {
            Self::Idle => '.',
            Self::Positive => '+',
            Self::Negative => '-',
        }
    }

    /// Parse a trace symbol.
    pub fn from_symbol(symbol: char) -> Option<Self> {
        match symbol {
            '.' => Some(Self::Idle),
            '+' => Some(Self::Positive),
            '-' => Some(Self::Negative),
            _ => None,
        }
    }
}
