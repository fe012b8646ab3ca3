//! Word type tags carried on the stream `tuser` side channel.
//!
//! Bits [2:0] select the sync pattern, bit 3 is the delay bit and bit 4 is
//! reserved. On the transmit input the delay bit requests an inserted delay
//! before the word; on the receive output it reports that at least the
//! minimum inter-word gap preceded the word.

use std::fmt;

use axis1553_line::LineLevel;
use serde::Serialize;

use crate::error::{Result, WordError};

/// Command/status sync code.
pub const SYNC_COMMAND: u8 = 0b100;

/// Data sync code.
pub const SYNC_DATA: u8 = 0b010;

/// Mask of the sync code bits.
pub const SYNC_MASK: u8 = 0b111;

/// Delay request (transmit) / gap observed (receive).
pub const DELAY: u8 = 0b1000;

/// Reserved, always zero on output.
pub const RESERVED: u8 = 0b1_0000;

/// Sync pattern of a bus word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncKind {
    /// Positive then negative: command (and status) words.
    Command,
    /// Negative then positive: data words.
    Data,
}

impl SyncKind {
    /// Decode a 3-bit sync code.
    pub fn from_code(code: u8) -> Result<Self> {
        match code & SYNC_MASK {
            SYNC_COMMAND => Ok(Self::Command),
            SYNC_DATA => Ok(Self::Data),
            other => Err(WordError::InvalidSync(other)),
        }
    }

    /// The 3-bit sync code.
    pub fn code(self) -> u8 {
        match self {
            Self::Command => SYNC_COMMAND,
            Self::Data => SYNC_DATA,
        }
    }

    /// Level of the first 1.5 bit times of the sync.
    pub fn leading_level(self) -> LineLevel {
        match self {
            Self::Command => LineLevel::Positive,
            Self::Data => LineLevel::Negative,
        }
    }

    /// Identify a sync by the level of its first half.
    pub fn from_leading_level(level: LineLevel) -> Option<Self> {
        match level {
            LineLevel::Positive => Some(Self::Command),
            LineLevel::Negative => Some(Self::Data),
            LineLevel::Idle => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Command => "COMMAND",
            Self::Data => "DATA",
        }
    }
}

impl fmt::Display for SyncKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A decoded `tuser` tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Tag {
    /// Sync pattern of the word.
    pub sync: SyncKind,
    /// Delay bit (bit 3).
    pub delay: bool,
}

impl Tag {
    pub fn new(sync: SyncKind, delay: bool) -> Self {
        Self { sync, delay }
    }

    pub fn command() -> Self {
        Self::new(SyncKind::Command, false)
    }

    pub fn data() -> Self {
        Self::new(SyncKind::Data, false)
    }

    /// Decode a `tuser` value. The reserved bit is ignored.
    pub fn from_bits(bits: u8) -> Result<Self> {
        Ok(Self {
            sync: SyncKind::from_code(bits)?,
            delay: bits & DELAY != 0,
        })
    }

    /// Encode as a 5-bit `tuser` value with the reserved bit clear.
    pub fn bits(self) -> u8 {
        let delay = if self.delay { DELAY } else { 0 };
        self.sync.code() | delay
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:05b}", self.bits())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn testbench_tags() {
        assert_eq!(Tag::from_bits(0x4).unwrap(), Tag::command());
        assert_eq!(Tag::from_bits(0x2).unwrap(), Tag::data());

        let delayed = Tag::from_bits(0xA).unwrap();
        assert_eq!(delayed.sync, SyncKind::Data);
        assert!(delayed.delay);

        let delayed_cmd = Tag::from_bits(0xC).unwrap();
        assert_eq!(delayed_cmd.sync, SyncKind::Command);
        assert!(delayed_cmd.delay);
    }

    #[test]
    fn display_matches_five_bit_binary() {
        assert_eq!(Tag::command().to_string(), "00100");
        assert_eq!(Tag::new(SyncKind::Data, true).to_string(), "01010");
    }

    #[test]
    fn reserved_bit_is_ignored_and_never_emitted() {
        let tag = Tag::from_bits(RESERVED | SYNC_COMMAND).unwrap();
        assert_eq!(tag.bits(), SYNC_COMMAND);
    }

    #[test]
    fn undeterminable_sync_is_rejected() {
        for code in [0b000, 0b001, 0b011, 0b101, 0b110, 0b111] {
            assert!(matches!(
                Tag::from_bits(code),
                Err(WordError::InvalidSync(c)) if c == code
            ));
        }
    }

    #[test]
    fn leading_levels() {
        assert_eq!(SyncKind::Command.leading_level(), LineLevel::Positive);
        assert_eq!(SyncKind::Data.leading_level(), LineLevel::Negative);
        assert_eq!(SyncKind::from_leading_level(LineLevel::Idle), None);
    }
}
