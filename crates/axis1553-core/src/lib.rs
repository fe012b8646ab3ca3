//! Clocked MIL-STD-1553 transceiver model.
//!
//! A [`Transceiver`] is advanced one rising clock edge at a time by
//! [`Transceiver::step`]. It owns two independent pipelines that share one
//! reset discipline:
//! - the transmit path takes tagged 16-bit words from a ready/valid input
//!   and serializes them onto `tx_diff`, enforcing the inter-word gap;
//! - the receive path watches `rx_diff`, decodes words, classifies them by
//!   sync type and gap, and offers them on a ready/valid output.

pub mod config;
pub mod error;
pub mod reset;
pub mod rx;
pub mod transceiver;
pub mod tx;

pub use config::{CoreConfig, Timing};
pub use error::{ConfigError, CoreError, Result};
pub use reset::{ResetPhase, ResetSync};
pub use transceiver::{CoreStats, Inputs, Outputs, Transceiver, Transfers};
