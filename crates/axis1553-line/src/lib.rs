//! Differential bus line abstraction for MIL-STD-1553.
//!
//! The line is modelled as a 2-bit differential vector (`[1:0]`, bit 1 the
//! positive leg, bit 0 the negative leg), sampled once per core clock tick:
//! - [`LineLevel`]: one sample of the line
//! - [`Wire`]: a point-to-point link from a driver to an observer
//! - [`LineTrace`]: human-readable half-bit traces (`+`, `-`, `.`)
//!
//! This is the lowest layer of axis1553. Everything else builds on the
//! [`LineLevel`] type provided here.

pub mod error;
pub mod level;
pub mod trace;
pub mod wire;

pub use error::{LineError, Result};
pub use level::LineLevel;
pub use trace::LineTrace;
pub use wire::Wire;
