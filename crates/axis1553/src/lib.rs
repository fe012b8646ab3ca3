//! MIL-STD-1553 transceiver model with AXI-Stream word interfaces.
//!
//! # Crate Structure
//!
//! - [`line`]: Differential line levels, wires and traces
//! - [`word`]: Word tags, Manchester word codec and stream-word framing
//! - [`core`]: The clocked transceiver (reset, transmit, receive)
//! - [`loopback`]: Drives a transceiver with its transmit line wired to its receiver
//! - [`source`]: Generates bus traffic for the receive path

pub mod loopback;
pub mod source;

/// Re-export line types.
pub mod line {
    pub use axis1553_line::*;
}

/// Re-export word types.
pub mod word {
    pub use axis1553_word::*;
}

/// Re-export transceiver types.
pub mod core {
    pub use axis1553_core::*;
}

pub use loopback::{Loopback, LoopbackError, Reception};
pub use source::LineSource;
