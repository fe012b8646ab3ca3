//! MIL-STD-1553 word codec and streaming-boundary framing.
//!
//! Two encodings live here:
//! - The bus encoding: a 3 bit-time sync (command or data), 16 Manchester II
//!   data bits MSB first and an odd parity bit, 40 half-bits in total.
//! - The stream encoding: `tdata` (2 bytes little-endian) followed by the
//!   5-bit `tuser` type tag, one stream word per bus word.

pub mod codec;
pub mod error;
pub mod reader;
pub mod tag;
pub mod writer;

pub use codec::{
    decode_stream_word, decode_word, encode_stream_word, encode_word, manchester_bit, parity_bit,
    StreamWord, DATA_BITS, HALF_BITS_PER_WORD, STREAM_WORD_SIZE, SYNC_HALF_BITS,
};
pub use error::{Result, WordError};
pub use reader::StreamWordReader;
pub use tag::{SyncKind, Tag, DELAY, RESERVED, SYNC_COMMAND, SYNC_DATA, SYNC_MASK};
pub use writer::StreamWordWriter;
