use axis1553_line::LineLevel;
use bytes::{Buf, BufMut, BytesMut};
use serde::Serialize;

use crate::error::{Result, WordError};
use crate::tag::{SyncKind, Tag};

/// Sync: 3 bit times = 6 half-bits.
pub const SYNC_HALF_BITS: usize = 6;

/// Data bits per word.
pub const DATA_BITS: usize = 16;

/// Sync + 16 data bits + parity = 20 bit times = 40 half-bits.
pub const HALF_BITS_PER_WORD: usize = SYNC_HALF_BITS + (DATA_BITS + 1) * 2;

/// Stream word: tdata (2) + tuser (1) = 3 bytes.
pub const STREAM_WORD_SIZE: usize = 3;

/// A word crossing the streaming boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StreamWord {
    /// The 16-bit payload (`tdata`).
    pub data: u16,
    /// The type tag (`tuser`).
    pub tag: Tag,
}

impl StreamWord {
    /// Create a new stream word.
    pub fn new(data: u16, tag: Tag) -> Self {
        Self { data, tag }
    }

    /// Create a stream word from raw `tdata` bytes and a `tuser` value.
    pub fn from_raw(tdata: [u8; 2], tuser: u8) -> Result<Self> {
        Ok(Self {
            data: u16::from_le_bytes(tdata),
            tag: Tag::from_bits(tuser)?,
        })
    }

    /// The `tdata` bytes, little-endian.
    pub fn tdata(&self) -> [u8; 2] {
        self.data.to_le_bytes()
    }
}

/// Odd parity bit over the 16 data bits.
pub fn parity_bit(word: u16) -> bool {
    word.count_ones() % 2 == 0
}

fn manchester(bit: bool) -> [LineLevel; 2] {
    if bit {
        [LineLevel::Positive, LineLevel::Negative]
    } else {
        [LineLevel::Negative, LineLevel::Positive]
    }
}

/// Encode a word into its 40 half-bit bus levels.
///
/// Bus format (one symbol per half-bit, 500 ns each):
/// ```text
/// ┌──────────────────┬─────────────────────────────┬────────────┐
/// │ Sync (6)         │ Data bits 15..0 (32)        │ Parity (2) │
/// │ cmd  +++---      │ 1 = +-   0 = -+             │ odd        │
/// │ data ---+++      │                             │            │
/// └──────────────────┴─────────────────────────────┴────────────┘
/// ```
pub fn encode_word(word: u16, sync: SyncKind) -> [LineLevel; HALF_BITS_PER_WORD] {
    let mut levels = [LineLevel::Idle; HALF_BITS_PER_WORD];
    let lead = sync.leading_level();
    levels[..3].fill(lead);
    levels[3..SYNC_HALF_BITS].fill(lead.opposite());

    let bits = (0..DATA_BITS)
        .rev()
        .map(|i| word & (1 << i) != 0)
        .chain(std::iter::once(parity_bit(word)));
    for (i, bit) in bits.enumerate() {
        let at = SYNC_HALF_BITS + i * 2;
        levels[at..at + 2].copy_from_slice(&manchester(bit));
    }
    levels
}

/// Decode 40 half-bit bus levels into a sync kind and word.
pub fn decode_word(levels: &[LineLevel]) -> Result<(SyncKind, u16)> {
    if levels.len() != HALF_BITS_PER_WORD {
        return Err(WordError::Length { len: levels.len() });
    }

    let sync = SyncKind::from_leading_level(levels[0]).ok_or(WordError::MissingSync)?;
    let lead = sync.leading_level();
    let sync_ok = levels[..3].iter().all(|l| *l == lead)
        && levels[3..SYNC_HALF_BITS].iter().all(|l| *l == lead.opposite());
    if !sync_ok {
        return Err(WordError::MissingSync);
    }

    let mut word = 0u16;
    let mut parity = false;
    for bit_index in 0..=DATA_BITS {
        let at = SYNC_HALF_BITS + bit_index * 2;
        let bit = manchester_bit(levels[at], levels[at + 1])
            .ok_or(WordError::Manchester { half_bit: at })?;
        if bit_index < DATA_BITS {
            word = (word << 1) | u16::from(bit);
        } else {
            parity = bit;
        }
    }

    if parity != parity_bit(word) {
        return Err(WordError::Parity { word });
    }
    Ok((sync, word))
}

/// Decode one bit from its two half-bit levels.
pub fn manchester_bit(first: LineLevel, second: LineLevel) -> Option<bool> {
    match (first, second) {
        (LineLevel::Positive, LineLevel::Negative) => Some(true),
        (LineLevel::Negative, LineLevel::Positive) => Some(false),
        _ => None,
    }
}

/// Encode a stream word into the byte format.
///
/// Byte format:
/// ```text
/// ┌───────────────┬──────────┐
/// │ tdata (2B LE) │ tuser    │
/// └───────────────┴──────────┘
/// ```
pub fn encode_stream_word(word: &StreamWord, dst: &mut BytesMut) {
    dst.reserve(STREAM_WORD_SIZE);
    dst.put_u16_le(word.data);
    dst.put_u8(word.tag.bits());
}

/// Decode a stream word from a buffer.
///
/// Returns `Ok(None)` if the buffer doesn't contain a complete word yet.
/// On success, consumes the word bytes from the buffer.
pub fn decode_stream_word(src: &mut BytesMut) -> Result<Option<StreamWord>> {
    if src.len() < STREAM_WORD_SIZE {
        return Ok(None);
    }

    let tag = Tag::from_bits(src[2])?;
    let data = src.get_u16_le();
    src.advance(1);
    Ok(Some(StreamWord { data, tag }))
}
