/// Errors that can occur during word encoding/decoding.
#[derive(Debug, thiserror::Error)]
pub enum WordError {
    /// The tag's sync code is neither command (`100`) nor data (`010`).
    #[error("invalid sync code 0b{0:03b} (expected 0b100 command or 0b010 data)")]
    InvalidSync(u8),

    /// The line does not carry a sync pattern where one is expected.
    #[error("no sync pattern at start of word")]
    MissingSync,

    /// Two halves of a bit period are not opposite levels.
    #[error("manchester violation at half-bit {half_bit}")]
    Manchester { half_bit: usize },

    /// The received parity bit does not give odd parity.
    #[error("parity error in word 0x{word:04X}")]
    Parity { word: u16 },

    /// A bus trace does not contain exactly one word.
    #[error("bus word must be 40 half-bits, got {len}")]
    Length { len: usize },

    /// An I/O error occurred while reading or writing stream words.
    #[error("stream I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The stream ended before a complete word was received.
    #[error("stream closed (incomplete word)")]
    StreamClosed,
}

pub type Result<T> = std::result::Result<T, WordError>;
