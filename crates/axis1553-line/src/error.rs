/// Errors that can occur when interpreting line samples.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum LineError {
    /// Both legs of the differential pair are driven at once.
    #[error("invalid differential level 0b{0:02b}")]
    InvalidLevel(u8),

    /// A trace string contains a character that is not a line symbol.
    #[error("invalid line symbol {symbol:?} at position {position}")]
    InvalidSymbol { symbol: char, position: usize },
}

pub type Result<T> = std::result::Result<T, LineError>;
