use std::fmt;
use std::str::FromStr;

use crate::error::LineError;
use crate::level::LineLevel;

/// A sequence of line levels, one per half-bit period.
///
/// Renders as a compact symbol string, e.g. a command sync is `+++---`.
/// Parsing ignores whitespace, `_` and `|`, which may be used to group
/// half-bits for readability.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineTrace {
    levels: Vec<LineLevel>,
}

impl LineTrace {
    /// Create an empty trace.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a trace from half-bit levels.
    pub fn from_levels(levels: impl IntoIterator<Item = LineLevel>) -> Self {
        Self {
            levels: levels.into_iter().collect(),
        }
    }

    /// Append one half-bit.
    pub fn push(&mut self, level: LineLevel) {
        self.levels.push(level);
    }

    /// The recorded half-bit levels.
    pub fn levels(&self) -> &[LineLevel] {
        &self.levels
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

impl fmt::Display for LineTrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for level in &self.levels {
            write!(f, "{}", level.symbol())?;
        }
        Ok(())
    }
}

impl FromStr for LineTrace {
    type Err = LineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut levels = Vec::with_capacity(s.len());
        for (position, symbol) in s.chars().enumerate() {
            if symbol.is_whitespace() || symbol == '_' || symbol == '|' {
                continue;
            }
            let level = LineLevel::from_symbol(symbol)
                .ok_or(LineError::InvalidSymbol { symbol, position })?;
            levels.push(level);
        }
        Ok(Self { levels })
    }
}
