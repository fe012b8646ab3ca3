//! Transmit path: stream words in, Manchester words out on `tx_diff`.

use axis1553_line::LineLevel;
use axis1553_word::{encode_word, StreamWord, HALF_BITS_PER_WORD};
use tracing::debug;

use crate::config::Timing;
use crate::transceiver::CoreStats;

#[derive(Debug, Clone)]
enum TxState {
    /// Idle, input ready.
    Ready,
    /// Word accepted with the delay bit set; held until `until`.
    Delaying { word: StreamWord, until: u64 },
    /// Driving the word onto the line since edge `started`.
    Sending {
        word: StreamWord,
        levels: [LineLevel; HALF_BITS_PER_WORD],
        started: u64,
    },
    /// Waiting out the inter-word gap.
    Gap { until: u64 },
}

/// Transmit pipeline.
#[derive(Debug, Clone)]
pub struct TxPath {
    state: TxState,
    timing: Timing,
}

impl TxPath {
    pub fn new(timing: Timing) -> Self {
        Self {
            state: TxState::Ready,
            timing,
        }
    }

    /// Input ready: only when idle with the gap satisfied.
    pub fn ready(&self) -> bool {
        matches!(self.state, TxState::Ready)
    }

    /// Bus active: high for exactly the duration of one word.
    pub fn active(&self) -> bool {
        matches!(self.state, TxState::Sending { .. })
    }

    /// The level driven at edge `now`.
    pub fn line(&self, now: u64) -> LineLevel {
        match &self.state {
            TxState::Sending {
                levels, started, ..
            } => {
                let half_bit = ((now - started) / self.timing.half_bit) as usize;
                levels.get(half_bit).copied().unwrap_or_default()
            }
            _ => LineLevel::Idle,
        }
    }

    /// Abandon any in-flight word and forget the previous word's timing.
    pub fn abort(&mut self) {
        if !matches!(self.state, TxState::Ready | TxState::Gap { .. }) {
            debug!("transmit word abandoned by reset");
        }
        self.state = TxState::Ready;
    }

    /// Advance one clock edge. `accepted` is the word handed over at this edge.
    pub fn clock(&mut self, now: u64, accepted: Option<StreamWord>, stats: &mut CoreStats) {
        self.state = match std::mem::replace(&mut self.state, TxState::Ready) {
            TxState::Ready => match accepted {
                Some(word) if word.tag.delay => TxState::Delaying {
                    word,
                    until: now + self.timing.tx_delay,
                },
                Some(word) => self.start(word, now),
                None => TxState::Ready,
            },
            TxState::Delaying { word, until } if now >= until => self.start(word, now),
            TxState::Sending { word, started, .. } if now - started >= self.timing.word => {
                stats.tx_words += 1;
                debug!(data = word.data, sync = %word.tag.sync, "transmit word complete");
                TxState::Gap {
                    until: now + self.timing.gap,
                }
            }
            TxState::Gap { until } if now >= until => TxState::Ready,
            other => other,
        };
    }

    fn start(&self, word: StreamWord, now: u64) -> TxState {
        debug!(data = word.data, sync = %word.tag.sync, "transmit word start");
        TxState::Sending {
            word,
            levels: encode_word(word.data, word.tag.sync),
            started: now,
        }
    }
}
