//! Loopback driver.
//!
//! Wires a transceiver's transmit line straight back into its receiver and
//! runs the clock until every queued word has made the round trip.

use std::collections::VecDeque;

use axis1553_core::{CoreConfig, CoreError, Inputs, Transceiver};
use axis1553_line::Wire;
use axis1553_word::StreamWord;
use serde::Serialize;
use tracing::{debug, info};

/// Errors from driving a loopback.
#[derive(Debug, thiserror::Error)]
pub enum LoopbackError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("loopback did not go idle within {ticks} ticks ({pending} words outstanding)")]
    Timeout { ticks: u64, pending: usize },
}

pub type Result<T> = std::result::Result<T, LoopbackError>;

/// A word that came back through the receive path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Reception {
    pub word: StreamWord,
    /// Edge at which `tx_active` rose for the matching transmitted word.
    pub tx_start_tick: Option<u64>,
    /// Edge at which the receive consumer took the word.
    pub delivered_tick: u64,
}

/// A transceiver with `tx_diff` connected to `rx_diff`.
#[derive(Debug)]
pub struct Loopback {
    core: Transceiver,
    wire: Wire,
    hold_en: bool,
    pending: VecDeque<StreamWord>,
    accepted_ticks: VecDeque<u64>,
    starts: VecDeque<u64>,
    received: Vec<Reception>,
    tx_was_active: bool,
}

impl Loopback {
    /// Create a loopback over a direct wire. The core starts in reset.
    pub fn new(config: CoreConfig) -> Result<Self> {
        Self::with_latency(config, 0)
    }

    /// Create a loopback whose wire delays the line by `latency` ticks.
    pub fn with_latency(config: CoreConfig, latency: usize) -> Result<Self> {
        Ok(Self {
            core: Transceiver::new(config)?,
            wire: Wire::with_latency(latency),
            hold_en: true,
            pending: VecDeque::new(),
            accepted_ticks: VecDeque::new(),
            starts: VecDeque::new(),
            received: Vec::new(),
            tx_was_active: false,
        })
    }

    /// Hold reset for the settle time, then release it and clock until active.
    pub fn reset(&mut self) {
        let settle = self.core.timing().reset_settle.max(1);
        let held = Inputs {
            rx_hold_en: self.hold_en,
            ..Inputs::default()
        };
        for _ in 0..settle {
            self.core.step(&held);
        }
        self.wire.reset();
        self.pending.clear();
        self.accepted_ticks.clear();
        self.starts.clear();
        self.tx_was_active = false;

        let running = Inputs {
            rx_hold_en: self.hold_en,
            ..Inputs::running()
        };
        while !self.core.is_active() {
            self.core.step(&running);
        }
        debug!(tick = self.core.now(), "loopback reset complete");
    }

    /// Queue a word for transmission.
    pub fn queue(&mut self, word: StreamWord) {
        self.pending.push_back(word);
    }

    /// Set the receive hold-enable input.
    pub fn set_hold_enable(&mut self, hold_en: bool) {
        self.hold_en = hold_en;
    }

    /// Advance one clock edge.
    pub fn step(&mut self) {
        let before = self.core.outputs();
        self.wire.drive(before.tx_diff);

        let inputs = Inputs {
            reset_n: true,
            s_axis: self.pending.front().copied(),
            m_axis_ready: true,
            rx_diff: self.wire.sample(),
            rx_hold_en: self.hold_en,
        };
        let transfers = self.core.step(&inputs);
        let now = self.core.now();

        if transfers.accepted.is_some() {
            self.pending.pop_front();
            self.accepted_ticks.push_back(now);
        }

        let tx_active = self.core.outputs().tx_active;
        if tx_active && !self.tx_was_active {
            self.starts.push_back(now);
        }
        self.tx_was_active = tx_active;

        if let Some(word) = transfers.delivered {
            self.accepted_ticks.pop_front();
            self.received.push(Reception {
                word,
                tx_start_tick: self.starts.pop_front(),
                delivered_tick: now,
            });
        }
    }

    /// Clock until every queued word has been sent and received.
    pub fn run_until_idle(&mut self, max_ticks: u64) -> Result<()> {
        for _ in 0..max_ticks {
            if self.is_idle() {
                return Ok(());
            }
            self.step();
        }
        if self.is_idle() {
            return Ok(());
        }
        Err(LoopbackError::Timeout {
            ticks: max_ticks,
            pending: self.pending.len() + self.accepted_ticks.len(),
        })
    }

    /// Queue `words`, run them through, and return what came back.
    pub fn transfer(&mut self, words: &[StreamWord], max_ticks: u64) -> Result<&[Reception]> {
        let first = self.received.len();
        words.iter().for_each(|word| self.queue(*word));
        self.run_until_idle(max_ticks)?;
        info!(
            sent = words.len(),
            received = self.received.len() - first,
            "loopback transfer complete"
        );
        Ok(&self.received[first..])
    }

    fn is_idle(&self) -> bool {
        let outputs = self.core.outputs();
        self.pending.is_empty()
            && self.accepted_ticks.is_empty()
            && outputs.s_axis_tready
            && self.core.rx_buffered() == 0
    }

    /// Everything received so far.
    pub fn received(&self) -> &[Reception] {
        &self.received
    }

    /// Edges at which words were accepted but not yet received.
    pub fn in_flight(&self) -> usize {
        self.accepted_ticks.len()
    }

    pub fn core(&self) -> &Transceiver {
        &self.core
    }

    pub fn core_mut(&mut self) -> &mut Transceiver {
        &mut self.core
    }
}

#[cfg(test)]
mod tests {
    use axis1553_word::Tag;

    use super::*;

    fn loopback() -> Loopback {
        let mut lb = Loopback::new(CoreConfig::default()).unwrap();
        lb.reset();
        lb
    }

    #[test]
    fn reset_brings_core_up() {
        let lb = loopback();
        assert!(lb.core().is_active());
        assert!(lb.core().outputs().s_axis_tready);
    }

    #[test]
    fn single_word_round_trip() {
        let mut lb = loopback();
        let sent = StreamWord::new(0xBEEF, Tag::command());
        let got = lb.transfer(&[sent], 2_000).unwrap();
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].word.data, 0xBEEF);
        assert!(got[0].tx_start_tick.is_some());
        assert!(got[0].delivered_tick > got[0].tx_start_tick.unwrap());
        assert_eq!(lb.core().stats().rx_words, 1);
    }

    #[test]
    fn latency_does_not_change_words() {
        let mut lb = Loopback::with_latency(CoreConfig::default(), 7).unwrap();
        lb.reset();
        let words = [
            StreamWord::new(0x0001, Tag::command()),
            StreamWord::new(0x8000, Tag::data()),
        ];
        let got: Vec<u16> = lb
            .transfer(&words, 5_000)
            .unwrap()
            .iter()
            .map(|r| r.word.data)
            .collect();
        assert_eq!(got, vec![0x0001, 0x8000]);
    }

    #[test]
    fn times_out_without_enough_ticks() {
        let mut lb = loopback();
        lb.queue(StreamWord::new(1, Tag::data()));
        let err = lb.run_until_idle(100).unwrap_err();
        assert!(matches!(err, LoopbackError::Timeout { ticks: 100, pending: 1 }));
    }
}
