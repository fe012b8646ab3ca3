//! Bus traffic generator for the receive path.

use std::collections::VecDeque;

use axis1553_core::Timing;
use axis1553_line::LineLevel;
use axis1553_word::{encode_word, SyncKind};

/// Queues Manchester words and idle time, and plays them out one tick at a time.
#[derive(Debug, Clone)]
pub struct LineSource {
    half_bit: u64,
    queue: VecDeque<(LineLevel, u64)>,
}

impl LineSource {
    /// Create a source for a core with the given timing.
    pub fn new(timing: &Timing) -> Self {
        Self::with_half_bit(timing.half_bit)
    }

    /// Create a source that holds each half-bit for `half_bit` ticks.
    pub fn with_half_bit(half_bit: u64) -> Self {
        Self {
            half_bit,
            queue: VecDeque::new(),
        }
    }

    /// Queue a word with command sync.
    pub fn write_cmd(&mut self, word: u16) {
        self.write(word, SyncKind::Command);
    }

    /// Queue a word with data sync.
    pub fn write_data(&mut self, word: u16) {
        self.write(word, SyncKind::Data);
    }

    /// Queue a word with the given sync.
    pub fn write(&mut self, word: u16, sync: SyncKind) {
        for level in encode_word(word, sync) {
            self.push(level, self.half_bit);
        }
    }

    /// Queue `ticks` of idle line.
    pub fn idle_for(&mut self, ticks: u64) {
        self.push(LineLevel::Idle, ticks);
    }

    /// The level for the next tick. Idle once the queue runs dry.
    pub fn next_level(&mut self) -> LineLevel {
        let Some((level, remaining)) = self.queue.front_mut() else {
            return LineLevel::Idle;
        };
        let level = *level;
        *remaining -= 1;
        if *remaining == 0 {
            self.queue.pop_front();
        }
        level
    }

    /// Returns true when everything queued has been played out.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Ticks left to play out.
    pub fn remaining_ticks(&self) -> u64 {
        self.queue.iter().map(|(_, ticks)| ticks).sum()
    }

    fn push(&mut self, level: LineLevel, ticks: u64) {
        if ticks == 0 {
            return;
        }
        match self.queue.back_mut() {
            Some((last, run)) if *last == level => *run += ticks,
            _ => self.queue.push_back((level, ticks)),
        }
    }
}
