//! Receive path: Manchester words in from `rx_diff`, stream words out.
//!
//! Sync detection looks for the mid-sync zero crossing: a driven run of
//! 2.5 to 4.5 half-bit times followed by the opposite level. Manchester data
//! never holds a level for more than two half-bits, so data cannot be taken
//! for a sync. The upper bound admits a sync whose leading half merges with
//! the last half-bit of a back-to-back previous word.
//!
//! Once a sync is found every sample instant is fixed relative to the
//! crossing, at half-bit centres. Any mismatch discards the word and returns
//! the decoder to sync hunt.

use std::collections::VecDeque;

use axis1553_line::LineLevel;
use axis1553_word::{
    manchester_bit, parity_bit, StreamWord, SyncKind, Tag, WordError, DATA_BITS,
    HALF_BITS_PER_WORD, SYNC_HALF_BITS,
};
use tracing::{debug, warn};

use crate::config::Timing;
use crate::transceiver::CoreStats;

/// Half-bits after the mid-sync crossing: second sync half plus data and parity.
const HALF_BITS_AFTER_CROSSING: u64 = (HALF_BITS_PER_WORD - SYNC_HALF_BITS / 2) as u64;

/// A completed run of one line level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Run {
    level: LineLevel,
    ticks: u64,
    /// Last tick the line was driven before this run began.
    driven_before: Option<u64>,
}

/// Measures how long the line has held its current level and when it was
/// last driven, whether or not that activity decoded as a word.
#[derive(Debug, Clone, Default)]
struct LineTracker {
    level: LineLevel,
    ticks: u64,
    driven_before: Option<u64>,
    last_driven: Option<u64>,
}

impl LineTracker {
    /// Record the sample at `now`. Returns the run that ended if the level changed.
    fn sample(&mut self, now: u64, level: LineLevel) -> Option<Run> {
        let ended = if level == self.level {
            self.ticks += 1;
            None
        } else {
            let ended = Run {
                level: self.level,
                ticks: self.ticks,
                driven_before: self.driven_before,
            };
            self.driven_before = self.last_driven;
            self.level = level;
            self.ticks = 1;
            Some(ended)
        };
        if level.is_driven() {
            self.last_driven = Some(now);
        }
        ended
    }
}

#[derive(Debug, Clone)]
enum RxState {
    /// Searching for a sync crossing.
    Hunt,
    /// Decoding a word whose mid-sync crossing was sampled at `crossing`.
    Word {
        sync: SyncKind,
        crossing: u64,
        gap: bool,
        first_half: LineLevel,
        data: u16,
        bits: usize,
    },
}

enum Progress {
    Pending,
    Done(u16),
    Failed(WordError),
}

/// Receive pipeline.
#[derive(Debug, Clone)]
pub struct RxPath {
    state: RxState,
    tracker: LineTracker,
    output: VecDeque<StreamWord>,
    timing: Timing,
    fifo_depth: usize,
}

impl RxPath {
    pub fn new(timing: Timing, fifo_depth: usize) -> Self {
        Self {
            state: RxState::Hunt,
            tracker: LineTracker::default(),
            output: VecDeque::with_capacity(fifo_depth),
            timing,
            fifo_depth,
        }
    }

    /// Head of the output buffer (valid + data).
    pub fn output(&self) -> Option<StreamWord> {
        self.output.front().copied()
    }

    /// Words waiting for the consumer.
    pub fn buffered(&self) -> usize {
        self.output.len()
    }

    /// Abandon any partial word, drop buffered words and forget gap history.
    pub fn abort(&mut self) {
        if matches!(self.state, RxState::Word { .. }) {
            debug!("receive word abandoned by reset");
        }
        self.state = RxState::Hunt;
        self.tracker = LineTracker::default();
        self.output.clear();
    }

    /// Advance one clock edge.
    ///
    /// `level` is the `rx_diff` sample at this edge and `delivered` tells
    /// whether the consumer took the head word at this edge.
    pub fn clock(
        &mut self,
        now: u64,
        level: LineLevel,
        delivered: bool,
        hold_en: bool,
        stats: &mut CoreStats,
    ) {
        if delivered {
            self.output.pop_front();
        }

        let ended = self.tracker.sample(now, level);

        if let RxState::Word { .. } = self.state {
            match self.advance(now, level) {
                Progress::Pending => {}
                Progress::Done(data) => {
                    self.complete(data, hold_en, stats);
                    self.state = RxState::Hunt;
                }
                Progress::Failed(err) => {
                    match err {
                        WordError::Parity { .. } => stats.rx_parity_errors += 1,
                        _ => stats.rx_framing_errors += 1,
                    }
                    warn!(error = %err, "receive word discarded, resynchronizing");
                    self.state = RxState::Hunt;
                }
            }
        }

        if matches!(self.state, RxState::Hunt) {
            let found = ended.and_then(|run| Some((run, self.sync_crossing(run, level)?)));
            if let Some((run, sync)) = found {
                self.state = RxState::Word {
                    sync,
                    crossing: now,
                    gap: self.gap_before(now, run),
                    first_half: LineLevel::Idle,
                    data: 0,
                    bits: 0,
                };
            }
        }
    }

    /// A sync crossing ends a driven run of 2.5..=4.5 half-bits with the opposite level.
    fn sync_crossing(&self, run: Run, level: LineLevel) -> Option<SyncKind> {
        let half_bit = self.timing.half_bit;
        let long_enough = 2 * run.ticks >= 5 * half_bit && 2 * run.ticks <= 9 * half_bit;
        if !long_enough || !run.level.is_driven() || level != run.level.opposite() {
            return None;
        }
        SyncKind::from_leading_level(run.level)
    }

    /// Whether the line was quiet for at least the gap time before the word
    /// whose sync crosses at `crossing`. Activity that failed to decode counts.
    fn gap_before(&self, crossing: u64, run: Run) -> bool {
        let start = crossing.saturating_sub(3 * self.timing.half_bit);
        let run_start = crossing.saturating_sub(run.ticks);
        if run_start < start {
            // sync merged with the previous word's last half-bit
            return false;
        }
        run.driven_before
            .is_some_and(|last| start.saturating_sub(last + 1) >= self.timing.gap)
    }

    fn advance(&mut self, now: u64, level: LineLevel) -> Progress {
        let half_bit = self.timing.half_bit;
        let RxState::Word {
            sync,
            crossing,
            first_half,
            data,
            bits,
            ..
        } = &mut self.state
        else {
            return Progress::Pending;
        };

        let offset = now - *crossing;

        if offset == 3 * half_bit / 2 && level != sync.leading_level().opposite() {
            return Progress::Failed(WordError::MissingSync);
        }

        let data_start = 3 * half_bit;
        if offset >= data_start && (offset - data_start) % half_bit == half_bit / 2 {
            let index = ((offset - data_start) / half_bit) as usize;
            if index % 2 == 0 {
                *first_half = level;
            } else {
                let Some(bit) = manchester_bit(*first_half, level) else {
                    return Progress::Failed(WordError::Manchester {
                        half_bit: SYNC_HALF_BITS + index - 1,
                    });
                };
                if *bits < DATA_BITS {
                    *data = (*data << 1) | u16::from(bit);
                } else if bit != parity_bit(*data) {
                    return Progress::Failed(WordError::Parity { word: *data });
                }
                *bits += 1;
            }
        }

        if offset == HALF_BITS_AFTER_CROSSING * half_bit - 1 {
            return Progress::Done(*data);
        }
        Progress::Pending
    }

    fn complete(&mut self, data: u16, hold_en: bool, stats: &mut CoreStats) {
        let RxState::Word { sync, gap, .. } = self.state else {
            return;
        };

        let word = StreamWord::new(data, Tag::new(sync, gap));
        stats.rx_words += 1;
        debug!(data, sync = %sync, gap, "receive word complete");

        if hold_en {
            if self.output.len() >= self.fifo_depth {
                stats.rx_overruns += 1;
                warn!(data, "receive buffer full, word dropped");
                return;
            }
        } else if !self.output.is_empty() {
            stats.rx_overruns += self.output.len() as u64;
            warn!(
                dropped = self.output.len(),
                "unconsumed receive word overwritten"
            );
            self.output.clear();
        }
        self.output.push_back(word);
    }
}

#[cfg(test)]
mod tests {
    use axis1553_word::encode_word;

    use super::*;
    use crate::config::CoreConfig;

    const HALF: u64 = 10;

    fn path() -> RxPath {
        RxPath::new(CoreConfig::default().timing().unwrap(), 4)
    }

    /// Expand half-bit levels to one sample per tick.
    fn ticks(levels: &[LineLevel]) -> Vec<LineLevel> {
        levels
            .iter()
            .flat_map(|l| std::iter::repeat_n(*l, HALF as usize))
            .collect()
    }

    fn idle(half_bits: usize) -> Vec<LineLevel> {
        vec![LineLevel::Idle; half_bits * HALF as usize]
    }

    fn feed(rx: &mut RxPath, now: &mut u64, samples: &[LineLevel], stats: &mut CoreStats) {
        for level in samples {
            *now += 1;
            rx.clock(*now, *level, false, true, stats);
        }
    }

    #[test]
    fn decodes_command_then_data_back_to_back() {
        let mut rx = path();
        let mut stats = CoreStats::default();
        let mut now = 0;

        let mut line = idle(4);
        line.extend(ticks(&encode_word(0x00FF, SyncKind::Command)));
        line.extend(ticks(&encode_word(0x00FF, SyncKind::Data)));
        line.extend(idle(2));
        feed(&mut rx, &mut now, &line, &mut stats);

        assert_eq!(stats.rx_words, 2);
        assert_eq!(rx.buffered(), 2);
        let first = rx.output().unwrap();
        assert_eq!(first.data, 0x00FF);
        assert_eq!(first.tag.bits(), 0b00100);
        rx.clock(now + 1, LineLevel::Idle, true, true, &mut stats);
        let second = rx.output().unwrap();
        assert_eq!(second.tag.bits(), 0b00010);
    }

    #[test]
    fn gap_flag_set_after_four_microseconds() {
        let mut rx = path();
        let mut stats = CoreStats::default();
        let mut now = 0;

        let mut line = idle(2);
        line.extend(ticks(&encode_word(1, SyncKind::Command)));
        // 3.5 us gap
        line.extend(idle(7));
        line.extend(ticks(&encode_word(2, SyncKind::Data)));
        // exactly 4 us gap
        line.extend(idle(8));
        line.extend(ticks(&encode_word(3, SyncKind::Data)));
        line.extend(idle(1));
        feed(&mut rx, &mut now, &line, &mut stats);

        let flags: Vec<bool> = rx.output.iter().map(|w| w.tag.delay).collect();
        assert_eq!(flags, vec![false, false, true]);
    }

    #[test]
    fn parity_error_is_discarded_and_decoder_resyncs() {
        let mut rx = path();
        let mut stats = CoreStats::default();
        let mut now = 0;

        let mut bad = encode_word(0x1234, SyncKind::Command);
        bad.swap(38, 39);
        let mut line = idle(2);
        line.extend(ticks(&bad));
        line.extend(idle(2));
        line.extend(ticks(&encode_word(0x4321, SyncKind::Data)));
        line.extend(idle(1));
        feed(&mut rx, &mut now, &line, &mut stats);

        assert_eq!(stats.rx_parity_errors, 1);
        assert_eq!(stats.rx_words, 1);
        assert_eq!(rx.output().unwrap().data, 0x4321);
    }

    #[test]
    fn manchester_violation_is_framing_error() {
        let mut rx = path();
        let mut stats = CoreStats::default();
        let mut now = 0;

        let mut bad = encode_word(0xAAAA, SyncKind::Data);
        bad[10] = LineLevel::Idle;
        let mut line = idle(2);
        line.extend(ticks(&bad));
        line.extend(idle(4));
        feed(&mut rx, &mut now, &line, &mut stats);

        assert_eq!(stats.rx_framing_errors, 1);
        assert_eq!(rx.buffered(), 0);
    }

    #[test]
    fn short_pulses_are_not_syncs() {
        let mut rx = path();
        let mut stats = CoreStats::default();
        let mut now = 0;

        // two half-bit runs, the longest Manchester data can produce
        let pattern = [
            LineLevel::Positive,
            LineLevel::Positive,
            LineLevel::Negative,
            LineLevel::Negative,
        ];
        let line: Vec<LineLevel> = ticks(&pattern).repeat(20);
        feed(&mut rx, &mut now, &line, &mut stats);

        assert!(matches!(rx.state, RxState::Hunt));
        assert_eq!(stats, CoreStats::default());
    }

    #[test]
    fn hold_disabled_overwrites_unconsumed_word() {
        let mut rx = path();
        let mut stats = CoreStats::default();
        let mut now = 0;

        let mut line = idle(2);
        line.extend(ticks(&encode_word(1, SyncKind::Command)));
        line.extend(ticks(&encode_word(2, SyncKind::Command)));
        line.extend(idle(1));
        for level in line {
            now += 1;
            rx.clock(now, level, false, false, &mut stats);
        }

        assert_eq!(rx.buffered(), 1);
        assert_eq!(rx.output().unwrap().data, 2);
        assert_eq!(stats.rx_overruns, 1);
    }

    #[test]
    fn hold_enabled_drops_newest_when_full() {
        let mut rx = path();
        let mut stats = CoreStats::default();
        let mut now = 0;

        let mut line = idle(2);
        for data in 0..6u16 {
            line.extend(ticks(&encode_word(data, SyncKind::Data)));
        }
        line.extend(idle(1));
        feed(&mut rx, &mut now, &line, &mut stats);

        assert_eq!(rx.buffered(), 4);
        assert_eq!(stats.rx_overruns, 2);
        assert_eq!(rx.output().unwrap().data, 0);
    }

    #[test]
    fn abort_clears_buffer_and_history() {
        let mut rx = path();
        let mut stats = CoreStats::default();
        let mut now = 0;

        let mut line = idle(2);
        line.extend(ticks(&encode_word(9, SyncKind::Command)));
        line.extend(idle(1));
        feed(&mut rx, &mut now, &line, &mut stats);
        assert_eq!(rx.buffered(), 1);

        rx.abort();
        assert_eq!(rx.buffered(), 0);
        assert!(rx.tracker.last_driven.is_none());
    }

    #[test]
    fn discarded_word_counts_as_bus_activity_for_gap() {
        let mut rx = path();
        let mut stats = CoreStats::default();
        let mut now = 0;

        let mut bad = encode_word(2, SyncKind::Data);
        bad.swap(38, 39);
        let mut line = idle(2);
        line.extend(ticks(&encode_word(1, SyncKind::Command)));
        // 1 us
        line.extend(idle(2));
        line.extend(ticks(&bad));
        line.extend(idle(2));
        line.extend(ticks(&encode_word(3, SyncKind::Data)));
        // 4 us after a discarded word
        line.extend(ticks(&bad));
        line.extend(idle(8));
        line.extend(ticks(&encode_word(4, SyncKind::Data)));
        line.extend(idle(1));
        feed(&mut rx, &mut now, &line, &mut stats);

        assert_eq!(stats.rx_parity_errors, 2);
        let words: Vec<(u16, bool)> = rx
            .output
            .iter()
            .map(|w| (w.data, w.tag.delay))
            .collect();
        assert_eq!(words, vec![(1, false), (3, false), (4, true)]);
    }
}
