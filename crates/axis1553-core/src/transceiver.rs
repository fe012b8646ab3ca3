use axis1553_line::LineLevel;
use axis1553_word::StreamWord;
use serde::Serialize;
use tracing::{debug, trace};

use crate::config::{CoreConfig, Timing};
use crate::error::Result;
use crate::reset::ResetSync;
use crate::rx::RxPath;
use crate::tx::TxPath;

/// Input pins sampled at a rising clock edge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Inputs {
    /// Active-low reset (`arstn`).
    pub reset_n: bool,
    /// Transmit input: `Some` is `s_axis_tvalid` with its `tdata`/`tuser`.
    pub s_axis: Option<StreamWord>,
    /// Receive output consumer ready (`m_axis_tready`).
    pub m_axis_ready: bool,
    /// Sampled receive line (`rx_diff`).
    pub rx_diff: LineLevel,
    /// Receive hold-enable (`rx_hold_en`).
    pub rx_hold_en: bool,
}

impl Inputs {
    /// Inputs with reset released and everything else idle.
    pub fn running() -> Self {
        Self {
            reset_n: true,
            ..Self::default()
        }
    }

    /// Offer a word given as raw `tdata` bytes and `tuser` bits.
    pub fn with_raw_word(mut self, tdata: [u8; 2], tuser: u8) -> Result<Self> {
        self.s_axis = Some(StreamWord::from_raw(tdata, tuser)?);
        Ok(self)
    }
}

/// Registered outputs, valid between clock edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outputs {
    /// Transmit input ready.
    pub s_axis_tready: bool,
    /// Receive output: `Some` is `m_axis_tvalid` with its `tdata`/`tuser`.
    pub m_axis: Option<StreamWord>,
    /// Transmit line (`tx_diff`).
    pub tx_diff: LineLevel,
    /// Transmit bus active.
    pub tx_active: bool,
}

/// Handshakes completed at one clock edge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Transfers {
    /// Word taken from the transmit input.
    pub accepted: Option<StreamWord>,
    /// Word handed to the receive consumer.
    pub delivered: Option<StreamWord>,
}

/// Running counters. Reset does not clear them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CoreStats {
    pub tx_words: u64,
    pub rx_words: u64,
    pub rx_framing_errors: u64,
    pub rx_parity_errors: u64,
    pub rx_overruns: u64,
}

/// The transceiver core.
///
/// All state advances in [`Transceiver::step`], one call per rising clock
/// edge. A new transceiver is in reset; without clock edges it stays there.
#[derive(Debug, Clone)]
pub struct Transceiver {
    config: CoreConfig,
    timing: Timing,
    now: u64,
    reset: ResetSync,
    tx: TxPath,
    rx: RxPath,
    stats: CoreStats,
}

impl Transceiver {
    /// Create a transceiver from a configuration.
    pub fn new(config: CoreConfig) -> Result<Self> {
        let timing = config.timing()?;
        Ok(Self {
            reset: ResetSync::new(timing.reset_settle),
            tx: TxPath::new(timing),
            rx: RxPath::new(timing, config.rx_fifo_depth),
            stats: CoreStats::default(),
            now: 0,
            config,
            timing,
        })
    }

    /// Outputs as seen after the most recent edge.
    pub fn outputs(&self) -> Outputs {
        let active = self.reset.is_active();
        Outputs {
            s_axis_tready: active && self.tx.ready(),
            m_axis: self.rx.output().filter(|_| active),
            tx_diff: if active {
                self.tx.line(self.now)
            } else {
                LineLevel::Idle
            },
            tx_active: active && self.tx.active(),
        }
    }

    /// Assert reset without a clock edge.
    pub fn assert_reset(&mut self) {
        if self.reset.is_active() {
            debug!(tick = self.now, "reset asserted");
        }
        self.reset.assert();
        self.tx.abort();
        self.rx.abort();
    }

    /// Advance one rising clock edge.
    pub fn step(&mut self, inputs: &Inputs) -> Transfers {
        let before = self.outputs();
        self.now += 1;

        if !inputs.reset_n {
            self.assert_reset();
            return Transfers::default();
        }

        if !self.reset.is_active() {
            if self.reset.clock() {
                trace!(tick = self.now, "reset released, core active");
            }
            return Transfers::default();
        }

        let transfers = Transfers {
            accepted: inputs.s_axis.filter(|_| before.s_axis_tready),
            delivered: before.m_axis.filter(|_| inputs.m_axis_ready),
        };

        self.tx.clock(self.now, transfers.accepted, &mut self.stats);
        self.rx.clock(
            self.now,
            inputs.rx_diff,
            transfers.delivered.is_some(),
            inputs.rx_hold_en,
            &mut self.stats,
        );
        transfers
    }

    /// Returns true once reset has settled.
    pub fn is_active(&self) -> bool {
        self.reset.is_active()
    }

    /// Clock edges seen so far.
    pub fn now(&self) -> u64 {
        self.now
    }

    /// Words decoded but not yet taken by the consumer.
    pub fn rx_buffered(&self) -> usize {
        self.rx.buffered()
    }

    pub fn stats(&self) -> &CoreStats {
        &self.stats
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    pub fn timing(&self) -> &Timing {
        &self.timing
    }
}
