use std::fs;
use std::path::{Path, PathBuf};

use axis1553::core::CoreConfig;
use axis1553::word::SyncKind;
use clap::{Args, Subcommand, ValueEnum};

use crate::exit::{config_error, io_error, CliResult};
use crate::output::OutputFormat;

pub mod decode;
pub mod encode;
pub mod loopback;
pub mod receive;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the line trace of a bus word.
    Encode(EncodeArgs),
    /// Decode a line trace back to a bus word.
    Decode(DecodeArgs),
    /// Send words through a simulated core wired back to itself.
    Loopback(LoopbackArgs),
    /// Drive generated bus traffic into a simulated receiver.
    Receive(ReceiveArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat, config: Option<&Path>) -> CliResult<i32> {
    match command {
        Command::Encode(args) => encode::run(args, format),
        Command::Decode(args) => decode::run(args, format),
        Command::Loopback(args) => loopback::run(args, format, load_config(config)?),
        Command::Receive(args) => receive::run(args, format, load_config(config)?),
        Command::Version(args) => version::run(args),
    }
}

/// Read a core configuration file, or take the defaults.
pub fn load_config(path: Option<&Path>) -> CliResult<CoreConfig> {
    let Some(path) = path else {
        return Ok(CoreConfig::default());
    };
    let json = fs::read_to_string(path)
        .map_err(|err| io_error(&format!("failed reading {}", path.display()), err))?;
    CoreConfig::from_json(&json)
        .map_err(|err| config_error(&format!("invalid config {}", path.display()), err))
}

/// Parse a 16-bit word given in decimal or `0x` hex.
pub fn parse_word(input: &str) -> Result<u16, String> {
    let input = input.trim();
    let parsed = match input
        .strip_prefix("0x")
        .or_else(|| input.strip_prefix("0X"))
    {
        Some(hex) => u16::from_str_radix(hex, 16),
        None => input.parse(),
    };
    parsed.map_err(|_| format!("not a 16-bit word: {input}"))
}

#[derive(Copy, Clone, Debug, Default, ValueEnum)]
pub enum SyncArg {
    #[default]
    Command,
    Data,
}

impl From<SyncArg> for SyncKind {
    fn from(sync: SyncArg) -> Self {
        match sync {
            SyncArg::Command => SyncKind::Command,
            SyncArg::Data => SyncKind::Data,
        }
    }
}

/// Core overrides shared by the simulation commands.
#[derive(Args, Debug)]
pub struct CoreArgs {
    /// Core clock frequency in Hz (multiple of 2 MHz).
    #[arg(long, value_name = "HZ")]
    pub clock_hz: Option<u64>,
    /// Clear rx_hold_en: an unconsumed word is overwritten by the next.
    #[arg(long)]
    pub no_hold: bool,
    /// Print the core's counters after the words.
    #[arg(long)]
    pub stats: bool,
}

impl CoreArgs {
    pub fn apply(&self, mut config: CoreConfig) -> CoreConfig {
        if let Some(clock_hz) = self.clock_hz {
            config.clock_hz = clock_hz;
        }
        config
    }
}

#[derive(Args, Debug)]
pub struct EncodeArgs {
    /// Word to encode (decimal or 0x hex).
    #[arg(value_parser = parse_word)]
    pub word: u16,
    /// Sync pattern.
    #[arg(long, value_enum, default_value = "command")]
    pub sync: SyncArg,
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Line trace: one of `+`, `-`, `.` per half-bit.
    #[arg(allow_hyphen_values = true)]
    pub trace: String,
}

#[derive(Args, Debug)]
pub struct LoopbackArgs {
    /// Words to send (comma-separated, decimal or 0x hex).
    #[arg(long, value_delimiter = ',', value_parser = parse_word, conflicts_with = "file")]
    pub words: Option<Vec<u16>>,
    /// Read 3-byte tdata/tuser stream words from file.
    #[arg(long, conflicts_with = "words")]
    pub file: Option<PathBuf>,
    /// Sync pattern for --words.
    #[arg(long, value_enum, default_value = "command")]
    pub sync: SyncArg,
    /// Set the delay bit on every word from --words.
    #[arg(long)]
    pub delay: bool,
    /// Tick budget before giving up. Default: enough for every word.
    #[arg(long, value_name = "TICKS")]
    pub max_ticks: Option<u64>,
    #[command(flatten)]
    pub core: CoreArgs,
}

#[derive(Args, Debug)]
pub struct ReceiveArgs {
    /// Words to put on the bus (comma-separated, decimal or 0x hex).
    #[arg(long, value_delimiter = ',', value_parser = parse_word, required = true)]
    pub words: Vec<u16>,
    /// Sync pattern.
    #[arg(long, value_enum, default_value = "command")]
    pub sync: SyncArg,
    /// Idle time between words in microseconds.
    #[arg(long, value_name = "US", default_value = "0")]
    pub gap_us: u64,
    #[command(flatten)]
    pub core: CoreArgs,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}
