use std::io::IsTerminal;

use axis1553::core::{CoreStats, Timing};
use axis1553::line::LineTrace;
use axis1553::word::{parity_bit, StreamWord, StreamWordWriter, SyncKind};
use axis1553::Reception;
use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;

use crate::exit::{word_error, CliResult};

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct LineWordOutput<'a> {
    data: String,
    sync: SyncKind,
    parity: u8,
    trace: &'a str,
}

/// Print a bus word with its line trace (`encode`, `decode`).
pub fn print_line_word(data: u16, sync: SyncKind, trace: &LineTrace, format: OutputFormat) {
    let trace = trace.to_string();
    let parity = u8::from(parity_bit(data));
    match format {
        OutputFormat::Json => {
            let out = LineWordOutput {
                data: format!("0x{data:04X}"),
                sync,
                parity,
                trace: &trace,
            };
            print_json(&out);
        }
        OutputFormat::Table => {
            let mut table = new_table(vec!["WORD", "SYNC", "PARITY", "TRACE"]);
            table.add_row(vec![
                format!("0x{data:04X}"),
                sync.to_string(),
                parity.to_string(),
                trace,
            ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!("word=0x{data:04X} sync={sync} parity={parity} trace={trace}");
        }
        OutputFormat::Raw => println!("{trace}"),
    }
}

#[derive(Serialize)]
struct ReceivedOutput {
    data: String,
    sync: SyncKind,
    tuser: String,
    gap: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    tx_start_ns: Option<u64>,
    delivered_ns: u64,
}

impl ReceivedOutput {
    fn new(
        word: &StreamWord,
        tx_start_tick: Option<u64>,
        delivered_tick: u64,
        timing: &Timing,
    ) -> Self {
        Self {
            data: format!("0x{:04X}", word.data),
            sync: word.tag.sync,
            tuser: word.tag.to_string(),
            gap: word.tag.delay,
            tx_start_ns: tx_start_tick.map(|tick| timing.ticks_to_ns(tick)),
            delivered_ns: timing.ticks_to_ns(delivered_tick),
        }
    }
}

/// Print words that came back through a loopback.
pub fn print_receptions(
    receptions: &[Reception],
    timing: &Timing,
    format: OutputFormat,
) -> CliResult<()> {
    let rows: Vec<ReceivedOutput> = receptions
        .iter()
        .map(|r| ReceivedOutput::new(&r.word, r.tx_start_tick, r.delivered_tick, timing))
        .collect();
    print_received(&rows, format, || receptions.iter().map(|r| r.word).collect())
}

/// Print words decoded from generated bus traffic, with their delivery ticks.
pub fn print_received_words(
    words: &[(StreamWord, u64)],
    timing: &Timing,
    format: OutputFormat,
) -> CliResult<()> {
    let rows: Vec<ReceivedOutput> = words
        .iter()
        .map(|(word, tick)| ReceivedOutput::new(word, None, *tick, timing))
        .collect();
    print_received(&rows, format, || words.iter().map(|(word, _)| *word).collect())
}

fn print_received(
    rows: &[ReceivedOutput],
    format: OutputFormat,
    words: impl FnOnce() -> Vec<StreamWord>,
) -> CliResult<()> {
    match format {
        OutputFormat::Json => rows.iter().for_each(print_json),
        OutputFormat::Table => {
            let mut table = new_table(vec![
                "WORD",
                "SYNC",
                "TUSER",
                "GAP",
                "TX START (ns)",
                "DELIVERED (ns)",
            ]);
            for row in rows {
                table.add_row(vec![
                    row.data.clone(),
                    row.sync.to_string(),
                    row.tuser.clone(),
                    u8::from(row.gap).to_string(),
                    row.tx_start_ns
                        .map_or_else(|| "-".to_string(), |ns| ns.to_string()),
                    row.delivered_ns.to_string(),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            for row in rows {
                println!(
                    "word={} sync={} tuser={} gap={} delivered_ns={}",
                    row.data,
                    row.sync,
                    row.tuser,
                    u8::from(row.gap),
                    row.delivered_ns
                );
            }
        }
        OutputFormat::Raw => print_raw(&words())?,
    }
    Ok(())
}

/// Print the core's counters. Raw output carries no stats.
pub fn print_stats(stats: &CoreStats, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(stats),
        OutputFormat::Table => {
            let mut table = new_table(vec!["TX", "RX", "FRAMING", "PARITY", "OVERRUNS"]);
            table.add_row(vec![
                stats.tx_words.to_string(),
                stats.rx_words.to_string(),
                stats.rx_framing_errors.to_string(),
                stats.rx_parity_errors.to_string(),
                stats.rx_overruns.to_string(),
            ]);
            println!("{table}");
        }
        OutputFormat::Pretty => println!(
            "tx_words={} rx_words={} rx_framing_errors={} rx_parity_errors={} rx_overruns={}",
            stats.tx_words,
            stats.rx_words,
            stats.rx_framing_errors,
            stats.rx_parity_errors,
            stats.rx_overruns
        ),
        OutputFormat::Raw => {}
    }
}

/// Write stream words to stdout as 3-byte `tdata`/`tuser` records.
pub fn print_raw(words: &[StreamWord]) -> CliResult<()> {
    let mut writer = StreamWordWriter::new(std::io::stdout().lock());
    for word in words {
        writer
            .write_word(word)
            .map_err(|err| word_error("failed writing stream words", err))?;
    }
    writer
        .flush()
        .map_err(|err| word_error("failed writing stream words", err))
}

fn print_json<T: Serialize>(value: &T) {
    println!(
        "{}",
        serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
    );
}

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}
