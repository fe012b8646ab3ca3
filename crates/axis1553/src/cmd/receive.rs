use axis1553::core::{CoreConfig, Inputs, Transceiver};
use axis1553::word::SyncKind;
use axis1553::LineSource;
use tracing::info;

use crate::cmd::ReceiveArgs;
use crate::exit::{core_error, CliError, CliResult, SUCCESS, USAGE};
use crate::output::{print_received_words, print_stats, OutputFormat};

pub fn run(args: ReceiveArgs, format: OutputFormat, config: CoreConfig) -> CliResult<i32> {
    let config = args.core.apply(config);
    let mut core =
        Transceiver::new(config).map_err(|err| core_error("core setup failed", err))?;
    let timing = *core.timing();
    let hold_en = !args.core.no_hold;

    for _ in 0..timing.reset_settle.max(1) {
        core.step(&Inputs::default());
    }
    let running = Inputs {
        rx_hold_en: hold_en,
        ..Inputs::running()
    };
    while !core.is_active() {
        core.step(&running);
    }

    let sync = SyncKind::from(args.sync);
    let gap_ticks = gap_ticks(args.gap_us, timing.clock_hz)?;
    let mut source = LineSource::new(&timing);
    for (i, word) in args.words.iter().enumerate() {
        if i > 0 {
            source.idle_for(gap_ticks);
        }
        source.write(*word, sync);
    }

    let ticks = source.remaining_ticks() + 2 * timing.word;
    info!(words = args.words.len(), ticks, "driving receive line");

    let mut received = Vec::new();
    for _ in 0..ticks {
        let inputs = Inputs {
            m_axis_ready: true,
            rx_diff: source.next_level(),
            ..running
        };
        if let Some(word) = core.step(&inputs).delivered {
            received.push((word, core.now()));
        }
    }

    print_received_words(&received, &timing, format)?;
    if args.core.stats {
        print_stats(core.stats(), format);
    }
    Ok(SUCCESS)
}

/// Convert `--gap-us` to clock ticks.
fn gap_ticks(gap_us: u64, clock_hz: u64) -> CliResult<u64> {
    gap_us
        .checked_mul(clock_hz)
        .map(|product| product / 1_000_000)
        .ok_or_else(|| CliError::new(USAGE, format!("--gap-us {gap_us} is too large")))
}
