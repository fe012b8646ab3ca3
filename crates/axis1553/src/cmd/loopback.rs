use std::fs::File;

use axis1553::core::CoreConfig;
use axis1553::word::{StreamWord, StreamWordReader, Tag};
use axis1553::Loopback;
use tracing::info;

use crate::cmd::LoopbackArgs;
use crate::exit::{loopback_error, word_error, CliError, CliResult, SUCCESS, USAGE};
use crate::output::{print_receptions, print_stats, OutputFormat};

pub fn run(args: LoopbackArgs, format: OutputFormat, config: CoreConfig) -> CliResult<i32> {
    let config = args.core.apply(config);
    let words = resolve_words(&args)?;

    let mut loopback =
        Loopback::new(config).map_err(|err| loopback_error("core setup failed", err))?;
    loopback.set_hold_enable(!args.core.no_hold);
    loopback.reset();

    let timing = *loopback.core().timing();
    let per_word = timing.tx_delay + timing.gap + 3 * timing.word;
    let max_ticks = args.max_ticks.unwrap_or(
        (words.len() as u64)
            .saturating_mul(per_word)
            .saturating_add(4 * timing.word),
    );
    info!(words = words.len(), max_ticks, "starting loopback");

    let received = loopback
        .transfer(&words, max_ticks)
        .map_err(|err| loopback_error("loopback failed", err))?;
    print_receptions(received, &timing, format)?;
    if args.core.stats {
        print_stats(loopback.core().stats(), format);
    }
    Ok(SUCCESS)
}

fn resolve_words(args: &LoopbackArgs) -> CliResult<Vec<StreamWord>> {
    if let Some(path) = &args.file {
        let file = File::open(path).map_err(|err| {
            crate::exit::io_error(&format!("failed reading {}", path.display()), err)
        })?;
        return StreamWordReader::new(file)
            .read_all()
            .map_err(|err| word_error(&format!("failed reading {}", path.display()), err));
    }
    match &args.words {
        Some(words) if !words.is_empty() => {
            let tag = Tag::new(args.sync.into(), args.delay);
            Ok(words.iter().map(|data| StreamWord::new(*data, tag)).collect())
        }
        _ => Err(CliError::new(USAGE, "no words given: use --words or --file")),
    }
}
