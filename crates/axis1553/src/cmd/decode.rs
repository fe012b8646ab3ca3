use axis1553::line::LineTrace;
use axis1553::word::decode_word;

use crate::cmd::DecodeArgs;
use crate::exit::{line_error, word_error, CliResult, SUCCESS};
use crate::output::{print_line_word, OutputFormat};

pub fn run(args: DecodeArgs, format: OutputFormat) -> CliResult<i32> {
    let trace: LineTrace = args
        .trace
        .parse()
        .map_err(|err| line_error("invalid trace", err))?;
    let (sync, data) =
        decode_word(trace.levels()).map_err(|err| word_error("decode failed", err))?;
    print_line_word(data, sync, &trace, format);
    Ok(SUCCESS)
}
