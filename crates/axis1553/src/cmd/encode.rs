use axis1553::line::LineTrace;
use axis1553::word::{encode_word, SyncKind};

use crate::cmd::EncodeArgs;
use crate::exit::{CliResult, SUCCESS};
use crate::output::{print_line_word, OutputFormat};

pub fn run(args: EncodeArgs, format: OutputFormat) -> CliResult<i32> {
    let sync = SyncKind::from(args.sync);
    let trace = LineTrace::from_levels(encode_word(args.word, sync));
    print_line_word(args.word, sync, &trace, format);
    Ok(SUCCESS)
}
