use std::fmt;
use std::io;

use axis1553::core::{ConfigError, CoreError};
use axis1553::line::LineError;
use axis1553::word::WordError;
use axis1553::LoopbackError;

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const TIMEOUT: i32 = 124;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied => FAILURE,
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => TIMEOUT,
        io::ErrorKind::InvalidData | io::ErrorKind::UnexpectedEof => DATA_INVALID,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn line_error(context: &str, err: LineError) -> CliError {
    CliError::new(DATA_INVALID, format!("{context}: {err}"))
}

pub fn word_error(context: &str, err: WordError) -> CliError {
    match err {
        WordError::Io(source) => io_error(context, source),
        WordError::StreamClosed => CliError::new(FAILURE, format!("{context}: {err}")),
        other => CliError::new(DATA_INVALID, format!("{context}: {other}")),
    }
}

pub fn config_error(context: &str, err: ConfigError) -> CliError {
    CliError::new(USAGE, format!("{context}: {err}"))
}

pub fn core_error(context: &str, err: CoreError) -> CliError {
    match err {
        CoreError::Config(err) => config_error(context, err),
        CoreError::Word(err) => word_error(context, err),
    }
}

pub fn loopback_error(context: &str, err: LoopbackError) -> CliError {
    match err {
        LoopbackError::Core(err) => core_error(context, err),
        LoopbackError::Timeout { .. } => CliError::new(TIMEOUT, format!("{context}: {err}")),
    }
}
