use std::fmt;
use std::io;

use apbbridge_bridge::{BridgeError, ErrorKind};
use apbbridge_frame::FrameError;
use apbbridge_transport::TransportError;

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const TRANSPORT_ERROR: i32 = 3;
/// The peripheral answered SLVERR.
pub const SLAVE_ERROR: i32 = 40;
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
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => TIMEOUT,
        io::ErrorKind::ConnectionRefused
        | io::ErrorKind::ConnectionReset
        | io::ErrorKind::NotFound
        | io::ErrorKind::BrokenPipe => TRANSPORT_ERROR,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn transport_error(context: &str, err: TransportError) -> CliError {
    match err {
        TransportError::Connect { source, .. } | TransportError::Io(source) => {
            io_error(context, source)
        }
        TransportError::InvalidTarget { .. } | TransportError::Unsupported(_) => {
            CliError::new(USAGE, format!("{context}: {err}"))
        }
    }
}

pub fn bridge_error(context: &str, err: BridgeError) -> CliError {
    match err.kind() {
        ErrorKind::Configuration | ErrorKind::Precondition => {
            CliError::new(USAGE, format!("{context}: {err}"))
        }
        ErrorKind::PeripheralRejected => CliError::new(SLAVE_ERROR, format!("{context}: {err}")),
        ErrorKind::Transport => match err {
            BridgeError::Transport(err) => transport_error(context, err),
            BridgeError::Frame(FrameError::Io(source)) => io_error(context, source),
            BridgeError::Frame(FrameError::ConnectionClosed) => {
                CliError::new(TRANSPORT_ERROR, format!("{context}: {err}"))
            }
            other => CliError::new(FAILURE, format!("{context}: {other}")),
        },
    }
}
