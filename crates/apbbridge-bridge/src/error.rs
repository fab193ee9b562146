use std::fmt;

use apbbridge_frame::FrameError;
use apbbridge_transport::TransportError;

/// The bridge operation a peripheral error was reported for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Read,
    Write,
    BlockRead,
    BlockWrite,
    CyclicRead,
    CyclicWrite,
    /// Read phase of a read-modify-write.
    RmwRead,
    /// Write phase of a read-modify-write.
    RmwWrite,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Operation::Read => "read",
            Operation::Write => "write",
            Operation::BlockRead => "block_read",
            Operation::BlockWrite => "block_write",
            Operation::CyclicRead => "cyclic_read",
            Operation::CyclicWrite => "cyclic_write",
            Operation::RmwRead => "rmw_read",
            Operation::RmwWrite => "rmw_write",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse classification callers branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The bridge was configured with an invalid address width.
    Configuration,
    /// An argument was out of range; nothing was sent.
    Precondition,
    /// The byte stream failed or closed.
    Transport,
    /// The peripheral answered SLVERR.
    PeripheralRejected,
}

/// Errors that can occur in bridge operations.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    /// Invalid bridge configuration.
    #[error("invalid configuration: {0}")]
    Config(FrameError),

    /// Invalid operation argument, rejected before any I/O.
    #[error("invalid argument: {0}")]
    Precondition(FrameError),

    /// Failed to open the transport.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// I/O failure while exchanging frames.
    #[error("frame error: {0}")]
    Frame(FrameError),

    /// The APB completer rejected the transaction.
    #[error("SLVERR: {operation}: addr {addr:#010X}{}", format_data(.data))]
    SlaveError {
        operation: Operation,
        /// Byte address reported for the failing element. Block and cyclic
        /// writes report `start + 4 * i`, which may lie past the address width.
        addr: u64,
        /// The rejected value, for write-family operations.
        data: Option<u32>,
    },
}

fn format_data(data: &Option<u32>) -> String {
    match data {
        Some(data) => format!(", data {data:#010X}"),
        None => String::new(),
    }
}

impl BridgeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            BridgeError::Config(_) => ErrorKind::Configuration,
            BridgeError::Precondition(_) => ErrorKind::Precondition,
            BridgeError::Transport(_) | BridgeError::Frame(_) => ErrorKind::Transport,
            BridgeError::SlaveError { .. } => ErrorKind::PeripheralRejected,
        }
    }

    /// True when the peripheral answered SLVERR.
    pub fn is_slave_error(&self) -> bool {
        self.kind() == ErrorKind::PeripheralRejected
    }
}

impl From<FrameError> for BridgeError {
    fn from(err: FrameError) -> Self {
        match err {
            FrameError::InvalidAddressWidth(_) => BridgeError::Config(err),
            FrameError::AddressOutOfRange { .. } | FrameError::CountOutOfRange(_) => {
                BridgeError::Precondition(err)
            }
            other => BridgeError::Frame(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;
