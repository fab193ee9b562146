/// Errors that can occur while opening or driving a bridge transport.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Failed to connect to the specified target.
    #[error("failed to connect to {target}: {source}")]
    Connect {
        target: String,
        source: std::io::Error,
    },

    /// An I/O error occurred on the transport stream.
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The target string could not be parsed.
    #[error("invalid target {target:?}: {reason}")]
    InvalidTarget { target: String, reason: &'static str },

    /// The target scheme is not available on this platform.
    #[error("target {0:?} is not supported on this platform")]
    Unsupported(String),
}

pub type Result<T> = std::result::Result<T, TransportError>;
