/// Errors that can occur while encoding, decoding or exchanging frames.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The configured address width is outside 1..=4 bytes.
    #[error("address width must be 1-4 bytes, got {0}")]
    InvalidAddressWidth(u8),

    /// The byte address does not fit the configured address width.
    #[error("address {addr:#X} overrange (max {max:#X})")]
    AddressOutOfRange { addr: u64, max: u64 },

    /// The transfer count is outside 1..=256.
    #[error("transfer count must be 1-256, got {0}")]
    CountOutOfRange(usize),

    /// The header carries the unassigned transaction code.
    #[error("unknown transaction code {0:#05b}")]
    UnknownKind(u8),

    /// An I/O error occurred while reading or writing frames.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The stream was closed before the expected response bytes arrived.
    #[error("connection closed (incomplete response)")]
    ConnectionClosed,
}

pub type Result<T> = std::result::Result<T, FrameError>;
