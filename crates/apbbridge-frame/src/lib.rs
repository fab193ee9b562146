//! Wire format of the APB serial bridge.
//!
//! Every request is a single frame:
//! - A header byte: 3-bit transaction kind, 5-bit transfer size (`count - 1`)
//! - A big-endian byte address, 1 to 4 bytes wide
//! - An optional payload of big-endian 32-bit words
//!
//! The peripheral answers with one status byte per transfer element (two for
//! read-modify-write), each read element followed by a 4-byte data word.

pub mod codec;
pub mod error;
pub mod kind;
pub mod reader;
pub mod writer;

pub use codec::{
    decode_request, encode_request, header_byte, AddressWidth, Request, Status,
    MAX_TRANSFER_COUNT, SIZE_FIELD_MASK, WORD_SIZE,
};
pub use error::{FrameError, Result};
pub use kind::TransactionKind;
pub use reader::{read_status, read_word};
pub use writer::RequestWriter;
