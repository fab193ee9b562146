//! Byte-stream transports for the APB serial bridge.
//!
//! The bridge protocol only needs an ordered, reliable duplex byte stream.
//! This crate provides the concrete streams the host tools ship with:
//! - TCP sockets (serial-to-network adapters, simulators)
//! - Unix domain sockets (Linux/macOS, e.g. HDL co-simulation)
//!
//! Anything else that implements [`std::io::Read`] + [`std::io::Write`]
//! (a serial port handle, a mock) can be handed to the bridge directly.

pub mod error;
pub mod stream;
pub mod target;

pub use error::{Result, TransportError};
pub use stream::BridgeStream;
pub use target::Target;
