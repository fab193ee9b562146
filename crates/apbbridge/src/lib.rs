//! Host-side driver for the APB serial bridge.
//!
//! The bridge is an FPGA component that turns a byte stream (UART, SPI, TCP)
//! into APB register transactions. This crate talks to it from the host.
//!
//! # Crate Structure
//!
//! - [`transport`]: Socket streams and target parsing
//! - [`frame`]: Request/response wire format
//! - [`bridge`]: The register-access driver ([`bridge::SerialBridge`])

/// Re-export transport types.
pub mod transport {
    pub use apbbridge_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use apbbridge_frame::*;
}

/// Re-export bridge types.
pub mod bridge {
    pub use apbbridge_bridge::*;
}

pub use apbbridge_bridge::{connect, BridgeConfig, BridgeError, ErrorKind, SerialBridge};
