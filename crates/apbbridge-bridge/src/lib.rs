//! Host-side driver for the APB serial bridge.
//!
//! This is the layer applications use. Open a bridge over any duplex byte
//! stream, then read and write 32-bit registers by register index:
//!
//! ```no_run
//! use apbbridge_bridge::{connect, BridgeConfig};
//!
//! let config = BridgeConfig {
//!     address_byte_count: 2,
//!     ..BridgeConfig::default()
//! };
//! let mut bridge = connect(&"tcp://127.0.0.1:4000".parse()?, &config)?;
//!
//! let id = bridge.read(0x10)?;
//! bridge.write(0x10, 0xDEAD_BEEF)?;
//! let window = bridge.block_read(0x00, 4)?;
//! bridge.rmw(0x10, 0xFF, 0x0F)?;
//! # let _ = (id, window);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod bridge;
pub mod config;
pub mod connector;
pub mod error;
#[cfg(any(test, feature = "sim"))]
pub mod sim;

pub use bridge::SerialBridge;
pub use config::BridgeConfig;
pub use connector::connect;
pub use error::{BridgeError, ErrorKind, Operation, Result};
#[cfg(any(test, feature = "sim"))]
pub use sim::SimulatedPeripheral;
