use apbbridge_transport::{BridgeStream, Target};

use crate::bridge::SerialBridge;
use crate::config::BridgeConfig;
use crate::error::Result;

/// Connect to a bridge target and wrap the stream in a [`SerialBridge`].
///
/// The configuration is validated before the connection is attempted.
pub fn connect(target: &Target, config: &BridgeConfig) -> Result<SerialBridge<BridgeStream>> {
    config.validate()?;
    let stream = target.connect()?;
    SerialBridge::with_config_stream(stream, config)
}
