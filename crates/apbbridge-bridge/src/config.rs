use std::time::Duration;

use apbbridge_frame::AddressWidth;

use crate::error::Result;

/// Bridge configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeConfig {
    /// Width of the address field in bytes (1-4). Must match the
    /// `ADDR_BYTE_COUNT` generic of the hardware. Default: 4.
    pub address_byte_count: u8,
    /// Read timeout applied to socket transports. Default: none (block).
    pub read_timeout: Option<Duration>,
    /// Write timeout applied to socket transports. Default: none (block).
    pub write_timeout: Option<Duration>,
}

impl BridgeConfig {
    /// Validate the address width.
    pub fn validate(&self) -> Result<AddressWidth> {
        Ok(AddressWidth::new(self.address_byte_count)?)
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            address_byte_count: AddressWidth::MAX,
            read_timeout: None,
            write_timeout: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn default_is_four_byte_addresses() {
        let width = BridgeConfig::default().validate().unwrap();
        assert_eq!(width.bytes(), 4);
    }

    #[test]
    fn out_of_range_width_is_configuration_error() {
        for bad in [0, 5] {
            let config = BridgeConfig {
                address_byte_count: bad,
                ..BridgeConfig::default()
            };
            assert_eq!(
                config.validate().unwrap_err().kind(),
                ErrorKind::Configuration
            );
        }
    }
}
