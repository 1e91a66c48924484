//! MCP3208 12-bit SPI ADC used for the potentiometer channel.
//!
//! Frame layout (single-ended, 3 bytes):
//! tx: `0000_01 1 D2` `D1 D0 xx_xxxx` `xxxx_xxxx`
//! rx: `xxxx_xxxx` `xxx0 B11..B8` `B7..B0`

use crate::error::{HwError, Result};

/// Largest channel index on the MCP3208.
pub const MAX_CHANNEL: u8 = 7;
/// Full-scale conversion value (12 bits).
pub const FULL_SCALE: u16 = 0x0FFF;

/// Command bytes for a single-ended conversion on `channel`.
pub fn command_bytes(channel: u8) -> Result<[u8; 3]> {
    if channel > MAX_CHANNEL {
        return Err(HwError::AdcChannel(channel));
    }
    Ok([0x06 | ((channel & 0x04) >> 2), (channel & 0x03) << 6, 0x00])
}

/// Extract the 12-bit result from a response frame.
#[inline]
pub fn decode(rx: [u8; 3]) -> u16 {
    (u16::from(rx[1] & 0x0F) << 8) | u16::from(rx[2])
}

#[cfg(feature = "hardware")]
pub use device::Mcp3208;

#[cfg(feature = "hardware")]
mod device {
    use super::{command_bytes, decode};
    use crate::error::{HwError, Result};
    use rppal::spi::{Bus, Mode, SlaveSelect, Spi};
    use tracing::trace;

    pub struct Mcp3208 {
        spi: Spi,
        cmd: [u8; 3],
    }

    impl Mcp3208 {
        pub fn new(channel: u8, clock_hz: u32) -> Result<Self> {
            let cmd = command_bytes(channel)?;
            let spi = Spi::new(Bus::Spi0, SlaveSelect::Ss0, clock_hz, Mode::Mode0)
                .map_err(|e| HwError::Spi(e.to_string()))?;
            Ok(Self { spi, cmd })
        }

        pub fn read(&mut self) -> Result<u16> {
            let mut rx = [0u8; 3];
            let n = self
                .spi
                .transfer(&mut rx, &self.cmd)
                .map_err(|e| HwError::Spi(e.to_string()))?;
            if n < rx.len() {
                return Err(HwError::AdcShortTransfer(n));
            }
            let value = decode(rx);
            trace!(raw = value, "mcp3208 read");
            Ok(value)
        }
    }

    impl sonar_traits::AnalogInput for Mcp3208 {
        fn read_raw(&mut self) -> std::result::Result<u16, Box<dyn std::error::Error + Send + Sync>> {
            Ok(self.read()?)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_bytes_encode_channel_bits() {
        assert_eq!(command_bytes(0).unwrap(), [0x06, 0x00, 0x00]);
        assert_eq!(command_bytes(3).unwrap(), [0x06, 0xC0, 0x00]);
        assert_eq!(command_bytes(4).unwrap(), [0x07, 0x00, 0x00]);
        assert_eq!(command_bytes(7).unwrap(), [0x07, 0xC0, 0x00]);
    }

    #[test]
    fn command_bytes_rejects_channel_eight() {
        assert!(matches!(command_bytes(8), Err(HwError::AdcChannel(8))));
    }

    #[test]
    fn decode_masks_null_bit_and_garbage() {
        assert_eq!(decode([0xFF, 0xF8, 0x00]), 0x0800);
        assert_eq!(decode([0x00, 0x0F, 0xFF]), FULL_SCALE);
        assert_eq!(decode([0x00, 0x00, 0x00]), 0);
    }
}
