//! E-paper panel configuration types.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Orientation of the logical drawing surface relative to the panel
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum Rotation {
    /// Logical coordinates equal native panel coordinates
    #[serde(rename = "rotate0")]
    Rotate0,
    /// Panel mounted on its side; logical width is the native height
    #[serde(rename = "rotate270")]
    #[default]
    Rotate270,
}

fn default_width() -> u32 {
    176
}

fn default_height() -> u32 {
    264
}

fn default_spi_device() -> String {
    "/dev/spidev0.0".to_string()
}

fn default_spi_speed_hz() -> u32 {
    2_000_000
}

fn default_reset_pin() -> u64 {
    17
}

fn default_dc_pin() -> u64 {
    25
}

fn default_busy_pin() -> u64 {
    24
}

fn default_busy_timeout_ms() -> u64 {
    30_000
}

/// Panel geometry and wiring
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EpaperConfig {
    /// Native panel width in pixels
    #[serde(default = "default_width")]
    pub width: u32,
    /// Native panel height in pixels
    #[serde(default = "default_height")]
    pub height: u32,
    #[serde(default)]
    pub rotation: Rotation,
    #[serde(default = "default_spi_device")]
    pub spi_device: String,
    #[serde(default = "default_spi_speed_hz")]
    pub spi_speed_hz: u32,
    /// BCM GPIO numbers
    #[serde(default = "default_reset_pin")]
    pub reset_pin: u64,
    #[serde(default = "default_dc_pin")]
    pub dc_pin: u64,
    #[serde(default = "default_busy_pin")]
    pub busy_pin: u64,
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
}

impl Default for EpaperConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            rotation: Rotation::default(),
            spi_device: default_spi_device(),
            spi_speed_hz: default_spi_speed_hz(),
            reset_pin: default_reset_pin(),
            dc_pin: default_dc_pin(),
            busy_pin: default_busy_pin(),
            busy_timeout_ms: default_busy_timeout_ms(),
        }
    }
}

impl EpaperConfig {
    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }

    /// Size of the drawing surface after rotation, as (width, height)
    pub fn logical_size(&self) -> (u32, u32) {
        match self.rotation {
            Rotation::Rotate0 => (self.width, self.height),
            Rotation::Rotate270 => (self.height, self.width),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logical_size_follows_rotation() {
        let mut config = EpaperConfig::default();
        assert_eq!(config.logical_size(), (264, 176));

        config.rotation = Rotation::Rotate0;
        assert_eq!(config.logical_size(), (176, 264));
    }

    #[test]
    fn test_rotation_serialization() {
        let json = serde_json::to_string(&Rotation::Rotate270).unwrap();
        assert_eq!(json, "\"rotate270\"");
        let rotation: Rotation = serde_json::from_str("\"rotate0\"").unwrap();
        assert_eq!(rotation, Rotation::Rotate0);
    }
}
