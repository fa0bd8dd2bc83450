//! Panel-facing transport: command/data bytes, reset line and BUSY line

use crate::driver::DisplayError;
use std::time::Duration;

/// Low-level access to an e-paper controller
pub trait EpdInterface: Send {
    /// Send one command byte (DC low)
    fn send_command(&mut self, command: u8) -> Result<(), DisplayError>;

    /// Send data bytes (DC high)
    fn send_data(&mut self, data: &[u8]) -> Result<(), DisplayError>;

    /// Pulse the reset line
    fn reset(&mut self) -> Result<(), DisplayError>;

    /// Whether the controller reports busy
    fn is_busy(&mut self) -> Result<bool, DisplayError>;

    fn delay(&mut self, duration: Duration);
}

#[cfg(target_os = "linux")]
pub use linux::LinuxSpiInterface;

#[cfg(target_os = "linux")]
mod linux {
    use super::EpdInterface;
    use crate::driver::DisplayError;
    use linux_embedded_hal::{
        spidev::{SpiModeFlags, Spidev, SpidevOptions},
        sysfs_gpio::{Direction, Pin},
    };
    use log::debug;
    use ruuvi_epaper_types::EpaperConfig;
    use std::io::Write;
    use std::time::Duration;

    /// Largest single spidev transfer with the default kernel buffer size
    const MAX_TRANSFER: usize = 4096;

    /// `/dev/spidevX.Y` plus sysfs GPIO lines, as wired on the Waveshare HAT
    pub struct LinuxSpiInterface {
        spi: Spidev,
        reset: Pin,
        dc: Pin,
        busy: Pin,
    }

    fn gpio_error(pin: &Pin, e: linux_embedded_hal::sysfs_gpio::Error) -> DisplayError {
        DisplayError::Gpio {
            pin: pin.get_pin_num(),
            message: e.to_string(),
        }
    }

    fn export_pin(number: u64, direction: Direction) -> Result<Pin, DisplayError> {
        let pin = Pin::new(number);
        pin.export().map_err(|e| gpio_error(&pin, e))?;
        // udev needs a moment to fix up permissions on the new sysfs node
        std::thread::sleep(Duration::from_millis(10));
        pin.set_direction(direction).map_err(|e| gpio_error(&pin, e))?;
        Ok(pin)
    }

    impl LinuxSpiInterface {
        pub fn open(config: &EpaperConfig) -> Result<Self, DisplayError> {
            let mut spi = Spidev::open(&config.spi_device)?;
            let options = SpidevOptions::new()
                .bits_per_word(8)
                .max_speed_hz(config.spi_speed_hz)
                .mode(SpiModeFlags::SPI_MODE_0)
                .build();
            spi.configure(&options)?;

            let reset = export_pin(config.reset_pin, Direction::Out)?;
            let dc = export_pin(config.dc_pin, Direction::Out)?;
            let busy = export_pin(config.busy_pin, Direction::In)?;
            debug!(
                "Opened {} (RST {}, DC {}, BUSY {})",
                config.spi_device, config.reset_pin, config.dc_pin, config.busy_pin
            );

            Ok(Self {
                spi,
                reset,
                dc,
                busy,
            })
        }

        fn set(pin: &Pin, value: u8) -> Result<(), DisplayError> {
            pin.set_value(value).map_err(|e| gpio_error(pin, e))
        }
    }

    impl EpdInterface for LinuxSpiInterface {
        fn send_command(&mut self, command: u8) -> Result<(), DisplayError> {
            Self::set(&self.dc, 0)?;
            self.spi.write_all(&[command])?;
            Ok(())
        }

        fn send_data(&mut self, data: &[u8]) -> Result<(), DisplayError> {
            Self::set(&self.dc, 1)?;
            for chunk in data.chunks(MAX_TRANSFER) {
                self.spi.write_all(chunk)?;
            }
            Ok(())
        }

        fn reset(&mut self) -> Result<(), DisplayError> {
            Self::set(&self.reset, 1)?;
            self.delay(Duration::from_millis(200));
            Self::set(&self.reset, 0)?;
            self.delay(Duration::from_millis(10));
            Self::set(&self.reset, 1)?;
            self.delay(Duration::from_millis(200));
            Ok(())
        }

        fn is_busy(&mut self) -> Result<bool, DisplayError> {
            // The IL91874 pulls BUSY low while working
            let level = self.busy.get_value().map_err(|e| gpio_error(&self.busy, e))?;
            Ok(level == 0)
        }

        fn delay(&mut self, duration: Duration) {
            std::thread::sleep(duration);
        }
    }
}
