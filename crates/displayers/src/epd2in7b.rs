//! Waveshare 2.7" tri-color panel (IL91874 controller)
//!
//! Both planes are sent in full on every paint: black through
//! `DATA_START_TRANSMISSION_1`, red through `DATA_START_TRANSMISSION_2`,
//! followed by a display refresh. The panel keeps its image without power.

use crate::driver::{check_planes, DisplayDriver, DisplayError};
use crate::interface::EpdInterface;
use log::{debug, info};
use ruuvi_epaper_types::EpaperConfig;
use std::time::Duration;

pub const WIDTH: u32 = 176;
pub const HEIGHT: u32 = 264;

const PANEL_SETTING: u8 = 0x00;
const POWER_SETTING: u8 = 0x01;
const POWER_ON: u8 = 0x04;
const BOOSTER_SOFT_START: u8 = 0x06;
const DATA_START_TRANSMISSION_1: u8 = 0x10;
const DISPLAY_REFRESH: u8 = 0x12;
const DATA_START_TRANSMISSION_2: u8 = 0x13;
const PARTIAL_DISPLAY_REFRESH: u8 = 0x16;
const PLL_CONTROL: u8 = 0x30;
const VCOM_AND_DATA_INTERVAL_SETTING: u8 = 0x50;
const TCON_RESOLUTION: u8 = 0x61;
const VCM_DC_SETTING_REGISTER: u8 = 0x82;
const POWER_OPTIMIZATION: u8 = 0xF8;

/// Vendor power optimization register pairs
const POWER_OPTIMIZATION_PAIRS: [[u8; 2]; 5] = [
    [0x60, 0xA5],
    [0x89, 0xA5],
    [0x90, 0x00],
    [0x93, 0x2A],
    [0x73, 0x41],
];

const BUSY_POLL: Duration = Duration::from_millis(100);

/// Driver for the 176x264 tri-color panel
pub struct Epd2in7b<I: EpdInterface> {
    interface: I,
    width: u32,
    height: u32,
    busy_timeout: Duration,
    initialized: bool,
}

impl<I: EpdInterface> Epd2in7b<I> {
    pub fn new(interface: I, config: &EpaperConfig) -> Self {
        Self {
            interface,
            width: config.width,
            height: config.height,
            busy_timeout: config.busy_timeout(),
            initialized: false,
        }
    }

    pub fn interface(&self) -> &I {
        &self.interface
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    fn command(&mut self, command: u8, data: &[u8]) -> Result<(), DisplayError> {
        self.interface.send_command(command)?;
        if !data.is_empty() {
            self.interface.send_data(data)?;
        }
        Ok(())
    }

    fn wait_until_idle(&mut self) -> Result<(), DisplayError> {
        let mut waited = Duration::ZERO;
        while self.interface.is_busy()? {
            if waited >= self.busy_timeout {
                return Err(DisplayError::BusyTimeout(self.busy_timeout));
            }
            self.interface.delay(BUSY_POLL);
            waited += BUSY_POLL;
        }
        Ok(())
    }
}

impl<I: EpdInterface> DisplayDriver for Epd2in7b<I> {
    fn initialize(&mut self) -> Result<(), DisplayError> {
        self.initialized = false;
        self.interface.reset()?;

        self.command(POWER_ON, &[])?;
        self.wait_until_idle()?;

        // LUT from OTP, black/white/red, scan up, shift right, booster on
        self.command(PANEL_SETTING, &[0x8F])?;
        self.command(PLL_CONTROL, &[0x3A])?;
        self.command(POWER_SETTING, &[0x03, 0x00, 0x2B, 0x2B, 0x09])?;
        self.command(BOOSTER_SOFT_START, &[0x07, 0x07, 0x17])?;
        for pair in POWER_OPTIMIZATION_PAIRS {
            self.command(POWER_OPTIMIZATION, &pair)?;
        }
        self.command(VCM_DC_SETTING_REGISTER, &[0x12])?;
        self.command(VCOM_AND_DATA_INTERVAL_SETTING, &[0x87])?;
        self.command(PARTIAL_DISPLAY_REFRESH, &[0x00])?;

        self.initialized = true;
        info!("E-paper panel initialized ({}x{})", self.width, self.height);
        Ok(())
    }

    fn paint(&mut self, black: &[u8], red: &[u8]) -> Result<(), DisplayError> {
        if !self.initialized {
            return Err(DisplayError::NotInitialized);
        }
        check_planes(self.plane_len(), black, red)?;

        let (w, h) = (self.width, self.height);
        self.command(
            TCON_RESOLUTION,
            &[(w >> 8) as u8, (w & 0xFF) as u8, (h >> 8) as u8, (h & 0xFF) as u8],
        )?;
        self.command(DATA_START_TRANSMISSION_1, black)?;
        self.interface.delay(Duration::from_millis(2));
        self.command(DATA_START_TRANSMISSION_2, red)?;
        self.interface.delay(Duration::from_millis(2));

        self.command(DISPLAY_REFRESH, &[])?;
        self.wait_until_idle()?;
        debug!("E-paper refresh complete");
        Ok(())
    }

    fn native_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Op {
        Reset,
        Command(u8),
        Data(Vec<u8>),
    }

    /// Records traffic; reports busy for the first `busy_polls` checks
    #[derive(Default)]
    struct RecordingInterface {
        ops: Vec<Op>,
        busy_polls: usize,
        always_busy: bool,
        slept: Duration,
    }

    impl EpdInterface for RecordingInterface {
        fn send_command(&mut self, command: u8) -> Result<(), DisplayError> {
            self.ops.push(Op::Command(command));
            Ok(())
        }

        fn send_data(&mut self, data: &[u8]) -> Result<(), DisplayError> {
            self.ops.push(Op::Data(data.to_vec()));
            Ok(())
        }

        fn reset(&mut self) -> Result<(), DisplayError> {
            self.ops.push(Op::Reset);
            Ok(())
        }

        fn is_busy(&mut self) -> Result<bool, DisplayError> {
            if self.always_busy {
                return Ok(true);
            }
            if self.busy_polls > 0 {
                self.busy_polls -= 1;
                return Ok(true);
            }
            Ok(false)
        }

        fn delay(&mut self, duration: Duration) {
            self.slept += duration;
        }
    }

    fn driver(interface: RecordingInterface) -> Epd2in7b<RecordingInterface> {
        Epd2in7b::new(interface, &EpaperConfig::default())
    }

    fn commands(ops: &[Op]) -> Vec<u8> {
        ops.iter()
            .filter_map(|op| match op {
                Op::Command(c) => Some(*c),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_initialize_sequence() {
        let mut epd = driver(RecordingInterface::default());
        epd.initialize().unwrap();
        assert!(epd.is_initialized());

        let ops = &epd.interface().ops;
        assert_eq!(ops[0], Op::Reset);
        assert_eq!(ops[1], Op::Command(POWER_ON));
        assert_eq!(
            commands(ops),
            vec![
                POWER_ON,
                PANEL_SETTING,
                PLL_CONTROL,
                POWER_SETTING,
                BOOSTER_SOFT_START,
                0xF8,
                0xF8,
                0xF8,
                0xF8,
                0xF8,
                VCM_DC_SETTING_REGISTER,
                VCOM_AND_DATA_INTERVAL_SETTING,
                PARTIAL_DISPLAY_REFRESH,
            ]
        );
        assert!(ops.contains(&Op::Data(vec![0x03, 0x00, 0x2B, 0x2B, 0x09])));
    }

    #[test]
    fn test_paint_sends_planes_in_order() {
        let mut epd = driver(RecordingInterface::default());
        epd.initialize().unwrap();
        epd.interface.ops.clear();

        let black = vec![0xAA; epd.plane_len()];
        let red = vec![0x55; epd.plane_len()];
        epd.paint(&black, &red).unwrap();

        assert_eq!(
            epd.interface().ops,
            vec![
                Op::Command(TCON_RESOLUTION),
                Op::Data(vec![0x00, 0xB0, 0x01, 0x08]),
                Op::Command(DATA_START_TRANSMISSION_1),
                Op::Data(black),
                Op::Command(DATA_START_TRANSMISSION_2),
                Op::Data(red),
                Op::Command(DISPLAY_REFRESH),
            ]
        );
    }

    #[test]
    fn test_paint_requires_initialization() {
        let mut epd = driver(RecordingInterface::default());
        let plane = vec![0; epd.plane_len()];
        assert!(matches!(
            epd.paint(&plane, &plane),
            Err(DisplayError::NotInitialized)
        ));
        assert!(epd.interface().ops.is_empty());
    }

    #[test]
    fn test_paint_rejects_wrong_plane_size() {
        let mut epd = driver(RecordingInterface::default());
        epd.initialize().unwrap();
        epd.interface.ops.clear();

        let black = vec![0; 5808];
        let red = vec![0; 100];
        assert!(matches!(
            epd.paint(&black, &red),
            Err(DisplayError::SizeMismatch { expected: 5808, actual: 100 })
        ));
        assert!(epd.interface().ops.is_empty());
    }

    #[test]
    fn test_waits_for_busy_to_clear() {
        let mut epd = driver(RecordingInterface {
            busy_polls: 3,
            ..Default::default()
        });
        epd.initialize().unwrap();
        assert_eq!(epd.interface().slept, BUSY_POLL * 3);
    }

    #[test]
    fn test_busy_timeout() {
        let mut config = EpaperConfig::default();
        config.busy_timeout_ms = 500;
        let mut epd = Epd2in7b::new(
            RecordingInterface {
                always_busy: true,
                ..Default::default()
            },
            &config,
        );

        let result = epd.initialize();
        assert!(matches!(result, Err(DisplayError::BusyTimeout(t)) if t == Duration::from_millis(500)));
        assert!(!epd.is_initialized());
    }
}
