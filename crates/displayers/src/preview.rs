//! Display stand-in that logs frames instead of driving a panel

use crate::driver::{check_planes, DisplayDriver, DisplayError};
use log::{info, log_enabled, trace, Level};
use ruuvi_epaper_types::{EpaperConfig, Rotation};

/// Logs plane statistics for every paint, plus ASCII art at trace level
pub struct PreviewDisplay {
    width: u32,
    height: u32,
    rotation: Rotation,
    /// (columns, rows) of the ASCII rendering
    logical: (u32, u32),
    frames: u64,
}

impl PreviewDisplay {
    pub fn new(config: &EpaperConfig) -> Self {
        Self {
            width: config.width,
            height: config.height,
            rotation: config.rotation,
            logical: config.logical_size(),
            frames: 0,
        }
    }

    /// Number of frames painted so far
    pub fn frames(&self) -> u64 {
        self.frames
    }

    fn colored(&self, plane: &[u8], x: u32, y: u32) -> bool {
        let stride = (self.width as usize).div_ceil(8);
        let index = y as usize * stride + x as usize / 8;
        plane
            .get(index)
            .is_some_and(|byte| byte & (0x80 >> (x % 8)) != 0)
    }

    /// Render the planes in logical orientation
    ///
    /// `R` marks red, `#` black, a space neither. Red wins where both are set.
    pub fn ascii_art(&self, black: &[u8], red: &[u8]) -> String {
        let (columns, rows) = self.logical;

        let mut out = String::with_capacity(((columns + 1) * rows) as usize);
        for y in 0..rows {
            for x in 0..columns {
                let (nx, ny) = match self.rotation {
                    Rotation::Rotate0 => (x, y),
                    Rotation::Rotate270 => (y, self.height - 1 - x),
                };
                let c = if self.colored(red, nx, ny) {
                    'R'
                } else if self.colored(black, nx, ny) {
                    '#'
                } else {
                    ' '
                };
                out.push(c);
            }
            out.push('\n');
        }
        out
    }
}

impl DisplayDriver for PreviewDisplay {
    fn initialize(&mut self) -> Result<(), DisplayError> {
        info!("Preview display {}x{} ready", self.width, self.height);
        Ok(())
    }

    fn paint(&mut self, black: &[u8], red: &[u8]) -> Result<(), DisplayError> {
        check_planes(self.plane_len(), black, red)?;
        self.frames += 1;

        let count = |plane: &[u8]| plane.iter().map(|b| b.count_ones()).sum::<u32>();
        info!(
            "Preview frame {}: {} black, {} red pixels",
            self.frames,
            count(black),
            count(red)
        );
        if log_enabled!(Level::Trace) {
            trace!("\n{}", self.ascii_art(black, red));
        }
        Ok(())
    }

    fn native_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small(rotation: Rotation) -> PreviewDisplay {
        PreviewDisplay::new(&EpaperConfig {
            width: 8,
            height: 3,
            rotation,
            ..EpaperConfig::default()
        })
    }

    #[test]
    fn test_ascii_art_native_orientation() {
        let preview = small(Rotation::Rotate0);
        let black = [0x80, 0x00, 0x01];
        let red = [0x00, 0xFF, 0x01];
        assert_eq!(
            preview.ascii_art(&black, &red),
            "#       \nRRRRRRRR\n       R\n"
        );
    }

    #[test]
    fn test_ascii_art_rotate270() {
        let preview = small(Rotation::Rotate270);
        // Native (0, 2) is logical (0, 0)
        let black = [0x00, 0x00, 0x80];
        let red = [0x00; 3];
        let art = preview.ascii_art(&black, &red);
        let lines: Vec<&str> = art.lines().collect();
        assert_eq!(lines.len(), 8);
        assert_eq!(lines[0], "#  ");
        assert!(lines[1..].iter().all(|line| line.trim().is_empty()));
    }

    #[test]
    fn test_paint_counts_frames_and_checks_size() {
        let mut preview = small(Rotation::Rotate0);
        preview.initialize().unwrap();
        preview.paint(&[0; 3], &[0; 3]).unwrap();
        preview.paint(&[0xFF; 3], &[0; 3]).unwrap();
        assert_eq!(preview.frames(), 2);

        assert!(preview.paint(&[0; 2], &[0; 3]).is_err());
        assert_eq!(preview.frames(), 2);
    }
}
