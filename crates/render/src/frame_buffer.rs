//! Bit-packed monochrome planes and the two-plane frame
//!
//! Pixel (x, y) lives in byte `y * stride + x / 8`, at mask `0x80 >> (x % 8)`.
//! A set bit means colored. This is the byte layout the panel controller
//! consumes, so it must not change.

use ruuvi_epaper_types::Rotation;
use thiserror::Error;

/// Errors from pixel addressing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FrameError {
    #[error("pixel ({x}, {y}) is outside the {width}x{height} plane")]
    OutOfBounds {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    },
}

/// One color channel of the display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plane {
    width: u32,
    height: u32,
    stride: usize,
    bytes: Vec<u8>,
}

impl Plane {
    /// Create a cleared plane
    pub fn new(width: u32, height: u32) -> Self {
        let stride = (width as usize).div_ceil(8);
        Self {
            width,
            height,
            stride,
            bytes: vec![0; stride * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Bytes per row
    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Set every pixel to uncolored
    pub fn clear(&mut self) {
        self.bytes.fill(0);
    }

    fn locate(&self, x: u32, y: u32) -> Result<(usize, u8), FrameError> {
        if x >= self.width || y >= self.height {
            return Err(FrameError::OutOfBounds {
                x,
                y,
                width: self.width,
                height: self.height,
            });
        }
        let index = y as usize * self.stride + x as usize / 8;
        let mask = 0x80u8 >> (x % 8);
        Ok((index, mask))
    }

    /// Color or clear a single pixel
    pub fn set_pixel(&mut self, x: u32, y: u32, colored: bool) -> Result<(), FrameError> {
        let (index, mask) = self.locate(x, y)?;
        if colored {
            self.bytes[index] |= mask;
        } else {
            self.bytes[index] &= !mask;
        }
        Ok(())
    }

    pub fn get_pixel(&self, x: u32, y: u32) -> Result<bool, FrameError> {
        let (index, mask) = self.locate(x, y)?;
        Ok(self.bytes[index] & mask != 0)
    }

    /// Fill the inclusive rectangle spanned by two corners
    ///
    /// Corners are clamped to the plane instead of failing, so a bar whose
    /// right edge is the plane width stays valid.
    pub fn fill_rect(&mut self, x0: u32, y0: u32, x1: u32, y1: u32, colored: bool) {
        if self.width == 0 || self.height == 0 {
            return;
        }
        let (left, right) = (x0.min(x1), x0.max(x1).min(self.width - 1));
        let (top, bottom) = (y0.min(y1), y0.max(y1).min(self.height - 1));
        if left > right || top > bottom {
            return;
        }

        for y in top..=bottom {
            for x in left..=right {
                // In bounds after clamping
                let (index, mask) = match self.locate(x, y) {
                    Ok(location) => location,
                    Err(_) => continue,
                };
                if colored {
                    self.bytes[index] |= mask;
                } else {
                    self.bytes[index] &= !mask;
                }
            }
        }
    }

    /// Number of colored pixels
    pub fn count_colored(&self) -> u32 {
        self.bytes.iter().map(|b| b.count_ones()).sum()
    }

    /// Whether every pixel of row `y` is colored
    pub fn row_is_full(&self, y: u32) -> bool {
        y < self.height && (0..self.width).all(|x| self.get_pixel(x, y).unwrap_or(false))
    }

    /// Whether row `y` has no colored pixel
    pub fn row_is_empty(&self, y: u32) -> bool {
        if y >= self.height {
            return true;
        }
        let start = y as usize * self.stride;
        self.bytes[start..start + self.stride].iter().all(|b| *b == 0)
    }
}

/// Selects one of the frame's planes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlaneId {
    Black,
    Red,
}

/// The black and red planes composed for one refresh
///
/// Drawing uses logical coordinates; the configured rotation maps them onto
/// the native plane layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    black: Plane,
    red: Plane,
    rotation: Rotation,
}

impl Frame {
    /// Create a cleared frame for a panel of the given native size
    pub fn new(native_width: u32, native_height: u32, rotation: Rotation) -> Self {
        Self {
            black: Plane::new(native_width, native_height),
            red: Plane::new(native_width, native_height),
            rotation,
        }
    }

    /// Logical width
    pub fn width(&self) -> u32 {
        match self.rotation {
            Rotation::Rotate0 => self.black.width(),
            Rotation::Rotate270 => self.black.height(),
        }
    }

    /// Logical height
    pub fn height(&self) -> u32 {
        match self.rotation {
            Rotation::Rotate0 => self.black.height(),
            Rotation::Rotate270 => self.black.width(),
        }
    }

    pub fn black(&self) -> &Plane {
        &self.black
    }

    pub fn red(&self) -> &Plane {
        &self.red
    }

    fn plane(&self, id: PlaneId) -> &Plane {
        match id {
            PlaneId::Black => &self.black,
            PlaneId::Red => &self.red,
        }
    }

    fn plane_mut(&mut self, id: PlaneId) -> &mut Plane {
        match id {
            PlaneId::Black => &mut self.black,
            PlaneId::Red => &mut self.red,
        }
    }

    /// Clear both planes
    pub fn clear(&mut self) {
        self.black.clear();
        self.red.clear();
    }

    /// Native coordinates of an in-bounds logical pixel
    fn to_native(&self, x: u32, y: u32) -> Result<(u32, u32), FrameError> {
        if x >= self.width() || y >= self.height() {
            return Err(FrameError::OutOfBounds {
                x,
                y,
                width: self.width(),
                height: self.height(),
            });
        }
        Ok(match self.rotation {
            Rotation::Rotate0 => (x, y),
            Rotation::Rotate270 => (y, self.black.height() - 1 - x),
        })
    }

    /// Color or clear one logical pixel
    pub fn set_pixel(&mut self, id: PlaneId, x: u32, y: u32, colored: bool) -> Result<(), FrameError> {
        let (nx, ny) = self.to_native(x, y)?;
        self.plane_mut(id).set_pixel(nx, ny, colored)
    }

    pub fn get_pixel(&self, id: PlaneId, x: u32, y: u32) -> Result<bool, FrameError> {
        let (nx, ny) = self.to_native(x, y)?;
        self.plane(id).get_pixel(nx, ny)
    }

    /// Fill an inclusive logical rectangle, clamped to the frame
    pub fn fill_rect(&mut self, id: PlaneId, x0: u32, y0: u32, x1: u32, y1: u32, colored: bool) {
        let (width, height) = (self.width(), self.height());
        if width == 0 || height == 0 {
            return;
        }
        let (left, right) = (x0.min(x1), x0.max(x1).min(width - 1));
        let (top, bottom) = (y0.min(y1), y0.max(y1).min(height - 1));
        if left > right || top > bottom {
            return;
        }

        match self.rotation {
            Rotation::Rotate0 => self.plane_mut(id).fill_rect(left, top, right, bottom, colored),
            Rotation::Rotate270 => {
                // Logical columns run backwards along the native y axis
                let native_height = self.black.height();
                self.plane_mut(id).fill_rect(
                    top,
                    native_height - 1 - right,
                    bottom,
                    native_height - 1 - left,
                    colored,
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plane_size_and_stride() {
        let plane = Plane::new(176, 264);
        assert_eq!(plane.stride(), 22);
        assert_eq!(plane.as_bytes().len(), 176 * 264 / 8);

        let odd = Plane::new(10, 3);
        assert_eq!(odd.stride(), 2);
        assert_eq!(odd.as_bytes().len(), 6);
    }

    #[test]
    fn test_bit_addressing_is_msb_first() {
        let mut plane = Plane::new(16, 2);
        plane.set_pixel(0, 0, true).unwrap();
        plane.set_pixel(9, 1, true).unwrap();
        assert_eq!(plane.as_bytes(), &[0x80, 0x00, 0x00, 0x40]);

        plane.set_pixel(0, 0, false).unwrap();
        assert_eq!(plane.as_bytes()[0], 0x00);
    }

    #[test]
    fn test_set_pixel_bounds() {
        let mut plane = Plane::new(176, 264);
        assert!(plane.set_pixel(175, 263, true).is_ok());
        assert_eq!(
            plane.set_pixel(176, 0, true),
            Err(FrameError::OutOfBounds {
                x: 176,
                y: 0,
                width: 176,
                height: 264
            })
        );
        assert!(plane.set_pixel(0, 264, true).is_err());
    }

    #[test]
    fn test_full_fill_sets_every_byte() {
        let mut frame = Frame::new(176, 264, Rotation::Rotate0);
        frame.fill_rect(PlaneId::Red, 0, 0, 176, 264, true);

        assert!(frame.red().as_bytes().iter().all(|b| *b == 0xFF));
        assert!(frame.black().as_bytes().iter().all(|b| *b == 0x00));
    }

    #[test]
    fn test_fill_rect_clamps_and_normalizes() {
        let mut plane = Plane::new(16, 4);
        plane.fill_rect(20, 1, 0, 1, true);
        assert_eq!(plane.as_bytes(), &[0, 0, 0xFF, 0xFF, 0, 0, 0, 0]);
        assert!(plane.row_is_full(1));
        assert!(plane.row_is_empty(0));

        plane.fill_rect(4, 1, 11, 1, false);
        assert_eq!(&plane.as_bytes()[2..4], &[0xF0, 0x0F]);
    }

    #[test]
    fn test_clear() {
        let mut frame = Frame::new(8, 8, Rotation::Rotate0);
        frame.fill_rect(PlaneId::Black, 0, 0, 7, 7, true);
        frame.fill_rect(PlaneId::Red, 0, 0, 7, 7, true);
        frame.clear();
        assert_eq!(frame.black().count_colored(), 0);
        assert_eq!(frame.red().count_colored(), 0);
    }

    #[test]
    fn test_rotate270_mapping() {
        let mut frame = Frame::new(176, 264, Rotation::Rotate270);
        assert_eq!((frame.width(), frame.height()), (264, 176));

        frame.set_pixel(PlaneId::Black, 0, 0, true).unwrap();
        assert!(frame.black().get_pixel(0, 263).unwrap());

        frame.set_pixel(PlaneId::Black, 263, 175, true).unwrap();
        assert!(frame.black().get_pixel(175, 0).unwrap());

        assert!(frame.get_pixel(PlaneId::Black, 263, 175).unwrap());
        assert!(frame.set_pixel(PlaneId::Black, 264, 0, true).is_err());
        assert!(frame.set_pixel(PlaneId::Black, 0, 176, true).is_err());
    }

    #[test]
    fn test_rotated_fill_matches_pixel_by_pixel() {
        let mut filled = Frame::new(176, 264, Rotation::Rotate270);
        filled.fill_rect(PlaneId::Red, 3, 40, 300, 43, true);

        let mut drawn = Frame::new(176, 264, Rotation::Rotate270);
        for y in 40..=43 {
            for x in 3..264 {
                drawn.set_pixel(PlaneId::Red, x, y, true).unwrap();
            }
        }
        assert_eq!(filled, drawn);
    }
}
