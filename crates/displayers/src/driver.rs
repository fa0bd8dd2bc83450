//! Display driver trait and errors

use std::time::Duration;
use thiserror::Error;

/// Errors from a display driver
#[derive(Debug, Error)]
pub enum DisplayError {
    #[error("display I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("GPIO {pin} error: {message}")]
    Gpio { pin: u64, message: String },

    #[error("display still busy after {0:?}")]
    BusyTimeout(Duration),

    #[error("plane is {actual} bytes, panel expects {expected}")]
    SizeMismatch { expected: usize, actual: usize },

    #[error("display used before initialization")]
    NotInitialized,
}

/// A two-plane (black and red) panel
///
/// Planes are bit-packed in native orientation: `stride = ceil(width / 8)`
/// bytes per row, most significant bit first, a set bit meaning colored.
pub trait DisplayDriver: Send {
    /// Bring the panel into a state where it accepts frames
    fn initialize(&mut self) -> Result<(), DisplayError>;

    /// Transfer both planes and refresh the panel; blocks until done
    fn paint(&mut self, black: &[u8], red: &[u8]) -> Result<(), DisplayError>;

    /// Native (width, height) in pixels
    fn native_size(&self) -> (u32, u32);

    /// Expected length in bytes of each plane
    fn plane_len(&self) -> usize {
        let (width, height) = self.native_size();
        (width as usize).div_ceil(8) * height as usize
    }
}

impl<D: DisplayDriver + ?Sized> DisplayDriver for Box<D> {
    fn initialize(&mut self) -> Result<(), DisplayError> {
        (**self).initialize()
    }

    fn paint(&mut self, black: &[u8], red: &[u8]) -> Result<(), DisplayError> {
        (**self).paint(black, red)
    }

    fn native_size(&self) -> (u32, u32) {
        (**self).native_size()
    }
}

/// Fail with `SizeMismatch` unless both planes have the expected length
pub(crate) fn check_planes(expected: usize, black: &[u8], red: &[u8]) -> Result<(), DisplayError> {
    for actual in [black.len(), red.len()] {
        if actual != expected {
            return Err(DisplayError::SizeMismatch { expected, actual });
        }
    }
    Ok(())
}
