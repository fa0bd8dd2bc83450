//! ruuvi-epaper-displayers: Display drivers for the two-plane e-paper frame.

mod driver;
pub mod epd2in7b;
mod interface;
mod preview;

pub use driver::{DisplayDriver, DisplayError};
pub use epd2in7b::Epd2in7b;
#[cfg(target_os = "linux")]
pub use interface::LinuxSpiInterface;
pub use interface::EpdInterface;
pub use preview::PreviewDisplay;
