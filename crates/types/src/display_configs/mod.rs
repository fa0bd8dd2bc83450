//! Display configuration types for the panel and the status screen.

pub mod epaper;
pub mod layout;

pub use epaper::{EpaperConfig, Rotation};
pub use layout::{FontChoice, LayoutConfig};
