//! ruuvi-epaper-render: Frame composition for the two-color e-paper panel.
//!
//! - `frame_buffer`: bit-packed black and red planes
//! - `text_renderer`: glyph coverage from mono fonts
//! - `layout`: positions of the status screen's lines and bars

pub mod frame_buffer;
pub mod layout;
pub mod text_renderer;

pub use frame_buffer::{Frame, FrameError, Plane, PlaneId};
pub use layout::{DrawCommand, LayoutEngine, LayoutError};
pub use text_renderer::{FontMetrics, FontRasterizer, GlyphPixel, MonoFontRasterizer};
