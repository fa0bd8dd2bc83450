//! Glyph rasterization for status screen text
//!
//! The layout engine only places text; turning a string into colored pixels
//! is the rasterizer's job. `MonoFontRasterizer` uses the embedded-graphics
//! mono fonts, which are already 1-bit and need no anti-aliasing threshold.

use embedded_graphics::mono_font::{iso_8859_1, MonoFont, MonoTextStyle};
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::text::{Baseline, Text};
use ruuvi_epaper_types::FontChoice;
use std::convert::Infallible;

/// Size of one character cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FontMetrics {
    /// Line height in pixels
    pub height: u32,
    /// Horizontal distance between consecutive characters
    pub advance: u32,
}

/// A colored pixel relative to the top-left corner of the rendered text
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct GlyphPixel {
    pub x: u32,
    pub y: u32,
}

/// Turns strings into pixel coverage
pub trait FontRasterizer {
    fn metrics(&self) -> FontMetrics;

    /// Colored pixels of `text` drawn with its top-left corner at the origin
    fn rasterize(&self, text: &str) -> Vec<GlyphPixel>;
}

/// Rasterizer backed by an embedded-graphics mono font
#[derive(Clone, Copy)]
pub struct MonoFontRasterizer {
    font: &'static MonoFont<'static>,
}

impl MonoFontRasterizer {
    pub fn new(font: &'static MonoFont<'static>) -> Self {
        Self { font }
    }

    pub fn from_choice(choice: FontChoice) -> Self {
        let font = match choice {
            FontChoice::Font6x10 => &iso_8859_1::FONT_6X10,
            FontChoice::Font8x13Bold => &iso_8859_1::FONT_8X13_BOLD,
            FontChoice::Font9x15Bold => &iso_8859_1::FONT_9X15_BOLD,
            FontChoice::Font9x18Bold => &iso_8859_1::FONT_9X18_BOLD,
            FontChoice::Font10x20 => &iso_8859_1::FONT_10X20,
        };
        Self::new(font)
    }
}

impl FontRasterizer for MonoFontRasterizer {
    fn metrics(&self) -> FontMetrics {
        FontMetrics {
            height: self.font.character_size.height,
            advance: self.font.character_size.width + self.font.character_spacing,
        }
    }

    fn rasterize(&self, text: &str) -> Vec<GlyphPixel> {
        let metrics = self.metrics();
        let mut coverage = Coverage {
            size: Size::new(
                metrics.advance.saturating_mul(text.chars().count() as u32),
                metrics.height,
            ),
            pixels: Vec::new(),
        };

        let style = MonoTextStyle::new(self.font, BinaryColor::On);
        // Drawing into Coverage is infallible
        let _ = Text::with_baseline(text, Point::zero(), style, Baseline::Top).draw(&mut coverage);

        coverage.pixels.sort_unstable();
        coverage.pixels.dedup();
        coverage.pixels
    }
}

/// Draw target that records foreground pixels
struct Coverage {
    size: Size,
    pixels: Vec<GlyphPixel>,
}

impl OriginDimensions for Coverage {
    fn size(&self) -> Size {
        self.size
    }
}

impl DrawTarget for Coverage {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            if color.is_on() && point.x >= 0 && point.y >= 0 {
                self.pixels.push(GlyphPixel {
                    x: point.x as u32,
                    y: point.y as u32,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_follow_font_choice() {
        let font = MonoFontRasterizer::from_choice(FontChoice::Font9x18Bold);
        assert_eq!(font.metrics(), FontMetrics { height: 18, advance: 9 });

        let small = MonoFontRasterizer::from_choice(FontChoice::Font6x10);
        assert_eq!(small.metrics(), FontMetrics { height: 10, advance: 6 });
    }

    #[test]
    fn test_space_has_no_coverage() {
        let font = MonoFontRasterizer::from_choice(FontChoice::Font9x18Bold);
        assert!(font.rasterize("    ").is_empty());
        assert!(font.rasterize("").is_empty());
    }

    #[test]
    fn test_coverage_stays_inside_text_cell() {
        let font = MonoFontRasterizer::from_choice(FontChoice::Font9x18Bold);
        let text = "Tag1   21.5 °C  45.0 %H";
        let metrics = font.metrics();
        let pixels = font.rasterize(text);

        assert!(!pixels.is_empty());
        let max_x = metrics.advance * text.chars().count() as u32;
        for p in &pixels {
            assert!(p.x < max_x, "{:?} beyond {}", p, max_x);
            assert!(p.y < metrics.height, "{:?} below {}", p, metrics.height);
        }
    }

    #[test]
    fn test_degree_sign_is_rendered() {
        let font = MonoFontRasterizer::from_choice(FontChoice::Font9x18Bold);
        assert!(!font.rasterize("°").is_empty());
    }

    #[test]
    fn test_rasterize_is_deterministic_and_text_dependent() {
        let font = MonoFontRasterizer::from_choice(FontChoice::Font8x13Bold);
        assert_eq!(font.rasterize("21.5"), font.rasterize("21.5"));
        assert_ne!(font.rasterize("21.5"), font.rasterize("21.6"));
    }
}
