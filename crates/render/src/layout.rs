//! Status screen layout
//!
//! The screen is composed top to bottom with a single cursor:
//!
//! ```text
//!        2024-05-01 14:30         <- black, centered
//! ==============================  <- red bar
//!  Tag1   21.5 °C  45.0 %H       <- black, one line per node
//!  ...
//! ==============================  <- red bar
//!         192.168.1.20            <- black, centered
//! ```
//!
//! Every line and bar advances the cursor by the font height plus the line gap.
//! Values are shown in a field of at most five characters, so the width of a
//! node line never depends on what a sensor reports.

use crate::frame_buffer::{Frame, FrameError, PlaneId};
use crate::text_renderer::{FontMetrics, FontRasterizer};
use chrono::NaiveDateTime;
use ruuvi_epaper_core::RegistrySnapshot;
use ruuvi_epaper_types::{capitalize, LayoutConfig, NodeConfig, NodeValues};
use std::collections::HashMap;
use std::fmt::Write;
use thiserror::Error;

/// Used when the configured time format cannot be rendered
const FALLBACK_TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Widest value text, e.g. "-88.8" or "100.0"
const VALUE_WIDTH: usize = 5;

/// Shown instead of a value that does not fit its field
const OVERFLOW_MARKER: &str = "----";

/// Errors from composing the status screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("layout coordinates overflow")]
    Overflow,
    #[error(transparent)]
    Frame(#[from] FrameError),
}

fn offset(base: u32, delta: u32) -> Result<u32, LayoutError> {
    base.checked_add(delta).ok_or(LayoutError::Overflow)
}

/// One decimal, right-aligned in four characters, or the overflow marker
fn value_field(value: f64) -> String {
    let formatted = format!("{:4.1}", value);
    if formatted.len() > VALUE_WIDTH {
        OVERFLOW_MARKER.to_string()
    } else {
        formatted
    }
}

/// One drawing step of the status screen
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// Text with its top-left corner at (x, y)
    Text {
        plane: PlaneId,
        x: u32,
        y: u32,
        text: String,
    },
    /// Filled bar spanning the whole frame width, rows `top..=bottom`
    Bar { plane: PlaneId, top: u32, bottom: u32 },
}

/// Computes the status screen and draws it into a frame
#[derive(Debug, Clone)]
pub struct LayoutEngine {
    config: LayoutConfig,
    labels: HashMap<String, String>,
}

impl LayoutEngine {
    pub fn new(config: LayoutConfig) -> Self {
        Self {
            config,
            labels: HashMap::new(),
        }
    }

    /// Use the configured display labels of these nodes
    pub fn with_nodes(mut self, nodes: &[NodeConfig]) -> Self {
        self.labels = nodes
            .iter()
            .map(|node| (node.id.clone(), node.display_label()))
            .collect();
        self
    }

    fn label(&self, node: &str) -> String {
        self.labels
            .get(node)
            .cloned()
            .unwrap_or_else(|| capitalize(node))
    }

    fn centered(&self, text: &str) -> String {
        format!("{:^width$}", text, width = self.config.character_width)
    }

    fn header(&self, now: &NaiveDateTime) -> String {
        let mut formatted = String::new();
        if write!(formatted, "{}", now.format(&self.config.time_format)).is_err() {
            formatted = now.format(FALLBACK_TIME_FORMAT).to_string();
        }
        self.centered(&formatted)
    }

    /// Text of one node line
    pub fn node_line(&self, node: &str, values: &NodeValues) -> String {
        format!(
            "{:^4}   {} °C  {} %H",
            self.label(node),
            value_field(values.temperature),
            value_field(values.humidity)
        )
    }

    fn bar(&self, cursor: u32) -> Result<Option<DrawCommand>, LayoutError> {
        if self.config.bar_thickness == 0 {
            return Ok(None);
        }
        let top = offset(cursor, self.config.bar_offset)?;
        Ok(Some(DrawCommand::Bar {
            plane: PlaneId::Red,
            top,
            bottom: offset(top, self.config.bar_thickness - 1)?,
        }))
    }

    /// Draw commands for one screen, in drawing order
    ///
    /// Fails only if a position does not fit in `u32`.
    pub fn plan(
        &self,
        snapshot: &RegistrySnapshot,
        now: &NaiveDateTime,
        ip_address: &str,
        metrics: FontMetrics,
    ) -> Result<Vec<DrawCommand>, LayoutError> {
        let step = offset(metrics.height, self.config.line_gap)?;
        let x = self.config.left_margin;
        let mut cursor = self.config.top_margin;
        let mut commands = Vec::with_capacity(snapshot.len() + 4);

        commands.push(DrawCommand::Text {
            plane: PlaneId::Black,
            x,
            y: cursor,
            text: self.header(now),
        });
        cursor = offset(cursor, step)?;

        commands.extend(self.bar(cursor)?);
        cursor = offset(cursor, step)?;

        for (node, values) in snapshot.iter() {
            commands.push(DrawCommand::Text {
                plane: PlaneId::Black,
                x,
                y: cursor,
                text: self.node_line(node, values),
            });
            cursor = offset(cursor, step)?;
        }

        commands.extend(self.bar(cursor)?);
        cursor = offset(cursor, step)?;

        commands.push(DrawCommand::Text {
            plane: PlaneId::Black,
            x,
            y: cursor,
            text: self.centered(ip_address),
        });

        Ok(commands)
    }

    /// Draw the status screen into `frame`
    ///
    /// A glyph pixel outside the frame fails the whole render.
    pub fn render<F: FontRasterizer + ?Sized>(
        &self,
        frame: &mut Frame,
        snapshot: &RegistrySnapshot,
        now: &NaiveDateTime,
        ip_address: &str,
        font: &F,
    ) -> Result<(), LayoutError> {
        for command in self.plan(snapshot, now, ip_address, font.metrics())? {
            match command {
                DrawCommand::Text { plane, x, y, text } => {
                    for pixel in font.rasterize(&text) {
                        frame.set_pixel(plane, offset(x, pixel.x)?, offset(y, pixel.y)?, true)?;
                    }
                }
                DrawCommand::Bar { plane, top, bottom } => {
                    let right = frame.width();
                    frame.fill_rect(plane, 0, top, right, bottom, true);
                }
            }
        }
        Ok(())
    }
}
