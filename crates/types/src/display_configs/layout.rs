//! Status screen layout configuration types.

use serde::{Deserialize, Serialize};

/// Mono fonts available for the status screen
///
/// All of them come from the ISO-8859-1 set so the degree sign renders.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum FontChoice {
    #[serde(rename = "6x10")]
    Font6x10,
    #[serde(rename = "8x13_bold")]
    Font8x13Bold,
    #[serde(rename = "9x15_bold")]
    Font9x15Bold,
    #[serde(rename = "9x18_bold")]
    #[default]
    Font9x18Bold,
    #[serde(rename = "10x20")]
    Font10x20,
}

fn default_top_margin() -> u32 {
    10
}

fn default_left_margin() -> u32 {
    4
}

fn default_line_gap() -> u32 {
    2
}

fn default_bar_offset() -> u32 {
    5
}

fn default_bar_thickness() -> u32 {
    4
}

fn default_character_width() -> usize {
    24
}

fn default_time_format() -> String {
    "%Y-%m-%d %H:%M".to_string()
}

/// Positions and spacing of the status screen
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LayoutConfig {
    /// First line's vertical offset
    #[serde(default = "default_top_margin")]
    pub top_margin: u32,
    /// Horizontal offset of every text line
    #[serde(default = "default_left_margin")]
    pub left_margin: u32,
    /// Added to the font height to get the distance between lines
    #[serde(default = "default_line_gap")]
    pub line_gap: u32,
    /// Distance from the cursor to the first row of a separator bar
    #[serde(default = "default_bar_offset")]
    pub bar_offset: u32,
    /// Rows covered by a separator bar
    #[serde(default = "default_bar_thickness")]
    pub bar_thickness: u32,
    /// Field width, in characters, used to center the header and footer
    #[serde(default = "default_character_width")]
    pub character_width: usize,
    #[serde(default)]
    pub font: FontChoice,
    /// chrono format string for the header
    #[serde(default = "default_time_format")]
    pub time_format: String,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            top_margin: default_top_margin(),
            left_margin: default_left_margin(),
            line_gap: default_line_gap(),
            bar_offset: default_bar_offset(),
            bar_thickness: default_bar_thickness(),
            character_width: default_character_width(),
            font: FontChoice::default(),
            time_format: default_time_format(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_defaults_from_empty_json() {
        let config: LayoutConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, LayoutConfig::default());
        assert_eq!(config.font, FontChoice::Font9x18Bold);
        assert_eq!(config.character_width, 24);
    }

    #[test]
    fn test_font_choice_names() {
        let font: FontChoice = serde_json::from_str("\"8x13_bold\"").unwrap();
        assert_eq!(font, FontChoice::Font8x13Bold);
    }
}
