//! Application configuration

use anyhow::{anyhow, bail, Context, Result};
use chrono::NaiveDate;
use ruuvi_epaper_core::{RegistrySnapshot, DEFAULT_REFRESH_INTERVAL};
use ruuvi_epaper_render::{Frame, LayoutEngine, MonoFontRasterizer};
use ruuvi_epaper_types::{
    default_nodes, EpaperConfig, LayoutConfig, MqttSourceConfig, NodeConfig, NodeValues,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

fn default_version() -> u32 {
    1
}

fn default_refresh_interval_secs() -> u64 {
    DEFAULT_REFRESH_INTERVAL.as_secs()
}

/// Application-wide configuration
///
/// Every field has a default, so an empty JSON object is a valid file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    /// Version of the config format
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub mqtt: MqttSourceConfig,
    #[serde(default)]
    pub display: EpaperConfig,
    #[serde(default)]
    pub layout: LayoutConfig,
    /// Nodes in display order
    #[serde(default = "default_nodes")]
    pub nodes: Vec<NodeConfig>,
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            mqtt: MqttSourceConfig::default(),
            display: EpaperConfig::default(),
            layout: LayoutConfig::default(),
            nodes: default_nodes(),
            refresh_interval_secs: default_refresh_interval_secs(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the user config directory, or defaults if absent
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            log::info!(
                "No configuration at {}, using defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }

        Self::load_from_path(&config_path)
    }

    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        let dirs = directories::ProjectDirs::from("org", "ruuvi-epaper", "ruuvi-epaper")
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(dirs.config_dir().join("config.json"))
    }

    /// Load configuration from a specific file path
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(config)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    pub fn node_ids(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(|node| node.id.as_str())
    }

    /// Check the configuration before anything is started
    pub fn validate(&self) -> Result<()> {
        if self.nodes.is_empty() {
            bail!("No nodes configured");
        }

        let mut seen = HashSet::new();
        for node in &self.nodes {
            if node.id.is_empty() {
                bail!("Node id must not be empty");
            }
            if node.id.contains('/') {
                bail!("Node id '{}' must not contain '/'", node.id);
            }
            if !seen.insert(node.id.as_str()) {
                bail!("Node '{}' is configured twice", node.id);
            }
        }

        if self.refresh_interval_secs == 0 {
            bail!("refresh_interval_secs must be greater than zero");
        }
        if self.mqtt.keep_alive_secs == 0 {
            bail!("mqtt.keep_alive_secs must be greater than zero");
        }
        if self.display.width == 0 || self.display.height == 0 {
            bail!("Display size must not be zero");
        }

        self.check_layout_fits()
            .context("Status screen does not fit the display")
    }

    /// Render a worst-case screen to make sure every line fits the frame
    fn check_layout_fits(&self) -> Result<()> {
        let font = MonoFontRasterizer::from_choice(self.layout.font);
        let engine = LayoutEngine::new(self.layout.clone()).with_nodes(&self.nodes);
        let widest = NodeValues {
            temperature: -88.8,
            humidity: 100.0,
        };
        let snapshot = RegistrySnapshot::from_nodes(
            self.nodes
                .iter()
                .map(|node| (node.id.clone(), widest))
                .collect(),
        );
        let now = NaiveDate::from_ymd_opt(2088, 12, 28)
            .and_then(|date| date.and_hms_opt(23, 58, 58))
            .ok_or_else(|| anyhow!("invalid sample timestamp"))?;
        let address = "255.255.255.255";

        let mut frame = Frame::new(self.display.width, self.display.height, self.display.rotation);
        engine.render(&mut frame, &snapshot, &now, address, &font)?;
        Ok(())
    }
}
