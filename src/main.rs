use anyhow::{Context, Result};
use clap::Parser;
use log::{error, info, warn};
use ruuvi_epaper::config::AppConfig;
use ruuvi_epaper::core::{run_ingestion, RefreshScheduler};
use ruuvi_epaper_core::{MessageHandler, SensorRegistry};
use ruuvi_epaper_displayers::{DisplayDriver, PreviewDisplay};
use ruuvi_epaper_render::{LayoutEngine, MonoFontRasterizer};
use ruuvi_epaper_sources::MqttBus;
use ruuvi_epaper_types::EpaperConfig;
use std::path::PathBuf;
use tokio::sync::watch;

/// ruuvi-epaper - RuuviTag temperature and humidity on a tri-color e-paper display
#[derive(Parser, Debug, Clone)]
#[command(name = "ruuvi-epaper")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Debug verbosity level (0=quiet, 1=info, 2=debug, 3=trace)
    #[arg(short = 'd', long = "debug", value_name = "LEVEL", default_value = "0")]
    debug: u8,

    /// Log frames instead of driving the e-paper panel
    #[arg(long = "dry-run")]
    dry_run: bool,

    /// Configuration file to load instead of the one in the user config directory
    #[arg(value_name = "CONFIG_FILE")]
    config_file: Option<PathBuf>,
}

#[cfg(target_os = "linux")]
fn open_panel(config: &EpaperConfig) -> Result<Box<dyn DisplayDriver>> {
    use ruuvi_epaper_displayers::{Epd2in7b, LinuxSpiInterface};

    let interface = LinuxSpiInterface::open(config)
        .with_context(|| format!("Failed to open e-paper panel on {}", config.spi_device))?;
    Ok(Box::new(Epd2in7b::new(interface, config)))
}

#[cfg(not(target_os = "linux"))]
fn open_panel(_config: &EpaperConfig) -> Result<Box<dyn DisplayDriver>> {
    anyhow::bail!("The e-paper panel is only supported on Linux, use --dry-run")
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Level 0 (default): warn only
    // Level 1: info
    // Level 2: debug
    // Level 3+: trace (includes the ASCII preview in dry-run mode)
    let log_level = match cli.debug {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    // Allow RUST_LOG to override CLI setting
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    warn!("Starting ruuvi-epaper v{}", env!("CARGO_PKG_VERSION"));

    let config = match &cli.config_file {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    config.validate().context("Invalid configuration")?;
    info!(
        "Showing {} nodes from {}:{}",
        config.nodes.len(),
        config.mqtt.host,
        config.mqtt.port
    );

    let display: Box<dyn DisplayDriver> = if cli.dry_run {
        Box::new(PreviewDisplay::new(&config.display))
    } else {
        open_panel(&config.display)?
    };

    let registry = SensorRegistry::new(config.node_ids());
    let mut scheduler = RefreshScheduler::new(
        registry.clone(),
        display,
        MonoFontRasterizer::from_choice(config.layout.font),
        LayoutEngine::new(config.layout.clone()).with_nodes(&config.nodes),
        config.display.rotation,
        config.refresh_interval(),
    );

    let ingestion = tokio::spawn(run_ingestion(
        MqttBus::new(&config.mqtt),
        MessageHandler::new(registry),
        scheduler.reception(),
        config.mqtt.reconnect_delay(),
    ));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                warn!("Interrupted, shutting down");
                let _ = shutdown_tx.send(true);
            }
            Err(e) => {
                error!("Failed to listen for Ctrl-C: {}", e);
                // Keep the sender alive so the scheduler keeps running
                std::future::pending::<()>().await;
                drop(shutdown_tx);
            }
        }
    });

    scheduler.run(shutdown_rx).await;

    // Dropping the scheduler closes the reception gate for good
    drop(scheduler);
    if let Err(e) = ingestion.await {
        error!("Ingestion task failed: {}", e);
    }

    warn!("ruuvi-epaper stopped");
    Ok(())
}
