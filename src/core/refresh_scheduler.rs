//! Periodic snapshot, render and paint of the status screen

use super::network;
use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use log::{debug, error, info};
use ruuvi_epaper_core::SensorRegistry;
use ruuvi_epaper_displayers::DisplayDriver;
use ruuvi_epaper_render::{FontRasterizer, Frame, LayoutEngine};
use ruuvi_epaper_types::Rotation;
use std::time::{Duration, Instant};
use tokio::runtime::{Handle, RuntimeFlavor};
use tokio::sync::watch;

fn local_now() -> NaiveDateTime {
    chrono::Local::now().naive_local()
}

/// Drives the display from the sensor registry
///
/// Owns the reception gate: it is open while the scheduler waits out the
/// refresh interval and closed while a frame is composed and painted.
pub struct RefreshScheduler<D: DisplayDriver, F: FontRasterizer> {
    registry: SensorRegistry,
    display: D,
    font: F,
    layout: LayoutEngine,
    rotation: Rotation,
    interval: Duration,
    reception: watch::Sender<bool>,
    clock: fn() -> NaiveDateTime,
    address: fn() -> String,
    display_ready: bool,
    refreshes: u64,
}

impl<D: DisplayDriver, F: FontRasterizer> RefreshScheduler<D, F> {
    pub fn new(
        registry: SensorRegistry,
        display: D,
        font: F,
        layout: LayoutEngine,
        rotation: Rotation,
        interval: Duration,
    ) -> Self {
        let (reception, _) = watch::channel(false);
        Self {
            registry,
            display,
            font,
            layout,
            rotation,
            interval,
            reception,
            clock: local_now,
            address: network::local_address,
            display_ready: false,
            refreshes: 0,
        }
    }

    /// Replace the wall clock used for the header
    pub fn with_clock(mut self, clock: fn() -> NaiveDateTime) -> Self {
        self.clock = clock;
        self
    }

    /// Replace the lookup of the address shown in the footer
    pub fn with_address(mut self, address: fn() -> String) -> Self {
        self.address = address;
        self
    }

    /// A receiver of the reception gate, `true` while messages may be consumed
    pub fn reception(&self) -> watch::Receiver<bool> {
        self.reception.subscribe()
    }

    /// Number of frames painted successfully
    pub fn refreshes(&self) -> u64 {
        self.refreshes
    }

    fn set_reception(&self, open: bool) {
        self.reception.send_replace(open);
    }

    /// Snapshot the registry, render a fresh frame and paint it
    pub fn refresh_once(&mut self) -> Result<()> {
        if !self.display_ready {
            self.display
                .initialize()
                .context("Failed to initialize display")?;
            self.display_ready = true;
        }

        let started = Instant::now();
        let snapshot = self.registry.snapshot();
        let now = (self.clock)();
        let address = (self.address)();

        let (width, height) = self.display.native_size();
        let mut frame = Frame::new(width, height, self.rotation);
        self.layout
            .render(&mut frame, &snapshot, &now, &address, &self.font)
            .context("Failed to render status screen")?;

        if let Err(e) = self
            .display
            .paint(frame.black().as_bytes(), frame.red().as_bytes())
        {
            // Start over with a fresh init sequence next time
            self.display_ready = false;
            return Err(e).context("Failed to paint frame");
        }

        self.refreshes += 1;
        info!(
            "Display refreshed: {} nodes, address {} ({:?})",
            snapshot.len(),
            address,
            started.elapsed()
        );
        for (node, values) in snapshot.iter() {
            debug!(
                "  {}: {:.1} °C, {:.1} %H",
                node, values.temperature, values.humidity
            );
        }
        Ok(())
    }

    /// Refresh every interval until `shutdown` turns `true` or its sender is dropped
    ///
    /// A failed cycle is logged and the loop carries on. On a multi-thread
    /// runtime the blocking paint moves other tasks off this worker first.
    pub async fn run(&mut self, mut shutdown: watch::Receiver<bool>) {
        info!("Refreshing the display every {:?}", self.interval);

        loop {
            if *shutdown.borrow_and_update() {
                break;
            }

            self.set_reception(true);
            let stop = tokio::select! {
                _ = tokio::time::sleep(self.interval) => false,
                changed = shutdown.changed() => changed.is_err() || *shutdown.borrow(),
            };
            self.set_reception(false);

            if stop {
                break;
            }
            let result = match Handle::current().runtime_flavor() {
                RuntimeFlavor::MultiThread => {
                    tokio::task::block_in_place(|| self.refresh_once())
                }
                _ => self.refresh_once(),
            };
            if let Err(e) = result {
                error!("Refresh failed: {:#}", e);
            }
        }

        info!("Refresh scheduler stopped");
    }
}
