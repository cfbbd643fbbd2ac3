use anyhow::{Context, Result};
use image::RgbaImage;
use tracing::{info, trace};
use xcap::Monitor;

use crate::{Point, Screen};

/// Captures one physical monitor through xcap.
///
/// Frame coordinates are relative to the monitor's top-left corner, so the
/// display mapping adds the monitor origin in the virtual desktop.
pub struct MonitorScreen {
    monitor: Monitor,
    origin: Point,
}

impl MonitorScreen {
    /// Open monitor `index` in xcap's enumeration order.
    pub fn open(index: usize) -> Result<Self> {
        let monitors = Monitor::all().context("Failed to enumerate monitors")?;
        let count = monitors.len();
        let monitor = monitors
            .into_iter()
            .nth(index)
            .with_context(|| format!("Monitor {} not found ({} available)", index, count))?;

        let origin = Point::new(
            monitor.x().context("Failed to read monitor x")?,
            monitor.y().context("Failed to read monitor y")?,
        );
        info!(
            "Capturing monitor {} ({}) at origin ({}, {})",
            index,
            monitor.name().unwrap_or_default(),
            origin.x,
            origin.y
        );

        Ok(Self { monitor, origin })
    }
}

impl Screen for MonitorScreen {
    fn grab(&mut self) -> Result<RgbaImage> {
        let img = self
            .monitor
            .capture_image()
            .context("Failed to capture monitor image")?;
        trace!("Grabbed {}x{} frame", img.width(), img.height());
        Ok(img)
    }

    fn to_display(&self, p: Point) -> Point {
        p.offset(self.origin.x, self.origin.y)
    }
}
