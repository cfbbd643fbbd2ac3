use anyhow::Result;
use image::RgbaImage;
use serde::{Deserialize, Serialize};

#[cfg(feature = "desktop")]
pub mod monitor;
pub mod replay;

#[cfg(feature = "desktop")]
pub use monitor::MonitorScreen;
pub use replay::ReplayScreen;

/// A pixel position. Signed so that offsets left of or above an anchor stay representable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

/// Rectangle in frame pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Region {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Region {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Region of the given size centered on `center`, clamped at the frame origin.
    pub fn centered(center: Point, width: u32, height: u32) -> Self {
        let x = center.x - (width / 2) as i32;
        let y = center.y - (height / 2) as i32;
        Self {
            x: x.max(0) as u32,
            y: y.max(0) as u32,
            width,
            height,
        }
    }

    pub fn top_left(&self) -> Point {
        Point::new(self.x as i32, self.y as i32)
    }

    pub fn center(&self) -> Point {
        Point::new(
            (self.x + self.width / 2) as i32,
            (self.y + self.height / 2) as i32,
        )
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x as i32
            && p.y >= self.y as i32
            && p.x < (self.x + self.width) as i32
            && p.y < (self.y + self.height) as i32
    }
}

/// Source of frames plus the mapping from frame coordinates to input coordinates.
///
/// Every call to `grab` must return a fresh snapshot; callers never reuse a
/// frame across decisions.
pub trait Screen {
    fn grab(&mut self) -> Result<RgbaImage>;

    /// Map a point in frame coordinates to an absolute pointer target.
    fn to_display(&self, p: Point) -> Point;
}

/// Crop a region from a captured frame, clamped to the frame bounds.
pub fn crop_region(frame: &RgbaImage, region: &Region) -> RgbaImage {
    let (w, h) = (frame.width(), frame.height());

    let x = region.x.min(w.saturating_sub(1));
    let y = region.y.min(h.saturating_sub(1));
    let rw = region.width.min(w - x);
    let rh = region.height.min(h - y);

    image::imageops::crop_imm(frame, x, y, rw, rh).to_image()
}
