use anyhow::{bail, Context, Result};
use image::RgbaImage;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::{Point, Screen};

/// Serves recorded frames instead of a live monitor.
///
/// Frames are played back in file-name order; once the last frame has been
/// served it keeps being returned, which models a UI that stopped changing.
/// Display coordinates are identical to frame coordinates.
pub struct ReplayScreen {
    frames: Vec<RgbaImage>,
    next: usize,
}

impl ReplayScreen {
    pub fn from_frames(frames: Vec<RgbaImage>) -> Result<Self> {
        if frames.is_empty() {
            bail!("Replay needs at least one frame");
        }
        Ok(Self { frames, next: 0 })
    }

    /// Load every `*.png` in `dir`, sorted by file name.
    pub fn load_dir(dir: &Path) -> Result<Self> {
        let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)
            .with_context(|| format!("Failed to read replay directory {}", dir.display()))?
            .flatten()
            .map(|e| e.path())
            .filter(|p| {
                p.extension()
                    .map_or(false, |ext| ext.eq_ignore_ascii_case("png"))
            })
            .collect();
        paths.sort();

        let mut frames = Vec::with_capacity(paths.len());
        for path in &paths {
            let img = image::open(path)
                .with_context(|| format!("Failed to open {}", path.display()))?
                .to_rgba8();
            debug!("Replay frame {}: {}x{}", path.display(), img.width(), img.height());
            frames.push(img);
        }

        info!("Loaded {} replay frame(s) from {}", frames.len(), dir.display());
        Self::from_frames(frames)
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl Screen for ReplayScreen {
    fn grab(&mut self) -> Result<RgbaImage> {
        let idx = self.next.min(self.frames.len() - 1);
        if self.next < self.frames.len() {
            self.next += 1;
        }
        Ok(self.frames[idx].clone())
    }

    fn to_display(&self, p: Point) -> Point {
        p
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(v: u8) -> RgbaImage {
        RgbaImage::from_pixel(4, 4, image::Rgba([v, v, v, 255]))
    }

    #[test]
    fn test_replay_repeats_last_frame() {
        let mut screen = ReplayScreen::from_frames(vec![solid(10), solid(20)]).unwrap();
        assert_eq!(screen.grab().unwrap().get_pixel(0, 0)[0], 10);
        assert_eq!(screen.grab().unwrap().get_pixel(0, 0)[0], 20);
        assert_eq!(screen.grab().unwrap().get_pixel(0, 0)[0], 20);
    }

    #[test]
    fn test_replay_rejects_empty() {
        assert!(ReplayScreen::from_frames(Vec::new()).is_err());
    }

    #[test]
    fn test_load_dir_sorts_by_name() {
        let dir = tempfile::tempdir().unwrap();
        solid(200).save(dir.path().join("b.png")).unwrap();
        solid(100).save(dir.path().join("a.png")).unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let mut screen = ReplayScreen::load_dir(dir.path()).unwrap();
        assert_eq!(screen.len(), 2);
        assert_eq!(screen.grab().unwrap().get_pixel(0, 0)[0], 100);
        assert_eq!(screen.grab().unwrap().get_pixel(0, 0)[0], 200);
        assert_eq!(screen.to_display(Point::new(3, 4)), Point::new(3, 4));
    }
}
