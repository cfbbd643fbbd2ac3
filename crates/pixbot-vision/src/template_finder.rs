use anyhow::{bail, Context, Result};
use image::{GrayImage, RgbaImage};
use pixbot_capture::{crop_region, Point, Region};
use pixbot_config::HsvRange;
use pixbot_state::DetectionResult;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info, trace, warn};

use crate::color::color_filter;

/// One template lookup: which template, how sure, and where to look.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub template_id: String,
    /// A match needs a score strictly above this
    pub threshold: f64,
    /// Restrict the search to this part of the frame
    pub roi: Option<Region>,
    /// Mask both frame and template to this color range before matching
    pub color_filter: Option<HsvRange>,
}

impl SearchRequest {
    pub fn new(template_id: impl Into<String>, threshold: f64) -> Self {
        Self {
            template_id: template_id.into(),
            threshold,
            roi: None,
            color_filter: None,
        }
    }

    pub fn roi(mut self, roi: Region) -> Self {
        self.roi = Some(roi);
        self
    }

    pub fn color_filter(mut self, range: HsvRange) -> Self {
        self.color_filter = Some(range);
        self
    }
}

/// Locates reference images inside a frame.
pub trait TemplateMatcher {
    /// Search `image` for the requested template. The returned location is the
    /// center of the best match in `image` coordinates.
    fn search(&self, request: &SearchRequest, image: &RgbaImage) -> Result<DetectionResult>;
}

/// Pre-processed reference image
struct Template {
    rgba: RgbaImage,
    gray: GrayImage,
}

/// Template matcher over a directory of PNG references.
///
/// `assets/templates/play_btn.png` is addressed as `PLAY_BTN`.
pub struct TemplateFinder {
    templates: HashMap<String, Template>,
}

impl TemplateFinder {
    /// Load every PNG in `dir`. A missing directory yields an empty finder.
    pub fn load(dir: &Path) -> Result<Self> {
        let mut templates = HashMap::new();

        if !dir.is_dir() {
            warn!("Template directory {} not found, no templates loaded", dir.display());
            return Ok(Self { templates });
        }

        let entries = std::fs::read_dir(dir)
            .with_context(|| format!("Failed to read {}", dir.display()))?;
        for entry in entries.flatten() {
            let path = entry.path();
            let is_png = path
                .extension()
                .map_or(false, |ext| ext.eq_ignore_ascii_case("png"));
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            if !is_png {
                continue;
            }

            match image::open(&path) {
                Ok(img) => {
                    let id = stem.to_uppercase();
                    debug!("Loaded template {} from {}", id, path.display());
                    templates.insert(id, Template::new(img.to_rgba8()));
                }
                Err(e) => warn!("Failed to load template {}: {}", path.display(), e),
            }
        }

        info!(
            "TemplateFinder loaded {} templates from {}",
            templates.len(),
            dir.display()
        );
        Ok(Self { templates })
    }

    /// Build a finder from in-memory images, keyed by id.
    pub fn from_images(images: impl IntoIterator<Item = (String, RgbaImage)>) -> Self {
        Self {
            templates: images
                .into_iter()
                .map(|(id, img)| (id, Template::new(img)))
                .collect(),
        }
    }

    pub fn template_count(&self) -> usize {
        self.templates.len()
    }

    pub fn contains(&self, template_id: &str) -> bool {
        self.templates.contains_key(template_id)
    }
}

impl Template {
    fn new(rgba: RgbaImage) -> Self {
        let gray = image::imageops::grayscale(&rgba);
        Self { rgba, gray }
    }
}

impl TemplateMatcher for TemplateFinder {
    fn search(&self, request: &SearchRequest, image: &RgbaImage) -> Result<DetectionResult> {
        let Some(template) = self.templates.get(&request.template_id) else {
            bail!("Unknown template {}", request.template_id);
        };

        let (area, origin) = match request.roi {
            Some(roi) => (crop_region(image, &roi), roi.top_left()),
            None => (image.clone(), Point::new(0, 0)),
        };

        let (haystack, needle) = match &request.color_filter {
            Some(range) => {
                let (_, area) = color_filter(&area, range);
                let (_, tmpl) = color_filter(&template.rgba, range);
                (
                    image::imageops::grayscale(&area),
                    image::imageops::grayscale(&tmpl),
                )
            }
            None => (image::imageops::grayscale(&area), template.gray.clone()),
        };

        let Some((x, y, score)) = best_match(&haystack, &needle) else {
            trace!("{}: template larger than search area", request.template_id);
            return Ok(DetectionResult::not_found(0.0));
        };

        trace!(
            "{}: best score {:.3} at ({}, {})",
            request.template_id,
            score,
            x,
            y
        );
        if score > request.threshold {
            let center = origin.offset(
                (x + needle.width() / 2) as i32,
                (y + needle.height() / 2) as i32,
            );
            Ok(DetectionResult::found(center, score))
        } else {
            Ok(DetectionResult::not_found(score))
        }
    }
}

/// Summed-area tables of pixel values and squared values.
struct Integral {
    width: usize,
    sum: Vec<f64>,
    sq: Vec<f64>,
}

impl Integral {
    fn new(img: &GrayImage) -> Self {
        let (w, h) = (img.width() as usize, img.height() as usize);
        let stride = w + 1;
        let mut sum = vec![0.0; stride * (h + 1)];
        let mut sq = vec![0.0; stride * (h + 1)];
        for y in 0..h {
            let mut row_sum = 0.0;
            let mut row_sq = 0.0;
            for x in 0..w {
                let v = img.get_pixel(x as u32, y as u32)[0] as f64;
                row_sum += v;
                row_sq += v * v;
                sum[(y + 1) * stride + x + 1] = sum[y * stride + x + 1] + row_sum;
                sq[(y + 1) * stride + x + 1] = sq[y * stride + x + 1] + row_sq;
            }
        }
        Self {
            width: stride,
            sum,
            sq,
        }
    }

    fn window(&self, table: &[f64], x: usize, y: usize, w: usize, h: usize) -> f64 {
        let s = self.width;
        table[(y + h) * s + x + w] - table[y * s + x + w] - table[(y + h) * s + x]
            + table[y * s + x]
    }
}

/// Zero-mean normalized cross-correlation of `tmpl` slid over every position of `img`.
///
/// Returns the top-left of the best window and its score in -1.0..=1.0, or
/// `None` when the template does not fit inside the image.
fn best_match(img: &GrayImage, tmpl: &GrayImage) -> Option<(u32, u32, f64)> {
    let (iw, ih) = (img.width() as usize, img.height() as usize);
    let (tw, th) = (tmpl.width() as usize, tmpl.height() as usize);
    if tw == 0 || th == 0 || tw > iw || th > ih {
        return None;
    }

    let n = (tw * th) as f64;
    let tmpl_mean = tmpl.pixels().map(|p| p[0] as f64).sum::<f64>() / n;
    let centered: Vec<f64> = tmpl.pixels().map(|p| p[0] as f64 - tmpl_mean).collect();
    let tmpl_std = (centered.iter().map(|v| v * v).sum::<f64>() / n).sqrt();

    let integral = Integral::new(img);
    let raw = img.as_raw();

    let mut best = (0u32, 0u32, f64::NEG_INFINITY);
    for y in 0..=(ih - th) {
        for x in 0..=(iw - tw) {
            let mean = integral.window(&integral.sum, x, y, tw, th) / n;
            let var = integral.window(&integral.sq, x, y, tw, th) / n - mean * mean;
            let denom = var.max(0.0).sqrt() * tmpl_std;

            let score = if denom < 1e-10 {
                0.0
            } else {
                let mut cross = 0.0;
                for j in 0..th {
                    let row = (y + j) * iw + x;
                    let trow = j * tw;
                    for i in 0..tw {
                        cross += raw[row + i] as f64 * centered[trow + i];
                    }
                }
                cross / (n * denom)
            };

            if score > best.2 {
                best = (x as u32, y as u32, score);
            }
        }
    }
    Some(best)
}
