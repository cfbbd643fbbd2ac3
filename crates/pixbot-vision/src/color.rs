use image::{GrayImage, Luma, Rgba, RgbaImage};
use pixbot_config::HsvRange;

/// Mean over the R, G and B channels of every pixel. Alpha is ignored.
pub fn mean_brightness(img: &RgbaImage) -> f64 {
    let [r, g, b] = channel_means(img);
    (r + g + b) / 3.0
}

/// Per-channel means in R, G, B order.
pub fn channel_means(img: &RgbaImage) -> [f64; 3] {
    let n = (img.width() as u64 * img.height() as u64) as f64;
    if n == 0.0 {
        return [0.0; 3];
    }
    let mut sums = [0u64; 3];
    for px in img.pixels() {
        sums[0] += px[0] as u64;
        sums[1] += px[1] as u64;
        sums[2] += px[2] as u64;
    }
    [sums[0] as f64 / n, sums[1] as f64 / n, sums[2] as f64 / n]
}

/// Mean of the HSV value channel, i.e. of `max(r, g, b)` per pixel.
pub fn mean_value(img: &RgbaImage) -> f64 {
    let n = (img.width() as u64 * img.height() as u64) as f64;
    if n == 0.0 {
        return 0.0;
    }
    let sum: u64 = img
        .pixels()
        .map(|px| px[0].max(px[1]).max(px[2]) as u64)
        .sum();
    sum as f64 / n
}

/// RGB to HSV in OpenCV's 8-bit scale: H in 0..180, S and V in 0..=255.
pub fn rgb_to_hsv(r: u8, g: u8, b: u8) -> [u8; 3] {
    let (rf, gf, bf) = (r as f64, g as f64, b as f64);
    let max = rf.max(gf).max(bf);
    let min = rf.min(gf).min(bf);
    let delta = max - min;

    let v = max;
    let s = if max > 0.0 { delta / max * 255.0 } else { 0.0 };
    let h = if delta == 0.0 {
        0.0
    } else if max == rf {
        60.0 * (gf - bf) / delta
    } else if max == gf {
        120.0 + 60.0 * (bf - rf) / delta
    } else {
        240.0 + 60.0 * (rf - gf) / delta
    };
    let h = if h < 0.0 { h + 360.0 } else { h };

    [
        ((h / 2.0).round() as u32).min(179) as u8,
        s.round() as u8,
        v.round() as u8,
    ]
}

fn in_range(hsv: [u8; 3], range: &HsvRange) -> bool {
    (0..3).all(|i| hsv[i] >= range.lower[i] && hsv[i] <= range.upper[i])
}

/// Keep only the pixels whose color falls inside `range`.
///
/// Returns the binary mask and the input with every other pixel blacked out.
pub fn color_filter(img: &RgbaImage, range: &HsvRange) -> (GrayImage, RgbaImage) {
    let (w, h) = img.dimensions();
    let mut mask = GrayImage::new(w, h);
    let mut filtered = RgbaImage::new(w, h);
    for (x, y, px) in img.enumerate_pixels() {
        if in_range(rgb_to_hsv(px[0], px[1], px[2]), range) {
            mask.put_pixel(x, y, Luma([255]));
            filtered.put_pixel(x, y, *px);
        } else {
            filtered.put_pixel(x, y, Rgba([0, 0, 0, px[3]]));
        }
    }
    (mask, filtered)
}
