//! Pointer paths that do not look machine-generated.

use pixbot_capture::Point;
use rand::Rng;
use std::time::Duration;

/// Interval between intermediate pointer positions.
pub const STEP_INTERVAL: Duration = Duration::from_millis(10);

/// Offset `target` by up to `radius` pixels in each axis.
pub fn jitter_target<R: Rng>(target: Point, radius: i32, rng: &mut R) -> Point {
    if radius <= 0 {
        return target;
    }
    target.offset(
        rng.gen_range(-radius..=radius),
        rng.gen_range(-radius..=radius),
    )
}

/// Number of intermediate positions for a move lasting `duration`.
pub fn step_count(duration: Duration) -> usize {
    ((duration.as_millis() / STEP_INTERVAL.as_millis()) as usize).max(1)
}

/// Control point for a gently curved path: the midpoint pushed sideways by
/// up to 15% of the distance.
pub fn random_control<R: Rng>(from: Point, to: Point, rng: &mut R) -> Point {
    let (dx, dy) = ((to.x - from.x) as f64, (to.y - from.y) as f64);
    let bend = rng.gen_range(-0.15..=0.15);
    let mid = Point::new((from.x + to.x) / 2, (from.y + to.y) / 2);
    mid.offset((-dy * bend) as i32, (dx * bend) as i32)
}

/// Quadratic bezier from `from` to `to` with smoothstep easing.
///
/// Returns `steps` points; the last one is exactly `to`.
pub fn curved_path(from: Point, control: Point, to: Point, steps: usize) -> Vec<Point> {
    let steps = steps.max(1);
    (1..=steps)
        .map(|i| {
            let t = i as f64 / steps as f64;
            let t = t * t * (3.0 - 2.0 * t);
            let u = 1.0 - t;
            let x = u * u * from.x as f64 + 2.0 * u * t * control.x as f64 + t * t * to.x as f64;
            let y = u * u * from.y as f64 + 2.0 * u * t * control.y as f64 + t * t * to.y as f64;
            Point::new(x.round() as i32, y.round() as i32)
        })
        .collect()
}
