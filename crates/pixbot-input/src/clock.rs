use rand::Rng;
use std::thread;
use std::time::{Duration, Instant};

/// Time source for every wait the bot performs.
///
/// Flows only ever block through this trait, which lets tests run the
/// polling loops against virtual time.
pub trait Clock {
    /// Monotonic time since the clock was created.
    fn now(&self) -> Duration;

    fn sleep(&self, duration: Duration);
}

/// Wall-clock implementation backed by `std::thread::sleep`.
pub struct SystemClock {
    start: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.start.elapsed()
    }

    fn sleep(&self, duration: Duration) {
        thread::sleep(duration);
    }
}

/// Uniformly random duration in `[min, max]` seconds.
pub fn random_duration(min: f64, max: f64) -> Duration {
    let min = min.max(0.0);
    let secs = if max > min {
        rand::thread_rng().gen_range(min..=max)
    } else {
        min
    };
    Duration::from_secs_f64(secs)
}

/// Sleep for a random duration in `[min, max]` seconds.
pub fn wait(clock: &dyn Clock, min: f64, max: f64) -> Duration {
    let d = random_duration(min, max);
    clock.sleep(d);
    d
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_duration_in_bounds() {
        for _ in 0..200 {
            let d = random_duration(18.0, 22.0).as_secs_f64();
            assert!((18.0..=22.0).contains(&d), "{} out of range", d);
        }
    }

    #[test]
    fn test_random_duration_degenerate_range() {
        assert_eq!(random_duration(0.6, 0.6), Duration::from_secs_f64(0.6));
        assert_eq!(random_duration(0.5, 0.1), Duration::from_secs_f64(0.5));
        assert_eq!(random_duration(-1.0, -1.0), Duration::ZERO);
    }

    #[test]
    fn test_system_clock_advances() {
        let clock = SystemClock::new();
        let before = clock.now();
        clock.sleep(Duration::from_millis(5));
        assert!(clock.now() >= before + Duration::from_millis(5));
    }
}
