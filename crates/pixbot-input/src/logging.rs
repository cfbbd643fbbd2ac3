use anyhow::Result;
use pixbot_capture::Point;
use std::time::Duration;
use tracing::info;

use crate::{Button, InputDriver, Key};

/// Dry-run driver: logs every primitive instead of touching the OS.
#[derive(Debug, Default)]
pub struct LoggingDriver {
    steps: usize,
}

impl LoggingDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of primitives issued so far.
    pub fn steps(&self) -> usize {
        self.steps
    }

    fn log(&mut self, what: std::fmt::Arguments<'_>) {
        self.steps += 1;
        info!("[dry-run #{}] {}", self.steps, what);
    }
}

impl InputDriver for LoggingDriver {
    fn move_pointer(&mut self, to: Point, duration: Duration, jitter: i32) -> Result<()> {
        self.log(format_args!(
            "move_pointer({}, {}) over {:.2}s ±{}px",
            to.x,
            to.y,
            duration.as_secs_f64(),
            jitter
        ));
        Ok(())
    }

    fn click(&mut self, button: Button) -> Result<()> {
        self.log(format_args!("click({})", button));
        Ok(())
    }

    fn key_down(&mut self, key: Key) -> Result<()> {
        self.log(format_args!("key_down({})", key));
        Ok(())
    }

    fn key_up(&mut self, key: Key) -> Result<()> {
        self.log(format_args!("key_up({})", key));
        Ok(())
    }

    fn tap_key(&mut self, key: Key) -> Result<()> {
        self.log(format_args!("tap_key({})", key));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ActionStep;

    #[test]
    fn test_counts_steps() {
        let mut driver = LoggingDriver::new();
        driver
            .execute(&ActionStep::MoveTo {
                point: Point::new(1, 2),
                duration: Duration::from_millis(300),
                jitter: 5,
            })
            .unwrap();
        driver.execute(&ActionStep::Click(Button::Left)).unwrap();
        driver.execute(&ActionStep::Tap(Key::Escape)).unwrap();
        assert_eq!(driver.steps(), 3);
    }
}
