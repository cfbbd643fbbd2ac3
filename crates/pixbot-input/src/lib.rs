use anyhow::Result;
use pixbot_capture::Point;
use std::fmt;
use std::time::Duration;

pub mod clock;
#[cfg(feature = "desktop")]
mod enigo_driver;
#[cfg(feature = "desktop")]
mod hotkey;
pub mod humanize;
mod key;
mod logging;

pub use clock::{random_duration, wait, Clock, SystemClock};
#[cfg(feature = "desktop")]
pub use enigo_driver::EnigoDriver;
#[cfg(feature = "desktop")]
pub use hotkey::spawn_kill_switch;
pub use key::{Button, Key};
pub use logging::LoggingDriver;

/// One primitive input with real side effects on the UI.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ActionStep {
    MoveTo {
        point: Point,
        duration: Duration,
        jitter: i32,
    },
    Click(Button),
    KeyDown(Key),
    KeyUp(Key),
    Tap(Key),
}

impl fmt::Display for ActionStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionStep::MoveTo {
                point,
                duration,
                jitter,
            } => write!(
                f,
                "move to ({}, {}) over {:.2}s ±{}px",
                point.x,
                point.y,
                duration.as_secs_f64(),
                jitter
            ),
            ActionStep::Click(b) => write!(f, "{} click", b),
            ActionStep::KeyDown(k) => write!(f, "{} down", k),
            ActionStep::KeyUp(k) => write!(f, "{} up", k),
            ActionStep::Tap(k) => write!(f, "tap {}", k),
        }
    }
}

/// Synthesizes pointer and keyboard input at absolute display coordinates.
pub trait InputDriver {
    /// Move the pointer to `to`, offset by up to `jitter` pixels, taking roughly `duration`.
    fn move_pointer(&mut self, to: Point, duration: Duration, jitter: i32) -> Result<()>;
    fn click(&mut self, button: Button) -> Result<()>;
    fn key_down(&mut self, key: Key) -> Result<()>;
    fn key_up(&mut self, key: Key) -> Result<()>;
    fn tap_key(&mut self, key: Key) -> Result<()>;

    fn execute(&mut self, step: &ActionStep) -> Result<()> {
        match *step {
            ActionStep::MoveTo {
                point,
                duration,
                jitter,
            } => self.move_pointer(point, duration, jitter),
            ActionStep::Click(button) => self.click(button),
            ActionStep::KeyDown(key) => self.key_down(key),
            ActionStep::KeyUp(key) => self.key_up(key),
            ActionStep::Tap(key) => self.tap_key(key),
        }
    }
}
