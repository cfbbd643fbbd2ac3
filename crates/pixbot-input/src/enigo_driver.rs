use anyhow::{Context, Result};
use enigo::{Coordinate, Direction, Enigo, Keyboard, Mouse, Settings};
use pixbot_capture::Point;
use std::thread::sleep;
use std::time::Duration;
use tracing::trace;

use crate::humanize::{curved_path, jitter_target, random_control, step_count, STEP_INTERVAL};
use crate::{Button, InputDriver, Key};

/// Real input through enigo.
pub struct EnigoDriver {
    enigo: Enigo,
}

impl EnigoDriver {
    pub fn new() -> Result<Self> {
        let enigo =
            Enigo::new(&Settings::default()).context("Failed to connect to the input backend")?;
        Ok(Self { enigo })
    }
}

fn map_button(button: Button) -> enigo::Button {
    match button {
        Button::Left => enigo::Button::Left,
        Button::Right => enigo::Button::Right,
    }
}

fn map_key(key: Key) -> enigo::Key {
    match key {
        Key::Char(c) => enigo::Key::Unicode(c),
        Key::Escape => enigo::Key::Escape,
        Key::Enter => enigo::Key::Return,
        Key::Tab => enigo::Key::Tab,
        Key::Space => enigo::Key::Space,
        Key::Control => enigo::Key::Control,
        Key::Shift => enigo::Key::Shift,
        Key::Alt => enigo::Key::Alt,
        Key::F(n) => match n {
            1 => enigo::Key::F1,
            2 => enigo::Key::F2,
            3 => enigo::Key::F3,
            4 => enigo::Key::F4,
            5 => enigo::Key::F5,
            6 => enigo::Key::F6,
            7 => enigo::Key::F7,
            8 => enigo::Key::F8,
            9 => enigo::Key::F9,
            10 => enigo::Key::F10,
            11 => enigo::Key::F11,
            _ => enigo::Key::F12,
        },
    }
}

impl InputDriver for EnigoDriver {
    fn move_pointer(&mut self, to: Point, duration: Duration, jitter: i32) -> Result<()> {
        let mut rng = rand::thread_rng();
        let target = jitter_target(to, jitter, &mut rng);
        let (x, y) = self.enigo.location().context("Failed to read pointer location")?;
        let from = Point::new(x, y);

        let control = random_control(from, target, &mut rng);
        let path = curved_path(from, control, target, step_count(duration));
        trace!(
            "moving pointer ({}, {}) -> ({}, {}) in {} steps",
            x,
            y,
            target.x,
            target.y,
            path.len()
        );
        for p in path {
            self.enigo
                .move_mouse(p.x, p.y, Coordinate::Abs)
                .context("Failed to move pointer")?;
            sleep(STEP_INTERVAL);
        }
        Ok(())
    }

    fn click(&mut self, button: Button) -> Result<()> {
        self.enigo
            .button(map_button(button), Direction::Click)
            .context("Failed to click")?;
        Ok(())
    }

    fn key_down(&mut self, key: Key) -> Result<()> {
        self.enigo
            .key(map_key(key), Direction::Press)
            .with_context(|| format!("Failed to press {}", key))?;
        Ok(())
    }

    fn key_up(&mut self, key: Key) -> Result<()> {
        self.enigo
            .key(map_key(key), Direction::Release)
            .with_context(|| format!("Failed to release {}", key))?;
        Ok(())
    }

    fn tap_key(&mut self, key: Key) -> Result<()> {
        self.enigo
            .key(map_key(key), Direction::Click)
            .with_context(|| format!("Failed to tap {}", key))?;
        Ok(())
    }
}
