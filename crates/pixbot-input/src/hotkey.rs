use anyhow::{anyhow, Context, Result};
use rdev::EventType;
use std::thread;
use tracing::{error, info};

use crate::Key;

fn map_key(key: Key) -> Option<rdev::Key> {
    use rdev::Key as R;
    let mapped = match key {
        Key::Escape => R::Escape,
        Key::Enter => R::Return,
        Key::Tab => R::Tab,
        Key::Space => R::Space,
        Key::Control => R::ControlLeft,
        Key::Shift => R::ShiftLeft,
        Key::Alt => R::Alt,
        Key::F(n) => match n {
            1 => R::F1,
            2 => R::F2,
            3 => R::F3,
            4 => R::F4,
            5 => R::F5,
            6 => R::F6,
            7 => R::F7,
            8 => R::F8,
            9 => R::F9,
            10 => R::F10,
            11 => R::F11,
            12 => R::F12,
            _ => return None,
        },
        Key::Char(c) => match c.to_ascii_lowercase() {
            'a' => R::KeyA,
            'b' => R::KeyB,
            'c' => R::KeyC,
            'd' => R::KeyD,
            'e' => R::KeyE,
            'f' => R::KeyF,
            'g' => R::KeyG,
            'h' => R::KeyH,
            'i' => R::KeyI,
            'j' => R::KeyJ,
            'k' => R::KeyK,
            'l' => R::KeyL,
            'm' => R::KeyM,
            'n' => R::KeyN,
            'o' => R::KeyO,
            'p' => R::KeyP,
            'q' => R::KeyQ,
            'r' => R::KeyR,
            's' => R::KeyS,
            't' => R::KeyT,
            'u' => R::KeyU,
            'v' => R::KeyV,
            'w' => R::KeyW,
            'x' => R::KeyX,
            'y' => R::KeyY,
            'z' => R::KeyZ,
            '0' => R::Num0,
            '1' => R::Num1,
            '2' => R::Num2,
            '3' => R::Num3,
            '4' => R::Num4,
            '5' => R::Num5,
            '6' => R::Num6,
            '7' => R::Num7,
            '8' => R::Num8,
            '9' => R::Num9,
            _ => return None,
        },
    };
    Some(mapped)
}

/// Listen for `key` system-wide on a background thread and call `on_press`
/// whenever it goes down, whichever window has focus.
///
/// The listener lives until the process exits.
pub fn spawn_kill_switch<F>(key: Key, on_press: F) -> Result<()>
where
    F: Fn() + Send + 'static,
{
    let target = map_key(key).ok_or_else(|| anyhow!("{} cannot be used as a global hotkey", key))?;
    thread::Builder::new()
        .name("kill-switch".into())
        .spawn(move || {
            let listened = rdev::listen(move |event| {
                if let EventType::KeyPress(pressed) = event.event_type {
                    if pressed == target {
                        on_press();
                    }
                }
            });
            if let Err(e) = listened {
                error!("Global hotkey listener stopped: {:?}", e);
            }
        })
        .context("Failed to start the hotkey thread")?;
    info!("Press {} anywhere to stop", key);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_maps_config_keys() {
        assert_eq!(map_key(Key::F(12)), Some(rdev::Key::F12));
        assert_eq!(map_key(Key::Char('Q')), Some(rdev::Key::KeyQ));
        assert_eq!(map_key(Key::Char('7')), Some(rdev::Key::Num7));
        assert_eq!(map_key(Key::Escape), Some(rdev::Key::Escape));
        assert_eq!(map_key(Key::Char('#')), None);
    }
}
