use anyhow::{bail, Result};
use std::fmt;
use std::str::FromStr;

/// Keyboard key as named in the config bindings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Char(char),
    Escape,
    Enter,
    Tab,
    Space,
    Control,
    Shift,
    Alt,
    /// Function key F1..F12
    F(u8),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Button {
    Left,
    Right,
}

impl FromStr for Key {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let name = s.trim().to_lowercase();
        let key = match name.as_str() {
            "esc" | "escape" => Key::Escape,
            "enter" | "return" => Key::Enter,
            "tab" => Key::Tab,
            "space" => Key::Space,
            "ctrl" | "control" => Key::Control,
            "shift" => Key::Shift,
            "alt" => Key::Alt,
            _ => {
                let mut chars = name.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Key::Char(c),
                    (Some('f'), Some(_)) => match name[1..].parse::<u8>() {
                        Ok(n) if (1..=12).contains(&n) => Key::F(n),
                        _ => bail!("Unknown key name '{}'", s),
                    },
                    _ => bail!("Unknown key name '{}'", s),
                }
            }
        };
        Ok(key)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Char(c) => write!(f, "{}", c),
            Key::Escape => f.write_str("esc"),
            Key::Enter => f.write_str("enter"),
            Key::Tab => f.write_str("tab"),
            Key::Space => f.write_str("space"),
            Key::Control => f.write_str("ctrl"),
            Key::Shift => f.write_str("shift"),
            Key::Alt => f.write_str("alt"),
            Key::F(n) => write!(f, "f{}", n),
        }
    }
}

impl fmt::Display for Button {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Button::Left => "left",
            Button::Right => "right",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_named_keys() {
        assert_eq!("esc".parse::<Key>().unwrap(), Key::Escape);
        assert_eq!("Ctrl".parse::<Key>().unwrap(), Key::Control);
        assert_eq!("shift".parse::<Key>().unwrap(), Key::Shift);
        assert_eq!("i".parse::<Key>().unwrap(), Key::Char('i'));
        assert_eq!("F12".parse::<Key>().unwrap(), Key::F(12));
        assert_eq!("f".parse::<Key>().unwrap(), Key::Char('f'));
    }

    #[test]
    fn test_parse_rejects_unknown() {
        assert!("f13".parse::<Key>().is_err());
        assert!("hyper".parse::<Key>().is_err());
        assert!("".parse::<Key>().is_err());
    }

    #[test]
    fn test_display_round_trips_through_parse() {
        for key in [Key::Escape, Key::Control, Key::Char('i'), Key::F(11)] {
            assert_eq!(key.to_string().parse::<Key>().unwrap(), key);
        }
    }
}
