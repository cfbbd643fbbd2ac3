use anyhow::{ensure, Context, Result};
use pixbot_capture::{Point, Region};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Everything the bot knows about the fixed UI layout, loaded once at startup.
///
/// All sections fall back to the built-in 1280x720 layout, so a config file
/// only needs to list the values that differ.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: General,
    pub ui_pos: UiPositions,
    pub ui_roi: UiRegions,
    pub colors: ColorProfiles,
    pub bindings: KeyBindings,
    pub thresholds: Thresholds,
    pub timing: Timing,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct General {
    /// Monitor index as enumerated by the capture backend
    pub monitor: usize,
    pub templates_dir: PathBuf,
    /// Where diagnostic snapshots are written
    pub debug_dir: PathBuf,
}

impl Default for General {
    fn default() -> Self {
        Self {
            monitor: 0,
            templates_dir: PathBuf::from("assets/templates"),
            debug_dir: PathBuf::from("debug"),
        }
    }
}

/// Anchor coordinates and element sizes in frame pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiPositions {
    pub skill_right_x: i32,
    pub skill_y: i32,
    pub skill_width: u32,
    pub skill_height: u32,

    /// Center of the bottom-left belt slot
    pub potion1_x: i32,
    pub potion1_y: i32,
    pub potion_width: u32,
    pub potion_height: u32,
    /// Horizontal distance between belt columns
    pub potion_next: i32,
    pub belt_columns: u32,

    pub play_x_offline: i32,
    pub play_x_online: i32,
    pub play_y: i32,
    pub hell_x: i32,
    pub hell_y: i32,
    pub issue_ok_x: i32,
    pub issue_ok_y: i32,
    pub save_and_exit_x: i32,
    pub save_and_exit_y: i32,

    pub inventory_top_left_slot_x: i32,
    pub inventory_top_left_slot_y: i32,
    pub slot_width: u32,
    pub slot_height: u32,
    pub inventory_rows: u32,
    /// How far up-left of the inventory the pointer is parked before a verification grab
    pub pointer_park_offset: i32,

    pub stash_personal_btn_x: i32,
    pub stash_personal_btn_y: i32,
    pub stash_btn_width: i32,

    pub wp_act_btn_x: i32,
    pub wp_act_btn_y: i32,
    pub wp_act_btn_width: i32,
    pub wp_first_btn_x: i32,
    pub wp_first_btn_y: i32,
    pub wp_btn_height: i32,
}

impl Default for UiPositions {
    fn default() -> Self {
        Self {
            skill_right_x: 1033,
            skill_y: 687,
            skill_width: 42,
            skill_height: 42,

            potion1_x: 837,
            potion1_y: 688,
            potion_width: 24,
            potion_height: 24,
            potion_next: 35,
            belt_columns: 4,

            play_x_offline: 640,
            play_x_online: 520,
            play_y: 655,
            hell_x: 640,
            hell_y: 426,
            issue_ok_x: 640,
            issue_ok_y: 433,
            save_and_exit_x: 640,
            save_and_exit_y: 315,

            inventory_top_left_slot_x: 862,
            inventory_top_left_slot_y: 418,
            slot_width: 35,
            slot_height: 35,
            inventory_rows: 4,
            pointer_park_offset: 250,

            stash_personal_btn_x: 122,
            stash_personal_btn_y: 97,
            stash_btn_width: 86,

            wp_act_btn_x: 100,
            wp_act_btn_y: 98,
            wp_act_btn_width: 60,
            wp_first_btn_x: 130,
            wp_first_btn_y: 148,
            wp_btn_height: 41,
        }
    }
}

impl UiPositions {
    pub fn inventory_top_left(&self) -> Point {
        Point::new(self.inventory_top_left_slot_x, self.inventory_top_left_slot_y)
    }

    pub fn stash_personal_btn(&self) -> Point {
        Point::new(self.stash_personal_btn_x, self.stash_personal_btn_y)
    }
}

/// Search regions for template matching.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiRegions {
    pub play_btn: Region,
    pub hell_btn: Region,
    pub save_and_exit: Region,
    pub gold_btn: Region,
    pub is_overburdened: Region,
    /// Where the service-issue dialog text appears
    pub server_issues: Region,
}

impl Default for UiRegions {
    fn default() -> Self {
        Self {
            play_btn: Region::new(380, 610, 400, 90),
            hell_btn: Region::new(500, 280, 280, 200),
            save_and_exit: Region::new(540, 290, 200, 50),
            gold_btn: Region::new(1000, 620, 120, 40),
            is_overburdened: Region::new(420, 560, 440, 40),
            server_issues: Region::new(400, 290, 480, 170),
        }
    }
}

/// Inclusive HSV range in OpenCV scale (H 0-180, S and V 0-255).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HsvRange {
    pub lower: [u8; 3],
    pub upper: [u8; 3],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorProfiles {
    /// Gold text of in-game messages
    pub gold: HsvRange,
}

impl Default for ColorProfiles {
    fn default() -> Self {
        Self {
            gold: HsvRange {
                lower: [15, 70, 120],
                upper: [30, 255, 255],
            },
        }
    }
}

/// Key names, parsed by the input layer (`"i"`, `"esc"`, `"ctrl"`, `"f12"`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    pub inventory_screen: String,
    /// Held while clicking items into the stash
    pub stash_modifier: String,
    /// Held while moving potions into the belt
    pub potion_modifier: String,
    pub cancel: String,
    /// Global hotkey that ends the process from any window
    pub kill_switch: String,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            inventory_screen: "i".into(),
            stash_modifier: "ctrl".into(),
            potion_modifier: "shift".into(),
            cancel: "esc".into(),
            kill_switch: "f12".into(),
        }
    }
}

/// Calibrated heuristic constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Belt slot mean brightness below this is empty
    pub potion_empty_brightness: f64,
    /// Minimum red or blue channel mean for a potion
    pub potion_min_channel: f64,
    /// Inventory cell mean HSV value above this holds an item
    pub slot_item_value: f64,
    /// Skill icon mean brightness above this is castable
    pub skill_available_brightness: f64,
    /// Fraction of a cell cut from each side before classification
    pub border_shrink: f64,

    pub default_template: f64,
    /// Small UI icons such as skill slots
    pub fine_icon: f64,
    /// The greyed-out play button
    pub disabled_control: f64,
    /// Color-filtered message text
    pub filtered_text: f64,
    pub inventory_potion: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            potion_empty_brightness: 47.0,
            potion_min_channel: 55.0,
            slot_item_value: 16.0,
            skill_available_brightness: 75.0,
            border_shrink: 0.12,

            default_template: 0.68,
            fine_icon: 0.94,
            disabled_control: 0.95,
            filtered_text: 0.8,
            inventory_potion: 0.9,
        }
    }
}

/// Bounds of a randomized wait in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WaitRange {
    pub min: f64,
    pub max: f64,
}

impl WaitRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }
}

/// Timeouts, cadences and retry limits. Durations are in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timing {
    pub poll_interval: f64,
    /// Cadence of the wait for a greyed-out control to become active
    pub not_ready_poll: f64,
    pub control_timeout: f64,
    pub stash_open_timeout: f64,
    pub save_exit_button_timeout: f64,
    pub save_exit_total: f64,
    pub service_check_settle: f64,
    pub service_dismiss_wait: WaitRange,
    pub service_cooldown: WaitRange,
    /// Default settle after every input step
    pub settle: WaitRange,
    /// Allowed distance in pixels between a detected control and its expected position
    pub position_tolerance: i32,
    /// Also require the difficulty button's y to be within tolerance
    pub secondary_check_y: bool,
    pub max_start_attempts: u32,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            poll_interval: 0.1,
            not_ready_poll: 2.0,
            control_timeout: 8.0,
            stash_open_timeout: 20.0,
            save_exit_button_timeout: 7.0,
            save_exit_total: 15.0,
            service_check_settle: 2.0,
            service_dismiss_wait: WaitRange::new(1.0, 2.0),
            service_cooldown: WaitRange::new(18.0, 22.0),
            settle: WaitRange::new(0.05, 0.1),
            position_tolerance: 50,
            secondary_check_y: false,
            max_start_attempts: 10,
        }
    }
}

/// Seconds as used throughout the config to a `Duration`.
pub fn secs(value: f64) -> Duration {
    Duration::from_secs_f64(value.max(0.0))
}

impl Config {
    /// Load the config from a JSON file. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let config = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let config: Config = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse {}", path.display()))?;
            tracing::info!("Loaded config from {}", path.display());
            config
        } else {
            tracing::warn!(
                "No config found at {}, using the built-in 1280x720 layout",
                path.display()
            );
            Config::default()
        };

        config.validate()?;
        Ok(config)
    }

    /// Reject values that would make the flows misbehave rather than fail.
    pub fn validate(&self) -> Result<()> {
        let t = &self.thresholds;
        for (name, value) in [
            ("default_template", t.default_template),
            ("fine_icon", t.fine_icon),
            ("disabled_control", t.disabled_control),
            ("filtered_text", t.filtered_text),
            ("inventory_potion", t.inventory_potion),
        ] {
            ensure!(
                (0.0..=1.0).contains(&value),
                "thresholds.{} must be within 0..=1, got {}",
                name,
                value
            );
        }
        ensure!(
            (0.0..0.5).contains(&t.border_shrink),
            "thresholds.border_shrink must be within 0..0.5, got {}",
            t.border_shrink
        );

        let timing = &self.timing;
        ensure!(timing.poll_interval > 0.0, "timing.poll_interval must be positive");
        ensure!(timing.not_ready_poll > 0.0, "timing.not_ready_poll must be positive");
        ensure!(
            timing.max_start_attempts >= 1,
            "timing.max_start_attempts must be at least 1"
        );
        ensure!(
            timing.position_tolerance > 0,
            "timing.position_tolerance must be positive"
        );
        for (name, range) in [
            ("service_dismiss_wait", timing.service_dismiss_wait),
            ("service_cooldown", timing.service_cooldown),
            ("settle", timing.settle),
        ] {
            ensure!(
                range.min >= 0.0 && range.min <= range.max,
                "timing.{} must satisfy 0 <= min <= max, got {}..{}",
                name,
                range.min,
                range.max
            );
        }

        let pos = &self.ui_pos;
        ensure!(
            pos.slot_width > 0 && pos.slot_height > 0,
            "ui_pos.slot_width and slot_height must be positive"
        );
        ensure!(pos.inventory_rows > 0, "ui_pos.inventory_rows must be positive");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_nonexistent() {
        let config = Config::load(Path::new("/nonexistent/pixbot.json")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pixbot.json");
        std::fs::write(
            &path,
            r#"{ "general": { "monitor": 1 }, "timing": { "max_start_attempts": 3 } }"#,
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.general.monitor, 1);
        assert_eq!(config.general.templates_dir, PathBuf::from("assets/templates"));
        assert_eq!(config.timing.max_start_attempts, 3);
        assert_eq!(config.timing.control_timeout, 8.0);
        assert_eq!(config.thresholds.potion_empty_brightness, 47.0);
    }

    #[test]
    fn test_shipped_config_matches_defaults() {
        let shipped: Config =
            serde_json::from_str(include_str!("../../../config/pixbot.json")).unwrap();
        assert_eq!(shipped, Config::default());
    }

    #[test]
    fn test_dialog_search_is_bounded() {
        let config = Config::default();
        let roi = config.ui_roi.server_issues;
        assert!(roi.width < 1280 / 2 && roi.height < 720 / 2);
        assert_eq!(config.bindings.kill_switch, "f12");
    }

    #[test]
    fn test_validate_rejects_inverted_cooldown() {
        let mut config = Config::default();
        config.timing.service_cooldown = WaitRange::new(22.0, 18.0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_threshold_out_of_range() {
        let mut config = Config::default();
        config.thresholds.fine_icon = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pixbot.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(Config::load(&path).is_err());
    }
}
