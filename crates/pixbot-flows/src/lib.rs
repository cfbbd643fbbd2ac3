use anyhow::{Context, Result};
use pixbot_capture::Screen;
use pixbot_config::Config;
use pixbot_input::{Clock, InputDriver, Key};
use pixbot_vision::{TemplateMatcher, UiLayout};
use std::rc::Rc;
use std::sync::Arc;

mod belt;
mod error;
mod menus;
mod observe;
pub mod sequencer;
mod skills;
pub mod start_game;
pub mod stash;
mod status;
#[cfg(test)]
mod testing;

pub use error::FlowError;
pub use sequencer::{with_held, ActionSequencer, Motion};
pub use stash::StashPager;
pub use status::UiStatus;

/// Template ids as named by the files in the templates directory.
pub mod templates {
    pub const PLAY_BTN: &str = "PLAY_BTN";
    pub const PLAY_BTN_GRAY: &str = "PLAY_BTN_GRAY";
    pub const HELL_BTN: &str = "HELL_BTN";
    pub const SERVER_ISSUES: &str = "SERVER_ISSUES";
    pub const SAVE_AND_EXIT: &str = "SAVE_AND_EXIT";
    pub const INVENTORY_GOLD_BTN: &str = "INVENTORY_GOLD_BTN";
    pub const TELE_ACTIVE: &str = "TELE_ACTIVE";
    pub const TELE_INACTIVE: &str = "TELE_INACTIVE";
    pub const INVENTORY_FULL_MSG: [&str; 2] = ["INVENTORY_FULL_MSG_0", "INVENTORY_FULL_MSG_1"];
    pub const SUPER_HEALING_POTION: &str = "SUPER_HEALING_POTION";
    pub const SUPER_MANA_POTION: &str = "SUPER_MANA_POTION";
}

/// Key bindings resolved once from the config.
#[derive(Debug, Clone, Copy)]
struct Keys {
    inventory: Key,
    stash_modifier: Key,
    potion_modifier: Key,
    cancel: Key,
}

impl Keys {
    fn from_config(config: &Config) -> Result<Self> {
        let b = &config.bindings;
        let parse = |name: &str, value: &str| -> Result<Key> {
            value
                .parse()
                .with_context(|| format!("Invalid key binding {} = {:?}", name, value))
        };
        Ok(Self {
            inventory: parse("inventory_screen", &b.inventory_screen)?,
            stash_modifier: parse("stash_modifier", &b.stash_modifier)?,
            potion_modifier: parse("potion_modifier", &b.potion_modifier)?,
            cancel: parse("cancel", &b.cancel)?,
        })
    }
}

/// Drives the static 2D UI: everything that clicks on a fixed control or
/// checks something about one goes through here.
///
/// Owns the screen, the matcher and the input driver for the whole session.
/// Each observation grabs a fresh frame; nothing is cached between decisions.
pub struct UiPilot {
    config: Arc<Config>,
    layout: UiLayout,
    keys: Keys,
    screen: Box<dyn Screen>,
    finder: Box<dyn TemplateMatcher>,
    seq: ActionSequencer,
    clock: Rc<dyn Clock>,
    stash: StashPager,
}

impl UiPilot {
    pub fn new(
        config: Arc<Config>,
        screen: Box<dyn Screen>,
        finder: Box<dyn TemplateMatcher>,
        driver: Box<dyn InputDriver>,
        clock: Rc<dyn Clock>,
    ) -> Result<Self> {
        let keys = Keys::from_config(&config)?;
        let layout = UiLayout::new(&config);
        let seq = ActionSequencer::new(driver, clock.clone(), config.timing.settle);
        Ok(Self {
            config,
            layout,
            keys,
            screen,
            finder,
            seq,
            clock,
            stash: StashPager::new(),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Stash page the next stashing run starts from.
    pub fn stash_pager(&self) -> &StashPager {
        &self.stash
    }
}

impl AsMut<ActionSequencer> for UiPilot {
    fn as_mut(&mut self) -> &mut ActionSequencer {
        &mut self.seq
    }
}
