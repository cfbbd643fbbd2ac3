use anyhow::Result;
use pixbot_config::secs;
use pixbot_vision::SearchRequest;
use tracing::debug;

use crate::sequencer::Motion;
use crate::templates;
use crate::UiPilot;

const ACT_TAB_CLICK: Motion = Motion::new(0.4, 0.4, 8).settle(0.3, 0.4);
const WAYPOINT_CLICK: Motion = Motion::new(0.4, 0.4, 12).settle(0.3, 0.4);
const SAVE_EXIT_CLICK: Motion = Motion::new(0.2, 0.2, 12).settle(0.1, 0.1);

impl UiPilot {
    /// Travel via the open waypoint menu. `act` and `index` count from 0,
    /// left to right and top to bottom.
    pub fn use_waypoint(&mut self, act: u32, index: u32) -> Result<()> {
        debug!("Using waypoint {} of act {}", index, act + 1);
        let tab = self.layout.waypoint_act_tab(act);
        self.click_frame_point(tab, ACT_TAB_CLICK)?;
        let entry = self.layout.waypoint_entry(index);
        self.click_frame_point(entry, WAYPOINT_CLICK)
    }

    /// Open the game menu and leave the game. Keeps re-opening the menu until
    /// the button shows up or `save_exit_total` runs out.
    pub fn save_and_exit(&mut self) -> Result<bool> {
        let timing = &self.config.timing;
        let total = secs(timing.save_exit_total);
        let button_timeout = secs(timing.save_exit_button_timeout);
        let request = SearchRequest::new(
            templates::SAVE_AND_EXIT,
            self.config.thresholds.default_template,
        )
        .roi(self.config.ui_roi.save_and_exit);

        let start = self.clock.now();
        while self.clock.now().saturating_sub(start) < total {
            self.seq.tap(self.keys.cancel)?;
            if self.wait_for(&request, button_timeout)?.is_found() {
                let button = self.layout.save_and_exit();
                self.click_frame_point(button, SAVE_EXIT_CLICK)?;
                debug!("Left the game");
                return Ok(true);
            }
        }
        debug!("Save and exit button never showed up");
        Ok(false)
    }
}
