use anyhow::Result;
use image::RgbaImage;
use pixbot_config::secs;
use pixbot_state::StashPage;
use pixbot_vision::{slot_has_item, SearchRequest};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::error::FlowError;
use crate::sequencer::{with_held, Motion};
use crate::templates;
use crate::UiPilot;

const PAGE_CLICK: Motion = Motion::new(0.7, 0.7, 15);
const ITEM_CLICK: Motion = Motion::new(0.3, 0.5, 5).settle(0.1, 0.15);
const PARK_MOVE: Motion = Motion::new(0.5, 0.5, 3);
const VERIFY_SETTLE: Duration = Duration::from_millis(600);

/// Which stash page receives items next.
///
/// Starts at the personal page and only ever moves forward; there is no way
/// back to an earlier page within a session.
#[derive(Debug, Default, Clone)]
pub struct StashPager {
    page: StashPage,
}

impl StashPager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(&self) -> StashPage {
        self.page
    }

    /// Move to the next page. Past the last page the stash is exhausted and
    /// the pager stays where it is.
    pub fn advance(&mut self) -> Result<StashPage, FlowError> {
        match self.page.next() {
            Some(next) => {
                self.page = next;
                Ok(next)
            }
            None => Err(FlowError::StashExhausted {
                pages: StashPage::COUNT,
            }),
        }
    }
}

impl UiPilot {
    /// Move every item in the first `columns` inventory columns into the stash.
    ///
    /// The stash must already be open; `Ok(false)` means it never showed up
    /// and nothing was touched. Full pages are skipped in order; when the
    /// last page is full too, `FlowError::StashExhausted` is returned.
    pub fn stash_all_items(&mut self, columns: u32) -> Result<bool> {
        debug!("Searching for inventory gold button...");
        let gold = SearchRequest::new(
            templates::INVENTORY_GOLD_BTN,
            self.config.thresholds.default_template,
        )
        .roi(self.config.ui_roi.gold_btn);
        let timeout = secs(self.config.timing.stash_open_timeout);
        if !self.wait_for(&gold, timeout)?.is_found() {
            error!("Could not determine to be in the stash menu, skipping stash");
            return Ok(false);
        }
        debug!("Found inventory gold button");

        loop {
            let page = self.stash.page();
            debug!("Stashing into {} page", page);
            let button = self.layout.stash_page_button(page);
            self.click_frame_point(button, PAGE_CLICK)?;
            self.seq.pause(0.3, 0.4);

            let modifier = self.keys.stash_modifier;
            with_held(self, modifier, |pilot| pilot.transfer_items(columns))?;

            debug!("Checking if the stash page is full");
            self.clock.sleep(VERIFY_SETTLE);
            let park = self.layout.pointer_park();
            self.move_to_frame_point(park, PARK_MOVE)?;
            let frame = self.grab()?;
            if !self.inventory_has_items(&frame, columns) {
                break;
            }

            info!("Stash page {} is full, selecting next page", page);
            self.write_debug_frame(&frame, &format!("inventory_not_empty_{}.png", page.index()));
            if let Err(e) = self.stash.advance() {
                error!("{}", e);
                return Err(e.into());
            }
            self.seq.pause(0.5, 0.6);
        }

        debug!("Done stashing");
        self.seq.pause(0.4, 0.5);
        self.seq.tap(self.keys.cancel)?;
        Ok(true)
    }

    /// Click every occupied cell, columns first, on a fresh frame per cell.
    fn transfer_items(&mut self, columns: u32) -> Result<()> {
        let grid = self.layout.inventory();
        let rows = self.config.ui_pos.inventory_rows;
        for cell in grid.cells(columns, rows) {
            let frame = self.grab()?;
            if slot_has_item(&grid.crop(&frame, &cell), &self.config.thresholds) {
                self.click_frame_point(cell.center, ITEM_CLICK)?;
                self.seq.pause(0.4, 0.6);
            }
        }
        Ok(())
    }

    pub(crate) fn inventory_has_items(&self, frame: &RgbaImage, columns: u32) -> bool {
        let thresholds = &self.config.thresholds;
        self.layout.inventory().has_any_item(
            frame,
            columns,
            self.config.ui_pos.inventory_rows,
            |crop| slot_has_item(crop, thresholds),
        )
    }

    /// Save a frame for later inspection. Failing to write it never stops a flow.
    fn write_debug_frame(&self, frame: &RgbaImage, name: &str) {
        let dir = &self.config.general.debug_dir;
        let path: PathBuf = dir.join(name);
        let written = std::fs::create_dir_all(dir)
            .map_err(anyhow::Error::from)
            .and_then(|_| frame.save(&path).map_err(anyhow::Error::from));
        match written {
            Ok(()) => debug!("Wrote {}", path.display()),
            Err(e) => warn!("Failed to write {}: {}", path.display(), e),
        }
    }
}
