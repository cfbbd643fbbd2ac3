use pixbot_capture::{Point, Region};
use pixbot_config::{Config, UiPositions};
use pixbot_state::StashPage;

use crate::grid::SlotGrid;

/// Regions and click targets derived from the configured anchors.
///
/// Nothing here is hardcoded per element; every position is an anchor plus a
/// multiple of a configured stride.
#[derive(Debug, Clone)]
pub struct UiLayout {
    pos: UiPositions,
    border_shrink: f64,
}

impl UiLayout {
    pub fn new(config: &Config) -> Self {
        Self {
            pos: config.ui_pos.clone(),
            border_shrink: config.thresholds.border_shrink,
        }
    }

    pub fn positions(&self) -> &UiPositions {
        &self.pos
    }

    /// The right-hand skill slot.
    pub fn skill_right(&self) -> Region {
        let p = &self.pos;
        Region::centered(
            Point::new(p.skill_right_x, p.skill_y),
            p.skill_width,
            p.skill_height,
        )
    }

    /// Bottom-row belt slot in `column` (0 = leftmost).
    pub fn belt_slot(&self, column: u32) -> Region {
        let p = &self.pos;
        Region::centered(
            Point::new(p.potion1_x + p.potion_next * column as i32, p.potion1_y),
            p.potion_width,
            p.potion_height,
        )
    }

    pub fn inventory(&self) -> SlotGrid {
        SlotGrid {
            top_left: self.pos.inventory_top_left(),
            cell_width: self.pos.slot_width,
            cell_height: self.pos.slot_height,
            border_shrink: self.border_shrink,
        }
    }

    /// Selector button of a stash page, one button width per page from the personal one.
    pub fn stash_page_button(&self, page: StashPage) -> Point {
        self.pos
            .stash_personal_btn()
            .offset(self.pos.stash_btn_width * page.index() as i32, 0)
    }

    /// Where to park the pointer so it does not cover the inventory.
    pub fn pointer_park(&self) -> Point {
        let off = self.pos.pointer_park_offset;
        self.pos.inventory_top_left().offset(-off, -off)
    }

    /// Act tab of the waypoint menu (0 = act 1).
    pub fn waypoint_act_tab(&self, act: u32) -> Point {
        let p = &self.pos;
        Point::new(p.wp_act_btn_x + p.wp_act_btn_width * act as i32, p.wp_act_btn_y)
    }

    /// Waypoint entry `index` of the selected act (0 = top).
    pub fn waypoint_entry(&self, index: u32) -> Point {
        let p = &self.pos;
        Point::new(p.wp_first_btn_x, p.wp_first_btn_y + p.wp_btn_height * index as i32)
    }

    pub fn play_button_y(&self) -> i32 {
        self.pos.play_y
    }

    pub fn difficulty_button(&self) -> Point {
        Point::new(self.pos.hell_x, self.pos.hell_y)
    }

    pub fn service_issue_ok(&self) -> Point {
        Point::new(self.pos.issue_ok_x, self.pos.issue_ok_y)
    }

    pub fn save_and_exit(&self) -> Point {
        Point::new(self.pos.save_and_exit_x, self.pos.save_and_exit_y)
    }
}
