use anyhow::Result;
use pixbot_capture::crop_region;
use pixbot_vision::{classify_presence, skill_is_available, SearchRequest};

use crate::templates;
use crate::UiPilot;

impl UiPilot {
    /// Whether the skill in the right slot can be cast right now.
    ///
    /// Teleport must already be selected on the right slot.
    pub fn can_teleport(&mut self) -> Result<bool> {
        let frame = self.grab()?;
        let crop = crop_region(&frame, &self.layout.skill_right());
        Ok(skill_is_available(&crop, &self.config.thresholds))
    }

    pub fn is_teleport_selected(&mut self) -> Result<bool> {
        let roi = self.layout.skill_right();
        let threshold = self.config.thresholds.fine_icon;
        let requests = [
            SearchRequest::new(templates::TELE_ACTIVE, threshold).roi(roi),
            SearchRequest::new(templates::TELE_INACTIVE, threshold).roi(roi),
        ];
        let frame = self.grab()?;
        classify_presence(&frame, self.finder.as_ref(), &requests)
    }

    /// Whether the last pickup overburdened the character. Only meaningful
    /// right after picking something up, while the message is shown.
    pub fn is_overburdened(&mut self) -> Result<bool> {
        let roi = self.config.ui_roi.is_overburdened;
        let gold = self.config.colors.gold;
        let threshold = self.config.thresholds.filtered_text;
        let requests: Vec<SearchRequest> = templates::INVENTORY_FULL_MSG
            .iter()
            .map(|id| {
                SearchRequest::new(*id, threshold)
                    .roi(roi)
                    .color_filter(gold)
            })
            .collect();
        let frame = self.grab()?;
        classify_presence(&frame, self.finder.as_ref(), &requests)
    }
}

#[cfg(test)]
mod tests {
    use crate::testing::{blank_frame, FnScreen, Harness};
    use image::Rgba;
    use pixbot_capture::Point;
    use pixbot_vision::UiLayout;

    fn skill_screen(harness: &Harness, value: u8) -> FnScreen {
        let region = UiLayout::new(&harness.config).skill_right();
        FnScreen::new(move || {
            let mut frame = blank_frame();
            for y in region.y..region.y + region.height {
                for x in region.x..region.x + region.width {
                    frame.put_pixel(x, y, Rgba([value, value / 2, value / 3, 255]));
                }
            }
            frame
        })
    }

    #[test]
    fn test_can_teleport_follows_icon_brightness() {
        let harness = Harness::new();
        assert!(harness.pilot(skill_screen(&harness, 220)).can_teleport().unwrap());
        assert!(!harness.pilot(skill_screen(&harness, 90)).can_teleport().unwrap());
    }

    #[test]
    fn test_teleport_selected_in_either_state() {
        let harness = Harness::new();
        harness.matcher.found_at("TELE_INACTIVE", Point::new(1033, 687));
        let mut pilot = harness.pilot(FnScreen::blank());
        assert!(pilot.is_teleport_selected().unwrap());
        assert_eq!(harness.matcher.searches("TELE_ACTIVE"), 1);
    }

    #[test]
    fn test_overburdened_checks_both_messages() {
        let harness = Harness::new();
        let mut pilot = harness.pilot(FnScreen::blank());
        assert!(!pilot.is_overburdened().unwrap());

        harness
            .matcher
            .found_at("INVENTORY_FULL_MSG_1", Point::new(640, 580));
        assert!(pilot.is_overburdened().unwrap());
        assert_eq!(harness.matcher.searches("INVENTORY_FULL_MSG_0"), 2);
    }
}
