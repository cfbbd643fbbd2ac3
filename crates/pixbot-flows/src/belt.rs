use anyhow::Result;
use pixbot_capture::{crop_region, Point};
use pixbot_state::PotionKind;
use pixbot_vision::{classify_potion, classify_presence, SearchRequest};
use tracing::debug;

use crate::sequencer::{with_held, Motion};
use crate::templates;
use crate::UiPilot;

const POTION_CLICK: Motion = Motion::new(0.15, 0.15, 5).settle(0.2, 0.3);

impl UiPilot {
    /// Contents of the bottom belt row, left to right.
    pub fn belt_contents(&mut self) -> Result<Vec<PotionKind>> {
        let frame = self.grab()?;
        let thresholds = &self.config.thresholds;
        Ok((0..self.config.ui_pos.belt_columns)
            .map(|column| {
                let crop = crop_region(&frame, &self.layout.belt_slot(column));
                classify_potion(&crop, thresholds)
            })
            .collect())
    }

    /// Whether any belt column has a free bottom slot.
    pub fn has_free_belt_slot(&mut self) -> Result<bool> {
        Ok(self
            .belt_contents()?
            .iter()
            .any(|kind| *kind == PotionKind::Empty))
    }

    /// Move potions from the first `columns` inventory columns into the belt.
    ///
    /// Opens the inventory itself and closes it again when done.
    pub fn fill_belt_from_inventory(&mut self, columns: u32) -> Result<()> {
        let inventory_key = self.keys.inventory;
        self.seq.tap(inventory_key)?;
        self.seq.pause(0.7, 1.0);

        let frame = self.grab()?;
        let threshold = self.config.thresholds.inventory_potion;
        let potions = [
            SearchRequest::new(templates::SUPER_HEALING_POTION, threshold),
            SearchRequest::new(templates::SUPER_MANA_POTION, threshold),
        ];
        let finder = self.finder.as_ref();
        let positions: Vec<Point> = self.layout.inventory().enumerate_matches(
            &frame,
            columns,
            self.config.ui_pos.inventory_rows,
            |crop| classify_presence(crop, finder, &potions),
        )?;
        debug!("Found {} potions in the inventory", positions.len());

        let modifier = self.keys.potion_modifier;
        with_held(self, modifier, |pilot| {
            for pos in &positions {
                pilot.click_frame_point(*pos, POTION_CLICK)?;
                pilot.seq.pause(0.3, 0.4);
            }
            Ok(())
        })?;

        self.seq.pause(0.2, 0.25);
        self.seq.tap(inventory_key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{blank_frame, FnScreen, Harness};
    use image::{Rgba, RgbaImage};
    use pixbot_input::{ActionStep, Key};
    use pixbot_vision::UiLayout;

    fn belt_screen(harness: &Harness, colors: [[u8; 3]; 4]) -> FnScreen {
        let layout = UiLayout::new(&harness.config);
        FnScreen::new(move || {
            let mut frame: RgbaImage = blank_frame();
            for (column, [r, g, b]) in colors.iter().enumerate() {
                let slot = layout.belt_slot(column as u32);
                for y in slot.y..slot.y + slot.height {
                    for x in slot.x..slot.x + slot.width {
                        frame.put_pixel(x, y, Rgba([*r, *g, *b, 255]));
                    }
                }
            }
            frame
        })
    }

    const HEALTH: [u8; 3] = [200, 40, 30];
    const MANA: [u8; 3] = [30, 40, 200];
    const EMPTY: [u8; 3] = [10, 10, 10];

    #[test]
    fn test_belt_contents() {
        let harness = Harness::new();
        let mut pilot = harness.pilot(belt_screen(&harness, [HEALTH, MANA, EMPTY, HEALTH]));
        assert_eq!(
            pilot.belt_contents().unwrap(),
            vec![
                PotionKind::Health,
                PotionKind::Mana,
                PotionKind::Empty,
                PotionKind::Health
            ]
        );
        assert!(pilot.has_free_belt_slot().unwrap());
    }

    #[test]
    fn test_full_belt_has_no_free_slot() {
        let harness = Harness::new();
        let mut pilot = harness.pilot(belt_screen(&harness, [HEALTH, MANA, MANA, HEALTH]));
        assert!(!pilot.has_free_belt_slot().unwrap());
    }

    #[test]
    fn test_fill_belt_clicks_matches_with_shift_held() {
        let harness = Harness::new();
        harness
            .matcher
            .found_at("SUPER_MANA_POTION", Point::new(10, 10));
        let mut pilot = harness.pilot(FnScreen::blank());

        pilot.fill_belt_from_inventory(2).unwrap();

        // every scanned cell matches the scripted template
        let grid = UiLayout::new(&harness.config).inventory();
        let expected: Vec<Point> = grid.cells(2, 4).map(|c| c.center).collect();
        assert_eq!(harness.journal.clicks(), expected);

        let steps = harness.journal.steps();
        assert_eq!(steps.first(), Some(&ActionStep::Tap(Key::Char('i'))));
        assert_eq!(steps.last(), Some(&ActionStep::Tap(Key::Char('i'))));
        assert!(steps.contains(&ActionStep::KeyDown(Key::Shift)));
        assert!(harness.journal.modifiers_balanced());
    }

    #[test]
    fn test_fill_belt_without_potions_only_toggles_inventory() {
        let harness = Harness::new();
        let mut pilot = harness.pilot(FnScreen::blank());

        pilot.fill_belt_from_inventory(10).unwrap();

        assert!(harness.journal.clicks().is_empty());
        assert_eq!(
            harness.journal.taps(),
            vec![Key::Char('i'), Key::Char('i')]
        );
        assert_eq!(harness.matcher.searches("SUPER_HEALING_POTION"), 40);
    }
}
