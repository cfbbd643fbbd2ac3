use anyhow::Result;
use image::RgbaImage;
use pixbot_capture::Point;
use pixbot_config::secs;
use pixbot_state::DetectionResult;
use pixbot_vision::SearchRequest;
use std::time::Duration;
use tracing::trace;

use crate::sequencer::Motion;
use crate::UiPilot;

impl UiPilot {
    /// Fresh frame for a single decision.
    pub(crate) fn grab(&mut self) -> Result<RgbaImage> {
        self.screen.grab()
    }

    /// One search against a freshly grabbed frame.
    pub(crate) fn search(&mut self, request: &SearchRequest) -> Result<DetectionResult> {
        let frame = self.grab()?;
        self.finder.search(request, &frame)
    }

    /// Poll until the template shows up or `timeout` elapses.
    pub(crate) fn wait_for(
        &mut self,
        request: &SearchRequest,
        timeout: Duration,
    ) -> Result<DetectionResult> {
        let start = self.clock.now();
        let poll = secs(self.config.timing.poll_interval);
        loop {
            let result = self.search(request)?;
            if result.is_found() {
                return Ok(result);
            }
            if self.clock.now().saturating_sub(start) >= timeout {
                trace!(
                    "{} not found after {:.1}s (best {:.3})",
                    request.template_id,
                    timeout.as_secs_f64(),
                    result.confidence()
                );
                return Ok(result);
            }
            self.clock.sleep(poll);
        }
    }

    /// Block for as long as the template stays visible, checking every `interval`.
    pub(crate) fn wait_while_present(
        &mut self,
        request: &SearchRequest,
        interval: Duration,
    ) -> Result<()> {
        while self.search(request)?.is_found() {
            self.clock.sleep(interval);
        }
        Ok(())
    }

    /// Click a point given in frame coordinates.
    pub(crate) fn click_frame_point(&mut self, point: Point, motion: Motion) -> Result<()> {
        let target = self.screen.to_display(point);
        self.seq.click_at(target, motion)
    }

    pub(crate) fn move_to_frame_point(&mut self, point: Point, motion: Motion) -> Result<()> {
        let target = self.screen.to_display(point);
        self.seq.move_to(target, motion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FnScreen, Harness};
    use pixbot_input::Clock;

    #[test]
    fn test_wait_for_returns_on_first_hit() {
        let harness = Harness::new();
        harness.matcher.script(
            "PLAY_BTN",
            vec![
                DetectionResult::not_found(0.3),
                DetectionResult::not_found(0.4),
                DetectionResult::found(Point::new(640, 655), 0.9),
            ],
        );
        let mut pilot = harness.pilot(FnScreen::blank());

        let result = pilot
            .wait_for(&SearchRequest::new("PLAY_BTN", 0.68), Duration::from_secs(8))
            .unwrap();

        assert_eq!(result.location(), Some(Point::new(640, 655)));
        assert_eq!(harness.matcher.searches("PLAY_BTN"), 3);
    }

    #[test]
    fn test_wait_for_gives_up_at_timeout() {
        let harness = Harness::new();
        let mut pilot = harness.pilot(FnScreen::blank());

        let result = pilot
            .wait_for(&SearchRequest::new("HELL_BTN", 0.68), Duration::from_secs(8))
            .unwrap();

        assert!(!result.is_found());
        assert!(harness.clock.now() >= Duration::from_secs(8));
        assert!(harness.clock.now() < Duration::from_secs(9));
    }

    #[test]
    fn test_every_search_grabs_a_new_frame() {
        let harness = Harness::new();
        let screen = FnScreen::blank();
        let grabs = screen.grab_counter();
        let mut pilot = harness.pilot(screen);

        let request = SearchRequest::new("X", 0.5);
        pilot.search(&request).unwrap();
        pilot.search(&request).unwrap();

        assert_eq!(grabs.get(), 2);
    }
}
