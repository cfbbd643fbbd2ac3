use anyhow::Result;
use pixbot_state::PotionKind;
use std::fmt;

use crate::UiPilot;

/// Snapshot of the in-game indicators, each from its own fresh frame.
#[derive(Debug, Clone, PartialEq)]
pub struct UiStatus {
    pub belt: Vec<PotionKind>,
    pub can_teleport: bool,
    pub teleport_selected: bool,
    pub overburdened: bool,
}

impl fmt::Display for UiStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let belt: Vec<String> = self.belt.iter().map(|k| k.to_string()).collect();
        writeln!(f, "belt:              [{}]", belt.join(", "))?;
        writeln!(f, "teleport selected: {}", self.teleport_selected)?;
        writeln!(f, "can teleport:      {}", self.can_teleport)?;
        write!(f, "overburdened:      {}", self.overburdened)
    }
}

impl UiPilot {
    pub fn status(&mut self) -> Result<UiStatus> {
        Ok(UiStatus {
            belt: self.belt_contents()?,
            can_teleport: self.can_teleport()?,
            teleport_selected: self.is_teleport_selected()?,
            overburdened: self.is_overburdened()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::testing::{FnScreen, Harness};
    use pixbot_state::PotionKind;

    #[test]
    fn test_status_of_blank_screen() {
        let harness = Harness::new();
        let mut pilot = harness.pilot(FnScreen::blank());
        let status = pilot.status().unwrap();
        assert_eq!(status.belt, vec![PotionKind::Empty; 4]);
        assert!(!status.can_teleport);
        assert!(!status.teleport_selected);
        assert!(!status.overburdened);
        assert!(status.to_string().contains("empty, empty, empty, empty"));
    }
}
