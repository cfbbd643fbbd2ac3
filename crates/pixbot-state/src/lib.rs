use pixbot_capture::Point;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of one template search.
///
/// The location is only reachable through [`DetectionResult::location`], which
/// yields `None` for a miss, so a not-found result can never feed a click.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DetectionResult {
    found: bool,
    location: Option<Point>,
    confidence: f64,
}

impl DetectionResult {
    pub fn found(location: Point, confidence: f64) -> Self {
        Self {
            found: true,
            location: Some(location),
            confidence,
        }
    }

    /// A miss. `best_score` is kept for diagnostics only.
    pub fn not_found(best_score: f64) -> Self {
        Self {
            found: false,
            location: None,
            confidence: best_score,
        }
    }

    pub fn is_found(&self) -> bool {
        self.found
    }

    pub fn location(&self) -> Option<Point> {
        if self.found {
            self.location
        } else {
            None
        }
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }
}

/// What a belt slot holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PotionKind {
    Empty,
    Health,
    Mana,
}

impl fmt::Display for PotionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PotionKind::Empty => "empty",
            PotionKind::Health => "health",
            PotionKind::Mana => "mana",
        })
    }
}

/// Which lobby the play button was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameMode {
    Offline,
    Online,
}

impl fmt::Display for GameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            GameMode::Offline => "offline mode",
            GameMode::Online => "online mode",
        })
    }
}

/// Active stash page: 0 is the personal page, 1..=3 are the shared pages.
///
/// Only ever moves forward within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct StashPage(u8);

impl StashPage {
    pub const PERSONAL: StashPage = StashPage(0);
    pub const LAST: StashPage = StashPage(3);
    pub const COUNT: usize = 4;

    pub fn index(self) -> u8 {
        self.0
    }

    /// The following page, or `None` once every page has been used.
    pub fn next(self) -> Option<StashPage> {
        if self.0 < Self::LAST.0 {
            Some(StashPage(self.0 + 1))
        } else {
            None
        }
    }

    pub fn is_personal(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for StashPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_personal() {
            write!(f, "personal")
        } else {
            write!(f, "shared {}", self.0)
        }
    }
}
