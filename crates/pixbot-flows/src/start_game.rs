//! Starting a game from the lobby: play button, difficulty button, then a
//! check for the service-issue dialog with cooldown and restart.

use anyhow::Result;
use pixbot_capture::Point;
use pixbot_config::{secs, UiPositions};
use pixbot_state::GameMode;
use pixbot_vision::SearchRequest;
use std::fmt;
use tracing::{debug, info, warn};

use crate::error::FlowError;
use crate::sequencer::Motion;
use crate::templates;
use crate::UiPilot;

const PLAY_CLICK: Motion = Motion::new(0.5, 0.7, 5);
const DIFFICULTY_CLICK: Motion = Motion::new(1.0, 1.2, 5);
const ISSUE_OK_CLICK: Motion = Motion::new(1.0, 1.4, 5);

/// Stages of one start attempt. Data detected in a stage travels with the
/// next one, so a later stage can only act on what was just validated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StartStage {
    AwaitPrimary,
    ValidatePrimary(Point),
    CommitPrimary { target: Point, mode: GameMode },
    AwaitSecondary,
    ValidateSecondary(Point),
    CommitSecondary(Point),
    CheckTransient,
}

impl fmt::Display for StartStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StartStage::AwaitPrimary => "await play button",
            StartStage::ValidatePrimary(_) => "validate play button",
            StartStage::CommitPrimary { .. } => "click play button",
            StartStage::AwaitSecondary => "await difficulty button",
            StartStage::ValidateSecondary(_) => "validate difficulty button",
            StartStage::CommitSecondary(_) => "click difficulty button",
            StartStage::CheckTransient => "check service issues",
        })
    }
}

/// How a single attempt ended.
#[derive(Debug, PartialEq)]
enum Attempt {
    Started,
    /// A service issue was dismissed and cooled down; start over.
    Recover,
    Aborted { stage: StartStage, reason: FlowError },
}

/// Strictly inside `center ± tolerance`.
fn within(value: i32, center: i32, tolerance: i32) -> bool {
    center - tolerance < value && value < center + tolerance
}

/// Sanity-check the detected play button and tell which lobby it belongs to.
///
/// The y check always applies. When both x windows match, online wins.
pub fn validate_primary(
    at: Point,
    pos: &UiPositions,
    tolerance: i32,
) -> Result<GameMode, FlowError> {
    let offline = within(at.x, pos.play_x_offline, tolerance);
    let online = within(at.x, pos.play_x_online, tolerance);
    let y_ok = within(at.y, pos.play_y, tolerance);

    match (offline, online, y_ok) {
        (_, true, true) => Ok(GameMode::Online),
        (true, false, true) => Ok(GameMode::Offline),
        _ => Err(FlowError::SanityCheckFailed {
            what: templates::PLAY_BTN.to_string(),
            at,
        }),
    }
}

/// Sanity-check the detected difficulty button against its `expected` position.
///
/// Only x is checked unless `check_y` is set, since the neighbouring
/// difficulty is known to match the same template. On success the expected
/// position is the click target.
pub fn validate_secondary(
    at: Point,
    expected: Point,
    tolerance: i32,
    check_y: bool,
) -> Result<Point, FlowError> {
    let x_ok = within(at.x, expected.x, tolerance);
    let y_ok = !check_y || within(at.y, expected.y, tolerance);
    if x_ok && y_ok {
        Ok(expected)
    } else {
        Err(FlowError::SanityCheckFailed {
            what: templates::HELL_BTN.to_string(),
            at,
        })
    }
}

impl UiPilot {
    /// Start a game from the lobby, waiting out service issues.
    ///
    /// Returns `Ok(false)` when a control is missing or in an unexpected place,
    /// or when service issues persist over `max_start_attempts`.
    pub fn start_game(&mut self) -> Result<bool> {
        let max_attempts = self.config.timing.max_start_attempts;
        for attempt in 1..=max_attempts {
            debug!("Start attempt {}/{}", attempt, max_attempts);
            match self.start_attempt()? {
                Attempt::Started => {
                    info!("Game started");
                    return Ok(true);
                }
                Attempt::Recover => continue,
                Attempt::Aborted { stage, reason } => {
                    debug!("Start aborted at {}: {}", stage, reason);
                    return Ok(false);
                }
            }
        }
        let err = FlowError::TransientRetriesExhausted {
            attempts: max_attempts,
        };
        warn!("{}", err);
        Ok(false)
    }

    fn start_attempt(&mut self) -> Result<Attempt> {
        let timing = self.config.timing.clone();
        let roi = self.config.ui_roi.clone();
        let thresholds = self.config.thresholds.clone();
        let control_timeout = secs(timing.control_timeout);

        let mut stage = StartStage::AwaitPrimary;
        loop {
            stage = match stage {
                StartStage::AwaitPrimary => {
                    let gray = SearchRequest::new(
                        templates::PLAY_BTN_GRAY,
                        thresholds.disabled_control,
                    )
                    .roi(roi.play_btn);
                    self.wait_while_present(&gray, secs(timing.not_ready_poll))?;

                    debug!("Searching for play button...");
                    let play = SearchRequest::new(templates::PLAY_BTN, thresholds.default_template)
                        .roi(roi.play_btn);
                    match self.wait_for(&play, control_timeout)?.location() {
                        Some(at) => StartStage::ValidatePrimary(at),
                        None => {
                            return Ok(Attempt::Aborted {
                                stage,
                                reason: FlowError::not_found(templates::PLAY_BTN, control_timeout),
                            })
                        }
                    }
                }
                StartStage::ValidatePrimary(at) => {
                    match validate_primary(at, &self.config.ui_pos, timing.position_tolerance) {
                        Ok(mode) => StartStage::CommitPrimary {
                            target: Point::new(at.x, self.layout.play_button_y()),
                            mode,
                        },
                        Err(reason) => return Ok(Attempt::Aborted { stage, reason }),
                    }
                }
                StartStage::CommitPrimary { target, mode } => {
                    debug!("Found play button ({}) -> clicking it", mode);
                    if mode == GameMode::Online {
                        warn!("You are creating a game in online mode!");
                    }
                    self.click_frame_point(target, PLAY_CLICK)?;
                    StartStage::AwaitSecondary
                }
                StartStage::AwaitSecondary => {
                    debug!("Searching for difficulty button...");
                    let hell = SearchRequest::new(templates::HELL_BTN, thresholds.default_template)
                        .roi(roi.hell_btn);
                    match self.wait_for(&hell, control_timeout)?.location() {
                        Some(at) => StartStage::ValidateSecondary(at),
                        None => {
                            return Ok(Attempt::Aborted {
                                stage,
                                reason: FlowError::not_found(templates::HELL_BTN, control_timeout),
                            })
                        }
                    }
                }
                StartStage::ValidateSecondary(at) => {
                    match validate_secondary(
                        at,
                        self.layout.difficulty_button(),
                        timing.position_tolerance,
                        timing.secondary_check_y,
                    ) {
                        Ok(target) => StartStage::CommitSecondary(target),
                        Err(reason) => return Ok(Attempt::Aborted { stage, reason }),
                    }
                }
                StartStage::CommitSecondary(target) => {
                    debug!("Found difficulty button -> clicking it");
                    self.click_frame_point(target, DIFFICULTY_CLICK)?;
                    StartStage::CheckTransient
                }
                StartStage::CheckTransient => {
                    self.clock.sleep(secs(timing.service_check_settle));
                    let issue = SearchRequest::new(
                        templates::SERVER_ISSUES,
                        thresholds.default_template,
                    )
                    .roi(roi.server_issues);
                    if !self.search(&issue)?.is_found() {
                        return Ok(Attempt::Started);
                    }
                    warn!("Server connection issue, cooling down before retrying");
                    self.recover_from_service_issue()?;
                    return Ok(Attempt::Recover);
                }
            };
        }
    }

    /// Dismiss the service-issue dialog, back out, and cool down.
    fn recover_from_service_issue(&mut self) -> Result<()> {
        let timing = &self.config.timing;
        let (dismiss, cooldown) = (timing.service_dismiss_wait, timing.service_cooldown);

        let ok = self.layout.service_issue_ok();
        self.click_frame_point(ok, ISSUE_OK_CLICK)?;
        self.seq.pause(dismiss.min, dismiss.max);
        self.seq.tap(self.keys.cancel)?;
        let waited = self.seq.pause(cooldown.min, cooldown.max);
        debug!("Cooled down for {:.1}s", waited.as_secs_f64());
        Ok(())
    }
}
