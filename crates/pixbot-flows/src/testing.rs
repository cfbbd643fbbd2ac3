//! Scripted stand-ins for the screen, the template matcher, the input driver
//! and the clock.

use anyhow::{bail, Result};
use image::{Rgba, RgbaImage};
use pixbot_capture::{Point, Screen};
use pixbot_config::Config;
use pixbot_input::{ActionStep, Button, Clock, InputDriver, Key};
use pixbot_state::DetectionResult;
use pixbot_vision::{SearchRequest, TemplateMatcher};
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use crate::UiPilot;

pub const FRAME_WIDTH: u32 = 1280;
pub const FRAME_HEIGHT: u32 = 720;

pub fn blank_frame() -> RgbaImage {
    RgbaImage::from_pixel(FRAME_WIDTH, FRAME_HEIGHT, Rgba([5, 5, 5, 255]))
}

/// Screen whose frames come from a closure.
pub struct FnScreen {
    render: Box<dyn FnMut() -> RgbaImage>,
    grabs: Rc<Cell<usize>>,
}

impl FnScreen {
    pub fn new(render: impl FnMut() -> RgbaImage + 'static) -> Self {
        Self {
            render: Box::new(render),
            grabs: Rc::new(Cell::new(0)),
        }
    }

    pub fn blank() -> Self {
        Self::new(blank_frame)
    }

    pub fn grab_counter(&self) -> Rc<Cell<usize>> {
        self.grabs.clone()
    }
}

impl Screen for FnScreen {
    fn grab(&mut self) -> Result<RgbaImage> {
        self.grabs.set(self.grabs.get() + 1);
        Ok((self.render)())
    }

    fn to_display(&self, p: Point) -> Point {
        p
    }
}

#[derive(Default)]
struct Script {
    results: HashMap<String, VecDeque<DetectionResult>>,
    searched: Vec<SearchRequest>,
}

/// Template matcher answering from per-template queues.
///
/// Each search pops the next scripted result; the last one sticks. Templates
/// without a script are never found.
#[derive(Clone, Default)]
pub struct ScriptedMatcher {
    script: Rc<RefCell<Script>>,
}

impl ScriptedMatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script(&self, template_id: &str, results: Vec<DetectionResult>) -> &Self {
        self.script
            .borrow_mut()
            .results
            .insert(template_id.to_string(), results.into());
        self
    }

    pub fn found_at(&self, template_id: &str, at: Point) -> &Self {
        self.script(template_id, vec![DetectionResult::found(at, 0.99)])
    }

    pub fn searches(&self, template_id: &str) -> usize {
        self.script
            .borrow()
            .searched
            .iter()
            .filter(|r| r.template_id == template_id)
            .count()
    }

    /// Every request made for `template_id`, in order.
    pub fn requests(&self, template_id: &str) -> Vec<SearchRequest> {
        self.script
            .borrow()
            .searched
            .iter()
            .filter(|r| r.template_id == template_id)
            .cloned()
            .collect()
    }
}

impl TemplateMatcher for ScriptedMatcher {
    fn search(&self, request: &SearchRequest, _image: &RgbaImage) -> Result<DetectionResult> {
        let mut script = self.script.borrow_mut();
        script.searched.push(request.clone());
        let result = match script.results.get_mut(&request.template_id) {
            Some(queue) if queue.len() > 1 => queue.pop_front(),
            Some(queue) => queue.front().copied(),
            None => None,
        };
        Ok(result.unwrap_or_else(|| DetectionResult::not_found(0.0)))
    }
}

#[derive(Default)]
struct JournalState {
    steps: Vec<ActionStep>,
    /// Clicks that still succeed; `None` means unlimited
    clicks_left: Option<usize>,
}

/// Input driver that records every primitive it is asked to perform.
#[derive(Clone, Default)]
pub struct Journal {
    state: Rc<RefCell<JournalState>>,
}

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following click fail without being recorded.
    pub fn fail_clicks(&self) {
        self.fail_clicks_after(0);
    }

    /// Let `count` more clicks through, then fail every click after them.
    pub fn fail_clicks_after(&self, count: usize) {
        self.state.borrow_mut().clicks_left = Some(count);
    }

    pub fn steps(&self) -> Vec<ActionStep> {
        self.state.borrow().steps.clone()
    }

    /// Pointer targets of every click, in order.
    pub fn clicks(&self) -> Vec<Point> {
        let steps = self.steps();
        let mut clicks = Vec::new();
        let mut last_target = None;
        for step in &steps {
            match step {
                ActionStep::MoveTo { point, .. } => last_target = Some(*point),
                ActionStep::Click(_) => {
                    if let Some(p) = last_target {
                        clicks.push(p);
                    }
                }
                _ => {}
            }
        }
        clicks
    }

    pub fn taps(&self) -> Vec<Key> {
        self.steps()
            .iter()
            .filter_map(|s| match s {
                ActionStep::Tap(k) => Some(*k),
                _ => None,
            })
            .collect()
    }

    /// Every key-down has a matching key-up and nothing is left held.
    pub fn modifiers_balanced(&self) -> bool {
        let mut held: Vec<Key> = Vec::new();
        for step in self.steps() {
            match step {
                ActionStep::KeyDown(k) => held.push(k),
                ActionStep::KeyUp(k) => match held.iter().position(|h| *h == k) {
                    Some(i) => {
                        held.remove(i);
                    }
                    None => return false,
                },
                _ => {}
            }
        }
        held.is_empty()
    }
}

impl InputDriver for Journal {
    fn move_pointer(&mut self, to: Point, duration: Duration, jitter: i32) -> Result<()> {
        self.state.borrow_mut().steps.push(ActionStep::MoveTo {
            point: to,
            duration,
            jitter,
        });
        Ok(())
    }

    fn click(&mut self, button: Button) -> Result<()> {
        let mut state = self.state.borrow_mut();
        match state.clicks_left {
            Some(0) => bail!("click rejected"),
            Some(n) => state.clicks_left = Some(n - 1),
            None => {}
        }
        state.steps.push(ActionStep::Click(button));
        Ok(())
    }

    fn key_down(&mut self, key: Key) -> Result<()> {
        self.state.borrow_mut().steps.push(ActionStep::KeyDown(key));
        Ok(())
    }

    fn key_up(&mut self, key: Key) -> Result<()> {
        self.state.borrow_mut().steps.push(ActionStep::KeyUp(key));
        Ok(())
    }

    fn tap_key(&mut self, key: Key) -> Result<()> {
        self.state.borrow_mut().steps.push(ActionStep::Tap(key));
        Ok(())
    }
}

/// Virtual time: `sleep` advances `now` instantly and is recorded.
#[derive(Default)]
pub struct ManualClock {
    now: Cell<Duration>,
    sleeps: RefCell<Vec<Duration>>,
}

impl ManualClock {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.borrow().clone()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.now.get()
    }

    fn sleep(&self, duration: Duration) {
        self.now.set(self.now.get() + duration);
        self.sleeps.borrow_mut().push(duration);
    }
}

/// Everything a flow test needs to drive and inspect a pilot.
pub struct Harness {
    pub matcher: ScriptedMatcher,
    pub journal: Journal,
    pub clock: Rc<ManualClock>,
    pub config: Config,
}

impl Harness {
    pub fn new() -> Self {
        Self {
            matcher: ScriptedMatcher::new(),
            journal: Journal::new(),
            clock: ManualClock::new(),
            config: Config::default(),
        }
    }

    pub fn pilot(&self, screen: FnScreen) -> UiPilot {
        UiPilot::new(
            Arc::new(self.config.clone()),
            Box::new(screen),
            Box::new(self.matcher.clone()),
            Box::new(self.journal.clone()),
            self.clock.clone(),
        )
        .unwrap()
    }
}
