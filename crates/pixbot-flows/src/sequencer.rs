use anyhow::Result;
use pixbot_capture::Point;
use pixbot_config::WaitRange;
use pixbot_input::{random_duration, wait, ActionStep, Button, Clock, InputDriver, Key};
use std::rc::Rc;
use std::time::Duration;
use tracing::{error, trace};

/// How the pointer travels to a click target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Motion {
    /// Travel time range in seconds
    pub duration: WaitRange,
    /// Random offset of the landing point in pixels, per axis
    pub jitter: i32,
    /// Pause between arriving and clicking
    pub settle: WaitRange,
}

impl Motion {
    pub const fn new(min: f64, max: f64, jitter: i32) -> Self {
        Self {
            duration: WaitRange::new(min, max),
            jitter,
            settle: WaitRange::new(0.05, 0.1),
        }
    }

    pub const fn settle(mut self, min: f64, max: f64) -> Self {
        self.settle = WaitRange::new(min, max);
        self
    }
}

/// Turns intents into timed, humanized input steps.
///
/// Every step is followed by a randomized settle so that no two steps of an
/// interaction are issued back to back.
pub struct ActionSequencer {
    driver: Box<dyn InputDriver>,
    clock: Rc<dyn Clock>,
    settle: WaitRange,
}

impl ActionSequencer {
    pub fn new(driver: Box<dyn InputDriver>, clock: Rc<dyn Clock>, settle: WaitRange) -> Self {
        Self {
            driver,
            clock,
            settle,
        }
    }

    /// Execute one step, then wait the default settle.
    pub fn run(&mut self, step: ActionStep) -> Result<()> {
        let settle = self.settle;
        self.run_then_wait(step, settle)
    }

    pub fn run_then_wait(&mut self, step: ActionStep, settle: WaitRange) -> Result<()> {
        trace!("{}", step);
        self.driver.execute(&step)?;
        wait(self.clock.as_ref(), settle.min, settle.max);
        Ok(())
    }

    /// Move to `point` (display coordinates) without clicking.
    pub fn move_to(&mut self, point: Point, motion: Motion) -> Result<()> {
        let duration = random_duration(motion.duration.min, motion.duration.max);
        self.run_then_wait(
            ActionStep::MoveTo {
                point,
                duration,
                jitter: motion.jitter,
            },
            motion.settle,
        )
    }

    /// Move to `point` (display coordinates), settle, left click.
    pub fn click_at(&mut self, point: Point, motion: Motion) -> Result<()> {
        self.move_to(point, motion)?;
        self.run(ActionStep::Click(Button::Left))
    }

    pub fn tap(&mut self, key: Key) -> Result<()> {
        self.run(ActionStep::Tap(key))
    }

    /// Sleep a random duration in `[min, max]` seconds.
    pub fn pause(&self, min: f64, max: f64) -> Duration {
        wait(self.clock.as_ref(), min, max)
    }
}

impl AsMut<ActionSequencer> for ActionSequencer {
    fn as_mut(&mut self) -> &mut ActionSequencer {
        self
    }
}

/// Hold `key` down while `f` runs and release it on every exit path.
///
/// If both `f` and the release fail, the error of `f` wins and the release
/// failure is only logged.
pub fn with_held<C, T, F>(ctx: &mut C, key: Key, f: F) -> Result<T>
where
    C: AsMut<ActionSequencer>,
    F: FnOnce(&mut C) -> Result<T>,
{
    ctx.as_mut().run(ActionStep::KeyDown(key))?;
    let result = f(ctx);
    let released = ctx.as_mut().run(ActionStep::KeyUp(key));
    match (result, released) {
        (Ok(value), Ok(())) => Ok(value),
        (Ok(_), Err(e)) => Err(e),
        (Err(e), Ok(())) => Err(e),
        (Err(e), Err(release_err)) => {
            error!("Failed to release {}: {:#}", key, release_err);
            Err(e)
        }
    }
}
