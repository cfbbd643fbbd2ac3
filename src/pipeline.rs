use anyhow::{Context, Result};
use pixbot_capture::{ReplayScreen, Screen};
use pixbot_config::{secs, Config};
use pixbot_flows::UiPilot;
use pixbot_input::{InputDriver, Key, LoggingDriver, SystemClock};
use pixbot_vision::TemplateFinder;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::Arc;
use tracing::{info, warn};

use crate::commands::Command;

/// Loads the config, wires the backends and runs one command under the kill switch.
pub struct Pipeline {
    config_path: PathBuf,
    replay: Option<PathBuf>,
    delay: f64,
}

impl Pipeline {
    pub fn new(config_path: PathBuf, replay: Option<PathBuf>, delay: f64) -> Self {
        Self {
            config_path,
            replay,
            delay,
        }
    }

    /// Run `command` on a blocking thread. Ctrl+C ends the process at any
    /// point, and so does the global kill switch key during live sessions.
    pub async fn run(self, command: Command) -> Result<bool> {
        let config = Arc::new(Config::load(&self.config_path)?);
        if self.replay.is_none() {
            start_kill_switch(kill_switch_key(&config)?)?;
        }

        if self.delay > 0.0 {
            info!("Starting in {:.1}s, press Ctrl+C to abort", self.delay);
            tokio::select! {
                _ = tokio::time::sleep(secs(self.delay)) => {}
                _ = tokio::signal::ctrl_c() => force_exit("Ctrl+C"),
            }
        }

        let replay = self.replay;
        let flow = tokio::task::spawn_blocking(move || -> Result<bool> {
            let mut pilot = build_pilot(config, replay.as_deref())?;
            info!("Running {:?}", command);
            command.execute(&mut pilot)
        });

        tokio::select! {
            result = flow => result.context("Flow thread panicked")?,
            _ = tokio::signal::ctrl_c() => force_exit("Ctrl+C"),
        }
    }
}

fn force_exit(trigger: &str) -> ! {
    warn!("Force exit ({})", trigger);
    std::process::exit(130)
}

fn kill_switch_key(config: &Config) -> Result<Key> {
    config
        .bindings
        .kill_switch
        .parse()
        .with_context(|| format!("Invalid kill switch key {:?}", config.bindings.kill_switch))
}

#[cfg(feature = "desktop")]
fn start_kill_switch(key: Key) -> Result<()> {
    let trigger = key.to_string();
    pixbot_input::spawn_kill_switch(key, move || {
        force_exit(&trigger);
    })
}

#[cfg(not(feature = "desktop"))]
fn start_kill_switch(key: Key) -> Result<()> {
    tracing::debug!("No global hotkey support in this build, {} is ignored", key);
    Ok(())
}

/// Assemble the pilot. Screen, matcher and driver are created on the thread
/// that uses them.
fn build_pilot(config: Arc<Config>, replay: Option<&Path>) -> Result<UiPilot> {
    let finder = TemplateFinder::load(&config.general.templates_dir)?;
    info!("Loaded {} templates", finder.template_count());

    let (screen, driver): (Box<dyn Screen>, Box<dyn InputDriver>) = match replay {
        Some(dir) => {
            let screen = ReplayScreen::load_dir(dir)?;
            info!("Replaying {} frames from {}", screen.len(), dir.display());
            (Box::new(screen), Box::new(LoggingDriver::new()))
        }
        None => desktop_backends(&config)?,
    };

    UiPilot::new(
        config,
        screen,
        Box::new(finder),
        driver,
        Rc::new(SystemClock::new()),
    )
}

#[cfg(feature = "desktop")]
fn desktop_backends(config: &Config) -> Result<(Box<dyn Screen>, Box<dyn InputDriver>)> {
    let screen = pixbot_capture::MonitorScreen::open(config.general.monitor)?;
    let driver = pixbot_input::EnigoDriver::new()?;
    Ok((Box::new(screen), Box::new(driver)))
}

#[cfg(not(feature = "desktop"))]
fn desktop_backends(_config: &Config) -> Result<(Box<dyn Screen>, Box<dyn InputDriver>)> {
    anyhow::bail!("Built without the `desktop` feature: pass --replay <DIR> for a dry run")
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn replay_dir() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        RgbaImage::from_pixel(1280, 720, Rgba([5, 5, 5, 255]))
            .save(dir.path().join("0001.png"))
            .unwrap();
        dir
    }

    /// Checkerboard templates for every id the status command looks up.
    fn write_status_templates(dir: &Path) {
        std::fs::create_dir_all(dir).unwrap();
        let tile = RgbaImage::from_fn(12, 12, |x, y| {
            if (x / 3 + y / 3) % 2 == 0 {
                Rgba([250, 250, 250, 255])
            } else {
                Rgba([0, 0, 0, 255])
            }
        });
        for name in [
            "tele_active",
            "tele_inactive",
            "inventory_full_msg_0",
            "inventory_full_msg_1",
        ] {
            tile.save(dir.join(format!("{}.png", name))).unwrap();
        }
    }

    fn config_in(dir: &Path) -> PathBuf {
        let config = Config {
            general: pixbot_config::General {
                templates_dir: dir.join("templates"),
                debug_dir: dir.join("debug"),
                ..Default::default()
            },
            ..Default::default()
        };
        let path = dir.join("pixbot.json");
        std::fs::write(&path, serde_json::to_string(&config).unwrap()).unwrap();
        path
    }

    #[tokio::test]
    async fn test_status_on_replay() {
        let frames = replay_dir();
        let work = tempfile::tempdir().unwrap();
        write_status_templates(&work.path().join("templates"));
        let pipeline = Pipeline::new(
            config_in(work.path()),
            Some(frames.path().to_path_buf()),
            0.0,
        );
        assert!(pipeline.run(Command::Status).await.unwrap());
    }

    #[tokio::test]
    async fn test_waypoint_on_replay() {
        let frames = replay_dir();
        let work = tempfile::tempdir().unwrap();
        let pipeline = Pipeline::new(
            config_in(work.path()),
            Some(frames.path().to_path_buf()),
            0.0,
        );
        assert!(pipeline
            .run(Command::Waypoint { act: 0, index: 2 })
            .await
            .unwrap());
    }

    #[test]
    fn test_kill_switch_key_from_bindings() {
        let mut config = Config::default();
        assert_eq!(kill_switch_key(&config).unwrap(), Key::F(12));

        config.bindings.kill_switch = "pause break".into();
        let err = kill_switch_key(&config).unwrap_err();
        assert!(err.to_string().contains("pause break"));
    }

    #[tokio::test]
    async fn test_missing_replay_dir_is_an_error() {
        let work = tempfile::tempdir().unwrap();
        let pipeline = Pipeline::new(
            config_in(work.path()),
            Some(work.path().join("nope")),
            0.0,
        );
        assert!(pipeline.run(Command::Status).await.is_err());
    }
}
