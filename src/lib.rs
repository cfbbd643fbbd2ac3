mod commands;
mod pipeline;

use clap::Parser;
use pixbot_flows::FlowError;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, warn};

use commands::Command;
use pipeline::Pipeline;

/// Pixel-driven UI bot for a fixed-layout game client.
#[derive(Parser, Debug)]
#[command(version)]
pub struct Args {
    /// Layout, threshold and timing configuration.
    #[arg(long, default_value = "config/pixbot.json")]
    pub config: PathBuf,
    /// Read frames from a directory of PNGs instead of the monitor. Input is
    /// logged, not sent.
    #[arg(long)]
    pub replay: Option<PathBuf>,
    /// Seconds to wait before the first action, to switch to the game window.
    #[arg(long, default_value_t = 0.0)]
    pub delay: f64,
    #[command(subcommand)]
    pub command: Command,
}

pub fn run() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "pixbot=debug,pixbot_lib=debug,pixbot_flows=debug,pixbot_vision=debug,pixbot_capture=debug"
                    .into()
            }),
        )
        .init();

    let args = Args::parse();
    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            error!("Failed to start runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let pipeline = Pipeline::new(args.config, args.replay, args.delay);
    match runtime.block_on(pipeline.run(args.command)) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => {
            warn!("Command did not complete");
            ExitCode::from(2)
        }
        Err(e) => {
            if let Some(flow) = e.downcast_ref::<FlowError>() {
                if flow.is_fatal() {
                    error!("Stopping: {}", flow);
                    return ExitCode::FAILURE;
                }
            }
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
