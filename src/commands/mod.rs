use anyhow::Result;
use clap::Subcommand;
use pixbot_flows::UiPilot;
use tracing::info;

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Start a game from the lobby, waiting out server issues.
    StartGame,
    /// Move the inventory loot into the open stash, page by page.
    Stash {
        /// Inventory columns used for loot, counted from the left.
        #[arg(long, default_value_t = 10)]
        columns: u32,
    },
    /// Refill the belt with potions from the inventory.
    FillBelt {
        #[arg(long, default_value_t = 10)]
        columns: u32,
    },
    /// Travel through the open waypoint menu.
    Waypoint {
        /// Act tab, 0 = act 1
        #[arg(long)]
        act: u32,
        /// Waypoint row, 0 = top
        #[arg(long)]
        index: u32,
    },
    /// Leave the current game.
    SaveExit,
    /// Print what the classifiers see on the current frame.
    Status,
}

impl Command {
    /// Run the command. `Ok(false)` means the UI never reached the expected state.
    pub fn execute(&self, pilot: &mut UiPilot) -> Result<bool> {
        match *self {
            Command::StartGame => pilot.start_game(),
            Command::Stash { columns } => pilot.stash_all_items(columns),
            Command::FillBelt { columns } => {
                if !pilot.has_free_belt_slot()? {
                    info!("Belt is full, nothing to do");
                    return Ok(true);
                }
                pilot.fill_belt_from_inventory(columns)?;
                Ok(true)
            }
            Command::Waypoint { act, index } => {
                pilot.use_waypoint(act, index)?;
                Ok(true)
            }
            Command::SaveExit => pilot.save_and_exit(),
            Command::Status => {
                let status = pilot.status()?;
                println!("{}", status);
                Ok(true)
            }
        }
    }
}
