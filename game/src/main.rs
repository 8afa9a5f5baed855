use std::path::PathBuf;

use clap::Parser;
use log::{LevelFilter, warn};

use common::config::RoomConfig;
use common::{debug, run};
use game::Game;

mod game;

/// Walk around a textured room lit by a hanging lamp.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Room configuration file. Built-in defaults are used when it does not exist
    #[arg(long, default_value = "assets/room.json")]
    config: PathBuf,

    #[arg(long, default_value_t = LevelFilter::Info)]
    log_level: LevelFilter,
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let args = Args::parse();
    debug::set_up_logging(args.log_level)?;

    let config = if args.config.exists() {
        RoomConfig::load(&args.config)?
    } else {
        warn!("{:?} does not exist, using the default room", args.config);
        RoomConfig::default()
    };

    run::run::<Game>(config)
}
