//! Main application entry point (native).

use clap::Parser;
use paintbox_app::cli::{CliArgs, run};

fn main() {
    env_logger::init();
    log::info!("Starting Paintbox");

    let args = CliArgs::parse();
    if let Err(e) = run(&args) {
        log::error!("{e}");
        eprintln!("paintbox: {e}");
        std::process::exit(1);
    }
}
