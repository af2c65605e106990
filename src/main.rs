use clap::Parser;
use smellmap::cli::{self, Cli};

fn main() -> anyhow::Result<()> {
    env_logger::init();
    cli::run(Cli::parse())
}
