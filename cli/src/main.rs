mod cli;
mod commands;
mod logging;

use cli::{Cli, Commands};
use commands::{overlaps, validate};

pub fn run() -> anyhow::Result<()> {
    use clap::Parser;

    let cli = Cli::parse();
    logging::init(cli.verbose);

    match &cli.command {
        Commands::Validate(args) => validate::run(&cli, args),
        Commands::Overlaps(args) => overlaps::run(&cli, args),
    }
}

fn main() -> anyhow::Result<()> { run() }
