use clap::Parser;
use mbackup::commands::{self, Cli};
use mbackup::sysexits;
use std::process;

/// Entry point for the mbackup CLI application.
/// Parses command-line arguments and exits with the status of the dispatched command.
fn main() {
    let cli = Cli::parse();
    let Some(commands) = cli.commands else {
        eprintln!("mbackup requires at least one command to execute. See 'mbackup --help' for usage.");
        process::exit(sysexits::EX_USAGE);
    };

    let code = commands::dispatch(commands, &cli.log_level);
    process::exit(code);
}
