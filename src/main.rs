use clap::Parser;

use screen2fe::cli::{self, CliArgs};
use screen2fe::logger;

fn main() -> std::process::ExitCode {
    // Initialize session log (overwrites previous session log)
    logger::init();

    let args = CliArgs::parse();
    cli::run(args)
}
