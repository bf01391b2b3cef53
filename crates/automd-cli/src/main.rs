mod cli;
mod commands;
mod config;
mod error;
mod logging;

use crate::cli::{Cli, Commands};
use crate::error::Result;
use clap::Parser;
use tracing::{debug, error, info};

fn main() {
    if let Err(e) = run_app() {
        eprintln!("\nError: {}", e);
        std::process::exit(1);
    }
}

fn run_app() -> Result<()> {
    let cli = Cli::parse();
    logging::setup_logging(cli.verbose, cli.quiet, cli.log_file.clone())?;

    info!("automd CLI v{} starting up.", env!("CARGO_PKG_VERSION"));
    debug!("Full CLI arguments parsed: {:?}", &cli);

    let command_result = match cli.command {
        Commands::Format(args) => {
            info!("Dispatching to 'format' command.");
            commands::format::run(args)
        }
        Commands::Cap(args) => {
            info!("Dispatching to 'cap' command.");
            commands::cap::run(args)
        }
        Commands::QmStructure(args) => {
            info!("Dispatching to 'qm-structure' command.");
            commands::qm_structure::run(args)
        }
        Commands::Constraints(args) => {
            info!("Dispatching to 'constraints' command.");
            commands::constraints::run(args)
        }
        Commands::Mainchain(args) => {
            info!("Dispatching to 'mainchain' command.");
            commands::mainchain::run(args)
        }
        Commands::Rename(args) => {
            info!("Dispatching to 'rename' command.");
            commands::rename::run(args)
        }
        Commands::Ligand(args) => {
            info!("Dispatching to 'ligand' command.");
            commands::ligand::run(args)
        }
        Commands::Tools(args) => {
            info!("Dispatching to 'tools' command.");
            commands::tools::run(args)
        }
    };

    match &command_result {
        Ok(()) => info!("Command completed successfully."),
        Err(e) => error!("Command failed: {}", e),
    }

    command_result
}
