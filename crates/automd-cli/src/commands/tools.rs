use crate::cli::{ToolsArgs, ToolsCommand};
use crate::error::Result;
use automd::tools::{cleanup, command, qm};
use std::path::Path;
use tracing::info;

/// Executables every preparation run shells out to.
const REQUIRED_PROGRAMS: &[&str] = &[
    command::ANTECHAMBER,
    command::PARMCHK2,
    command::PREPGEN,
    command::RESP,
    command::TLEAP,
];

pub fn run(args: ToolsArgs) -> Result<()> {
    match args.command {
        ToolsCommand::Check { qm_executable } => check(qm_executable.as_deref()),
        ToolsCommand::QmStatus { log } => qm_status(&log),
        ToolsCommand::Clean { dir, prefix } => clean(&dir, prefix.as_deref()),
    }
}

fn required_programs(qm_executable: Option<&str>) -> Vec<&str> {
    REQUIRED_PROGRAMS
        .iter()
        .copied()
        .chain(qm_executable)
        .collect()
}

fn check(qm_executable: Option<&str>) -> Result<()> {
    let programs = required_programs(qm_executable);
    for program in &programs {
        match command::find_in_path(program) {
            Some(path) => println!("  ✓ {:<12} {}", program, path.display()),
            None => println!("  ✗ {:<12} not found", program),
        }
    }
    command::ensure_available(programs.iter().copied())?;
    println!("✓ All {} executables are available.", programs.len());
    Ok(())
}

fn qm_status(log: &Path) -> Result<()> {
    qm::check_log(log)?;
    println!("✓ {} terminated normally.", log.display());
    Ok(())
}

fn clean(dir: &Path, prefix: Option<&str>) -> Result<()> {
    info!("Removing scratch files from {:?}", dir);
    let removed = cleanup::clean_scratch(dir, prefix);
    println!("✓ Removed {} scratch files from {}.", removed, dir.display());
    Ok(())
}
