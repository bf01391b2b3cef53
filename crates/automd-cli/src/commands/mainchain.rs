use super::load_caps;
use crate::cli::MainchainArgs;
use crate::error::Result;
use automd::workflows;

pub fn run(args: MainchainArgs) -> Result<()> {
    let caps = load_caps(&args.config)?;
    let descriptor =
        workflows::residue::write_mainchain(&args.canonical, &args.typed, &args.output, &caps)?;
    println!(
        "✓ Mainchain descriptor ({} entries, {} omitted) written to: {}",
        descriptor.entries.len(),
        descriptor.omitted().count(),
        args.output.display()
    );
    Ok(())
}
