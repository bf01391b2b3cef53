use crate::cli::LigandArgs;
use crate::error::Result;
use automd::engine::ligand::net_charge;
use automd::workflows;

pub fn run(args: LigandArgs) -> Result<()> {
    let atoms =
        workflows::ligand::emit_charged_structure(&args.structure, &args.template, &args.output)?;
    println!(
        "✓ {} charged atoms (net charge {:.4}) written to: {}",
        atoms.len(),
        net_charge(&atoms),
        args.output.display()
    );
    Ok(())
}
