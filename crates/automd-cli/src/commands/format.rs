use super::load_prep_config;
use crate::cli::FormatArgs;
use crate::error::Result;
use automd::workflows;
use tracing::info;

pub fn run(args: FormatArgs) -> Result<()> {
    let config = load_prep_config(&args.prep)?;

    info!("Formatting structural file {:?}", &args.input);
    let outcome = workflows::ligand::format_structure(&args.input, &args.output, &config)?;

    for rename in &outcome.renames {
        println!("  Atom {:>5}: {} -> {}", rename.serial, rename.from, rename.to);
    }
    println!(
        "✓ {} atoms of {} written to {} ({} renamed).",
        outcome.structure.len(),
        config.residue_name,
        args.output.display(),
        outcome.renames.len()
    );
    Ok(())
}
