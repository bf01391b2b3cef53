use super::load_prep_config;
use crate::cli::RenameArgs;
use crate::error::Result;
use automd::workflows;
use tracing::info;

pub fn run(args: RenameArgs) -> Result<()> {
    let config = load_prep_config(&args.prep)?;

    info!("Rewriting residue template {:?}", &args.template);
    let output = workflows::residue::finalize_template(
        &args.canonical,
        &args.typed,
        &args.template,
        &args.output_dir,
        &config,
    )?;
    println!("✓ Residue template written to: {}", output.display());
    Ok(())
}
