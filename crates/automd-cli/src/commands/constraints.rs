use super::load_prep_config;
use crate::cli::ConstraintsArgs;
use crate::error::{CliError, Result};
use automd::workflows;

pub fn run(args: ConstraintsArgs) -> Result<()> {
    if args.output.is_none() && args.fitting_inputs.is_empty() {
        return Err(CliError::Argument(
            "either --output or at least one --fitting-input is required".to_string(),
        ));
    }
    let config = load_prep_config(&args.prep)?;

    if let Some(output) = &args.output {
        let constraints = workflows::residue::write_constraint_block(&args.structure, output, &config)?;
        println!(
            "✓ {} charge constraints written to: {}",
            constraints.len(),
            output.display()
        );
    }

    if !args.fitting_inputs.is_empty() {
        let written = workflows::residue::assemble_fitting_inputs(
            &args.structure,
            &args.fitting_inputs,
            &args.output_dir,
            &config,
        )?;
        for path in &written {
            println!("✓ Charge-fitting input written to: {}", path.display());
        }
    }
    Ok(())
}
