use super::load_caps;
use crate::cli::QmStructureArgs;
use crate::error::{CliError, Result};
use automd::core::io::pdb::StructureFile;
use automd::tools::qm::{GaussianDeck, xyz_block};
use automd::workflows;
use tracing::info;

pub fn run(args: QmStructureArgs) -> Result<()> {
    let caps = load_caps(&args.config)?;

    let report = workflows::residue::prepare_qm_structure(&args.input, &args.output, &caps)?;
    let path_kind = if report.cap_records > 0 {
        "nonstandard amino acid"
    } else {
        "small molecule"
    };
    println!(
        "✓ {} atom records written to {} ({} cap records, {} path).",
        report.atom_records,
        args.output.display(),
        report.cap_records,
        path_kind
    );

    if let Some(deck_path) = &args.deck {
        let structure =
            StructureFile::read_from_path(&args.output).map_err(|e| CliError::FileParsing {
                path: args.output.clone(),
                source: e.into(),
            })?;
        let mut deck = GaussianDeck::new(deck_path.with_extension("chk"), args.charge)
            .with_optimization(args.optimize);
        if let Some(processors) = args.processors {
            deck = deck.with_processors(processors);
        }
        info!(
            processors = deck.processors,
            optimize = deck.optimize,
            "Rendering quantum-chemistry deck"
        );
        std::fs::write(deck_path, deck.render(&xyz_block(&structure))).map_err(|e| {
            CliError::FileParsing {
                path: deck_path.clone(),
                source: e.into(),
            }
        })?;
        println!("  Quantum-chemistry deck written to: {}", deck_path.display());
    }
    Ok(())
}
