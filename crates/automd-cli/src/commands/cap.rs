use super::load_caps;
use crate::cli::CapArgs;
use crate::error::{CliError, Result};
use automd::tools::qm::capping_leap_script;
use automd::workflows;
use std::path::PathBuf;
use tracing::info;

pub fn run(args: CapArgs) -> Result<()> {
    let caps = load_caps(&args.config)?;

    info!(
        "Capping residue {} of {:?} with {}/{}",
        args.residue_id, &args.input, caps.n_cap, caps.c_cap
    );
    workflows::residue::cap_residue(&args.input, args.residue_id, &args.output, &caps)?;
    println!("✓ Capped fragment written to: {}", args.output.display());

    if let Some(script_path) = &args.leap_script {
        let saved = args
            .leap_output
            .clone()
            .unwrap_or_else(|| hydrogenated_path(&args.output));
        let script = capping_leap_script(&args.force_field, &args.output, &saved);
        std::fs::write(script_path, script).map_err(|e| CliError::FileParsing {
            path: script_path.clone(),
            source: e.into(),
        })?;
        println!(
            "  System-builder script written to: {} (saves {})",
            script_path.display(),
            saved.display()
        );
    }
    Ok(())
}

/// `frag.pdb` becomes `frag_h.pdb`.
fn hydrogenated_path(fragment: &std::path::Path) -> PathBuf {
    let stem = fragment
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let file_name = match fragment.extension() {
        Some(ext) => format!("{}_h.{}", stem, ext.to_string_lossy()),
        None => format!("{}_h", stem),
    };
    fragment.with_file_name(file_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn hydrogenated_path_appends_suffix_before_extension() {
        assert_eq!(
            hydrogenated_path(Path::new("work/frag.pdb")),
            PathBuf::from("work/frag_h.pdb")
        );
        assert_eq!(hydrogenated_path(Path::new("frag")), PathBuf::from("frag_h"));
    }
}
