use std::path::Path;
use tracing::{debug, warn};

/// Fixed scratch names left behind by the typing and charge-fitting tools.
const TOOL_SCRATCH: &[&str] = &[
    "ANTECHAMBER*",
    "ATOMTYPE.INF",
    "NEWPDB.PDB",
    "PREP.INF",
    "punch",
    "qout",
    "QOUT",
    "esout",
    "sqm.*",
];

/// Glob patterns, relative to the working directory, for every scratch file of
/// a run whose intermediate files start with `prefix`.
pub fn scratch_patterns(prefix: Option<&str>) -> Vec<String> {
    prefix
        .into_iter()
        .map(|p| format!("{}.*", glob::Pattern::escape(p)))
        .chain(TOOL_SCRATCH.iter().map(|p| (*p).to_string()))
        .collect()
}

/// Removes scratch files from `dir`, returning how many were deleted.
///
/// Removal is best effort: unreadable patterns and failed deletions are logged
/// and skipped.
pub fn clean_scratch(dir: &Path, prefix: Option<&str>) -> usize {
    let escaped_dir = glob::Pattern::escape(&dir.to_string_lossy());
    let mut removed = 0;
    for pattern in scratch_patterns(prefix) {
        let full = format!("{escaped_dir}/{pattern}");
        let entries = match glob::glob(&full) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(pattern = %full, error = %e, "Skipping invalid scratch pattern");
                continue;
            }
        };
        for entry in entries.flatten() {
            if !entry.is_file() {
                continue;
            }
            match std::fs::remove_file(&entry) {
                Ok(()) => {
                    debug!(path = %entry.display(), "Removed scratch file");
                    removed += 1;
                }
                Err(e) => debug!(path = %entry.display(), error = %e, "Could not remove scratch file"),
            }
        }
    }
    removed
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn patterns_include_run_prefix_when_given() {
        let patterns = scratch_patterns(Some("LDMtmp"));
        assert_eq!(patterns[0], "LDMtmp.*");
        assert!(patterns.contains(&"ANTECHAMBER*".to_string()));
        assert_eq!(scratch_patterns(None).len(), TOOL_SCRATCH.len());
    }

    #[test]
    fn clean_removes_scratch_and_keeps_outputs() {
        let dir = tempdir().unwrap();
        for name in [
            "LDMtmp.ac",
            "LDMtmp.step1.respin",
            "ANTECHAMBER_RESP1.IN",
            "ATOMTYPE.INF",
            "sqm.out",
            "punch",
            "LDM.prepi",
            "LDM.frcmod",
        ] {
            std::fs::write(dir.path().join(name), "x").unwrap();
        }

        let removed = clean_scratch(dir.path(), Some("LDMtmp"));
        assert_eq!(removed, 6);
        assert!(dir.path().join("LDM.prepi").exists());
        assert!(dir.path().join("LDM.frcmod").exists());
        assert!(!dir.path().join("LDMtmp.ac").exists());
        assert!(!dir.path().join("sqm.out").exists());
    }

    #[test]
    fn clean_on_empty_directory_removes_nothing() {
        let dir = tempdir().unwrap();
        assert_eq!(clean_scratch(dir.path(), None), 0);
    }
}
