use super::{read_input, write_output};
use crate::core::io::pdb::{AtomInfo, StructureFile, read_atom_info};
use crate::engine::caps::{build_capped_fragment, count_cap_records, normalize_for_qm};
use crate::engine::config::{CapNames, PrepConfig};
use crate::engine::constraints::{
    ChargeConstraint, assemble_fitting_input, charge_constraints, render_constraints,
};
use crate::engine::error::PrepError;
use crate::engine::identity::IdentityMap;
use crate::engine::mainchain::MainchainDescriptor;
use crate::engine::rewriter::TemplateRewriter;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

pub const TEMPLATE_EXTENSION: &str = "prepi";

/// Summary of a structure prepared for the quantum-chemistry step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QmStructureReport {
    pub atom_records: usize,
    /// Nonzero when the structure carries caps, selecting the amino-acid path.
    pub cap_records: usize,
}

#[instrument(skip_all, name = "cap_workflow", fields(residue_id = residue_id))]
pub fn cap_residue(
    input: &Path,
    residue_id: isize,
    output: &Path,
    caps: &CapNames,
) -> Result<(), PrepError> {
    let fragment = build_capped_fragment(&read_input(input)?, residue_id, caps)?;
    write_output(output, &fragment)?;
    info!(path = %output.display(), "Wrote capped fragment");
    Ok(())
}

#[instrument(skip_all, name = "qm_structure_workflow")]
pub fn prepare_qm_structure(
    input: &Path,
    output: &Path,
    caps: &CapNames,
) -> Result<QmStructureReport, PrepError> {
    let normalized = normalize_for_qm(&read_input(input)?, caps)?;
    let report = QmStructureReport {
        atom_records: normalized.lines().count(),
        cap_records: count_cap_records(&normalized, caps),
    };
    write_output(output, &normalized)?;
    info!(
        atoms = report.atom_records,
        caps = report.cap_records,
        path = %output.display(),
        "Wrote quantum-chemistry structure"
    );
    Ok(report)
}

/// Writes the bare constraint block for the canonical structure.
#[instrument(skip_all, name = "constraints_workflow")]
pub fn write_constraint_block(
    structure: &Path,
    output: &Path,
    config: &PrepConfig,
) -> Result<Vec<ChargeConstraint>, PrepError> {
    let constraints = load_constraints(structure, config)?;
    write_output(output, &render_constraints(&constraints))?;
    info!(count = constraints.len(), path = %output.display(), "Wrote charge constraints");
    Ok(constraints)
}

/// Truncates each charge-fitting input and appends the constraint block,
/// writing the result under `output_dir` with the input's file name.
#[instrument(skip_all, name = "fitting_inputs_workflow")]
pub fn assemble_fitting_inputs(
    structure: &Path,
    inputs: &[PathBuf],
    output_dir: &Path,
    config: &PrepConfig,
) -> Result<Vec<PathBuf>, PrepError> {
    let constraints = load_constraints(structure, config)?;
    let mut written = Vec::with_capacity(inputs.len());
    for input in inputs {
        let text = read_input(input)?;
        let file_name = input
            .file_name()
            .ok_or_else(|| PrepError::MissingFile(input.clone()))?;
        let output = output_dir.join(file_name);
        write_output(&output, &assemble_fitting_input(&text, &constraints))?;
        debug!(path = %output.display(), "Wrote charge-fitting input");
        written.push(output);
    }
    info!(
        files = written.len(),
        constraints = constraints.len(),
        "Assembled charge-fitting inputs"
    );
    Ok(written)
}

#[instrument(skip_all, name = "mainchain_workflow")]
pub fn write_mainchain(
    canonical: &Path,
    typed: &Path,
    output: &Path,
    caps: &CapNames,
) -> Result<MainchainDescriptor, PrepError> {
    let (canonical_rows, typed_rows) = load_atom_info(canonical, typed)?;
    let descriptor = MainchainDescriptor::build(&canonical_rows, &typed_rows, caps)?;
    write_output(output, &descriptor.to_string())?;
    info!(
        entries = descriptor.entries.len(),
        path = %output.display(),
        "Wrote mainchain descriptor"
    );
    Ok(descriptor)
}

/// Rewrites the typing tool's residue template into canonical names and writes
/// it as `<residue>.prepi` in `output_dir`.
#[instrument(skip_all, name = "template_workflow", fields(residue = %config.residue_name))]
pub fn finalize_template(
    canonical: &Path,
    typed: &Path,
    template: &Path,
    output_dir: &Path,
    config: &PrepConfig,
) -> Result<PathBuf, PrepError> {
    let (canonical_rows, typed_rows) = load_atom_info(canonical, typed)?;
    let map = IdentityMap::build(&canonical_rows, &typed_rows, &config.caps)?;
    info!(entries = map.len(), "Built identity map");

    let source = read_input(template)?;
    let rewritten =
        TemplateRewriter::new(&map, config.residue_kind.is_capped()).rewrite(&source)?;

    let output = output_dir.join(format!("{}.{}", config.residue_name, TEMPLATE_EXTENSION));
    write_output(&output, &rewritten)?;
    info!(path = %output.display(), "Wrote residue template");
    Ok(output)
}

fn load_constraints(structure: &Path, config: &PrepConfig) -> Result<Vec<ChargeConstraint>, PrepError> {
    let structure = StructureFile::parse_str(&read_input(structure)?)?;
    Ok(charge_constraints(&structure, &config.caps, &config.charge_tables))
}

fn load_atom_info(
    canonical: &Path,
    typed: &Path,
) -> Result<(Vec<AtomInfo>, Vec<AtomInfo>), PrepError> {
    let canonical_rows = read_atom_info(&mut read_input(canonical)?.as_bytes())?;
    let typed_rows = read_atom_info(&mut read_input(typed)?.as_bytes())?;
    Ok((canonical_rows, typed_rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::config::{PrepConfigBuilder, ResidueKind};
    use tempfile::{TempDir, tempdir};

    const CANONICAL: &str = "\
ATOM      1  CH3 ACE     1       0.000   0.000   0.000  1.00  0.00           C
ATOM      2  C   ACE     1       1.000   0.000   0.000  1.00  0.00           C
ATOM      3  O   ACE     1       1.000   1.000   0.000  1.00  0.00           O
ATOM      4  N   LDM     2       2.000   0.000   0.000  1.00  0.00           N
ATOM      5  H   LDM     2       2.000   1.000   0.000  1.00  0.00           H
ATOM      6  CA  LDM     2       3.000   0.000   0.000  1.00  0.00           C
ATOM      7  C   LDM     2       4.000   0.000   0.000  1.00  0.00           C
ATOM      8  O   LDM     2       4.000   1.000   0.000  1.00  0.00           O
ATOM      9  N   NME     3       5.000   0.000   0.000  1.00  0.00           N
";

    const TYPED: &str = "\
ATOM      1  C1  MOL     1       0.000   0.000   0.000 -0.150000        c3
ATOM      2  C2  MOL     1       1.000   0.000   0.000  0.600000        c
ATOM      3  O1  MOL     1       1.000   1.000   0.000 -0.560000        o
ATOM      4  N1  MOL     1       2.000   0.000   0.000 -0.400000        n
ATOM      5  H1  MOL     1       2.000   1.000   0.000  0.270000        hn
ATOM      6  C3  MOL     1       3.000   0.000   0.000  0.100000        c3
ATOM      7  C4  MOL     1       4.000   0.000   0.000  0.600000        c
ATOM      8  O2  MOL     1       4.000   1.000   0.000 -0.560000        o
ATOM      9  N2  MOL     1       5.000   0.000   0.000 -0.400000        n
";

    const TEMPLATE: &str = "\
   1  DUMM  DU    M    0  -1  -2     0.000      .0        .0      .00000
   4  N1    n     M    3   2   1     1.540   111.208   180.000 -0.41570
   5  H1    hn    E    4   3   2     1.010   119.800     0.000  0.27190
   6  C3    c3    M    4   3   2     1.449   121.900   180.000 -0.03390
   7  C4    c     M    6   4   3     1.522   111.100   180.000  0.59730
   8  O2    o     E    7   6   4     1.229   120.500     0.000 -0.56790

IMPROPER
   C3   +M   C4   O2

DONE
STOP
";

    fn workspace() -> TempDir {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("canonical.pdb"), CANONICAL).unwrap();
        std::fs::write(dir.path().join("typed.ac"), TYPED).unwrap();
        std::fs::write(dir.path().join("typed.prepi"), TEMPLATE).unwrap();
        dir
    }

    fn amino_acid_config() -> PrepConfig {
        PrepConfigBuilder::new()
            .residue_name("LDM")
            .residue_kind(ResidueKind::NonstandardAminoAcid)
            .build()
            .unwrap()
    }

    #[test]
    fn finalize_template_writes_canonical_template_named_after_residue() {
        let dir = workspace();
        let path = dir.path();
        let output = finalize_template(
            &path.join("canonical.pdb"),
            &path.join("typed.ac"),
            &path.join("typed.prepi"),
            path,
            &amino_acid_config(),
        )
        .unwrap();
        assert_eq!(output, path.join("LDM.prepi"));

        let text = std::fs::read_to_string(&output).unwrap();
        assert!(text.contains("   7  C     c     M"));
        assert!(text.contains("   CA   +M    C    O\n   -M   CA    N    H\n\nDONE"));
    }

    #[test]
    fn finalize_template_fails_on_misaligned_inputs() {
        let dir = workspace();
        let path = dir.path();
        let truncated: String = TYPED.lines().take(8).map(|l| format!("{l}\n")).collect();
        std::fs::write(path.join("typed.ac"), truncated).unwrap();
        let err = finalize_template(
            &path.join("canonical.pdb"),
            &path.join("typed.ac"),
            &path.join("typed.prepi"),
            path,
            &amino_acid_config(),
        )
        .unwrap_err();
        assert!(matches!(err, PrepError::RecordCountMismatch { .. }));
    }

    #[test]
    fn mainchain_file_names_typing_tool_atoms() {
        let dir = workspace();
        let path = dir.path();
        let output = path.join("LDM.mainchain");
        write_mainchain(
            &path.join("canonical.pdb"),
            &path.join("typed.ac"),
            &output,
            &CapNames::default(),
        )
        .unwrap();
        let text = std::fs::read_to_string(output).unwrap();
        assert_eq!(
            text,
            "OMIT_NAME C1\nOMIT_NAME C2\nOMIT_NAME O1\nHEAD_NAME N1\nMAIN_CHAIN C3\nTAIL_NAME C4\n\
             OMIT_NAME N2\nPRE_HEAD_TYPE C\nPOST_TAIL_TYPE N\nCHARGE 0.0\n"
        );
    }

    #[test]
    fn fitting_inputs_receive_constraint_block() {
        let dir = workspace();
        let path = dir.path();
        let input = path.join("ANTECHAMBER_RESP1.IN");
        std::fs::write(&input, " &cntrl\n &end\n    1.0\n\n    1    0\n").unwrap();
        let out_dir = path.join("out");
        std::fs::create_dir(&out_dir).unwrap();

        let written = assemble_fitting_inputs(
            &path.join("canonical.pdb"),
            &[input],
            &out_dir,
            &amino_acid_config(),
        )
        .unwrap();
        assert_eq!(written, vec![out_dir.join("ANTECHAMBER_RESP1.IN")]);
        let text = std::fs::read_to_string(&written[0]).unwrap();
        assert!(text.starts_with(" &cntrl\n &end\n    1.0\n    1  -0.36620\n    1    1\n"));
        assert!(text.ends_with("    1  -0.41570\n    1    9\n\n\n"));
    }

    #[test]
    fn constraint_block_is_written_alone() {
        let dir = workspace();
        let path = dir.path();
        let output = path.join("constraints.txt");
        let constraints =
            write_constraint_block(&path.join("canonical.pdb"), &output, &amino_acid_config()).unwrap();
        assert_eq!(constraints.len(), 8);
        assert!(std::fs::read_to_string(output).unwrap().ends_with("\n\n\n"));
    }

    #[test]
    fn qm_structure_reports_caps() {
        let dir = workspace();
        let path = dir.path();
        let report = prepare_qm_structure(
            &path.join("canonical.pdb"),
            &path.join("qm.pdb"),
            &CapNames::default(),
        )
        .unwrap();
        assert_eq!(
            report,
            QmStructureReport {
                atom_records: 9,
                cap_records: 4
            }
        );
    }

    #[test]
    fn cap_residue_requires_existing_input() {
        let dir = tempdir().unwrap();
        let err = cap_residue(
            &dir.path().join("missing.pdb"),
            2,
            &dir.path().join("out.pdb"),
            &CapNames::default(),
        )
        .unwrap_err();
        assert!(matches!(err, PrepError::MissingFile(_)));
    }
}
