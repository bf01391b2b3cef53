use super::config::CapNames;
use super::error::PrepError;
use crate::core::io::pdb::{PdbError, PdbParseErrorKind, is_atom_record, slice_and_trim};
use crate::core::models::atom::name_field;
use std::collections::HashMap;
use tracing::{debug, info};

const IDENTITY_COLUMNS: std::ops::Range<usize> = 12..20;

/// Cuts one residue out of a chain and caps it with the neighbouring backbone.
///
/// Every record of `residue_id` is kept. The preceding residue contributes its
/// `CA`, `C` and `O` as the N-terminal cap (`CH3`, `C`, `O`), the following
/// residue its `CA`, `N` and `H` as the C-terminal cap (`CH3`, `N`, `H`).
/// Only columns 13-20 of the cap records are rewritten.
pub fn build_capped_fragment(
    text: &str,
    residue_id: isize,
    caps: &CapNames,
) -> Result<String, PrepError> {
    let mut output = String::with_capacity(text.len());
    let mut target_records = 0usize;

    for (idx, line) in text.lines().enumerate() {
        if !is_atom_record(line) {
            continue;
        }
        let id = residue_id_of(line, idx + 1)?;
        let atom_name = slice_and_trim(line, 12, 16);

        let rewritten = if id == residue_id {
            target_records += 1;
            Some(line.to_string())
        } else if id == residue_id - 1 {
            match atom_name {
                "CA" => cap_record(line, "CH3", &caps.n_cap),
                "C" | "O" => cap_record(line, atom_name, &caps.n_cap),
                _ => None,
            }
        } else if id == residue_id + 1 {
            match atom_name {
                "CA" => cap_record(line, "CH3", &caps.c_cap),
                "N" | "H" => cap_record(line, atom_name, &caps.c_cap),
                _ => None,
            }
        } else {
            None
        };

        if let Some(record) = rewritten {
            output.push_str(&record);
            output.push('\n');
        }
    }

    if target_records == 0 {
        return Err(PrepError::ResidueNotFound { residue_id });
    }
    info!(residue_id, target_records, "Built capped fragment");
    Ok(output)
}

/// Number of atom records belonging to a capping residue.
pub fn count_cap_records(text: &str, caps: &CapNames) -> usize {
    text.lines()
        .filter(|line| is_atom_record(line) && caps.contains(slice_and_trim(line, 17, 20)))
        .count()
}

/// Keeps only atom records, all written as `ATOM`, and rejects repeated atom
/// names outside the capping residues.
pub fn normalize_for_qm(text: &str, caps: &CapNames) -> Result<String, PrepError> {
    let mut output = String::with_capacity(text.len());
    let mut seen: HashMap<&str, usize> = HashMap::new();
    let mut order: Vec<&str> = Vec::new();

    for line in text.lines().filter(|line| is_atom_record(line)) {
        match line.strip_prefix("HETATM") {
            Some(rest) => {
                output.push_str("ATOM  ");
                output.push_str(rest);
            }
            None => output.push_str(line),
        }
        output.push('\n');

        if !caps.contains(slice_and_trim(line, 17, 20)) {
            let name = slice_and_trim(line, 12, 16);
            let count = seen.entry(name).or_insert(0);
            *count += 1;
            if *count == 2 {
                order.push(name);
            }
        }
    }

    if !order.is_empty() {
        return Err(PrepError::DuplicateAtomNames {
            names: order.into_iter().map(str::to_string).collect(),
        });
    }

    let cap_records = count_cap_records(&output, caps);
    if cap_records > 0 {
        debug!(cap_records, "Found capping residues");
    }
    Ok(output)
}

fn residue_id_of(line: &str, line_number: usize) -> Result<isize, PdbError> {
    let value = slice_and_trim(line, 22, 26);
    value.parse().map_err(|_| PdbError::Parse {
        line: line_number,
        kind: PdbParseErrorKind::InvalidInt {
            columns: "23-26".to_string(),
            value: value.to_string(),
        },
    })
}

fn cap_record(line: &str, atom_name: &str, cap_residue: &str) -> Option<String> {
    let head = line.get(..IDENTITY_COLUMNS.start)?;
    let tail = line.get(IDENTITY_COLUMNS.end..)?;
    Some(format!("{head}{} {:<3}{tail}", name_field(atom_name), cap_residue))
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHAIN: &str = "\
ATOM      1  N   ALA A   1      -0.677  -1.230  -0.491  1.00  0.00           N
ATOM      2  CA  ALA A   1      -0.001   0.064  -0.491  1.00  0.00           C
ATOM      3  C   ALA A   1       1.499  -0.110  -0.491  1.00  0.00           C
ATOM      4  O   ALA A   1       2.030  -1.227  -0.502  1.00  0.00           O
ATOM      5  CB  ALA A   1      -0.509   0.856   0.727  1.00  0.00           C
HETATM    6  N   LDM A   2       2.250   0.991  -0.480  1.00  0.00           N
HETATM    7  CA  LDM A   2       3.700   0.881  -0.480  1.00  0.00           C
HETATM    8  C   LDM A   2       4.300   2.270  -0.480  1.00  0.00           C
HETATM    9  O   LDM A   2       3.600   3.270  -0.480  1.00  0.00           O
ATOM     10  N   GLY A   3       5.620   2.330  -0.480  1.00  0.00           N
ATOM     11  H   GLY A   3       6.130   1.460  -0.480  1.00  0.00           H
ATOM     12  CA  GLY A   3       6.390   3.560  -0.480  1.00  0.00           C
ATOM     13  C   GLY A   3       7.890   3.300  -0.480  1.00  0.00           C
";

    #[test]
    fn capped_fragment_keeps_target_and_converts_neighbours() {
        let fragment = build_capped_fragment(CHAIN, 2, &CapNames::default()).unwrap();
        let identities: Vec<&str> = fragment.lines().map(|l| &l[12..20]).collect();
        assert_eq!(
            identities,
            vec![
                " CH3 ACE", " C   ACE", " O   ACE", " N   LDM", " CA  LDM", " C   LDM", " O   LDM",
                " N   NME", " H   NME", " CH3 NME",
            ]
        );
    }

    #[test]
    fn capped_fragment_preserves_columns_outside_identity() {
        let fragment = build_capped_fragment(CHAIN, 2, &CapNames::default()).unwrap();
        let first = fragment.lines().next().unwrap();
        let source = CHAIN.lines().nth(1).unwrap();
        assert_eq!(&first[..12], &source[..12]);
        assert_eq!(&first[20..], &source[20..]);
    }

    #[test]
    fn capped_fragment_for_absent_residue_fails() {
        let err = build_capped_fragment(CHAIN, 9, &CapNames::default()).unwrap_err();
        assert!(matches!(err, PrepError::ResidueNotFound { residue_id: 9 }));
    }

    #[test]
    fn cap_records_are_counted_by_residue_name() {
        let fragment = build_capped_fragment(CHAIN, 2, &CapNames::default()).unwrap();
        assert_eq!(count_cap_records(&fragment, &CapNames::default()), 6);
        assert_eq!(count_cap_records(CHAIN, &CapNames::default()), 0);
    }

    #[test]
    fn qm_normalization_rewrites_hetatm_and_drops_other_records() {
        let text = format!("REMARK test\n{}TER\nEND\n", CHAIN);
        let normalized = normalize_for_qm(&text, &CapNames::default());
        // ALA, LDM and GLY repeat backbone names.
        assert!(matches!(normalized, Err(PrepError::DuplicateAtomNames { .. })));

        let fragment = build_capped_fragment(CHAIN, 2, &CapNames::default()).unwrap();
        let normalized = normalize_for_qm(&format!("REMARK x\n{fragment}END\n"), &CapNames::default()).unwrap();
        assert_eq!(normalized.lines().count(), 10);
        assert!(normalized.lines().all(|l| l.starts_with("ATOM  ")));
        assert!(!normalized.contains("HETATM"));
    }

    #[test]
    fn qm_normalization_lists_each_duplicate_once() {
        let err = normalize_for_qm(CHAIN, &CapNames::default()).unwrap_err();
        match err {
            PrepError::DuplicateAtomNames { names } => assert_eq!(names, vec!["N", "CA", "C", "O"]),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
