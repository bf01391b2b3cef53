use crate::core::models::atom::{Atom, name_field};
use nalgebra::Point3;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::ops::Range;
use std::path::Path;
use thiserror::Error;

/// Width of the identity-bearing prefix of an atom record (record type, serial,
/// atom name and residue name).
pub const ATOM_INFO_WIDTH: usize = 20;

const MIN_RECORD_WIDTH: usize = 54;
const DEFAULT_OCCUPANCY: f64 = 1.0;
const DEFAULT_TEMP_FACTOR: f64 = 0.0;

#[derive(Debug, Error)]
pub enum PdbError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error on line {line}: {kind}")]
    Parse { line: usize, kind: PdbParseErrorKind },
    #[error("Missing required record: {0}")]
    MissingRecord(String),
}

#[derive(Debug, Error)]
pub enum PdbParseErrorKind {
    #[error("Invalid integer format in columns {columns} (value: '{value}')")]
    InvalidInt { columns: String, value: String },
    #[error("Invalid float format in columns {columns} (value: '{value}')")]
    InvalidFloat { columns: String, value: String },
    #[error("Required field in columns {columns} is empty")]
    MissingRequiredField { columns: String },
    #[error("Line is too short for ATOM/HETATM record (must be at least 54 chars)")]
    LineTooShort,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecordKind {
    #[default]
    Atom,
    Hetatm,
}

impl RecordKind {
    pub fn keyword(self) -> &'static str {
        match self {
            RecordKind::Atom => "ATOM",
            RecordKind::Hetatm => "HETATM",
        }
    }

    fn from_line(line: &str) -> Option<Self> {
        if line.starts_with("ATOM") {
            Some(RecordKind::Atom)
        } else if line.starts_with("HETATM") {
            Some(RecordKind::Hetatm)
        } else {
            None
        }
    }
}

pub fn is_atom_record(line: &str) -> bool {
    RecordKind::from_line(line).is_some()
}

/// One coordinate record of a structural file.
///
/// The atom carries identity, geometry and charge; the remaining columns are
/// kept so a record can be written back with its annotations intact.
#[derive(Debug, Clone, PartialEq)]
pub struct StructureRecord {
    pub kind: RecordKind,
    /// Serial number as read from columns 7-11.
    pub source_serial: usize,
    pub atom: Atom,
    pub alt_loc: String,
    pub chain_id: String,
    pub insertion_code: String,
    pub occupancy: f64,
    pub temp_factor: f64,
    pub element: String,
    pub formal_charge: String,
    /// 1-based line number in the source file.
    pub line_number: usize,
}

impl StructureRecord {
    pub fn parse(line: &str, line_number: usize) -> Result<Option<Self>, PdbError> {
        let Some(kind) = RecordKind::from_line(line) else {
            return Ok(None);
        };
        if line.len() < MIN_RECORD_WIDTH {
            return Err(parse_error(line_number, PdbParseErrorKind::LineTooShort));
        }

        let name = slice_and_trim(line, 12, 16);
        if name.is_empty() {
            return Err(parse_error(
                line_number,
                PdbParseErrorKind::MissingRequiredField {
                    columns: "13-16".into(),
                },
            ));
        }
        let source_serial = parse_int::<usize>(line, line_number, 6, 11)?;
        let residue_id = parse_int::<isize>(line, line_number, 22, 26)?;
        let x = parse_float(line, line_number, 30, 38)?;
        let y = parse_float(line, line_number, 38, 46)?;
        let z = parse_float(line, line_number, 46, 54)?;
        let occupancy = parse_optional_float(line, line_number, 54, 60)?.unwrap_or(DEFAULT_OCCUPANCY);
        let temp_factor =
            parse_optional_float(line, line_number, 60, 66)?.unwrap_or(DEFAULT_TEMP_FACTOR);

        let atom = Atom::new(name, slice_and_trim(line, 17, 20), Point3::new(x, y, z))
            .with_residue_id(residue_id);

        Ok(Some(Self {
            kind,
            source_serial,
            atom,
            alt_loc: slice_and_trim(line, 16, 17).to_string(),
            chain_id: slice_and_trim(line, 21, 22).to_string(),
            insertion_code: slice_and_trim(line, 26, 27).to_string(),
            occupancy,
            temp_factor,
            element: slice_and_trim(line, 76, 78).to_string(),
            formal_charge: slice_and_trim(line, 78, 80).to_string(),
            line_number,
        }))
    }

    /// Serializes the record in the structural-file column convention.
    pub fn to_line(&self) -> String {
        format!(
            "{:<6}{:>5} {}{:1}{:<3} {:1}{:>4}{:1}   {:>8.3}{:>8.3}{:>8.3}{:>6.2}{:>6.2}          {:>2}{}",
            self.kind.keyword(),
            self.atom.serial,
            name_field(&self.atom.name),
            self.alt_loc,
            self.atom.residue_name,
            self.chain_id,
            self.atom.residue_id,
            self.insertion_code,
            self.atom.position.x,
            self.atom.position.y,
            self.atom.position.z,
            self.occupancy,
            self.temp_factor,
            self.element,
            self.formal_charge,
        )
    }
}

/// The coordinate records of a structural file, in file order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StructureFile {
    pub records: Vec<StructureRecord>,
}

impl StructureFile {
    pub fn read_from(reader: &mut impl BufRead) -> Result<Self, PdbError> {
        let mut records = Vec::new();
        for (idx, line_res) in reader.lines().enumerate() {
            let line = line_res?;
            let line_number = idx + 1;
            let record_type = slice_and_trim(&line, 0, 6);
            if matches!(record_type, "END" | "ENDMDL") {
                break;
            }
            if let Some(record) = StructureRecord::parse(&line, line_number)? {
                records.push(record);
            }
        }
        Ok(Self { records })
    }

    pub fn parse_str(content: &str) -> Result<Self, PdbError> {
        Self::read_from(&mut content.as_bytes())
    }

    pub fn read_from_path<P: AsRef<Path>>(path: P) -> Result<Self, PdbError> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        Self::read_from(&mut reader)
    }

    pub fn write_to(&self, writer: &mut impl Write) -> Result<(), PdbError> {
        for record in &self.records {
            writeln!(writer, "{}", record.to_line())?;
        }
        Ok(())
    }

    /// Assigns serials 1..N in record order.
    pub fn renumber(&mut self) {
        for (idx, record) in self.records.iter_mut().enumerate() {
            record.atom.set_serial(idx + 1);
        }
    }

    pub fn atoms(&self) -> impl Iterator<Item = &Atom> {
        self.records.iter().map(|r| &r.atom)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Where the atom name sits inside an atom record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameColumns {
    /// Structural-file convention, columns 13-16.
    Canonical,
    /// Typing-tool convention, columns 14-17.
    TypingTool,
}

impl NameColumns {
    pub fn range(self) -> Range<usize> {
        match self {
            NameColumns::Canonical => 12..16,
            NameColumns::TypingTool => 13..17,
        }
    }
}

/// The identity-bearing prefix of one atom record, with geometry and charge
/// columns stripped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtomInfo {
    pub line_number: usize,
    pub template: String,
}

impl AtomInfo {
    pub fn atom_name(&self, layout: NameColumns) -> &str {
        let range = layout.range();
        slice_and_trim(&self.template, range.start, range.end)
    }

    pub fn residue_name(&self) -> &str {
        slice_and_trim(&self.template, 17, 20)
    }
}

/// Reduces every atom record of a file to its first [`ATOM_INFO_WIDTH`] characters.
pub fn read_atom_info(reader: &mut impl BufRead) -> Result<Vec<AtomInfo>, PdbError> {
    let mut infos = Vec::new();
    for (idx, line_res) in reader.lines().enumerate() {
        let line = line_res?;
        if !is_atom_record(&line) {
            continue;
        }
        let template: String = line.chars().take(ATOM_INFO_WIDTH).collect();
        infos.push(AtomInfo {
            line_number: idx + 1,
            template,
        });
    }
    Ok(infos)
}

pub(crate) fn slice_and_trim(line: &str, start: usize, end: usize) -> &str {
    let end = end.min(line.len());
    line.get(start..end).unwrap_or("").trim()
}

fn parse_error(line: usize, kind: PdbParseErrorKind) -> PdbError {
    PdbError::Parse { line, kind }
}

fn columns(start: usize, end: usize) -> String {
    format!("{}-{}", start + 1, end)
}

fn parse_int<T: std::str::FromStr>(line: &str, line_number: usize, start: usize, end: usize) -> Result<T, PdbError> {
    let value = slice_and_trim(line, start, end);
    value.parse().map_err(|_| {
        parse_error(
            line_number,
            PdbParseErrorKind::InvalidInt {
                columns: columns(start, end),
                value: value.into(),
            },
        )
    })
}

fn parse_float(line: &str, line_number: usize, start: usize, end: usize) -> Result<f64, PdbError> {
    let value = slice_and_trim(line, start, end);
    value.parse().map_err(|_| {
        parse_error(
            line_number,
            PdbParseErrorKind::InvalidFloat {
                columns: columns(start, end),
                value: value.into(),
            },
        )
    })
}

fn parse_optional_float(
    line: &str,
    line_number: usize,
    start: usize,
    end: usize,
) -> Result<Option<f64>, PdbError> {
    if slice_and_trim(line, start, end).is_empty() {
        return Ok(None);
    }
    parse_float(line, line_number, start, end).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
REMARK   1 test ligand
HETATM    1  C1  MOL A   1      -1.234   0.500   2.000  1.00  0.00           C
HETATM    2 CL1  MOL A   1       0.000   1.500  -3.250  0.50 10.00          CL
ATOM      3 HH31 ACE     2       1.000   1.000   1.000                       H
END
ATOM      4  N   XXX     3       0.000   0.000   0.000  1.00  0.00           N
";

    #[test]
    fn read_parses_records_until_end() {
        let file = StructureFile::parse_str(SAMPLE).unwrap();
        assert_eq!(file.len(), 3);

        let first = &file.records[0];
        assert_eq!(first.kind, RecordKind::Hetatm);
        assert_eq!(first.source_serial, 1);
        assert_eq!(first.atom.name, "C1");
        assert_eq!(first.atom.residue_name, "MOL");
        assert_eq!(first.chain_id, "A");
        assert_eq!(first.atom.residue_id, 1);
        assert_eq!(first.atom.position, Point3::new(-1.234, 0.5, 2.0));
        assert_eq!(first.element, "C");
        assert_eq!(first.line_number, 2);
        assert_eq!(first.atom.serial, 0);

        assert_eq!(file.records[1].atom.name, "CL1");
        assert_eq!(file.records[1].element, "CL");
        assert_eq!(file.records[1].occupancy, 0.5);
        assert_eq!(file.records[2].atom.name, "HH31");
    }

    #[test]
    fn missing_occupancy_and_temp_factor_use_defaults() {
        let file = StructureFile::parse_str(SAMPLE).unwrap();
        let record = &file.records[2];
        assert_eq!(record.occupancy, 1.0);
        assert_eq!(record.temp_factor, 0.0);
    }

    #[test]
    fn malformed_coordinate_reports_line_and_columns() {
        let text = "ATOM      1  C1  MOL     1      -1.2x4   0.500   2.000\n";
        let err = StructureFile::parse_str(text).unwrap_err();
        match err {
            PdbError::Parse {
                line,
                kind: PdbParseErrorKind::InvalidFloat { columns, value },
            } => {
                assert_eq!(line, 1);
                assert_eq!(columns, "31-38");
                assert_eq!(value, "-1.2x4");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn short_record_is_rejected() {
        let err = StructureFile::parse_str("ATOM      1  C1  MOL     1\n").unwrap_err();
        assert!(matches!(
            err,
            PdbError::Parse {
                kind: PdbParseErrorKind::LineTooShort,
                ..
            }
        ));
    }

    #[test]
    fn blank_atom_name_is_rejected() {
        let text = "ATOM      1      MOL     1      -1.234   0.500   2.000\n";
        assert!(matches!(
            StructureFile::parse_str(text).unwrap_err(),
            PdbError::Parse {
                kind: PdbParseErrorKind::MissingRequiredField { .. },
                ..
            }
        ));
    }

    #[test]
    fn written_lines_keep_fixed_columns() {
        let mut file = StructureFile::parse_str(SAMPLE).unwrap();
        file.renumber();
        let line = file.records[1].to_line();
        assert_eq!(&line[0..6], "HETATM");
        assert_eq!(&line[6..11], "    2");
        assert_eq!(&line[12..16], " CL1");
        assert_eq!(&line[17..20], "MOL");
        assert_eq!(&line[21..22], "A");
        assert_eq!(&line[22..26], "   1");
        assert_eq!(&line[30..38], "   0.000");
        assert_eq!(&line[38..46], "   1.500");
        assert_eq!(&line[46..54], "  -3.250");
        assert_eq!(&line[54..60], "  0.50");
        assert_eq!(&line[60..66], " 10.00");
        assert_eq!(&line[76..78], "CL");
    }

    #[test]
    fn written_file_reads_back_identically() {
        let mut file = StructureFile::parse_str(SAMPLE).unwrap();
        file.renumber();
        let mut buffer = Vec::new();
        file.write_to(&mut buffer).unwrap();
        let reread = StructureFile::parse_str(std::str::from_utf8(&buffer).unwrap()).unwrap();
        assert_eq!(reread.len(), file.len());
        for (a, b) in file.records.iter().zip(&reread.records) {
            assert_eq!(a.atom.name, b.atom.name);
            assert_eq!(a.atom.residue_name, b.atom.residue_name);
            assert_eq!(a.atom.position, b.atom.position);
            assert_eq!(a.element, b.element);
        }
    }

    #[test]
    fn atom_info_keeps_first_twenty_characters_of_atom_records() {
        let infos = read_atom_info(&mut SAMPLE.as_bytes()).unwrap();
        assert_eq!(infos.len(), 4);
        assert_eq!(infos[0].template, "HETATM    1  C1  MOL");
        assert_eq!(infos[0].atom_name(NameColumns::Canonical), "C1");
        assert_eq!(infos[2].atom_name(NameColumns::Canonical), "HH31");
        assert_eq!(infos[2].residue_name(), "ACE");
    }

    #[test]
    fn typing_tool_layout_reads_shifted_name_column() {
        let ac = "ATOM      1  N1  LDM     1      -1.471   0.310   0.032 -0.155600        n\n\
                  ATOM      2  HH31 ACE    1       0.000   0.000   0.000  0.000000        hc\n";
        let infos = read_atom_info(&mut ac.as_bytes()).unwrap();
        assert_eq!(infos[0].atom_name(NameColumns::TypingTool), "N1");
        assert_eq!(infos[1].atom_name(NameColumns::TypingTool), "HH31");
    }
}
