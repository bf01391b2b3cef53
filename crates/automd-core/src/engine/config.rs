use crate::core::models::residue::{ResidueName, ResidueNameError};
use crate::core::utils::identifiers::{C_CAP_RESIDUE, N_CAP_RESIDUE};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

pub const DEFAULT_MAX_RENAME_ATTEMPTS: usize = 999;

/// Suffix marking a charge-table atom entry that matches by name prefix.
const PREFIX_WILDCARD: char = '*';

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("Invalid residue name: {0}")]
    InvalidResidueName(#[from] ResidueNameError),
    #[error("Charge method '{method}' is not supported for {kind}")]
    Unsupported { kind: ResidueKind, method: ChargeMethod },
    #[error("Invalid value for '{parameter}': {message}")]
    InvalidValue {
        parameter: &'static str,
        message: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResidueKind {
    #[default]
    SmallMolecule,
    NonstandardAminoAcid,
}

impl ResidueKind {
    pub fn is_capped(self) -> bool {
        matches!(self, ResidueKind::NonstandardAminoAcid)
    }
}

impl fmt::Display for ResidueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResidueKind::SmallMolecule => write!(f, "small molecules"),
            ResidueKind::NonstandardAminoAcid => write!(f, "nonstandard amino acids"),
        }
    }
}

impl FromStr for ResidueKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "small-molecule" | "ligand" => Ok(ResidueKind::SmallMolecule),
            "nonstandard-amino-acid" | "amino-acid" => Ok(ResidueKind::NonstandardAminoAcid),
            other => Err(ConfigError::InvalidValue {
                parameter: "residue-kind",
                message: format!("unknown residue kind '{other}'"),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChargeMethod {
    #[default]
    Resp,
    Bcc,
}

impl ChargeMethod {
    /// Flag value understood by the typing tool's `-c` option.
    pub fn as_str(self) -> &'static str {
        match self {
            ChargeMethod::Resp => "resp",
            ChargeMethod::Bcc => "bcc",
        }
    }
}

impl fmt::Display for ChargeMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChargeMethod {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "resp" => Ok(ChargeMethod::Resp),
            "bcc" => Ok(ChargeMethod::Bcc),
            other => Err(ConfigError::InvalidValue {
                parameter: "charge-method",
                message: format!("unknown charge method '{other}'"),
            }),
        }
    }
}

/// Residue names of the N-terminal and C-terminal capping groups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapNames {
    pub n_cap: String,
    pub c_cap: String,
}

impl Default for CapNames {
    fn default() -> Self {
        Self {
            n_cap: N_CAP_RESIDUE.to_string(),
            c_cap: C_CAP_RESIDUE.to_string(),
        }
    }
}

impl CapNames {
    pub fn contains(&self, residue_name: &str) -> bool {
        let residue_name = residue_name.trim();
        residue_name == self.n_cap || residue_name == self.c_cap
    }

    pub fn role_of(&self, residue_name: &str) -> ChargeRole {
        let residue_name = residue_name.trim();
        if residue_name == self.n_cap {
            ChargeRole::NCap
        } else if residue_name == self.c_cap {
            ChargeRole::CCap
        } else {
            ChargeRole::Backbone
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChargeRole {
    NCap,
    CCap,
    Backbone,
}

impl FromStr for ChargeRole {
    type Err = ChargeTableError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "n-cap" => Ok(ChargeRole::NCap),
            "c-cap" => Ok(ChargeRole::CCap),
            "backbone" => Ok(ChargeRole::Backbone),
            other => Err(ChargeTableError::UnknownRole(other.to_string())),
        }
    }
}

/// A reference charge for one atom name, or for every name sharing a prefix
/// when the entry ends with `*`.
#[derive(Debug, Clone, PartialEq)]
pub struct ChargeEntry {
    pub atom: String,
    pub charge: f64,
}

impl ChargeEntry {
    pub fn new(atom: &str, charge: f64) -> Self {
        Self {
            atom: atom.to_string(),
            charge,
        }
    }

    fn prefix(&self) -> Option<&str> {
        self.atom.strip_suffix(PREFIX_WILDCARD)
    }
}

#[derive(Debug, Error)]
pub enum ChargeTableError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("CSV parsing error for '{path}': {source}")]
    Csv { path: String, source: csv::Error },
    #[error("TOML parsing error for '{path}': {source}")]
    Toml {
        path: String,
        source: toml::de::Error,
    },
    #[error("Unknown charge role '{0}' (expected n-cap, c-cap or backbone)")]
    UnknownRole(String),
}

/// Reference partial charges pinned during charge fitting.
#[derive(Debug, Clone, PartialEq)]
pub struct ChargeTables {
    pub n_cap: Vec<ChargeEntry>,
    pub c_cap: Vec<ChargeEntry>,
    pub backbone: Vec<ChargeEntry>,
}

impl Default for ChargeTables {
    /// AMBER ff14SB values.
    fn default() -> Self {
        Self {
            n_cap: vec![
                ChargeEntry::new("HH3*", 0.11230),
                ChargeEntry::new("CH3", -0.36620),
                ChargeEntry::new("C", 0.59720),
                ChargeEntry::new("O", -0.56790),
            ],
            c_cap: vec![
                ChargeEntry::new("N", -0.41570),
                ChargeEntry::new("H", 0.27190),
                ChargeEntry::new("CH3", -0.14900),
                ChargeEntry::new("HH3*", 0.09760),
            ],
            backbone: vec![
                ChargeEntry::new("C", 0.59730),
                ChargeEntry::new("O", -0.56790),
                ChargeEntry::new("N", -0.41570),
                ChargeEntry::new("H", 0.27190),
            ],
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChargeRow {
    role: String,
    atom: String,
    charge: f64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct ChargeTablesFile {
    #[serde(default)]
    n_cap: BTreeMap<String, f64>,
    #[serde(default)]
    c_cap: BTreeMap<String, f64>,
    #[serde(default)]
    backbone: BTreeMap<String, f64>,
}

impl ChargeTables {
    pub fn empty() -> Self {
        Self {
            n_cap: Vec::new(),
            c_cap: Vec::new(),
            backbone: Vec::new(),
        }
    }

    pub fn table(&self, role: ChargeRole) -> &[ChargeEntry] {
        match role {
            ChargeRole::NCap => &self.n_cap,
            ChargeRole::CCap => &self.c_cap,
            ChargeRole::Backbone => &self.backbone,
        }
    }

    fn table_mut(&mut self, role: ChargeRole) -> &mut Vec<ChargeEntry> {
        match role {
            ChargeRole::NCap => &mut self.n_cap,
            ChargeRole::CCap => &mut self.c_cap,
            ChargeRole::Backbone => &mut self.backbone,
        }
    }

    /// Reference charge for `atom_name` in `role`; an exact entry wins over a
    /// prefix entry.
    pub fn lookup(&self, role: ChargeRole, atom_name: &str) -> Option<f64> {
        let table = self.table(role);
        table
            .iter()
            .find(|e| e.prefix().is_none() && e.atom == atom_name)
            .or_else(|| {
                table
                    .iter()
                    .find(|e| e.prefix().is_some_and(|p| atom_name.starts_with(p)))
            })
            .map(|e| e.charge)
    }

    /// Loads tables from a `.csv` (`role,atom,charge`) or `.toml` file, chosen by extension.
    pub fn load(path: &Path) -> Result<Self, ChargeTableError> {
        let is_toml = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
        if is_toml {
            Self::load_toml(path)
        } else {
            Self::load_csv(path)
        }
    }

    pub fn load_csv(path: &Path) -> Result<Self, ChargeTableError> {
        let mut reader = csv::Reader::from_path(path).map_err(|e| ChargeTableError::Csv {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;

        let mut tables = Self::empty();
        for result in reader.deserialize::<ChargeRow>() {
            let row = result.map_err(|e| ChargeTableError::Csv {
                path: path.to_string_lossy().to_string(),
                source: e,
            })?;
            let role: ChargeRole = row.role.parse()?;
            tables
                .table_mut(role)
                .push(ChargeEntry::new(row.atom.trim(), row.charge));
        }
        Ok(tables)
    }

    pub fn load_toml(path: &Path) -> Result<Self, ChargeTableError> {
        let content = std::fs::read_to_string(path).map_err(|e| ChargeTableError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        let file: ChargeTablesFile = toml::from_str(&content).map_err(|e| ChargeTableError::Toml {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        let collect = |table: BTreeMap<String, f64>| {
            table
                .into_iter()
                .map(|(atom, charge)| ChargeEntry { atom, charge })
                .collect()
        };
        Ok(Self {
            n_cap: collect(file.n_cap),
            c_cap: collect(file.c_cap),
            backbone: collect(file.backbone),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PrepConfig {
    pub residue_name: ResidueName,
    pub residue_kind: ResidueKind,
    pub charge_method: ChargeMethod,
    pub net_charge: i32,
    pub caps: CapNames,
    pub max_rename_attempts: usize,
    pub charge_tables: ChargeTables,
}

#[derive(Default)]
pub struct PrepConfigBuilder {
    residue_name: Option<String>,
    residue_kind: Option<ResidueKind>,
    charge_method: Option<ChargeMethod>,
    net_charge: Option<i32>,
    caps: Option<CapNames>,
    max_rename_attempts: Option<usize>,
    charge_tables: Option<ChargeTables>,
}

impl PrepConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn residue_name(mut self, name: &str) -> Self {
        self.residue_name = Some(name.to_string());
        self
    }
    pub fn residue_kind(mut self, kind: ResidueKind) -> Self {
        self.residue_kind = Some(kind);
        self
    }
    pub fn charge_method(mut self, method: ChargeMethod) -> Self {
        self.charge_method = Some(method);
        self
    }
    pub fn net_charge(mut self, charge: i32) -> Self {
        self.net_charge = Some(charge);
        self
    }
    pub fn caps(mut self, caps: CapNames) -> Self {
        self.caps = Some(caps);
        self
    }
    pub fn max_rename_attempts(mut self, attempts: usize) -> Self {
        self.max_rename_attempts = Some(attempts);
        self
    }
    pub fn charge_tables(mut self, tables: ChargeTables) -> Self {
        self.charge_tables = Some(tables);
        self
    }

    pub fn build(self) -> Result<PrepConfig, ConfigError> {
        let raw_name = self
            .residue_name
            .ok_or(ConfigError::MissingParameter("residue_name"))?;
        let residue_name = ResidueName::normalize(&raw_name)?;
        let residue_kind = self.residue_kind.unwrap_or_default();
        let charge_method = self.charge_method.unwrap_or_default();

        if residue_kind == ResidueKind::NonstandardAminoAcid && charge_method == ChargeMethod::Bcc {
            return Err(ConfigError::Unsupported {
                kind: residue_kind,
                method: charge_method,
            });
        }

        let max_rename_attempts = self
            .max_rename_attempts
            .unwrap_or(DEFAULT_MAX_RENAME_ATTEMPTS);
        if max_rename_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                parameter: "max_rename_attempts",
                message: "must be at least 1".to_string(),
            });
        }

        Ok(PrepConfig {
            residue_name,
            residue_kind,
            charge_method,
            net_charge: self.net_charge.unwrap_or(0),
            caps: self.caps.unwrap_or_default(),
            max_rename_attempts,
            charge_tables: self.charge_tables.unwrap_or_default(),
        })
    }
}
