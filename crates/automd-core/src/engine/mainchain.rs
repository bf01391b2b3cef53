use super::config::CapNames;
use super::error::PrepError;
use crate::core::io::pdb::{AtomInfo, NameColumns};
use std::fmt;

const PRE_HEAD_TYPE: &str = "C";
const POST_TAIL_TYPE: &str = "N";
const NET_CHARGE: f64 = 0.0;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MainchainEntry {
    Head(String),
    Tail(String),
    MainChain(String),
    Omit(String),
}

impl MainchainEntry {
    pub fn keyword(&self) -> &'static str {
        match self {
            MainchainEntry::Head(_) => "HEAD_NAME",
            MainchainEntry::Tail(_) => "TAIL_NAME",
            MainchainEntry::MainChain(_) => "MAIN_CHAIN",
            MainchainEntry::Omit(_) => "OMIT_NAME",
        }
    }

    pub fn atom_name(&self) -> &str {
        match self {
            MainchainEntry::Head(name)
            | MainchainEntry::Tail(name)
            | MainchainEntry::MainChain(name)
            | MainchainEntry::Omit(name) => name,
        }
    }
}

/// Head, tail and omitted atoms handed to the residue-truncation tool, in
/// typing-tool names.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MainchainDescriptor {
    pub entries: Vec<MainchainEntry>,
}

impl MainchainDescriptor {
    /// Walks the canonical records and pairs each with the typing-tool record at
    /// the same position: backbone `N`, `C` and `CA` of the residue become head,
    /// tail and main-chain atoms, every capping atom is omitted.
    pub fn build(
        canonical: &[AtomInfo],
        typed: &[AtomInfo],
        caps: &CapNames,
    ) -> Result<Self, PrepError> {
        if canonical.len() != typed.len() {
            return Err(PrepError::RecordCountMismatch {
                canonical: canonical.len(),
                typed: typed.len(),
            });
        }

        let entries = canonical
            .iter()
            .zip(typed)
            .filter_map(|(canonical_row, typed_row)| {
                let typed_name = typed_row.atom_name(NameColumns::TypingTool).to_string();
                if caps.contains(canonical_row.residue_name()) {
                    return Some(MainchainEntry::Omit(typed_name));
                }
                match canonical_row.atom_name(NameColumns::Canonical) {
                    "N" => Some(MainchainEntry::Head(typed_name)),
                    "C" => Some(MainchainEntry::Tail(typed_name)),
                    "CA" => Some(MainchainEntry::MainChain(typed_name)),
                    _ => None,
                }
            })
            .collect();

        Ok(Self { entries })
    }

    pub fn omitted(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(|e| matches!(e, MainchainEntry::Omit(_)))
            .map(MainchainEntry::atom_name)
    }
}

impl fmt::Display for MainchainDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in &self.entries {
            writeln!(f, "{} {}", entry.keyword(), entry.atom_name())?;
        }
        writeln!(f, "PRE_HEAD_TYPE {}", PRE_HEAD_TYPE)?;
        writeln!(f, "POST_TAIL_TYPE {}", POST_TAIL_TYPE)?;
        writeln!(f, "CHARGE {:.1}", NET_CHARGE)
    }
}
