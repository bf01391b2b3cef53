use super::config::CapNames;
use super::error::PrepError;
use crate::core::io::pdb::{AtomInfo, NameColumns};
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use tracing::debug;

/// Translation table from typing-tool atom names to canonical atom names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentityMap {
    names: HashMap<String, String>,
}

impl IdentityMap {
    /// Pairs the atom records of both files by position.
    ///
    /// Both files must enumerate the same atoms in the same order; rows of
    /// capping residues are skipped since their names are fixed by convention.
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

        let mut names = HashMap::with_capacity(canonical.len());
        for (canonical_row, typed_row) in canonical.iter().zip(typed) {
            if caps.contains(canonical_row.residue_name()) {
                continue;
            }
            let canonical_name = canonical_row.atom_name(NameColumns::Canonical);
            let typed_name = typed_row.atom_name(NameColumns::TypingTool);

            match names.entry(typed_name.to_string()) {
                Entry::Vacant(slot) => {
                    slot.insert(canonical_name.to_string());
                }
                Entry::Occupied(slot) if slot.get() != canonical_name => {
                    return Err(PrepError::AmbiguousIdentity {
                        typed: typed_name.to_string(),
                        first: slot.get().clone(),
                        second: canonical_name.to_string(),
                    });
                }
                Entry::Occupied(_) => {}
            }
        }

        debug!(entries = names.len(), "Built identity map");
        Ok(Self { names })
    }

    pub fn get(&self, typed_name: &str) -> Option<&str> {
        self.names.get(typed_name).map(String::as_str)
    }

    /// Strict lookup; `line_number` and `line` locate the reference in the template.
    pub fn translate(
        &self,
        typed_name: &str,
        line_number: usize,
        line: &str,
    ) -> Result<&str, PrepError> {
        self.get(typed_name).ok_or_else(|| PrepError::MissingIdentity {
            name: typed_name.to_string(),
            line_number,
            line: line.trim_end().to_string(),
        })
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.names.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for IdentityMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            names: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
