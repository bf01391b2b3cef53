use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ResidueNameError {
    #[error("Residue name must not be empty")]
    Empty,
    #[error("Residue name '{0}' contains whitespace")]
    Whitespace(String),
}

/// A residue name normalized to exactly three characters.
///
/// The residue template format and the system builder key residues by a
/// three-character name: one-character names gain an `LG` prefix, two-character
/// names an `L` prefix, and longer names keep their first three characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResidueName(String);

impl ResidueName {
    pub fn normalize(raw: &str) -> Result<Self, ResidueNameError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(ResidueNameError::Empty);
        }
        if raw.chars().any(char::is_whitespace) {
            return Err(ResidueNameError::Whitespace(raw.to_string()));
        }
        let normalized = match raw.chars().count() {
            1 => format!("LG{}", raw),
            2 => format!("L{}", raw),
            _ => raw.chars().take(3).collect(),
        };
        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for ResidueName {
    type Err = ResidueNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::normalize(s)
    }
}

impl fmt::Display for ResidueName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ResidueName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_character_names_get_lg_prefix() {
        assert_eq!(ResidueName::normalize("A").unwrap().as_str(), "LGA");
    }

    #[test]
    fn two_character_names_get_l_prefix() {
        assert_eq!(ResidueName::normalize("AB").unwrap().as_str(), "LAB");
    }

    #[test]
    fn three_character_names_are_kept() {
        assert_eq!(ResidueName::normalize("MOL").unwrap().as_str(), "MOL");
    }

    #[test]
    fn long_names_are_truncated_to_three_characters() {
        assert_eq!(ResidueName::normalize("LIGAND").unwrap().as_str(), "LIG");
        assert_eq!(ResidueName::normalize("ABCD").unwrap().as_str(), "ABC");
    }

    #[test]
    fn surrounding_whitespace_is_ignored() {
        assert_eq!(ResidueName::normalize("  AB ").unwrap().as_str(), "LAB");
    }

    #[test]
    fn empty_and_inner_whitespace_names_are_rejected() {
        assert_eq!(ResidueName::normalize("   "), Err(ResidueNameError::Empty));
        assert!(matches!(
            ResidueName::normalize("A B"),
            Err(ResidueNameError::Whitespace(_))
        ));
    }

    #[test]
    fn from_str_normalizes() {
        let name: ResidueName = "X".parse().unwrap();
        assert_eq!(name.to_string(), "LGX");
    }
}
