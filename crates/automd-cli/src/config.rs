use crate::cli::{ConfigArgs, PrepArgs};
use crate::error::{CliError, Result};
use automd::engine::config::{
    CapNames, ChargeMethod, ChargeTables, PrepConfig, PrepConfigBuilder, ResidueKind,
};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
struct PartialResidueConfig {
    name: Option<String>,
    kind: Option<ResidueKind>,
    #[serde(rename = "charge-method")]
    charge_method: Option<ChargeMethod>,
    #[serde(rename = "net-charge")]
    net_charge: Option<i32>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
struct PartialCapsConfig {
    #[serde(rename = "n-cap")]
    n_cap: Option<String>,
    #[serde(rename = "c-cap")]
    c_cap: Option<String>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
struct PartialChargesConfig {
    table: Option<PathBuf>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
struct PartialNamingConfig {
    #[serde(rename = "max-rename-attempts")]
    max_rename_attempts: Option<usize>,
}

/// The configuration file as written, before CLI overrides and defaults.
#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct PartialPrepConfig {
    residue: Option<PartialResidueConfig>,
    caps: Option<PartialCapsConfig>,
    charges: Option<PartialChargesConfig>,
    naming: Option<PartialNamingConfig>,
}

impl PartialPrepConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    /// Reads the file named by `--config`, or starts empty without one.
    pub fn load(args: &ConfigArgs) -> Result<Self> {
        match &args.config {
            Some(path) => {
                debug!("Loading configuration from {:?}", path);
                Self::from_file(path)
            }
            None => Ok(Self::default()),
        }
    }

    pub fn resolve_caps(mut self, args: &ConfigArgs) -> Result<CapNames> {
        self.apply_set_values(&args.set_values)?;
        self.merge_caps(args)
    }

    pub fn merge_with_cli(mut self, args: &PrepArgs) -> Result<PrepConfig> {
        self.apply_set_values(&args.common.set_values)?;
        let caps = self.merge_caps(&args.common)?;

        let residue = self.residue.unwrap_or_default();
        let naming = self.naming.unwrap_or_default();
        let charges = self.charges.unwrap_or_default();

        let residue_name = args
            .residue
            .clone()
            .or(residue.name)
            .ok_or_else(|| CliError::Config("`residue.name` is required.".to_string()))?;

        let mut builder = PrepConfigBuilder::new()
            .residue_name(&residue_name)
            .residue_kind(args.kind.or(residue.kind).unwrap_or_default())
            .charge_method(args.charge_method.or(residue.charge_method).unwrap_or_default())
            .net_charge(args.net_charge.or(residue.net_charge).unwrap_or(0))
            .caps(caps);

        if let Some(attempts) = args.max_rename_attempts.or(naming.max_rename_attempts) {
            builder = builder.max_rename_attempts(attempts);
        }

        if let Some(table) = args.charge_table.as_ref().or(charges.table.as_ref()) {
            debug!("Loading reference charge table from {:?}", table);
            builder = builder.charge_tables(ChargeTables::load(table)?);
        }

        builder.build().map_err(|e| CliError::Config(e.to_string()))
    }

    fn merge_caps(&self, args: &ConfigArgs) -> Result<CapNames> {
        let file_caps = self.caps.clone().unwrap_or_default();
        let defaults = CapNames::default();
        let n_cap = args.n_cap.clone().or(file_caps.n_cap).unwrap_or(defaults.n_cap);
        let c_cap = args.c_cap.clone().or(file_caps.c_cap).unwrap_or(defaults.c_cap);

        let (n_cap, c_cap) = (n_cap.trim().to_string(), c_cap.trim().to_string());
        if n_cap.is_empty() || c_cap.is_empty() {
            return Err(CliError::Config("Cap residue names must not be empty.".to_string()));
        }
        if n_cap == c_cap {
            return Err(CliError::Config(format!(
                "N-terminal and C-terminal caps must differ, both are '{}'.",
                n_cap
            )));
        }
        Ok(CapNames { n_cap, c_cap })
    }

    fn apply_set_values(&mut self, set_values: &[String]) -> Result<()> {
        for kv_pair in set_values {
            let Some((key, value_str)) = kv_pair.split_once('=') else {
                return Err(CliError::Config(format!(
                    "Invalid --set format: '{}'. Expected KEY=VALUE.",
                    kv_pair
                )));
            };

            match key {
                "residue.name" => {
                    self.residue.get_or_insert_with(Default::default).name =
                        Some(value_str.to_string());
                }
                "residue.kind" => {
                    self.residue.get_or_insert_with(Default::default).kind =
                        Some(parse_value(key, value_str)?);
                }
                "residue.charge-method" => {
                    self.residue.get_or_insert_with(Default::default).charge_method =
                        Some(parse_value(key, value_str)?);
                }
                "residue.net-charge" => {
                    self.residue.get_or_insert_with(Default::default).net_charge =
                        Some(parse_value(key, value_str)?);
                }
                "caps.n-cap" => {
                    self.caps.get_or_insert_with(Default::default).n_cap =
                        Some(value_str.to_string());
                }
                "caps.c-cap" => {
                    self.caps.get_or_insert_with(Default::default).c_cap =
                        Some(value_str.to_string());
                }
                "charges.table" => {
                    self.charges.get_or_insert_with(Default::default).table =
                        Some(PathBuf::from(value_str));
                }
                "naming.max-rename-attempts" => {
                    self.naming.get_or_insert_with(Default::default).max_rename_attempts =
                        Some(parse_value(key, value_str)?);
                }
                _ => {
                    return Err(CliError::Config(format!(
                        "Unsupported configuration key for --set: '{}'",
                        key
                    )));
                }
            }
        }
        Ok(())
    }
}

fn parse_value<T>(key: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| CliError::Config(format!("Invalid value for {}: {} ({})", key, value, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use automd::engine::config::{ChargeRole, DEFAULT_MAX_RENAME_ATTEMPTS};
    use clap::Parser;
    use std::fs;
    use tempfile::{TempDir, tempdir};

    fn write_config_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let file_path = dir.path().join(name);
        fs::write(&file_path, content).unwrap();
        file_path
    }

    fn format_args(extra: &[&str]) -> PrepArgs {
        let mut args = vec!["automd", "format", "-i", "in.pdb", "-o", "out.pdb"];
        args.extend_from_slice(extra);
        match Cli::parse_from(args).command {
            Commands::Format(format) => format.prep,
            _ => panic!("Expected 'format' subcommand"),
        }
    }

    fn merge(args: &PrepArgs) -> Result<PrepConfig> {
        PartialPrepConfig::load(&args.common)?.merge_with_cli(args)
    }

    #[test]
    fn load_from_file_and_merge_with_defaults() {
        let dir = tempdir().unwrap();
        let config_path = write_config_file(
            &dir,
            "automd.toml",
            r#"
            [residue]
            name = "LDM"
            kind = "nonstandard-amino-acid"
            "#,
        );
        let args = format_args(&["-c", config_path.to_str().unwrap()]);

        let config = merge(&args).unwrap();

        assert_eq!(config.residue_name.as_str(), "LDM");
        assert_eq!(config.residue_kind, ResidueKind::NonstandardAminoAcid);
        assert_eq!(config.charge_method, ChargeMethod::Resp);
        assert_eq!(config.net_charge, 0);
        assert_eq!(config.caps, CapNames::default());
        assert_eq!(config.max_rename_attempts, DEFAULT_MAX_RENAME_ATTEMPTS);
        assert_eq!(config.charge_tables, ChargeTables::default());
    }

    #[test]
    fn cli_args_override_file_values() {
        let dir = tempdir().unwrap();
        let config_path = write_config_file(
            &dir,
            "automd.toml",
            r#"
            [residue]
            name = "LDM"
            net-charge = 2

            [caps]
            n-cap = "ACX"

            [naming]
            max-rename-attempts = 50
            "#,
        );
        let args = format_args(&[
            "-c",
            config_path.to_str().unwrap(),
            "-r",
            "LIG",
            "--net-charge",
            "-1",
            "--n-cap",
            "ACE",
            "--max-rename-attempts",
            "7",
        ]);

        let config = merge(&args).unwrap();

        assert_eq!(config.residue_name.as_str(), "LIG");
        assert_eq!(config.net_charge, -1);
        assert_eq!(config.caps.n_cap, "ACE");
        assert_eq!(config.max_rename_attempts, 7);
    }

    #[test]
    fn set_values_override_file_values() {
        let dir = tempdir().unwrap();
        let config_path = write_config_file(
            &dir,
            "automd.toml",
            "[residue]\nname = \"LDM\"\ncharge-method = \"resp\"\n",
        );
        let args = format_args(&[
            "-c",
            config_path.to_str().unwrap(),
            "-S",
            "residue.charge-method=bcc",
            "caps.c-cap=NHE",
        ]);

        let config = merge(&args).unwrap();

        assert_eq!(config.charge_method, ChargeMethod::Bcc);
        assert_eq!(config.caps.c_cap, "NHE");
    }

    #[test]
    fn residue_name_is_required() {
        let args = format_args(&[]);
        let result = merge(&args);
        assert!(matches!(result, Err(CliError::Config(msg)) if msg.contains("residue.name")));
    }

    #[test]
    fn unknown_config_keys_are_rejected() {
        let dir = tempdir().unwrap();
        let config_path = write_config_file(
            &dir,
            "automd.toml",
            "[residue]\nname = \"LDM\"\ncolour = \"blue\"\n",
        );
        let result = PartialPrepConfig::from_file(&config_path);
        assert!(matches!(result, Err(CliError::FileParsing { .. })));
    }

    #[test]
    fn missing_config_file_reports_its_path() {
        let result = PartialPrepConfig::from_file(Path::new("/nonexistent/automd.toml"));
        match result {
            Err(CliError::FileParsing { path, .. }) => {
                assert_eq!(path, PathBuf::from("/nonexistent/automd.toml"))
            }
            other => panic!("Expected FileParsing error, got {:?}", other),
        }
    }

    #[test]
    fn unsupported_set_key_is_rejected() {
        let args = format_args(&["-r", "LIG", "-S", "residue.colour=blue"]);
        let result = merge(&args);
        assert!(matches!(result, Err(CliError::Config(msg)) if msg.contains("residue.colour")));
    }

    #[test]
    fn malformed_set_value_is_rejected() {
        let args = format_args(&["-r", "LIG", "-S", "residue.net-charge"]);
        let result = merge(&args);
        assert!(matches!(result, Err(CliError::Config(msg)) if msg.contains("KEY=VALUE")));
    }

    #[test]
    fn non_numeric_net_charge_is_rejected() {
        let args = format_args(&["-r", "LIG", "-S", "residue.net-charge=minus-one"]);
        assert!(matches!(merge(&args), Err(CliError::Config(_))));
    }

    #[test]
    fn amino_acid_with_bcc_fails_before_any_file_io() {
        let args = format_args(&[
            "-r",
            "LDM",
            "--kind",
            "nonstandard-amino-acid",
            "--charge-method",
            "bcc",
        ]);
        let result = merge(&args);
        assert!(matches!(result, Err(CliError::Config(msg)) if msg.contains("not supported")));
    }

    #[test]
    fn charge_table_path_from_file_is_loaded() {
        let dir = tempdir().unwrap();
        let table = dir.path().join("charges.csv");
        fs::write(&table, "role,atom,charge\nbackbone,C,0.5\n").unwrap();
        let config_path = write_config_file(
            &dir,
            "automd.toml",
            &format!(
                "[residue]\nname = \"LDM\"\n\n[charges]\ntable = \"{}\"\n",
                table.display()
            ),
        );
        let args = format_args(&["-c", config_path.to_str().unwrap()]);

        let config = merge(&args).unwrap();

        assert_eq!(config.charge_tables.lookup(ChargeRole::Backbone, "C"), Some(0.5));
        assert_eq!(config.charge_tables.lookup(ChargeRole::Backbone, "O"), None);
    }

    #[test]
    fn identical_cap_names_are_rejected() {
        let caps = PartialPrepConfig::default().resolve_caps(&ConfigArgs {
            n_cap: Some("ACE".to_string()),
            c_cap: Some("ACE".to_string()),
            ..Default::default()
        });
        assert!(matches!(caps, Err(CliError::Config(_))));
    }

    #[test]
    fn caps_default_to_ace_and_nme() {
        let caps = PartialPrepConfig::default()
            .resolve_caps(&ConfigArgs::default())
            .unwrap();
        assert_eq!(caps, CapNames::default());
    }
}
