use automd::engine::config::{ChargeMethod, ResidueKind};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    version,
    about = "automd - prepares nonstandard residues and small molecules for AMBER molecular dynamics.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Rename duplicate atom names and write the canonical structural file.
    Format(FormatArgs),
    /// Cut one residue out of a chain and cap it with ACE/NME fragments.
    Cap(CapArgs),
    /// Normalize a capped or uncapped structure for the quantum-chemistry step.
    QmStructure(QmStructureArgs),
    /// Write charge constraints, or append them to charge-fitting inputs.
    Constraints(ConstraintsArgs),
    /// Write the mainchain descriptor for the template generator.
    Mainchain(MainchainArgs),
    /// Rewrite the typing tool's residue template into canonical atom names.
    Rename(RenameArgs),
    /// Write the canonical structure carrying the template's partial charges.
    Ligand(LigandArgs),
    /// Check, inspect and clean up after the external tools.
    Tools(ToolsArgs),
}

/// Options shared by every command that reads the configuration file.
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigArgs {
    /// Path to a configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Residue name of the N-terminal cap.
    #[arg(long, value_name = "NAME")]
    pub n_cap: Option<String>,

    /// Residue name of the C-terminal cap.
    #[arg(long, value_name = "NAME")]
    pub c_cap: Option<String>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S residue.net-charge=-1
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// Options that build the full preparation configuration.
#[derive(Args, Debug, Clone, Default)]
pub struct PrepArgs {
    #[command(flatten)]
    pub common: ConfigArgs,

    /// Residue name; normalized to three characters.
    #[arg(short, long, value_name = "NAME")]
    pub residue: Option<String>,

    /// Residue kind: `small-molecule` or `nonstandard-amino-acid`.
    #[arg(long, value_name = "KIND")]
    pub kind: Option<ResidueKind>,

    /// Charge method: `resp` or `bcc`.
    #[arg(long, value_name = "METHOD")]
    pub charge_method: Option<ChargeMethod>,

    /// Net molecular charge.
    #[arg(long, value_name = "INT", allow_hyphen_values = true)]
    pub net_charge: Option<i32>,

    /// Reference charge table (CSV or TOML) replacing the ff14SB defaults.
    #[arg(long, value_name = "PATH")]
    pub charge_table: Option<PathBuf>,

    /// Upper bound on the numeric suffix tried when renaming a duplicate atom.
    #[arg(long, value_name = "NUM")]
    pub max_rename_attempts: Option<usize>,
}

#[derive(Args, Debug)]
pub struct FormatArgs {
    /// Structural file with possibly duplicated atom names.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Path for the canonical structural file.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,

    #[command(flatten)]
    pub prep: PrepArgs,
}

#[derive(Args, Debug)]
pub struct CapArgs {
    /// Multi-residue structural file holding the target residue.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Path for the capped fragment.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,

    /// Residue sequence number of the residue to cap.
    #[arg(long, required = true, value_name = "NUM", allow_hyphen_values = true)]
    pub residue_id: isize,

    /// Also write a system-builder script that adds the missing cap hydrogens.
    #[arg(long, value_name = "PATH")]
    pub leap_script: Option<PathBuf>,

    /// Force field sourced by the system-builder script.
    #[arg(long, value_name = "NAME", default_value = "leaprc.protein.ff14SB")]
    pub force_field: String,

    /// Output path the system-builder script saves the hydrogenated fragment to.
    #[arg(long, value_name = "PATH", requires = "leap_script")]
    pub leap_output: Option<PathBuf>,

    #[command(flatten)]
    pub config: ConfigArgs,
}

#[derive(Args, Debug)]
pub struct QmStructureArgs {
    /// Structural file to normalize.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Path for the normalized structural file.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,

    /// Also write a quantum-chemistry input deck for the normalized structure.
    #[arg(long, value_name = "PATH")]
    pub deck: Option<PathBuf>,

    /// Net charge written to the deck.
    #[arg(long, value_name = "INT", default_value_t = 0, allow_hyphen_values = true)]
    pub charge: i32,

    /// Optimize the geometry before the electrostatic-potential step.
    #[arg(long)]
    pub optimize: bool,

    /// Processor count written to the deck. Defaults to the available cores.
    #[arg(long, value_name = "NUM")]
    pub processors: Option<usize>,

    #[command(flatten)]
    pub config: ConfigArgs,
}

#[derive(Args, Debug)]
pub struct ConstraintsArgs {
    /// Canonical structural file whose record order sets the constraint positions.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub structure: PathBuf,

    /// Path for the bare constraint block.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Charge-fitting inputs to truncate and extend with the constraint block.
    #[arg(long = "fitting-input", value_name = "PATH", num_args(1..))]
    pub fitting_inputs: Vec<PathBuf>,

    /// Directory receiving the assembled charge-fitting inputs.
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub output_dir: PathBuf,

    #[command(flatten)]
    pub prep: PrepArgs,
}

#[derive(Args, Debug)]
pub struct MainchainArgs {
    /// Canonical structural file.
    #[arg(long, required = true, value_name = "PATH")]
    pub canonical: PathBuf,

    /// The typing tool's structural file for the same atoms.
    #[arg(long, required = true, value_name = "PATH")]
    pub typed: PathBuf,

    /// Path for the mainchain descriptor.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,

    #[command(flatten)]
    pub config: ConfigArgs,
}

#[derive(Args, Debug)]
pub struct RenameArgs {
    /// Canonical structural file.
    #[arg(long, required = true, value_name = "PATH")]
    pub canonical: PathBuf,

    /// The typing tool's structural file for the same atoms.
    #[arg(long, required = true, value_name = "PATH")]
    pub typed: PathBuf,

    /// Residue template written by the template generator.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub template: PathBuf,

    /// Directory receiving `<RESIDUE>.prepi`.
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub output_dir: PathBuf,

    #[command(flatten)]
    pub prep: PrepArgs,
}

#[derive(Args, Debug)]
pub struct LigandArgs {
    /// Canonical structural file.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub structure: PathBuf,

    /// Residue template carrying the fitted charges.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub template: PathBuf,

    /// Path for the charged structural file.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,
}

#[derive(Args, Debug)]
pub struct ToolsArgs {
    #[command(subcommand)]
    pub command: ToolsCommand,
}

#[derive(Subcommand, Debug)]
pub enum ToolsCommand {
    /// Verify that the AmberTools executables are on PATH.
    Check {
        /// Quantum-chemistry executable to check as well.
        #[arg(long, value_name = "PROGRAM")]
        qm_executable: Option<String>,
    },
    /// Report whether a quantum-chemistry log terminated normally.
    QmStatus {
        /// Quantum-chemistry log file.
        #[arg(value_name = "LOG")]
        log: PathBuf,
    },
    /// Remove scratch files left behind by the external tools.
    Clean {
        /// Directory to clean.
        #[arg(long, value_name = "DIR", default_value = ".")]
        dir: PathBuf,

        /// Also remove `<PREFIX>.*` intermediates.
        #[arg(long, value_name = "PREFIX")]
        prefix: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn format_accepts_residue_overrides_and_set_values() {
        let cli = Cli::parse_from([
            "automd", "format", "-i", "in.pdb", "-o", "out.pdb", "-r", "LIG", "--net-charge",
            "-1", "-S", "naming.max-rename-attempts=5",
        ]);
        let Commands::Format(args) = cli.command else {
            panic!("Expected 'format' subcommand");
        };
        assert_eq!(args.prep.residue.as_deref(), Some("LIG"));
        assert_eq!(args.prep.net_charge, Some(-1));
        assert_eq!(args.prep.common.set_values, vec!["naming.max-rename-attempts=5"]);
    }

    #[test]
    fn kind_and_charge_method_parse_from_their_names() {
        let cli = Cli::parse_from([
            "automd",
            "rename",
            "--canonical",
            "c.pdb",
            "--typed",
            "t.pdb",
            "-t",
            "x.prepi",
            "--kind",
            "nonstandard-amino-acid",
            "--charge-method",
            "resp",
        ]);
        let Commands::Rename(args) = cli.command else {
            panic!("Expected 'rename' subcommand");
        };
        assert_eq!(args.prep.kind, Some(ResidueKind::NonstandardAminoAcid));
        assert_eq!(args.prep.charge_method, Some(ChargeMethod::Resp));
        assert_eq!(args.output_dir, PathBuf::from("."));
    }

    #[test]
    fn cap_accepts_negative_residue_ids() {
        let cli = Cli::parse_from([
            "automd", "cap", "-i", "in.pdb", "-o", "out.pdb", "--residue-id", "-3",
        ]);
        let Commands::Cap(args) = cli.command else {
            panic!("Expected 'cap' subcommand");
        };
        assert_eq!(args.residue_id, -3);
        assert_eq!(args.force_field, "leaprc.protein.ff14SB");
    }

    #[test]
    fn quiet_conflicts_with_verbose() {
        let result = Cli::try_parse_from(["automd", "-q", "-v", "tools", "check"]);
        assert!(result.is_err());
    }

    #[test]
    fn tools_clean_defaults_to_current_directory() {
        let cli = Cli::parse_from(["automd", "tools", "clean", "--prefix", "LIG"]);
        let Commands::Tools(ToolsArgs {
            command: ToolsCommand::Clean { dir, prefix },
        }) = cli.command
        else {
            panic!("Expected 'tools clean' subcommand");
        };
        assert_eq!(dir, PathBuf::from("."));
        assert_eq!(prefix.as_deref(), Some("LIG"));
    }
}
