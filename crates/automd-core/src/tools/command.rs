use super::error::ToolError;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info};

pub const ANTECHAMBER: &str = "antechamber";
pub const PARMCHK2: &str = "parmchk2";
pub const PREPGEN: &str = "prepgen";
pub const RESP: &str = "resp";
pub const TLEAP: &str = "tleap";

/// One external program call: the program, its arguments and the files it
/// must leave behind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolInvocation {
    pub program: String,
    pub args: Vec<String>,
    pub artifacts: Vec<PathBuf>,
}

impl ToolInvocation {
    pub fn new(program: &str) -> Self {
        Self {
            program: program.to_string(),
            args: Vec::new(),
            artifacts: Vec::new(),
        }
    }

    pub fn arg(mut self, value: impl Into<String>) -> Self {
        self.args.push(value.into());
        self
    }

    pub fn flag(mut self, flag: &str, value: impl Into<String>) -> Self {
        self.args.push(flag.to_string());
        self.args.push(value.into());
        self
    }

    pub fn optional_flag(self, flag: &str, value: Option<impl Into<String>>) -> Self {
        match value {
            Some(value) => self.flag(flag, value),
            None => self,
        }
    }

    pub fn expects(mut self, path: impl Into<PathBuf>) -> Self {
        self.artifacts.push(path.into());
        self
    }

    /// Shell-style rendering for logs.
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Runs the program to completion in `workdir`.
    ///
    /// A nonzero exit status or a missing artifact (resolved against `workdir`)
    /// is an error; nothing is retried.
    pub fn run(&self, workdir: &Path) -> Result<ToolOutput, ToolError> {
        info!(command = %self.command_line(), "Running external tool");
        let output = Command::new(&self.program)
            .args(&self.args)
            .current_dir(workdir)
            .output()
            .map_err(|e| ToolError::Spawn {
                program: self.program.clone(),
                source: e,
            })?;

        if !output.status.success() {
            return Err(ToolError::NonZeroExit {
                program: self.program.clone(),
                status: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        for artifact in &self.artifacts {
            let path = workdir.join(artifact);
            if !path.exists() {
                return Err(ToolError::MissingArtifact {
                    program: self.program.clone(),
                    path,
                });
            }
        }

        debug!(program = %self.program, "External tool finished");
        Ok(ToolOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Arguments of the atom-typing and charge tool.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AntechamberArgs {
    pub input_format: String,
    pub output_format: String,
    pub input: String,
    pub output: String,
    pub charge_method: String,
    pub net_charge: Option<i32>,
    pub residue_name: Option<String>,
    pub residue_file: Option<String>,
    pub atom_types: Option<String>,
    pub charge_file: Option<String>,
}

pub fn antechamber(args: &AntechamberArgs) -> ToolInvocation {
    ToolInvocation::new(ANTECHAMBER)
        .flag("-fi", &args.input_format)
        .flag("-fo", &args.output_format)
        .flag("-i", &args.input)
        .flag("-o", &args.output)
        .flag("-c", &args.charge_method)
        .optional_flag("-nc", args.net_charge.map(|c| c.to_string()))
        .optional_flag("-rn", args.residue_name.as_deref())
        .optional_flag("-rf", args.residue_file.as_deref())
        .optional_flag("-at", args.atom_types.as_deref())
        .optional_flag("-cf", args.charge_file.as_deref())
        .expects(&args.output)
}

/// Parameter gap filling for a residue template.
pub fn parmchk2(input: &str, format: &str, output: &str) -> ToolInvocation {
    ToolInvocation::new(PARMCHK2)
        .flag("-i", input)
        .flag("-f", format)
        .flag("-o", output)
        .expects(output)
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrepgenArgs {
    pub input: String,
    pub output: String,
    pub format: String,
    pub mainchain: String,
    pub residue_name: String,
    pub residue_file: String,
}

pub fn prepgen(args: &PrepgenArgs) -> ToolInvocation {
    ToolInvocation::new(PREPGEN)
        .flag("-i", &args.input)
        .flag("-o", &args.output)
        .flag("-f", &args.format)
        .flag("-m", &args.mainchain)
        .flag("-rn", &args.residue_name)
        .flag("-rf", &args.residue_file)
        .expects(&args.output)
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RespArgs {
    pub input: String,
    pub output: String,
    pub esp: String,
    pub charges_out: String,
    pub charges_in: Option<String>,
}

pub fn resp(args: &RespArgs) -> ToolInvocation {
    ToolInvocation::new(RESP)
        .arg("-O")
        .flag("-i", &args.input)
        .flag("-o", &args.output)
        .flag("-e", &args.esp)
        .flag("-t", &args.charges_out)
        .optional_flag("-q", args.charges_in.as_deref())
        .expects(&args.charges_out)
}

pub fn tleap(script: &str) -> ToolInvocation {
    ToolInvocation::new(TLEAP).flag("-f", script)
}

/// The quantum-chemistry executable reads its input deck as the sole argument
/// and writes `<stem>.log` next to it.
pub fn quantum_chemistry(executable: &str, input: &str) -> ToolInvocation {
    let log = Path::new(input).with_extension("log");
    ToolInvocation::new(executable).arg(input).expects(log)
}

/// Resolves `program` against `PATH`, returning the first executable match.
pub fn find_in_path(program: &str) -> Option<PathBuf> {
    which::which(program).ok()
}

pub fn is_available(program: &str) -> bool {
    find_in_path(program).is_some()
}

/// Fails with [`ToolError::NotFound`] for the first program missing from `PATH`.
pub fn ensure_available<'a>(programs: impl IntoIterator<Item = &'a str>) -> Result<(), ToolError> {
    for program in programs {
        match find_in_path(program) {
            Some(path) => debug!(program, path = %path.display(), "Found executable"),
            None => {
                return Err(ToolError::NotFound {
                    program: program.to_string(),
                });
            }
        }
    }
    Ok(())
}
