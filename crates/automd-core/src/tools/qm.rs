use super::error::ToolError;
use crate::core::io::pdb::StructureFile;
use std::path::{Path, PathBuf};

const NORMAL_TERMINATION: &str = " Normal termination";
const DEFAULT_MEMORY: &str = "2Gb";
const ESP_ROUTE: &str =
    "# HF/gen SCF=tight Pop=(MK,ReadRadii) iop(6/33=2,6/41=10,6/42=17,6/50=1) Geom=AllCheck";

/// 6-31G* for the common organic elements, an all-electron basis for iodine and
/// the iodine ESP radius.
const MIXED_BASIS: &str = "\
-C -H -O -N -P -S -F -Cl -Br 0
6-31G*
****
-I     0
S   5   1.00
 444750.0                    0.00089
  66127.00                   0.00694
  14815.00                   0.03609
   4144.900                  0.13568
   1361.200                  0.33878
S   2   1.00
    508.4400                 0.43659
    209.5900                 0.18375
S   1   1.00
     81.959                  1.00000
S   1   1.00
     36.805                  1.00000
S   1   1.00
     13.495                  1.00000
S   1   1.00
      6.8859                 1.00000
S   1   1.00
      2.5520                 1.00000
S   1   1.00
      1.2088                 1.00000
S   1   1.00
      0.2734                 1.00000
S   1   1.00
      0.1009                 1.00000
P   4   1.00
   2953.600                  0.01221
    712.6100                 0.08587
    236.7100                 0.29493
     92.63100                0.47849
P   1   1.00
     39.73200                1.00000
P   1   1.00
     17.27300                1.000000
P   1   1.00
      7.957000               1.000000
P   1   1.00
      3.152900               1.000000
P   1   1.00
      1.332800               1.000000
P   1   1.00
      0.494700               1.000000
P   1   1.00
      0.216000               1.000000
P   1   1.00
      0.082930               1.000000
D   3   1.00
    261.9500                 0.03144
     76.73400                0.19028
     27.55100                0.47247
D   1   1.00
     10.60600                1.000000
D   1   1.00
      3.421700               1.000000
D   1   1.00
      1.137000               1.000000
D   1   1.00
      0.302000               1.000000
****

I 1.98

";

/// Cartesian block of a quantum-chemistry input: element symbol and three
/// coordinates per atom, closed by a blank line.
pub fn xyz_block(structure: &StructureFile) -> String {
    let mut block = String::new();
    for atom in structure.atoms() {
        block.push_str(&format!(
            " {:<2} {:>10.5}{:>10.5}{:>10.5}\n",
            atom.element_class(),
            atom.position.x,
            atom.position.y,
            atom.position.z
        ));
    }
    block.push('\n');
    block
}

/// Two-step input: semi-empirical single point or optimization, then an
/// HF/6-31G* electrostatic-potential calculation reading the same checkpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct GaussianDeck {
    pub processors: usize,
    pub memory: String,
    pub checkpoint: PathBuf,
    pub charge: i32,
    pub multiplicity: u32,
    pub optimize: bool,
    pub title: String,
}

impl GaussianDeck {
    pub fn new(checkpoint: impl Into<PathBuf>, charge: i32) -> Self {
        Self {
            processors: std::thread::available_parallelism().map_or(1, |n| n.get()),
            memory: DEFAULT_MEMORY.to_string(),
            checkpoint: checkpoint.into(),
            charge,
            multiplicity: 1,
            optimize: false,
            title: "test".to_string(),
        }
    }

    pub fn with_optimization(mut self, optimize: bool) -> Self {
        self.optimize = optimize;
        self
    }

    pub fn with_processors(mut self, processors: usize) -> Self {
        self.processors = processors.max(1);
        self
    }

    pub fn render(&self, xyz: &str) -> String {
        let mut deck = String::new();
        let job = if self.optimize { "opt" } else { "sp" };
        self.push_link0(&mut deck);
        deck.push_str(&format!("# PM3MM {}\n\n", job));
        deck.push_str(&format!("{}\n\n", self.title));
        deck.push_str(&format!("{} {}\n", self.charge, self.multiplicity));
        deck.push_str(xyz);
        deck.push_str("--link1--\n");
        self.push_link0(&mut deck);
        deck.push_str(&format!("{}\n\n", ESP_ROUTE));
        deck.push_str(MIXED_BASIS);
        deck
    }

    fn push_link0(&self, deck: &mut String) {
        deck.push_str(&format!("%nproc={}\n", self.processors));
        deck.push_str(&format!("%mem={}\n", self.memory));
        deck.push_str(&format!("%chk={}\n", self.checkpoint.display()));
    }
}

pub fn has_normal_termination(log: &str) -> bool {
    log.lines()
        .last()
        .is_some_and(|line| line.starts_with(NORMAL_TERMINATION))
}

/// Reads a quantum-chemistry log and fails unless it terminated normally.
pub fn check_log(path: &Path) -> Result<(), ToolError> {
    let log = std::fs::read_to_string(path).map_err(|e| ToolError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    if has_normal_termination(&log) {
        Ok(())
    } else {
        Err(ToolError::AbnormalTermination {
            log: path.to_path_buf(),
        })
    }
}

/// System-builder script that loads a capped fragment and saves it with the
/// missing cap hydrogens added.
pub fn capping_leap_script(force_field: &str, input: &Path, output: &Path) -> String {
    format!(
        "source {}\nx = loadpdb {}\nsavepdb x {}\nquit\n",
        force_field,
        input.display(),
        output.display()
    )
}
