//! Toolchain tags and simulator selection.

use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use super::{Define, Plusarg};

/// Opaque toolchain identifier such as `verilator/4.038`.
///
/// Plans attach resources so the executing environment can provision the
/// pinned tool version; nothing here interprets or validates them.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Resource(String);

impl Resource {
    /// Wrap an identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Resource {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Default pins for the tools the bundled pipelines drive.
pub mod defaults {
    /// Scala compiler used to build generator sources.
    pub const SCALA: &str = "scala/2.12.10";
    /// FIRRTL compiler.
    pub const FIRRTL: &str = "firrtl/1.2.2";
    /// Device tree compiler.
    pub const DTC: &str = "dtc/1.4.7";
    /// RISC-V GNU toolchain used to build the metal library.
    pub const RISCV_TOOLS: &str = "riscv-tools/2019.08.0";
    /// Verilator.
    pub const VERILATOR: &str = "verilator/4.038";
    /// Cadence Xcelium.
    pub const XCELIUM: &str = "xcelium/19.03";
    /// Synopsys VCS.
    pub const VCS: &str = "vcs/2019.06";
    /// Xilinx Vivado.
    pub const VIVADO: &str = "vivado/2019.1";
}

/// Supported simulators.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Simulator {
    /// Verilator C++ model plus the fixed C++ driver.
    Verilator,
    /// Cadence Xcelium.
    Xcelium,
    /// Synopsys VCS.
    Vcs,
}

impl Simulator {
    /// Short name used in directory names.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Verilator => "verilator",
            Self::Xcelium => "xcelium",
            Self::Vcs => "vcs",
        }
    }

    /// Target kind of the compile step.
    #[must_use]
    pub const fn compile_kind(self) -> &'static str {
        match self {
            Self::Verilator => "verilator",
            Self::Xcelium => "xcelium-compile",
            Self::Vcs => "vcs-compile",
        }
    }

    /// Toolchain pinned by default.
    #[must_use]
    pub fn default_resource(self) -> Resource {
        Resource::new(match self {
            Self::Verilator => defaults::VERILATOR,
            Self::Xcelium => defaults::XCELIUM,
            Self::Vcs => defaults::VCS,
        })
    }

    /// Render a define in this simulator's command-line syntax.
    #[must_use]
    pub fn define_words(self, define: &Define) -> Vec<String> {
        match self {
            Self::Verilator => vec![format!("-D{define}")],
            Self::Xcelium => vec!["-define".to_owned(), define.to_string()],
            Self::Vcs => vec![format!("+define+{define}")],
        }
    }

    /// Render an include directory in this simulator's syntax.
    #[must_use]
    pub fn include_words(self, dir: &str) -> Vec<String> {
        match self {
            Self::Verilator => vec![format!("-I{dir}")],
            Self::Xcelium => vec!["-incdir".to_owned(), dir.to_owned()],
            Self::Vcs => vec![format!("+incdir+{dir}")],
        }
    }

    /// Compile arguments that enable waveform capture.
    #[must_use]
    pub fn waves_compile_args(self) -> Vec<String> {
        let args: &[&str] = match self {
            Self::Verilator => &["--trace"],
            Self::Xcelium => &["-access", "+rwc"],
            Self::Vcs => &["-debug_access+all"],
        };
        args.iter().map(|arg| (*arg).to_owned()).collect()
    }

    /// The plusarg naming the waveform dump file.
    #[must_use]
    pub fn waves_plusarg(self, file: &str) -> Plusarg {
        match self {
            Self::Verilator | Self::Xcelium => Plusarg::with_value("vcdfile", file),
            Self::Vcs => Plusarg::with_value("vcdplusfile", file),
        }
    }

    /// Waveform file name written into the run directory.
    #[must_use]
    pub const fn waves_file_name(self) -> &'static str {
        match self {
            Self::Verilator | Self::Xcelium => "sim.vcd",
            Self::Vcs => "sim.vpd",
        }
    }

    /// Compile arguments that enable coverage collection.
    #[must_use]
    pub fn coverage_compile_args(self) -> Vec<String> {
        let args: &[&str] = match self {
            Self::Verilator => &["--coverage"],
            Self::Xcelium => &["-coverage", "all"],
            Self::Vcs => &["-cm", "line+cond+fsm+tgl"],
        };
        args.iter().map(|arg| (*arg).to_owned()).collect()
    }

    /// Coverage database name written into the run directory.
    #[must_use]
    pub const fn coverage_db_name(self) -> &'static str {
        match self {
            Self::Verilator => "coverage.dat",
            Self::Xcelium => "cov_work",
            Self::Vcs => "simv.vdb",
        }
    }

    /// Run arguments that point a coverage-enabled run at `db`.
    #[must_use]
    pub fn coverage_run_args(self, db: &str) -> Vec<String> {
        match self {
            Self::Verilator => Vec::new(),
            Self::Xcelium => vec!["-covworkdir".to_owned(), db.to_owned()],
            Self::Vcs => vec![
                "-cm".to_owned(),
                "line+cond+fsm+tgl".to_owned(),
                "-cm_dir".to_owned(),
                db.to_owned(),
            ],
        }
    }
}

impl fmt::Display for Simulator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
