//! Output trees of the bundled pipelines.
//!
//! Each flow owns one directory below `<build-root>/<design>` and derives
//! every path it hands to a tool from it:
//!
//! ```text
//! build/<design>/
//!   classes/  firrtl/  verilog/<design>.v  metadata/<design>.dtb
//!   bsp/generated/  bsp/install/
//!   sim/<simulator>/<label>/model/
//!   fpga/<board>/synth/  fpga/<board>/flash/
//! ```

use camino::{Utf8Path, Utf8PathBuf};

use crate::plan::Simulator;

/// Directories of the RTL flow.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RtlLayout {
    root: Utf8PathBuf,
    design: String,
}

impl RtlLayout {
    /// Layout for `design` below `build_root`.
    pub fn new(build_root: &Utf8Path, design: &str) -> Self {
        Self {
            root: build_root.join(design),
            design: design.to_owned(),
        }
    }

    /// `<build-root>/<design>`.
    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Compiled generator classes.
    #[must_use]
    pub fn classes_dir(&self) -> Utf8PathBuf {
        self.root.join("classes")
    }

    /// FIRRTL and generator side files.
    #[must_use]
    pub fn firrtl_dir(&self) -> Utf8PathBuf {
        self.root.join("firrtl")
    }

    /// Generated Verilog.
    #[must_use]
    pub fn verilog_dir(&self) -> Utf8PathBuf {
        self.root.join("verilog")
    }

    /// Device tree blobs and other metadata.
    #[must_use]
    pub fn metadata_dir(&self) -> Utf8PathBuf {
        self.root.join("metadata")
    }

    /// The single Verilog file of the design.
    #[must_use]
    pub fn verilog_file(&self) -> Utf8PathBuf {
        self.verilog_dir().join(format!("{}.v", self.design))
    }

    /// The compiled device tree.
    #[must_use]
    pub fn dtb_file(&self) -> Utf8PathBuf {
        self.metadata_dir().join(format!("{}.dtb", self.design))
    }

    /// Board support layout of this design.
    #[must_use]
    pub fn bsp(&self) -> BspLayout {
        BspLayout {
            root: self.root.join("bsp"),
        }
    }

    /// Simulation layout for one simulator and run label.
    #[must_use]
    pub fn sim(&self, simulator: Simulator, label: &str) -> SimLayout {
        SimLayout {
            root: self.root.join("sim").join(simulator.as_str()).join(label),
            simulator,
        }
    }

    /// FPGA layout for one board.
    #[must_use]
    pub fn fpga(&self, board: &str) -> FpgaLayout {
        FpgaLayout {
            root: self.root.join("fpga").join(board),
        }
    }
}

/// Directories of the board-support flow.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BspLayout {
    root: Utf8PathBuf,
}

impl BspLayout {
    /// `<design>/bsp`.
    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Header, linker script and settings written by the generator.
    #[must_use]
    pub fn generated_dir(&self) -> Utf8PathBuf {
        self.root.join("generated")
    }

    /// Install prefix of the metal library.
    #[must_use]
    pub fn install_dir(&self) -> Utf8PathBuf {
        self.root.join("install")
    }
}

/// Directories of one simulation run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SimLayout {
    root: Utf8PathBuf,
    simulator: Simulator,
}

impl SimLayout {
    /// `<design>/sim/<simulator>/<label>`; runs execute here.
    #[must_use]
    pub fn run_dir(&self) -> &Utf8Path {
        &self.root
    }

    /// Compiled model.
    #[must_use]
    pub fn model_dir(&self) -> Utf8PathBuf {
        self.root.join("model")
    }

    /// Waveform dump of the run.
    #[must_use]
    pub fn waves_file(&self) -> Utf8PathBuf {
        self.root.join(self.simulator.waves_file_name())
    }

    /// Coverage database of the run.
    #[must_use]
    pub fn coverage_db(&self) -> Utf8PathBuf {
        self.root.join(self.simulator.coverage_db_name())
    }
}

/// Directories of the FPGA flow for one board.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FpgaLayout {
    root: Utf8PathBuf,
}

impl FpgaLayout {
    /// `<design>/fpga/<board>`.
    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Synthesis outputs.
    #[must_use]
    pub fn synth_dir(&self) -> Utf8PathBuf {
        self.root.join("synth")
    }

    /// Configuration-memory images.
    #[must_use]
    pub fn flash_dir(&self) -> Utf8PathBuf {
        self.root.join("flash")
    }
}
