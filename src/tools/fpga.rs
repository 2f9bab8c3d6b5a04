//! Vivado synthesis and flash image generation.

use camino::Utf8PathBuf;

use super::ParamSet;
use crate::plan::Resource;
use crate::target::{Params, ToolTarget};
use crate::value::Value;

const VIVADO: [&str; 5] = ["vivado", "-mode", "batch", "-nojournal", "-nolog"];

/// Synthesise, place and route a design into a bitstream.
#[derive(Clone, Debug)]
pub struct VivadoSynth {
    pub(crate) script: Utf8PathBuf,
    pub(crate) design: String,
    pub(crate) top_module: String,
    pub(crate) part: String,
    pub(crate) sources: Vec<Value>,
    pub(crate) constraints: Vec<Value>,
    pub(crate) output_dir: Utf8PathBuf,
    pub(crate) resources: Vec<Resource>,
}

impl VivadoSynth {
    fn file(&self, extension: &str) -> Utf8PathBuf {
        self.output_dir.join(format!("{}.{extension}", self.design))
    }
}

impl ToolTarget for VivadoSynth {
    const KIND: &'static str = "vivado-synth";

    fn output_dir(&self) -> Option<Utf8PathBuf> {
        Some(self.output_dir.clone())
    }

    fn params(&self) -> Params {
        ParamSet::new()
            .resources(&self.resources)
            .args(VIVADO)
            .args(["-source", self.script.as_str(), "-tclargs"])
            .args(["-top", self.top_module.as_str(), "-part", self.part.as_str()])
            .args(["-out", self.output_dir.as_str(), "-sources"])
            .args(self.sources.iter().cloned())
            .arg("-constraints")
            .args(self.constraints.iter().cloned())
            .output("bitstream", self.file("bit"))
            .output("checkpoint", self.file("dcp"))
            .output("utilization", self.file("utilization.rpt"))
            .output("timing", self.file("timing.rpt"))
            .finish()
    }
}

/// Convert a bitstream into a configuration-memory image.
#[derive(Clone, Debug)]
pub struct WriteMcs {
    pub(crate) script: Utf8PathBuf,
    pub(crate) design: String,
    pub(crate) bitstream: Value,
    pub(crate) interface: String,
    pub(crate) size_mb: i64,
    pub(crate) output_dir: Utf8PathBuf,
    pub(crate) resources: Vec<Resource>,
}

impl ToolTarget for WriteMcs {
    const KIND: &'static str = "write-mcs";

    fn output_dir(&self) -> Option<Utf8PathBuf> {
        Some(self.output_dir.clone())
    }

    fn params(&self) -> Params {
        let mcs = self.output_dir.join(format!("{}.mcs", self.design));
        let prm = self.output_dir.join(format!("{}.prm", self.design));
        ParamSet::new()
            .resources(&self.resources)
            .args(VIVADO)
            .args(["-source", self.script.as_str(), "-tclargs"])
            .args(["-interface", self.interface.as_str(), "-size"])
            .arg(self.size_mb)
            .arg("-bitstream")
            .arg(self.bitstream.clone())
            .args(["-out", mcs.as_str()])
            .output("mcs", &mcs)
            .output("prm", prm)
            .finish()
    }
}
