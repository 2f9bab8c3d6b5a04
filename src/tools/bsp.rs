//! Board support: the BSP generator, its settings file and the metal library.

use camino::Utf8PathBuf;

use super::ParamSet;
use crate::plan::Resource;
use crate::target::{Params, ToolTarget};
use crate::value::Value;

/// Generate the machine header, linker script and settings file from a
/// device tree.
#[derive(Clone, Debug)]
pub struct BspGenerate {
    pub(crate) generator: String,
    pub(crate) design: String,
    pub(crate) dts: Value,
    pub(crate) dtb: Value,
    pub(crate) output_dir: Utf8PathBuf,
    pub(crate) resources: Vec<Resource>,
}

impl ToolTarget for BspGenerate {
    const KIND: &'static str = "bsp-generate";

    fn output_dir(&self) -> Option<Utf8PathBuf> {
        Some(self.output_dir.clone())
    }

    fn params(&self) -> Params {
        let dir = &self.output_dir;
        ParamSet::new()
            .resources(&self.resources)
            .arg(self.generator.as_str())
            .arg("--dts")
            .arg(self.dts.clone())
            .arg("--dtb")
            .arg(self.dtb.clone())
            .args(["--name", self.design.as_str(), "--output-dir", dir.as_str()])
            .output("settings", dir.join("settings.mk"))
            .output("header", dir.join(format!("{}.h", self.design)))
            .output("linker_script", dir.join("metal.default.lds"))
            .finish()
    }
}

/// Parse a generated `KEY = value` settings file into output fields.
///
/// Evaluated in-process by [`Builtins`](crate::builtins::Builtins); every
/// key of the file becomes an output field, plus `file` for the path itself.
#[derive(Clone, Debug)]
pub struct ReadAttributes {
    path: Value,
    required: Vec<String>,
}

impl ReadAttributes {
    /// Parameter holding the file to parse.
    pub const PATH_PARAM: &'static str = "path";
    /// Parameter listing keys that must be present.
    pub const REQUIRED_PARAM: &'static str = "required";

    /// Read `path`, failing unless every key in `required` is present.
    pub fn new<I, S>(path: impl Into<Value>, required: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            path: path.into(),
            required: required.into_iter().map(Into::into).collect(),
        }
    }
}

impl ToolTarget for ReadAttributes {
    const KIND: &'static str = "attributes";

    fn output_dir(&self) -> Option<Utf8PathBuf> {
        None
    }

    fn params(&self) -> Params {
        let mut params = Params::new();
        params.insert(Self::PATH_PARAM.to_owned(), self.path.clone());
        params.insert(
            Self::REQUIRED_PARAM.to_owned(),
            Value::list(self.required.iter()),
        );
        params
    }
}

/// Configure, build and install the metal library for one core.
#[derive(Clone, Debug)]
pub struct MetalInstall {
    pub(crate) arch: Value,
    pub(crate) abi: Value,
    pub(crate) header: Value,
    pub(crate) linker_script: Value,
    pub(crate) output_dir: Utf8PathBuf,
    pub(crate) resources: Vec<Resource>,
}

impl ToolTarget for MetalInstall {
    const KIND: &'static str = "metal-install";

    fn output_dir(&self) -> Option<Utf8PathBuf> {
        Some(self.output_dir.clone())
    }

    fn params(&self) -> Params {
        let dir = &self.output_dir;
        ParamSet::new()
            .resources(&self.resources)
            .args(["freedom-metal-install", "--prefix", dir.as_str(), "--with-arch"])
            .arg(self.arch.clone())
            .arg("--with-abi")
            .arg(self.abi.clone())
            .arg("--with-machine-header")
            .arg(self.header.clone())
            .arg("--with-machine-ldscript")
            .arg(self.linker_script.clone())
            .output("prefix", dir)
            .output("library", dir.join("lib").join("libmetal.a"))
            .finish()
    }
}
