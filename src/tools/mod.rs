//! Typed parameter records, one per external tool kind.
//!
//! Every record implements [`ToolTarget`](crate::target::ToolTarget) and
//! lowers into a [`Target`](crate::target::Target) with two conventional
//! parameters:
//!
//! - `command`: the argv, possibly containing field references that are
//!   substituted before the job runs;
//! - `outputs`: a map from output field name to the path the tool is
//!   expected to write.
//!
//! Any other parameters are recorded so that two invocations differing only
//! in, say, their pinned toolchain are distinct targets.

use std::collections::BTreeMap;

use camino::Utf8PathBuf;

use crate::plan::Resource;
use crate::resolve::{COMMAND_PARAM, OUTPUTS_PARAM};
use crate::target::Params;
use crate::value::Value;

mod bsp;
mod fpga;
mod job;
mod rtl;
mod sim;

pub use bsp::{BspGenerate, MetalInstall, ReadAttributes};
pub use fpga::{VivadoSynth, WriteMcs};
pub use job::CommandJob;
pub use rtl::{Dtc, FirrtlCompile, FirrtlGenerate, ScalaCompile};
pub use sim::{SimCompile, SimRun};

/// Builder for the params of a command-backed target.
#[derive(Debug, Default)]
pub(crate) struct ParamSet {
    params: Params,
    command: Vec<Value>,
    outputs: BTreeMap<String, Value>,
}

impl ParamSet {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Record an extra identity-bearing parameter.
    pub(crate) fn param(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.params.insert(key.to_owned(), value.into());
        self
    }

    pub(crate) fn resources(self, resources: &[Resource]) -> Self {
        self.param(
            "resources",
            Value::list(resources.iter().map(Resource::as_str)),
        )
    }

    /// Append one command word.
    pub(crate) fn arg(mut self, word: impl Into<Value>) -> Self {
        self.command.push(word.into());
        self
    }

    /// Append several command words.
    pub(crate) fn args<I>(mut self, words: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        self.command.extend(words.into_iter().map(Into::into));
        self
    }

    /// Declare an output field and the path the tool writes it to.
    pub(crate) fn output(mut self, field: &str, path: impl Into<Utf8PathBuf>) -> Self {
        self.outputs
            .insert(field.to_owned(), Value::Path(path.into()));
        self
    }

    pub(crate) fn finish(mut self) -> Params {
        self.params
            .insert(COMMAND_PARAM.to_owned(), Value::List(self.command));
        self.params
            .insert(OUTPUTS_PARAM.to_owned(), Value::Map(self.outputs));
        self.params
    }
}
