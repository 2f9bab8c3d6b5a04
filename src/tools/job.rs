//! The generic `job` kind: an arbitrary command with declared outputs.

use std::collections::BTreeMap;

use camino::Utf8PathBuf;

use super::ParamSet;
use crate::target::{Params, ToolTarget};
use crate::value::Value;

/// A pass-through command for tools without a dedicated record.
///
/// ```
/// use hwforge::target::ToolTarget;
/// use hwforge::tools::CommandJob;
///
/// let job = CommandJob::new(["touch", "out/stamp"])
///     .in_dir("out")
///     .with_output("stamp", "out/stamp")
///     .into_target();
/// assert_eq!(job.name(), "job");
/// ```
#[derive(Clone, Debug, Default)]
pub struct CommandJob {
    command: Vec<Value>,
    outputs: BTreeMap<String, Utf8PathBuf>,
    output_dir: Option<Utf8PathBuf>,
}

impl CommandJob {
    /// A job running `command`.
    pub fn new<I>(command: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        Self {
            command: command.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Declare an output file.
    #[must_use]
    pub fn with_output(mut self, field: impl Into<String>, path: impl Into<Utf8PathBuf>) -> Self {
        self.outputs.insert(field.into(), path.into());
        self
    }

    /// Declare the directory the job writes into.
    #[must_use]
    pub fn in_dir(mut self, dir: impl Into<Utf8PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }
}

impl ToolTarget for CommandJob {
    const KIND: &'static str = "job";

    fn output_dir(&self) -> Option<Utf8PathBuf> {
        self.output_dir.clone()
    }

    fn params(&self) -> Params {
        self.outputs
            .iter()
            .fold(ParamSet::new().args(self.command.iter().cloned()), |set, (field, path)| {
                set.output(field, path)
            })
            .finish()
    }
}
