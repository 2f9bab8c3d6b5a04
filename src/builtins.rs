//! Job kinds evaluated in-process.
//!
//! [`Builtins`] wraps another [`Executor`] and intercepts the kinds it knows
//! how to evaluate itself; everything else is forwarded unchanged.

use camino::Utf8Path;
use tracing::debug;

use crate::attributes;
use crate::resolve::{Executor, Job, Outputs, ToolFailure};
use crate::tools::ReadAttributes;
use crate::target::ToolTarget;
use crate::value::Resolved;

/// Executor that evaluates built-in kinds and delegates the rest.
#[derive(Debug, Default)]
pub struct Builtins<E> {
    inner: E,
}

impl<E> Builtins<E> {
    /// Wrap `inner`.
    pub const fn new(inner: E) -> Self {
        Self { inner }
    }

    /// The wrapped executor.
    pub const fn inner(&self) -> &E {
        &self.inner
    }
}

impl<E: Executor> Executor for Builtins<E> {
    fn prepare_output_dir(&self, dir: &Utf8Path) -> Result<(), ToolFailure> {
        self.inner.prepare_output_dir(dir)
    }

    fn execute(&self, job: &Job) -> Result<Outputs, ToolFailure> {
        if job.name() == ReadAttributes::KIND {
            return read_attributes(job);
        }
        self.inner.execute(job)
    }
}

fn read_attributes(job: &Job) -> Result<Outputs, ToolFailure> {
    let path = job
        .param(ReadAttributes::PATH_PARAM)
        .and_then(Resolved::as_path)
        .ok_or_else(|| ToolFailure::MissingParam {
            kind: job.name().to_owned(),
            param: ReadAttributes::PATH_PARAM,
        })?;
    let required: Vec<String> = job
        .param(ReadAttributes::REQUIRED_PARAM)
        .map(Resolved::to_words)
        .unwrap_or_default();
    debug!(%path, ?required, "reading attributes");
    let parsed = attributes::read(path, required.iter().map(String::as_str)).map_err(|err| {
        ToolFailure::MalformedArtifact {
            path: err.path().to_path_buf(),
            message: err.to_string(),
        }
    })?;
    let mut outputs = Outputs::new().with("file", Resolved::Path(path.to_path_buf()));
    for (key, value) in parsed.iter() {
        outputs.insert(key, Resolved::Str(value.to_owned()));
    }
    Ok(outputs)
}
