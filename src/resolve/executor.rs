//! The seam between the resolver and whatever actually runs jobs.

use std::collections::BTreeMap;
use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use indexmap::IndexMap;
use serde::Serialize;

use super::error::ToolFailure;
use crate::target::TargetId;
use crate::value::Resolved;

/// Parameter holding the argv of command-backed jobs.
pub const COMMAND_PARAM: &str = "command";
/// Parameter holding the map of declared output fields.
pub const OUTPUTS_PARAM: &str = "outputs";

/// Parameter naming the directory a job must run in.
pub const WORKDIR_PARAM: &str = "workdir";

/// A target with every parameter resolved, ready to run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Job {
    pub(crate) id: TargetId,
    pub(crate) name: String,
    pub(crate) params: BTreeMap<String, Resolved>,
    pub(crate) output_dir: Option<Utf8PathBuf>,
}

impl Job {
    /// Assemble a job by hand, mostly useful when testing executors.
    pub fn new(
        id: TargetId,
        name: impl Into<String>,
        params: BTreeMap<String, Resolved>,
        output_dir: Option<Utf8PathBuf>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            params,
            output_dir,
        }
    }

    /// Content address of the originating target.
    #[must_use]
    pub const fn id(&self) -> &TargetId {
        &self.id
    }

    /// Job kind.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Resolved parameters.
    #[must_use]
    pub const fn params(&self) -> &BTreeMap<String, Resolved> {
        &self.params
    }

    /// A single resolved parameter.
    #[must_use]
    pub fn param(&self, key: &str) -> Option<&Resolved> {
        self.params.get(key)
    }

    /// Declared output directory.
    #[must_use]
    pub fn output_dir(&self) -> Option<&Utf8Path> {
        self.output_dir.as_deref()
    }

    /// The argv stored under [`COMMAND_PARAM`].
    ///
    /// # Errors
    ///
    /// Returns [`ToolFailure::MissingParam`] when the job has no command or the
    /// command is empty.
    pub fn command(&self) -> Result<Vec<String>, ToolFailure> {
        self.command_words(Resolved::to_words)
    }

    /// The argv with every relative path anchored at `base`, for jobs that
    /// run outside the directory their paths were written against.
    ///
    /// # Errors
    ///
    /// As for [`Job::command`].
    pub fn command_from(&self, base: &Utf8Path) -> Result<Vec<String>, ToolFailure> {
        self.command_words(|command| command.rebased(base).to_words())
    }

    fn command_words(
        &self,
        render: impl FnOnce(&Resolved) -> Vec<String>,
    ) -> Result<Vec<String>, ToolFailure> {
        let words = self.param(COMMAND_PARAM).map(render).unwrap_or_default();
        if words.is_empty() {
            return Err(ToolFailure::MissingParam {
                kind: self.name.clone(),
                param: COMMAND_PARAM,
            });
        }
        Ok(words)
    }

    /// Directory the job must run in, from [`WORKDIR_PARAM`].
    #[must_use]
    pub fn workdir(&self) -> Option<&Utf8Path> {
        match self.param(WORKDIR_PARAM) {
            Some(Resolved::Path(dir)) => Some(dir),
            _ => None,
        }
    }

    /// Output fields the job promises to produce, from [`OUTPUTS_PARAM`].
    #[must_use]
    pub fn declared_outputs(&self) -> Outputs {
        match self.param(OUTPUTS_PARAM) {
            Some(Resolved::Map(entries)) => entries
                .iter()
                .map(|(field, value)| (field.clone(), value.clone()))
                .collect(),
            _ => Outputs::new(),
        }
    }
}

/// Named output fields reported by a completed job.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Outputs {
    fields: IndexMap<String, Resolved>,
}

impl Outputs {
    /// An empty output record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insertion.
    #[must_use]
    pub fn with(mut self, field: impl Into<String>, value: Resolved) -> Self {
        self.insert(field, value);
        self
    }

    /// Record a field, replacing any previous value.
    pub fn insert(&mut self, field: impl Into<String>, value: Resolved) {
        self.fields.insert(field.into(), value);
    }

    /// Look up a field.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Resolved> {
        self.fields.get(field)
    }

    /// Fields in the order they were reported.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Resolved)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether no fields were reported.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Every path mentioned by any field, in field order.
    #[must_use]
    pub fn paths(&self) -> Vec<Utf8PathBuf> {
        self.fields.values().flat_map(Resolved::paths).collect()
    }

    /// The record as a single value, used when a whole target is nested in
    /// another target's params.
    #[must_use]
    pub fn to_resolved(&self) -> Resolved {
        Resolved::Map(
            self.fields
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        )
    }
}

impl FromIterator<(String, Resolved)> for Outputs {
    fn from_iter<I: IntoIterator<Item = (String, Resolved)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

/// Runs resolved jobs.
///
/// Implementations only ever see jobs whose dependencies have completed; the
/// resolver guarantees each distinct job is handed over at most once.
#[cfg_attr(test, mockall::automock)]
pub trait Executor {
    /// Make sure `dir` exists before a job writes into it.
    ///
    /// # Errors
    ///
    /// Returns [`ToolFailure::Io`] if the directory cannot be created.
    fn prepare_output_dir(&self, dir: &Utf8Path) -> Result<(), ToolFailure> {
        fs::create_dir_all(dir).map_err(|err| ToolFailure::Io {
            action: "create directory",
            path: dir.to_path_buf(),
            message: err.to_string(),
        })
    }

    /// Run `job` and report its outputs.
    ///
    /// # Errors
    ///
    /// Returns a [`ToolFailure`] describing why the job did not succeed.
    fn execute(&self, job: &Job) -> Result<Outputs, ToolFailure>;
}

impl<E: Executor + ?Sized> Executor for &E {
    fn prepare_output_dir(&self, dir: &Utf8Path) -> Result<(), ToolFailure> {
        (**self).prepare_output_dir(dir)
    }

    fn execute(&self, job: &Job) -> Result<Outputs, ToolFailure> {
        (**self).execute(job)
    }
}

impl<E: Executor + ?Sized> Executor for Box<E> {
    fn prepare_output_dir(&self, dir: &Utf8Path) -> Result<(), ToolFailure> {
        (**self).prepare_output_dir(dir)
    }

    fn execute(&self, job: &Job) -> Result<Outputs, ToolFailure> {
        (**self).execute(job)
    }
}
