//! An in-memory executor that records what it was asked to run.

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use hwforge::resolve::{Executor, Job, Outputs, ToolFailure};
use hwforge::value::Resolved;

/// Executor for integration tests.
///
/// Every job is recorded in execution order. Declared output files are
/// created so that consumers can read them: with the contents registered
/// through [`RecordingExecutor::writing`], or empty otherwise. Kinds
/// registered through [`RecordingExecutor::failing`] fail with a non-zero
/// exit instead.
#[derive(Debug, Default)]
pub struct RecordingExecutor {
    jobs: RefCell<Vec<Job>>,
    prepared: RefCell<Vec<Utf8PathBuf>>,
    events: RefCell<Vec<String>>,
    failing: BTreeSet<String>,
    contents: BTreeMap<(String, String), String>,
}

impl RecordingExecutor {
    /// An executor that succeeds at everything.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every job of `kind` fail.
    #[must_use]
    pub fn failing(mut self, kind: &str) -> Self {
        self.failing.insert(kind.to_owned());
        self
    }

    /// Write `contents` into the file declared as output `field` of `kind`.
    #[must_use]
    pub fn writing(mut self, kind: &str, field: &str, contents: &str) -> Self {
        self.contents
            .insert((kind.to_owned(), field.to_owned()), contents.to_owned());
        self
    }

    /// Every job handed over so far, in order.
    #[must_use]
    pub fn jobs(&self) -> Vec<Job> {
        self.jobs.borrow().clone()
    }

    /// Kinds of the jobs handed over so far, in order.
    #[must_use]
    pub fn kinds(&self) -> Vec<String> {
        self.jobs
            .borrow()
            .iter()
            .map(|job| job.name().to_owned())
            .collect()
    }

    /// How many jobs of `kind` ran.
    #[must_use]
    pub fn count(&self, kind: &str) -> usize {
        self.jobs
            .borrow()
            .iter()
            .filter(|job| job.name() == kind)
            .count()
    }

    /// Output directories prepared so far, in order.
    #[must_use]
    pub fn prepared_dirs(&self) -> Vec<Utf8PathBuf> {
        self.prepared.borrow().clone()
    }

    /// `prepare <dir>` and `execute <kind>` entries on one timeline.
    #[must_use]
    pub fn events(&self) -> Vec<String> {
        self.events.borrow().clone()
    }

    fn materialise(&self, job: &Job, field: &str, path: &Utf8Path) -> Result<(), ToolFailure> {
        let io_failure = |action: &'static str, err: std::io::Error| ToolFailure::Io {
            action,
            path: path.to_path_buf(),
            message: err.to_string(),
        };
        if let Some(parent) = path.parent().filter(|parent| !parent.as_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|err| io_failure("create directory", err))?;
        }
        let key = (job.name().to_owned(), field.to_owned());
        match self.contents.get(&key) {
            Some(text) => fs::write(path, text).map_err(|err| io_failure("write", err)),
            None if path.exists() => Ok(()),
            None => fs::write(path, "").map_err(|err| io_failure("write", err)),
        }
    }
}

impl Executor for RecordingExecutor {
    fn prepare_output_dir(&self, dir: &Utf8Path) -> Result<(), ToolFailure> {
        self.prepared.borrow_mut().push(dir.to_path_buf());
        self.events.borrow_mut().push(format!("prepare {dir}"));
        fs::create_dir_all(dir).map_err(|err| ToolFailure::Io {
            action: "create directory",
            path: dir.to_path_buf(),
            message: err.to_string(),
        })
    }

    fn execute(&self, job: &Job) -> Result<Outputs, ToolFailure> {
        self.jobs.borrow_mut().push(job.clone());
        self.events
            .borrow_mut()
            .push(format!("execute {}", job.name()));
        if self.failing.contains(job.name()) {
            return Err(ToolFailure::Exit {
                program: job.name().to_owned(),
                status: "exit status: 1".to_owned(),
            });
        }
        let declared = job.declared_outputs();
        for (field, value) in declared.iter() {
            if let Resolved::Path(path) = value {
                self.materialise(job, field, path)?;
            }
        }
        Ok(declared)
    }
}
