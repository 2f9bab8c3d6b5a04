//! Error types for the runner module.

use miette::Diagnostic;
use thiserror::Error;

use crate::resolve::BuildFailure;

/// Errors raised while executing a command.
#[derive(Debug, Error, Diagnostic)]
pub enum RunnerError {
    /// One or more requested roots resolved to a failure.
    #[error("{failed} of {total} requested targets failed")]
    #[diagnostic(
        code(hwforge::runner::build_failed),
        help("rerun with --verbose to see every job as it starts")
    )]
    BuildFailed {
        /// Number of failed roots.
        failed: usize,
        /// Number of roots attempted or skipped.
        total: usize,
        /// The first failure, in root order.
        #[source]
        first: BuildFailure,
    },
    /// A `--root` label is not defined by the blueprint.
    #[error("blueprint has no target labelled `{label}`")]
    #[diagnostic(code(hwforge::runner::unknown_root))]
    UnknownRoot {
        /// Requested label.
        label: String,
    },
}
