//! Failure values produced while resolving a target graph.
//!
//! Failures are cloned into every consumer that depends on the failing target,
//! so they carry rendered messages instead of live `io::Error` values.

use camino::{Utf8Path, Utf8PathBuf};
use miette::Diagnostic;
use thiserror::Error;

/// Failure of a single job.
#[derive(Clone, Debug, Error, Diagnostic, PartialEq, Eq)]
pub enum ToolFailure {
    /// The tool could not be started.
    #[error("failed to spawn {program}: {message}")]
    #[diagnostic(code(hwforge::tool::spawn))]
    Spawn {
        /// Program that was invoked.
        program: String,
        /// Rendered OS error.
        message: String,
    },
    /// The tool ran and reported failure.
    #[error("{program} exited with {status}")]
    #[diagnostic(code(hwforge::tool::exit))]
    Exit {
        /// Program that was invoked.
        program: String,
        /// Rendered exit status.
        status: String,
    },
    /// A file the job declared as an output was not produced.
    #[error("expected artifact was not produced: {path}")]
    #[diagnostic(code(hwforge::tool::missing_artifact))]
    MissingArtifact {
        /// Declared output path.
        path: Utf8PathBuf,
    },
    /// A produced file could not be understood.
    #[error("{message}: {path}")]
    #[diagnostic(code(hwforge::tool::malformed_artifact))]
    MalformedArtifact {
        /// Offending file.
        path: Utf8PathBuf,
        /// What was wrong with it.
        message: String,
    },
    /// Filesystem access around the job failed.
    #[error("{action} {path}: {message}")]
    #[diagnostic(code(hwforge::tool::io))]
    Io {
        /// What was being attempted, e.g. "create directory".
        action: &'static str,
        /// Path being accessed.
        path: Utf8PathBuf,
        /// Rendered OS error.
        message: String,
    },
    /// The job lacks a parameter its executor requires.
    #[error("{kind} job is missing parameter `{param}`")]
    #[diagnostic(code(hwforge::tool::missing_param))]
    MissingParam {
        /// Job kind.
        kind: String,
        /// Required parameter.
        param: &'static str,
    },
    /// A field reference named an output the producer did not report.
    #[error("{kind} has no output field `{field}`")]
    #[diagnostic(
        code(hwforge::tool::missing_field),
        help("check the field name against the outputs declared by the producing target")
    )]
    MissingOutputField {
        /// Producer job kind.
        kind: String,
        /// Requested field.
        field: String,
    },
}

impl ToolFailure {
    /// The artifact implicated in the failure, when there is one.
    #[must_use]
    pub fn artifact(&self) -> Option<&Utf8Path> {
        match self {
            Self::MissingArtifact { path }
            | Self::MalformedArtifact { path, .. }
            | Self::Io { path, .. } => Some(path),
            Self::Spawn { .. }
            | Self::Exit { .. }
            | Self::MissingParam { .. }
            | Self::MissingOutputField { .. } => None,
        }
    }
}

/// Resolution failure of a target, annotated with the chain of targets that
/// were being resolved when it surfaced.
#[derive(Clone, Debug, Error, Diagnostic, PartialEq, Eq)]
#[error("{cause} (while resolving {})", .chain.join(" -> "))]
#[diagnostic(code(hwforge::resolve::failed))]
pub struct BuildFailure {
    chain: Vec<String>,
    cause: ToolFailure,
}

impl BuildFailure {
    /// A failure raised by the target named `target`.
    pub fn new(target: impl Into<String>, cause: ToolFailure) -> Self {
        Self {
            chain: vec![target.into()],
            cause,
        }
    }

    /// The same failure as seen from a dependent target.
    #[must_use]
    pub fn within(mut self, target: &str) -> Self {
        self.chain.insert(0, target.to_owned());
        self
    }

    /// Target names from the outermost consumer down to the failing target.
    #[must_use]
    pub fn chain(&self) -> &[String] {
        &self.chain
    }

    /// Name of the target whose own job failed.
    #[must_use]
    pub fn failed_target(&self) -> &str {
        self.chain.last().map_or("", String::as_str)
    }

    /// The deepest diagnostic.
    #[must_use]
    pub const fn cause(&self) -> &ToolFailure {
        &self.cause
    }

    /// Path of the expected-but-missing or malformed artifact, if known.
    #[must_use]
    pub fn artifact(&self) -> Option<&Utf8Path> {
        self.cause.artifact()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_grows_outward() {
        let failure = BuildFailure::new(
            "attributes",
            ToolFailure::MissingArtifact {
                path: "build/settings.mk".into(),
            },
        )
        .within("metal-install")
        .within("bsp");
        assert_eq!(failure.chain(), ["bsp", "metal-install", "attributes"]);
        assert_eq!(failure.failed_target(), "attributes");
        assert_eq!(failure.artifact(), Some(Utf8Path::new("build/settings.mk")));
        assert_eq!(
            failure.to_string(),
            "expected artifact was not produced: build/settings.mk \
             (while resolving bsp -> metal-install -> attributes)"
        );
    }
}
