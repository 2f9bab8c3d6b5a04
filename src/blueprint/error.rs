//! Errors raised while loading or linking a blueprint.

use camino::Utf8PathBuf;
use miette::Diagnostic;
use thiserror::Error;

/// A blueprint that cannot be turned into a target graph.
///
/// Every variant is raised before any job runs.
#[derive(Debug, Error, Diagnostic)]
pub enum BlueprintError {
    /// The blueprint file could not be read.
    #[error("failed to read blueprint {path}")]
    #[diagnostic(code(hwforge::blueprint::read))]
    Read {
        /// File being read.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The blueprint is not valid JSON or does not match the schema.
    #[error("failed to parse blueprint: {source}")]
    #[diagnostic(
        code(hwforge::blueprint::parse),
        help("targets are objects with `kind`, optional `params` and optional `output_dir`")
    )]
    Parse {
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
    /// A target refers to a label that is not defined.
    #[error("target `{target}` refers to unknown target `{missing}`")]
    #[diagnostic(code(hwforge::blueprint::missing_target))]
    MissingTarget {
        /// The referring target.
        target: String,
        /// The undefined label.
        missing: String,
    },
    /// A requested root is not defined.
    #[error("unknown root target `{root}`")]
    #[diagnostic(code(hwforge::blueprint::unknown_root))]
    UnknownRoot {
        /// The undefined label.
        root: String,
    },
    /// Targets refer to each other in a loop.
    #[error("circular dependency detected: {}", cycle.join(" -> "))]
    #[diagnostic(
        code(hwforge::blueprint::circular_dependency),
        help("a target may not depend, directly or through field references, on itself")
    )]
    CircularDependency {
        /// Labels along the loop, starting and ending at the smallest label.
        cycle: Vec<String>,
    },
}
