//! Construction-time plan errors.

use miette::Diagnostic;
use thiserror::Error;

use super::Simulator;

/// A plan that cannot be lowered into targets.
///
/// These are raised before any external tool runs.
#[derive(Debug, Error, Diagnostic, PartialEq, Eq)]
pub enum PlanError {
    /// A required field was never set.
    #[error("{plan} is missing required field `{field}`")]
    #[diagnostic(code(hwforge::plan::missing_field))]
    MissingField {
        /// Plan type.
        plan: &'static str,
        /// Field name.
        field: &'static str,
    },
    /// A list that must have at least one element is empty.
    #[error("{plan} field `{field}` must not be empty")]
    #[diagnostic(code(hwforge::plan::empty))]
    Empty {
        /// Plan type.
        plan: &'static str,
        /// Field name.
        field: &'static str,
    },
    /// A field that names an output directory is not a single path
    /// component.
    #[error("{plan} field `{field}` must be a single path component, got `{value}`")]
    #[diagnostic(
        code(hwforge::plan::path_component),
        help("names may not contain `/` or `\\` and may not be `.` or `..`")
    )]
    NotAPathComponent {
        /// Plan type.
        plan: &'static str,
        /// Field name.
        field: &'static str,
        /// Offending value.
        value: String,
    },
    /// The selected simulator cannot honour a requested option.
    #[error("{simulator} does not support {feature}")]
    #[diagnostic(code(hwforge::plan::unsupported))]
    Unsupported {
        /// Selected simulator.
        simulator: Simulator,
        /// The option that cannot be honoured.
        feature: &'static str,
    },
    /// A plusarg could not be parsed.
    #[error("invalid plusarg `{text}`")]
    #[diagnostic(code(hwforge::plan::plusarg), help("expected `name` or `name=value`"))]
    InvalidPlusarg {
        /// Offending text.
        text: String,
    },
    /// A define could not be parsed.
    #[error("invalid define `{text}`")]
    #[diagnostic(code(hwforge::plan::define), help("expected `NAME` or `NAME=value`"))]
    InvalidDefine {
        /// Offending text.
        text: String,
    },
}
