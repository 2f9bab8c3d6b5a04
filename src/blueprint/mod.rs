//! JSON descriptions of labelled target graphs.
//!
//! A blueprint names each target with a label and lets targets refer to one
//! another by label, which makes it possible to write down graphs that cannot
//! be built, such as two targets referring to each other. [`Blueprint::link`]
//! rejects those before any job runs and otherwise produces ordinary
//! [`Target`](crate::target::Target)s.
//!
//! ```json
//! {
//!   "targets": {
//!     "dts": {
//!       "kind": "job",
//!       "output_dir": "build/soc",
//!       "params": {
//!         "command": ["cp", "soc.dts", "build/soc/soc.dts"],
//!         "outputs": { "dts": { "path": "build/soc/soc.dts" } }
//!       }
//!     },
//!     "dtb": {
//!       "kind": "dtc",
//!       "params": { "dts": { "field": "dts", "of": "dts" } }
//!     }
//!   },
//!   "roots": ["dtb"]
//! }
//! ```
//!
//! Parameter values are JSON scalars, arrays and objects, plus three special
//! single-key objects: `{"field": F, "of": L}` refers to output `F` of target
//! `L`, `{"target": L}` nests the whole output record of `L`, and
//! `{"path": P}` is a filesystem path.

use std::collections::BTreeMap;
use std::fs;
use std::str::FromStr;

use camino::{Utf8Path, Utf8PathBuf};
use indexmap::IndexMap;
use serde::Deserialize;

mod cycle;
mod error;
mod link;

pub use error::BlueprintError;
pub use link::Linked;

/// A parsed, not yet linked blueprint.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Blueprint {
    targets: IndexMap<String, TargetSpec>,
    #[serde(default)]
    roots: Vec<String>,
}

/// One labelled target.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TargetSpec {
    kind: String,
    #[serde(default)]
    params: BTreeMap<String, BlueprintValue>,
    #[serde(default)]
    output_dir: Option<Utf8PathBuf>,
}

impl TargetSpec {
    /// Job kind.
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Declared output directory.
    #[must_use]
    pub fn output_dir(&self) -> Option<&Utf8Path> {
        self.output_dir.as_deref()
    }

    /// Labels this target refers to, in parameter order.
    fn references(&self) -> Vec<&str> {
        let mut out = Vec::new();
        for value in self.params.values() {
            value.collect_references(&mut out);
        }
        out
    }
}

/// A parameter value as written in a blueprint.
///
/// Variants are tried in order. Arrays must reach `List` before the
/// reference specs, which serde would otherwise also accept as sequences.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum BlueprintValue {
    /// A boolean.
    Bool(bool),
    /// An integer.
    Int(i64),
    /// A string.
    Str(String),
    /// An array.
    List(Vec<BlueprintValue>),
    /// `{"field": F, "of": L}`.
    Field(FieldSpec),
    /// `{"target": L}`.
    Target(TargetRefSpec),
    /// `{"path": P}`.
    Path(PathSpec),
    /// Any other object.
    Map(BTreeMap<String, BlueprintValue>),
}

impl BlueprintValue {
    fn collect_references<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Self::Field(spec) => out.push(&spec.of),
            Self::Target(spec) => out.push(&spec.target),
            Self::List(items) => items.iter().for_each(|item| item.collect_references(out)),
            Self::Map(entries) => entries
                .values()
                .for_each(|item| item.collect_references(out)),
            Self::Path(_) | Self::Bool(_) | Self::Int(_) | Self::Str(_) => {}
        }
    }
}

/// Reference to one output field of a labelled target.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct FieldSpec {
    field: String,
    of: String,
}

/// Reference to the whole output record of a labelled target.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct TargetRefSpec {
    target: String,
}

/// A filesystem path.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct PathSpec {
    path: Utf8PathBuf,
}

impl Blueprint {
    /// Load a blueprint from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`BlueprintError::Read`] or [`BlueprintError::Parse`].
    pub fn from_path(path: &Utf8Path) -> Result<Self, BlueprintError> {
        let text = fs::read_to_string(path).map_err(|source| BlueprintError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        text.parse()
    }

    /// Labels in file order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.targets.keys().map(String::as_str)
    }

    /// Look up a target by label.
    #[must_use]
    pub fn target(&self, label: &str) -> Option<&TargetSpec> {
        self.targets.get(label)
    }

    /// Requested roots. An empty list means every target.
    #[must_use]
    pub fn roots(&self) -> &[String] {
        &self.roots
    }
}

impl FromStr for Blueprint {
    type Err = BlueprintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_json::from_str(s).map_err(|source| BlueprintError::Parse { source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn special_objects_are_recognised() {
        let blueprint: Blueprint = r#"{
            "targets": {
                "a": {"kind": "job", "params": {
                    "f": {"field": "out", "of": "b"},
                    "t": {"target": "c"},
                    "p": {"path": "x/y"},
                    "m": {"field": "out", "extra": 1}
                }}
            }
        }"#
        .parse()
        .expect("parse");
        let spec = blueprint.target("a").expect("target a");
        assert_eq!(spec.references(), ["b", "c"]);
        assert!(matches!(spec.params.get("p"), Some(BlueprintValue::Path(_))));
        assert!(matches!(spec.params.get("m"), Some(BlueprintValue::Map(_))));
    }

    #[test]
    fn unknown_target_keys_are_rejected() {
        let err = r#"{"targets": {"a": {"kind": "job", "outdir": "x"}}}"#
            .parse::<Blueprint>()
            .expect_err("unknown key");
        assert!(matches!(err, BlueprintError::Parse { .. }));
    }

    #[test]
    fn short_string_arrays_stay_lists() {
        let blueprint: Blueprint = r#"{
            "targets": {
                "a": {"kind": "job", "params": {
                    "command": ["touch", "stamp"],
                    "flags": ["-q"]
                }}
            }
        }"#
        .parse()
        .expect("parse");
        let spec = blueprint.target("a").expect("target a");
        assert_eq!(
            spec.params.get("command"),
            Some(&BlueprintValue::List(vec![
                BlueprintValue::Str("touch".into()),
                BlueprintValue::Str("stamp".into()),
            ]))
        );
        assert_eq!(
            spec.params.get("flags"),
            Some(&BlueprintValue::List(vec![BlueprintValue::Str("-q".into())]))
        );
        assert!(spec.references().is_empty());
        blueprint.link().expect("nothing to resolve");
    }
}
