//! Declarative build targets.
//!
//! A [`Target`] names an external job kind, carries its parameters and
//! optionally declares the directory it writes into. Constructing one does no
//! work: targets are immutable values that the
//! [`Resolver`](crate::resolve::Resolver) later executes at most once per
//! distinct structure.
//!
//! # Examples
//!
//! ```
//! use hwforge::target::{Params, Target};
//! use hwforge::value::Value;
//!
//! let mut params = Params::new();
//! params.insert("dts".into(), Value::path("build/soc/firrtl/soc.dts"));
//! let a = Target::new("dtc", params.clone(), Some("build/soc/metadata".into()));
//! let b = Target::new("dtc", params, Some("build/soc/metadata".into()));
//! assert_eq!(a, b);
//! assert_eq!(a.id(), b.id());
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, OnceLock};

use camino::{Utf8Path, Utf8PathBuf};
use serde::Serialize;

use crate::hasher::TargetHasher;
use crate::value::Value;

/// Parameter mapping of a target. Keys are kept in sorted order so that two
/// targets built from the same entries are structurally identical no matter
/// how they were inserted.
pub type Params = BTreeMap<String, Value>;

/// Content address of a [`Target`].
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct TargetId(String);

impl TargetId {
    pub(crate) const fn from_digest(digest: String) -> Self {
        Self(digest)
    }

    /// The full hexadecimal digest.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The first twelve hex digits, enough to tell targets apart in logs.
    #[must_use]
    pub fn short(&self) -> &str {
        self.0.get(..12).unwrap_or(&self.0)
    }
}

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One external build or tool invocation.
#[derive(Debug)]
pub struct Target {
    name: String,
    params: Params,
    output_dir: Option<Utf8PathBuf>,
    id: OnceLock<TargetId>,
}

impl Target {
    /// Construct a shared target value.
    ///
    /// No validation beyond the structure of `params` takes place.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        params: Params,
        output_dir: Option<Utf8PathBuf>,
    ) -> Arc<Self> {
        Arc::new(Self {
            name: name.into(),
            params,
            output_dir,
            id: OnceLock::new(),
        })
    }

    /// Job kind understood by an executor, e.g. `dtc` or `verilator`.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// All parameters.
    #[must_use]
    pub const fn params(&self) -> &Params {
        &self.params
    }

    /// Look up a single parameter.
    #[must_use]
    pub fn param(&self, key: &str) -> Option<&Value> {
        self.params.get(key)
    }

    /// Directory this target writes into, when it declares one.
    #[must_use]
    pub fn output_dir(&self) -> Option<&Utf8Path> {
        self.output_dir.as_deref()
    }

    /// Structural content address, computed once and cached.
    #[must_use]
    pub fn id(&self) -> &TargetId {
        self.id.get_or_init(|| TargetHasher::hash(self))
    }

    /// Targets this one depends on directly, either nested as a value or
    /// referenced through a field, in parameter order.
    #[must_use]
    pub fn dependencies(&self) -> Vec<&Arc<Self>> {
        let mut out = Vec::new();
        for value in self.params.values() {
            value.collect_producers(&mut out);
        }
        out
    }
}

impl PartialEq for Target {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for Target {}

impl Hash for Target {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id().hash(state);
    }
}

/// Free-function spelling of [`Target::new`].
#[must_use]
pub fn make_target(
    name: impl Into<String>,
    params: Params,
    output_dir: Option<Utf8PathBuf>,
) -> Arc<Target> {
    Target::new(name, params, output_dir)
}

/// A typed parameter record for one job kind.
///
/// Each external tool gets its own record type; converting it yields the
/// generic [`Target`] the resolver works with. The untyped [`Params`] map
/// stays available through [`Target::new`] for pass-through jobs.
pub trait ToolTarget {
    /// Job kind written into [`Target::name`].
    const KIND: &'static str;

    /// Kind of this particular record. Records that front several tools
    /// override this; the rest use [`Self::KIND`].
    fn kind(&self) -> &'static str {
        Self::KIND
    }

    /// Directory the job writes into.
    fn output_dir(&self) -> Option<Utf8PathBuf>;

    /// Lower the record into target parameters.
    fn params(&self) -> Params;

    /// Convert into a shared target.
    fn into_target(self) -> Arc<Target>
    where
        Self: Sized,
    {
        Target::new(self.kind(), self.params(), self.output_dir())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::field_of;

    fn dtc(dts: &str) -> Arc<Target> {
        let mut params = Params::new();
        params.insert("dts".into(), Value::path(dts));
        Target::new("dtc", params, Some("out".into()))
    }

    #[test]
    fn insertion_order_does_not_affect_identity() {
        let mut first = Params::new();
        first.insert("a".into(), Value::from(1_i64));
        first.insert("b".into(), Value::from(2_i64));
        let mut second = Params::new();
        second.insert("b".into(), Value::from(2_i64));
        second.insert("a".into(), Value::from(1_i64));
        assert_eq!(Target::new("x", first, None), Target::new("x", second, None));
    }

    #[test]
    fn output_dir_is_part_of_identity() {
        let a = Target::new("x", Params::new(), Some("a".into()));
        let b = Target::new("x", Params::new(), Some("b".into()));
        let c = Target::new("x", Params::new(), None);
        assert_ne!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn dependencies_include_field_producers() {
        let producer = dtc("soc.dts");
        let mut params = Params::new();
        params.insert("dtb".into(), field_of("dtb", &producer).into());
        params.insert("nested".into(), Value::Target(dtc("other.dts")));
        let consumer = Target::new("consumer", params, None);
        let deps = consumer.dependencies();
        assert_eq!(deps.len(), 2);
        assert_eq!(deps.first().map(|t| t.param("dts")), Some(Some(&Value::path("soc.dts"))));
    }

    #[test]
    fn short_id_is_a_prefix() {
        let target = dtc("soc.dts");
        assert!(target.id().as_str().starts_with(target.id().short()));
        assert_eq!(target.id().short().len(), 12);
    }
}
