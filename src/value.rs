//! Parameter values.
//!
//! A [`Value`] is what a [`Target`] carries in its params before anything has
//! run. Literals are known up front; [`Value::Target`] and [`Value::Field`]
//! stand in for outputs of other targets and are replaced by the
//! [`crate::resolve::Resolver`] with a concrete [`Resolved`] once the producer
//! has completed.
//!
//! ```
//! use hwforge::value::Value;
//!
//! let flags = Value::list(["-O3", "--trace"]);
//! assert!(flags.is_literal());
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use serde::Serialize;

use crate::field::FieldRef;
use crate::target::Target;

/// An unresolved parameter value.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Value {
    /// A plain string.
    Str(String),
    /// A signed integer.
    Int(i64),
    /// A boolean flag.
    Bool(bool),
    /// A filesystem path.
    Path(Utf8PathBuf),
    /// An ordered list. Order is preserved through resolution.
    List(Vec<Value>),
    /// A keyed record.
    Map(BTreeMap<String, Value>),
    /// The complete output record of another target.
    Target(Arc<Target>),
    /// One named output field of another target.
    Field(FieldRef),
}

impl Value {
    /// Build a list value from anything convertible into values.
    pub fn list<I, V>(items: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Self>,
    {
        Self::List(items.into_iter().map(Into::into).collect())
    }

    /// Build a path value.
    pub fn path(path: impl Into<Utf8PathBuf>) -> Self {
        Self::Path(path.into())
    }

    /// Returns `true` when no nested target or field reference appears
    /// anywhere inside this value.
    #[must_use]
    pub fn is_literal(&self) -> bool {
        match self {
            Self::Str(_) | Self::Int(_) | Self::Bool(_) | Self::Path(_) => true,
            Self::List(items) => items.iter().all(Self::is_literal),
            Self::Map(entries) => entries.values().all(Self::is_literal),
            Self::Target(_) | Self::Field(_) => false,
        }
    }

    /// Collect the producer targets this value depends on, depth first, in
    /// the order they appear.
    pub(crate) fn collect_producers<'a>(&'a self, out: &mut Vec<&'a Arc<Target>>) {
        match self {
            Self::Str(_) | Self::Int(_) | Self::Bool(_) | Self::Path(_) => {}
            Self::List(items) => items.iter().for_each(|item| item.collect_producers(out)),
            Self::Map(entries) => entries
                .values()
                .for_each(|item| item.collect_producers(out)),
            Self::Target(target) => out.push(target),
            Self::Field(field) => out.push(field.target()),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Str(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<&String> for Value {
    fn from(value: &String) -> Self {
        Self::Str(value.clone())
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<Utf8PathBuf> for Value {
    fn from(value: Utf8PathBuf) -> Self {
        Self::Path(value)
    }
}

impl From<&Utf8Path> for Value {
    fn from(value: &Utf8Path) -> Self {
        Self::Path(value.to_path_buf())
    }
}

impl From<FieldRef> for Value {
    fn from(value: FieldRef) -> Self {
        Self::Field(value)
    }
}

impl From<Arc<Target>> for Value {
    fn from(value: Arc<Target>) -> Self {
        Self::Target(value)
    }
}

impl<V: Into<Self>> From<Vec<V>> for Value {
    fn from(value: Vec<V>) -> Self {
        Self::list(value)
    }
}

/// A fully resolved value handed to executors.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Resolved {
    /// A plain string.
    Str(String),
    /// A signed integer.
    Int(i64),
    /// A boolean flag.
    Bool(bool),
    /// A filesystem path.
    Path(Utf8PathBuf),
    /// An ordered list.
    List(Vec<Resolved>),
    /// A keyed record; nested target outputs resolve to this.
    Map(BTreeMap<String, Resolved>),
}

impl Resolved {
    /// Borrow the value as a path when it is a path or a string.
    #[must_use]
    pub fn as_path(&self) -> Option<&Utf8Path> {
        match self {
            Self::Path(path) => Some(path),
            Self::Str(text) => Some(Utf8Path::new(text)),
            _ => None,
        }
    }

    /// Borrow the value as a string slice when it is textual.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(text) => Some(text),
            Self::Path(path) => Some(path.as_str()),
            _ => None,
        }
    }

    /// Borrow the value as a list.
    #[must_use]
    pub fn as_list(&self) -> Option<&[Self]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Flatten this value into command-line words.
    ///
    /// Scalars become one word each, lists are flattened in order and maps
    /// contribute their values in key order.
    #[must_use]
    pub fn to_words(&self) -> Vec<String> {
        let mut words = Vec::new();
        self.push_words(&mut words);
        words
    }

    fn push_words(&self, words: &mut Vec<String>) {
        match self {
            Self::Str(text) => words.push(text.clone()),
            Self::Int(number) => words.push(number.to_string()),
            Self::Bool(flag) => words.push(flag.to_string()),
            Self::Path(path) => words.push(path.to_string()),
            Self::List(items) => items.iter().for_each(|item| item.push_words(words)),
            Self::Map(entries) => entries.values().for_each(|item| item.push_words(words)),
        }
    }

    /// The same value with every relative path anchored at `base`.
    #[must_use]
    pub fn rebased(&self, base: &Utf8Path) -> Self {
        match self {
            Self::Path(path) => Self::Path(base.join(path)),
            Self::List(items) => Self::List(items.iter().map(|item| item.rebased(base)).collect()),
            Self::Map(entries) => Self::Map(
                entries
                    .iter()
                    .map(|(key, item)| (key.clone(), item.rebased(base)))
                    .collect(),
            ),
            Self::Str(_) | Self::Int(_) | Self::Bool(_) => self.clone(),
        }
    }

    /// Every path mentioned by this value, in order.
    #[must_use]
    pub fn paths(&self) -> Vec<Utf8PathBuf> {
        match self {
            Self::Path(path) => vec![path.clone()],
            Self::List(items) => items.iter().flat_map(Self::paths).collect(),
            Self::Map(entries) => entries.values().flat_map(Self::paths).collect(),
            Self::Str(_) | Self::Int(_) | Self::Bool(_) => Vec::new(),
        }
    }
}

impl fmt::Display for Resolved {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(text) => f.write_str(text),
            Self::Int(number) => write!(f, "{number}"),
            Self::Bool(flag) => write!(f, "{flag}"),
            Self::Path(path) => write!(f, "{path}"),
            Self::List(_) | Self::Map(_) => f.write_str(&self.to_words().join(" ")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::field_of;
    use crate::target::{Params, Target};

    #[test]
    fn nested_references_are_not_literal() {
        let producer = Target::new("dtc", Params::new(), None);
        let value = Value::list([Value::from("a"), field_of("dtb", &producer).into()]);
        assert!(!value.is_literal());
        assert!(Value::list(["a", "b"]).is_literal());
    }

    #[test]
    fn producers_are_collected_in_order() {
        let first = Target::new("first", Params::new(), None);
        let second = Target::new("second", Params::new(), None);
        let value = Value::list([
            Value::Target(Arc::clone(&first)),
            Value::from("literal"),
            field_of("out", &second).into(),
        ]);
        let mut producers = Vec::new();
        value.collect_producers(&mut producers);
        let names: Vec<&str> = producers.iter().map(|t| t.name()).collect();
        assert_eq!(names, ["first", "second"]);
    }

    #[test]
    fn resolved_lists_flatten_to_words() {
        let value = Resolved::List(vec![
            Resolved::Str("-D".into()),
            Resolved::List(vec![Resolved::Path("a.v".into()), Resolved::Int(3)]),
        ]);
        assert_eq!(value.to_words(), ["-D", "a.v", "3"]);
    }

    #[test]
    fn rebasing_only_touches_relative_paths() {
        let value = Resolved::List(vec![
            Resolved::Path("model/TestDriver".into()),
            Resolved::Path("/opt/tests/hello.elf".into()),
            Resolved::Str("+verbose".into()),
        ]);
        assert_eq!(
            value.rebased(Utf8Path::new("/work")).to_words(),
            ["/work/model/TestDriver", "/opt/tests/hello.elf", "+verbose"]
        );
    }
}
