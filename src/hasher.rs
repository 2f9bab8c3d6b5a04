//! Target hashing utilities.
//!
//! This module provides the [`TargetHasher`] type used to compute a stable
//! SHA-256 digest for [`Target`] values. The digest is the target's structural
//! identity: the resolver keys its memo cache on it so that identical targets
//! anywhere in a graph execute once.
//!
//! # Examples
//!
//! ```
//! use hwforge::hasher::TargetHasher;
//! use hwforge::target::{Params, Target};
//!
//! let target = Target::new("dtc", Params::new(), None);
//! let id = TargetHasher::hash(&target);
//! assert_eq!(id.as_str().len(), 64);
//! ```

use camino::Utf8Path;
use sha2::{Digest, Sha256};

use crate::target::{Target, TargetId};
use crate::value::Value;

/// Computes stable digests for [`Target`] definitions.
pub struct TargetHasher;

impl TargetHasher {
    /// Calculate the content address of a [`Target`].
    ///
    /// Nested targets contribute their own (cached) ids rather than their full
    /// structure, so hashing a deep graph touches each node once.
    #[must_use]
    pub fn hash(target: &Target) -> TargetId {
        let mut hasher = Sha256::new();
        hasher.update(b"tgt");
        Self::update_with_len(&mut hasher, target.name().as_bytes());
        Self::hash_optional_path(&mut hasher, target.output_dir());
        Self::update_with_len(&mut hasher, target.params().len().to_string().as_bytes());
        for (key, value) in target.params() {
            Self::update_with_len(&mut hasher, key.as_bytes());
            Self::hash_value(&mut hasher, value);
        }
        TargetId::from_digest(format!("{:x}", hasher.finalize()))
    }

    fn hash_value(hasher: &mut Sha256, value: &Value) {
        match value {
            Value::Str(text) => {
                hasher.update(b"s");
                Self::update_with_len(hasher, text.as_bytes());
            }
            Value::Int(number) => {
                hasher.update(b"i");
                Self::update_with_len(hasher, number.to_string().as_bytes());
            }
            Value::Bool(flag) => hasher.update(if *flag { b"b1" } else { b"b0" }),
            Value::Path(path) => {
                hasher.update(b"p");
                Self::update_with_len(hasher, path.as_str().as_bytes());
            }
            Value::List(items) => {
                hasher.update(b"l");
                Self::update_with_len(hasher, items.len().to_string().as_bytes());
                for item in items {
                    Self::hash_value(hasher, item);
                }
            }
            Value::Map(entries) => {
                hasher.update(b"m");
                Self::update_with_len(hasher, entries.len().to_string().as_bytes());
                for (key, item) in entries {
                    Self::update_with_len(hasher, key.as_bytes());
                    Self::hash_value(hasher, item);
                }
            }
            Value::Target(target) => {
                hasher.update(b"t");
                Self::update_with_len(hasher, target.id().as_str().as_bytes());
            }
            Value::Field(field) => {
                hasher.update(b"f");
                Self::update_with_len(hasher, field.field().as_bytes());
                Self::update_with_len(hasher, field.target().id().as_str().as_bytes());
            }
        }
    }

    fn hash_optional_path(hasher: &mut Sha256, value: Option<&Utf8Path>) {
        match value {
            Some(path) => {
                hasher.update(b"1");
                Self::update_with_len(hasher, path.as_str().as_bytes());
            }
            None => hasher.update(b"0"),
        }
    }

    fn update_with_len(hasher: &mut Sha256, bytes: &[u8]) {
        let len = bytes.len();
        hasher.update(format!("{len}:").as_bytes());
        hasher.update(bytes);
    }
}
