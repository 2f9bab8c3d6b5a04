//! Parser for generated `KEY = value` attribute files.
//!
//! BSP generators emit a small settings file describing the target core:
//!
//! ```text
//! RISCV_ARCH = rv32imac
//! RISCV_ABI = ilp32
//! RISCV_CMODEL = medlow
//! ```
//!
//! Blank lines and lines starting with `#` are ignored. Any other line that
//! does not match `KEY = value` is an error; nothing is ever defaulted.

use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use indexmap::IndexMap;
use miette::Diagnostic;
use thiserror::Error;

/// Errors raised while reading an attributes file.
#[derive(Debug, Error, Diagnostic, PartialEq, Eq)]
pub enum AttributesError {
    /// The file could not be read.
    #[error("failed to read attributes file {path}: {message}")]
    #[diagnostic(code(hwforge::attributes::read))]
    Read {
        /// File being read.
        path: Utf8PathBuf,
        /// Rendered OS error.
        message: String,
    },
    /// A line did not match `KEY = value`.
    #[error("generated attributes file not formatted correctly: {path} (line {line}: `{text}`)")]
    #[diagnostic(code(hwforge::attributes::malformed))]
    Malformed {
        /// File being parsed.
        path: Utf8PathBuf,
        /// One-based line number.
        line: usize,
        /// The offending line.
        text: String,
    },
    /// A required key was absent.
    #[error("generated attributes file not formatted correctly: {path} (missing {key})")]
    #[diagnostic(code(hwforge::attributes::missing_key))]
    MissingKey {
        /// File being parsed.
        path: Utf8PathBuf,
        /// Key that was required.
        key: String,
    },
}

impl AttributesError {
    /// The attributes file the error concerns.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        match self {
            Self::Read { path, .. } | Self::Malformed { path, .. } | Self::MissingKey { path, .. } => {
                path
            }
        }
    }
}

/// Parsed attributes in file order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Attributes {
    entries: IndexMap<String, String>,
}

impl Attributes {
    /// Value of `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Entries in file order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Fail unless every key in `required` is present.
    ///
    /// # Errors
    ///
    /// Returns [`AttributesError::MissingKey`] naming the first absent key.
    pub fn require<'a>(
        &self,
        path: &Utf8Path,
        required: impl IntoIterator<Item = &'a str>,
    ) -> Result<(), AttributesError> {
        match required.into_iter().find(|key| !self.entries.contains_key(*key)) {
            Some(key) => Err(AttributesError::MissingKey {
                path: path.to_path_buf(),
                key: key.to_owned(),
            }),
            None => Ok(()),
        }
    }
}

/// Parse attribute text. `path` is only used for diagnostics.
///
/// Later duplicates of a key replace earlier ones.
///
/// # Errors
///
/// Returns [`AttributesError::Malformed`] for the first line that is not
/// blank, a comment, or `KEY = value` with a non-empty key.
pub fn parse(text: &str, path: &Utf8Path) -> Result<Attributes, AttributesError> {
    let mut entries = IndexMap::new();
    for (index, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let parsed = line
            .split_once('=')
            .map(|(key, value)| (key.trim(), value.trim()))
            .filter(|(key, _)| is_key(key));
        let Some((key, value)) = parsed else {
            return Err(AttributesError::Malformed {
                path: path.to_path_buf(),
                line: index + 1,
                text: raw.to_owned(),
            });
        };
        entries.insert(key.to_owned(), value.to_owned());
    }
    Ok(Attributes { entries })
}

/// Read and parse `path`, then check `required` keys.
///
/// # Errors
///
/// Returns an [`AttributesError`] if the file cannot be read, is malformed,
/// or lacks a required key.
pub fn read<'a>(
    path: &Utf8Path,
    required: impl IntoIterator<Item = &'a str>,
) -> Result<Attributes, AttributesError> {
    let text = fs::read_to_string(path).map_err(|err| AttributesError::Read {
        path: path.to_path_buf(),
        message: err.to_string(),
    })?;
    let attributes = parse(&text, path)?;
    attributes.require(path, required)?;
    Ok(attributes)
}

fn is_key(key: &str) -> bool {
    !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.')
}
