//! Plusargs and preprocessor defines.
//!
//! Both are opaque to the planner: values are carried verbatim and only
//! rendered into tool syntax when a plan is lowered into a target.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::PlanError;

/// A runtime `+name` or `+name=value` argument for the simulation executable.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Plusarg {
    name: String,
    value: Option<String>,
}

impl Plusarg {
    /// A bare `+name` switch.
    pub fn flag(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: None,
        }
    }

    /// A `+name=value` argument.
    pub fn with_value(name: impl Into<String>, value: impl ToString) -> Self {
        Self {
            name: name.into(),
            value: Some(value.to_string()),
        }
    }

    /// Plusarg name without the leading `+`.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Value, if the plusarg carries one.
    #[must_use]
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }
}

impl fmt::Display for Plusarg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(value) => write!(f, "+{}={value}", self.name),
            None => write!(f, "+{}", self.name),
        }
    }
}

impl FromStr for Plusarg {
    type Err = PlanError;

    /// Accepts `name`, `name=value`, and the same with a leading `+`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let body = s.strip_prefix('+').unwrap_or(s);
        let (name, value) = match body.split_once('=') {
            Some((name, value)) => (name, Some(value.to_owned())),
            None => (body, None),
        };
        if name.is_empty() || name.chars().any(char::is_whitespace) {
            return Err(PlanError::InvalidPlusarg { text: s.to_owned() });
        }
        Ok(Self {
            name: name.to_owned(),
            value,
        })
    }
}

/// A preprocessor define, `NAME` or `NAME=value`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Define {
    name: String,
    value: Option<String>,
}

impl Define {
    /// A define without a value.
    pub fn flag(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: None,
        }
    }

    /// A define with a value.
    pub fn with_value(name: impl Into<String>, value: impl ToString) -> Self {
        Self {
            name: name.into(),
            value: Some(value.to_string()),
        }
    }

    /// Macro name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Macro value.
    #[must_use]
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }
}

impl fmt::Display for Define {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(value) => write!(f, "{}={value}", self.name),
            None => f.write_str(&self.name),
        }
    }
}

impl FromStr for Define {
    type Err = PlanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, value) = match s.split_once('=') {
            Some((name, value)) => (name, Some(value.to_owned())),
            None => (s, None),
        };
        let valid = !name.is_empty()
            && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
            && !name.starts_with(|c: char| c.is_ascii_digit());
        if !valid {
            return Err(PlanError::InvalidDefine { text: s.to_owned() });
        }
        Ok(Self {
            name: name.to_owned(),
            value,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("+verbose", "+verbose")]
    #[case("max-cycles=5000", "+max-cycles=5000")]
    #[case("+testfile=build/hello.hex", "+testfile=build/hello.hex")]
    #[case("+vcdfile=", "+vcdfile=")]
    fn plusargs_parse_and_render(#[case] input: &str, #[case] rendered: &str) {
        let plusarg: Plusarg = input.parse().expect("parse plusarg");
        assert_eq!(plusarg.to_string(), rendered);
    }

    #[rstest]
    #[case("")]
    #[case("+")]
    #[case("+=1")]
    #[case("two words")]
    fn invalid_plusargs_are_rejected(#[case] input: &str) {
        assert!(input.parse::<Plusarg>().is_err());
    }

    #[rstest]
    #[case("DEBUG", Define::flag("DEBUG"))]
    #[case("WIDTH=32", Define::with_value("WIDTH", 32))]
    fn defines_parse(#[case] input: &str, #[case] expected: Define) {
        assert_eq!(input.parse::<Define>().expect("parse define"), expected);
    }

    #[rstest]
    #[case("1X")]
    #[case("A-B")]
    #[case("=3")]
    fn invalid_defines_are_rejected(#[case] input: &str) {
        assert!(input.parse::<Define>().is_err());
    }
}
