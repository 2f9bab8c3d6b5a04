//! Argument redaction for logged command lines.
//!
//! Tool invocations carry plusargs and flags such as `+token=...` or
//! `--password=...`. The key part is checked against a fixed list and the
//! value replaced before anything reaches the log.

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct CommandArg(String);

impl CommandArg {
    pub(super) fn new(arg: impl Into<String>) -> Self {
        Self(arg.into())
    }

    pub(super) fn as_str(&self) -> &str {
        &self.0
    }
}

const REDACTED: &str = "***REDACTED***";

fn is_sensitive_key(key: &str) -> bool {
    const SENSITIVE_KEYS: [&str; 8] = [
        "password",
        "passwd",
        "token",
        "secret",
        "api_key",
        "apikey",
        "auth",
        "authorization",
    ];
    SENSITIVE_KEYS
        .iter()
        .any(|candidate| key.eq_ignore_ascii_case(candidate))
}

/// Split `arg` into its flag prefix (`+`, `-` or `--`), key and value.
fn split_assignment(arg: &str) -> Option<(&str, &str, &str)> {
    let (raw_lhs, value) = arg.split_once('=')?;
    let lhs = raw_lhs.trim();
    let key = lhs.trim_start_matches(['+', '-']);
    let prefix = lhs.strip_suffix(key).unwrap_or_default();
    Some((prefix, key, value))
}

pub(super) fn is_sensitive_arg(arg: &CommandArg) -> bool {
    split_assignment(arg.as_str()).is_some_and(|(_, key, _)| is_sensitive_key(key))
}

/// Replace the value of a sensitive `key=value` argument, keeping its key and
/// flag prefix.
pub(super) fn redact_argument(arg: &CommandArg) -> CommandArg {
    match split_assignment(arg.as_str()) {
        Some((prefix, key, _)) if is_sensitive_key(key) => {
            CommandArg::new(format!("{prefix}{key}={REDACTED}"))
        }
        _ => arg.clone(),
    }
}

pub(super) fn redact_sensitive_args(args: &[CommandArg]) -> Vec<CommandArg> {
    args.iter().map(redact_argument).collect()
}
