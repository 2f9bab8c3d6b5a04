#![forbid(unsafe_code)]

//! Shared environment constants used across hwforge crates (library, tests, and
//! helpers).

/// Environment variable overriding the root directory every pipeline writes
/// beneath.
///
/// # Examples
///
/// ```
/// use forge_env::BUILD_ROOT_ENV;
/// assert_eq!(BUILD_ROOT_ENV, "HWFORGE_BUILD_ROOT");
/// ```
pub const BUILD_ROOT_ENV: &str = "HWFORGE_BUILD_ROOT";

/// Build root used when neither the command line nor [`BUILD_ROOT_ENV`]
/// supplies one.
pub const DEFAULT_BUILD_ROOT: &str = "build";
