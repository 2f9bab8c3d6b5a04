//! Helpers for creating executable stubs in tests.
//!
//! # Examples
//!
//! ```rust
//! use test_support::{fake_tool, utf8_tempdir};
//!
//! let (_guard, root) = utf8_tempdir().expect("tempdir");
//! let tool = fake_tool(&root, "dtc", "exit 0").expect("stub executable");
//! assert!(tool.exists());
//! ```

use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;
use tempfile::TempDir;

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

/// A temporary directory together with its UTF-8 path. Keep the guard alive
/// for as long as the directory is needed.
pub fn utf8_tempdir() -> Result<(TempDir, Utf8PathBuf)> {
    let dir = TempDir::new().context("create temp dir")?;
    let path = Utf8PathBuf::from_path_buf(dir.path().to_path_buf())
        .map_err(|path| anyhow::anyhow!("temp dir {} is not UTF-8", path.display()))?;
    Ok((dir, path))
}

/// Write a shell script named `name` inside `root` whose body is `script`.
pub fn fake_tool(root: &Utf8Path, name: &str, script: &str) -> Result<Utf8PathBuf> {
    let path = root.join(name);
    fs::write(path.as_std_path(), format!("#!/bin/sh\n{script}\n"))
        .with_context(|| format!("write fake tool {name}"))?;
    make_executable(&path)?;
    Ok(path)
}

/// Mark an existing file as executable on Unix; no-op elsewhere.
pub fn make_executable(path: &Utf8Path) -> Result<()> {
    #[cfg(unix)]
    {
        let mut perms = fs::metadata(path.as_std_path())
            .context("stat fake tool")?
            .permissions();
        perms.set_mode(0o755);
        fs::set_permissions(path.as_std_path(), perms).context("chmod fake tool")?;
    }

    #[cfg(not(unix))]
    let _ = path;

    Ok(())
}
