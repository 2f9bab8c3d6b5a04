//! CLI execution and command dispatch logic.
//!
//! This module keeps `main` minimal by providing a single entry point that
//! composes the requested flow and then builds it, or prints its graph.

mod dry_run;
mod error;
mod flows;
mod process;

pub use dry_run::DryRunExecutor;
pub use error::RunnerError;
pub use process::CommandExecutor;

use std::env;
use std::ffi::OsString;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use forge_env::{BUILD_ROOT_ENV, DEFAULT_BUILD_ROOT};
use tracing::{debug, info};

use crate::builtins::Builtins;
use crate::cli::{Cli, Commands};
use crate::resolve::{Executor, Outcome, Resolver};
use crate::target::Target;
use crate::{dot, graph};

/// Execute the parsed [`Cli`] command.
///
/// # Errors
///
/// Returns an error if the flow cannot be composed, a requested target fails
/// to build, or the report cannot be written.
pub fn run(cli: &Cli) -> Result<()> {
    let build_root = resolve_build_root(cli.build_root.as_deref());
    debug!(%build_root, "resolved build root");
    match &cli.command {
        Commands::Build(flow) => {
            let roots = flows::compose(flow, &build_root)?;
            if cli.dry_run {
                build(cli, &roots, DryRunExecutor::new())
            } else {
                build(cli, &roots, Builtins::new(CommandExecutor::new()))
            }
        }
        Commands::Graph { flow } => {
            let roots = flows::compose(flow, &build_root)?;
            write_stdout(&dot::render(&roots))
        }
        Commands::Plan { flow } => {
            let roots = flows::compose(flow, &build_root)?;
            let json = serde_json::to_string_pretty(&graph::to_blueprint_json(&roots))
                .context("serialising target graph")?;
            write_stdout(&format!("{json}\n"))
        }
    }
}

/// Pick the build root: the command line wins, then [`BUILD_ROOT_ENV`], then
/// [`DEFAULT_BUILD_ROOT`]. Environment values that are not valid UTF-8 are
/// ignored.
fn resolve_build_root_with<F>(cli_value: Option<&Utf8Path>, mut read_env: F) -> Utf8PathBuf
where
    F: FnMut(&str) -> Option<OsString>,
{
    if let Some(path) = cli_value {
        return path.to_owned();
    }
    read_env(BUILD_ROOT_ENV)
        .filter(|value| !value.is_empty())
        .and_then(|value| Utf8PathBuf::from_path_buf(PathBuf::from(value)).ok())
        .unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_BUILD_ROOT))
}

fn resolve_build_root(cli_value: Option<&Utf8Path>) -> Utf8PathBuf {
    resolve_build_root_with(cli_value, |key| env::var_os(key))
}

/// Resolve `roots` with `executor` and print their outputs as JSON.
///
/// Without `--keep-going` the first failing root stops the build; later roots
/// are not attempted.
fn build<E: Executor>(cli: &Cli, roots: &[Arc<Target>], executor: E) -> Result<()> {
    let mut resolver = Resolver::new(executor);
    let outcomes: Vec<Outcome> = if cli.keep_going {
        resolver.resolve_all(roots)
    } else {
        let mut outcomes = Vec::with_capacity(roots.len());
        for root in roots {
            let outcome = resolver.resolve(root);
            let failed = outcome.is_err();
            outcomes.push(outcome);
            if failed {
                break;
            }
        }
        outcomes
    };
    info!(
        roots = roots.len(),
        executed = resolver.executed(),
        "build finished"
    );

    let mut report = serde_json::Map::new();
    let mut failures = Vec::new();
    for (root, outcome) in roots.iter().zip(outcomes) {
        match outcome {
            Ok(outputs) => {
                let key = format!("{}:{}", root.name(), root.id().short());
                report.insert(key, serde_json::to_value(outputs.as_ref())?);
            }
            Err(failure) => failures.push(failure),
        }
    }
    let json = serde_json::to_string_pretty(&report).context("serialising build report")?;
    write_stdout(&format!("{json}\n"))?;

    let failed = failures.len();
    match failures.into_iter().next() {
        None => Ok(()),
        Some(first) => Err(RunnerError::BuildFailed {
            failed,
            total: roots.len(),
            first,
        }
        .into()),
    }
}

fn write_stdout(text: &str) -> Result<()> {
    let mut out = io::stdout().lock();
    out.write_all(text.as_bytes())
        .and_then(|()| out.flush())
        .context("writing to standard output")
}
