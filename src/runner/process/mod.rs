//! Subprocess execution of command-backed jobs.
//!
//! [`CommandExecutor`] runs the argv stored in a job's `command` parameter,
//! streams the tool's output to standard error, checks the exit status and
//! then confirms that every path the job declared under `outputs` exists.
//!
//! Jobs carrying a `workdir` parameter run inside that directory. Their
//! relative paths are anchored at the invoking directory first, so the
//! command line means the same thing it would have meant without the move.

use std::io::BufReader;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;

use camino::{Utf8Path, Utf8PathBuf};
use tracing::{debug, info, warn};

use crate::resolve::{Executor, Job, Outputs, ToolFailure};

mod redaction;
mod streaming;

use redaction::{CommandArg, redact_sensitive_args};
use streaming::{ForwardStats, forward_to_stderr};

/// Runs jobs as child processes.
#[derive(Debug, Default, Clone, Copy)]
pub struct CommandExecutor;

impl CommandExecutor {
    /// An executor inheriting the current environment and directory.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Executor for CommandExecutor {
    fn execute(&self, job: &Job) -> Result<Outputs, ToolFailure> {
        let (argv, workdir) = match job.workdir() {
            Some(dir) => {
                let base = invocation_dir(dir)?;
                (job.command_from(&base)?, Some(base.join(dir)))
            }
            None => (job.command()?, None),
        };
        let Some((program, args)) = argv.split_first() else {
            return Err(ToolFailure::MissingParam {
                kind: job.name().to_owned(),
                param: crate::resolve::COMMAND_PARAM,
            });
        };
        if let Some(resources) = job.param("resources") {
            debug!(kind = job.name(), resources = %resources, "tool resources");
        }
        log_command_execution(job, program, args);

        let mut cmd = Command::new(program);
        cmd.args(args).stdout(Stdio::piped()).stderr(Stdio::piped());
        if let Some(dir) = &workdir {
            debug!(kind = job.name(), dir = %dir, "running in job directory");
            cmd.current_dir(dir);
        }
        let spawn_failure = |err: std::io::Error| ToolFailure::Spawn {
            program: program.clone(),
            message: err.to_string(),
        };
        let child = cmd.spawn().map_err(spawn_failure)?;
        let status = spawn_and_stream_output(child).map_err(spawn_failure)?;
        check_exit_status(program, status)?;
        verify_declared_outputs(job)
    }
}

/// The directory relative paths in a job were written against.
fn invocation_dir(workdir: &Utf8Path) -> Result<Utf8PathBuf, ToolFailure> {
    let io_failure = |message: String| ToolFailure::Io {
        action: "resolve working directory for",
        path: workdir.to_path_buf(),
        message,
    };
    let cwd = std::env::current_dir().map_err(|err| io_failure(err.to_string()))?;
    Utf8PathBuf::from_path_buf(cwd)
        .map_err(|raw| io_failure(format!("{} is not valid UTF-8", raw.display())))
}

fn log_command_execution(job: &Job, program: &str, args: &[String]) {
    let wrapped: Vec<CommandArg> = args.iter().map(|arg| CommandArg::new(arg.as_str())).collect();
    let redacted = redact_sensitive_args(&wrapped);
    let words: Vec<&str> = std::iter::once(program)
        .chain(redacted.iter().map(CommandArg::as_str))
        .collect();
    // Quoting only fails on interior NUL bytes, which spawn rejects anyway.
    let line = shlex::try_join(words.iter().copied()).unwrap_or_else(|_| words.join(" "));
    info!(kind = job.name(), id = job.id().short(), "running command: {line}");
}

fn handle_forwarding_thread_result(result: thread::Result<ForwardStats>, stream_name: &str) {
    match result {
        Ok(stats) if stats.write_failed => {
            debug!("{stream_name} forwarding hit a closed pipe; output truncated");
        }
        Ok(_) => {}
        Err(err) => warn!("{stream_name} forwarding thread panicked: {err:?}"),
    }
}

/// Wait for `child` while forwarding both of its streams.
///
/// Standard output is forwarded to standard error too: the parent's own
/// standard output is reserved for machine-readable reports.
fn spawn_and_stream_output(mut child: Child) -> std::io::Result<ExitStatus> {
    let Some(stdout) = child.stdout.take() else {
        terminate_child(&mut child, "stdout pipe unavailable");
        return Err(std::io::Error::other("child process missing stdout pipe"));
    };
    let Some(stderr) = child.stderr.take() else {
        terminate_child(&mut child, "stderr pipe unavailable");
        return Err(std::io::Error::other("child process missing stderr pipe"));
    };

    let out_handle = thread::spawn(move || forward_to_stderr(BufReader::new(stdout), "stdout"));
    let err_handle = thread::spawn(move || forward_to_stderr(BufReader::new(stderr), "stderr"));

    let status = child.wait()?;
    handle_forwarding_thread_result(out_handle.join(), "stdout");
    handle_forwarding_thread_result(err_handle.join(), "stderr");
    Ok(status)
}

fn terminate_child(child: &mut Child, context: &str) {
    if let Err(err) = child.kill() {
        debug!("failed to kill child after {context}: {err}");
    }
    if let Err(err) = child.wait() {
        debug!("failed to reap child after {context}: {err}");
    }
}

fn check_exit_status(program: &str, status: ExitStatus) -> Result<(), ToolFailure> {
    if status.success() {
        Ok(())
    } else {
        Err(ToolFailure::Exit {
            program: program.to_owned(),
            status: status.to_string(),
        })
    }
}

/// The declared outputs, once every path among them exists on disk.
fn verify_declared_outputs(job: &Job) -> Result<Outputs, ToolFailure> {
    let declared = job.declared_outputs();
    for (field, value) in declared.iter() {
        if let Some(missing) = value.paths().into_iter().find(|path| !path.exists()) {
            debug!(kind = job.name(), field, path = %missing, "declared output missing");
            return Err(ToolFailure::MissingArtifact { path: missing });
        }
    }
    Ok(declared)
}
