//! An executor that reports what would run without running it.

use std::cell::RefCell;

use camino::Utf8Path;
use tracing::info;

use crate::resolve::{Executor, Job, Outputs, ToolFailure};
use crate::target::ToolTarget;
use crate::tools::ReadAttributes;
use crate::value::Resolved;

/// Logs each job and answers with the outputs it declares.
///
/// Nothing touches the filesystem. Attribute reads, whose outputs only exist
/// once a file has been parsed, answer with `${KEY}` placeholders so that
/// downstream command lines still render.
#[derive(Debug, Default)]
pub struct DryRunExecutor {
    planned: RefCell<Vec<String>>,
}

impl DryRunExecutor {
    /// An executor with an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rendered command lines, one per job, in execution order.
    #[must_use]
    pub fn planned(&self) -> Vec<String> {
        self.planned.borrow().clone()
    }
}

impl Executor for DryRunExecutor {
    fn prepare_output_dir(&self, dir: &Utf8Path) -> Result<(), ToolFailure> {
        info!(%dir, "would create directory");
        Ok(())
    }

    fn execute(&self, job: &Job) -> Result<Outputs, ToolFailure> {
        if job.name() == ReadAttributes::KIND {
            return Ok(placeholder_attributes(job));
        }
        let line = job.command()?.join(" ");
        info!(kind = job.name(), id = job.id().short(), "would run: {line}");
        self.planned.borrow_mut().push(line);
        Ok(job.declared_outputs())
    }
}

fn placeholder_attributes(job: &Job) -> Outputs {
    let mut outputs = Outputs::new();
    if let Some(path) = job.param(ReadAttributes::PATH_PARAM) {
        outputs.insert("file", path.clone());
    }
    let required = job
        .param(ReadAttributes::REQUIRED_PARAM)
        .map(Resolved::to_words)
        .unwrap_or_default();
    for key in required {
        let placeholder = format!("${{{key}}}");
        outputs.insert(key, Resolved::Str(placeholder));
    }
    outputs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::Resolver;
    use crate::tools::CommandJob;
    use crate::value::Value;

    #[test]
    fn jobs_are_logged_and_answered_with_declared_outputs() {
        let stamp = CommandJob::new(["touch", "out/stamp"])
            .with_output("stamp", "out/stamp")
            .in_dir("out")
            .into_target();
        let executor = DryRunExecutor::new();
        let mut resolver = Resolver::new(&executor);
        let outputs = resolver.resolve(&stamp).expect("dry run");
        assert_eq!(outputs.get("stamp"), Some(&Resolved::Path("out/stamp".into())));
        assert_eq!(executor.planned(), ["touch out/stamp"]);
    }

    #[test]
    fn attribute_reads_answer_with_placeholders() {
        let target = ReadAttributes::new(Value::path("bsp/settings.mk"), ["RISCV_ABI"]).into_target();
        let outputs = Resolver::new(DryRunExecutor::new())
            .resolve(&target)
            .expect("dry run");
        assert_eq!(outputs.get("RISCV_ABI"), Some(&Resolved::Str("${RISCV_ABI}".into())));
    }
}
