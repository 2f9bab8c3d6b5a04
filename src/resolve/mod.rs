//! Reference resolver for target graphs.
//!
//! [`Resolver`] walks a target expression bottom-up. Every nested target and
//! field producer is resolved before its consumer, identical targets share a
//! single execution through the [`MemoCache`], and a failure is recorded once
//! and handed to every consumer that depends on it without running them.
//!
//! # Examples
//!
//! ```
//! use hwforge::field::field_of;
//! use hwforge::resolve::{Executor, Job, Outputs, Resolver, ToolFailure};
//! use hwforge::target::{Params, Target};
//! use hwforge::value::{Resolved, Value};
//!
//! struct Echo;
//!
//! impl Executor for Echo {
//!     fn execute(&self, job: &Job) -> Result<Outputs, ToolFailure> {
//!         Ok(Outputs::new().with("name", Resolved::Str(job.name().into())))
//!     }
//! }
//!
//! let producer = Target::new("dtc", Params::new(), None);
//! let mut params = Params::new();
//! params.insert("from".into(), Value::Field(field_of("name", &producer)));
//! let consumer = Target::new("bsp", params, None);
//!
//! let mut resolver = Resolver::new(Echo);
//! resolver.resolve(&consumer).expect("resolve");
//! assert_eq!(resolver.executed(), 2);
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, info, warn};

mod cache;
mod error;
mod executor;

pub use cache::{MemoCache, Outcome};
pub use error::{BuildFailure, ToolFailure};
#[cfg(test)]
pub use executor::MockExecutor;
pub use executor::{COMMAND_PARAM, Executor, Job, OUTPUTS_PARAM, Outputs, WORKDIR_PARAM};

use crate::field::FieldRef;
use crate::target::{Target, TargetId};
use crate::value::{Resolved, Value};

/// Executes target graphs in dependency order with memoised deduplication.
#[derive(Debug)]
pub struct Resolver<E> {
    executor: E,
    cache: MemoCache,
    order: Vec<TargetId>,
}

impl<E: Executor> Resolver<E> {
    /// A resolver with an empty cache.
    pub fn new(executor: E) -> Self {
        Self {
            executor,
            cache: MemoCache::new(),
            order: Vec::new(),
        }
    }

    /// The wrapped executor.
    pub const fn executor(&self) -> &E {
        &self.executor
    }

    /// Give back the executor, dropping the cache.
    pub fn into_executor(self) -> E {
        self.executor
    }

    /// Number of jobs handed to the executor so far.
    #[must_use]
    pub const fn executed(&self) -> usize {
        self.order.len()
    }

    /// Ids of executed jobs in the order they started.
    #[must_use]
    pub fn execution_order(&self) -> &[TargetId] {
        &self.order
    }

    /// The memo table.
    #[must_use]
    pub const fn cache(&self) -> &MemoCache {
        &self.cache
    }

    /// Resolve `target` and everything it depends on.
    ///
    /// # Errors
    ///
    /// Returns a [`BuildFailure`] when the target or any of its transitive
    /// dependencies fails. The target itself is not executed in that case.
    pub fn resolve(&mut self, target: &Arc<Target>) -> Outcome {
        if let Some(done) = self.cache.get(target.id()) {
            debug!(kind = target.name(), id = target.id().short(), "memo hit");
            return done.clone();
        }
        let span = tracing::debug_span!("resolve", kind = target.name(), id = target.id().short());
        let _entered = span.enter();
        let outcome = self.run(target);
        self.cache.insert(target.id().clone(), outcome)
    }

    /// Resolve several roots. Every root is attempted even when an earlier
    /// one failed; shared dependencies still run at most once.
    pub fn resolve_all(&mut self, roots: &[Arc<Target>]) -> Vec<Outcome> {
        roots.iter().map(|root| self.resolve(root)).collect()
    }

    /// Resolve a single field reference.
    ///
    /// # Errors
    ///
    /// Returns a [`BuildFailure`] if the producer fails or does not report the
    /// field.
    pub fn resolve_field(&mut self, field: &FieldRef) -> Result<Resolved, BuildFailure> {
        let producer = field.target();
        let outputs = self.resolve(producer)?;
        outputs.get(field.field()).cloned().ok_or_else(|| {
            BuildFailure::new(
                producer.name(),
                ToolFailure::MissingOutputField {
                    kind: producer.name().to_owned(),
                    field: field.field().to_owned(),
                },
            )
        })
    }

    /// Substitute every target and field reference inside `value`.
    ///
    /// # Errors
    ///
    /// Returns the first [`BuildFailure`] met while resolving producers.
    pub fn resolve_value(&mut self, value: &Value) -> Result<Resolved, BuildFailure> {
        Ok(match value {
            Value::Str(text) => Resolved::Str(text.clone()),
            Value::Int(number) => Resolved::Int(*number),
            Value::Bool(flag) => Resolved::Bool(*flag),
            Value::Path(path) => Resolved::Path(path.clone()),
            Value::List(items) => Resolved::List(
                items
                    .iter()
                    .map(|item| self.resolve_value(item))
                    .collect::<Result<_, _>>()?,
            ),
            Value::Map(entries) => Resolved::Map(
                entries
                    .iter()
                    .map(|(key, item)| Ok((key.clone(), self.resolve_value(item)?)))
                    .collect::<Result<_, BuildFailure>>()?,
            ),
            Value::Target(target) => self.resolve(target)?.to_resolved(),
            Value::Field(field) => self.resolve_field(field)?,
        })
    }

    fn run(&mut self, target: &Arc<Target>) -> Outcome {
        let mut params = BTreeMap::new();
        for (key, value) in target.params() {
            let resolved = self
                .resolve_value(value)
                .map_err(|failure| failure.within(target.name()))?;
            params.insert(key.clone(), resolved);
        }
        let job = Job {
            id: target.id().clone(),
            name: target.name().to_owned(),
            params,
            output_dir: target.output_dir().map(ToOwned::to_owned),
        };
        if let Some(dir) = job.output_dir() {
            self.executor
                .prepare_output_dir(dir)
                .map_err(|cause| BuildFailure::new(target.name(), cause))?;
        }
        info!(kind = job.name(), id = job.id().short(), "executing");
        self.order.push(job.id().clone());
        match self.executor.execute(&job) {
            Ok(outputs) => Ok(Arc::new(outputs)),
            Err(cause) => {
                warn!(kind = job.name(), id = job.id().short(), error = %cause, "job failed");
                Err(BuildFailure::new(target.name(), cause))
            }
        }
    }
}
