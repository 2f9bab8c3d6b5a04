//! Turning a labelled blueprint into shared targets.

use std::collections::BTreeMap;
use std::sync::Arc;

use indexmap::IndexMap;
use tracing::debug;

use super::cycle::{Graph, find_cycle};
use super::{Blueprint, BlueprintError, BlueprintValue, TargetSpec};
use crate::field::field_of;
use crate::target::{Params, Target};
use crate::value::Value;

/// A linked blueprint: every label bound to its target.
#[derive(Clone, Debug)]
pub struct Linked {
    targets: IndexMap<String, Arc<Target>>,
    roots: Vec<String>,
}

impl Linked {
    /// Target bound to `label`.
    #[must_use]
    pub fn get(&self, label: &str) -> Option<&Arc<Target>> {
        self.targets.get(label)
    }

    /// Labels and targets in blueprint order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<Target>)> {
        self.targets.iter().map(|(label, target)| (label.as_str(), target))
    }

    /// Root labels in request order.
    #[must_use]
    pub fn root_labels(&self) -> &[String] {
        &self.roots
    }

    /// Root targets in request order.
    #[must_use]
    pub fn roots(&self) -> Vec<Arc<Target>> {
        self.roots
            .iter()
            .filter_map(|label| self.targets.get(label))
            .cloned()
            .collect()
    }
}

impl Blueprint {
    /// Check references and cycles, then build the targets.
    ///
    /// # Errors
    ///
    /// Returns [`BlueprintError::MissingTarget`] for a reference to an
    /// undefined label, [`BlueprintError::UnknownRoot`] for an undefined root
    /// and [`BlueprintError::CircularDependency`] when targets refer to each
    /// other in a loop.
    pub fn link(&self) -> Result<Linked, BlueprintError> {
        let mut graph = Graph::new();
        for (label, spec) in &self.targets {
            let refs = spec.references();
            if let Some(missing) = refs
                .iter()
                .copied()
                .find(|dep| !self.targets.contains_key(*dep))
            {
                return Err(BlueprintError::MissingTarget {
                    target: label.clone(),
                    missing: missing.to_owned(),
                });
            }
            graph.insert(label.as_str(), refs);
        }
        if let Some(root) = self.roots.iter().find(|root| !self.targets.contains_key(*root)) {
            return Err(BlueprintError::UnknownRoot { root: root.clone() });
        }
        if let Some(cycle) = find_cycle(&graph) {
            return Err(BlueprintError::CircularDependency { cycle });
        }

        let mut linker = Linker {
            blueprint: self,
            built: BTreeMap::new(),
        };
        let targets = self
            .targets
            .keys()
            .map(|label| (label.clone(), linker.build(label)))
            .collect();
        let roots = if self.roots.is_empty() {
            self.targets.keys().cloned().collect()
        } else {
            self.roots.clone()
        };
        debug!(targets = self.targets.len(), roots = roots.len(), "linked blueprint");
        Ok(Linked { targets, roots })
    }
}

/// Builds targets bottom-up. Only used on acyclic blueprints whose
/// references have all been checked.
struct Linker<'a> {
    blueprint: &'a Blueprint,
    built: BTreeMap<&'a str, Arc<Target>>,
}

impl<'a> Linker<'a> {
    fn build(&mut self, label: &'a str) -> Arc<Target> {
        if let Some(done) = self.built.get(label) {
            return Arc::clone(done);
        }
        let blueprint = self.blueprint;
        let target = blueprint.targets.get(label).map_or_else(
            || Target::new(label, Params::new(), None),
            |spec| self.construct(spec),
        );
        self.built.insert(label, Arc::clone(&target));
        target
    }

    fn construct(&mut self, spec: &'a TargetSpec) -> Arc<Target> {
        let params = spec
            .params
            .iter()
            .map(|(key, value)| (key.clone(), self.value(value)))
            .collect();
        Target::new(spec.kind.clone(), params, spec.output_dir.clone())
    }

    fn value(&mut self, value: &'a BlueprintValue) -> Value {
        match value {
            BlueprintValue::Field(spec) => field_of(spec.field.clone(), &self.build(&spec.of)).into(),
            BlueprintValue::Target(spec) => Value::Target(self.build(&spec.target)),
            BlueprintValue::Path(spec) => Value::Path(spec.path.clone()),
            BlueprintValue::Bool(flag) => Value::Bool(*flag),
            BlueprintValue::Int(number) => Value::Int(*number),
            BlueprintValue::Str(text) => Value::Str(text.clone()),
            BlueprintValue::List(items) => {
                Value::List(items.iter().map(|item| self.value(item)).collect())
            }
            BlueprintValue::Map(entries) => Value::Map(
                entries
                    .iter()
                    .map(|(key, item)| (key.clone(), self.value(item)))
                    .collect(),
            ),
        }
    }
}
